//! Image relay handler

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::web::{responses::internal_error, AppState};

pub const IMAGE_FETCH_FAILED_MESSAGE: &str = "Image fetch failed";

#[derive(Debug, Deserialize)]
pub struct ImageProxyParams {
    pub url: Option<String>,
}

/// `GET /proxy-image/?url=<u>`
///
/// Streams back whatever the remote host returned. Every failure, including a
/// missing or malformed `url`, is reported as a 500.
pub async fn proxy_image(
    State(state): State<AppState>,
    Query(params): Query<ImageProxyParams>,
) -> Response {
    let Some(url) = params.url.filter(|url| !url.trim().is_empty()) else {
        warn!("Image proxy request without url");
        return internal_error(IMAGE_FETCH_FAILED_MESSAGE).into_response();
    };

    match state.image_proxy.fetch(url.trim()).await {
        Ok(image) => ([(header::CONTENT_TYPE, image.content_type)], image.bytes).into_response(),
        Err(e) => {
            warn!("Image fetch failed for {}: {}", url, e);
            internal_error(IMAGE_FETCH_FAILED_MESSAGE).into_response()
        }
    }
}
