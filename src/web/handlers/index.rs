//! Index page handler
//!
//! Serves the embedded lookup page.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse},
};

use crate::{assets::StaticAssets, web::AppState};

/// Serve the index page from embedded static assets
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    match StaticAssets::get_asset(&state.config.web.index_page) {
        Some(file) => {
            let content = String::from_utf8_lossy(&file.data);
            Html(content.into_owned()).into_response()
        }
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Html("<h1>500 Internal Server Error</h1><p>Index page not found</p>".to_string()),
        )
            .into_response(),
    }
}
