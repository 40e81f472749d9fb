//! Profile lookup handler

use axum::{
    extract::{Path, State},
    response::Response,
};

use crate::web::{responses::handle_result, AppState};

/// `GET /profile/{username}`
///
/// Answers from the cache when possible, otherwise asks Instagram through a
/// randomly chosen session.
pub async fn get_profile(State(state): State<AppState>, Path(username): Path<String>) -> Response {
    handle_result(state.profile_service.lookup(&username).await)
}
