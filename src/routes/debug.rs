use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::state::AppState;

pub async fn score_db_path(State(state): State<AppState>) -> Response {
    format!("DB PATH -> {}", state.score_store().path().display()).into_response()
}
