mod auth;
mod debug;
mod health;
mod insights;
mod predict;
mod quiz;
mod roadmap;
mod scores;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;

use crate::response::json_error;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/health", health::router())
        .route("/api/signup", post(auth::signup))
        .route("/api/login", post(auth::login))
        .route("/api/profile", get(auth::profile))
        .route("/api/predict", post(predict::predict))
        .route("/api/generate-quiz", post(quiz::generate))
        .route("/api/generate-quiz-mock", post(quiz::generate_mock))
        .route("/api/evaluate-quiz", post(quiz::evaluate))
        .route("/api/save-score", post(scores::save))
        .route("/api/get-scores", get(scores::list))
        .route("/api/predict-from-db", get(insights::predict_from_db))
        .route("/api/weak-subject", get(insights::weak_subject))
        .route("/api/roadmap", post(roadmap::lookup))
        .route("/api/debug-path", get(debug::score_db_path))
        .fallback(fallback_handler)
        .with_state(state)
}

async fn fallback_handler() -> Response {
    json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "Resource not found").into_response()
}
