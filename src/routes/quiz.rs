use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Deserialize;

use crate::response::json_error;
use crate::services::evaluator;
use crate::services::quiz::{mock_quiz, QuizError, QuizQuestion};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct GenerateRequest {
    topic: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct EvaluateRequest {
    #[serde(rename = "quizData")]
    quiz_data: Option<QuizData>,
    #[serde(rename = "userAnswers")]
    user_answers: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
pub struct QuizData {
    questions: Vec<QuizQuestion>,
}

pub async fn generate(State(state): State<AppState>, Json(body): Json<GenerateRequest>) -> Response {
    let Some(topic) = body.topic.filter(|t| !t.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Topic is required")
            .into_response();
    };

    match state.quiz().generate(&topic).await {
        Ok(quiz) => Json(quiz).into_response(),
        Err(err) => {
            tracing::error!(error = %err, %topic, "quiz generation failed");
            let message = match err {
                QuizError::NotConfigured(_) => "Missing GEMINI_API_KEY",
                QuizError::NoModels => "No available models for this API key",
                _ => "Quiz generation failed: all attempts exhausted",
            };
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "UPSTREAM_ERROR", message)
                .into_response()
        }
    }
}

pub async fn generate_mock() -> Response {
    Json(mock_quiz(None)).into_response()
}

pub async fn evaluate(Json(body): Json<EvaluateRequest>) -> Response {
    let (Some(quiz_data), Some(user_answers)) = (body.quiz_data, body.user_answers) else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Missing quiz data")
            .into_response();
    };

    let evaluation = evaluator::evaluate(&quiz_data.questions, &user_answers);
    Json(evaluation).into_response()
}
