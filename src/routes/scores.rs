use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::json_error;
use crate::services::score_store::ScoreRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveScoreRequest {
    topic: Option<String>,
    score: Option<Value>,
    total: Option<Value>,
    timestamp: Option<String>,
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
    #[serde(rename = "userName")]
    user_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScoresQuery {
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
}

#[derive(Serialize)]
struct SaveScoreResponse {
    ok: bool,
    saved: SavedSummary,
}

#[derive(Serialize)]
struct SavedSummary {
    topic: String,
    score: f64,
    total: f64,
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
    #[serde(rename = "userName")]
    user_name: Option<String>,
}

pub async fn save(State(state): State<AppState>, Json(body): Json<SaveScoreRequest>) -> Response {
    // topic must be a non-empty string; score/total must be JSON numbers
    let topic = body.topic.filter(|t| !t.trim().is_empty());
    let score = body.score.as_ref().and_then(strict_number);
    let total = body.total.as_ref().and_then(strict_number);

    let (Some(topic), Some(score), Some(total)) = (topic, score, total) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Invalid payload. Required: topic (string), score (number), total (number)",
        )
        .into_response();
    };

    let record = ScoreRecord {
        topic: topic.clone(),
        score,
        total,
        timestamp: body
            .timestamp
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| chrono::Utc::now().to_rfc3339()),
        user_email: body.user_email.clone(),
        user_name: body.user_name.clone(),
    };

    match state.score_store().append_score(record).await {
        Ok(()) => Json(SaveScoreResponse {
            ok: true,
            saved: SavedSummary {
                topic,
                score,
                total,
                user_email: body.user_email,
                user_name: body.user_name,
            },
        })
        .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "could not save score");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Could not save score",
            )
            .into_response()
        }
    }
}

pub async fn list(State(state): State<AppState>, Query(query): Query<ScoresQuery>) -> Response {
    match state
        .score_store()
        .scores_for(query.user_email.as_deref())
        .await
    {
        Ok(scores) => Json(scores).into_response(),
        Err(err) => {
            tracing::error!(error = %err, "could not read scores");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORAGE_ERROR",
                "Could not read scores file",
            )
            .into_response()
        }
    }
}

fn strict_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        _ => None,
    }
}
