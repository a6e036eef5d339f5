use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::json_error;
use crate::services::insights::{self, SubjectPercent};
use crate::services::score_store::PredictionRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    #[serde(rename = "userEmail")]
    user_email: Option<String>,
}

#[derive(Serialize)]
struct NoScoresResponse {
    message: &'static str,
}

#[derive(Serialize)]
struct PredictFromDbResponse {
    all_scores: Vec<SubjectPercent>,
    prediction: String,
}

#[derive(Serialize)]
struct WeakSubjectResponse {
    #[serde(rename = "weakSubject")]
    weak_subject: Option<String>,
    percentage: Option<String>,
    message: String,
}

pub async fn predict_from_db(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Response {
    let store = state.score_store();
    let scores = match store.scores_for(query.user_email.as_deref()).await {
        Ok(scores) => scores,
        Err(err) => {
            tracing::error!(error = %err, "could not read score history");
            return storage_error();
        }
    };

    if scores.is_empty() {
        return Json(NoScoresResponse {
            message: "No quiz scores found",
        })
        .into_response();
    }

    let all_scores = insights::percent_breakdown(&scores);
    let prediction = insights::pass_prediction(&all_scores).to_string();

    // history append is best-effort, the response does not depend on it
    let record = PredictionRecord {
        prediction: prediction.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        user_email: query.user_email.clone(),
    };
    if let Err(err) = store.append_prediction(record).await {
        tracing::warn!(error = %err, "could not append prediction record");
    }

    Json(PredictFromDbResponse {
        all_scores,
        prediction,
    })
    .into_response()
}

pub async fn weak_subject(
    State(state): State<AppState>,
    Query(query): Query<InsightsQuery>,
) -> Response {
    let scores = match state
        .score_store()
        .scores_for(query.user_email.as_deref())
        .await
    {
        Ok(scores) => scores,
        Err(err) => {
            tracing::error!(error = %err, "could not read score history");
            return storage_error();
        }
    };

    match insights::weakest_subject(&scores) {
        Some(weakest) => Json(WeakSubjectResponse {
            message: format!("Your weakest subject appears to be {}", weakest.topic),
            weak_subject: Some(weakest.topic),
            percentage: Some(format!("{:.2}", weakest.percent)),
        })
        .into_response(),
        None => Json(WeakSubjectResponse {
            weak_subject: None,
            percentage: None,
            message: "No quiz scores found".to_string(),
        })
        .into_response(),
    }
}

fn storage_error() -> Response {
    json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        "STORAGE_ERROR",
        "Could not read scores file",
    )
    .into_response()
}
