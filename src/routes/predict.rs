use std::collections::HashMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::response::json_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    quiz_marks: Option<Value>,
    attendance: Option<Value>,
    study_hours: Option<Value>,
}

#[derive(Serialize)]
struct PredictResponse {
    predicted: u8,
    probability: f64,
}

pub async fn predict(State(state): State<AppState>, Json(body): Json<PredictRequest>) -> Response {
    let Some(classifier) = state.classifier() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Prediction service unavailable",
        )
        .into_response();
    };

    let (Some(quiz_marks), Some(attendance), Some(study_hours)) = (
        coerce_number(body.quiz_marks.as_ref()),
        coerce_number(body.attendance.as_ref()),
        coerce_number(body.study_hours.as_ref()),
    ) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Missing or invalid input values",
        )
        .into_response();
    };

    let input = HashMap::from([
        ("quiz_marks".to_string(), quiz_marks),
        ("attendance".to_string(), attendance),
        ("study_hours".to_string(), study_hours),
    ]);

    let result = classifier.predict(&input);

    if !result.probability.is_finite() {
        tracing::error!(?result, "classifier produced a non-finite probability");
        return json_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            "INTERNAL_ERROR",
            "Prediction failed",
        )
        .into_response();
    }

    let probability = (result.probability.clamp(0.0, 1.0) * 100.0).round() / 100.0;
    let predicted = if result.predicted == 1 { 1 } else { 0 };

    Json(PredictResponse {
        predicted,
        probability,
    })
    .into_response()
}

/// Loose numeric coercion matching the upstream clients: JSON numbers pass
/// through, numeric strings parse, null and booleans coerce, anything else
/// is invalid.
fn coerce_number(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Some(0.0)
            } else {
                trimmed.parse().ok()
            }
        }
        Value::Null => Some(0.0),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}
