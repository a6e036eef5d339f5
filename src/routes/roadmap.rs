use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::json_error;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RoadmapRequest {
    topic: Option<String>,
}

#[derive(Serialize)]
struct RoadmapHit {
    source: &'static str,
    #[serde(rename = "predictedTopic", skip_serializing_if = "Option::is_none")]
    predicted_topic: Option<String>,
    roadmap: Vec<String>,
}

#[derive(Serialize)]
struct RoadmapMiss {
    message: &'static str,
    roadmap: Vec<String>,
}

pub async fn lookup(State(state): State<AppState>, Json(body): Json<RoadmapRequest>) -> Response {
    let Some(topic) = body.topic.filter(|t| !t.trim().is_empty()) else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Topic is required")
            .into_response();
    };

    let Some(db) = state.database() else {
        return json_error(
            StatusCode::SERVICE_UNAVAILABLE,
            "SERVICE_UNAVAILABLE",
            "Service unavailable",
        )
        .into_response();
    };

    match db.find_roadmap(&topic).await {
        Ok(Some(entry)) => {
            return Json(RoadmapHit {
                source: "db",
                predicted_topic: None,
                roadmap: entry.steps,
            })
            .into_response();
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, %topic, "roadmap lookup failed");
            return server_error();
        }
    }

    // no direct match: ask the external resolver for a canonical topic
    let predicted = match state.resolver().resolve(&topic).await {
        Ok(Some(predicted)) => predicted,
        Ok(None) => return no_roadmap(),
        Err(err) => {
            tracing::error!(error = %err, %topic, "topic resolver failed");
            return server_error();
        }
    };

    match db.find_roadmap(&predicted).await {
        Ok(Some(entry)) => Json(RoadmapHit {
            source: "ml",
            predicted_topic: Some(predicted),
            roadmap: entry.steps,
        })
        .into_response(),
        Ok(None) => no_roadmap(),
        Err(err) => {
            tracing::error!(error = %err, %predicted, "resolved roadmap lookup failed");
            server_error()
        }
    }
}

fn no_roadmap() -> Response {
    Json(RoadmapMiss {
        message: "No roadmap found for this topic.",
        roadmap: Vec::new(),
    })
    .into_response()
}

fn server_error() -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", "Server error").into_response()
}
