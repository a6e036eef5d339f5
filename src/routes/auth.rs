use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::response::json_error;
use crate::state::AppState;

const BCRYPT_COST: u32 = 10;

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    name: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileQuery {
    email: Option<String>,
}

#[derive(Serialize)]
struct UserSummary {
    id: String,
    name: String,
    email: String,
}

#[derive(Serialize)]
struct AuthResponse {
    message: &'static str,
    user: UserSummary,
}

pub async fn signup(
    State(state): State<AppState>,
    Json(body): Json<SignupRequest>,
) -> Response {
    let (Some(name), Some(email), Some(password)) = (
        non_empty(body.name),
        non_empty(body.email),
        non_empty(body.password),
    ) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "All fields are required",
        )
        .into_response();
    };

    let Some(db) = state.database() else {
        return service_unavailable();
    };

    match db.find_user_by_email(&email).await {
        Ok(Some(_)) => {
            return json_error(
                StatusCode::BAD_REQUEST,
                "BAD_REQUEST",
                "Email already registered",
            )
            .into_response();
        }
        Ok(None) => {}
        Err(err) => {
            tracing::error!(error = %err, "signup lookup failed");
            return internal("Signup failed");
        }
    }

    let password_hash = match bcrypt::hash(&password, BCRYPT_COST) {
        Ok(hash) => hash,
        Err(err) => {
            tracing::error!(error = %err, "password hashing failed");
            return internal("Signup failed");
        }
    };

    match db.create_user(&name, &email, &password_hash).await {
        Ok(user) => (
            StatusCode::CREATED,
            Json(AuthResponse {
                message: "Signup successful",
                user: UserSummary {
                    id: user.id,
                    name: user.name,
                    email: user.email,
                },
            }),
        )
            .into_response(),
        Err(err) => {
            tracing::error!(error = %err, "signup insert failed");
            internal("Signup failed")
        }
    }
}

pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> Response {
    let (Some(email), Some(password)) = (non_empty(body.email), non_empty(body.password)) else {
        return json_error(
            StatusCode::BAD_REQUEST,
            "VALIDATION_ERROR",
            "Email and password required",
        )
        .into_response();
    };

    let Some(db) = state.database() else {
        return service_unavailable();
    };

    let user = match db.find_user_by_email(&email).await {
        Ok(Some(user)) => user,
        Ok(None) => return invalid_credentials(),
        Err(err) => {
            tracing::error!(error = %err, "login lookup failed");
            return internal("Login failed");
        }
    };

    match bcrypt::verify(&password, &user.password_hash) {
        Ok(true) => Json(AuthResponse {
            message: "Login successful",
            user: UserSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            },
        })
        .into_response(),
        Ok(false) => invalid_credentials(),
        Err(err) => {
            tracing::error!(error = %err, "password verify failed");
            internal("Login failed")
        }
    }
}

pub async fn profile(State(state): State<AppState>, Query(query): Query<ProfileQuery>) -> Response {
    let Some(email) = non_empty(query.email) else {
        return json_error(StatusCode::BAD_REQUEST, "VALIDATION_ERROR", "Email is required")
            .into_response();
    };

    let Some(db) = state.database() else {
        return service_unavailable();
    };

    match db.find_user_by_email(&email).await {
        Ok(Some(user)) => Json(UserSummary {
            id: user.id,
            name: user.name,
            email: user.email,
        })
        .into_response(),
        Ok(None) => {
            json_error(StatusCode::NOT_FOUND, "NOT_FOUND", "User not found").into_response()
        }
        Err(err) => {
            tracing::error!(error = %err, "profile lookup failed");
            internal("Could not load profile")
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn service_unavailable() -> Response {
    json_error(
        StatusCode::SERVICE_UNAVAILABLE,
        "SERVICE_UNAVAILABLE",
        "Service unavailable",
    )
    .into_response()
}

fn invalid_credentials() -> Response {
    json_error(
        StatusCode::UNAUTHORIZED,
        "UNAUTHORIZED",
        "Invalid email or password",
    )
    .into_response()
}

fn internal(message: &str) -> Response {
    json_error(StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", message).into_response()
}
