use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use studypulse_backend::services::roadmap::TopicResolver;

mod common;

async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn health_endpoints() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"], "connected");

    let (status, body) = send(&app.router, "GET", "/health/info", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["service"], "studypulse-backend");
}

#[tokio::test]
async fn unknown_route_is_404() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/nonexistent/path", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn signup_login_profile_flow() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/signup",
        Some(json!({"name": "Asha", "email": "asha@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Signup successful");
    assert_eq!(body["user"]["email"], "asha@example.com");
    assert!(body["user"]["id"].as_str().is_some());

    // duplicate email
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/signup",
        Some(json!({"name": "Asha", "email": "asha@example.com", "password": "other"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Email already registered");

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/login",
        Some(json!({"email": "asha@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["name"], "Asha");

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/login",
        Some(json!({"email": "asha@example.com", "password": "wrong"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/login",
        Some(json!({"email": "nobody@example.com", "password": "secret123"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app.router, "GET", "/api/profile?email=asha@example.com", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Asha");

    let (status, _) = send(&app.router, "GET", "/api/profile?email=nobody@example.com", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app.router, "GET", "/api/profile", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn signup_requires_all_fields() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/signup",
        Some(json!({"email": "x@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn predict_known_example() {
    let app = common::create_test_app().await;

    // identity scaler, coefficients [0.5, 0.3, 0.2]: z = 5, sigmoid ~ 0.9933
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/predict",
        Some(json!({"quiz_marks": 10, "attendance": 0, "study_hours": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted"], 1);
    assert_eq!(body["probability"], 0.99);
}

#[tokio::test]
async fn predict_accepts_numeric_strings() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/predict",
        Some(json!({"quiz_marks": "10", "attendance": "0", "study_hours": "0"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted"], 1);
}

#[tokio::test]
async fn predict_rejects_missing_or_bad_input() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/predict",
        Some(json!({"quiz_marks": 10, "attendance": 50})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing or invalid input values");

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/predict",
        Some(json!({"quiz_marks": "abc", "attendance": 50, "study_hours": 2})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_probability_is_bounded_and_rounded() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/predict",
        Some(json!({"quiz_marks": -1000, "attendance": 0, "study_hours": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predicted"], 0);
    let p = body["probability"].as_f64().unwrap();
    assert!((0.0..=1.0).contains(&p));
    assert_eq!((p * 100.0).round() / 100.0, p);
}

#[tokio::test]
async fn generate_quiz_mock_mode() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/generate-quiz",
        Some(json!({"topic": "Rust"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let questions = body["questions"].as_array().unwrap();
    assert_eq!(questions.len(), 10);
    assert!(questions[0]["question"].as_str().unwrap().contains("Rust"));
    assert_eq!(questions[0]["options"].as_array().unwrap().len(), 4);
    assert_eq!(questions[0]["correctIndex"], 0);
}

#[tokio::test]
async fn generate_quiz_requires_topic() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "POST", "/api/generate-quiz", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Topic is required");
}

#[tokio::test]
async fn generate_quiz_mock_endpoint() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "POST", "/api/generate-quiz-mock", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["questions"].as_array().unwrap().len(), 10);
}

#[tokio::test]
async fn evaluate_quiz_scores_by_index() {
    let app = common::create_test_app().await;

    let quiz_data = json!({
        "questions": [
            {"question": "Q1?", "options": ["A", "B", "C", "D"], "correctIndex": 0, "explanation": "e1"},
            {"question": "Q2?", "options": ["A", "B", "C", "D"], "correctIndex": 2, "explanation": "e2"},
            {"question": "Q3?", "options": ["A", "B", "C", "D"], "correctIndex": 1, "explanation": "e3"}
        ]
    });

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/evaluate-quiz",
        Some(json!({"quizData": quiz_data, "userAnswers": [0, 3, 1]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["score"], 2);
    assert_eq!(body["total"], 3);

    let feedback = body["feedback"].as_array().unwrap();
    assert_eq!(feedback.len(), 3);
    assert_eq!(feedback[0]["isCorrect"], true);
    assert_eq!(feedback[1]["isCorrect"], false);
    assert_eq!(feedback[1]["userAnswer"], "D");
    assert_eq!(feedback[1]["correctAnswer"], "C");
    assert_eq!(feedback[1]["explanation"], "e2");
}

#[tokio::test]
async fn evaluate_quiz_requires_payload() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/evaluate-quiz",
        Some(json!({"userAnswers": [0]})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing quiz data");
}

#[tokio::test]
async fn save_and_list_scores() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/save-score",
        Some(json!({
            "topic": "Rust",
            "score": 7,
            "total": 10,
            "userEmail": "asha@example.com",
            "userName": "Asha"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["saved"]["topic"], "Rust");

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/save-score",
        Some(json!({"topic": "SQL", "score": 3, "total": 10, "userEmail": "other@example.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app.router, "GET", "/api/get-scores", None).await;
    assert_eq!(status, StatusCode::OK);
    let all = body.as_array().unwrap();
    assert_eq!(all.len(), 2);
    assert_eq!(all[0]["topic"], "Rust");
    assert_eq!(all[1]["topic"], "SQL");
    assert!(all[0]["timestamp"].as_str().is_some());

    let (status, body) = send(
        &app.router,
        "GET",
        "/api/get-scores?userEmail=asha@example.com",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn save_score_validates_payload() {
    let app = common::create_test_app().await;

    // score as a string is not a number
    let (status, body) = send(
        &app.router,
        "POST",
        "/api/save-score",
        Some(json!({"topic": "Rust", "score": "7", "total": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid payload"));

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/save-score",
        Some(json!({"score": 7, "total": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn predict_from_db_with_no_scores() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/api/predict-from-db", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No quiz scores found");
    assert!(body.get("prediction").is_none());
}

#[tokio::test]
async fn predict_from_db_aggregates_scores() {
    let app = common::create_test_app().await;

    for (topic, score) in [("Rust", 8), ("SQL", 6)] {
        let (status, _) = send(
            &app.router,
            "POST",
            "/api/save-score",
            Some(json!({"topic": topic, "score": score, "total": 10, "userEmail": "a@b.c"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send(&app.router, "GET", "/api/predict-from-db?userEmail=a@b.c", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["prediction"], "1"); // avg 70%
    let all_scores = body["all_scores"].as_array().unwrap();
    assert_eq!(all_scores.len(), 2);
    assert_eq!(all_scores[0]["subject"], "Rust");
    assert_eq!(all_scores[0]["percent"], 80.0);
}

#[tokio::test]
async fn predict_from_db_fails_low_average() {
    let app = common::create_test_app().await;

    let (status, _) = send(
        &app.router,
        "POST",
        "/api/save-score",
        Some(json!({"topic": "Rust", "score": 2, "total": 10})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&app.router, "GET", "/api/predict-from-db", None).await;
    assert_eq!(body["prediction"], "0");
}

#[tokio::test]
async fn weak_subject_reports_lowest_percent() {
    let app = common::create_test_app().await;

    for (topic, score) in [("Math", 9), ("History", 2), ("Physics", 5)] {
        send(
            &app.router,
            "POST",
            "/api/save-score",
            Some(json!({"topic": topic, "score": score, "total": 10})),
        )
        .await;
    }

    let (status, body) = send(&app.router, "GET", "/api/weak-subject", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weakSubject"], "History");
    assert_eq!(body["percentage"], "20.00");
    assert!(body["message"].as_str().unwrap().contains("History"));
}

#[tokio::test]
async fn weak_subject_with_no_scores() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/api/weak-subject", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weakSubject"], Value::Null);
    assert_eq!(body["percentage"], Value::Null);
}

#[tokio::test]
async fn roadmap_db_hit() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/roadmap",
        Some(json!({"topic": "data science"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "db");
    assert!(!body["roadmap"].as_array().unwrap().is_empty());
    assert!(body.get("predictedTopic").is_none());
}

#[tokio::test]
async fn roadmap_miss_without_resolver_answer() {
    let app = common::create_test_app().await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/roadmap",
        Some(json!({"topic": "Underwater Basket Weaving"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "No roadmap found for this topic.");
    assert_eq!(body["roadmap"].as_array().unwrap().len(), 0);
    assert!(body.get("source").is_none());
}

#[tokio::test]
async fn roadmap_resolver_fallback_hits_db() {
    let app =
        common::create_test_app_with_resolver(TopicResolver::fixed(Some("Data Science"))).await;

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/roadmap",
        Some(json!({"topic": "how do i learn pandas"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "ml");
    assert_eq!(body["predictedTopic"], "Data Science");
    assert!(!body["roadmap"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn roadmap_requires_topic() {
    let app = common::create_test_app().await;

    let (status, _) = send(&app.router, "POST", "/api/roadmap", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn debug_path_reports_store_location() {
    let app = common::create_test_app().await;

    let (status, body) = send(&app.router, "GET", "/api/debug-path", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().starts_with("DB PATH ->"));
}
