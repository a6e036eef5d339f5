use std::time::Duration;

use axum::Router;
use tempfile::TempDir;

use studypulse_backend::db::Database;
use studypulse_backend::routes;
use studypulse_backend::services::classifier::{Classifier, ModelParams};
use studypulse_backend::services::quiz::{QuizConfig, QuizGenerator};
use studypulse_backend::services::roadmap::TopicResolver;
use studypulse_backend::services::score_store::ScoreStore;
use studypulse_backend::state::AppState;

pub struct TestApp {
    pub router: Router,
    // keeps the on-disk fixtures alive for the duration of the test
    _dir: TempDir,
}

pub async fn create_test_app() -> TestApp {
    create_test_app_with_resolver(TopicResolver::fixed(None)).await
}

pub async fn create_test_app_with_resolver(resolver: TopicResolver) -> TestApp {
    let dir = tempfile::tempdir().unwrap();

    let db = Database::connect(&dir.path().join("data.db")).await.unwrap();
    db.insert_roadmap(
        "Data Science",
        &[
            "Learn Python".to_string(),
            "Statistics".to_string(),
            "Machine learning".to_string(),
        ],
    )
    .await
    .unwrap();
    db.insert_roadmap("Web Development", &["HTML".to_string(), "CSS".to_string()])
        .await
        .unwrap();

    let classifier = Classifier::new(ModelParams {
        feature_order: vec![
            "quiz_marks".to_string(),
            "attendance".to_string(),
            "study_hours".to_string(),
        ],
        scaler_mean: vec![0.0, 0.0, 0.0],
        scaler_scale: vec![1.0, 1.0, 1.0],
        coefficients: vec![0.5, 0.3, 0.2],
        intercept: 0.0,
    })
    .unwrap();

    let score_store = ScoreStore::new(dir.path().join("db.json"));

    let quiz = QuizGenerator::with_config(QuizConfig {
        api_key: None,
        base_url: "http://127.0.0.1:0".to_string(),
        mock: true,
        timeout: Duration::from_secs(5),
    });

    let state = AppState::new(Some(db), Some(classifier), score_store, quiz, resolver);

    TestApp {
        router: routes::router(state),
        _dir: dir,
    }
}
