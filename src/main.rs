use tower_http::{cors::CorsLayer, trace::TraceLayer};

use studypulse_backend::config::Config;
use studypulse_backend::db::Database;
use studypulse_backend::logging;
use studypulse_backend::routes;
use studypulse_backend::seed;
use studypulse_backend::services::classifier::{Classifier, ModelError};
use studypulse_backend::services::quiz::QuizGenerator;
use studypulse_backend::services::roadmap::TopicResolver;
use studypulse_backend::services::score_store::ScoreStore;
use studypulse_backend::state::AppState;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    let config = Config::from_env();

    let _log_guard = logging::init_tracing(&config.log_level);

    let database = match Database::from_env().await {
        Ok(database) => {
            seed::seed_roadmaps(&database, &seed::seed_path_from_env()).await;
            Some(database)
        }
        Err(err) => {
            tracing::warn!(error = %err, "database not initialized, auth and roadmap endpoints degraded");
            None
        }
    };

    let classifier = match Classifier::from_env() {
        Ok(classifier) => Some(classifier),
        Err(ModelError::NotFound(path)) => {
            tracing::warn!(%path, "model file not found, prediction endpoint disabled");
            None
        }
        Err(err) => {
            tracing::error!(error = %err, "invalid model parameters, refusing to start");
            return;
        }
    };

    let score_store = ScoreStore::from_env();
    tracing::info!(path = %score_store.path().display(), "score store ready");

    let state = AppState::new(
        database,
        classifier,
        score_store,
        QuizGenerator::from_env(),
        TopicResolver::from_env(),
    );

    let app = routes::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr = config.bind_addr();
    tracing::info!(%addr, "studypulse backend listening");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("bind listener failed");

    let server = axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal());

    if let Err(e) = server.await {
        tracing::error!(error = %e, "server error");
    }

    tracing::info!("HTTP server stopped");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");
        sigterm.recv().await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
