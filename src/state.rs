use std::sync::Arc;
use std::time::{Instant, SystemTime};

use crate::db::Database;
use crate::services::classifier::Classifier;
use crate::services::quiz::QuizGenerator;
use crate::services::roadmap::TopicResolver;
use crate::services::score_store::ScoreStore;

#[derive(Clone)]
pub struct AppState {
    started_at: Instant,
    started_at_system: SystemTime,
    database: Option<Arc<Database>>,
    classifier: Option<Arc<Classifier>>,
    score_store: Arc<ScoreStore>,
    quiz: Arc<QuizGenerator>,
    resolver: Arc<TopicResolver>,
}

impl AppState {
    pub fn new(
        database: Option<Database>,
        classifier: Option<Classifier>,
        score_store: ScoreStore,
        quiz: QuizGenerator,
        resolver: TopicResolver,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            started_at_system: SystemTime::now(),
            database: database.map(Arc::new),
            classifier: classifier.map(Arc::new),
            score_store: Arc::new(score_store),
            quiz: Arc::new(quiz),
            resolver: Arc::new(resolver),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }

    pub fn started_at_system(&self) -> SystemTime {
        self.started_at_system
    }

    pub fn database(&self) -> Option<Arc<Database>> {
        self.database.clone()
    }

    pub fn classifier(&self) -> Option<Arc<Classifier>> {
        self.classifier.clone()
    }

    pub fn score_store(&self) -> Arc<ScoreStore> {
        Arc::clone(&self.score_store)
    }

    pub fn quiz(&self) -> Arc<QuizGenerator> {
        Arc::clone(&self.quiz)
    }

    pub fn resolver(&self) -> Arc<TopicResolver> {
        Arc::clone(&self.resolver)
    }
}
