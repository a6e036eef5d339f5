use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::db::Database;

pub const DEFAULT_SEED_PATH: &str = "data/roadmaps.seed.json";

#[derive(Debug, Deserialize)]
struct SeedEntry {
    topic: String,
    steps: Vec<String>,
}

pub fn seed_path_from_env() -> PathBuf {
    std::env::var("ROADMAP_SEED_PATH")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(DEFAULT_SEED_PATH))
}

/// Loads roadmap reference data from the seed file when the table is
/// empty. Seeding problems are logged and skipped, never fatal.
pub async fn seed_roadmaps(db: &Database, path: &Path) {
    match db.roadmap_count().await {
        Ok(0) => {}
        Ok(count) => {
            tracing::debug!(count, "roadmaps already seeded");
            return;
        }
        Err(err) => {
            tracing::warn!(error = %err, "could not check roadmap count");
            return;
        }
    }

    if !path.exists() {
        tracing::debug!(path = %path.display(), "no roadmap seed file, skipping seed");
        return;
    }

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "could not read roadmap seed file");
            return;
        }
    };

    let entries: Vec<SeedEntry> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(err) => {
            tracing::warn!(error = %err, path = %path.display(), "invalid roadmap seed file");
            return;
        }
    };

    let mut seeded = 0usize;
    for entry in &entries {
        match db.insert_roadmap(&entry.topic, &entry.steps).await {
            Ok(()) => seeded += 1,
            Err(err) => {
                tracing::warn!(error = %err, topic = %entry.topic, "failed to seed roadmap");
            }
        }
    }

    tracing::info!(seeded, total = entries.len(), "roadmap seed complete");
}
