//! Append-only JSON score log.
//!
//! The file holds `{ scores: [...], predictions: [...] }`. Reads tolerate a
//! missing or zero-length file. Appends re-serialize the whole structure,
//! but go through a single-writer mutex and an atomic temp-file rename, so
//! concurrent appenders cannot lose each other's records.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::sync::Mutex;

pub const DEFAULT_SCORES_PATH: &str = "data/db.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub topic: String,
    pub score: f64,
    pub total: f64,
    pub timestamp: String,
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
    #[serde(rename = "userName", default)]
    pub user_name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub prediction: String,
    pub timestamp: String,
    #[serde(rename = "userEmail", default)]
    pub user_email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoreFile {
    #[serde(default)]
    pub scores: Vec<ScoreRecord>,
    #[serde(default)]
    pub predictions: Vec<PredictionRecord>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid JSON in score file: {0}")]
    Json(#[from] serde_json::Error),
}

pub struct ScoreStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl ScoreStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn from_env() -> Self {
        let path = std::env::var("SCORES_DB_PATH")
            .unwrap_or_else(|_| DEFAULT_SCORES_PATH.to_string());
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn read(&self) -> Result<ScoreFile, StoreError> {
        match fs::read_to_string(&self.path).await {
            Ok(data) if data.trim().is_empty() => Ok(ScoreFile::default()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(ScoreFile::default()),
            Err(err) => Err(err.into()),
        }
    }

    pub async fn scores_for(&self, user_email: Option<&str>) -> Result<Vec<ScoreRecord>, StoreError> {
        let file = self.read().await?;
        Ok(match user_email {
            Some(email) => file
                .scores
                .into_iter()
                .filter(|s| s.user_email.as_deref() == Some(email))
                .collect(),
            None => file.scores,
        })
    }

    pub async fn append_score(&self, record: ScoreRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        file.scores.push(record);
        self.replace(&file).await
    }

    pub async fn append_prediction(&self, record: PredictionRecord) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut file = self.read().await?;
        file.predictions.push(record);
        self.replace(&file).await
    }

    async fn replace(&self, file: &ScoreFile) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        // tmp path is stable; the write lock guarantees one writer at a time
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_vec_pretty(file)?).await?;
        fs::rename(&tmp, &self.path).await?;
        Ok(())
    }
}
