pub mod schema;

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use uuid::Uuid;

use schema::{split_sql_statements, SCHEMA_SQL};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid database config: {0}")]
    Config(String),
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct RoadmapEntry {
    pub topic: String,
    pub steps: Vec<String>,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

pub fn default_db_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studypulse")
        .join("data.db")
}

impl Database {
    pub async fn from_env() -> Result<Self, DbError> {
        let path = std::env::var("STUDYPULSE_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_db_path());
        Self::connect(&path).await
    }

    pub async fn connect(path: &Path) -> Result<Self, DbError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db_url = format!("sqlite:{}?mode=rwc", path.display());
        let options = SqliteConnectOptions::from_str(&db_url)
            .map_err(|e| DbError::Config(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        run_migrations(&pool).await?;

        Ok(Self { pool })
    }

    pub async fn ping(&self) -> Result<(), DbError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    pub async fn create_user(
        &self,
        name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, DbError> {
        let id = Uuid::new_v4().to_string();
        let created_at = chrono::Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO "users" ("id", "name", "email", "passwordHash", "createdAt")
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(&created_at)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    pub async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, DbError> {
        let row = sqlx::query(
            r#"
            SELECT "id", "name", "email", "passwordHash", "createdAt"
            FROM "users"
            WHERE "email" = ?1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        Ok(Some(User {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: row.try_get("passwordHash")?,
            created_at: row.try_get("createdAt")?,
        }))
    }

    /// Case-insensitive substring match on the stored topic. The needle is
    /// LIKE-escaped so user input cannot widen the pattern.
    pub async fn find_roadmap(&self, topic: &str) -> Result<Option<RoadmapEntry>, DbError> {
        let pattern = format!("%{}%", escape_like(topic));

        let row = sqlx::query(
            r#"
            SELECT "topic", "steps"
            FROM "roadmaps"
            WHERE "topic" LIKE ?1 ESCAPE '\'
            LIMIT 1
            "#,
        )
        .bind(&pattern)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let topic: String = row.try_get("topic")?;
        let steps_json: String = row.try_get("steps")?;
        let steps: Vec<String> = serde_json::from_str(&steps_json).unwrap_or_default();

        Ok(Some(RoadmapEntry { topic, steps }))
    }

    pub async fn insert_roadmap(&self, topic: &str, steps: &[String]) -> Result<(), DbError> {
        let id = Uuid::new_v4().to_string();
        let steps_json =
            serde_json::to_string(steps).map_err(|e| DbError::Config(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO "roadmaps" ("id", "topic", "steps")
            VALUES (?1, ?2, ?3)
            "#,
        )
        .bind(&id)
        .bind(topic)
        .bind(&steps_json)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn roadmap_count(&self) -> Result<i64, DbError> {
        let count: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM "roadmaps""#)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn run_migrations(pool: &SqlitePool) -> Result<(), DbError> {
    let version: Option<String> =
        sqlx::query_scalar(r#"SELECT "value" FROM "_db_metadata" WHERE "key" = 'schema_version'"#)
            .fetch_optional(pool)
            .await
            .unwrap_or(None);

    if version.is_some() {
        return Ok(());
    }

    for stmt in split_sql_statements(SCHEMA_SQL) {
        sqlx::query(&stmt).execute(pool).await?;
    }

    sqlx::query(
        r#"INSERT OR REPLACE INTO "_db_metadata" ("key", "value") VALUES ('schema_version', '1.0.0')"#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

fn escape_like(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '\\' | '%' | '_' => {
                out.push('\\');
                out.push(ch);
            }
            _ => out.push(ch),
        }
    }
    out
}
