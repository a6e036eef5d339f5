pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS "_db_metadata" (
    "key" TEXT PRIMARY KEY,
    "value" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "users" (
    "id" TEXT PRIMARY KEY,
    "name" TEXT NOT NULL,
    "email" TEXT NOT NULL UNIQUE,
    "passwordHash" TEXT NOT NULL,
    "createdAt" TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS "roadmaps" (
    "id" TEXT PRIMARY KEY,
    "topic" TEXT NOT NULL,
    -- steps stored as a JSON array of strings
    "steps" TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS "idx_roadmaps_topic" ON "roadmaps" ("topic");
"#;

pub fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|stmt| stmt.trim())
        .filter(|stmt| !stmt.is_empty())
        .map(|stmt| stmt.to_string())
        .collect()
}
