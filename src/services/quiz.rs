//! Quiz generation against the generative-language API.
//!
//! A fixed-order search over (model candidate, payload shape) pairs. Each
//! pair gets a bounded retry budget for rate limiting; a 404 abandons the
//! model, a 400 gets one retry with the API key moved into the query
//! string. The first response that parses into exactly ten questions wins.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::warn;

pub const QUIZ_LEN: usize = 10;

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const DEFAULT_TIMEOUT_MS: u64 = 60_000;
const MAX_ATTEMPTS: u32 = 4;
const BASE_BACKOFF_MS: u64 = 250;

const PREFERRED_MODELS: &[&str] = &[
    "models/gemini-flash-latest",
    "models/gemini-pro-latest",
    "models/gemini-2.5-flash",
    "models/gemini-2.5-pro",
    "models/gemini-2.0-flash",
    "models/gemini-2.0-pro-exp",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub question: String,
    pub options: Vec<String>,
    #[serde(rename = "correctIndex")]
    pub correct_index: usize,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub questions: Vec<QuizQuestion>,
}

#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub mock: bool,
    pub timeout: Duration,
}

#[derive(Debug, Error)]
pub enum QuizError {
    #[error("quiz generation not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("no available models for this API key")]
    NoModels,
    #[error("all generation attempts exhausted")]
    Exhausted,
}

#[derive(Clone)]
pub struct QuizGenerator {
    config: QuizConfig,
    client: reqwest::Client,
}

impl QuizGenerator {
    pub fn from_env() -> Self {
        let api_key = env_string("GEMINI_API_KEY");
        let base_url = env_string("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let mock = env_string("USE_QUIZ_MOCK").as_deref() == Some("1")
            || env_string("NODE_ENV").as_deref() == Some("development");
        let timeout = Duration::from_millis(
            env_string("GEMINI_TIMEOUT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_TIMEOUT_MS),
        );

        Self::with_config(QuizConfig {
            api_key,
            base_url,
            mock,
            timeout,
        })
    }

    pub fn with_config(config: QuizConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self { config, client }
    }

    pub async fn generate(&self, topic: &str) -> Result<Quiz, QuizError> {
        let Some(api_key) = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
        else {
            if self.config.mock {
                return Ok(mock_quiz(Some(topic)));
            }
            return Err(QuizError::NotConfigured("GEMINI_API_KEY"));
        };

        let available = self.list_models(api_key).await;
        let candidates = candidate_models(&available);
        if candidates.is_empty() {
            if self.config.mock {
                warn!("no candidate models found, returning mock quiz");
                return Ok(mock_quiz(Some(topic)));
            }
            return Err(QuizError::NoModels);
        }

        tracing::debug!(?candidates, "model candidates (ordered)");

        for model in &candidates {
            let model_id = model.rsplit('/').next().unwrap_or(model);
            let url = format!(
                "{}/models/{}:generateContent",
                self.config.base_url.trim_end_matches('/'),
                model_id
            );

            'shapes: for shape in PayloadShape::ALL {
                let payload = shape.build(topic);

                match self.post_with_retry(&url, api_key, &payload).await {
                    Ok(body) => {
                        if let Some(quiz) = quiz_from_response(&body) {
                            tracing::info!(model = model_id, ?shape, "quiz generated");
                            return Ok(quiz);
                        }
                        warn!(model = model_id, ?shape, "response did not contain 10 valid questions");
                    }
                    Err(QuizError::HttpStatus { status, .. })
                        if status == reqwest::StatusCode::NOT_FOUND =>
                    {
                        warn!(model = model_id, "model returned 404, trying next candidate");
                        break 'shapes;
                    }
                    Err(QuizError::HttpStatus { status, body })
                        if status == reqwest::StatusCode::BAD_REQUEST =>
                    {
                        warn!(model = model_id, ?shape, %body, "400 response, retrying with key in query");
                        match self.post_with_query_key(&url, api_key, &payload).await {
                            Ok(body) => {
                                if let Some(quiz) = quiz_from_response(&body) {
                                    tracing::info!(
                                        model = model_id,
                                        ?shape,
                                        "quiz generated via query-key transport"
                                    );
                                    return Ok(quiz);
                                }
                            }
                            Err(err) => {
                                warn!(model = model_id, ?shape, error = %err, "query-key attempt failed");
                            }
                        }
                    }
                    Err(err) => {
                        warn!(model = model_id, ?shape, error = %err, "generation attempt failed");
                    }
                }
            }
        }

        if self.config.mock {
            warn!("all generation attempts exhausted, returning mock quiz");
            return Ok(mock_quiz(Some(topic)));
        }
        Err(QuizError::Exhausted)
    }

    async fn list_models(&self, api_key: &str) -> Vec<String> {
        let url = format!("{}/models", self.config.base_url.trim_end_matches('/'));
        let result = self
            .client
            .get(&url)
            .query(&[("key", api_key)])
            .send()
            .await;

        match result {
            Ok(resp) if resp.status().is_success() => match resp.json::<Value>().await {
                Ok(body) => model_names(&body),
                Err(err) => {
                    warn!(error = %err, "failed to decode model listing");
                    Vec::new()
                }
            },
            Ok(resp) => {
                warn!(status = %resp.status(), "model listing failed");
                Vec::new()
            }
            Err(err) => {
                warn!(error = %err, "model listing failed");
                Vec::new()
            }
        }
    }

    /// Retries the same request on 429 (and transport errors) with
    /// 250ms * 2^attempt backoff, up to MAX_ATTEMPTS tries total.
    async fn post_with_retry(
        &self,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<Value, QuizError> {
        let mut last_error = QuizError::Exhausted;

        for attempt in 1..=MAX_ATTEMPTS {
            let result = self
                .client
                .post(url)
                .header("x-goog-api-key", api_key)
                .json(payload)
                .send()
                .await;

            match result {
                Ok(resp) => {
                    let status = resp.status();
                    if status.is_success() {
                        return Ok(resp.json().await?);
                    }
                    let body = resp.text().await.unwrap_or_default();
                    let err = QuizError::HttpStatus { status, body };
                    if status != reqwest::StatusCode::TOO_MANY_REQUESTS
                        || attempt == MAX_ATTEMPTS
                    {
                        return Err(err);
                    }
                    warn!(attempt, %status, "rate limited, backing off");
                    last_error = err;
                }
                Err(e) => {
                    let err = QuizError::Request(e);
                    if attempt == MAX_ATTEMPTS {
                        return Err(err);
                    }
                    warn!(attempt, error = %err, "request error, retrying");
                    last_error = err;
                }
            }

            let backoff = Duration::from_millis(BASE_BACKOFF_MS * (1u64 << attempt));
            sleep(backoff).await;
        }

        Err(last_error)
    }

    async fn post_with_query_key(
        &self,
        url: &str,
        api_key: &str,
        payload: &Value,
    ) -> Result<Value, QuizError> {
        let resp = self
            .client
            .post(url)
            .query(&[("key", api_key)])
            .json(payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(QuizError::HttpStatus { status, body });
        }
        Ok(resp.json().await?)
    }
}

/// Request body layouts tried in order; older API revisions differ in how
/// the system instruction is spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    SystemInstruction,
    SnakeCaseSystemInstruction,
    InlinePrompt,
}

impl PayloadShape {
    pub const ALL: [PayloadShape; 3] = [
        PayloadShape::SystemInstruction,
        PayloadShape::SnakeCaseSystemInstruction,
        PayloadShape::InlinePrompt,
    ];

    pub fn build(self, topic: &str) -> Value {
        let system_text = format!(
            "Return valid JSON:\n{{\n  \"questions\": [\n    {{ \"question\": \"string\", \"options\": [\"A\",\"B\",\"C\",\"D\"], \"correctIndex\": 0, \"explanation\": \"string\" }}\n  ]\n}}\nExactly {QUIZ_LEN} questions."
        );
        let user_text =
            format!("Create a {QUIZ_LEN}-question MCQ quiz about {topic}. Provide concise explanations.");

        match self {
            PayloadShape::SystemInstruction => serde_json::json!({
                "systemInstruction": { "role": "system", "parts": [{ "text": system_text }] },
                "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
                "generationConfig": { "responseMimeType": "application/json" },
            }),
            PayloadShape::SnakeCaseSystemInstruction => serde_json::json!({
                "system_instruction": { "role": "system", "parts": [{ "text": system_text }] },
                "contents": [{ "role": "user", "parts": [{ "text": user_text }] }],
                "generationConfig": { "responseMimeType": "application/json" },
            }),
            PayloadShape::InlinePrompt => serde_json::json!({
                "contents": [{ "role": "user", "parts": [{ "text": format!("{system_text}\n\n{user_text}") }] }],
                "generationConfig": { "responseMimeType": "application/json" },
            }),
        }
    }
}

fn model_names(body: &Value) -> Vec<String> {
    let Some(models) = body.get("models").and_then(Value::as_array) else {
        return Vec::new();
    };

    models
        .iter()
        .map(|m| {
            if let Some(s) = m.as_str() {
                return s.to_string();
            }
            m.get("name")
                .or_else(|| m.get("id"))
                .and_then(Value::as_str)
                .map(|s| s.to_string())
                .unwrap_or_else(|| m.to_string())
        })
        .collect()
}

/// Preferred allowlist first; otherwise available models that look like a
/// stable flash/pro release; otherwise everything the listing returned.
pub fn candidate_models(available: &[String]) -> Vec<String> {
    let preferred: Vec<String> = PREFERRED_MODELS
        .iter()
        .filter(|p| available.iter().any(|a| a == *p))
        .map(|p| p.to_string())
        .collect();

    if !preferred.is_empty() {
        return preferred;
    }

    let filtered: Vec<String> = available
        .iter()
        .filter(|m| {
            let lower = m.to_lowercase();
            (lower.contains("flash") || lower.contains("pro"))
                && !lower.contains("exp")
                && !lower.contains("preview")
                && !lower.contains("experimental")
        })
        .cloned()
        .collect();

    if !filtered.is_empty() {
        filtered
    } else {
        available.to_vec()
    }
}

fn quiz_from_response(body: &Value) -> Option<Quiz> {
    let text = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?;

    let parsed = extract_json(text)?;
    let quiz: Quiz = serde_json::from_value(parsed).ok()?;
    (quiz.questions.len() == QUIZ_LEN).then_some(quiz)
}

/// Parses the text as JSON, tolerating a non-JSON wrapper by slicing
/// between the first `{` and the last `}`.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str(text) {
        return Some(value);
    }

    let first = text.find('{')?;
    let last = text.rfind('}')?;
    if last <= first {
        return None;
    }
    serde_json::from_str(&text[first..=last]).ok()
}

pub fn mock_quiz(topic: Option<&str>) -> Quiz {
    let questions = (0..QUIZ_LEN)
        .map(|i| QuizQuestion {
            question: match topic {
                Some(topic) => format!("Sample question {} about {topic}?", i + 1),
                None => format!("Sample question {}?", i + 1),
            },
            options: vec!["A".into(), "B".into(), "C".into(), "D".into()],
            correct_index: 0,
            explanation: "Sample explanation".to_string(),
        })
        .collect();

    Quiz { questions }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
