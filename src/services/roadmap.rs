//! Topic resolution fallback for roadmap lookups.
//!
//! When the reference collection has no match, an external resolver can map
//! the raw topic to a canonical one. The resolver is a swappable capability
//! so tests never have to spawn a real process.

use thiserror::Error;
use tracing::warn;

/// Sentinel the external resolver prints when it has no answer.
pub const NO_MATCH: &str = "NO_MATCH";

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("resolver process failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
enum ResolverKind {
    /// Spawns `command [args...] <topic>` and reads one trimmed stdout line.
    Script { command: String },
    /// Always answers with the given canonical topic (tests).
    Fixed(Option<String>),
    Disabled,
}

#[derive(Debug, Clone)]
pub struct TopicResolver {
    kind: ResolverKind,
}

impl TopicResolver {
    pub fn from_env() -> Self {
        match std::env::var("ROADMAP_RESOLVER_CMD") {
            Ok(command) if !command.trim().is_empty() => Self {
                kind: ResolverKind::Script { command },
            },
            _ => Self::disabled(),
        }
    }

    pub fn script(command: impl Into<String>) -> Self {
        Self {
            kind: ResolverKind::Script {
                command: command.into(),
            },
        }
    }

    pub fn fixed(answer: Option<&str>) -> Self {
        Self {
            kind: ResolverKind::Fixed(answer.map(|a| a.to_string())),
        }
    }

    pub fn disabled() -> Self {
        Self {
            kind: ResolverKind::Disabled,
        }
    }

    /// `Ok(None)` means the resolver had no answer (sentinel, empty output,
    /// or no resolver configured).
    pub async fn resolve(&self, topic: &str) -> Result<Option<String>, ResolveError> {
        match &self.kind {
            ResolverKind::Disabled => Ok(None),
            ResolverKind::Fixed(answer) => Ok(answer.clone()),
            ResolverKind::Script { command } => {
                let mut parts = command.split_whitespace();
                let Some(program) = parts.next() else {
                    return Ok(None);
                };

                let output = tokio::process::Command::new(program)
                    .args(parts)
                    .arg(topic)
                    .output()
                    .await?;

                if !output.status.success() {
                    warn!(status = ?output.status.code(), "resolver exited non-zero");
                }

                let answer = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if answer.is_empty() || answer == NO_MATCH {
                    Ok(None)
                } else {
                    Ok(Some(answer))
                }
            }
        }
    }
}
