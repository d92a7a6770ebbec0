//! Text-generation backend trait

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum NarrativeError {
    #[error("narrative service is not configured: {0}")]
    NotConfigured(String),

    #[error("narrative service rejected the credentials")]
    Authentication,

    #[error("narrative service rate limit or quota exceeded")]
    RateLimited,

    #[error("narrative service timed out after {0} seconds")]
    Timeout(u64),

    #[error("cannot reach narrative service: {0}")]
    Connection(String),

    #[error("narrative service returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response from narrative service: {0}")]
    InvalidResponse(String),
}

impl NarrativeError {
    /// Whether the service was never usable, as opposed to failing a call
    pub fn is_not_configured(&self) -> bool {
        matches!(self, NarrativeError::NotConfigured(_))
    }

    /// Short description without upstream response bodies
    pub fn summary(&self) -> String {
        match self {
            NarrativeError::Api { status, .. } => format!("narrative service returned {}", status),
            NarrativeError::Connection(_) => "cannot reach narrative service".to_string(),
            NarrativeError::InvalidResponse(_) => {
                "invalid response from narrative service".to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type NarrativeResult<T> = Result<T, NarrativeError>;

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name for logs and status
    fn name(&self) -> &str;

    /// Whether a call can be attempted at all
    fn is_configured(&self) -> bool {
        true
    }

    /// Submit a prompt and return the generated text verbatim
    async fn generate(&self, prompt: &str) -> NarrativeResult<String>;
}
