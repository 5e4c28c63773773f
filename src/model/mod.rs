pub mod gemini;
#[cfg(test)]
pub mod mock;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info};
use thiserror::Error;
use tokio::sync::Semaphore;

pub use gemini::GeminiModel;

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("network error: {0}")]
    Network(String),

    #[error("API request failed with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("rate limited by the model provider")]
    RateLimited,

    #[error("response blocked by the provider's content filter")]
    ContentFiltered,

    #[error("model returned no text")]
    EmptyResponse,

    #[error("malformed response from the model provider: {0}")]
    MalformedResponse(String),

    #[error("model manager is no longer accepting calls")]
    Unavailable,

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),
}

/// A hosted text model: one or more text segments in, generated text out.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, segments: &[String]) -> Result<String, GenerationError>;
}

/// Shared handle to the text model. Bounds each call with a timeout and caps
/// how many calls are in flight at once.
pub struct ModelManager {
    pub model: Arc<dyn TextGenerator>,
    permits: Semaphore,
    timeout: Duration,
}

impl ModelManager {
    pub fn new(model: Arc<dyn TextGenerator>, max_concurrent: usize, timeout: Duration) -> Self {
        info!(
            "Model manager ready (max concurrent calls: {}, timeout: {:?})",
            max_concurrent, timeout
        );
        Self {
            model,
            permits: Semaphore::new(max_concurrent),
            timeout,
        }
    }

    pub async fn generate(&self, segments: &[String]) -> Result<String, GenerationError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| GenerationError::Unavailable)?;

        debug!(
            "Generating with {} segment(s), {} characters",
            segments.len(),
            segments.iter().map(String::len).sum::<usize>()
        );

        match tokio::time::timeout(self.timeout, self.model.generate(segments)).await {
            Ok(result) => result,
            Err(_) => Err(GenerationError::Timeout(self.timeout)),
        }
    }

    /// Convenience wrapper for single-segment prompts.
    pub async fn generate_text(&self, prompt: String) -> Result<String, GenerationError> {
        self.generate(&[prompt]).await
    }
}
