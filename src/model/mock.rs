//! Scripted text model used by the unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{GenerationError, TextGenerator};

pub struct MockModel {
    replies: Mutex<VecDeque<String>>,
    fail: bool,
    delay: Option<Duration>,
    calls: Mutex<Vec<Vec<String>>>,
}

impl MockModel {
    /// Returns the given replies in order, then echoes the prompt back.
    pub fn replying<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            fail: false,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::replying(Vec::<String>::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_segments(&self) -> Vec<String> {
        self.calls.lock().unwrap().last().cloned().unwrap_or_default()
    }
}

#[async_trait]
impl TextGenerator for MockModel {
    async fn generate(&self, segments: &[String]) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push(segments.to_vec());

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail {
            return Err(GenerationError::Api {
                status: 503,
                body: "model overloaded".to_string(),
            });
        }

        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| format!("Mock response for: {}", segments.join("\n"))))
    }
}
