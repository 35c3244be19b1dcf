//! crates/study_assistant_core/src/retry.rs
//!
//! A `CompletionService` decorator that retries transient endpoint failures
//! with exponential backoff. Permanent failures are returned on first sight.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::domain::ConversationTurn;
use crate::ports::{CompletionService, PortResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Values below 1 are treated as 1.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for every attempt after that.
    pub initial_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff: Duration::ZERO,
        }
    }

    /// Backoff before the given retry (1-based).
    fn backoff(&self, retry: u32) -> Duration {
        self.initial_backoff
            .saturating_mul(2u32.saturating_pow(retry.saturating_sub(1)))
    }
}

pub struct RetryingCompletion {
    inner: Arc<dyn CompletionService>,
    policy: RetryPolicy,
}

impl RetryingCompletion {
    pub fn new(inner: Arc<dyn CompletionService>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl CompletionService for RetryingCompletion {
    async fn complete(&self, messages: &[ConversationTurn]) -> PortResult<String> {
        let max_attempts = self.policy.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.inner.complete(messages).await {
                Err(e) if e.is_transient() && attempt < max_attempts => {
                    let delay = self.policy.backoff(attempt);
                    warn!(
                        "Completion attempt {}/{} failed ({}); retrying in {:?}",
                        attempt, max_attempts, e, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}
