

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::base::{ChatMessage, LlmMetadata, LlmProvider, LlmProviderError};


// Wait after failed attempt n: unit * 2^(n-1), clamped to [min_delay, max_delay].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, unit: Duration, min_delay: Duration, max_delay: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), unit, min_delay, max_delay }
    }


    pub fn delay_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let raw = self.unit.saturating_mul(1u32 << exponent);
        raw.clamp(self.min_delay, self.max_delay.max(self.min_delay))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(10))
    }
}


pub struct RetryingProvider {
    inner: Arc<dyn LlmProvider>,
    policy: RetryPolicy,
}

impl RetryingProvider {
    pub fn new(inner: Arc<dyn LlmProvider>, policy: RetryPolicy) -> Self {
        info!(
            "RetryingProvider initialized: inner={}, max_attempts={}, delay={:?}..{:?}",
            inner.provider_name(),
            policy.max_attempts,
            policy.min_delay,
            policy.max_delay
        );
        Self { inner, policy }
    }
}

#[async_trait]
impl LlmProvider for RetryingProvider {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let mut last_error = None;

        for attempt in 1..=self.policy.max_attempts {
            debug!("Completion attempt {}/{}", attempt, self.policy.max_attempts);

            match self.inner.complete(conversation).await {
                Ok((content, mut metadata)) => {
                    metadata.attempts = attempt;
                    return Ok((content, metadata));
                }
                Err(e) => {
                    warn!(
                        "Completion attempt {}/{} failed: {}",
                        attempt, self.policy.max_attempts, e
                    );
                    last_error = Some(e.to_string());

                    if attempt < self.policy.max_attempts {
                        tokio::time::sleep(self.policy.delay_after(attempt)).await;
                    }
                }
            }
        }

        Err(LlmProviderError::RetryExhausted {
            attempts: self.policy.max_attempts,
            last_error: last_error.unwrap_or_else(|| "Unknown error".to_string()),
        })
    }

    fn provider_name(&self) -> &str {
        self.inner.provider_name()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}
