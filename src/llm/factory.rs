

use std::sync::Arc;
use std::time::Duration;

use super::providers::base::{LlmProvider, LlmProviderError};
use super::providers::openai::OpenAiProvider;
use super::providers::retry::{RetryPolicy, RetryingProvider};
use crate::core::config::MemeConfig;


pub struct LlmProviderFactory;

impl LlmProviderFactory {

    pub fn retry_policy(config: &MemeConfig) -> RetryPolicy {
        RetryPolicy::new(
            config.retry_max_attempts,
            Duration::from_millis(config.retry_unit_ms),
            Duration::from_millis(config.retry_min_delay_ms),
            Duration::from_millis(config.retry_max_delay_ms),
        )
    }

    pub fn from_config(config: &MemeConfig) -> Result<Arc<dyn LlmProvider>, LlmProviderError> {
        let api_key = config
            .openai_api_key
            .as_deref()
            .ok_or_else(|| LlmProviderError::Provider("OpenAI API key is not configured".to_string()))?;

        let primary: Arc<dyn LlmProvider> = Arc::new(OpenAiProvider::new(
            api_key,
            config.openai_model.clone(),
            config.openai_base_url.clone(),
            config.temperature,
            config.http_timeout(),
        )?);

        Ok(Arc::new(RetryingProvider::new(primary, Self::retry_policy(config))))
    }
}
