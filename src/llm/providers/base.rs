

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use strum::{AsRefStr, Display, EnumString};
use thiserror::Error;


#[derive(Error, Debug)]
pub enum LlmProviderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Retry exhausted after {attempts} attempts: {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, AsRefStr)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into() }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: content.into() }
    }
}


#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LlmMetadata {
    pub provider: String,
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_prompt: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_completion: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens_total: Option<u32>,
    #[serde(default)]
    pub attempts: u32,
}


#[async_trait]
pub trait LlmProvider: Send + Sync {

    async fn complete(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<(String, LlmMetadata), LlmProviderError>;


    fn provider_name(&self) -> &str;


    fn model_name(&self) -> &str;
}


#[async_trait]
impl LlmProvider for Arc<dyn LlmProvider> {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        (**self).complete(conversation).await
    }

    fn provider_name(&self) -> &str {
        (**self).provider_name()
    }

    fn model_name(&self) -> &str {
        (**self).model_name()
    }
}
