

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::base::{ChatMessage, LlmMetadata, LlmProvider, LlmProviderError};

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    temperature: f64,
    messages: &'a [ChatMessage],
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatCompletionChoice>,
    usage: Option<ChatCompletionUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: ChatCompletionMessage,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}


pub struct OpenAiProvider {
    api_key: String,
    model: String,
    base_url: String,
    temperature: f64,
    client: Client,
}

impl OpenAiProvider {

    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        temperature: f64,
        timeout: Duration,
    ) -> Result<Self, LlmProviderError> {
        let model = model.into();
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("OpenAI provider initialized (model={}, base_url={})", model, base_url);
        Ok(Self {
            api_key: api_key.into(),
            model,
            base_url,
            temperature,
            client: Client::builder().timeout(timeout).build()?,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }
}

fn extract_reply(
    response: ChatCompletionResponse,
    mut metadata: LlmMetadata,
) -> Result<(String, LlmMetadata), LlmProviderError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmProviderError::Provider("No choices in response".to_string()))?
        .message
        .content
        .ok_or_else(|| LlmProviderError::Provider("Empty message content".to_string()))?;

    if let Some(usage) = response.usage {
        metadata.tokens_prompt = Some(usage.prompt_tokens);
        metadata.tokens_completion = Some(usage.completion_tokens);
        metadata.tokens_total = Some(usage.total_tokens);
    }

    Ok((content, metadata))
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        let request = ChatCompletionRequest {
            model: &self.model,
            temperature: self.temperature,
            messages: conversation,
        };

        debug!("Sending {} messages to {}", conversation.len(), self.endpoint());

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?
            .error_for_status()
            .map_err(LlmProviderError::Http)?
            .json::<ChatCompletionResponse>()
            .await?;

        let metadata = LlmMetadata {
            provider: "openai".to_string(),
            model: self.model.clone(),
            base_url: Some(self.base_url.clone()),
            attempts: 1,
            ..Default::default()
        };

        extract_reply(response, metadata)
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
