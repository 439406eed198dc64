use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::providers::base::{ChatMessage, LlmMetadata, LlmProvider, LlmProviderError};
use crate::meme::catalog::{CatalogError, TemplateCatalog};
use crate::meme::models::{CaptionSet, Template};
use crate::meme::render::{ImageRenderer, RenderError};
use crate::store::{Location, MemeRecord, MemeStore, MemoryStore, NewMemeRecord, StoreError};

pub struct ScriptedLlm {
    replies: Mutex<VecDeque<String>>,
    seen: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedLlm {
    pub fn new(replies: Vec<&str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(str::to_string).collect()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn conversations(&self) -> Vec<Vec<ChatMessage>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedLlm {
    async fn complete(
        &self,
        conversation: &[ChatMessage],
    ) -> Result<(String, LlmMetadata), LlmProviderError> {
        self.seen.lock().unwrap().push(conversation.to_vec());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| LlmProviderError::Provider("no scripted reply left".to_string()))?;
        let metadata = LlmMetadata {
            provider: "scripted".to_string(),
            model: "scripted".to_string(),
            attempts: 1,
            ..Default::default()
        };
        Ok((reply, metadata))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub struct StaticCatalog {
    templates: Option<Vec<Template>>,
}

impl StaticCatalog {
    pub fn new(templates: Vec<Template>) -> Self {
        Self { templates: Some(templates) }
    }

    pub fn failing() -> Self {
        Self { templates: None }
    }
}

#[async_trait]
impl TemplateCatalog for StaticCatalog {
    async fn list_templates(&self) -> Result<Vec<Template>, CatalogError> {
        self.templates
            .clone()
            .ok_or_else(|| CatalogError::Service("catalog offline".to_string()))
    }
}

pub struct RecordingRenderer {
    outcome: Result<String, String>,
    calls: Mutex<Vec<(String, CaptionSet)>>,
}

impl RecordingRenderer {
    pub fn succeeding(url: &str) -> Self {
        Self { outcome: Ok(url.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn rejecting(message: &str) -> Self {
        Self { outcome: Err(message.to_string()), calls: Mutex::new(Vec::new()) }
    }

    pub fn calls(&self) -> Vec<(String, CaptionSet)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageRenderer for RecordingRenderer {
    async fn render(&self, template_id: &str, captions: &CaptionSet) -> Result<String, RenderError> {
        self.calls
            .lock()
            .unwrap()
            .push((template_id.to_string(), captions.clone()));
        self.outcome.clone().map_err(RenderError::Rejected)
    }
}

#[derive(Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_find_location: bool,
    pub fail_add_location: bool,
    pub fail_update_ip: bool,
    pub fail_add_meme: bool,
    pub fail_recent_memes: bool,
    pub fail_all_locations: bool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self { inner, ..Default::default() }
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }

    fn check(failing: bool, operation: &str) -> Result<(), StoreError> {
        if failing {
            Err(StoreError::Database(format!("{operation} unavailable")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl MemeStore for FlakyStore {
    async fn find_location(&self, label: &str) -> Result<Option<Location>, StoreError> {
        Self::check(self.fail_find_location, "find_location")?;
        self.inner.find_location(label).await
    }

    async fn add_location(&self, label: &str) -> Result<Location, StoreError> {
        Self::check(self.fail_add_location, "add_location")?;
        self.inner.add_location(label).await
    }

    async fn update_location_ip(&self, label: &str, ip_address: &str) -> Result<bool, StoreError> {
        Self::check(self.fail_update_ip, "update_location_ip")?;
        self.inner.update_location_ip(label, ip_address).await
    }

    async fn add_meme(&self, record: NewMemeRecord) -> Result<MemeRecord, StoreError> {
        Self::check(self.fail_add_meme, "add_meme")?;
        self.inner.add_meme(record).await
    }

    async fn recent_memes(&self, limit: usize) -> Result<Vec<MemeRecord>, StoreError> {
        Self::check(self.fail_recent_memes, "recent_memes")?;
        self.inner.recent_memes(limit).await
    }

    async fn all_locations(&self) -> Result<Vec<String>, StoreError> {
        Self::check(self.fail_all_locations, "all_locations")?;
        self.inner.all_locations().await
    }
}
