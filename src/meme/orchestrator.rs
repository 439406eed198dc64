

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::catalog::TemplateCatalog;
use super::models::{CaptionSet, GeneratedMeme, Template};
use super::render::ImageRenderer;
use crate::core::error::{MemeError, Result};
use crate::llm::prompt::{
    build_caption_prompt, build_fixed_template_prompt, build_selection_prompt, SYSTEM_PROMPT,
};
use crate::llm::providers::base::{ChatMessage, LlmProvider};
use crate::llm::reply::parse_reply;
use crate::store::{MemeStore, NewMemeRecord};


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerateRequest {
    pub thought: String,
    pub location: String,
    pub template_id: Option<String>,
    pub ip_address: String,
}

struct Selection {
    template: Template,
    conversation: Vec<ChatMessage>,
    explanation: String,
}


pub struct MemeOrchestrator {
    llm: Arc<dyn LlmProvider>,
    catalog: Arc<dyn TemplateCatalog>,
    renderer: Arc<dyn ImageRenderer>,
    store: Arc<dyn MemeStore>,
}

impl MemeOrchestrator {
    pub fn new(
        llm: Arc<dyn LlmProvider>,
        catalog: Arc<dyn TemplateCatalog>,
        renderer: Arc<dyn ImageRenderer>,
        store: Arc<dyn MemeStore>,
    ) -> Self {
        info!(
            "MemeOrchestrator initialized: provider={}, model={}",
            llm.provider_name(),
            llm.model_name()
        );
        Self { llm, catalog, renderer, store }
    }

    pub fn store(&self) -> &Arc<dyn MemeStore> {
        &self.store
    }


    pub async fn generate(&self, request: &GenerateRequest) -> Result<GeneratedMeme> {
        debug!(
            "Generating meme: thought='{}', location={}, template={:?}",
            crate::log_preview(&request.thought, 50),
            request.location,
            request.template_id
        );

        let templates = self.catalog.list_templates().await?;
        if templates.is_empty() {
            return Err(MemeError::Transport("Error: Unable to fetch meme list".to_string()));
        }

        let Selection { template, mut conversation, explanation } = match &request.template_id {
            Some(id) => Self::fixed_template(&templates, id, request)?,
            None => self.select_template(&templates, request).await?,
        };

        conversation.push(ChatMessage::user(build_caption_prompt(template.box_count)));
        let (caption_text, metadata) = self.llm.complete(&conversation).await?;
        debug!(
            "Caption round done (attempts={}, tokens={:?})",
            metadata.attempts, metadata.tokens_total
        );

        let reply = parse_reply(&caption_text);
        if reply.is_empty() {
            warn!("Caption reply had no fields: {}", crate::log_preview(&caption_text, 200));
            return Err(MemeError::Parse(
                "Failed to parse caption text from OpenAI response.".to_string(),
            ));
        }
        let captions = CaptionSet::from_reply(&reply, template.box_count);

        let image_url = self.renderer.render(&template.id, &captions).await?;
        info!("Rendered template {} ({}) -> {}", template.id, template.name, image_url);

        let mut warnings = Vec::new();

        let location_id = match self.store.find_location(&request.location).await {
            Ok(location) => location.map(|l| l.id),
            Err(e) => {
                warn!("Location lookup failed for {}: {}", request.location, e);
                warnings.push(format!("Error looking up location: {e}"));
                None
            }
        };

        let record = NewMemeRecord {
            thought: request.thought.clone(),
            location: request.location.clone(),
            location_id,
            meme_url: image_url.clone(),
            explanation: explanation.clone(),
            ip_address: request.ip_address.clone(),
        };
        let record_id = match self.store.add_meme(record).await {
            Ok(stored) => Some(stored.id),
            Err(e) => {
                warn!("Failed to store meme record: {}", e);
                warnings.push(format!("Error storing meme: {e}"));
                None
            }
        };

        Ok(GeneratedMeme {
            image_url,
            template_id: template.id,
            template_name: template.name,
            explanation,
            record_id,
            warnings,
        })
    }

    async fn select_template(
        &self,
        templates: &[Template],
        request: &GenerateRequest,
    ) -> Result<Selection> {
        let mut conversation = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_selection_prompt(&request.thought, &request.location, templates)),
        ];

        let (selection_text, _metadata) = self.llm.complete(&conversation).await?;
        let reply = parse_reply(&selection_text);
        if reply.is_empty() {
            warn!("Selection reply had no fields: {}", crate::log_preview(&selection_text, 200));
            return Err(MemeError::Parse("Failed to parse OpenAI response.".to_string()));
        }

        let meme_id = reply.non_empty("meme_id").ok_or_else(|| {
            MemeError::Lookup("Failed to retrieve meme_id from OpenAI response.".to_string())
        })?;
        let template = find_template(templates, meme_id)?;
        let explanation = reply.get("explanation").unwrap_or_default().to_string();

        info!("Model selected template {} ({})", template.id, template.name);

        conversation.push(ChatMessage::assistant(selection_text.clone()));
        Ok(Selection { template, conversation, explanation })
    }

    fn fixed_template(templates: &[Template], id: &str, request: &GenerateRequest) -> Result<Selection> {
        let template = find_template(templates, id)?;
        let conversation = vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_fixed_template_prompt(&request.thought, &request.location, &template)),
        ];
        Ok(Selection { template, conversation, explanation: String::new() })
    }
}

fn find_template(templates: &[Template], id: &str) -> Result<Template> {
    templates
        .iter()
        .find(|t| t.id == id)
        .cloned()
        .ok_or_else(|| MemeError::Lookup(format!("Meme with ID {id} not found in meme list")))
}
