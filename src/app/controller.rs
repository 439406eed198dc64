

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};
use tracing::{debug, info, warn};

use super::ip::IpResolver;
use super::locations::{load_choices, resolve_label, LocationChoices};
use crate::core::session::SessionState;
use crate::meme::orchestrator::{GenerateRequest, MemeOrchestrator};


#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Intent {
    GenerateNew,
    KeepTemplate,
    ChangeTemplate,
    Clear,
}

impl Intent {
    pub fn describe(&self) -> &'static str {
        match self {
            Intent::GenerateNew => "generate a meme for a new thought",
            Intent::KeepTemplate => "same template, new words",
            Intent::ChangeTemplate => "same thought, different template",
            Intent::Clear => "forget the current meme",
        }
    }
}


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub thought: String,
    pub selected_location: String,
    pub custom_location: String,
}


#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusKind {
    Success,
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub kind: StatusKind,
    pub message: String,
}

impl Status {
    fn success(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Success, message: message.into() }
    }

    fn info(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Info, message: message.into() }
    }

    fn error(message: impl Into<String>) -> Self {
        Self { kind: StatusKind::Error, message: message.into() }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Preview {
    pub image_url: String,
    pub thought: String,
    pub location: String,
    pub template_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryItem {
    pub image_url: String,
    pub caption: String,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: Status,
    pub notices: Vec<String>,
    pub warnings: Vec<String>,
    pub preview: Option<Preview>,
    pub gallery: Vec<GalleryItem>,
}

#[derive(Default)]
struct Feedback {
    notices: Vec<String>,
    warnings: Vec<String>,
}


pub struct MemeApp {
    orchestrator: Arc<MemeOrchestrator>,
    ip: Arc<dyn IpResolver>,
    gallery_limit: usize,
    session: SessionState,
}

impl MemeApp {
    pub fn new(orchestrator: Arc<MemeOrchestrator>, ip: Arc<dyn IpResolver>, gallery_limit: usize) -> Self {
        Self { orchestrator, ip, gallery_limit, session: SessionState::new() }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub async fn location_choices(&self) -> (LocationChoices, Option<String>) {
        let mut rng = StdRng::from_entropy();
        load_choices(self.orchestrator.store().as_ref(), &mut rng).await
    }

    pub async fn handle(&mut self, intent: Intent, form: &FormInput) -> Outcome {
        debug!("Handling intent {}", intent);
        let mut feedback = Feedback::default();

        let (status, preview) = match intent {
            Intent::GenerateNew => self.generate_new(form, &mut feedback).await,
            Intent::KeepTemplate => self.regenerate(true, &mut feedback).await,
            Intent::ChangeTemplate => self.regenerate(false, &mut feedback).await,
            Intent::Clear => {
                self.session.clear();
                (Status::info("Cleared."), None)
            }
        };

        let gallery = self.gallery(&mut feedback).await;
        Outcome {
            status,
            notices: feedback.notices,
            warnings: feedback.warnings,
            preview,
            gallery,
        }
    }

    pub async fn gallery_only(&self) -> (Vec<GalleryItem>, Vec<String>) {
        let mut feedback = Feedback::default();
        let gallery = self.gallery(&mut feedback).await;
        (gallery, feedback.warnings)
    }

    async fn generate_new(&mut self, form: &FormInput, feedback: &mut Feedback) -> (Status, Option<Preview>) {
        let thought = form.thought.trim();
        if thought.is_empty() {
            return (Status::error("Please enter your thought."), None);
        }

        let label = match resolve_label(&form.selected_location, &form.custom_location) {
            Ok(label) => label,
            Err(e) => return (Status::error(e.user_message()), None),
        };

        self.ensure_location(&label, feedback).await;
        self.run(thought.to_string(), label, None, feedback).await
    }

    async fn regenerate(&mut self, keep_template: bool, feedback: &mut Feedback) -> (Status, Option<Preview>) {
        let (Some(thought), Some(location)) = (self.session.thought.clone(), self.session.location.clone())
        else {
            return (Status::error("Generate a meme first."), None);
        };

        let template_id = if keep_template {
            match self.session.template_id.clone() {
                Some(id) => Some(id),
                None => return (Status::error("Generate a meme first."), None),
            }
        } else {
            None
        };

        self.run(thought, location, template_id, feedback).await
    }

    // Check-then-add; two sessions may race on the same new label.
    async fn ensure_location(&self, label: &str, feedback: &mut Feedback) {
        let store = self.orchestrator.store();
        match store.all_locations().await {
            Ok(known) if known.iter().any(|l| l == label) => {}
            Ok(_) => match store.add_location(label).await {
                Ok(_) => {
                    info!("Added new location {}", label);
                    feedback.notices.push(format!("Added new location: {label}"));
                }
                Err(e) => {
                    warn!("Failed to add location {}: {}", label, e);
                    feedback.warnings.push(format!("Error adding new location: {e}"));
                }
            },
            Err(e) => {
                warn!("Failed to list locations: {}", e);
                feedback.warnings.push(format!("Error fetching locations: {e}"));
            }
        }
    }

    async fn run(
        &mut self,
        thought: String,
        location: String,
        template_id: Option<String>,
        feedback: &mut Feedback,
    ) -> (Status, Option<Preview>) {
        let ip_address = self.ip.client_ip().await;
        let request = GenerateRequest {
            thought,
            location,
            template_id,
            ip_address,
        };

        let meme = match self.orchestrator.generate(&request).await {
            Ok(meme) => meme,
            Err(e) => {
                warn!("Generation failed: {}", e);
                return (Status::error(e.user_message()), None);
            }
        };
        feedback.warnings.extend(meme.warnings.iter().cloned());

        match self
            .orchestrator
            .store()
            .update_location_ip(&request.location, &request.ip_address)
            .await
        {
            Ok(true) => {}
            Ok(false) => debug!("No location named {} to update", request.location),
            Err(e) => {
                warn!("Failed to update location IP: {}", e);
                feedback
                    .warnings
                    .push(format!("Error updating location with IP address: {e}"));
            }
        }

        self.session.remember(
            meme.template_id.clone(),
            request.thought.clone(),
            request.location.clone(),
            meme.record_id.clone(),
        );

        let preview = Preview {
            image_url: meme.image_url,
            thought: request.thought,
            location: request.location,
            template_name: meme.template_name,
        };
        (Status::success("Meme generated successfully."), Some(preview))
    }

    async fn gallery(&self, feedback: &mut Feedback) -> Vec<GalleryItem> {
        match self.orchestrator.store().recent_memes(self.gallery_limit).await {
            Ok(records) => records
                .into_iter()
                .map(|r| GalleryItem { caption: r.caption(), image_url: r.meme_url })
                .collect(),
            Err(e) => {
                warn!("Failed to load gallery: {}", e);
                feedback.warnings.push(format!("Error fetching memes: {e}"));
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ip::StaticIp;
    use crate::app::locations::OTHER_LOCATION;
    use crate::meme::models::Template;
    use crate::store::{MemeStore, MemoryStore, NewMemeRecord};
    use crate::testing::{FlakyStore, RecordingRenderer, ScriptedLlm, StaticCatalog};

    const SELECT_DRAKE: &str = "meme: Drake\nmeme_id: 61579\nexplanation: relatable";
    const SELECT_BUTTONS: &str = "meme: Two Buttons\nmeme_id: 87743020\nexplanation: choices";
    const DRAKE_WORDS: &str = "text0: Before coffee\ntext1: After coffee";

    struct Harness {
        llm: Arc<ScriptedLlm>,
        renderer: Arc<RecordingRenderer>,
        store: Arc<FlakyStore>,
        app: MemeApp,
    }

    fn harness(replies: Vec<&str>, renderer: RecordingRenderer, store: FlakyStore) -> Harness {
        let llm = Arc::new(ScriptedLlm::new(replies));
        let renderer = Arc::new(renderer);
        let store = Arc::new(store);
        let catalog = StaticCatalog::new(vec![
            Template { id: "61579".to_string(), name: "Drake".to_string(), box_count: 2 },
            Template { id: "87743020".to_string(), name: "Two Buttons".to_string(), box_count: 3 },
        ]);
        let orchestrator = MemeOrchestrator::new(llm.clone(), Arc::new(catalog), renderer.clone(), store.clone());
        let app = MemeApp::new(
            Arc::new(orchestrator),
            Arc::new(StaticIp("198.51.100.4".to_string())),
            20,
        );
        Harness { llm, renderer, store, app }
    }

    fn form(thought: &str, selected: &str, custom: &str) -> FormInput {
        FormInput {
            thought: thought.to_string(),
            selected_location: selected.to_string(),
            custom_location: custom.to_string(),
        }
    }

    async fn seeded_store() -> FlakyStore {
        let inner = MemoryStore::with_locations(["Office"]);
        inner
            .add_meme(NewMemeRecord {
                thought: "Mondays".to_string(),
                location: "Office".to_string(),
                meme_url: "https://i.imgflip.com/old.jpg".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();
        FlakyStore::new(inner)
    }

    #[tokio::test]
    async fn test_empty_thought_is_rejected_but_gallery_refreshes() {
        let mut h = harness(vec![], RecordingRenderer::succeeding("unused"), seeded_store().await);

        let outcome = h.app.handle(Intent::GenerateNew, &form("   ", "Office", "")).await;
        assert_eq!(outcome.status, Status::error("Please enter your thought."));
        assert!(outcome.preview.is_none());
        assert!(h.llm.conversations().is_empty());
        assert_eq!(outcome.gallery.len(), 1);
        assert_eq!(outcome.gallery[0].caption, "Mondays (Location: Office)");
    }

    #[tokio::test]
    async fn test_blank_custom_location_is_rejected() {
        let mut h = harness(vec![], RecordingRenderer::succeeding("unused"), seeded_store().await);

        let outcome = h
            .app
            .handle(Intent::GenerateNew, &form("I need coffee", OTHER_LOCATION, " "))
            .await;
        assert_eq!(outcome.status.message, "Please enter a custom location.");
        assert!(h.llm.conversations().is_empty());
        assert_eq!(outcome.gallery.len(), 1);
    }

    #[tokio::test]
    async fn test_generate_new_records_and_remembers() {
        let mut h = harness(
            vec![SELECT_DRAKE, DRAKE_WORDS],
            RecordingRenderer::succeeding("https://i.imgflip.com/coffee.jpg"),
            seeded_store().await,
        );

        let outcome = h.app.handle(Intent::GenerateNew, &form(" I need coffee ", "Office", "")).await;
        assert_eq!(outcome.status, Status::success("Meme generated successfully."));
        assert!(outcome.notices.is_empty());
        assert!(outcome.warnings.is_empty());

        let preview = outcome.preview.unwrap();
        assert_eq!(preview.image_url, "https://i.imgflip.com/coffee.jpg");
        assert_eq!(preview.thought, "I need coffee");
        assert_eq!(preview.location, "Office");

        assert_eq!(outcome.gallery.len(), 2);
        assert_eq!(outcome.gallery[0].caption, "I need coffee (Location: Office)");

        let office = h.store.inner().find_location("Office").await.unwrap().unwrap();
        assert_eq!(office.ip_address, "198.51.100.4");

        let session = h.app.session();
        assert_eq!(session.template_id.as_deref(), Some("61579"));
        assert_eq!(session.thought.as_deref(), Some("I need coffee"));
        assert!(session.record_id.is_some());
    }

    #[tokio::test]
    async fn test_custom_location_is_added_once() {
        let mut h = harness(
            vec![SELECT_DRAKE, DRAKE_WORDS, SELECT_DRAKE, DRAKE_WORDS],
            RecordingRenderer::succeeding("https://i.imgflip.com/r.jpg"),
            seeded_store().await,
        );

        let input = form("I need coffee", OTHER_LOCATION, "Rooftop");
        let first = h.app.handle(Intent::GenerateNew, &input).await;
        assert_eq!(first.notices, vec!["Added new location: Rooftop".to_string()]);

        let second = h.app.handle(Intent::GenerateNew, &input).await;
        assert!(second.notices.is_empty());

        let labels = h.store.inner().all_locations().await.unwrap();
        assert_eq!(labels.iter().filter(|l| l.as_str() == "Rooftop").count(), 1);
    }

    #[tokio::test]
    async fn test_render_failure_reports_message_and_keeps_session() {
        let mut h = harness(
            vec![SELECT_DRAKE, DRAKE_WORDS],
            RecordingRenderer::rejecting("invalid template"),
            seeded_store().await,
        );

        let outcome = h.app.handle(Intent::GenerateNew, &form("I need coffee", "Office", "")).await;
        assert_eq!(outcome.status.kind, StatusKind::Error);
        assert!(outcome.status.message.contains("invalid template"));
        assert!(outcome.preview.is_none());
        assert_eq!(h.store.inner().meme_count().await, 1);
        assert!(!h.app.session().has_meme());
    }

    #[tokio::test]
    async fn test_regenerate_requires_a_previous_meme() {
        let mut h = harness(vec![], RecordingRenderer::succeeding("unused"), seeded_store().await);

        for intent in [Intent::KeepTemplate, Intent::ChangeTemplate] {
            let outcome = h.app.handle(intent, &FormInput::default()).await;
            assert_eq!(outcome.status.message, "Generate a meme first.");
        }
        assert!(h.llm.conversations().is_empty());
    }

    #[tokio::test]
    async fn test_keep_and_change_template() {
        let mut h = harness(
            vec![
                SELECT_DRAKE,
                DRAKE_WORDS,
                "text0: Decaf\ntext1: Espresso",
                SELECT_BUTTONS,
                "text0: Tea\ntext1: Coffee\ntext2: Me",
            ],
            RecordingRenderer::succeeding("https://i.imgflip.com/k.jpg"),
            seeded_store().await,
        );

        h.app.handle(Intent::GenerateNew, &form("I need coffee", "Office", "")).await;
        assert_eq!(h.llm.conversations().len(), 2);

        let kept = h.app.handle(Intent::KeepTemplate, &FormInput::default()).await;
        assert_eq!(kept.status.kind, StatusKind::Success);
        assert_eq!(h.llm.conversations().len(), 3);
        assert_eq!(h.renderer.calls()[1].0, "61579");

        let changed = h.app.handle(Intent::ChangeTemplate, &FormInput::default()).await;
        assert_eq!(changed.status.kind, StatusKind::Success);
        assert_eq!(changed.preview.unwrap().template_name, "Two Buttons");
        assert_eq!(h.app.session().template_id.as_deref(), Some("87743020"));
        assert_eq!(h.store.inner().meme_count().await, 4);
    }

    #[tokio::test]
    async fn test_clear_resets_session() {
        let mut h = harness(
            vec![SELECT_DRAKE, DRAKE_WORDS],
            RecordingRenderer::succeeding("https://i.imgflip.com/c.jpg"),
            seeded_store().await,
        );
        h.app.handle(Intent::GenerateNew, &form("I need coffee", "Office", "")).await;
        assert!(h.app.session().has_meme());

        let outcome = h.app.handle(Intent::Clear, &FormInput::default()).await;
        assert_eq!(outcome.status, Status::info("Cleared."));
        assert_eq!(h.app.session(), &SessionState::default());
        assert_eq!(outcome.gallery.len(), 2);
    }

    #[tokio::test]
    async fn test_ip_update_failure_is_only_a_warning() {
        let mut store = seeded_store().await;
        store.fail_update_ip = true;
        let mut h = harness(
            vec![SELECT_DRAKE, DRAKE_WORDS],
            RecordingRenderer::succeeding("https://i.imgflip.com/w.jpg"),
            store,
        );

        let outcome = h.app.handle(Intent::GenerateNew, &form("I need coffee", "Office", "")).await;
        assert_eq!(outcome.status.kind, StatusKind::Success);
        assert_eq!(outcome.warnings.len(), 1);
        assert!(outcome.warnings[0].starts_with("Error updating location with IP address"));
        assert_eq!(h.store.inner().meme_count().await, 2);
    }

    #[test]
    fn test_intent_names() {
        assert_eq!(Intent::KeepTemplate.as_ref(), "keep-template");
        assert_eq!("change-template".parse::<Intent>().unwrap(), Intent::ChangeTemplate);
        assert!("explode".parse::<Intent>().is_err());
    }
}
