

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::CaptionSet;
use crate::core::config::MemeConfig;


#[derive(Error, Debug)]
pub enum RenderError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),

    #[error("Render response missing image URL")]
    MissingUrl,
}


#[async_trait]
pub trait ImageRenderer: Send + Sync {

    async fn render(&self, template_id: &str, captions: &CaptionSet) -> Result<String, RenderError>;
}

#[derive(Debug, Deserialize)]
struct CaptionResponse {
    success: bool,
    data: Option<CaptionData>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CaptionData {
    url: Option<String>,
}

fn image_url(response: CaptionResponse) -> Result<String, RenderError> {
    if !response.success {
        return Err(RenderError::Rejected(response.error_message.unwrap_or_default()));
    }
    response.data.and_then(|d| d.url).ok_or(RenderError::MissingUrl)
}


pub struct ImgflipRenderer {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl ImgflipRenderer {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("ImgflipRenderer initialized (base_url={})", base_url);
        Self { base_url, username: username.into(), password: password.into(), client }
    }

    pub fn from_config(config: &MemeConfig, client: Client) -> Self {
        Self::new(
            config.imgflip_base_url.clone(),
            config.imgflip_username.clone().unwrap_or_default(),
            config.imgflip_password.clone().unwrap_or_default(),
            client,
        )
    }


    pub fn form_params(&self, template_id: &str, captions: &CaptionSet) -> Vec<(String, String)> {
        let mut params = vec![
            ("template_id".to_string(), template_id.to_string()),
            ("username".to_string(), self.username.clone()),
            ("password".to_string(), self.password.clone()),
        ];
        params.extend(captions.to_form_fields());
        params
    }
}

#[async_trait]
impl ImageRenderer for ImgflipRenderer {
    async fn render(&self, template_id: &str, captions: &CaptionSet) -> Result<String, RenderError> {
        let url = format!("{}/caption_image", self.base_url);
        let params = self.form_params(template_id, captions);
        debug!("Rendering template {} ({} form fields)", template_id, params.len());

        let response = self
            .client
            .post(&url)
            .form(&params)
            .send()
            .await?
            .json::<CaptionResponse>()
            .await?;

        image_url(response).inspect_err(|e| warn!("Render failed for template {}: {}", template_id, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::reply::parse_reply;

    fn renderer() -> ImgflipRenderer {
        ImgflipRenderer::new("https://api.imgflip.com/", "user", "secret", Client::new())
    }

    #[test]
    fn test_two_box_params_match_expected_form() {
        let captions = CaptionSet::from_reply(&parse_reply("text0: Before coffee\ntext1: After coffee"), 2);
        let params = renderer().form_params("61579", &captions);
        assert_eq!(
            params,
            vec![
                ("template_id".to_string(), "61579".to_string()),
                ("username".to_string(), "user".to_string()),
                ("password".to_string(), "secret".to_string()),
                ("text0".to_string(), "Before coffee".to_string()),
                ("text1".to_string(), "After coffee".to_string()),
            ]
        );
    }

    #[test]
    fn test_multi_box_params_have_no_flat_fields() {
        let captions = CaptionSet::new(vec!["a".into(), "b".into(), "c".into()]);
        let params = renderer().form_params("87743020", &captions);
        let keys: Vec<_> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(
            keys,
            vec!["template_id", "username", "password", "boxes[0][text]", "boxes[1][text]", "boxes[2][text]"]
        );
    }

    #[test]
    fn test_success_response_yields_url() {
        let response: CaptionResponse = serde_json::from_str(
            r#"{"success": true, "data": {"url": "https://i.imgflip.com/abc.jpg", "page_url": "https://imgflip.com/i/abc"}}"#,
        )
        .unwrap();
        assert_eq!(image_url(response).unwrap(), "https://i.imgflip.com/abc.jpg");
    }

    #[test]
    fn test_failure_response_carries_service_message() {
        let response: CaptionResponse =
            serde_json::from_str(r#"{"success": false, "error_message": "invalid template"}"#).unwrap();
        match image_url(response) {
            Err(RenderError::Rejected(message)) => assert_eq!(message, "invalid template"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_success_without_url_is_error() {
        let response: CaptionResponse = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(matches!(image_url(response), Err(RenderError::MissingUrl)));
    }
}
