

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::models::Template;
use crate::core::config::MemeConfig;


#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog service error: {0}")]
    Service(String),
}


#[async_trait]
pub trait TemplateCatalog: Send + Sync {

    async fn list_templates(&self) -> Result<Vec<Template>, CatalogError>;
}

#[derive(Debug, Deserialize)]
struct CatalogResponse {
    success: bool,
    data: Option<CatalogData>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CatalogData {
    memes: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogEntry {
    id: String,
    name: String,
    box_count: usize,
}

fn into_templates(response: CatalogResponse, limit: usize) -> Result<Vec<Template>, CatalogError> {
    if !response.success {
        return Err(CatalogError::Service(
            response.error_message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let entries = response.data.map(|d| d.memes).unwrap_or_default();
    let templates = entries
        .into_iter()
        .take(limit)
        .filter(|entry| {
            if entry.box_count == 0 {
                debug!("Skipping template {} without caption boxes", entry.id);
            }
            entry.box_count > 0
        })
        .map(|entry| Template { id: entry.id, name: entry.name, box_count: entry.box_count })
        .collect();

    Ok(templates)
}


pub struct ImgflipCatalog {
    base_url: String,
    limit: usize,
    client: Client,
}

impl ImgflipCatalog {
    pub fn new(base_url: impl Into<String>, limit: usize, client: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        info!("ImgflipCatalog initialized (base_url={}, limit={})", base_url, limit);
        Self { base_url, limit, client }
    }

    pub fn from_config(config: &MemeConfig, client: Client) -> Self {
        Self::new(config.imgflip_base_url.clone(), config.catalog_limit, client)
    }
}

#[async_trait]
impl TemplateCatalog for ImgflipCatalog {
    async fn list_templates(&self) -> Result<Vec<Template>, CatalogError> {
        let url = format!("{}/get_memes", self.base_url);
        debug!("Fetching template catalog from {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json::<CatalogResponse>()
            .await
            .map_err(|e| {
                warn!("Error fetching meme list: {}", e);
                CatalogError::Http(e)
            })?;

        let templates = into_templates(response, self.limit)?;
        debug!("Catalog returned {} templates", templates.len());
        Ok(templates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog_json(count: usize) -> String {
        let memes = (0..count)
            .map(|i| format!(r#"{{"id": "{i}", "name": "Meme {i}", "url": "https://i.imgflip.com/{i}.jpg", "width": 500, "height": 500, "box_count": {}, "captions": 1000}}"#, i % 4 + 1))
            .collect::<Vec<_>>()
            .join(",");
        format!(r#"{{"success": true, "data": {{"memes": [{memes}]}}}}"#)
    }

    #[test]
    fn test_never_more_than_limit() {
        for count in [0, 1, 99, 100, 101, 250] {
            let response: CatalogResponse = serde_json::from_str(&catalog_json(count)).unwrap();
            let templates = into_templates(response, 100).unwrap();
            assert_eq!(templates.len(), count.min(100), "count={count}");
        }
    }

    #[test]
    fn test_service_order_is_preserved() {
        let response: CatalogResponse = serde_json::from_str(&catalog_json(5)).unwrap();
        let ids: Vec<_> = into_templates(response, 100)
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["0", "1", "2", "3", "4"]);
    }

    #[test]
    fn test_maps_name_id_and_box_count() {
        let response: CatalogResponse = serde_json::from_str(&catalog_json(3)).unwrap();
        let templates = into_templates(response, 100).unwrap();
        assert_eq!(
            templates[2],
            Template { id: "2".to_string(), name: "Meme 2".to_string(), box_count: 3 }
        );
    }

    #[test]
    fn test_zero_box_entries_are_dropped() {
        let response: CatalogResponse = serde_json::from_str(
            r#"{"success": true, "data": {"memes": [
                {"id": "1", "name": "Blank", "box_count": 0},
                {"id": "2", "name": "Drake", "box_count": 2}
            ]}}"#,
        )
        .unwrap();
        let templates = into_templates(response, 100).unwrap();
        assert_eq!(templates.len(), 1);
        assert_eq!(templates[0].id, "2");
    }

    #[test]
    fn test_unsuccessful_response_is_error() {
        let response: CatalogResponse =
            serde_json::from_str(r#"{"success": false, "error_message": "rate limited"}"#).unwrap();
        assert!(matches!(into_templates(response, 100), Err(CatalogError::Service(m)) if m == "rate limited"));
    }
}
