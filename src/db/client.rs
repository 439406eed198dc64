

use std::sync::atomic::{AtomicBool, Ordering};

use helix_rs::{HelixDB, HelixDBClient};
use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::config::MemeConfig;


#[derive(Debug, Error)]
pub enum HelixClientError {
    #[error("Query {query} failed: {message}")]
    Query { query: String, message: String },
}


pub struct HelixClient {

    inner: HelixDB,

    is_connected: AtomicBool,

    base_url: String,
}

impl HelixClient {

    pub fn new(host: &str, port: u16, api_key: Option<&str>) -> Self {
        let endpoint = format!("http://{}", host);
        let base_url = format!("http://{}:{}", host, port);

        let inner = <HelixDB as HelixDBClient>::new(Some(&endpoint), Some(port), api_key);

        info!("HelixClient created for {}", base_url);

        Self {
            inner,
            is_connected: AtomicBool::new(false),
            base_url,
        }
    }


    pub fn from_config(config: &MemeConfig) -> Self {
        Self::new(&config.helix_host, config.helix_port, config.helix_api_key.as_deref())
    }


    pub async fn execute_query<T, P>(&self, query_name: &str, params: &P) -> Result<T, HelixClientError>
    where
        T: DeserializeOwned,
        P: Serialize + Sync,
    {
        debug!("Executing query: {}", query_name);

        let result = self
            .inner
            .query::<P, T>(query_name, params)
            .await
            .map_err(|e| HelixClientError::Query {
                query: query_name.to_string(),
                message: e.to_string(),
            })?;

        self.is_connected.store(true, Ordering::Relaxed);
        debug!("Query {} succeeded", query_name);
        Ok(result)
    }


    pub async fn queries_deployed(&self) -> Result<bool, HelixClientError> {
        let probe = self
            .execute_query::<serde_json::Value, _>("getAllLocations", &serde_json::json!({}))
            .await;

        match probe {
            Ok(_) => Ok(true),
            Err(HelixClientError::Query { message, .. }) if is_missing_query(&message) => {
                info!("HelixDB at {} is up but has no memegen queries", self.base_url);
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }


    pub fn is_connected(&self) -> bool {
        self.is_connected.load(Ordering::Relaxed)
    }


    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

fn is_missing_query(message: &str) -> bool {
    let message = message.to_lowercase();
    message.contains("404") || message.contains("couldn't find") || message.contains("not found")
}
