

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::core::config::MemeConfig;


pub const UNKNOWN_IP: &str = "Unknown IP";


#[async_trait]
pub trait IpResolver: Send + Sync {
    async fn client_ip(&self) -> String;
}

#[derive(Debug, Deserialize)]
struct IpResponse {
    ip: String,
}


pub struct IpifyResolver {
    client: Client,
    url: Option<String>,
}

impl IpifyResolver {
    pub fn new(url: impl Into<String>, client: Client) -> Self {
        let url = url.into();
        Self { client, url: Some(url).filter(|u| !u.trim().is_empty()) }
    }

    pub fn from_config(config: &MemeConfig, client: Client) -> Self {
        Self::new(config.ip_lookup_url.clone(), client)
    }

    async fn lookup(&self, url: &str) -> Result<String, reqwest::Error> {
        let response: IpResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(response.ip)
    }
}

#[async_trait]
impl IpResolver for IpifyResolver {
    async fn client_ip(&self) -> String {
        let Some(url) = self.url.as_deref() else {
            return UNKNOWN_IP.to_string();
        };

        match self.lookup(url).await {
            Ok(ip) if !ip.trim().is_empty() => {
                debug!("Client IP resolved");
                ip.trim().to_string()
            }
            Ok(_) => UNKNOWN_IP.to_string(),
            Err(e) => {
                warn!("IP lookup failed: {}", e);
                UNKNOWN_IP.to_string()
            }
        }
    }
}


#[derive(Debug, Clone)]
pub struct StaticIp(pub String);

impl Default for StaticIp {
    fn default() -> Self {
        Self(UNKNOWN_IP.to_string())
    }
}

#[async_trait]
impl IpResolver for StaticIp {
    async fn client_ip(&self) -> String {
        self.0.clone()
    }
}
