

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::error::{MemeError, Result};
use crate::{
    DEFAULT_CATALOG_LIMIT, DEFAULT_GALLERY_LIMIT, DEFAULT_HELIX_PORT, DEFAULT_IMGFLIP_URL,
    DEFAULT_IP_LOOKUP_URL, DEFAULT_LLM_MODEL, DEFAULT_OPENAI_URL, MAX_RETRY_ATTEMPTS,
    RETRY_DELAY_CEILING_MS, RETRY_DELAY_FLOOR_MS,
};


pub const DEFAULT_CONFIG_FILE: &str = "memegen.toml";


#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MemeConfig {

    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub temperature: f64,


    pub retry_max_attempts: u32,
    pub retry_unit_ms: u64,
    pub retry_min_delay_ms: u64,
    pub retry_max_delay_ms: u64,


    pub imgflip_username: Option<String>,
    pub imgflip_password: Option<String>,
    pub imgflip_base_url: String,
    pub catalog_limit: usize,


    pub helix_host: String,
    pub helix_port: u16,
    pub helix_api_key: Option<String>,
    pub gallery_limit: usize,


    pub timeout: u64,
    pub ip_lookup_url: String,
}

impl MemeConfig {

    pub fn new() -> Self {
        Self {
            openai_api_key: None,
            openai_model: DEFAULT_LLM_MODEL.to_string(),
            openai_base_url: DEFAULT_OPENAI_URL.to_string(),
            temperature: 0.9,

            retry_max_attempts: MAX_RETRY_ATTEMPTS,
            retry_unit_ms: 1_000,
            retry_min_delay_ms: RETRY_DELAY_FLOOR_MS,
            retry_max_delay_ms: RETRY_DELAY_CEILING_MS,

            imgflip_username: None,
            imgflip_password: None,
            imgflip_base_url: DEFAULT_IMGFLIP_URL.to_string(),
            catalog_limit: DEFAULT_CATALOG_LIMIT,

            helix_host: "localhost".to_string(),
            helix_port: DEFAULT_HELIX_PORT,
            helix_api_key: None,
            gallery_limit: DEFAULT_GALLERY_LIMIT,

            timeout: 60,
            ip_lookup_url: DEFAULT_IP_LOOKUP_URL.to_string(),
        }
    }

    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (file, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (Path::new(DEFAULT_CONFIG_FILE).to_path_buf(), false),
        };
        debug!("Loading configuration from {} (required={})", file.display(), required);

        let mut config: Self = config::Config::builder()
            .add_source(config::File::from(file).required(required))
            .add_source(config::Environment::with_prefix("MEMEGEN").try_parsing(true))
            .build()?
            .try_deserialize()?;

        config.apply_env_overrides();

        info!(
            "Configuration loaded: model={}, helix={}, catalog_limit={}",
            config.openai_model,
            config.helix_base_url(),
            config.catalog_limit
        );
        Ok(config)
    }


    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Ok(user) = std::env::var("IMGFLIP_USERNAME") {
            self.imgflip_username = Some(user);
        }
        if let Ok(pass) = std::env::var("IMGFLIP_PASSWORD") {
            self.imgflip_password = Some(pass);
        }
        if let Ok(host) = std::env::var("HELIX_HOST") {
            self.helix_host = host;
        }
        if let Some(port) = std::env::var("HELIX_PORT").ok().and_then(|p| p.parse().ok()) {
            self.helix_port = port;
        }
        if let Ok(key) = std::env::var("HELIX_API_KEY") {
            self.helix_api_key = Some(key);
        }
    }


    pub fn validate(&self) -> Result<()> {
        if self.openai_api_key.as_deref().is_none_or(str::is_empty) {
            return Err(MemeError::Config("OPENAI_API_KEY is not set".to_string()));
        }
        if self.imgflip_username.as_deref().is_none_or(str::is_empty)
            || self.imgflip_password.as_deref().is_none_or(str::is_empty)
        {
            return Err(MemeError::Config(
                "IMGFLIP_USERNAME and IMGFLIP_PASSWORD must both be set".to_string(),
            ));
        }
        for (name, value) in [
            ("openai_base_url", &self.openai_base_url),
            ("imgflip_base_url", &self.imgflip_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| MemeError::Config(format!("{name} is not a valid URL ({value}): {e}")))?;
        }
        if !self.ip_lookup_url.is_empty() {
            url::Url::parse(&self.ip_lookup_url)
                .map_err(|e| MemeError::Config(format!("ip_lookup_url is not a valid URL: {e}")))?;
        }
        if !(1..=MAX_RETRY_ATTEMPTS).contains(&self.retry_max_attempts) {
            return Err(MemeError::Config(format!(
                "retry_max_attempts must be between 1 and {MAX_RETRY_ATTEMPTS}, got {}",
                self.retry_max_attempts
            )));
        }
        if self.retry_min_delay_ms < RETRY_DELAY_FLOOR_MS {
            return Err(MemeError::Config(format!(
                "retry_min_delay_ms must be at least {RETRY_DELAY_FLOOR_MS}, got {}",
                self.retry_min_delay_ms
            )));
        }
        if self.retry_max_delay_ms > RETRY_DELAY_CEILING_MS {
            return Err(MemeError::Config(format!(
                "retry_max_delay_ms must be at most {RETRY_DELAY_CEILING_MS}, got {}",
                self.retry_max_delay_ms
            )));
        }
        if self.retry_min_delay_ms > self.retry_max_delay_ms {
            return Err(MemeError::Config(format!(
                "retry_min_delay_ms ({}) exceeds retry_max_delay_ms ({})",
                self.retry_min_delay_ms, self.retry_max_delay_ms
            )));
        }
        if self.catalog_limit == 0 {
            return Err(MemeError::Config("catalog_limit must be at least 1".to_string()));
        }
        Ok(())
    }


    pub fn helix_base_url(&self) -> String {
        format!("http://{}:{}", self.helix_host, self.helix_port)
    }


    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for MemeConfig {
    fn default() -> Self {
        Self::new()
    }
}
