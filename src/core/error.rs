

use thiserror::Error;

use crate::llm::providers::base::LlmProviderError;
use crate::meme::catalog::CatalogError;
use crate::meme::render::RenderError;
use crate::store::StoreError;


#[derive(Error, Debug)]
pub enum MemeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Lookup(String),

    #[error("Failed to generate meme. {0}")]
    Render(String),

    #[error("{0}")]
    Persistence(String),
}

impl MemeError {

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<LlmProviderError> for MemeError {
    fn from(err: LlmProviderError) -> Self {
        match err {
            LlmProviderError::Json(e) => {
                MemeError::Parse(format!("Failed to parse completion response: {e}"))
            }
            other => MemeError::Transport(format!("Failed to get response from OpenAI API: {other}")),
        }
    }
}

impl From<CatalogError> for MemeError {
    fn from(err: CatalogError) -> Self {
        MemeError::Transport(format!("Error: Unable to fetch meme list ({err})"))
    }
}

impl From<RenderError> for MemeError {
    fn from(err: RenderError) -> Self {
        match err {
            RenderError::Rejected(message) => MemeError::Render(message),
            other => MemeError::Transport(format!("Failed to generate meme. {other}")),
        }
    }
}

impl From<StoreError> for MemeError {
    fn from(err: StoreError) -> Self {
        MemeError::Persistence(err.to_string())
    }
}

impl From<config::ConfigError> for MemeError {
    fn from(err: config::ConfigError) -> Self {
        MemeError::Config(err.to_string())
    }
}


pub type Result<T> = std::result::Result<T, MemeError>;
