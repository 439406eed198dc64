

use async_trait::async_trait;
use thiserror::Error;

pub mod helix;
pub mod memory;
pub mod models;

pub use helix::HelixMemeStore;
pub use memory::MemoryStore;
pub use models::{Location, MemeRecord, NewMemeRecord};


#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),
    #[error("Failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },
}

impl From<crate::db::HelixClientError> for StoreError {
    fn from(e: crate::db::HelixClientError) -> Self {
        StoreError::Database(e.to_string())
    }
}


#[async_trait]
pub trait MemeStore: Send + Sync {

    async fn find_location(&self, label: &str) -> Result<Option<Location>, StoreError>;

    async fn add_location(&self, label: &str) -> Result<Location, StoreError>;

    async fn update_location_ip(&self, label: &str, ip_address: &str) -> Result<bool, StoreError>;

    async fn add_meme(&self, record: NewMemeRecord) -> Result<MemeRecord, StoreError>;

    async fn recent_memes(&self, limit: usize) -> Result<Vec<MemeRecord>, StoreError>;

    async fn all_locations(&self) -> Result<Vec<String>, StoreError>;
}
