

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::models::{Location, MemeRecord, NewMemeRecord};
use super::{MemeStore, StoreError};

#[derive(Default)]
struct Collections {
    locations: Vec<Location>,
    memes: Vec<MemeRecord>,
    last_timestamp: Option<DateTime<Utc>>,
}

fn new_location(label: &str) -> Location {
    Location {
        id: Uuid::new_v4().to_string(),
        label: label.to_string(),
        ip_address: String::new(),
    }
}


#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_locations<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let locations = labels.into_iter().map(|label| new_location(label.as_ref())).collect();
        Self { inner: RwLock::new(Collections { locations, ..Default::default() }) }
    }

    pub async fn meme_count(&self) -> usize {
        self.inner.read().await.memes.len()
    }
}

#[async_trait]
impl MemeStore for MemoryStore {
    async fn find_location(&self, label: &str) -> Result<Option<Location>, StoreError> {
        let collections = self.inner.read().await;
        Ok(collections.locations.iter().find(|l| l.label == label).cloned())
    }

    async fn add_location(&self, label: &str) -> Result<Location, StoreError> {
        let location = new_location(label);
        self.inner.write().await.locations.push(location.clone());
        debug!("Added location {}", label);
        Ok(location)
    }

    async fn update_location_ip(&self, label: &str, ip_address: &str) -> Result<bool, StoreError> {
        let mut collections = self.inner.write().await;
        match collections.locations.iter_mut().find(|l| l.label == label) {
            Some(location) => {
                location.ip_address = ip_address.to_string();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn add_meme(&self, record: NewMemeRecord) -> Result<MemeRecord, StoreError> {
        let mut collections = self.inner.write().await;

        let now = Utc::now();
        let timestamp = match collections.last_timestamp {
            Some(last) if last > now => last,
            _ => now,
        };
        collections.last_timestamp = Some(timestamp);

        let stored = MemeRecord {
            id: Uuid::new_v4().to_string(),
            thought: record.thought,
            location: record.location,
            location_id: record.location_id,
            meme_url: record.meme_url,
            explanation: record.explanation,
            ip_address: record.ip_address,
            timestamp,
        };
        collections.memes.push(stored.clone());
        Ok(stored)
    }

    async fn recent_memes(&self, limit: usize) -> Result<Vec<MemeRecord>, StoreError> {
        let collections = self.inner.read().await;
        // Insertion order breaks timestamp ties.
        Ok(collections.memes.iter().rev().take(limit).cloned().collect())
    }

    async fn all_locations(&self) -> Result<Vec<String>, StoreError> {
        let collections = self.inner.read().await;
        Ok(collections.locations.iter().map(|l| l.label.clone()).collect())
    }
}
