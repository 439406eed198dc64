

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::models::{Location, MemeRecord, NewMemeRecord};
use super::{MemeStore, StoreError};
use crate::db::HelixClient;

#[derive(Serialize)]
struct LabelInput<'a> {
    label: &'a str,
}

#[derive(Serialize)]
struct LocationIpInput<'a> {
    label: &'a str,
    ip_address: &'a str,
}

#[derive(Serialize)]
struct AddMemeInput {
    thought: String,
    location: String,
    location_id: String,
    meme_url: String,
    explanation: String,
    ip_address: String,
}

#[derive(Serialize)]
struct RecentMemesInput {
    limit: i64,
}

#[derive(Debug, Deserialize)]
struct LocationNode {
    id: String,
    label: String,
    #[serde(default)]
    ip_address: String,
}

impl From<LocationNode> for Location {
    fn from(node: LocationNode) -> Self {
        Location { id: node.id, label: node.label, ip_address: node.ip_address }
    }
}

#[derive(Deserialize)]
struct MemeNode {
    id: String,
    thought: String,
    location: String,
    #[serde(default)]
    location_id: String,
    meme_url: String,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    ip_address: String,
    timestamp: DateTime<Utc>,
}

impl From<MemeNode> for MemeRecord {
    fn from(node: MemeNode) -> Self {
        MemeRecord {
            id: node.id,
            thought: node.thought,
            location: node.location,
            location_id: Some(node.location_id).filter(|id| !id.is_empty()),
            meme_url: node.meme_url,
            explanation: node.explanation,
            ip_address: node.ip_address,
            timestamp: node.timestamp,
        }
    }
}

fn decode_nodes<T: DeserializeOwned>(mut output: Value, key: &'static str) -> Result<Vec<T>, StoreError> {
    let decode = |value: Value| {
        serde_json::from_value::<T>(value)
            .map_err(|e| StoreError::Decode { what: key, message: e.to_string() })
    };

    match output.get_mut(key).map(Value::take) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items.into_iter().map(decode).collect(),
        Some(single) => Ok(vec![decode(single)?]),
    }
}


pub struct HelixMemeStore {
    client: HelixClient,
}

impl HelixMemeStore {
    pub fn new(client: HelixClient) -> Self {
        info!("HelixMemeStore initialized ({})", client.base_url());
        Self { client }
    }
}

#[async_trait]
impl MemeStore for HelixMemeStore {
    async fn find_location(&self, label: &str) -> Result<Option<Location>, StoreError> {
        let output: Value = self
            .client
            .execute_query("getLocationByLabel", &LabelInput { label })
            .await?;

        let nodes = decode_nodes::<LocationNode>(output, "location")?;
        Ok(nodes.into_iter().next().map(Location::from))
    }

    async fn add_location(&self, label: &str) -> Result<Location, StoreError> {
        let output: Value = self
            .client
            .execute_query("addLocation", &LocationIpInput { label, ip_address: "" })
            .await?;

        debug!("Added location {}", label);
        decode_nodes::<LocationNode>(output, "location")?
            .into_iter()
            .next()
            .map(Location::from)
            .ok_or_else(|| StoreError::Decode { what: "location", message: "addLocation returned no node".to_string() })
    }

    async fn update_location_ip(&self, label: &str, ip_address: &str) -> Result<bool, StoreError> {
        let output: Value = self
            .client
            .execute_query("updateLocationIp", &LocationIpInput { label, ip_address })
            .await?;

        Ok(!decode_nodes::<LocationNode>(output, "location")?.is_empty())
    }

    async fn add_meme(&self, record: NewMemeRecord) -> Result<MemeRecord, StoreError> {
        let input = AddMemeInput {
            thought: record.thought,
            location: record.location,
            location_id: record.location_id.unwrap_or_default(),
            meme_url: record.meme_url,
            explanation: record.explanation,
            ip_address: record.ip_address,
        };
        let output: Value = self.client.execute_query("addMeme", &input).await?;

        decode_nodes::<MemeNode>(output, "meme")?
            .into_iter()
            .next()
            .map(MemeRecord::from)
            .ok_or_else(|| StoreError::Decode { what: "meme", message: "addMeme returned no node".to_string() })
    }

    async fn recent_memes(&self, limit: usize) -> Result<Vec<MemeRecord>, StoreError> {
        let input = RecentMemesInput { limit: i64::try_from(limit).unwrap_or(i64::MAX) };
        let output: Value = self.client.execute_query("getRecentMemes", &input).await?;

        let mut memes: Vec<MemeRecord> = decode_nodes::<MemeNode>(output, "memes")?
            .into_iter()
            .map(MemeRecord::from)
            .collect();
        memes.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        memes.truncate(limit);
        Ok(memes)
    }

    async fn all_locations(&self) -> Result<Vec<String>, StoreError> {
        let output: Value = self
            .client
            .execute_query("getAllLocations", &serde_json::json!({}))
            .await?;

        Ok(decode_nodes::<LocationNode>(output, "locations")?
            .into_iter()
            .map(|node| node.label)
            .collect())
    }
}
