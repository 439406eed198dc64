

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub ip_address: String,
}


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewMemeRecord {
    pub thought: String,
    pub location: String,
    pub location_id: Option<String>,
    pub meme_url: String,
    pub explanation: String,
    pub ip_address: String,
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemeRecord {
    pub id: String,
    pub thought: String,
    pub location: String,
    #[serde(default)]
    pub location_id: Option<String>,
    pub meme_url: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub ip_address: String,
    pub timestamp: DateTime<Utc>,
}

impl MemeRecord {

    pub fn caption(&self) -> String {
        format!("{} (Location: {})", self.thought, self.location)
    }
}
