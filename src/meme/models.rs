

use serde::{Deserialize, Serialize};

use crate::llm::reply::CompletionReply;


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub box_count: usize,
}


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaptionSet {
    captions: Vec<String>,
}

impl CaptionSet {
    pub fn new(captions: Vec<String>) -> Self {
        Self { captions }
    }

    pub fn from_reply(reply: &CompletionReply, box_count: usize) -> Self {
        let captions = (0..box_count)
            .map(|i| reply.get(&format!("text{i}")).unwrap_or_default().to_string())
            .collect();
        Self { captions }
    }

    pub fn get(&self, index: usize) -> &str {
        self.captions.get(index).map(String::as_str).unwrap_or_default()
    }


    // text0/text1 for up to two boxes, boxes[i][text] beyond that.
    pub fn to_form_fields(&self) -> Vec<(String, String)> {
        if self.captions.len() > 2 {
            self.captions
                .iter()
                .enumerate()
                .map(|(i, text)| (format!("boxes[{i}][text]"), text.clone()))
                .collect()
        } else {
            vec![
                ("text0".to_string(), self.get(0).to_string()),
                ("text1".to_string(), self.get(1).to_string()),
            ]
        }
    }
}


#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedMeme {
    pub image_url: String,
    pub template_id: String,
    pub template_name: String,
    pub explanation: String,
    pub record_id: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
