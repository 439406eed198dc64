

use serde::{Deserialize, Serialize};


#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    pub template_id: Option<String>,
    pub thought: Option<String>,
    pub location: Option<String>,
    pub record_id: Option<String>,
}

impl SessionState {

    pub fn new() -> Self {
        Self::default()
    }


    pub fn remember(
        &mut self,
        template_id: impl Into<String>,
        thought: impl Into<String>,
        location: impl Into<String>,
        record_id: Option<String>,
    ) {
        self.template_id = Some(template_id.into());
        self.thought = Some(thought.into());
        self.location = Some(location.into());
        self.record_id = record_id;
    }


    pub fn clear(&mut self) {
        *self = Self::default();
    }


    pub fn has_meme(&self) -> bool {
        self.template_id.is_some() && self.thought.is_some() && self.location.is_some()
    }
}
