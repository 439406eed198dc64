

use std::collections::HashMap;


#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionReply {
    fields: HashMap<String, String>,
}

impl CompletionReply {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }


    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

pub fn parse_reply(text: &str) -> CompletionReply {
    let fields = text
        .lines()
        .filter_map(|line| line.split_once(": "))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    CompletionReply { fields }
}
