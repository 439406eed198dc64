pub mod app;
pub mod core;
pub mod db;
pub mod llm;
pub mod meme;
pub mod store;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use utils::log_preview;


pub use app::{Intent, MemeApp};
pub use core::config::MemeConfig;
pub use core::error::{MemeError, Result};
pub use db::{HelixClient, HelixClientError};
pub use meme::{GeneratedMeme, MemeOrchestrator};
pub use store::{HelixMemeStore, MemeStore, MemoryStore};


pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";


pub const DEFAULT_LLM_MODEL: &str = "gpt-3.5-turbo";


pub const DEFAULT_IMGFLIP_URL: &str = "https://api.imgflip.com";


pub const DEFAULT_IP_LOOKUP_URL: &str = "https://api.ipify.org?format=json";


pub const DEFAULT_HELIX_PORT: u16 = 6969;


pub const DEFAULT_CATALOG_LIMIT: usize = 100;


pub const DEFAULT_GALLERY_LIMIT: usize = 20;


pub const MAX_RETRY_ATTEMPTS: u32 = 3;


pub const RETRY_DELAY_FLOOR_MS: u64 = 2_000;


pub const RETRY_DELAY_CEILING_MS: u64 = 10_000;
