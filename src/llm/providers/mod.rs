

pub mod base;
pub mod openai;
pub mod retry;

pub use base::{ChatMessage, LlmMetadata, LlmProvider, LlmProviderError, Role};
pub use openai::OpenAiProvider;
pub use retry::{RetryPolicy, RetryingProvider};
