

pub mod factory;
pub mod prompt;
pub mod providers;
pub mod reply;

pub use factory::LlmProviderFactory;
pub use providers::{ChatMessage, LlmProvider, LlmProviderError, RetryPolicy};
pub use reply::{parse_reply, CompletionReply};
