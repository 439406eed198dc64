

pub mod config;
pub mod error;
pub mod session;

pub use config::MemeConfig;
pub use error::{MemeError, Result};
pub use session::SessionState;
