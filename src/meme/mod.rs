

pub mod catalog;
pub mod models;
pub mod orchestrator;
pub mod render;

pub use catalog::{CatalogError, ImgflipCatalog, TemplateCatalog};
pub use models::{CaptionSet, GeneratedMeme, Template};
pub use orchestrator::{GenerateRequest, MemeOrchestrator};
pub use render::{ImageRenderer, ImgflipRenderer, RenderError};
