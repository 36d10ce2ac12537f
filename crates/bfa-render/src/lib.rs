#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod render_json;
pub mod render_text;
pub mod renderer;

mod value;

pub use config::{OutputMode, RenderConfig};
pub use error::RenderError;
pub use render_json::JsonRenderer;
pub use render_text::TextRenderer;
pub use renderer::{AnnotationRenderer, DefaultRenderer};
