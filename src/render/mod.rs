//! Document Renderers
//!
//! A [`Renderer`] wraps generated text into an output document and builds
//! the index that links every generated section.

mod html;
mod markdown;

pub use html::HtmlRenderer;
pub use markdown::MarkdownRenderer;

use std::sync::Arc;

use crate::config::OutputFormat;
use crate::types::{Result, Section};

/// Heading of the section list in every index
pub const CONTENTS_HEADING: &str = "Contents";

pub trait Renderer: Send + Sync {
    /// Wrap `content` (Markdown text from the provider) into a document titled `title`
    fn format_document(&self, title: &str, content: &str) -> Result<String>;

    /// Build an index linking each section, in the given order
    fn format_index(&self, title: &str, sections: &[Section]) -> Result<String>;

    /// Extension of the files this renderer produces, without the dot
    fn file_extension(&self) -> &'static str;
}

pub type SharedRenderer = Arc<dyn Renderer>;

pub fn create_renderer(format: OutputFormat) -> SharedRenderer {
    match format {
        OutputFormat::Markdown => Arc::new(MarkdownRenderer),
        OutputFormat::Html => Arc::new(HtmlRenderer),
    }
}
