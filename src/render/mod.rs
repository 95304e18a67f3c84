//! Turning built reports into documents.

pub mod html;
pub mod pdf;

pub use html::render_html;
pub use pdf::{render_fallback_pdf, render_pdf, CommandEngine, HtmlPdfEngine, RenderPath};
