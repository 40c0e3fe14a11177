//! PDF engine built on pdfium-render.
//!
//! This module provides:
//! - PDFium binding as an explicit initialization step
//! - Source reference resolution (paths and file:// URLs)
//! - Single-page and multi-page viewers rendering pages to PNG

mod engine;
mod renderer;
pub mod source;

pub use engine::*;
pub use renderer::*;
