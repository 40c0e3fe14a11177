// PDF Viewer Display
//
// A display component that shows PDFs through PDFium: property changes in,
// `load` / `error` events out. The `desktop` feature hosts it in a Tauri
// WebView.

pub mod config;
pub mod display;
pub mod engine;
pub mod error;
pub mod pdf;

#[cfg(feature = "desktop")]
mod commands;
#[cfg(feature = "desktop")]
mod desktop;

pub use config::ViewerConfig;
pub use display::{DisplayEvent, DisplaySnapshot, PdfViewerDisplay, ScaleMode};
pub use error::ViewerError;

#[cfg(feature = "desktop")]
pub use desktop::run;
