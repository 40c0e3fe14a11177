//! The seam between the display component and a rendering engine.
//!
//! The component never touches engine internals: it loads documents through
//! [`DocumentEngine`], queries them through [`DocumentHandle`] and drives the
//! on-screen view through [`ViewerAdapter`]. The PDFium implementation lives
//! in [`crate::pdf`].

use crate::pdf::PdfError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Page layout strategy of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutMode {
    /// Only the current page is laid out. Much cheaper to render.
    SinglePage,
    /// All pages stacked vertically.
    MultiPage,
}

impl LayoutMode {
    pub fn from_multi_page(multi_page: bool) -> Self {
        if multi_page {
            LayoutMode::MultiPage
        } else {
            LayoutMode::SinglePage
        }
    }
}

/// Rendered box size of the host element, in CSS pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: f32,
    pub height: f32,
}

impl BoxSize {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// The element a viewer draws into.
///
/// Clearing bumps the generation so a viewer can tell it was handed a fresh
/// container.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Container {
    pub size: BoxSize,
    pub generation: u64,
}

impl Container {
    pub fn clear(&mut self) {
        self.generation += 1;
    }
}

/// Intrinsic page size at unit scale, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
}

/// A page the viewer currently shows, at the scale it shows it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct VisiblePage {
    /// 1-based page number
    pub page_number: u32,
    /// Offset from the top of the scrollable content, in CSS pixels
    pub top: f32,
    pub scale: f32,
}

/// One rendered page, PNG encoded.
#[derive(Debug, Clone, Serialize)]
pub struct PageFrame {
    /// 1-based page number
    pub page_number: u32,
    /// Offset from the top of the scrollable content, in CSS pixels
    pub top: f32,
    pub width: u32,
    pub height: u32,
    pub png: Vec<u8>,
}

/// A parsed document owned by the engine.
#[async_trait]
pub trait DocumentHandle: Send + Sync + 'static {
    fn page_count(&self) -> u32;

    /// Size of the 1-based `page_number` at unit scale.
    async fn page_size(&self, page_number: u32) -> Result<PageSize, PdfError>;

    async fn metadata(&self) -> Result<DocumentMetadata, PdfError>;

    /// Rasterize one page. Blocking; hosts run it off the async executor.
    fn render_page(&self, page: VisiblePage) -> Result<PageFrame, PdfError>;

    /// Release engine resources. Further queries fail with
    /// [`PdfError::Released`].
    fn destroy(&self);
}

/// The on-screen view of a document.
///
/// Scrolling and scaling are no-ops while no document is bound.
pub trait ViewerAdapter<D: DocumentHandle>: Send + Sync {
    fn layout(&self) -> LayoutMode;

    fn set_document(&mut self, document: Arc<D>);

    /// Bring the 1-based `page_number` into view and make it current.
    fn scroll_page_into_view(&mut self, page_number: u32);

    fn set_current_scale(&mut self, scale: f32);

    fn current_scale(&self) -> Option<f32>;

    fn current_page_number(&self) -> u32;

    fn pages_count(&self) -> Option<u32>;

    /// The host element changed size.
    fn set_container(&mut self, container: Container);

    /// Pages intersecting the container, empty until a document and a
    /// scale are set.
    fn visible_pages(&self) -> Vec<VisiblePage>;
}

/// Loads documents and builds viewers for them.
#[async_trait]
pub trait DocumentEngine: Send + Sync + 'static {
    type Document: DocumentHandle;

    async fn load(&self, src: &str) -> Result<Self::Document, PdfError>;

    fn create_viewer(
        &self,
        layout: LayoutMode,
        container: &Container,
    ) -> Box<dyn ViewerAdapter<Self::Document>>;
}
