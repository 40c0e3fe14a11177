//! PDFium-backed implementation of the engine seam.

use super::renderer::{self, DocumentInfo, PageInfo, PdfiumBinding};
use super::source::resolve_source;
use super::PdfError;
use crate::config::{EngineConfig, LayoutConfig};
use crate::display::scale::PT_TO_PX;
use crate::engine::{
    Container, DocumentEngine, DocumentHandle, DocumentMetadata, LayoutMode, PageFrame, PageSize,
    ViewerAdapter, VisiblePage,
};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct PdfiumEngine {
    binding: PdfiumBinding,
    layout: LayoutConfig,
}

impl PdfiumEngine {
    /// Bind PDFium once up front; fails if the library cannot be found.
    pub fn initialize(engine: &EngineConfig, layout: LayoutConfig) -> Result<Self, PdfError> {
        let binding = PdfiumBinding::initialize(engine)?;
        Ok(Self { binding, layout })
    }
}

#[async_trait]
impl DocumentEngine for PdfiumEngine {
    type Document = PdfiumDocument;

    async fn load(&self, src: &str) -> Result<PdfiumDocument, PdfError> {
        let path = resolve_source(src)?;
        let bytes = tokio::fs::read(&path)
            .await
            .map_err(|e| PdfError::LoadError(format!("{}: {}", path.display(), e)))?;

        // PDFium parsing is CPU bound and must stay off the async workers
        let binding = self.binding.clone();
        let (info, pages, bytes) = tokio::task::spawn_blocking(move || {
            renderer::inspect_document(&binding, &bytes).map(|(info, pages)| (info, pages, bytes))
        })
        .await
        .map_err(|e| PdfError::LoadError(format!("{}: {}", path.display(), e)))??;

        Ok(PdfiumDocument::new(self.binding.clone(), bytes, info, pages))
    }

    fn create_viewer(
        &self,
        layout: LayoutMode,
        container: &Container,
    ) -> Box<dyn ViewerAdapter<PdfiumDocument>> {
        match layout {
            LayoutMode::SinglePage => Box::new(SinglePageView::new(self.layout)),
            LayoutMode::MultiPage => Box::new(MultiPageView::new(*container, self.layout)),
        }
    }
}

/// A loaded PDF: raw bytes plus the page geometry read at load time.
pub struct PdfiumDocument {
    binding: PdfiumBinding,
    bytes: Vec<u8>,
    info: DocumentInfo,
    pages: Vec<PageInfo>,
    released: AtomicBool,
}

impl PdfiumDocument {
    fn new(binding: PdfiumBinding, bytes: Vec<u8>, info: DocumentInfo, pages: Vec<PageInfo>) -> Self {
        Self {
            binding,
            bytes,
            info,
            pages,
            released: AtomicBool::new(false),
        }
    }

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    fn check_live(&self) -> Result<(), PdfError> {
        if self.released.load(Ordering::Acquire) {
            Err(PdfError::Released)
        } else {
            Ok(())
        }
    }

    fn page_info(&self, page_number: u32) -> Result<&PageInfo, PdfError> {
        page_number
            .checked_sub(1)
            .and_then(|index| self.pages.get(index as usize))
            .ok_or(PdfError::InvalidPage(page_number))
    }
}

#[async_trait]
impl DocumentHandle for PdfiumDocument {
    fn page_count(&self) -> u32 {
        self.info.page_count
    }

    async fn page_size(&self, page_number: u32) -> Result<PageSize, PdfError> {
        self.check_live()?;
        let page = self.page_info(page_number)?;
        Ok(PageSize {
            width: page.width,
            height: page.height,
        })
    }

    async fn metadata(&self) -> Result<DocumentMetadata, PdfError> {
        self.check_live()?;
        Ok(DocumentMetadata {
            title: self.info.title.clone(),
        })
    }

    /// Scale 1.0 renders at 96 DPI.
    fn render_page(&self, visible: VisiblePage) -> Result<PageFrame, PdfError> {
        self.check_live()?;
        let page = self.page_info(visible.page_number)?;
        let width = (page.width * PT_TO_PX * visible.scale).round() as i32;
        let height = (page.height * PT_TO_PX * visible.scale).round() as i32;
        let png = renderer::render_page_to_png(&self.binding, &self.bytes, page.index, width, height)?;
        Ok(PageFrame {
            page_number: visible.page_number,
            top: visible.top,
            width: width.max(1) as u32,
            height: height.max(1) as u32,
            png,
        })
    }

    fn destroy(&self) {
        if !self.released.swap(true, Ordering::AcqRel) {
            log::debug!("Released document ({} bytes)", self.bytes.len());
        }
    }
}

/// Shows one page at a time.
pub struct SinglePageView {
    layout: LayoutConfig,
    document: Option<Arc<PdfiumDocument>>,
    current_page: u32,
    scale: Option<f32>,
}

impl SinglePageView {
    pub fn new(layout: LayoutConfig) -> Self {
        Self {
            layout,
            document: None,
            current_page: 1,
            scale: None,
        }
    }
}

impl ViewerAdapter<PdfiumDocument> for SinglePageView {
    fn layout(&self) -> LayoutMode {
        LayoutMode::SinglePage
    }

    fn set_document(&mut self, document: Arc<PdfiumDocument>) {
        self.document = Some(document);
        self.current_page = 1;
    }

    fn scroll_page_into_view(&mut self, page_number: u32) {
        let Some(document) = &self.document else {
            return;
        };
        if page_number == 0 || page_number > document.page_count() {
            log::warn!("Ignoring scroll to invalid page {}", page_number);
            return;
        }
        self.current_page = page_number;
    }

    fn set_current_scale(&mut self, scale: f32) {
        if self.document.is_some() {
            self.scale = Some(scale);
        }
    }

    fn current_scale(&self) -> Option<f32> {
        self.scale
    }

    fn current_page_number(&self) -> u32 {
        self.current_page
    }

    fn pages_count(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.page_count())
    }

    // the single page is always drawn at the top-left
    fn set_container(&mut self, _container: Container) {}

    fn visible_pages(&self) -> Vec<VisiblePage> {
        match (&self.document, self.scale) {
            (Some(_), Some(scale)) => vec![VisiblePage {
                page_number: self.current_page,
                top: self.layout.page_border_width,
                scale,
            }],
            _ => Vec::new(),
        }
    }
}

/// Vertical position of one page in the multi-page stack.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSlot {
    pub page_number: u32,
    pub top: f32,
    pub height: f32,
}

/// Stack pages top to bottom, each wrapped in its border and separated by
/// `page_gap`.
pub fn stack_pages(pages: &[PageInfo], scale: f32, layout: &LayoutConfig) -> Vec<PageSlot> {
    let mut top = 0.0;
    pages
        .iter()
        .enumerate()
        .map(|(i, page)| {
            let height = page.height * PT_TO_PX * scale + layout.page_border_width * 2.0;
            let slot = PageSlot {
                page_number: i as u32 + 1,
                top,
                height,
            };
            top += height + layout.page_gap;
            slot
        })
        .collect()
}

/// Slots overlapping the viewport `[scroll_top, scroll_top + viewport_height)`.
pub fn visible_slots(slots: &[PageSlot], scroll_top: f32, viewport_height: f32) -> Vec<PageSlot> {
    let bottom = scroll_top + viewport_height.max(1.0);
    slots
        .iter()
        .filter(|slot| slot.top < bottom && slot.top + slot.height > scroll_top)
        .copied()
        .collect()
}

/// Shows every page in one continuous vertical scroll.
pub struct MultiPageView {
    container: Container,
    layout: LayoutConfig,
    document: Option<Arc<PdfiumDocument>>,
    slots: Vec<PageSlot>,
    scroll_top: f32,
    current_page: u32,
    scale: Option<f32>,
}

impl MultiPageView {
    pub fn new(container: Container, layout: LayoutConfig) -> Self {
        Self {
            container,
            layout,
            document: None,
            slots: Vec::new(),
            scroll_top: 0.0,
            current_page: 1,
            scale: None,
        }
    }

    fn relayout(&mut self) {
        let scale = self.scale.unwrap_or(1.0);
        self.slots = match &self.document {
            Some(document) => stack_pages(document.pages(), scale, &self.layout),
            None => Vec::new(),
        };
        // keep the current page pinned at the top after a relayout
        if let Some(slot) = self.slots.get(self.current_page as usize - 1) {
            self.scroll_top = slot.top;
        }
    }
}

impl ViewerAdapter<PdfiumDocument> for MultiPageView {
    fn layout(&self) -> LayoutMode {
        LayoutMode::MultiPage
    }

    fn set_document(&mut self, document: Arc<PdfiumDocument>) {
        self.document = Some(document);
        self.current_page = 1;
        self.scroll_top = 0.0;
        self.relayout();
    }

    fn scroll_page_into_view(&mut self, page_number: u32) {
        if self.document.is_none() {
            return;
        }
        match page_number.checked_sub(1).and_then(|i| self.slots.get(i as usize)) {
            Some(slot) => {
                self.scroll_top = slot.top;
                self.current_page = page_number;
            }
            None => log::warn!("Ignoring scroll to invalid page {}", page_number),
        }
    }

    fn set_current_scale(&mut self, scale: f32) {
        if self.document.is_some() {
            self.scale = Some(scale);
            self.relayout();
        }
    }

    fn current_scale(&self) -> Option<f32> {
        self.scale
    }

    fn current_page_number(&self) -> u32 {
        self.current_page
    }

    fn pages_count(&self) -> Option<u32> {
        self.document.as_ref().map(|d| d.page_count())
    }

    fn set_container(&mut self, container: Container) {
        self.container = container;
    }

    fn visible_pages(&self) -> Vec<VisiblePage> {
        let (Some(_), Some(scale)) = (&self.document, self.scale) else {
            return Vec::new();
        };
        visible_slots(&self.slots, self.scroll_top, self.container.size.height)
            .into_iter()
            .map(|slot| VisiblePage {
                page_number: slot.page_number,
                top: slot.top + self.layout.page_border_width,
                scale,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::BoxSize;
    use pretty_assertions::assert_eq;

    fn letter_pages(count: u32) -> Vec<PageInfo> {
        (0..count)
            .map(|index| PageInfo {
                index,
                width: 612.0,
                height: 792.0,
            })
            .collect()
    }

    fn letter_document(count: u32) -> Arc<PdfiumDocument> {
        let info = DocumentInfo {
            page_count: count,
            title: Some("Field Guide".to_string()),
        };
        Arc::new(PdfiumDocument::new(
            PdfiumBinding::unverified(),
            Vec::new(),
            info,
            letter_pages(count),
        ))
    }

    fn no_insets() -> LayoutConfig {
        LayoutConfig {
            page_border_width: 0.0,
            scrollbar_size: 0.0,
            page_gap: 10.0,
        }
    }

    fn container(width: f32, height: f32) -> Container {
        Container {
            size: BoxSize::new(width, height),
            generation: 1,
        }
    }

    #[test]
    fn pages_stack_with_gap_and_border() {
        let slots = stack_pages(&letter_pages(3), 0.5, &LayoutConfig::default());

        // 792pt * 4/3 * 0.5 = 528px, plus 18px of border
        assert_eq!(slots[0].top, 0.0);
        assert_eq!(slots[0].height, 546.0);
        assert_eq!(slots[1].top, 556.0);
        assert_eq!(slots[2].top, 1112.0);
        assert_eq!(slots[2].page_number, 3);
    }

    #[test]
    fn visible_slots_follow_scroll_position() {
        let slots = stack_pages(&letter_pages(4), 0.5, &no_insets());
        // each page is 528px tall, 538px apart

        let first = visible_slots(&slots, 0.0, 600.0);
        assert_eq!(
            first.iter().map(|s| s.page_number).collect::<Vec<_>>(),
            vec![1, 2]
        );

        let third = visible_slots(&slots, slots[2].top, 500.0);
        assert_eq!(
            third.iter().map(|s| s.page_number).collect::<Vec<_>>(),
            vec![3]
        );
    }

    #[test]
    fn gap_between_pages_is_not_a_page() {
        let slots = stack_pages(&letter_pages(2), 0.5, &no_insets());
        let in_gap = visible_slots(&slots, 529.0, 5.0);
        assert!(in_gap.is_empty());
    }

    #[test]
    fn empty_document_has_no_slots() {
        assert!(stack_pages(&[], 1.0, &no_insets()).is_empty());
    }

    #[test]
    fn views_ignore_scroll_and_scale_without_a_document() {
        let mut single = SinglePageView::new(LayoutConfig::default());
        single.scroll_page_into_view(2);
        single.set_current_scale(1.5);
        assert_eq!(single.current_page_number(), 1);
        assert_eq!(single.current_scale(), None);
        assert_eq!(single.pages_count(), None);
        assert!(single.visible_pages().is_empty());

        let mut multi = MultiPageView::new(container(800.0, 600.0), LayoutConfig::default());
        multi.scroll_page_into_view(2);
        multi.set_current_scale(1.5);
        assert_eq!(multi.current_page_number(), 1);
        assert_eq!(multi.current_scale(), None);
        assert!(multi.visible_pages().is_empty());
    }

    #[test]
    fn out_of_range_scroll_is_ignored() {
        let mut single = SinglePageView::new(LayoutConfig::default());
        single.set_document(letter_document(3));
        single.scroll_page_into_view(2);
        single.scroll_page_into_view(0);
        single.scroll_page_into_view(4);
        assert_eq!(single.current_page_number(), 2);

        let mut multi = MultiPageView::new(container(800.0, 600.0), LayoutConfig::default());
        multi.set_document(letter_document(3));
        multi.scroll_page_into_view(3);
        let top = multi.scroll_top;
        multi.scroll_page_into_view(0);
        multi.scroll_page_into_view(9);
        assert_eq!(multi.current_page_number(), 3);
        assert_eq!(multi.scroll_top, top);
    }

    #[test]
    fn single_page_shows_current_page_inside_border() {
        let mut single = SinglePageView::new(LayoutConfig::default());
        single.set_document(letter_document(3));
        single.scroll_page_into_view(2);
        single.set_current_scale(0.75);

        assert_eq!(
            single.visible_pages(),
            vec![VisiblePage {
                page_number: 2,
                top: 9.0,
                scale: 0.75,
            }]
        );
    }

    #[test]
    fn rescaling_keeps_the_current_page_at_the_top() {
        let mut multi = MultiPageView::new(container(800.0, 600.0), LayoutConfig::default());
        multi.set_document(letter_document(3));
        multi.set_current_scale(0.5);
        multi.scroll_page_into_view(3);
        assert_eq!(multi.scroll_top, 1112.0);

        // 1056px page + 18px border + 10px gap per page above
        multi.set_current_scale(1.0);
        assert_eq!(multi.current_page_number(), 3);
        assert_eq!(multi.scroll_top, 2168.0);
        assert_eq!(
            multi.visible_pages(),
            vec![VisiblePage {
                page_number: 3,
                top: 2177.0,
                scale: 1.0,
            }]
        );
    }

    #[test]
    fn new_document_starts_at_the_top() {
        let mut multi = MultiPageView::new(container(800.0, 600.0), LayoutConfig::default());
        multi.set_document(letter_document(3));
        multi.set_current_scale(0.5);
        multi.scroll_page_into_view(3);

        multi.set_document(letter_document(2));
        assert_eq!(multi.current_page_number(), 1);
        assert_eq!(multi.scroll_top, 0.0);
        assert_eq!(multi.pages_count(), Some(2));
    }

    #[tokio::test]
    async fn document_reports_geometry_and_title() {
        let document = letter_document(3);
        assert_eq!(document.page_count(), 3);
        assert_eq!(
            document.page_size(2).await.unwrap(),
            PageSize {
                width: 612.0,
                height: 792.0,
            }
        );
        assert!(matches!(
            document.page_size(4).await,
            Err(PdfError::InvalidPage(4))
        ));
        assert_eq!(
            document.metadata().await.unwrap().title.as_deref(),
            Some("Field Guide")
        );
    }

    #[tokio::test]
    async fn released_document_refuses_queries() {
        let document = letter_document(2);
        document.destroy();
        document.destroy();

        assert!(matches!(document.page_size(1).await, Err(PdfError::Released)));
        assert!(matches!(document.metadata().await, Err(PdfError::Released)));
        let visible = VisiblePage {
            page_number: 1,
            top: 0.0,
            scale: 1.0,
        };
        assert!(matches!(document.render_page(visible), Err(PdfError::Released)));
    }
}
