//! In-memory engine that records every call the display makes.

#![allow(dead_code)]

use async_trait::async_trait;
use pdf_viewer_display_lib::display::DisplayEvent;
use pdf_viewer_display_lib::engine::{
    Container, DocumentEngine, DocumentHandle, DocumentMetadata, LayoutMode, PageFrame, PageSize,
    ViewerAdapter, VisiblePage,
};
use pdf_viewer_display_lib::pdf::PdfError;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

pub const LETTER: PageSize = PageSize {
    width: 612.0,
    height: 792.0,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateViewer(LayoutMode, u64),
    DropViewer(LayoutMode),
    SetDocument(LayoutMode, String),
    Scroll(u32),
    SetScale(f32),
    Destroy(String),
}

#[derive(Debug, Default)]
pub struct Journal {
    pub calls: Vec<Call>,
    pub live_viewers: usize,
}

impl Journal {
    pub fn position(&self, call: &Call) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }

    pub fn scrolls(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Scroll(page) => Some(*page),
                _ => None,
            })
            .collect()
    }

    pub fn scales(&self) -> Vec<f32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::SetScale(scale) => Some(*scale),
                _ => None,
            })
            .collect()
    }

    pub fn destroyed(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Destroy(src) => Some(src.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn created(&self) -> Vec<(LayoutMode, u64)> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::CreateViewer(layout, generation) => Some((*layout, *generation)),
                _ => None,
            })
            .collect()
    }
}

pub type SharedJournal = Arc<Mutex<Journal>>;

#[derive(Debug, Clone)]
struct DocumentScript {
    pages: Vec<PageSize>,
    title: Option<String>,
    broken_metadata: bool,
    broken_page_sizes: bool,
}

#[derive(Default)]
pub struct ScriptedEngine {
    documents: HashMap<String, DocumentScript>,
    journal: SharedJournal,
}

impl ScriptedEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// A document of `pages` letter-sized pages.
    pub fn with_document(mut self, src: &str, pages: usize, title: Option<&str>) -> Self {
        self.documents.insert(
            src.to_string(),
            DocumentScript {
                pages: vec![LETTER; pages],
                title: title.map(str::to_string),
                broken_metadata: false,
                broken_page_sizes: false,
            },
        );
        self
    }

    /// A document that parses but whose metadata cannot be read.
    pub fn with_broken_metadata(mut self, src: &str, pages: usize) -> Self {
        self.documents.insert(
            src.to_string(),
            DocumentScript {
                pages: vec![LETTER; pages],
                title: None,
                broken_metadata: true,
                broken_page_sizes: false,
            },
        );
        self
    }

    /// A document whose page sizes cannot be read.
    pub fn with_unmeasurable_pages(mut self, src: &str, pages: usize) -> Self {
        self.documents.insert(
            src.to_string(),
            DocumentScript {
                pages: vec![LETTER; pages],
                title: None,
                broken_metadata: false,
                broken_page_sizes: true,
            },
        );
        self
    }

    pub fn journal(&self) -> SharedJournal {
        Arc::clone(&self.journal)
    }
}

pub struct FakeDocument {
    src: String,
    script: DocumentScript,
    released: AtomicBool,
    journal: SharedJournal,
}

impl FakeDocument {
    pub fn src(&self) -> &str {
        &self.src
    }

    pub fn is_released(&self) -> bool {
        self.released.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DocumentHandle for FakeDocument {
    fn page_count(&self) -> u32 {
        self.script.pages.len() as u32
    }

    async fn page_size(&self, page_number: u32) -> Result<PageSize, PdfError> {
        if self.is_released() {
            return Err(PdfError::Released);
        }
        if self.script.broken_page_sizes {
            return Err(PdfError::InvalidPage(page_number));
        }
        page_number
            .checked_sub(1)
            .and_then(|i| self.script.pages.get(i as usize))
            .copied()
            .ok_or(PdfError::InvalidPage(page_number))
    }

    async fn metadata(&self) -> Result<DocumentMetadata, PdfError> {
        if self.script.broken_metadata {
            return Err(PdfError::LoadError("corrupt info dictionary".to_string()));
        }
        Ok(DocumentMetadata {
            title: self.script.title.clone(),
        })
    }

    fn render_page(&self, page: VisiblePage) -> Result<PageFrame, PdfError> {
        if self.is_released() {
            return Err(PdfError::Released);
        }
        Ok(PageFrame {
            page_number: page.page_number,
            top: page.top,
            width: 1,
            height: 1,
            png: Vec::new(),
        })
    }

    fn destroy(&self) {
        self.released.store(true, Ordering::SeqCst);
        self.journal
            .lock()
            .unwrap()
            .calls
            .push(Call::Destroy(self.src.clone()));
    }
}

#[async_trait]
impl DocumentEngine for ScriptedEngine {
    type Document = FakeDocument;

    async fn load(&self, src: &str) -> Result<FakeDocument, PdfError> {
        let script = self
            .documents
            .get(src)
            .cloned()
            .ok_or_else(|| PdfError::LoadError(format!("{}: not found", src)))?;
        Ok(FakeDocument {
            src: src.to_string(),
            script,
            released: AtomicBool::new(false),
            journal: self.journal(),
        })
    }

    fn create_viewer(
        &self,
        layout: LayoutMode,
        container: &Container,
    ) -> Box<dyn ViewerAdapter<FakeDocument>> {
        let mut journal = self.journal.lock().unwrap();
        journal.live_viewers += 1;
        journal
            .calls
            .push(Call::CreateViewer(layout, container.generation));
        Box::new(SpyViewer {
            layout,
            document: None,
            current_page: 1,
            scale: None,
            journal: self.journal(),
        })
    }
}

pub struct SpyViewer {
    layout: LayoutMode,
    document: Option<Arc<FakeDocument>>,
    current_page: u32,
    scale: Option<f32>,
    journal: SharedJournal,
}

impl SpyViewer {
    fn record(&self, call: Call) {
        self.journal.lock().unwrap().calls.push(call);
    }
}

impl Drop for SpyViewer {
    fn drop(&mut self) {
        let mut journal = self.journal.lock().unwrap();
        journal.live_viewers -= 1;
        journal.calls.push(Call::DropViewer(self.layout));
    }
}

impl ViewerAdapter<FakeDocument> for SpyViewer {
    fn layout(&self) -> LayoutMode {
        self.layout
    }

    fn set_document(&mut self, document: Arc<FakeDocument>) {
        self.record(Call::SetDocument(self.layout, document.src().to_string()));
        self.document = Some(document);
        self.current_page = 1;
    }

    fn scroll_page_into_view(&mut self, page_number: u32) {
        if self.document.is_some() {
            self.record(Call::Scroll(page_number));
            self.current_page = page_number;
        }
    }

    fn set_current_scale(&mut self, scale: f32) {
        if self.document.is_some() {
            self.record(Call::SetScale(scale));
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

    fn set_container(&mut self, _container: Container) {}

    fn visible_pages(&self) -> Vec<VisiblePage> {
        match (&self.document, self.scale) {
            (Some(_), Some(scale)) => vec![VisiblePage {
                page_number: self.current_page,
                top: 0.0,
                scale,
            }],
            _ => Vec::new(),
        }
    }
}

/// Drain every event dispatched so far.
pub fn drain(events: &mut broadcast::Receiver<DisplayEvent>) -> Vec<DisplayEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-5
}
