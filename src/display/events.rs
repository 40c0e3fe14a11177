//! Events dispatched by the display.

use crate::error::ViewerError;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::broadcast;

const DEFAULT_CAPACITY: usize = 32;

#[derive(Debug, Clone)]
pub enum DisplayEvent {
    /// A document was loaded and bound to the viewer.
    Load {
        title: Option<String>,
        page_count: u32,
    },
    /// Loading or reading the document failed.
    Error(Arc<ViewerError>),
}

impl DisplayEvent {
    /// DOM-style event name.
    pub fn name(&self) -> &'static str {
        match self {
            DisplayEvent::Load { .. } => "load",
            DisplayEvent::Error(_) => "error",
        }
    }

    pub fn payload(&self) -> EventPayload {
        match self {
            DisplayEvent::Load { title, page_count } => EventPayload {
                title: title.clone(),
                page_count: Some(*page_count),
                error: None,
            },
            DisplayEvent::Error(error) => EventPayload {
                title: None,
                page_count: None,
                error: Some(error.to_string()),
            },
        }
    }
}

/// Wire shape of an event sent to a WebView.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Fan-out of display events to any number of listeners.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DisplayEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DisplayEvent> {
        self.sender.subscribe()
    }

    pub fn dispatch(&self, event: DisplayEvent) {
        let name = event.name();
        if self.sender.send(event).is_err() {
            log::debug!("No listeners for `{}` event", name);
        }
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
