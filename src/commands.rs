//! Tauri commands driving the display component.
//!
//! These commands expose the display to the WebView frontend via IPC. Each
//! property command records the change and runs an update pass, then returns
//! a snapshot the frontend reflects into its element.
//!
//! Note: document loads and page rendering run with the display unlocked, so
//! resize and page commands keep flowing while PDFium works. Only the most
//! recently started load is attached.

use crate::display::{fetch_document, DisplaySnapshot, PdfViewerDisplay, ScaleMode};
use crate::engine::{BoxSize, PageFrame};
use crate::error::ViewerError;
use crate::pdf::{PdfError, PdfiumEngine};
use tauri::State;
use tokio::sync::Mutex;

/// Application state holding the single display.
pub struct DisplayState {
    pub display: Mutex<PdfViewerDisplay<PdfiumEngine>>,
}

impl DisplayState {
    pub fn new(display: PdfViewerDisplay<PdfiumEngine>) -> Self {
        Self {
            display: Mutex::new(display),
        }
    }
}

/// Run update passes until the display has settled, loading outside the lock.
async fn refresh(state: &DisplayState) -> DisplaySnapshot {
    let pending = {
        let mut display = state.display.lock().await;
        let ticket = display.take_pending_load();
        display.update().await;
        ticket.map(|ticket| (ticket, display.engine()))
    };

    if let Some((ticket, engine)) = pending {
        let fetched = fetch_document(engine.as_ref(), &ticket).await;
        let mut display = state.display.lock().await;
        display.finish_load(ticket, fetched);
        display.update().await;
    }

    state.display.lock().await.snapshot()
}

/// Set or clear the document source (path or file:// URL).
#[tauri::command]
pub async fn set_src(
    src: Option<String>,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.set_src(src);
    Ok(refresh(&state).await)
}

/// Load the current source again, e.g. after a failed load.
#[tauri::command]
pub async fn reload_document(
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.reload();
    Ok(refresh(&state).await)
}

/// Scroll to a 1-based page.
#[tauri::command]
pub async fn set_page(
    page: u32,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.set_page(page)?;
    Ok(refresh(&state).await)
}

#[tauri::command]
pub async fn set_multi_page(
    multi_page: bool,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.set_multi_page(multi_page);
    Ok(refresh(&state).await)
}

/// Accepts a number, `"cover"` or `"contain"`.
#[tauri::command]
pub async fn set_scale(
    scale: ScaleMode,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.set_scale(scale)?;
    Ok(refresh(&state).await)
}

#[tauri::command]
pub async fn set_zoom(
    zoom: f32,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state.display.lock().await.set_zoom(zoom)?;
    Ok(refresh(&state).await)
}

/// Set a property from its attribute form; `value: null` removes it.
#[tauri::command]
pub async fn set_attribute(
    name: String,
    value: Option<String>,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    state
        .display
        .lock()
        .await
        .set_attribute(&name, value.as_deref())?;
    Ok(refresh(&state).await)
}

/// Box-size notification from the frontend's resize observer.
#[tauri::command]
pub async fn resize(
    width: f32,
    height: f32,
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    let changed = state.display.lock().await.resize(BoxSize::new(width, height));
    if changed {
        Ok(refresh(&state).await)
    } else {
        Ok(state.display.lock().await.snapshot())
    }
}

#[tauri::command]
pub async fn get_display_state(
    state: State<'_, DisplayState>,
) -> Result<DisplaySnapshot, ViewerError> {
    Ok(state.display.lock().await.snapshot())
}

/// Render the visible page(s) to PNG at the applied scale.
///
/// Rasterizing runs on the blocking pool with the display unlocked.
#[tauri::command]
pub async fn render_visible(
    state: State<'_, DisplayState>,
) -> Result<Vec<PageFrame>, ViewerError> {
    let plan = state.display.lock().await.render_plan()?;
    let Some(plan) = plan else {
        return Ok(Vec::new());
    };
    tokio::task::spawn_blocking(move || plan.render())
        .await
        .map_err(|e| ViewerError::Render(PdfError::RenderError(e.to_string())))?
}
