//! Tauri desktop host.
//!
//! Owns app startup: config discovery, PDFium initialization, the single
//! display in managed state, forwarding display events to the WebView, and
//! opening a PDF passed on launch or through a file association.

use crate::commands::{
    get_display_state, reload_document, render_visible, resize, set_attribute, set_multi_page,
    set_page, set_scale, set_src, set_zoom, DisplayState,
};
use crate::config::ViewerConfig;
use crate::display::{DisplayEvent, PdfViewerDisplay};
use crate::pdf::source::{is_pdf_file, looks_like_pdf, url_to_file_path};
use crate::pdf::PdfiumEngine;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tauri::{Emitter, Manager, RunEvent};
use tokio::sync::broadcast::{self, error::RecvError};

/// Stores the file path that was passed to the app on launch (if any).
/// This is used to open PDFs when the app is launched via file association.
pub struct LaunchFile(pub Mutex<Option<String>>);

/// Extract PDF file path from command line arguments.
/// On macOS: when opening via Finder, the file path is passed as an argument.
/// On Windows: the file path is passed as the first argument after the executable.
fn get_pdf_from_args() -> Option<String> {
    let args: Vec<String> = std::env::args().collect();
    log::debug!("Launch arguments: {:?}", args);

    for arg in args.iter().skip(1) {
        // Skip Tauri/debug flags
        if arg.starts_with('-') {
            continue;
        }

        if is_pdf_file(Path::new(arg)) {
            log::info!("Found PDF in args: {}", arg);
            return Some(arg.clone());
        }

        // Handle file:// URLs (macOS sometimes passes these)
        if arg.starts_with("file://") {
            if let Some(path) = url::Url::parse(arg).ok().as_ref().and_then(url_to_file_path) {
                if is_pdf_file(Path::new(&path)) {
                    log::info!("Found PDF in args (file URL): {}", path);
                    return Some(path);
                }
            }
        }

        // Handle URL-encoded paths (e.g., spaces as %20)
        if let Ok(decoded) = urlencoding::decode(arg) {
            if decoded != *arg && is_pdf_file(Path::new(decoded.as_ref())) {
                log::info!("Found PDF in args (URL-decoded): {}", decoded);
                return Some(decoded.into_owned());
            }
        }
    }

    None
}

/// Handle file associations - extract PDF paths from URLs and emit to frontend.
#[cfg_attr(not(any(target_os = "macos", target_os = "ios")), allow(dead_code))]
fn handle_file_associations<R: tauri::Runtime>(
    app_handle: &tauri::AppHandle<R>,
    urls: Vec<url::Url>,
) {
    log::info!("Received file open event with {} URLs", urls.len());

    for url in urls {
        let Some(path) = url_to_file_path(&url) else {
            log::warn!("Could not convert URL to file path: {}", url);
            continue;
        };

        // A path that only looks like a PDF may not be readable yet; the
        // frontend surfaces the load error.
        if is_pdf_file(Path::new(&path)) || looks_like_pdf(&path) {
            log::info!("Emitting open-file event for: {}", path);
            if let Err(e) = app_handle.emit("open-file", &path) {
                log::warn!("Failed to emit open-file event: {}", e);
            }
            // Only open the first PDF
            return;
        }
    }
}

/// Re-emit display events to the WebView under their DOM names.
fn forward_events<R: tauri::Runtime>(
    app_handle: tauri::AppHandle<R>,
    mut events: broadcast::Receiver<DisplayEvent>,
) {
    tauri::async_runtime::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if let Err(e) = app_handle.emit(event.name(), event.payload()) {
                        log::warn!("Failed to emit {} event: {}", event.name(), e);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    log::warn!("Dropped {} display events", skipped);
                }
                Err(RecvError::Closed) => break,
            }
        }
    });
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Check for PDF file in launch arguments (Windows/Linux primarily)
    let launch_file = get_pdf_from_args();

    let app = tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .manage(LaunchFile(Mutex::new(launch_file)))
        .invoke_handler(tauri::generate_handler![
            set_src,
            reload_document,
            set_page,
            set_multi_page,
            set_scale,
            set_zoom,
            set_attribute,
            resize,
            get_display_state,
            render_visible,
            get_launch_file,
        ])
        .setup(|app| {
            let config_dir = app.path().app_config_dir().ok();
            let config = ViewerConfig::discover(config_dir.as_deref())?;
            let engine = PdfiumEngine::initialize(&config.engine, config.layout)?;
            let display = PdfViewerDisplay::new(Arc::new(engine), &config);
            forward_events(app.handle().clone(), display.subscribe());
            app.manage(DisplayState::new(display));
            log::info!("App setup complete");
            Ok(())
        })
        .build(tauri::generate_context!())
        .expect("error while building tauri application");

    // Run with event handler for macOS file associations
    app.run(|_app_handle, event| match event {
        // Handle macOS "Open With" / double-click file associations
        #[cfg(any(target_os = "macos", target_os = "ios"))]
        RunEvent::Opened { urls } => {
            handle_file_associations(_app_handle, urls);
        }
        _ => {}
    });
}

/// Get the file path that was passed on launch (if any).
/// Frontend calls this on startup to check if a PDF should be opened.
#[tauri::command]
fn get_launch_file(state: tauri::State<LaunchFile>) -> Option<String> {
    match state.0.lock() {
        Ok(mut guard) => guard.take(),
        Err(poisoned) => poisoned.into_inner().take(),
    }
}
