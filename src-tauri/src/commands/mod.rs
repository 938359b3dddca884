//! `#[tauri::command]` handlers. Each one forwards to `kgc_core` and turns the
//! error into a message for the web view.

pub mod assets;
pub mod explorer;
pub mod export;
pub mod heroes;
pub mod logs;
pub mod project;
pub mod settings;
pub mod toolkit;
pub mod window;

use std::sync::{Arc, Mutex, MutexGuard};

use kgc_core::{AppSettings, FileExplorer, HeroCatalog};

pub type CatalogState = Arc<Mutex<HeroCatalog>>;
pub type ExplorerState = Arc<Mutex<FileExplorer>>;
pub type SettingsState = Arc<Mutex<AppSettings>>;

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, String> {
    mutex
        .lock()
        .map_err(|error| format!("Failed to lock state: {error}"))
}

/// Runs filesystem-heavy work off the async runtime.
pub(crate) async fn blocking<T, F>(work: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, String> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|error| format!("Background task failed: {error}"))?
}
