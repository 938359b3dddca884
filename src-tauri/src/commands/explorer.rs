use std::path::Path;
use std::sync::{Arc, Mutex};

use kgc_core::explorer::{self, FileInfo, FileNode};
use kgc_core::FileExplorer;
use tauri::{AppHandle, Emitter, State};
use tauri_plugin_opener::OpenerExt;

use super::{blocking, lock, ExplorerState};

pub const FS_CHANGED_EVENT: &str = "fs-changed";

fn snapshot(explorer: &FileExplorer) -> Result<serde_json::Value, String> {
    serde_json::to_value(explorer).map_err(|error| error.to_string())
}

/// Loads `path`, holding the lock only to mark the load and to store the tree.
fn load_unlocked(explorer: &Mutex<FileExplorer>, path: &str) -> Result<(), String> {
    if !lock(explorer)?.begin_load(path) {
        return Ok(());
    }
    let tree = FileExplorer::read_root(path);
    let mut explorer = lock(explorer)?;
    explorer
        .finish_load(path, tree)
        .map_err(|_| explorer.error.clone())
}

#[tauri::command]
pub async fn get_file_tree(path: String) -> Result<FileNode, String> {
    blocking(move || explorer::read_tree(Path::new(&path)).map_err(|error| error.to_string()))
        .await
}

#[tauri::command]
pub fn get_file_info(file_path: String) -> Result<FileInfo, String> {
    explorer::get_file_info(Path::new(&file_path)).map_err(|error| error.to_string())
}

#[tauri::command]
pub fn read_file_content(path: String) -> Result<String, String> {
    explorer::read_file_content(Path::new(&path)).map_err(|error| error.to_string())
}

#[tauri::command]
pub async fn get_explorer_state(state: State<'_, ExplorerState>) -> Result<serde_json::Value, String> {
    snapshot(&*lock(&state)?)
}

#[tauri::command]
pub async fn load_directory(
    path: String,
    state: State<'_, ExplorerState>,
) -> Result<serde_json::Value, String> {
    let explorer = state.inner().clone();
    blocking(move || {
        load_unlocked(&explorer, &path)?;
        snapshot(&*lock(&explorer)?)
    })
    .await
}

#[tauri::command]
pub async fn refresh_directory(
    state: State<'_, ExplorerState>,
) -> Result<serde_json::Value, String> {
    let explorer = state.inner().clone();
    blocking(move || {
        let root = lock(&explorer)?.root_path.clone();
        if !root.is_empty() {
            load_unlocked(&explorer, &root)?;
        }
        snapshot(&*lock(&explorer)?)
    })
    .await
}

#[tauri::command]
pub async fn set_selected_path(path: String, state: State<'_, ExplorerState>) -> Result<(), String> {
    lock(&state)?.set_selected_path(path);
    Ok(())
}

#[tauri::command]
pub async fn clear_explorer_error(state: State<'_, ExplorerState>) -> Result<(), String> {
    lock(&state)?.clear_error();
    Ok(())
}

/// Watches `path` (or the current root) and emits `fs-changed` with the reloaded
/// tree after every change.
#[tauri::command]
pub async fn start_watching(
    path: Option<String>,
    app: AppHandle,
    state: State<'_, ExplorerState>,
) -> Result<(), String> {
    let explorer = state.inner().clone();
    blocking(move || {
        let root = lock(&explorer)?.root_path.clone();
        if let Some(path) = path.filter(|path| *path != root) {
            load_unlocked(&explorer, &path)?;
        }

        let weak = Arc::downgrade(&explorer);
        lock(&explorer)?
            .start_watching(move |event| {
                let Some(explorer) = weak.upgrade() else {
                    return;
                };
                let Ok(root) = explorer.lock().map(|explorer| explorer.root_path.clone()) else {
                    return;
                };
                if root.is_empty() {
                    return;
                }

                let tree = FileExplorer::read_root(&root);
                let changed = match explorer.lock() {
                    Ok(mut explorer) => explorer.apply_tree(&event, &root, tree),
                    Err(_) => return,
                };
                if let Some(changed) = changed {
                    if let Err(error) = app.emit(FS_CHANGED_EVENT, &changed) {
                        log::warn!("[FileExplorer] Failed to emit {FS_CHANGED_EVENT}: {error}");
                    }
                }
            })
            .map_err(|error| error.to_string())
    })
    .await
}

#[tauri::command]
pub async fn stop_watching(state: State<'_, ExplorerState>) -> Result<(), String> {
    lock(&state)?.stop_watching();
    Ok(())
}

#[tauri::command]
pub fn open_in_system(path: String, app: AppHandle) -> Result<(), String> {
    app.opener()
        .open_path(path, None::<&str>)
        .map_err(|error| format!("Failed to open path: {error}"))
}
