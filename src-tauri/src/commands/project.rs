use kgc_core::ProjectState;
use tauri::{AppHandle, State};
use tauri_plugin_dialog::DialogExt;

use super::{lock, CatalogState};
use crate::storage::history;

/// Shows a folder picker. `None` when the user cancels.
#[tauri::command]
pub async fn select_project_folder(app: AppHandle) -> Result<Option<String>, String> {
    let folder = app.dialog().file().blocking_pick_folder();
    Ok(folder.map(|path| path.to_string()))
}

#[tauri::command]
pub async fn get_project_state(state: State<'_, CatalogState>) -> Result<ProjectState, String> {
    Ok(lock(&state)?.project().clone())
}

/// Opens the project at `path` and remembers it for the next launch.
#[tauri::command]
pub async fn set_project_path(
    path: String,
    app: AppHandle,
    state: State<'_, CatalogState>,
) -> Result<ProjectState, String> {
    let project = {
        let mut catalog = lock(&state)?;
        if catalog.set_project_path(path.clone()) {
            log::info!("[Project] Opened {path}");
        }
        catalog.project().clone()
    };

    if let Err(error) = history::set_last_project(&app, &path) {
        log::warn!("[Project] Failed to remember project path: {error}");
    }
    Ok(project)
}

#[tauri::command]
pub fn get_last_project(app: AppHandle) -> Result<Option<String>, String> {
    history::get_last_project(&app).map_err(|error| error.to_string())
}
