use tauri::{Runtime, Window};

#[tauri::command]
pub fn set_app_title<R: Runtime>(window: Window<R>, title: String) -> Result<(), String> {
    window
        .set_title(&title)
        .map_err(|error| format!("Failed to set title: {error}"))
}
