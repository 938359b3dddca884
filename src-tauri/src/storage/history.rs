use tauri::{AppHandle, Runtime};
use tauri_plugin_store::StoreExt;

use super::Result;

const STORE_FILE: &str = "history.json";
const PROJECT_KEY: &str = "project";

/// Path of the project opened last, if any.
pub fn get_last_project<R: Runtime>(app: &AppHandle<R>) -> Result<Option<String>> {
    let store = app.store(STORE_FILE)?;
    Ok(parse_project(store.get(PROJECT_KEY)))
}

pub fn set_last_project<R: Runtime>(app: &AppHandle<R>, path: &str) -> Result<()> {
    let store = app.store(STORE_FILE)?;
    store.set(PROJECT_KEY, serde_json::Value::String(path.to_string()));
    store.save()?;
    Ok(())
}

fn parse_project(value: Option<serde_json::Value>) -> Option<String> {
    value
        .and_then(|value| value.as_str().map(str::to_string))
        .filter(|path| !path.trim().is_empty())
}
