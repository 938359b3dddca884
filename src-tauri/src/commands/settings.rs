use kgc_core::AppSettings;
use tauri::{AppHandle, State};

use super::{lock, CatalogState, SettingsState};
use crate::storage::settings;

#[tauri::command]
pub async fn get_settings(state: State<'_, SettingsState>) -> Result<AppSettings, String> {
    Ok(lock(&state)?.clone())
}

/// Persists `settings_data` and applies it to the running services.
#[tauri::command]
pub async fn save_settings(
    settings_data: AppSettings,
    app: AppHandle,
    state: State<'_, SettingsState>,
    catalog: State<'_, CatalogState>,
) -> Result<(), String> {
    settings::save_settings(&app, &settings_data).map_err(|error| error.to_string())?;
    lock(&catalog)?.set_max_age(settings_data.cache_max_age());
    *lock(&state)? = settings_data;
    Ok(())
}
