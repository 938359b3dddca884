use std::path::{Path, PathBuf};

use kgc_core::toolkit::{self, apkeep::VERSIONS_TIMEOUT};
use kgc_core::AppSettings;
use tauri::State;

use super::{blocking, lock, SettingsState};

fn current_settings(state: &SettingsState) -> Result<AppSettings, String> {
    Ok(lock(state)?.clone())
}

fn asset_ripper(settings: &AppSettings) -> Result<PathBuf, String> {
    settings
        .asset_ripper()
        .ok_or_else(|| "AssetRipper is not available on this platform".to_string())
}

#[tauri::command]
pub async fn get_app_versions(
    app_name: Option<String>,
    state: State<'_, SettingsState>,
) -> Result<Vec<String>, String> {
    let settings = current_settings(&state)?;
    let app_name = app_name.unwrap_or(settings.app_package_id);
    toolkit::get_app_versions(Path::new(&settings.apkeep_path), &app_name, VERSIONS_TIMEOUT)
        .await
        .map_err(|error| error.to_string())
}

#[tauri::command]
pub async fn download_app(
    app_name: Option<String>,
    version: Option<String>,
    out_path: String,
    state: State<'_, SettingsState>,
) -> Result<bool, String> {
    let settings = current_settings(&state)?;
    let app_name = app_name.unwrap_or_else(|| settings.app_package_id.clone());
    toolkit::download_app(
        Path::new(&settings.apkeep_path),
        &app_name,
        version.as_deref(),
        Path::new(&out_path),
        settings.download_timeout(),
    )
    .await
    .map(|()| true)
    .map_err(|error| error.to_string())
}

#[tauri::command]
pub async fn check_asset_ripper(state: State<'_, SettingsState>) -> Result<bool, String> {
    let settings = current_settings(&state)?;
    Ok(settings
        .asset_ripper()
        .is_some_and(|path| toolkit::check_asset_ripper(&path)))
}

/// Converts a downloaded package into a browsable project. Returns the project path.
#[tauri::command]
pub async fn c2u(
    app_path: String,
    out_path: String,
    state: State<'_, SettingsState>,
) -> Result<String, String> {
    let ripper = asset_ripper(&current_settings(&state)?)?;
    blocking(move || {
        toolkit::convert_package(Path::new(&app_path), Path::new(&out_path), &ripper)
            .map(|path| path.to_string_lossy().to_string())
            .map_err(|error| error.to_string())
    })
    .await
}
