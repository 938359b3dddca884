use std::path::Path;
use std::sync::{Arc, Mutex};

use kgc_core::logs::LogFiles;
use kgc_core::{AppSettings, FileExplorer, HeroCatalog};
use tauri::{AppHandle, Manager};

pub mod commands;
pub mod storage;

use commands::{CatalogState, ExplorerState, SettingsState};

fn load_settings(app: &AppHandle) -> AppSettings {
    storage::settings::get_settings(app).unwrap_or_else(|error| {
        log::warn!("[Setup] Using default settings: {error}");
        AppSettings::default()
    })
}

/// Reopens the project from the previous session if it is still on disk.
fn restore_last_project(app: &AppHandle, catalog: &mut HeroCatalog) {
    match storage::history::get_last_project(app) {
        Ok(Some(path)) if Path::new(&path).is_dir() => {
            log::info!("[Setup] Restoring project {path}");
            catalog.set_project_path(path);
        }
        Ok(Some(path)) => log::info!("[Setup] Last project {path} is gone"),
        Ok(None) => {}
        Err(error) => log::warn!("[Setup] Failed to read project history: {error}"),
    }
}

fn clear_old_logs(retention_days: u64) {
    let removed = LogFiles::default_location().and_then(|logs| logs.clear_old(retention_days));
    match removed {
        Ok(0) => {}
        Ok(count) => log::info!("[Setup] Removed {count} old log files"),
        Err(error) => log::warn!("[Setup] Failed to clear old logs: {error}"),
    }
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .plugin(tauri_plugin_dialog::init())
        .plugin(tauri_plugin_store::Builder::new().build())
        .setup(|app| {
            let handle = app.handle();
            let settings = load_settings(handle);

            let mut catalog = HeroCatalog::new();
            catalog.set_max_age(settings.cache_max_age());
            restore_last_project(handle, &mut catalog);

            let retention_days = settings.log_retention_days;
            tauri::async_runtime::spawn_blocking(move || clear_old_logs(retention_days));

            let catalog: CatalogState = Arc::new(Mutex::new(catalog));
            let explorer: ExplorerState = Arc::new(Mutex::new(FileExplorer::new()));
            let settings: SettingsState = Arc::new(Mutex::new(settings));
            app.manage(catalog);
            app.manage(explorer);
            app.manage(settings);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            commands::assets::check_path_exists,
            commands::assets::check_is_directory,
            commands::assets::read_directory,
            commands::assets::read_file_as_bytes,
            commands::assets::read_text_file,
            commands::assets::crop_image_from_bytes,
            commands::assets::optimize_image_bytes,
            commands::assets::parse_asset_file,
            commands::explorer::get_file_tree,
            commands::explorer::get_file_info,
            commands::explorer::read_file_content,
            commands::explorer::get_explorer_state,
            commands::explorer::load_directory,
            commands::explorer::refresh_directory,
            commands::explorer::set_selected_path,
            commands::explorer::clear_explorer_error,
            commands::explorer::start_watching,
            commands::explorer::stop_watching,
            commands::explorer::open_in_system,
            commands::project::select_project_folder,
            commands::project::get_project_state,
            commands::project::set_project_path,
            commands::project::get_last_project,
            commands::heroes::load_heroes,
            commands::heroes::refresh_heroes,
            commands::heroes::select_hero,
            commands::heroes::load_hero_avatar,
            commands::heroes::load_hero_skin,
            commands::heroes::load_hero_skin_color,
            commands::heroes::reset_to_default_skin,
            commands::heroes::discover_hero_skins,
            commands::heroes::clear_heroes_cache,
            commands::heroes::is_hero_cache_valid,
            commands::export::export_hero_avatar,
            commands::export::export_hero_skin_image,
            commands::export::export_heroes_bulk,
            commands::toolkit::get_app_versions,
            commands::toolkit::download_app,
            commands::toolkit::check_asset_ripper,
            commands::toolkit::c2u,
            commands::logs::ensure_log_directory,
            commands::logs::write_log_entry,
            commands::logs::get_recent_logs,
            commands::logs::clear_old_logs,
            commands::settings::get_settings,
            commands::settings::save_settings,
            commands::window::set_app_title,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
