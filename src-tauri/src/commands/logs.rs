use kgc_core::logs::{LogEntry, LogFiles, DEFAULT_RECENT_LINES};
use tauri::State;

use super::{blocking, lock, SettingsState};

fn log_files() -> Result<LogFiles, String> {
    LogFiles::default_location().map_err(|error| error.to_string())
}

#[tauri::command]
pub fn ensure_log_directory() -> Result<(), String> {
    log_files()?
        .ensure_dir()
        .map_err(|error| format!("Failed to create log directory: {error}"))
}

#[tauri::command]
pub fn write_log_entry(entry: LogEntry) -> Result<(), String> {
    log_files()?
        .write(&entry)
        .map_err(|error| format!("Failed to write to log file: {error}"))
}

#[tauri::command]
pub async fn get_recent_logs(lines: Option<usize>) -> Result<Vec<String>, String> {
    let files = log_files()?;
    blocking(move || {
        files
            .recent(lines.unwrap_or(DEFAULT_RECENT_LINES))
            .map_err(|error| format!("Failed to read log file: {error}"))
    })
    .await
}

#[tauri::command]
pub async fn clear_old_logs(
    days_to_keep: Option<u64>,
    state: State<'_, SettingsState>,
) -> Result<u32, String> {
    let days = match days_to_keep {
        Some(days) => days,
        None => lock(&state)?.log_retention_days,
    };
    let files = log_files()?;
    blocking(move || {
        files
            .clear_old(days)
            .map_err(|error| format!("Failed to clear old logs: {error}"))
    })
    .await
}
