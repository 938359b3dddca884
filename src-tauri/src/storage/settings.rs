use kgc_core::AppSettings;
use tauri::{AppHandle, Runtime};
use tauri_plugin_store::StoreExt;

use super::Result;

const STORE_FILE: &str = "setting.json";
const SETTINGS_KEY: &str = "settings";

/// Saved settings, or the defaults when nothing was saved yet.
pub fn get_settings<R: Runtime>(app: &AppHandle<R>) -> Result<AppSettings> {
    let store = app.store(STORE_FILE)?;
    Ok(parse_settings(store.get(SETTINGS_KEY)))
}

pub fn save_settings<R: Runtime>(app: &AppHandle<R>, settings: &AppSettings) -> Result<()> {
    let store = app.store(STORE_FILE)?;
    store.set(SETTINGS_KEY, serde_json::to_value(settings)?);
    store.save()?;
    Ok(())
}

fn parse_settings(value: Option<serde_json::Value>) -> AppSettings {
    value
        .and_then(|value| serde_json::from_value(value).ok())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_value_gives_defaults() {
        assert_eq!(parse_settings(None), AppSettings::default());
    }

    #[test]
    fn partial_value_keeps_saved_fields() {
        let settings = parse_settings(Some(json!({ "logRetentionDays": 14 })));
        assert_eq!(settings.log_retention_days, 14);
        assert_eq!(settings.cache_max_age_minutes, 30);
    }

    #[test]
    fn malformed_value_gives_defaults() {
        let settings = parse_settings(Some(json!("not an object")));
        assert_eq!(settings, AppSettings::default());
    }
}
