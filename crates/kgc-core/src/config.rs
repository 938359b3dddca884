use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Package id of the game this toolkit is built around.
pub const APP_PACKAGE_ID: &str = "com.awesomepiece.castle";

/// User settings, persisted by the shell in `setting.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSettings {
    /// How long a discovered hero stays fresh in the cache.
    pub cache_max_age_minutes: u64,
    /// Log files older than this many days are removed on startup.
    pub log_retention_days: u64,
    pub download_timeout_secs: u64,
    pub apkeep_path: String,
    /// Overrides the bundled AssetRipper location when set.
    pub asset_ripper_path: Option<String>,
    pub app_package_id: String,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            cache_max_age_minutes: 30,
            log_retention_days: 7,
            download_timeout_secs: 300,
            apkeep_path: default_apkeep_path(),
            asset_ripper_path: None,
            app_package_id: APP_PACKAGE_ID.to_string(),
        }
    }
}

impl AppSettings {
    pub fn cache_max_age(&self) -> Duration {
        Duration::from_secs(self.cache_max_age_minutes.saturating_mul(60))
    }

    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn asset_ripper(&self) -> Option<PathBuf> {
        self.asset_ripper_path
            .as_ref()
            .map(PathBuf::from)
            .or_else(crate::toolkit::asset_ripper::default_asset_ripper_path)
    }
}

fn default_apkeep_path() -> String {
    if cfg!(target_os = "windows") {
        "./binaries/apkeep.exe".to_string()
    } else {
        "./binaries/apkeep".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = AppSettings::default();
        assert_eq!(settings.cache_max_age(), Duration::from_secs(1800));
        assert_eq!(settings.log_retention_days, 7);
        assert_eq!(settings.download_timeout(), Duration::from_secs(300));
        assert_eq!(settings.app_package_id, "com.awesomepiece.castle");
    }

    #[test]
    fn serde_camel_case_keys() {
        let json = serde_json::to_string(&AppSettings::default()).unwrap();
        assert!(json.contains("cacheMaxAgeMinutes"), "{}", json);
        assert!(!json.contains("cache_max_age_minutes"), "{}", json);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let settings: AppSettings =
            serde_json::from_str(r#"{"cacheMaxAgeMinutes": 5}"#).unwrap();
        assert_eq!(settings.cache_max_age_minutes, 5);
        assert_eq!(settings.download_timeout_secs, 300);
    }

    #[test]
    fn override_asset_ripper_path() {
        let settings = AppSettings {
            asset_ripper_path: Some("/opt/ripper".into()),
            ..AppSettings::default()
        };
        assert_eq!(settings.asset_ripper(), Some(PathBuf::from("/opt/ripper")));
    }
}
