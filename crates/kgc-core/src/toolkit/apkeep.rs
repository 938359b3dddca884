//! Package downloads through the `apkeep` command line tool.

use std::path::Path;
use std::time::Duration;

use tokio::process::Command;

use crate::error::{CoreError, Result};

pub const VERSIONS_TIMEOUT: Duration = Duration::from_secs(30);

/// Lists the versions `apkeep -l` reports for `app_name`.
pub async fn get_app_versions(
    apkeep: &Path,
    app_name: &str,
    timeout: Duration,
) -> Result<Vec<String>> {
    let mut cmd = Command::new(apkeep);
    cmd.arg("-a").arg(app_name).arg("-l").kill_on_drop(true);
    log::info!("[Versions] Executing {cmd:?}");

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| CoreError::Timeout("Listing versions", timeout.as_secs()))?
        .map_err(|error| CoreError::Tool {
            tool: "apkeep",
            message: format!("Failed to execute apkeep: {error}"),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("[Versions] Command failed. Stdout: {stdout}, Stderr: {stderr}");
        return Err(CoreError::Tool {
            tool: "apkeep",
            message: format!("Failed to get versions: {stderr}"),
        });
    }

    let versions = parse_versions(&stdout);
    log::info!("[Versions] Found {} versions of {app_name}", versions.len());
    Ok(versions)
}

/// Extracts the version list from `apkeep -l` output.
///
/// The list follows the first `"| "` and is comma separated; it may wrap over
/// several lines.
pub fn parse_versions(stdout: &str) -> Vec<String> {
    let full_text = stdout.replace('\n', " ");
    let Some(start) = full_text.find("| ") else {
        return Vec::new();
    };

    full_text[start + 2..]
        .split(", ")
        .map(|version| version.trim().to_string())
        .filter(|version| {
            !version.is_empty()
                && version.chars().any(|c| c.is_numeric())
                && !version.contains("Versions")
                && !version.contains("available")
        })
        .collect()
}

/// Downloads `app_name` (optionally a specific version) into `out_path`.
pub async fn download_app(
    apkeep: &Path,
    app_name: &str,
    version: Option<&str>,
    out_path: &Path,
    timeout: Duration,
) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            return Err(CoreError::InvalidInput(format!(
                "Output directory does not exist: {}",
                parent.display()
            )));
        }
    }

    let app = match version {
        Some(version) => format!("{app_name}@{version}"),
        None => app_name.to_string(),
    };

    let mut cmd = Command::new(apkeep);
    cmd.arg("-a").arg(&app).arg(out_path).kill_on_drop(true);
    log::info!("[Download] Executing {cmd:?}");

    let output = tokio::time::timeout(timeout, cmd.output())
        .await
        .map_err(|_| {
            log::error!("[Download] Timeout after {} seconds", timeout.as_secs());
            CoreError::Timeout("Download", timeout.as_secs())
        })?
        .map_err(|error| CoreError::Tool {
            tool: "apkeep",
            message: format!("Failed to execute apkeep: {error}"),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::error!("[Download] {app} failed: {stderr}");
        return Err(CoreError::Tool {
            tool: "apkeep",
            message: format!("Download failed: {stderr}"),
        });
    }

    log::info!("[Download] {app} downloaded to {}", out_path.display());
    Ok(())
}
