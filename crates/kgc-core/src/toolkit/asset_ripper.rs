use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Bundled AssetRipper location for this platform, relative to the working
/// directory. `None` on platforms without a bundled build.
pub fn default_asset_ripper_path() -> Option<PathBuf> {
    let (os, suffix) = match std::env::consts::OS {
        "windows" => ("win", ".exe"),
        "linux" => ("linux", ""),
        _ => return None,
    };
    Some(PathBuf::from(format!(
        "binaries/asset-ripper-{os}-x64/AssetRipper.GUI.Free{suffix}"
    )))
}

/// True when the executable exists and can be started.
pub fn check_asset_ripper(path: &Path) -> bool {
    if !path.exists() {
        return false;
    }

    match Command::new(path)
        .arg("--help")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    {
        Ok(mut child) => {
            let _ = child.kill();
            let _ = child.wait();
            true
        }
        Err(error) => {
            log::warn!("[AssetRipper] {} cannot be started: {error}", path.display());
            false
        }
    }
}
