//! XAPK to engine project conversion.
//!
//! The downloaded `.xapk` is a zip of split APKs. Only `base_assets.apk` holds the
//! game data; the `config.*.apk` splits contribute native libraries under `lib/`.
//! Both are unpacked into one tree, which AssetRipper then exports as a project.

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{CoreError, Result};

const BASE_ASSETS_APK: &str = "base_assets.apk";
const EXPORT_DIR: &str = "_EXPORTED_";
const TEMP_DIR: &str = "temp";

/// Converts `package` (named `<app_id>@<version>.xapk`) into a project under
/// `out_dir/<version>` and returns that directory.
///
/// An existing output directory for the same version is replaced.
pub fn convert_package(package: &Path, out_dir: &Path, asset_ripper: &Path) -> Result<PathBuf> {
    raise_open_file_limit()?;

    if !package.exists() {
        return Err(CoreError::NotFound(package.to_path_buf()));
    }
    if !out_dir.exists() {
        return Err(CoreError::NotFound(out_dir.to_path_buf()));
    }

    let version = package_version(package)?;
    let output_path = out_dir.join(&version);
    if output_path.exists() {
        fs::remove_dir_all(&output_path)?;
    }
    fs::create_dir_all(&output_path)?;

    let temp_dir = output_path.join(TEMP_DIR);
    fs::create_dir_all(&temp_dir)?;

    let base_assets_dir = stage_package(package, &temp_dir)?;

    let export_dir = output_path.join(EXPORT_DIR);
    fs::create_dir_all(&export_dir)?;
    run_asset_ripper(asset_ripper, &base_assets_dir, &export_dir)?;

    fs::remove_dir_all(&temp_dir)?;
    for entry in fs::read_dir(&export_dir)? {
        let source = entry?.path();
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = output_path.join(name);
        if source.is_dir() {
            merge_directories(&source, &target)?;
        } else {
            fs::copy(&source, &target)?;
        }
    }
    fs::remove_dir_all(&export_dir)?;

    log::info!("[Convert] Done, project written to {}", output_path.display());
    Ok(output_path)
}

/// `<app_id>@<version>.xapk` -> `<version>`.
pub fn package_version(package: &Path) -> Result<String> {
    let stem = package
        .file_stem()
        .ok_or_else(|| CoreError::InvalidInput("Cannot read package file name".into()))?
        .to_string_lossy();

    stem.split('@')
        .nth(1)
        .filter(|version| !version.is_empty())
        .map(str::to_string)
        .ok_or_else(|| {
            CoreError::InvalidInput(
                "Package file name must look like <app_id>@<version>.xapk".into(),
            )
        })
}

/// Unpacks the XAPK into `temp_dir` and prepares `temp_dir/base_assets` with the
/// native libraries of every config split merged in. Returns that directory.
pub fn stage_package(package: &Path, temp_dir: &Path) -> Result<PathBuf> {
    log::info!("[Convert] Extracting {}", package.display());
    extract_zip(package, temp_dir)?;

    let mut base_assets: Option<PathBuf> = None;
    let mut config_apks = Vec::new();
    for entry in fs::read_dir(temp_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let name = path.file_name().unwrap_or_default().to_string_lossy().to_string();
        if name == BASE_ASSETS_APK {
            base_assets = Some(path);
        } else if is_config_apk(&name) {
            config_apks.push(path);
        }
    }
    config_apks.sort();

    let base_assets = base_assets.ok_or_else(|| {
        CoreError::InvalidInput(format!("{BASE_ASSETS_APK} not found in package"))
    })?;
    log::info!(
        "[Convert] Found {BASE_ASSETS_APK} and {} config splits",
        config_apks.len()
    );

    remove_entries(temp_dir, |name| name == BASE_ASSETS_APK || is_config_apk(name))?;

    let base_assets_dir = temp_dir.join("base_assets");
    fs::create_dir_all(&base_assets_dir)?;
    extract_zip(&base_assets, &base_assets_dir)?;

    let config_dir = temp_dir.join("config_temp");
    for config_apk in &config_apks {
        log::info!("[Convert] Merging libraries from {}", config_apk.display());
        if config_dir.exists() {
            fs::remove_dir_all(&config_dir)?;
        }
        fs::create_dir_all(&config_dir)?;
        extract_zip(config_apk, &config_dir)?;

        let config_lib = config_dir.join("lib");
        if config_lib.exists() {
            merge_directories(&config_lib, &base_assets_dir.join("lib"))?;
        }
        fs::remove_dir_all(&config_dir)?;
    }

    remove_entries(temp_dir, |name| name == "base_assets")?;
    Ok(base_assets_dir)
}

fn run_asset_ripper(asset_ripper: &Path, input: &Path, output: &Path) -> Result<()> {
    if !asset_ripper.exists() {
        return Err(CoreError::Tool {
            tool: "AssetRipper",
            message: format!("executable not found at {}", asset_ripper.display()),
        });
    }

    let mut command = Command::new(asset_ripper);
    command
        .arg("--InputPath")
        .arg(input)
        .arg("--OutputPath")
        .arg(output)
        .stdout(Stdio::null());
    log::info!("[Convert] Running {command:?}");

    let status = command
        .status()
        .map_err(|error| CoreError::Tool {
            tool: "AssetRipper",
            message: format!("failed to start: {error}"),
        })?;

    if !status.success() {
        return Err(CoreError::Tool {
            tool: "AssetRipper",
            message: format!("exited with {status}"),
        });
    }
    Ok(())
}

fn is_config_apk(name: &str) -> bool {
    name.starts_with("config.") && name.ends_with(".apk")
}

/// Deletes every entry of `dir` whose name `keep` rejects.
fn remove_entries(dir: &Path, keep: impl Fn(&str) -> bool) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let name = path.file_name().unwrap_or_default().to_string_lossy().to_string();
        if keep(&name) {
            continue;
        }
        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }
    Ok(())
}

fn extract_zip(zip_path: &Path, extract_to: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(zip_path)?);
    let mut archive = ZipArchive::new(reader)?;
    log::debug!(
        "[Convert] Extracting {} entries from {}",
        archive.len(),
        zip_path.display()
    );

    for index in 0..archive.len() {
        let mut file = archive.by_index(index)?;
        let Some(relative) = file.enclosed_name() else {
            continue;
        };
        let out_path = extract_to.join(relative);

        if file.is_dir() {
            fs::create_dir_all(&out_path)?;
        } else {
            if let Some(parent) = out_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut out_file = File::create(&out_path)?;
            io::copy(&mut file, &mut out_file)?;
        }

        #[cfg(unix)]
        if let Some(mode) = file.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))?;
        }
    }
    Ok(())
}

/// Copies `source` into `target`, overwriting files that already exist.
fn merge_directories(source: &Path, target: &Path) -> Result<()> {
    if !source.exists() {
        return Err(CoreError::NotFound(source.to_path_buf()));
    }

    for entry in WalkDir::new(source) {
        let entry = entry.map_err(|error| CoreError::Io(io::Error::other(error)))?;
        let relative = entry
            .path()
            .strip_prefix(source)
            .map_err(|error| CoreError::InvalidInput(error.to_string()))?;
        let destination = target.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&destination)?;
        } else {
            if let Some(parent) = destination.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &destination)?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn raise_open_file_limit() -> Result<()> {
    // AssetRipper keeps thousands of bundle files open at once.
    match rlimit::increase_nofile_limit(16384) {
        Ok(limit) => log::debug!("[Convert] File limit set to {limit}"),
        Err(error) => log::warn!("[Convert] Could not raise file limit: {error}"),
    }
    Ok(())
}

#[cfg(not(unix))]
fn raise_open_file_limit() -> Result<()> {
    Ok(())
}
