//! Writing hero images out of the project.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::avatar::decode_data_url;
use super::model::Hero;
use crate::error::{CoreError, Result};
use crate::layout;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkExport {
    pub exported: Vec<String>,
    pub failures: Vec<ExportFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFailure {
    pub hero_id: String,
    pub message: String,
}

/// Writes the hero's current avatar as `<id>_<name>.png` into `out_dir`.
pub fn export_hero_avatar(hero: &Hero, out_dir: &Path) -> Result<PathBuf> {
    ensure_dir(out_dir)?;

    let avatar = hero.avatar.as_ref().ok_or_else(|| {
        CoreError::InvalidInput(format!("Hero {} has no loaded avatar", hero.id))
    })?;
    let bytes = decode_data_url(&avatar.data_url).ok_or_else(|| {
        CoreError::InvalidInput(format!("Avatar of hero {} is not a data URL", hero.id))
    })?;

    let target = out_dir.join(format!("{}_{}.png", hero.id, sanitize_filename(&hero.name)));
    fs::write(&target, bytes)?;
    log::info!("[Export] Avatar of hero {} -> {}", hero.id, target.display());
    Ok(target)
}

/// Copies the unit image of a skin (and color) into `out_dir`.
pub fn export_hero_skin_image(
    project: &Path,
    hero_id: &str,
    skin_id: &str,
    color_id: Option<&str>,
    out_dir: &Path,
) -> Result<PathBuf> {
    ensure_dir(out_dir)?;

    let file_name = match color_id {
        Some(color) => format!("Unit_{hero_id}_{skin_id}_{color}.png"),
        None => format!("Unit_{hero_id}_{skin_id}.png"),
    };
    let source = layout::unit_image_dir(project).join(&file_name);
    if !source.is_file() {
        return Err(CoreError::NotFound(source));
    }

    let target = out_dir.join(&file_name);
    fs::copy(&source, &target)?;
    log::info!("[Export] {} -> {}", source.display(), target.display());
    Ok(target)
}

/// Exports every hero that has an avatar. Heroes without one are listed as failures.
pub fn export_heroes_bulk(heroes: &[Hero], out_dir: &Path) -> Result<BulkExport> {
    ensure_dir(out_dir)?;

    let mut report = BulkExport::default();
    for hero in heroes {
        match export_hero_avatar(hero, out_dir) {
            Ok(path) => report.exported.push(path.to_string_lossy().to_string()),
            Err(error) => report.failures.push(ExportFailure {
                hero_id: hero.id.clone(),
                message: error.to_string(),
            }),
        }
    }

    log::info!(
        "[Export] Bulk export: {} exported, {} failed",
        report.exported.len(),
        report.failures.len()
    );
    Ok(report)
}

fn ensure_dir(out_dir: &Path) -> Result<()> {
    if !out_dir.is_dir() {
        return Err(CoreError::NotFound(out_dir.to_path_buf()));
    }
    Ok(())
}

fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}
