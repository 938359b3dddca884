use std::path::Path;

use kgc_core::heroes::{self, BulkExport};
use kgc_core::CoreError;
use tauri::State;

use super::{blocking, lock, CatalogState};

#[tauri::command]
pub async fn export_hero_avatar(
    hero_id: String,
    out_dir: String,
    state: State<'_, CatalogState>,
) -> Result<String, String> {
    let hero = lock(&state)?
        .heroes()
        .iter()
        .find(|hero| hero.id == hero_id)
        .cloned()
        .ok_or_else(|| CoreError::HeroNotFound(hero_id).to_string())?;

    blocking(move || {
        heroes::export_hero_avatar(&hero, Path::new(&out_dir))
            .map(|path| path.to_string_lossy().to_string())
            .map_err(|error| format!("Failed to export avatar: {error}"))
    })
    .await
}

#[tauri::command]
pub async fn export_hero_skin_image(
    hero_id: String,
    skin_id: String,
    color_id: Option<String>,
    out_dir: String,
    state: State<'_, CatalogState>,
) -> Result<String, String> {
    let project = lock(&state)?
        .project_root()
        .map_err(|error| error.to_string())?;

    blocking(move || {
        heroes::export_hero_skin_image(
            &project,
            &hero_id,
            &skin_id,
            color_id.as_deref(),
            Path::new(&out_dir),
        )
        .map(|path| path.to_string_lossy().to_string())
        .map_err(|error| format!("Failed to export skin image: {error}"))
    })
    .await
}

#[tauri::command]
pub async fn export_heroes_bulk(
    out_dir: String,
    state: State<'_, CatalogState>,
) -> Result<BulkExport, String> {
    let roster = lock(&state)?.heroes().to_vec();

    blocking(move || {
        heroes::export_heroes_bulk(&roster, Path::new(&out_dir))
            .map_err(|error| format!("Failed to export heroes: {error}"))
    })
    .await
}
