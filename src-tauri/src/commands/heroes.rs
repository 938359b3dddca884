//! Hero roster commands.
//!
//! Scans and avatar reloads run on a blocking thread with the catalog unlocked;
//! the lock is only taken to detach the work and to store its result.

use kgc_core::heroes::{HeroEdit, HeroScan, HeroesState};
use kgc_core::{Hero, HeroSkin, LocalSource};
use tauri::State;

use super::{blocking, lock, CatalogState};

fn message(error: kgc_core::CoreError) -> String {
    error.to_string()
}

async fn run_scan<F>(state: &CatalogState, begin: F) -> Result<HeroesState, String>
where
    F: FnOnce(&mut kgc_core::HeroCatalog) -> Result<HeroScan<LocalSource>, HeroesState>
        + Send
        + 'static,
{
    let catalog = state.clone();
    blocking(move || {
        let scan = match begin(&mut *lock(&catalog)?) {
            Ok(scan) => scan,
            Err(state) => return Ok(state),
        };
        let roster = scan.run();
        Ok(lock(&catalog)?.finish_load(roster))
    })
    .await
}

/// Detaches `hero_id`, applies `change` without the lock and commits the result.
async fn edit_hero<F>(state: &CatalogState, hero_id: String, change: F) -> Result<Hero, String>
where
    F: FnOnce(&mut HeroEdit<LocalSource>) + Send + 'static,
{
    let catalog = state.clone();
    blocking(move || {
        let mut edit = lock(&catalog)?.edit_hero(&hero_id).map_err(message)?;
        change(&mut edit);
        lock(&catalog)?.commit(edit).map_err(message)
    })
    .await
}

#[tauri::command]
pub async fn load_heroes(state: State<'_, CatalogState>) -> Result<HeroesState, String> {
    run_scan(&state, |catalog| catalog.begin_load()).await
}

#[tauri::command]
pub async fn refresh_heroes(state: State<'_, CatalogState>) -> Result<HeroesState, String> {
    run_scan(&state, |catalog| catalog.begin_refresh()).await
}

#[tauri::command]
pub async fn select_hero(
    hero_id: Option<String>,
    state: State<'_, CatalogState>,
) -> Result<Option<Hero>, String> {
    lock(&state)?
        .select_hero(hero_id.as_deref())
        .map_err(message)
}

#[tauri::command]
pub async fn load_hero_avatar(
    hero_id: String,
    force_reload: Option<bool>,
    state: State<'_, CatalogState>,
) -> Result<Hero, String> {
    let force_reload = force_reload.unwrap_or(false);
    if !force_reload {
        let cached = lock(&state)?.cached_avatar(&hero_id).map_err(message)?;
        if let Some(cached) = cached {
            log::debug!("[Heroes/Cache/{hero_id}] Using cached avatar");
            return Ok(cached);
        }
    }

    log::info!("[Heroes] Loading avatar for hero {hero_id} (force: {force_reload})");
    edit_hero(&state, hero_id, |edit| {
        edit.load_avatar();
    })
    .await
}

#[tauri::command]
pub async fn load_hero_skin(
    hero_id: String,
    skin_id: String,
    color_id: Option<String>,
    state: State<'_, CatalogState>,
) -> Result<Hero, String> {
    edit_hero(&state, hero_id, move |edit| {
        edit.apply_skin(&skin_id, color_id.as_deref())
    })
    .await
}

#[tauri::command]
pub async fn load_hero_skin_color(
    hero_id: String,
    skin_id: String,
    color_id: String,
    state: State<'_, CatalogState>,
) -> Result<Hero, String> {
    edit_hero(&state, hero_id, move |edit| {
        edit.apply_skin(&skin_id, Some(&color_id))
    })
    .await
}

#[tauri::command]
pub async fn reset_to_default_skin(
    hero_id: String,
    state: State<'_, CatalogState>,
) -> Result<Hero, String> {
    edit_hero(&state, hero_id, HeroEdit::reset_skin).await
}

#[tauri::command]
pub async fn discover_hero_skins(
    hero_id: String,
    state: State<'_, CatalogState>,
) -> Result<Vec<HeroSkin>, String> {
    let project = lock(&state)?.project_root().map_err(message)?;
    blocking(move || {
        Ok(kgc_core::heroes::discover_hero_skins(
            &LocalSource,
            &hero_id,
            &project,
        ))
    })
    .await
}

#[tauri::command]
pub async fn clear_heroes_cache(state: State<'_, CatalogState>) -> Result<(), String> {
    lock(&state)?.clear_cache();
    Ok(())
}

#[tauri::command]
pub async fn is_hero_cache_valid(
    hero_id: String,
    state: State<'_, CatalogState>,
) -> Result<bool, String> {
    Ok(lock(&state)?.is_cache_valid(&hero_id))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use kgc_core::HeroCatalog;

    #[tokio::test]
    async fn scan_without_project_reports_state() {
        let state: CatalogState = Arc::new(Mutex::new(HeroCatalog::new()));
        let heroes = run_scan(&state, |catalog| catalog.begin_load())
            .await
            .unwrap();
        assert!(heroes.heroes.is_empty());
        assert_eq!(heroes.error.as_deref(), Some("No project selected"));
        assert!(!state.lock().unwrap().project().heroes_loading);
    }

    #[tokio::test]
    async fn edit_of_unknown_hero_is_an_error() {
        let state: CatalogState = Arc::new(Mutex::new(HeroCatalog::new()));
        let error = edit_hero(&state, "1014".into(), |edit| {
            edit.load_avatar();
        })
        .await
        .unwrap_err();
        assert_eq!(error, "No project selected");
    }
}
