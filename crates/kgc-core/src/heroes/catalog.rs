//! Hero roster of the open project.
//!
//! [`HeroCatalog`] scans the hero folder directory, builds a [`Hero`] per matching
//! folder, attaches skins and the default avatar, and remembers every result in
//! the project's hero cache. Skin and color switches reload the avatar for one
//! hero and write the updated snapshot back to the cache.
//!
//! Scans and avatar reloads touch many files, so both come in two halves: a
//! [`HeroScan`] or [`HeroEdit`] detached from the catalog does the disk work, and
//! the result is written back afterwards. A result for a project that is no
//! longer open is dropped.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Serialize;

use super::avatar::{load_hero_avatar_with, AvatarAtlas, AvatarOutcome};
use super::cache::{HeroesCache, DEFAULT_MAX_AGE};
use super::folder::parse_hero_folder;
use super::model::{Hero, HeroSkin};
use super::skins::discover_hero_skins;
use crate::error::{CoreError, Result};
use crate::layout;
use crate::project::ProjectState;
use crate::source::{AssetSource, LocalSource};

/// What the roster view renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroesState {
    pub heroes: Vec<Hero>,
    pub loading: bool,
    pub error: Option<String>,
}

pub struct HeroCatalog<S = LocalSource> {
    source: S,
    max_age: Duration,
    project: ProjectState,
    heroes: Vec<Hero>,
    error: Option<String>,
}

impl HeroCatalog<LocalSource> {
    pub fn new() -> Self {
        Self::with_source(LocalSource)
    }
}

impl Default for HeroCatalog<LocalSource> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: AssetSource> HeroCatalog<S> {
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            max_age: DEFAULT_MAX_AGE,
            project: ProjectState::new(),
            heroes: Vec::new(),
            error: None,
        }
    }

    pub fn set_max_age(&mut self, max_age: Duration) {
        self.max_age = max_age;
    }

    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    pub fn project(&self) -> &ProjectState {
        &self.project
    }

    pub fn heroes(&self) -> &[Hero] {
        &self.heroes
    }

    pub fn state(&self) -> HeroesState {
        HeroesState {
            heroes: self.heroes.clone(),
            loading: self.project.heroes_loading,
            error: self.error.clone(),
        }
    }

    /// Opens another project. The roster is emptied until the next [`load_heroes`].
    ///
    /// [`load_heroes`]: HeroCatalog::load_heroes
    pub fn set_project_path(&mut self, path: impl Into<String>) -> bool {
        let changed = self.project.set_path(path);
        if changed {
            self.heroes.clear();
            self.error = None;
            self.project.heroes_loading = false;
        }
        changed
    }

    pub fn is_cache_valid(&self, hero_id: &str) -> bool {
        self.project
            .heroes_cache
            .is_cache_valid(hero_id, self.max_age)
    }

    pub fn clear_cache(&mut self) {
        self.project.heroes_cache.clear();
    }

    pub fn select_hero(&mut self, hero_id: Option<&str>) -> Result<Option<Hero>> {
        let hero = match hero_id {
            Some(id) => Some(self.find(id)?.clone()),
            None => None,
        };
        self.project.set_selected_hero(hero.clone());
        Ok(hero)
    }

    pub fn discover_hero_skins(&self, hero_id: &str) -> Result<Vec<HeroSkin>> {
        let project = self.project_root()?;
        Ok(discover_hero_skins(&self.source, hero_id, &project))
    }

    /// Root of the open project.
    pub fn project_root(&self) -> Result<PathBuf> {
        if !self.project.has_project() {
            return Err(CoreError::NoProject);
        }
        Ok(Path::new(&self.project.path).to_path_buf())
    }

    /// The cached hero when its entry is fresh and already carries an avatar.
    pub fn cached_avatar(&self, hero_id: &str) -> Result<Option<Hero>> {
        self.project_root()?;
        let cached = self.project.heroes_cache.fresh(hero_id, self.max_age);
        Ok(cached.filter(|hero| hero.avatar.is_some()).cloned())
    }

    /// Stores an edited hero in the roster, the cache and the selection.
    ///
    /// Fails when the project changed or the hero left the roster while the edit
    /// was running.
    pub fn commit(&mut self, edit: HeroEdit<S>) -> Result<Hero> {
        let hero = edit.hero;
        if edit.project_path != self.project.path {
            log::info!("[Heroes/{}] Dropping edit made for {}", hero.id, edit.project_path);
            return Err(CoreError::HeroNotFound(hero.id));
        }
        self.find(&hero.id)?;

        let avatar_processed = hero.avatar.is_some();
        self.project
            .heroes_cache
            .cache_hero(&hero.id, &hero, avatar_processed);
        self.project.sync_selected(&hero);
        if let Some(slot) = self.heroes.iter_mut().find(|slot| slot.id == hero.id) {
            *slot = hero.clone();
        }
        Ok(hero)
    }

    /// Writes a finished scan back.
    ///
    /// Freshly discovered heroes enter the cache; problems end up in
    /// [`HeroesState::error`] with an empty roster.
    pub fn finish_load(&mut self, roster: ScannedRoster) -> HeroesState {
        if roster.project != self.project.path {
            log::info!("[Heroes] Dropping heroes scanned for {}", roster.project);
            return self.state();
        }

        for (hero, avatar_processed) in &roster.discovered {
            self.project
                .heroes_cache
                .cache_hero(&hero.id, hero, *avatar_processed);
        }

        match roster.result {
            Ok(heroes) => {
                log::info!(
                    "[Heroes] Loaded {} heroes ({} with skins)",
                    heroes.len(),
                    heroes.iter().filter(|hero| hero.has_skins()).count()
                );
                self.heroes = heroes;
                self.error = None;
            }
            Err(error) => {
                log::error!("[Heroes] Failed to load heroes: {error}");
                self.heroes.clear();
                self.error = Some(error.to_string());
            }
        }

        self.project.heroes_loading = false;
        self.state()
    }

    fn find(&self, hero_id: &str) -> Result<&Hero> {
        self.heroes
            .iter()
            .find(|hero| hero.id == hero_id)
            .ok_or_else(|| {
                log::error!("[Heroes] Hero not found: {hero_id}");
                CoreError::HeroNotFound(hero_id.to_string())
            })
    }
}

impl<S: AssetSource + Clone> HeroCatalog<S> {
    /// Marks the roster as loading and detaches the scan.
    ///
    /// Without a project there is nothing to scan and the resulting state is
    /// returned instead.
    pub fn begin_load(&mut self) -> std::result::Result<HeroScan<S>, HeroesState> {
        if !self.project.has_project() {
            self.heroes.clear();
            self.error = Some(CoreError::NoProject.to_string());
            return Err(self.state());
        }

        self.project.heroes_loading = true;
        self.error = None;
        Ok(HeroScan {
            source: self.source.clone(),
            project: self.project.path.clone(),
            cache: self.project.heroes_cache.clone(),
            max_age: self.max_age,
        })
    }

    /// [`begin_load`](HeroCatalog::begin_load) after forgetting the selection and
    /// every cached hero.
    pub fn begin_refresh(&mut self) -> std::result::Result<HeroScan<S>, HeroesState> {
        log::info!("[Heroes] Refreshing heroes list and clearing cache");
        self.project.set_selected_hero(None);
        self.clear_cache();
        self.begin_load()
    }

    /// Scans the project's hero folders and rebuilds the roster.
    ///
    /// Heroes with a fresh cache entry are reused as-is. Everything else is
    /// rediscovered.
    pub fn load_heroes(&mut self) -> HeroesState {
        match self.begin_load() {
            Ok(scan) => self.finish_load(scan.run()),
            Err(state) => state,
        }
    }

    /// Forgets the selection and every cached hero, then loads from scratch.
    pub fn refresh_heroes(&mut self) -> HeroesState {
        match self.begin_refresh() {
            Ok(scan) => self.finish_load(scan.run()),
            Err(state) => state,
        }
    }

    /// Detaches a copy of one hero for an avatar or skin change.
    pub fn edit_hero(&self, hero_id: &str) -> Result<HeroEdit<S>> {
        let project_root = self.project_root()?;
        Ok(HeroEdit {
            source: self.source.clone(),
            hero: self.find(hero_id)?.clone(),
            project_root,
            project_path: self.project.path.clone(),
        })
    }

    /// Reloads the default avatar of one hero.
    ///
    /// Without `force_reload`, a fresh cache entry that already has an avatar is
    /// returned untouched.
    pub fn load_hero_avatar(&mut self, hero_id: &str, force_reload: bool) -> Result<Hero> {
        if !force_reload {
            if let Some(cached) = self.cached_avatar(hero_id)? {
                log::debug!("[Heroes/Cache/{hero_id}] Using cached avatar");
                return Ok(cached);
            }
        }

        log::info!("[Heroes] Loading avatar for hero {hero_id} (force: {force_reload})");
        let mut edit = self.edit_hero(hero_id)?;
        edit.load_avatar();
        self.commit(edit)
    }

    pub fn load_hero_skin(
        &mut self,
        hero_id: &str,
        skin_id: &str,
        color_id: Option<&str>,
    ) -> Result<Hero> {
        let mut edit = self.edit_hero(hero_id)?;
        edit.apply_skin(skin_id, color_id);
        self.commit(edit)
    }

    pub fn load_hero_skin_color(
        &mut self,
        hero_id: &str,
        skin_id: &str,
        color_id: &str,
    ) -> Result<Hero> {
        self.load_hero_skin(hero_id, skin_id, Some(color_id))
    }

    pub fn reset_to_default_skin(&mut self, hero_id: &str) -> Result<Hero> {
        let mut edit = self.edit_hero(hero_id)?;
        edit.reset_skin();
        self.commit(edit)
    }
}

/// Disk half of a roster load, detached from the catalog.
pub struct HeroScan<S> {
    source: S,
    project: String,
    cache: HeroesCache,
    max_age: Duration,
}

/// What a [`HeroScan`] found, ready for [`HeroCatalog::finish_load`].
pub struct ScannedRoster {
    project: String,
    result: Result<Vec<Hero>>,
    /// Heroes built from disk in this scan, with whether their avatar loaded.
    discovered: Vec<(Hero, bool)>,
}

impl<S: AssetSource> HeroScan<S> {
    pub fn run(self) -> ScannedRoster {
        let mut discovered = Vec::new();
        let result = self.scan(&mut discovered);
        ScannedRoster {
            project: self.project,
            result,
            discovered,
        }
    }

    fn scan(&self, discovered: &mut Vec<(Hero, bool)>) -> Result<Vec<Hero>> {
        let project = PathBuf::from(&self.project);
        let heroes_dir = layout::heroes_dir(&project);
        log::info!("[Heroes] Loading heroes from {}", heroes_dir.display());

        if !self.source.exists(&heroes_dir) {
            return Err(CoreError::HeroesDirMissing(layout::HEROES_DIR));
        }

        let entries = self.source.read_dir(&heroes_dir)?;
        log::debug!("[Heroes] {} directory entries found", entries.len());

        let mut atlas = AvatarAtlas::new();
        let mut heroes = Vec::new();
        for entry in entries {
            let entry_path = heroes_dir.join(&entry);
            if !self.source.is_dir(&entry_path) {
                continue;
            }
            let Some(folder) = parse_hero_folder(&entry) else {
                continue;
            };

            if let Some(cached) = self.cache.fresh(&folder.id, self.max_age) {
                log::debug!("[Heroes/Cache/{}] Using cached hero", folder.id);
                heroes.push(cached.clone());
                continue;
            }
            log::debug!("[Heroes/Cache/{}] Cache miss or expired", folder.id);

            let mut hero = Hero::new(
                folder.id,
                folder.name,
                entry,
                entry_path.to_string_lossy().to_string(),
            );
            hero.skins = Some(discover_hero_skins(&self.source, &hero.id, &project));
            let outcome = load_hero_avatar_with(
                &self.source,
                &mut atlas,
                &mut hero,
                &project,
                None,
                None,
            );

            discovered.push((hero.clone(), outcome.is_loaded()));
            heroes.push(hero);
        }

        heroes.sort_by(|left, right| left.id.cmp(&right.id));
        Ok(heroes)
    }
}

/// A detached copy of one hero, changed without holding the catalog and stored
/// back with [`HeroCatalog::commit`].
pub struct HeroEdit<S> {
    source: S,
    hero: Hero,
    project_root: PathBuf,
    project_path: String,
}

impl<S: AssetSource> HeroEdit<S> {
    pub fn hero(&self) -> &Hero {
        &self.hero
    }

    pub fn load_avatar(&mut self) -> AvatarOutcome {
        self.load_avatar_for(None, None)
    }

    pub fn apply_skin(&mut self, skin_id: &str, color_id: Option<&str>) {
        let hero_id = &self.hero.id;
        log::info!(
            "[Heroes/{hero_id}/Skin/{skin_id}] Loading skin (color {})",
            color_id.unwrap_or("-")
        );

        self.load_avatar_for(Some(skin_id), color_id);

        let hero = &mut self.hero;
        hero.selected_skin = Some(skin_id.to_string());
        hero.selected_color = color_id.map(str::to_string);
        hero.is_god_skin = hero.skin(skin_id).is_some_and(|skin| skin.is_god_skin);

        if let Some(skin) = hero
            .skins
            .as_mut()
            .and_then(|skins| skins.iter_mut().find(|skin| skin.id == skin_id))
        {
            skin.selected_color = color_id.map(str::to_string);
        }
    }

    pub fn reset_skin(&mut self) {
        log::info!("[Heroes] Resetting hero {} to default skin", self.hero.id);
        self.load_avatar_for(None, None);
        self.hero.selected_skin = None;
        self.hero.selected_color = None;
        self.hero.is_god_skin = false;
    }

    fn load_avatar_for(&mut self, skin_id: Option<&str>, color_id: Option<&str>) -> AvatarOutcome {
        load_hero_avatar_with(
            &self.source,
            &mut AvatarAtlas::new(),
            &mut self.hero,
            &self.project_root,
            skin_id,
            color_id,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::tests::striped_png;
    use crate::heroes::AvatarKind;
    use std::fs;

    const ATLAS: &str = "sactx-0-2048x1024-Uncompressed-UI_Avatar-ff00.png";
    const DESCRIPTOR: &str = "m_Rect:\n  x: 1\n  y: 1\n  width: 2\n  height: 2\n";

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();

        let heroes = layout::heroes_dir(root);
        for folder in ["Fx_1014 (Archer)", "Fx_1002 (Knight)", "Shared", "Fx_x (Bad)"] {
            fs::create_dir_all(heroes.join(folder)).unwrap();
        }
        fs::write(heroes.join("Fx_1003 (File).txt"), b"not a folder").unwrap();

        let units = layout::unit_image_dir(root);
        fs::create_dir_all(&units).unwrap();
        for name in [
            "Unit_1014_01.png",
            "Unit_1014_99_00.png",
            "Unit_1014_99_01.png",
            "Unit_1014_02a.png",
        ] {
            fs::write(units.join(name), b"png").unwrap();
        }

        let avatars = layout::avatar_dir(root);
        fs::create_dir_all(&avatars).unwrap();
        fs::write(avatars.join("Avatar_01.asset"), DESCRIPTOR).unwrap();

        let textures = layout::texture_dir(root);
        fs::create_dir_all(&textures).unwrap();
        fs::write(textures.join(ATLAS), striped_png()).unwrap();

        dir
    }

    fn open(dir: &tempfile::TempDir) -> HeroCatalog {
        let mut catalog = HeroCatalog::new();
        catalog.set_project_path(dir.path().to_string_lossy().to_string());
        catalog
    }

    #[test]
    fn no_project_selected() {
        let mut catalog = HeroCatalog::new();
        let state = catalog.load_heroes();
        assert!(state.heroes.is_empty());
        assert_eq!(state.error.as_deref(), Some("No project selected"));
        assert!(matches!(
            catalog.load_hero_avatar("1014", true),
            Err(CoreError::NoProject)
        ));
    }

    #[test]
    fn missing_heroes_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut catalog = open(&dir);
        let state = catalog.load_heroes();
        assert!(state.heroes.is_empty());
        assert!(!state.loading);
        assert_eq!(
            state.error.as_deref(),
            Some("Heroes directory not found: Assets/01_Fx/1_Hero")
        );
    }

    #[test]
    fn loads_matching_folders_sorted_by_id() {
        let dir = fixture();
        let mut catalog = open(&dir);
        let state = catalog.load_heroes();

        assert!(state.error.is_none());
        let ids: Vec<&str> = state.heroes.iter().map(|hero| hero.id.as_str()).collect();
        assert_eq!(ids, vec!["1002", "1014"]);

        let archer = &state.heroes[1];
        assert_eq!(archer.name, "Archer");
        assert_eq!(archer.folder_name, "Fx_1014 (Archer)");
        let skin_ids: Vec<&str> = archer
            .skins
            .as_ref()
            .unwrap()
            .iter()
            .map(|skin| skin.id.as_str())
            .collect();
        assert_eq!(skin_ids, vec!["99", "01", "02"]);
        assert_eq!(
            archer.avatar.as_ref().map(|avatar| avatar.kind),
            Some(AvatarKind::Cropped)
        );

        // "1002" shares avatar id "00"; no descriptor exists for it.
        let knight = &state.heroes[0];
        assert!(knight.avatar.is_none());
        assert_eq!(knight.skins.as_deref(), Some(&[][..]));

        let cache = &catalog.project().heroes_cache;
        assert!(cache.entry("1014").unwrap().avatar_processed);
        assert!(!cache.entry("1002").unwrap().avatar_processed);
    }

    #[test]
    fn fresh_cache_entries_are_reused() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();

        // Rediscovery would find this new skin; the cached hero must not.
        fs::write(
            layout::unit_image_dir(dir.path()).join("Unit_1014_05.png"),
            b"png",
        )
        .unwrap();
        let again = catalog.load_heroes();
        let archer = again.heroes.iter().find(|hero| hero.id == "1014").unwrap();
        assert!(archer.skin("05").is_none());

        let refreshed = catalog.refresh_heroes();
        let archer = refreshed
            .heroes
            .iter()
            .find(|hero| hero.id == "1014")
            .unwrap();
        assert!(archer.skin("05").is_some());
    }

    #[test]
    fn expired_cache_forces_rediscovery() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.set_max_age(Duration::ZERO);
        catalog.load_heroes();
        assert!(!catalog.is_cache_valid("1014"));

        fs::write(
            layout::unit_image_dir(dir.path()).join("Unit_1014_07.png"),
            b"png",
        )
        .unwrap();
        let state = catalog.load_heroes();
        let archer = state.heroes.iter().find(|hero| hero.id == "1014").unwrap();
        assert!(archer.skin("07").is_some());
    }

    #[test]
    fn skin_selection_updates_roster_cache_and_selection() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();
        catalog.select_hero(Some("1014")).unwrap();

        let hero = catalog.load_hero_skin("1014", "02", None).unwrap();
        assert_eq!(hero.selected_skin.as_deref(), Some("02"));
        assert!(hero.is_god_skin);

        let selected = catalog.project().selected_hero.as_ref().unwrap();
        assert_eq!(selected.selected_skin.as_deref(), Some("02"));
        let cached = catalog.project().heroes_cache.get_cached_hero("1014").unwrap();
        assert_eq!(cached.selected_skin.as_deref(), Some("02"));

        let hero = catalog.load_hero_skin_color("1014", "99", "01").unwrap();
        assert_eq!(hero.selected_color.as_deref(), Some("01"));
        assert!(!hero.is_god_skin);
        assert_eq!(
            hero.skin("99").unwrap().selected_color.as_deref(),
            Some("01")
        );

        let hero = catalog.reset_to_default_skin("1014").unwrap();
        assert!(hero.selected_skin.is_none());
        assert!(hero.selected_color.is_none());
        assert!(catalog.heroes()[1].selected_skin.is_none());
    }

    #[test]
    fn repeated_skin_loads_last_write_wins() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();

        catalog.load_hero_skin("1014", "01", None).unwrap();
        catalog.load_hero_skin("1014", "01", None).unwrap();
        catalog.load_hero_skin("1014", "99", Some("00")).unwrap();

        let cache = &catalog.project().heroes_cache;
        assert_eq!(cache.len(), 2);
        let cached = cache.get_cached_hero("1014").unwrap();
        assert_eq!(cached.selected_skin.as_deref(), Some("99"));
        assert_eq!(cached.selected_color.as_deref(), Some("00"));
    }

    #[test]
    fn unknown_hero_is_reported() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();
        assert!(matches!(
            catalog.load_hero_skin("9999", "01", None),
            Err(CoreError::HeroNotFound(id)) if id == "9999"
        ));
        assert!(catalog.select_hero(Some("9999")).is_err());
        assert_eq!(catalog.select_hero(None).unwrap(), None);
    }

    #[test]
    fn cached_avatar_skips_reload_unless_forced() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();

        fs::remove_file(layout::texture_dir(dir.path()).join(ATLAS)).unwrap();

        let cached = catalog.load_hero_avatar("1014", false).unwrap();
        assert!(cached.avatar.is_some());

        // The atlas is gone, so a forced reload cannot replace the avatar; the
        // previous one stays.
        let reloaded = catalog.load_hero_avatar("1014", true).unwrap();
        assert!(reloaded.avatar.is_some());
    }

    #[test]
    fn switching_project_clears_roster() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();
        assert_eq!(catalog.heroes().len(), 2);

        let other = tempfile::tempdir().unwrap();
        assert!(catalog.set_project_path(other.path().to_string_lossy().to_string()));
        assert!(catalog.heroes().is_empty());
        assert!(catalog.project().heroes_cache.is_empty());
    }

    #[test]
    fn discover_skins_through_catalog() {
        let dir = fixture();
        let catalog = open(&dir);
        let skins = catalog.discover_hero_skins("1014").unwrap();
        assert_eq!(skins.len(), 3);
        assert!(skins[0].is_default);
    }

    #[test]
    fn scan_for_a_closed_project_is_dropped() {
        let dir = fixture();
        let mut catalog = open(&dir);
        let scan = catalog.begin_load().unwrap();
        assert!(catalog.state().loading);

        let other = tempfile::tempdir().unwrap();
        catalog.set_project_path(other.path().to_string_lossy().to_string());
        let state = catalog.finish_load(scan.run());

        assert!(state.heroes.is_empty());
        assert!(!state.loading);
        assert!(catalog.project().heroes_cache.is_empty());
    }

    #[test]
    fn detached_scan_writes_back_on_finish() {
        let dir = fixture();
        let mut catalog = open(&dir);
        let scan = catalog.begin_load().unwrap();
        let roster = scan.run();
        assert!(catalog.heroes().is_empty());
        assert!(catalog.project().heroes_cache.is_empty());

        let state = catalog.finish_load(roster);
        assert_eq!(state.heroes.len(), 2);
        assert!(!state.loading);
        assert!(catalog.is_cache_valid("1014"));
    }

    #[test]
    fn edit_for_a_closed_project_is_rejected() {
        let dir = fixture();
        let mut catalog = open(&dir);
        catalog.load_heroes();

        let mut edit = catalog.edit_hero("1014").unwrap();
        edit.apply_skin("02", None);
        assert_eq!(edit.hero().selected_skin.as_deref(), Some("02"));

        let other = tempfile::tempdir().unwrap();
        catalog.set_project_path(other.path().to_string_lossy().to_string());
        assert!(matches!(
            catalog.commit(edit),
            Err(CoreError::HeroNotFound(id)) if id == "1014"
        ));
        assert!(catalog.project().heroes_cache.is_empty());
    }
}
