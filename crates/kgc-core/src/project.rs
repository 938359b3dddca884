use serde::{Deserialize, Serialize};

use crate::heroes::{Hero, HeroesCache};

/// Session state of the open project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectState {
    pub path: String,
    pub selected_hero: Option<Hero>,
    pub heroes_cache: HeroesCache,
    pub heroes_loading: bool,
}

impl ProjectState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_project(&self) -> bool {
        !self.path.trim().is_empty()
    }

    /// Switches to another project root. Returns `false` when the path is unchanged.
    ///
    /// Hero ids are only unique within a project, so the cache and selection from the
    /// previous project are dropped.
    pub fn set_path(&mut self, path: impl Into<String>) -> bool {
        let path = path.into();
        if path == self.path {
            return false;
        }
        self.path = path;
        self.selected_hero = None;
        self.heroes_cache.clear();
        true
    }

    pub fn set_selected_hero(&mut self, hero: Option<Hero>) {
        self.selected_hero = hero;
    }

    /// Replaces the selected hero when it is the same hero as `hero`.
    pub fn sync_selected(&mut self, hero: &Hero) {
        if self
            .selected_hero
            .as_ref()
            .is_some_and(|selected| selected.id == hero.id)
        {
            self.selected_hero = Some(hero.clone());
        }
    }
}
