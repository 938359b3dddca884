use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::model::Hero;

pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(30 * 60);

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CachedHero {
    pub hero: Hero,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub avatar_processed: bool,
}

/// Hero snapshots keyed by hero id.
///
/// Entries are clones. Changing a hero after caching it has no effect on the cache
/// until it is cached again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HeroesCache {
    entries: HashMap<String, CachedHero>,
}

impl HeroesCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache_hero(&mut self, hero_id: &str, hero: &Hero, avatar_processed: bool) {
        self.cache_hero_at(hero_id, hero, avatar_processed, now_millis());
    }

    pub fn cache_hero_at(&mut self, hero_id: &str, hero: &Hero, avatar_processed: bool, now: i64) {
        self.entries.insert(
            hero_id.to_string(),
            CachedHero {
                hero: hero.clone(),
                timestamp: now,
                avatar_processed,
            },
        );
    }

    pub fn get_cached_hero(&self, hero_id: &str) -> Option<&Hero> {
        self.entries.get(hero_id).map(|entry| &entry.hero)
    }

    pub fn entry(&self, hero_id: &str) -> Option<&CachedHero> {
        self.entries.get(hero_id)
    }

    pub fn is_cache_valid(&self, hero_id: &str, max_age: Duration) -> bool {
        self.is_cache_valid_at(hero_id, max_age, now_millis())
    }

    pub fn is_cache_valid_at(&self, hero_id: &str, max_age: Duration, now: i64) -> bool {
        let Some(entry) = self.entries.get(hero_id) else {
            return false;
        };
        let max_age = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
        now.saturating_sub(entry.timestamp) < max_age
    }

    /// The cached hero, if present and younger than `max_age`.
    pub fn fresh(&self, hero_id: &str, max_age: Duration) -> Option<&Hero> {
        if self.is_cache_valid(hero_id, max_age) {
            self.get_cached_hero(hero_id)
        } else {
            None
        }
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
