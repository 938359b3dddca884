//! Hero roster: folder parsing, skin discovery, avatars and caching.

pub mod avatar;
pub mod cache;
pub mod catalog;
pub mod export;
pub mod folder;
pub mod model;
pub mod skins;

pub use avatar::{load_hero_avatar, load_hero_avatar_with, AvatarAtlas, AvatarOutcome};
pub use cache::{CachedHero, HeroesCache, DEFAULT_MAX_AGE};
pub use catalog::{HeroCatalog, HeroEdit, HeroScan, HeroesState, ScannedRoster};
pub use export::{
    export_hero_avatar, export_hero_skin_image, export_heroes_bulk, BulkExport, ExportFailure,
};
pub use folder::{avatar_hero_id, parse_hero_folder, HeroFolder};
pub use model::{Avatar, AvatarKind, Hero, HeroSkin, DEFAULT_SKIN_ID};
pub use skins::discover_hero_skins;
