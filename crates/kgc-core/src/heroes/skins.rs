//! Skin and color discovery from unit image file names.
//!
//! A hero's skins are never listed anywhere explicitly. They are inferred from the
//! images in the unit image directory:
//!
//! * `Unit_<hero>_<skin>.png` is a single-color skin.
//! * `Unit_<hero>_<skin>_<color>.png` is one color of a multi-color skin.
//!
//! A skin id may end in a lowercase letter (`001a`, `001b`). Those are god skin
//! variants and collapse into one entry under the letterless id.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use super::model::{HeroSkin, DEFAULT_SKIN_ID};
use crate::layout;
use crate::source::AssetSource;

#[derive(Debug, Default)]
struct SkinEntry {
    colors: BTreeSet<String>,
    is_god_skin: bool,
}

/// Lists the skins of `hero_id`, default skin first, then by numeric id.
///
/// A missing or unreadable image directory yields an empty list.
pub fn discover_hero_skins<S: AssetSource + ?Sized>(
    source: &S,
    hero_id: &str,
    project: &Path,
) -> Vec<HeroSkin> {
    let unit_image_dir = layout::unit_image_dir(project);
    if !source.exists(&unit_image_dir) {
        log::debug!(
            "[Heroes/{hero_id}/Asset] Unit image directory not found: {}",
            unit_image_dir.display()
        );
        return Vec::new();
    }

    let files = match source.read_dir(&unit_image_dir) {
        Ok(files) => files,
        Err(error) => {
            log::error!("[Heroes/{hero_id}] Failed to discover skins: {error}");
            return Vec::new();
        }
    };

    let skins = skins_from_file_names(hero_id, &files);
    log::debug!(
        "[Heroes/{hero_id}/Asset] Found {} skins in {}",
        skins.len(),
        unit_image_dir.display()
    );
    skins
}

static MULTI_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Unit_([0-9]+)_([0-9]+[a-z]?)_([0-9]+)\.png$").expect("multi-color skin pattern")
});
static SINGLE_COLOR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Unit_([0-9]+)_([0-9]+[a-z]?)\.png$").expect("single-color skin pattern")
});

/// Pure part of [`discover_hero_skins`]: derives skins from directory entry names.
pub fn skins_from_file_names<T: AsRef<str>>(hero_id: &str, files: &[T]) -> Vec<HeroSkin> {
    let mut grouped: BTreeMap<String, SkinEntry> = BTreeMap::new();

    for file in files {
        let file = file.as_ref();
        if !file.ends_with(".png") {
            continue;
        }

        let (owner, raw_skin_id, color) = if let Some(captures) = MULTI_COLOR.captures(file) {
            (
                captures[1].to_string(),
                captures[2].to_string(),
                Some(captures[3].to_string()),
            )
        } else if let Some(captures) = SINGLE_COLOR.captures(file) {
            (captures[1].to_string(), captures[2].to_string(), None)
        } else {
            continue;
        };
        if owner != hero_id {
            continue;
        }

        let (skin_id, lettered) = normalize_skin_id(&raw_skin_id);
        let entry = grouped.entry(skin_id.to_string()).or_default();
        entry.is_god_skin |= lettered;
        if let Some(color) = color {
            entry.colors.insert(color);
        }
    }

    let mut skins: Vec<HeroSkin> = grouped
        .into_iter()
        .map(|(id, entry)| {
            let mut colors: Vec<String> = entry.colors.into_iter().collect();
            colors.sort_by(|left, right| numeric_cmp(left, right));
            let is_default = id == DEFAULT_SKIN_ID;

            HeroSkin {
                name: if is_default {
                    "Default".to_string()
                } else {
                    format!("Skin {id}")
                },
                id,
                is_default,
                is_god_skin: entry.is_god_skin,
                selected_color: colors.first().cloned(),
                colors: (!colors.is_empty()).then_some(colors),
            }
        })
        .collect();

    skins.sort_by(|left, right| match (left.is_default, right.is_default) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => numeric_cmp(&left.id, &right.id),
    });
    skins
}

/// Strips a trailing lowercase letter. Returns the bare id and whether one was removed.
fn normalize_skin_id(skin_id: &str) -> (&str, bool) {
    match skin_id.strip_suffix(|c: char| c.is_ascii_lowercase()) {
        Some(stripped) => (stripped, true),
        None => (skin_id, false),
    }
}

fn numeric_cmp(left: &str, right: &str) -> Ordering {
    let left_value = left.parse::<u64>().unwrap_or(u64::MAX);
    let right_value = right.parse::<u64>().unwrap_or(u64::MAX);
    left_value.cmp(&right_value).then_with(|| left.cmp(right))
}
