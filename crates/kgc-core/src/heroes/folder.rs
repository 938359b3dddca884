use once_cell::sync::Lazy;
use regex::Regex;

static HERO_FOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Fx_([0-9]+)\s*\(([^)]+)\)$").expect("hero folder pattern"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeroFolder {
    pub id: String,
    pub name: String,
}

/// Parses `Fx_<digits> (<display name>)`. Anything else is not a hero folder.
pub fn parse_hero_folder(folder_name: &str) -> Option<HeroFolder> {
    let captures = HERO_FOLDER.captures(folder_name)?;
    Some(HeroFolder {
        id: captures[1].to_string(),
        name: captures[2].trim().to_string(),
    })
}

/// Id used in avatar descriptor names: the hero id minus its first and last
/// characters. Ids of two characters or fewer are used unchanged.
pub fn avatar_hero_id(hero_id: &str) -> String {
    let count = hero_id.chars().count();
    if count <= 2 {
        return hero_id.to_string();
    }
    hero_id.chars().skip(1).take(count - 2).collect()
}
