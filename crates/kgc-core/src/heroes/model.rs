use serde::{Deserialize, Serialize};

/// Id every project uses for a hero's default skin.
pub const DEFAULT_SKIN_ID: &str = "99";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    pub id: String,
    pub name: String,
    pub folder_name: String,
    pub folder_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<Avatar>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skins: Option<Vec<HeroSkin>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_skin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
    #[serde(default)]
    pub is_god_skin: bool,
}

impl Hero {
    pub fn new(id: String, name: String, folder_name: String, folder_path: String) -> Self {
        Self {
            id,
            name,
            folder_name,
            folder_path,
            avatar: None,
            skins: None,
            selected_skin: None,
            selected_color: None,
            is_god_skin: false,
        }
    }

    pub fn skin(&self, skin_id: &str) -> Option<&HeroSkin> {
        self.skins.as_ref()?.iter().find(|skin| skin.id == skin_id)
    }

    pub fn has_skins(&self) -> bool {
        self.skins.as_ref().is_some_and(|skins| !skins.is_empty())
    }
}

/// A loaded avatar image, ready for an `<img>` tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Avatar {
    /// `data:image/png;base64,...`
    pub data_url: String,
    /// Atlas texture the avatar was cut from.
    pub texture_path: String,
    /// Descriptor that supplied the crop rectangle.
    pub asset_path: String,
    pub kind: AvatarKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AvatarKind {
    /// Cut from the shared atlas.
    Cropped,
    /// Whole unit image, used when cropping failed.
    Full,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeroSkin {
    pub id: String,
    pub name: String,
    pub is_default: bool,
    pub is_god_skin: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hero_serializes_camel_case() {
        let mut hero = Hero::new(
            "014".into(),
            "Archer".into(),
            "Fx_014 (Archer)".into(),
            "/p/Fx_014 (Archer)".into(),
        );
        hero.avatar = Some(Avatar {
            data_url: "data:image/png;base64,AA==".into(),
            texture_path: "/p/atlas.png".into(),
            asset_path: "/p/Avatar_1.asset".into(),
            kind: AvatarKind::Full,
        });

        let json = serde_json::to_value(&hero).unwrap();
        assert_eq!(json["folderName"], "Fx_014 (Archer)");
        assert_eq!(json["isGodSkin"], false);
        assert_eq!(json["avatar"]["kind"], "full");
        assert_eq!(json["avatar"]["dataUrl"], "data:image/png;base64,AA==");
        assert!(json.get("skins").is_none());
    }

    #[test]
    fn skin_lookup() {
        let mut hero = Hero::new("1".into(), "A".into(), "f".into(), "p".into());
        assert!(!hero.has_skins());
        hero.skins = Some(vec![HeroSkin {
            id: "01".into(),
            name: "Skin 01".into(),
            is_default: false,
            is_god_skin: true,
            colors: None,
            selected_color: None,
        }]);
        assert!(hero.has_skins());
        assert!(hero.skin("01").is_some_and(|skin| skin.is_god_skin));
        assert!(hero.skin("02").is_none());
    }
}
