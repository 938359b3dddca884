//! Avatar resolution.
//!
//! Avatars live in one shared atlas texture. A per-hero `.asset` descriptor holds
//! the rectangle to cut out. When cropping fails, the whole unit image is used
//! instead. Every failure is logged and reported through [`AvatarOutcome`]. None
//! of them is an error for the caller.

use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::STANDARD as B64, Engine as _};
use image::RgbaImage;
use once_cell::sync::Lazy;
use regex::Regex;

use super::folder::avatar_hero_id;
use super::model::{Avatar, AvatarKind, Hero, DEFAULT_SKIN_ID};
use crate::layout;
use crate::source::AssetSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvatarOutcome {
    Loaded(AvatarKind),
    DescriptorMissing,
    DescriptorInvalid,
    AtlasMissing,
    /// Cropping failed and the unit image fallback does not exist either.
    UnitImageMissing,
    ReadFailed,
}

impl AvatarOutcome {
    pub fn is_loaded(self) -> bool {
        matches!(self, AvatarOutcome::Loaded(_))
    }
}

static AVATAR_ATLAS: Lazy<Regex> =
    Lazy::new(|| Regex::new(layout::AVATAR_ATLAS_PATTERN).expect("avatar atlas pattern"));

/// The shared avatar texture, located and decoded on first use.
///
/// One atlas serves every hero of a project, so a roster load keeps a single
/// instance for the whole pass. A missing or unreadable atlas is retried on the
/// next use; an undecodable one is remembered and sends every hero to the unit
/// image fallback.
#[derive(Default)]
pub struct AvatarAtlas {
    loaded: Option<LoadedAtlas>,
}

struct LoadedAtlas {
    path: PathBuf,
    image: std::result::Result<RgbaImage, String>,
}

impl AvatarAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    fn load<S: AssetSource + ?Sized>(
        &mut self,
        source: &S,
        project: &Path,
        hero_id: &str,
    ) -> Result<&LoadedAtlas, AvatarOutcome> {
        let loaded = match self.loaded.take() {
            Some(loaded) => loaded,
            None => read_atlas(source, project, hero_id)?,
        };
        Ok(&*self.loaded.insert(loaded))
    }
}

fn read_atlas<S: AssetSource + ?Sized>(
    source: &S,
    project: &Path,
    hero_id: &str,
) -> Result<LoadedAtlas, AvatarOutcome> {
    let texture_dir = layout::texture_dir(project);
    let Some(path) = find_avatar_atlas(source, &texture_dir) else {
        log::error!(
            "[Heroes/{hero_id}] Combined avatar texture not found in: {}",
            texture_dir.display()
        );
        return Err(AvatarOutcome::AtlasMissing);
    };

    let bytes = source.read_bytes(&path).map_err(|error| {
        log::error!(
            "[Heroes/{hero_id}] Failed to read avatar texture {}: {error}",
            path.display()
        );
        AvatarOutcome::ReadFailed
    })?;

    let image = source.decode_image(&bytes).map_err(|error| error.to_string());
    log::debug!("[Heroes] Decoded avatar texture {}", path.display());
    Ok(LoadedAtlas { path, image })
}

/// Loads the avatar for `hero` (optionally for a skin and color) into `hero.avatar`.
///
/// On any failure `hero.avatar` is left as it was.
pub fn load_hero_avatar<S: AssetSource + ?Sized>(
    source: &S,
    hero: &mut Hero,
    project: &Path,
    skin_id: Option<&str>,
    color_id: Option<&str>,
) -> AvatarOutcome {
    load_hero_avatar_with(source, &mut AvatarAtlas::new(), hero, project, skin_id, color_id)
}

/// [`load_hero_avatar`] against an atlas that may already be decoded.
pub fn load_hero_avatar_with<S: AssetSource + ?Sized>(
    source: &S,
    atlas: &mut AvatarAtlas,
    hero: &mut Hero,
    project: &Path,
    skin_id: Option<&str>,
    color_id: Option<&str>,
) -> AvatarOutcome {
    let avatar_id = avatar_hero_id(&hero.id);
    let avatar_dir = layout::avatar_dir(project);
    let default_asset = avatar_dir.join(format!("Avatar_{avatar_id}.asset"));

    let unit_image_name = match (skin_id, color_id) {
        (Some(skin), Some(color)) => format!("Unit_{}_{skin}_{color}.png", hero.id),
        (Some(skin), None) => format!("Unit_{}_{skin}.png", hero.id),
        (None, Some(color)) => format!("Unit_{}_{DEFAULT_SKIN_ID}_{color}.png", hero.id),
        (None, None) => format!("Unit_{}.png", hero.id),
    };

    let asset_path = match skin_id {
        Some(skin) => {
            let skin_asset = avatar_dir.join(format!("Avatar_{avatar_id}_{skin}.asset"));
            if source.exists(&skin_asset) {
                skin_asset
            } else {
                log::info!(
                    "[Heroes/{}/Skin/{skin}] Skin avatar not found, using default avatar",
                    hero.id
                );
                default_asset
            }
        }
        None => default_asset,
    };

    log::debug!(
        "[Heroes/{}/Asset] Looking for avatar asset {} (avatar id {avatar_id}, skin {})",
        hero.id,
        asset_path.display(),
        skin_id.unwrap_or("default")
    );

    if !source.exists(&asset_path) {
        log::debug!(
            "[Heroes/{}/Asset] Avatar asset file not found: {}",
            hero.id,
            asset_path.display()
        );
        return AvatarOutcome::DescriptorMissing;
    }

    let rect = match source
        .read_text(&asset_path)
        .and_then(|content| source.parse_descriptor(&content))
    {
        Ok(rect) => rect,
        Err(error) => {
            log::error!("[Heroes/{}] Failed to parse asset file: {error}", hero.id);
            return AvatarOutcome::DescriptorInvalid;
        }
    };

    let atlas = match atlas.load(source, project, &hero.id) {
        Ok(atlas) => atlas,
        Err(outcome) => return outcome,
    };

    let cropped = match &atlas.image {
        Ok(image) => source.crop_decoded(image, rect).map_err(|error| error.to_string()),
        Err(error) => Err(error.clone()),
    };

    let (bytes, kind) = match cropped {
        Ok(bytes) => (bytes, AvatarKind::Cropped),
        Err(error) => {
            log::error!(
                "[Heroes/{}] Failed to crop avatar from combined texture, trying unit image: {error}",
                hero.id
            );

            let unit_image_path = layout::unit_image_dir(project).join(&unit_image_name);
            if !source.exists(&unit_image_path) {
                log::error!(
                    "[Heroes/{}] Unit image not found: {}",
                    hero.id,
                    unit_image_path.display()
                );
                return AvatarOutcome::UnitImageMissing;
            }

            match source.read_bytes(&unit_image_path) {
                Ok(bytes) => (bytes, AvatarKind::Full),
                Err(error) => {
                    log::error!("[Heroes/{}] Failed to read unit image: {error}", hero.id);
                    return AvatarOutcome::ReadFailed;
                }
            }
        }
    };

    hero.avatar = Some(Avatar {
        data_url: png_data_url(&bytes),
        texture_path: atlas.path.to_string_lossy().to_string(),
        asset_path: asset_path.to_string_lossy().to_string(),
        kind,
    });

    log::info!(
        "[Heroes/{}] Loaded {kind:?} avatar{}",
        hero.id,
        skin_id
            .map(|skin| format!(" for skin {skin}"))
            .unwrap_or_default()
    );
    AvatarOutcome::Loaded(kind)
}

fn find_avatar_atlas<S: AssetSource + ?Sized>(source: &S, texture_dir: &Path) -> Option<PathBuf> {
    let mut files = source.read_dir(texture_dir).ok()?;
    files.sort();

    let file = files.into_iter().find(|file| AVATAR_ATLAS.is_match(file))?;
    let path = texture_dir.join(file);
    source.exists(&path).then_some(path)
}

pub fn png_data_url(bytes: &[u8]) -> String {
    format!("data:image/png;base64,{}", B64.encode(bytes))
}

/// Decodes a data URL produced by [`png_data_url`].
pub fn decode_data_url(data_url: &str) -> Option<Vec<u8>> {
    let (_, payload) = data_url.split_once(";base64,")?;
    B64.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::texture::tests::striped_png;
    use crate::assets::CropRect;
    use crate::error::{CoreError, Result};
    use crate::source::LocalSource;
    use std::fs;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ATLAS: &str = "sactx-0-2048x1024-Uncompressed-UI_Avatar-0a1b2c.png";
    const DESCRIPTOR: &str = "m_Rect:\n  x: 0\n  y: 0\n  width: 2\n  height: 2\n";

    struct Project {
        _dir: tempfile::TempDir,
        root: PathBuf,
    }

    impl Project {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let root = dir.path().to_path_buf();
            for sub in [layout::AVATAR_DIR, layout::TEXTURE_DIR, layout::UNIT_IMAGE_DIR] {
                fs::create_dir_all(root.join(sub)).unwrap();
            }
            Self { _dir: dir, root }
        }

        fn write(&self, sub: &str, name: &str, bytes: &[u8]) {
            fs::write(self.root.join(sub).join(name), bytes).unwrap();
        }
    }

    fn archer() -> Hero {
        Hero::new(
            "1014".into(),
            "Archer".into(),
            "Fx_1014 (Archer)".into(),
            "/tmp/Fx_1014 (Archer)".into(),
        )
    }

    /// Local files, but every crop fails.
    struct NoCrop;

    impl AssetSource for NoCrop {
        fn exists(&self, path: &Path) -> bool {
            LocalSource.exists(path)
        }
        fn is_dir(&self, path: &Path) -> bool {
            LocalSource.is_dir(path)
        }
        fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
            LocalSource.read_dir(path)
        }
        fn read_text(&self, path: &Path) -> Result<String> {
            LocalSource.read_text(path)
        }
        fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
            LocalSource.read_bytes(path)
        }
        fn crop_decoded(&self, _: &RgbaImage, _: CropRect) -> Result<Vec<u8>> {
            Err(CoreError::InvalidCrop("forced".into()))
        }
    }

    /// Local files, counting every image decode.
    #[derive(Default)]
    struct CountingDecodes {
        decodes: AtomicUsize,
    }

    impl AssetSource for CountingDecodes {
        fn exists(&self, path: &Path) -> bool {
            LocalSource.exists(path)
        }
        fn is_dir(&self, path: &Path) -> bool {
            LocalSource.is_dir(path)
        }
        fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
            LocalSource.read_dir(path)
        }
        fn read_text(&self, path: &Path) -> Result<String> {
            LocalSource.read_text(path)
        }
        fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
            LocalSource.read_bytes(path)
        }
        fn decode_image(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
            self.decodes.fetch_add(1, Ordering::SeqCst);
            LocalSource.decode_image(image_bytes)
        }
    }

    #[test]
    fn crops_default_avatar_from_atlas() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let mut hero = archer();
        let outcome = load_hero_avatar(&LocalSource, &mut hero, &project.root, None, None);

        assert_eq!(outcome, AvatarOutcome::Loaded(AvatarKind::Cropped));
        let avatar = hero.avatar.unwrap();
        assert_eq!(avatar.kind, AvatarKind::Cropped);
        assert!(avatar.asset_path.ends_with("Avatar_01.asset"));
        assert!(avatar.texture_path.ends_with(ATLAS));

        let png = decode_data_url(&avatar.data_url).unwrap();
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (2, 2));
    }

    #[test]
    fn skin_descriptor_preferred_when_present() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::AVATAR_DIR, "Avatar_01_02.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let mut hero = archer();
        load_hero_avatar(&LocalSource, &mut hero, &project.root, Some("02"), None);
        assert!(hero
            .avatar
            .unwrap()
            .asset_path
            .ends_with("Avatar_01_02.asset"));
    }

    #[test]
    fn missing_skin_descriptor_falls_back_to_default() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let mut hero = archer();
        let outcome = load_hero_avatar(&LocalSource, &mut hero, &project.root, Some("05"), None);
        assert!(outcome.is_loaded());
        assert!(hero.avatar.unwrap().asset_path.ends_with("Avatar_01.asset"));
    }

    #[test]
    fn missing_atlas_leaves_avatar_unset() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, "unrelated.png", &striped_png());

        let mut hero = archer();
        let outcome = load_hero_avatar(&LocalSource, &mut hero, &project.root, None, None);
        assert_eq!(outcome, AvatarOutcome::AtlasMissing);
        assert!(hero.avatar.is_none());
    }

    #[test]
    fn missing_descriptor_leaves_avatar_unset() {
        let project = Project::new();
        let mut hero = archer();
        let outcome = load_hero_avatar(&LocalSource, &mut hero, &project.root, None, None);
        assert_eq!(outcome, AvatarOutcome::DescriptorMissing);
        assert!(hero.avatar.is_none());
    }

    #[test]
    fn invalid_descriptor_leaves_avatar_unset() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", b"m_Name: nothing here");
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let mut hero = archer();
        let outcome = load_hero_avatar(&LocalSource, &mut hero, &project.root, None, None);
        assert_eq!(outcome, AvatarOutcome::DescriptorInvalid);
        assert!(hero.avatar.is_none());
    }

    #[test]
    fn crop_failure_falls_back_to_unit_image() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());
        project.write(layout::UNIT_IMAGE_DIR, "Unit_1014_99_03.png", b"unit-image");

        let mut hero = archer();
        let outcome = load_hero_avatar(&NoCrop, &mut hero, &project.root, None, Some("03"));
        assert_eq!(outcome, AvatarOutcome::Loaded(AvatarKind::Full));

        let avatar = hero.avatar.unwrap();
        assert_eq!(avatar.kind, AvatarKind::Full);
        assert_eq!(decode_data_url(&avatar.data_url).unwrap(), b"unit-image");
    }

    #[test]
    fn crop_failure_without_unit_image() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let mut hero = archer();
        let outcome = load_hero_avatar(&NoCrop, &mut hero, &project.root, Some("02"), Some("01"));
        assert_eq!(outcome, AvatarOutcome::UnitImageMissing);
        assert!(hero.avatar.is_none());
    }

    #[test]
    fn shared_atlas_is_decoded_once() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::AVATAR_DIR, "Avatar_02.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, &striped_png());

        let source = CountingDecodes::default();
        let mut atlas = AvatarAtlas::new();
        let mut archer = archer();
        let mut knight = Hero::new(
            "1025".into(),
            "Knight".into(),
            "Fx_1025 (Knight)".into(),
            "/tmp/Fx_1025 (Knight)".into(),
        );

        for hero in [&mut archer, &mut knight] {
            let outcome =
                load_hero_avatar_with(&source, &mut atlas, hero, &project.root, None, None);
            assert_eq!(outcome, AvatarOutcome::Loaded(AvatarKind::Cropped));
        }
        assert_eq!(source.decodes.load(Ordering::SeqCst), 1);
        assert!(knight.avatar.unwrap().asset_path.ends_with("Avatar_02.asset"));
    }

    #[test]
    fn undecodable_atlas_falls_back_for_every_hero() {
        let project = Project::new();
        project.write(layout::AVATAR_DIR, "Avatar_01.asset", DESCRIPTOR.as_bytes());
        project.write(layout::TEXTURE_DIR, ATLAS, b"not a png");
        project.write(layout::UNIT_IMAGE_DIR, "Unit_1014.png", b"unit-image");

        let source = CountingDecodes::default();
        let mut atlas = AvatarAtlas::new();
        for _ in 0..2 {
            let mut hero = archer();
            let outcome =
                load_hero_avatar_with(&source, &mut atlas, &mut hero, &project.root, None, None);
            assert_eq!(outcome, AvatarOutcome::Loaded(AvatarKind::Full));
        }
        assert_eq!(source.decodes.load(Ordering::SeqCst), 1);
    }
}
