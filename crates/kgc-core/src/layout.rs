//! Where things live inside an exported game project.

use std::path::{Path, PathBuf};

pub const HEROES_DIR: &str = "Assets/01_Fx/1_Hero";
pub const UNIT_IMAGE_DIR: &str = "Assets/00_Unit/#Image";
pub const AVATAR_DIR: &str = "Assets/02_UI/UI_Avatar";
pub const TEXTURE_DIR: &str = "Assets/Texture2D";

/// File name pattern of the combined avatar atlas inside [`TEXTURE_DIR`].
pub const AVATAR_ATLAS_PATTERN: &str = r"^sactx-0-2048x1024-Uncompressed-UI_Avatar-[a-f0-9]+\.png$";

pub fn heroes_dir(project: &Path) -> PathBuf {
    project.join(HEROES_DIR)
}

pub fn unit_image_dir(project: &Path) -> PathBuf {
    project.join(UNIT_IMAGE_DIR)
}

pub fn avatar_dir(project: &Path) -> PathBuf {
    project.join(AVATAR_DIR)
}

pub fn texture_dir(project: &Path) -> PathBuf {
    project.join(TEXTURE_DIR)
}
