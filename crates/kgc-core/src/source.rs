//! File access boundary used by the hero catalog.
//!
//! Catalog code never touches `std::fs` directly. It asks an [`AssetSource`] for
//! existence checks, listings and file contents, which keeps discovery logic
//! independent of where the project actually lives.

use std::fs;
use std::path::Path;

use image::RgbaImage;

use crate::assets::{self, CropRect};
use crate::error::Result;

pub trait AssetSource: Send + Sync {
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Entry names (not paths) of a directory, in no particular order.
    fn read_dir(&self, path: &Path) -> Result<Vec<String>>;

    fn read_text(&self, path: &Path) -> Result<String>;

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>>;

    fn parse_descriptor(&self, content: &str) -> Result<CropRect> {
        assets::parse_asset_file(content)
    }

    fn decode_image(&self, image_bytes: &[u8]) -> Result<RgbaImage> {
        assets::decode_rgba(image_bytes)
    }

    fn crop_decoded(&self, image: &RgbaImage, rect: CropRect) -> Result<Vec<u8>> {
        assets::crop_rgba(image, rect)
    }

    fn crop(&self, image_bytes: &[u8], rect: CropRect) -> Result<Vec<u8>> {
        self.crop_decoded(&self.decode_image(image_bytes)?, rect)
    }
}

/// [`AssetSource`] backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalSource;

impl AssetSource for LocalSource {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn read_dir(&self, path: &Path) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            if let Some(name) = entry.file_name().to_str() {
                names.push(name.to_string());
            }
        }
        Ok(names)
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        Ok(fs::read_to_string(path)?)
    }

    fn read_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        Ok(fs::read(path)?)
    }
}
