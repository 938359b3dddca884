use std::path::Path;

use kgc_core::assets::{self, CropRect};
use kgc_core::{AssetSource, LocalSource};

use super::blocking;

#[tauri::command]
pub fn check_path_exists(path: String) -> bool {
    LocalSource.exists(Path::new(&path))
}

#[tauri::command]
pub fn check_is_directory(path: String) -> bool {
    LocalSource.is_dir(Path::new(&path))
}

#[tauri::command]
pub fn read_directory(path: String) -> Result<Vec<String>, String> {
    LocalSource
        .read_dir(Path::new(&path))
        .map_err(|error| format!("Error reading directory {path}: {error}"))
}

#[tauri::command]
pub async fn read_file_as_bytes(path: String) -> Result<Vec<u8>, String> {
    blocking(move || {
        LocalSource
            .read_bytes(Path::new(&path))
            .map_err(|error| format!("Error reading file {path}: {error}"))
    })
    .await
}

#[tauri::command]
pub fn read_text_file(path: String) -> Result<String, String> {
    LocalSource
        .read_text(Path::new(&path))
        .map_err(|error| format!("Error reading file {path}: {error}"))
}

#[tauri::command]
pub async fn crop_image_from_bytes(
    image_bytes: Vec<u8>,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, String> {
    let rect = CropRect {
        x,
        y,
        width,
        height,
    };
    blocking(move || {
        assets::crop_image_from_bytes(&image_bytes, rect).map_err(|error| error.to_string())
    })
    .await
}

#[tauri::command]
pub async fn optimize_image_bytes(image_bytes: Vec<u8>) -> Result<Vec<u8>, String> {
    blocking(move || assets::optimize_image_bytes(&image_bytes).map_err(|error| error.to_string()))
        .await
}

#[tauri::command]
pub fn parse_asset_file(asset_content: String) -> Result<CropRect, String> {
    assets::parse_asset_file(&asset_content).map_err(|error| error.to_string())
}
