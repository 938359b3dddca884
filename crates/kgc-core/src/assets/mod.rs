//! Engine asset helpers: sprite descriptors and atlas textures.

pub mod descriptor;
pub mod texture;

pub use descriptor::{parse_asset_file, CropRect};
pub use texture::{crop_image_from_bytes, crop_rgba, decode_rgba, optimize_image_bytes};
