use std::io::Cursor;

use image::{imageops, ImageFormat, RgbaImage};

use super::descriptor::CropRect;
use crate::error::{CoreError, Result};

/// Crops `rect` out of an encoded image and returns it as PNG bytes.
///
/// `rect.y` is measured from the bottom edge, as the engine stores it. The region
/// must lie fully inside the image; pixels are copied as-is with no resampling.
pub fn crop_image_from_bytes(image_bytes: &[u8], rect: CropRect) -> Result<Vec<u8>> {
    crop_rgba(&decode_rgba(image_bytes)?, rect)
}

pub fn decode_rgba(image_bytes: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(image_bytes)?.to_rgba8())
}

/// [`crop_image_from_bytes`] for an image that is already decoded.
pub fn crop_rgba(rgba: &RgbaImage, rect: CropRect) -> Result<Vec<u8>> {
    let CropRect {
        x,
        y,
        width,
        height,
    } = rect;

    let (img_width, img_height) = rgba.dimensions();

    if x >= img_width || y >= img_height || width == 0 || height == 0 {
        return Err(CoreError::InvalidCrop(format!(
            "x:{x}, y:{y}, width:{width}, height:{height} for image dimensions ({img_width}x{img_height})"
        )));
    }

    let bottom = y.checked_add(height).filter(|end| *end <= img_height);
    let Some(bottom) = bottom else {
        return Err(CoreError::InvalidCrop(format!(
            "y:{y} + height:{height} exceeds image height {img_height}"
        )));
    };

    let right = x.checked_add(width).filter(|end| *end <= img_width);
    if right.is_none() {
        return Err(CoreError::InvalidCrop(format!(
            "x:{x} + width:{width} exceeds image width {img_width}"
        )));
    }

    let image_y = img_height - bottom;
    log::debug!(
        "[Crop] {img_width}x{img_height} atlas, engine y {y} -> image y {image_y}"
    );

    let cropped = imageops::crop_imm(rgba, x, image_y, width, height).to_image();
    encode_png(&cropped)
}

/// Re-encodes any decodable image as an RGBA8 PNG.
pub fn optimize_image_bytes(image_bytes: &[u8]) -> Result<Vec<u8>> {
    let rgba = decode_rgba(image_bytes)?;
    let png = encode_png(&rgba)?;
    log::debug!(
        "[Optimize] {}x{}: {} bytes -> {} bytes",
        rgba.width(),
        rgba.height(),
        image_bytes.len(),
        png.len()
    );
    Ok(png)
}

fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut png_bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut png_bytes), ImageFormat::Png)?;
    Ok(png_bytes)
}
