use std::path::Path;

use anyhow::Context as _;

use crate::foundation::error::{WarpmorphError, WarpmorphResult};
use crate::raster::image::{Channels, Image};

/// Decode encoded image bytes (PNG, JPEG, …) into an [`Image`].
///
/// Sources with an alpha channel decode to RGBA, everything else to RGB.
pub fn decode_image(bytes: &[u8]) -> WarpmorphResult<Image> {
    let dyn_img = image::load_from_memory(bytes)
        .map_err(|e| WarpmorphError::resource(format!("decode image from memory: {e}")))?;
    from_dynamic(dyn_img)
}

/// Read and decode an image file.
pub fn load_image(path: &Path) -> WarpmorphResult<Image> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes).map_err(|e| match e {
        WarpmorphError::Resource(msg) => {
            WarpmorphError::resource(format!("'{}': {msg}", path.display()))
        }
        other => other,
    })
}

fn from_dynamic(dyn_img: image::DynamicImage) -> WarpmorphResult<Image> {
    let (width, height) = (dyn_img.width(), dyn_img.height());
    if dyn_img.color().has_alpha() {
        Image::new(width, height, Channels::Rgba, dyn_img.to_rgba8().into_raw())
    } else {
        Image::new(width, height, Channels::Rgb, dyn_img.to_rgb8().into_raw())
    }
}

pub(crate) fn to_dynamic(img: &Image) -> WarpmorphResult<image::DynamicImage> {
    let (w, h) = img.dimensions();
    let data = img.as_bytes().to_vec();
    let out = match img.channels() {
        Channels::Rgb => image::RgbImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgb8),
        Channels::Rgba => {
            image::RgbaImage::from_raw(w, h, data).map(image::DynamicImage::ImageRgba8)
        }
    };
    out.ok_or_else(|| WarpmorphError::evaluation("image buffer does not match its dimensions"))
}

/// Resample `img` to `width`x`height` (Catmull-Rom).
///
/// The engine never resizes implicitly; collaborators call this to reconcile morph inputs of
/// different sizes before validation.
pub fn resize_image(img: &Image, width: u32, height: u32) -> WarpmorphResult<Image> {
    if width == 0 || height == 0 {
        return Err(WarpmorphError::validation("resize target must be non-zero"));
    }
    if img.dimensions() == (width, height) {
        return Ok(img.clone());
    }
    let resized = to_dynamic(img)?.resize_exact(
        width,
        height,
        image::imageops::FilterType::CatmullRom,
    );
    match img.channels() {
        Channels::Rgb => Image::new(width, height, Channels::Rgb, resized.to_rgb8().into_raw()),
        Channels::Rgba => Image::new(width, height, Channels::Rgba, resized.to_rgba8().into_raw()),
    }
}

/// Write `img` as a PNG file.
pub fn save_png(img: &Image, path: &Path) -> WarpmorphResult<()> {
    let (w, h) = img.dimensions();
    let color = match img.channels() {
        Channels::Rgb => image::ColorType::Rgb8,
        Channels::Rgba => image::ColorType::Rgba8,
    };
    image::save_buffer_with_format(path, img.as_bytes(), w, h, color, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/raster/decode.rs"]
mod tests;
