use std::sync::Arc;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WarpmorphError, WarpmorphResult};

/// Channel layout of an [`Image`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum Channels {
    /// Straight RGB8.
    Rgb,
    /// Straight-alpha RGBA8.
    Rgba,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }

    pub fn from_count(n: usize) -> WarpmorphResult<Self> {
        match n {
            3 => Ok(Self::Rgb),
            4 => Ok(Self::Rgba),
            _ => Err(WarpmorphError::validation(format!(
                "images must have 3 or 4 channels, got {n}"
            ))),
        }
    }
}

/// Immutable 8-bit image, row-major and tightly packed.
///
/// Pixel data is shared behind an `Arc`, so clones are cheap and an image can be handed to
/// several worker threads without copying.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    channels: Channels,
    data: Arc<Vec<u8>>,
}

impl Image {
    /// Wrap raw pixel bytes, validating dimensions and buffer length.
    pub fn new(width: u32, height: u32, channels: Channels, data: Vec<u8>) -> WarpmorphResult<Self> {
        if width == 0 || height == 0 {
            return Err(WarpmorphError::resource(format!(
                "image dimensions must be non-zero, got {width}x{height}"
            )));
        }
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|px| px.checked_mul(channels.count()))
            .ok_or_else(|| WarpmorphError::resource("image dimensions overflow"))?;
        if data.len() != expected {
            return Err(WarpmorphError::resource(format!(
                "image buffer length {} does not match {}x{}x{}",
                data.len(),
                width,
                height,
                channels.count()
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data: Arc::new(data),
        })
    }

    /// Image filled with one color. `color.len()` selects the channel layout.
    pub fn filled(width: u32, height: u32, color: &[u8]) -> WarpmorphResult<Self> {
        let channels = Channels::from_count(color.len())?;
        let px = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(px * color.len());
        for _ in 0..px {
            data.extend_from_slice(color);
        }
        Self::new(width, height, channels, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn channels(&self) -> Channels {
        self.channels
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Channel values of the pixel at `(x, y)`; panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        assert!(x < self.width && y < self.height, "pixel out of bounds");
        let c = self.channels.count();
        let i = (y as usize * self.width as usize + x as usize) * c;
        &self.data[i..i + c]
    }

    /// Same pixels with an opaque alpha channel added when missing.
    pub fn to_rgba(&self) -> Image {
        match self.channels {
            Channels::Rgba => self.clone(),
            Channels::Rgb => {
                let mut out = Vec::with_capacity(self.data.len() / 3 * 4);
                for px in self.data.chunks_exact(3) {
                    out.extend_from_slice(px);
                    out.push(255);
                }
                Image {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Rgba,
                    data: Arc::new(out),
                }
            }
        }
    }

    /// Drop the alpha channel (no compositing), used by encoders that expect RGB input.
    pub fn to_rgb(&self) -> Image {
        match self.channels {
            Channels::Rgb => self.clone(),
            Channels::Rgba => {
                let mut out = Vec::with_capacity(self.data.len() / 4 * 3);
                for px in self.data.chunks_exact(4) {
                    out.extend_from_slice(&px[..3]);
                }
                Image {
                    width: self.width,
                    height: self.height,
                    channels: Channels::Rgb,
                    data: Arc::new(out),
                }
            }
        }
    }

    /// Consume the image and return its bytes, copying only when the buffer is shared.
    pub fn into_bytes(self) -> Vec<u8> {
        Arc::try_unwrap(self.data).unwrap_or_else(|shared| shared.as_ref().clone())
    }
}

/// One output frame of a generation run. Ownership moves to the consumer on yield.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub index: FrameIndex,
    pub image: Image,
}

#[cfg(test)]
#[path = "../../tests/unit/raster/image.rs"]
mod tests;
