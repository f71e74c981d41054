//! Texture image loading.
//!
//! Images are decoded with the `image` crate and stored as linear RGB floats
//! so the renderer can sample them without further conversion.

use std::path::{Path, PathBuf};

use kiln_math::Color;
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("Failed to load texture {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Texture {} has no pixels", path.display())]
    Empty { path: PathBuf },
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A decoded image with pixel data in linear color.
#[derive(Clone, Debug)]
pub struct Image {
    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,

    /// Row-major pixels, top row first
    pub pixels: Vec<Color>,
}

impl Image {
    /// Create an image from pixel data.
    ///
    /// `pixels` must hold `width * height` entries.
    pub fn new(width: u32, height: u32, pixels: Vec<Color>) -> Self {
        debug_assert_eq!(pixels.len(), (width as usize) * (height as usize));
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Sample the image at UV coordinates (bilinear filtering).
    ///
    /// UV coordinates wrap into [0, 1), with (0, 0) at bottom-left. An image
    /// without pixels samples as black.
    pub fn sample(&self, u: f64, v: f64) -> Color {
        if self.width == 0 || self.height == 0 {
            return Color::ZERO;
        }

        let u = u.rem_euclid(1.0);
        let v = v.rem_euclid(1.0);

        // Convert to pixel coordinates
        let x = u * (f64::from(self.width) - 1.0);
        let y = (1.0 - v) * (f64::from(self.height) - 1.0); // Flip V for image coordinates

        let x0 = x.floor() as u32;
        let y0 = y.floor() as u32;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x.fract();
        let fy = y.fract();

        let top = self.pixel(x0, y0).lerp(self.pixel(x1, y0), fx);
        let bottom = self.pixel(x0, y1).lerp(self.pixel(x1, y1), fx);
        top.lerp(bottom, fy)
    }

    /// Get pixel at integer coordinates.
    fn pixel(&self, x: u32, y: u32) -> Color {
        let idx = (y as usize) * (self.width as usize) + x as usize;
        self.pixels.get(idx).copied().unwrap_or(Color::ZERO)
    }
}

/// Load an image file, converting sRGB bytes to linear color.
pub fn load_image(path: impl AsRef<Path>) -> TextureResult<Image> {
    let path = path.as_ref();
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: path.to_path_buf(),
        source,
    })?;

    let rgb = img.to_rgb8();
    let (width, height) = rgb.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty {
            path: path.to_path_buf(),
        });
    }

    let pixels = rgb
        .pixels()
        .map(|p| {
            Color::new(
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
            )
        })
        .collect();

    log::debug!("Loaded texture {} ({}x{})", path.display(), width, height);
    Ok(Image::new(width, height, pixels))
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f64 {
    let v = f64::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}
