//! Textures map surface UV coordinates to colors.

use std::fmt;
use std::sync::Arc;

use kiln_core::Image;
use kiln_math::{Color, Vec2};

/// A color lookup over surface UV coordinates.
pub trait Texture: fmt::Debug + Send + Sync {
    fn value(&self, uv: Vec2) -> Color;
}

/// A single constant color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor(pub Color);

impl Texture for SolidColor {
    fn value(&self, _uv: Vec2) -> Color {
        self.0
    }
}

/// Brightness of the dark checker squares relative to the primary color.
const CHECKER_DARK: f64 = 0.4;

/// Checkerboard pattern in UV space.
///
/// Alternates between the primary color and a darkened copy of it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Checker {
    primary: Color,
    tiles_u: u32,
    tiles_v: u32,
}

impl Checker {
    /// `tiles_u` x `tiles_v` squares across the unit UV square.
    pub fn new(primary: Color, tiles_u: u32, tiles_v: u32) -> Self {
        Self {
            primary,
            tiles_u: tiles_u.max(1),
            tiles_v: tiles_v.max(1),
        }
    }
}

impl Texture for Checker {
    fn value(&self, uv: Vec2) -> Color {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);
        let iu = (u * f64::from(self.tiles_u)).floor() as i64;
        let iv = (v * f64::from(self.tiles_v)).floor() as i64;

        if (iu + iv) & 1 == 0 {
            self.primary
        } else {
            self.primary * CHECKER_DARK
        }
    }
}

/// A texture backed by a decoded image.
#[derive(Debug, Clone)]
pub struct ImageTexture {
    image: Arc<Image>,
}

impl ImageTexture {
    pub fn new(image: Arc<Image>) -> Self {
        Self { image }
    }
}

impl Texture for ImageTexture {
    fn value(&self, uv: Vec2) -> Color {
        self.image.sample(uv.x, uv.y)
    }
}
