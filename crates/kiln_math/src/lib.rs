//! Kiln math primitives.
//!
//! Double precision vectors come from glam; this crate adds the ray and
//! interval types used by the renderer plus a handful of vector helpers.

mod interval;
mod ray;
mod vec;

pub use glam::{DVec2, DVec3};
pub use interval::Interval;
pub use ray::Ray;
pub use vec::{near_zero, reflect, refract, unit_vector};

/// 3D vector with `f64` components.
pub type Vec3 = DVec3;

/// A position in world space.
pub type Point3 = DVec3;

/// Linear RGB color, nominally in [0, 1] per channel.
pub type Color = DVec3;

/// Surface (u, v) coordinates.
pub type Vec2 = DVec2;
