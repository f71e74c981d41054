//! Kiln renderer - CPU path tracing.
//!
//! A Monte Carlo path tracer that renders a [`Scene`] through a [`Camera`]
//! into a [`Framebuffer`]. The image is cut into square tiles which a fixed
//! pool of worker threads renders in parallel, each tile writing only its
//! own pixels.

mod bucket;
mod camera;
mod framebuffer;
mod hittable;
mod material;
mod plane;
mod pool;
mod renderer;
mod sampling;
mod scene;
mod sphere;
mod texture;
mod triangle;

pub use bucket::{generate_buckets, render_bucket, Bucket, TileGrid};
pub use camera::Camera;
pub use framebuffer::{color_to_rgb, linear_to_gamma, Framebuffer, TileView};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Dielectric, Lambertian, Light, Material, Metal, Scatter};
pub use plane::Plane;
pub use pool::{PoolError, TileQueue, WorkerPool};
pub use renderer::{
    ray_color, render_pixel, sky_gradient, RenderError, RenderProgress, Renderer,
    SHADOW_ACNE_EPSILON,
};
pub use scene::{Scene, SHADOW_DAMPING};
pub use sphere::Sphere;
pub use texture::{Checker, ImageTexture, SolidColor, Texture};
pub use triangle::{Triangle, TriangleMesh};

/// Re-export the math types used throughout the public API
pub use kiln_math::{Color, Interval, Point3, Ray, Vec2, Vec3};
