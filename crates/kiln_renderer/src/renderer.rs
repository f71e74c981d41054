//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Iterative ray tracing with configurable depth
//! - Shadow dampening from point lights
//! - Anti-aliasing via multi-sampling
//! - Parallel tile rendering on a worker pool

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use kiln_core::RenderSettings;
use kiln_math::{unit_vector, Color, Interval, Ray};
use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use thiserror::Error;

use crate::bucket::{render_bucket, TileGrid};
use crate::framebuffer::Framebuffer;
use crate::pool::{PoolError, WorkerPool};
use crate::{Camera, Scene};

/// Minimum hit distance, to avoid re-hitting the surface a ray starts on.
pub const SHADOW_ACNE_EPSILON: f64 = 0.001;

/// Errors that can occur during a render.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),
}

/// Receives progress notifications while a render runs.
///
/// Called from worker threads, once per finished tile.
pub trait RenderProgress: Sync {
    fn tile_completed(&self, completed: usize, total: usize);
}

/// No progress reporting.
impl RenderProgress for () {
    fn tile_completed(&self, _completed: usize, _total: usize) {}
}

/// Compute the color seen by a ray.
///
/// `depth` is the number of ray segments still allowed; at zero the path has
/// run out of energy and is black.
pub fn ray_color(ray: &Ray, scene: &Scene, depth: u32, rng: &mut dyn RngCore) -> Color {
    let mut throughput = Color::ONE;
    let mut ray = *ray;

    for _ in 0..depth {
        let Some(rec) = scene.hit(&ray, Interval::new(SHADOW_ACNE_EPSILON, f64::INFINITY)) else {
            return throughput * sky_gradient(&ray);
        };

        let Some(scatter) = rec.material.scatter(&ray, &rec, rng) else {
            // Absorbed
            return Color::ZERO;
        };

        throughput *= scatter.attenuation * scene.shadow_factor(rec.p);
        ray = scatter.scattered;
    }

    Color::ZERO
}

/// Compute sky gradient background.
pub fn sky_gradient(ray: &Ray) -> Color {
    let unit_direction = unit_vector(ray.direction());
    let a = 0.5 * (unit_direction.y + 1.0);
    let white = Color::new(1.0, 1.0, 1.0);
    let blue = Color::new(0.5, 0.7, 1.0);
    white * (1.0 - a) + blue * a
}

/// Render a single pixel with multi-sampling.
///
/// Returns the average linear color of all samples.
pub fn render_pixel(camera: &Camera, scene: &Scene, x: u32, y: u32, rng: &mut dyn RngCore) -> Color {
    let samples = camera.samples_per_pixel();
    // max_depth counts bounces; one more segment lets the last bounce escape
    let depth = camera.max_depth().saturating_add(1);

    let mut pixel_color = Color::ZERO;
    for _ in 0..samples {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, scene, depth, rng);
    }

    pixel_color / f64::from(samples)
}

/// Random generator for one tile, derived from the master seed.
fn tile_rng(seed: u64, tile_index: usize) -> StdRng {
    StdRng::seed_from_u64(seed ^ (tile_index as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15))
}

/// Tiled, multi-threaded renderer.
#[derive(Debug, Clone)]
pub struct Renderer {
    camera: Camera,
    tile_size: u32,
    threads: usize,
    seed: u64,
}

impl Renderer {
    pub fn new(settings: &RenderSettings) -> Self {
        Self {
            camera: Camera::new(&settings.camera),
            tile_size: settings.tile_size,
            threads: settings.threads,
            seed: settings.seed,
        }
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Render the scene, blocking until every tile is done.
    ///
    /// Tiles are handed to the worker pool center-first. Each tile uses its
    /// own generator seeded from the master seed and its grid position, so
    /// the result does not depend on thread count or scheduling.
    pub fn render(&self, scene: &Scene, progress: &dyn RenderProgress) -> Result<Framebuffer, RenderError> {
        let width = self.camera.image_width();
        let height = self.camera.image_height();
        let grid = TileGrid::new(width, height, self.tile_size);
        let total = grid.len();

        let pool = WorkerPool::new(self.threads)?;
        log::info!(
            "Rendering {}x{} ({} spp, depth {}) as {} tiles of {}px on {} threads",
            width,
            height,
            self.camera.samples_per_pixel(),
            self.camera.max_depth(),
            total,
            grid.tile_size(),
            pool.threads()
        );

        let start = Instant::now();
        let mut framebuffer = Framebuffer::new(width, height);
        let completed = AtomicUsize::new(0);

        let mut views = framebuffer.tiles_mut(&grid);
        grid.sort_spiral(&mut views, |view| view.bucket());

        let camera = &self.camera;
        let seed = self.seed;
        let completed_ref = &completed;

        pool.run(move |queue| -> Result<(), PoolError> {
            for mut view in views {
                queue.submit(move || {
                    let mut rng = tile_rng(seed, view.bucket().index);
                    render_bucket(&mut view, camera, scene, &mut rng);

                    let done = completed_ref.fetch_add(1, Ordering::Relaxed) + 1;
                    progress.tile_completed(done, total);
                })?;
            }
            queue.shutdown();
            Ok(())
        })?;

        log::info!(
            "Rendered {} tiles in {:.2}s",
            completed.load(Ordering::Relaxed),
            start.elapsed().as_secs_f64()
        );
        Ok(framebuffer)
    }
}
