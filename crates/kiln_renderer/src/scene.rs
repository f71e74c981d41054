//! A renderable scene: geometry plus point lights.

use kiln_math::{Interval, Point3, Ray};

use crate::hittable::{HitRecord, Hittable, HittableList};

/// Throughput multiplier applied for every light hidden from a shaded point.
pub const SHADOW_DAMPING: f64 = 0.4;

/// Shadow rays start this far along their direction to avoid self-hits.
const SHADOW_EPSILON: f64 = 0.001;

/// Everything the integrator needs to know about the world.
#[derive(Default)]
pub struct Scene {
    pub world: HittableList,
    /// Point light positions; only used for shadow tests
    pub lights: Vec<Point3>,
}

impl Scene {
    pub fn new(world: HittableList) -> Self {
        Self {
            world,
            lights: Vec::new(),
        }
    }

    pub fn with_light(mut self, position: Point3) -> Self {
        self.lights.push(position);
        self
    }

    /// Closest intersection with the world geometry.
    pub fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        self.world.hit(ray, ray_t)
    }

    /// Whether any geometry lies between `point` and `light`.
    pub fn is_occluded(&self, point: Point3, light: Point3) -> bool {
        let shadow_ray = Ray::new(point, light - point);
        self.world
            .hit(&shadow_ray, Interval::new(SHADOW_EPSILON, 1.0))
            .is_some()
    }

    /// Combined shadow factor at `point`: [`SHADOW_DAMPING`] per occluded light.
    pub fn shadow_factor(&self, point: Point3) -> f64 {
        self.lights
            .iter()
            .filter(|light| self.is_occluded(point, **light))
            .fold(1.0, |factor, _| factor * SHADOW_DAMPING)
    }
}
