//! Infinite plane primitive.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use kiln_math::{unit_vector, Interval, Point3, Ray, Vec2, Vec3};

/// Rays closer to parallel than this never hit the plane.
const PARALLEL_EPSILON: f64 = 1e-8;

/// An infinite plane through `anchor` with unit normal `normal`.
#[derive(Debug, Clone)]
pub struct Plane {
    anchor: Point3,
    normal: Vec3,
    // Orthonormal tangents spanning the plane, used for UV
    tangent: Vec3,
    bitangent: Vec3,
    material: Arc<Material>,
}

impl Plane {
    pub fn new(anchor: Point3, normal: Vec3, material: Arc<Material>) -> Self {
        let normal = unit_vector(normal);
        let helper = if normal.x.abs() > 0.9 { Vec3::Y } else { Vec3::X };
        let tangent = unit_vector(helper.cross(normal));
        let bitangent = normal.cross(tangent);

        Self {
            anchor,
            normal,
            tangent,
            bitangent,
            material,
        }
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }
}

impl Hittable for Plane {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = ray.direction().dot(self.normal);
        if !(denom.abs() >= PARALLEL_EPSILON) {
            return None;
        }

        let t = (self.anchor - ray.origin()).dot(self.normal) / denom;
        if !ray_t.surrounds(t) {
            return None;
        }

        let offset = ray.at(t) - self.anchor;
        let uv = Vec2::new(offset.dot(self.tangent), offset.dot(self.bitangent));
        Some(HitRecord::new(ray, t, self.normal, uv, &self.material))
    }

    fn center(&self) -> Point3 {
        self.anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground() -> Plane {
        Plane::new(
            Point3::new(0.0, -1.0, 0.0),
            Vec3::new(0.0, 2.0, 0.0),
            Arc::new(Material::lambertian(Vec3::splat(0.5))),
        )
    }

    #[test]
    fn test_plane_hit_from_above() {
        let plane = ground();
        assert_eq!(plane.normal(), Vec3::Y);

        let ray = Ray::new(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = plane.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 2.0).abs() < 1e-12);
        assert_eq!(rec.p, Point3::new(0.0, -1.0, 0.0));
        assert!(rec.front_face);
        assert_eq!(rec.normal, Vec3::Y);
    }

    #[test]
    fn test_plane_hit_from_below_flips_normal() {
        let ray = Ray::new(Point3::new(0.0, -3.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let plane = ground();
        let rec = plane.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Y);
    }

    #[test]
    fn test_parallel_ray_misses() {
        let ray = Ray::new(Point3::ZERO, Vec3::X);
        assert!(ground().hit(&ray, Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let ray = Ray::new(Point3::ZERO, Vec3::Y);
        assert!(ground().hit(&ray, Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_plane_uv_follows_tangents() {
        let plane = ground();
        let ray = Ray::new(Point3::new(2.0, 1.0, 3.0), Vec3::new(0.0, -1.0, 0.0));
        let rec = plane.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();

        // Offset (2, 0, 3) projected onto the two unit tangents keeps its length
        assert!((rec.uv.length() - 13f64.sqrt()).abs() < 1e-12);
        assert!(plane.tangent.dot(plane.normal).abs() < 1e-12);
        assert!(plane.bitangent.dot(plane.tangent).abs() < 1e-12);
    }
}
