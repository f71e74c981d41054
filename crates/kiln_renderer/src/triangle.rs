//! Triangle and triangle mesh primitives.
//!
//! Triangles are intersected against the plane of their face normal, followed
//! by an inside-outside test on the three edges. The winding order of the
//! vertices decides which side is the front face.

use std::sync::Arc;

use crate::hittable::{HitRecord, Hittable};
use crate::Material;
use kiln_core::Mesh;
use kiln_math::{Interval, Point3, Ray, Vec2, Vec3};

const PARALLEL_EPSILON: f64 = 1e-8;

/// A single triangle.
#[derive(Debug, Clone)]
pub struct Triangle {
    a: Point3,
    b: Point3,
    c: Point3,
    /// Unit face normal, zero for degenerate triangles
    normal: Vec3,
    /// Twice the triangle area
    area2: f64,
    material: Arc<Material>,
}

impl Triangle {
    /// Create a new triangle from three vertices in counter-clockwise order.
    pub fn new(a: Point3, b: Point3, c: Point3, material: Arc<Material>) -> Self {
        let n = (b - a).cross(c - a);
        let area2 = n.length();
        let normal = if area2 > 0.0 { n / area2 } else { Vec3::ZERO };

        Self {
            a,
            b,
            c,
            normal,
            area2,
            material,
        }
    }

    pub fn vertices(&self) -> [Point3; 3] {
        [self.a, self.b, self.c]
    }

    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    // Signed area of the sub-triangle (from, to, p), relative to the face normal
    fn edge_area(&self, from: Point3, to: Point3, p: Point3) -> f64 {
        (to - from).cross(p - from).dot(self.normal)
    }
}

impl Hittable for Triangle {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let denom = ray.direction().dot(self.normal);
        // Also rejects degenerate triangles, whose normal is zero
        if !(denom.abs() >= PARALLEL_EPSILON) {
            return None;
        }

        let t = (self.a - ray.origin()).dot(self.normal) / denom;
        if !ray_t.contains(t) {
            return None;
        }

        let p = ray.at(t);
        let w_c = self.edge_area(self.a, self.b, p);
        let w_a = self.edge_area(self.b, self.c, p);
        let w_b = self.edge_area(self.c, self.a, p);
        if w_a < 0.0 || w_b < 0.0 || w_c < 0.0 {
            return None;
        }

        let uv = Vec2::new(w_b / self.area2, w_c / self.area2);
        Some(HitRecord::new(ray, t, self.normal, uv, &self.material))
    }

    fn center(&self) -> Point3 {
        (self.a + self.b + self.c) / 3.0
    }
}

/// Triangles sharing a single material.
#[derive(Debug, Clone)]
pub struct TriangleMesh {
    triangles: Vec<Triangle>,
    center: Point3,
}

impl TriangleMesh {
    pub fn new(triangles: Vec<Triangle>) -> Self {
        let center = if triangles.is_empty() {
            Point3::ZERO
        } else {
            let sum: Vec3 = triangles.iter().map(Hittable::center).sum();
            sum / triangles.len() as f64
        };
        Self { triangles, center }
    }

    /// Build renderable triangles from imported mesh data, offset by `origin`.
    pub fn from_mesh(mesh: &Mesh, origin: Point3, material: Arc<Material>) -> Self {
        let triangles: Vec<_> = mesh
            .triangles()
            .into_iter()
            .map(|[a, b, c]| Triangle::new(a + origin, b + origin, c + origin, Arc::clone(&material)))
            .collect();

        log::debug!("Built triangle mesh with {} triangles", triangles.len());
        Self::new(triangles)
    }

    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}

impl Hittable for TriangleMesh {
    fn hit(&self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'_>> {
        let mut closest: Option<HitRecord<'_>> = None;

        for triangle in &self.triangles {
            let closest_so_far = closest.map_or(ray_t.max, |rec| rec.t);
            if let Some(rec) = triangle.hit(ray, ray_t.with_max(closest_so_far)) {
                closest = Some(rec);
            }
        }

        closest
    }

    fn center(&self) -> Point3 {
        self.center
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn material() -> Arc<Material> {
        Arc::new(Material::lambertian(Vec3::splat(0.5)))
    }

    // Counter-clockwise seen from +z
    fn unit_triangle() -> Triangle {
        Triangle::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
            material(),
        )
    }

    fn down_z(x: f64, y: f64) -> Ray {
        Ray::new(Point3::new(x, y, 1.0), Vec3::new(0.0, 0.0, -1.0))
    }

    #[test]
    fn test_triangle_hit_inside() {
        let tri = unit_triangle();
        assert_eq!(tri.normal(), Vec3::Z);

        let rec = tri.hit(&down_z(0.25, 0.25), Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-12);
        assert!(rec.front_face);
        assert!((rec.uv - Vec2::new(0.25, 0.25)).length() < 1e-12);
    }

    #[test]
    fn test_triangle_miss_outside() {
        let tri = unit_triangle();
        assert!(tri.hit(&down_z(0.75, 0.75), Interval::new(0.001, f64::INFINITY)).is_none());
        assert!(tri.hit(&down_z(-0.1, 0.5), Interval::new(0.001, f64::INFINITY)).is_none());
    }

    #[test]
    fn test_triangle_back_face() {
        let ray = Ray::new(Point3::new(0.2, 0.2, -1.0), Vec3::Z);
        let tri = unit_triangle();
        let rec = tri.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!(!rec.front_face);
        assert_eq!(rec.normal, -Vec3::Z);
    }

    #[test]
    fn test_triangle_vertex_uv() {
        let tri = unit_triangle();
        let at_b = tri.hit(&down_z(1.0, 0.0), Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((at_b.uv - Vec2::new(1.0, 0.0)).length() < 1e-12);
        let at_c = tri.hit(&down_z(0.0, 1.0), Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((at_c.uv - Vec2::new(0.0, 1.0)).length() < 1e-12);
    }

    #[test]
    fn test_parallel_and_degenerate_miss() {
        let tri = unit_triangle();
        let along = Ray::new(Point3::new(-1.0, 0.2, 0.0), Vec3::X);
        assert!(tri.hit(&along, Interval::UNIVERSE).is_none());

        let flat = Triangle::new(Point3::ZERO, Point3::X, Point3::X * 2.0, material());
        assert_eq!(flat.normal(), Vec3::ZERO);
        assert!(flat.hit(&down_z(0.5, 0.0), Interval::UNIVERSE).is_none());
    }

    #[test]
    fn test_mesh_from_imported_data() {
        let mesh = Mesh::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
            ],
            vec![0, 1, 2, 1, 3, 2],
        );
        let origin = Point3::new(0.0, 0.0, -5.0);
        let tri_mesh = TriangleMesh::from_mesh(&mesh, origin, material());
        assert_eq!(tri_mesh.len(), 2);

        // Upper-right triangle only exists in the second face
        let ray = Ray::new(Point3::new(0.9, 0.9, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let rec = tri_mesh.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 5.0).abs() < 1e-12);
        assert!(rec.front_face);

        let center = tri_mesh.center();
        assert!((center.z + 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_mesh_closest_hit() {
        let near = Triangle::new(
            Point3::new(-1.0, -1.0, -1.0),
            Point3::new(1.0, -1.0, -1.0),
            Point3::new(0.0, 1.0, -1.0),
            material(),
        );
        let far = Triangle::new(
            Point3::new(-1.0, -1.0, -3.0),
            Point3::new(1.0, -1.0, -3.0),
            Point3::new(0.0, 1.0, -3.0),
            material(),
        );
        let mesh = TriangleMesh::new(vec![far, near]);
        let ray = Ray::new(Point3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let rec = mesh.hit(&ray, Interval::new(0.001, f64::INFINITY)).unwrap();
        assert!((rec.t - 1.0).abs() < 1e-12);
    }
}
