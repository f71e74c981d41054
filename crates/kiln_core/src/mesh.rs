//! Triangle mesh geometry.
//!
//! A mesh here is only positions and triangle indices. It is populated by the
//! OBJ importer and turned into renderable triangles by the renderer, which
//! keeps the winding order (and so the face normal direction) untouched.

use kiln_math::{Point3, Vec3};

/// A mesh consisting of vertex positions and triangle indices.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    /// Vertex positions (one Point3 per vertex)
    pub positions: Vec<Point3>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh from positions and indices.
    pub fn new(positions: Vec<Point3>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    /// Append another mesh, re-basing its indices after our vertices.
    pub fn append(&mut self, other: &Mesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Check if the mesh has no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangle_count() == 0
    }

    /// Average of all vertex positions, or `None` for a mesh without vertices.
    pub fn centroid(&self) -> Option<Point3> {
        if self.positions.is_empty() {
            return None;
        }
        let sum: Vec3 = self.positions.iter().copied().sum();
        Some(sum / self.positions.len() as f64)
    }

    /// Axis-aligned extent as `(min, max)` corners.
    pub fn bounds(&self) -> Option<(Point3, Point3)> {
        let first = *self.positions.first()?;
        Some(
            self.positions
                .iter()
                .fold((first, first), |(lo, hi), p| (lo.min(*p), hi.max(*p))),
        )
    }

    /// Extract triangle vertices as `[v0, v1, v2]` triplets in index order.
    ///
    /// Triangles referencing vertices that do not exist are skipped.
    pub fn triangles(&self) -> Vec<[Point3; 3]> {
        let mut triangles = Vec::with_capacity(self.triangle_count());

        for chunk in self.indices.chunks_exact(3) {
            let i0 = chunk[0] as usize;
            let i1 = chunk[1] as usize;
            let i2 = chunk[2] as usize;

            let (Some(&v0), Some(&v1), Some(&v2)) = (
                self.positions.get(i0),
                self.positions.get(i1),
                self.positions.get(i2),
            ) else {
                log::warn!(
                    "Invalid triangle indices: [{}, {}, {}], vertex count: {}",
                    i0,
                    i1,
                    i2,
                    self.positions.len()
                );
                continue;
            };

            triangles.push([v0, v1, v2]);
        }

        triangles
    }
}
