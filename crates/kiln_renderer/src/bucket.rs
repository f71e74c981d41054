//! Bucket-based tile rendering.
//!
//! Divides the image into tiles (buckets) that can be rendered
//! independently and in parallel.

use rand::RngCore;

use crate::framebuffer::TileView;
use crate::renderer::render_pixel;
use crate::{Camera, Scene};

/// A rectangular region of the image to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    /// X coordinate of bucket's top-left corner
    pub x: u32,
    /// Y coordinate of bucket's top-left corner
    pub y: u32,
    /// Width of the bucket in pixels
    pub width: u32,
    /// Height of the bucket in pixels
    pub height: u32,
    /// Row-major position of this bucket in its grid
    pub index: usize,
}

impl Bucket {
    /// Create a new bucket.
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self {
            x,
            y,
            width,
            height,
            index,
        }
    }

    /// Get the total number of pixels in this bucket.
    pub fn pixel_count(&self) -> u32 {
        self.width * self.height
    }

    /// Squared distance from the bucket center to the image center.
    fn center_distance_sq(&self, width: u32, height: u32) -> f64 {
        let cx = f64::from(self.x) + f64::from(self.width) / 2.0;
        let cy = f64::from(self.y) + f64::from(self.height) / 2.0;
        (cx - f64::from(width) / 2.0).powi(2) + (cy - f64::from(height) / 2.0).powi(2)
    }
}

/// Layout of square buckets over an image. Edge buckets are clipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tile_size: u32,
    columns: u32,
    rows: u32,
}

impl TileGrid {
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        let tile_size = tile_size.max(1);
        Self {
            width,
            height,
            tile_size,
            columns: width.div_ceil(tile_size),
            rows: height.div_ceil(tile_size),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of buckets.
    pub fn len(&self) -> usize {
        self.columns as usize * self.rows as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bucket at row-major position `index`.
    pub fn bucket(&self, index: usize) -> Bucket {
        let col = (index % self.columns as usize) as u32;
        let row = (index / self.columns as usize) as u32;
        let x = col * self.tile_size;
        let y = row * self.tile_size;
        Bucket::new(
            x,
            y,
            self.tile_size.min(self.width - x),
            self.tile_size.min(self.height - y),
            index,
        )
    }

    /// All buckets in row-major order.
    pub fn buckets(&self) -> Vec<Bucket> {
        (0..self.len()).map(|i| self.bucket(i)).collect()
    }

    /// Sort items by the distance of their bucket from the image center.
    ///
    /// Buckets closer to the center are rendered first, so the most visually
    /// important part of the image finishes early.
    pub fn sort_spiral<T>(&self, items: &mut [T], bucket_of: impl Fn(&T) -> Bucket) {
        items.sort_by(|a, b| {
            let da = bucket_of(a).center_distance_sq(self.width, self.height);
            let db = bucket_of(b).center_distance_sq(self.width, self.height);
            da.total_cmp(&db)
        });
    }
}

/// Generate buckets for an image, sorted in spiral order from center.
///
/// Each bucket keeps its row-major grid index.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let grid = TileGrid::new(width, height, bucket_size);
    let mut buckets = grid.buckets();
    grid.sort_spiral(&mut buckets, |b| *b);
    buckets
}

/// Render every pixel of a bucket into its framebuffer view.
pub fn render_bucket(view: &mut TileView<'_>, camera: &Camera, scene: &Scene, rng: &mut dyn RngCore) {
    let bucket = view.bucket();

    for local_y in 0..bucket.height {
        for local_x in 0..bucket.width {
            let color = render_pixel(camera, scene, bucket.x + local_x, bucket.y + local_y, rng);
            view.set(local_x, local_y, color);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_buckets_exact_fit() {
        let buckets = generate_buckets(128, 128, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid

        // Total pixels should equal image size
        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 128 * 128);
    }

    #[test]
    fn test_generate_buckets_partial_fit() {
        let buckets = generate_buckets(100, 70, 64);
        assert_eq!(buckets.len(), 4); // 2x2 grid with partial buckets

        let total_pixels: u32 = buckets.iter().map(|b| b.pixel_count()).sum();
        assert_eq!(total_pixels, 100 * 70);

        let corner = buckets.iter().find(|b| b.index == 3).unwrap();
        assert_eq!((corner.x, corner.y, corner.width, corner.height), (64, 64, 36, 6));
    }

    #[test]
    fn test_spiral_order() {
        let buckets = generate_buckets(192, 192, 64);
        assert_eq!(buckets.len(), 9); // 3x3 grid

        // First bucket should be the center one
        let first = &buckets[0];
        assert_eq!((first.x, first.y), (64, 64));
        assert_eq!(first.index, 4);
    }

    #[test]
    fn test_grid_indices_are_row_major() {
        let grid = TileGrid::new(50, 30, 16);
        assert_eq!((grid.columns(), grid.rows()), (4, 2));
        for (i, bucket) in grid.buckets().iter().enumerate() {
            assert_eq!(bucket.index, i);
            assert_eq!(bucket.x, (i as u32 % 4) * 16);
            assert_eq!(bucket.y, (i as u32 / 4) * 16);
        }
    }

    #[test]
    fn test_buckets_cover_every_pixel_once() {
        for &(w, h, size) in &[(1, 1, 16), (17, 5, 4), (64, 48, 16), (33, 65, 8), (7, 3, 100)] {
            let mut hits = vec![0u32; (w * h) as usize];
            for b in generate_buckets(w, h, size) {
                for y in b.y..b.y + b.height {
                    for x in b.x..b.x + b.width {
                        hits[(y * w + x) as usize] += 1;
                    }
                }
            }
            assert!(hits.iter().all(|&n| n == 1), "{w}x{h} tile {size}");
        }
    }

    #[test]
    fn test_zero_tile_size_is_clamped() {
        let grid = TileGrid::new(3, 2, 0);
        assert_eq!(grid.tile_size(), 1);
        assert_eq!(grid.len(), 6);
    }
}
