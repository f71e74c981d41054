//! Render output buffer and PPM serialization.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use kiln_math::{Color, Interval};

use crate::bucket::{Bucket, TileGrid};

/// Row-major image of linear colors.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Color>,
}

impl Framebuffer {
    /// Create a new buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[self.offset(x, y)]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        let offset = self.offset(x, y);
        self.pixels[offset] = color;
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Split the buffer into one writable view per bucket of `grid`.
    ///
    /// Views are returned in row-major bucket order. Each view holds the
    /// bucket's own row segments, so views can be filled from different
    /// threads at the same time.
    pub fn tiles_mut(&mut self, grid: &TileGrid) -> Vec<TileView<'_>> {
        debug_assert_eq!((grid.width(), grid.height()), (self.width, self.height));

        let tile_size = grid.tile_size() as usize;
        let columns = grid.columns() as usize;
        let mut views: Vec<TileView<'_>> = grid
            .buckets()
            .into_iter()
            .map(|bucket| TileView {
                bucket,
                rows: Vec::with_capacity(bucket.height as usize),
            })
            .collect();

        if self.width == 0 {
            return views;
        }

        for (y, row) in self.pixels.chunks_exact_mut(self.width as usize).enumerate() {
            let first = (y / tile_size) * columns;
            let mut rest = row;
            for view in &mut views[first..first + columns] {
                let (segment, tail) = std::mem::take(&mut rest).split_at_mut(view.bucket.width as usize);
                view.rows.push(segment);
                rest = tail;
            }
        }

        views
    }

    /// Write the image as plain-text PPM (P3), gamma corrected.
    pub fn write_ppm<W: Write>(&self, mut out: W) -> io::Result<()> {
        writeln!(out, "P3\n{} {}\n255", self.width, self.height)?;
        for color in &self.pixels {
            let [r, g, b] = color_to_rgb(*color);
            writeln!(out, "{r} {g} {b}")?;
        }
        out.flush()
    }

    /// Write the image to a PPM file.
    pub fn save_ppm(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = File::create(path.as_ref())?;
        self.write_ppm(BufWriter::new(file))?;
        log::info!(
            "Wrote {}x{} image to {}",
            self.width,
            self.height,
            path.as_ref().display()
        );
        Ok(())
    }
}

/// Writable window onto the pixels of one bucket.
#[derive(Debug)]
pub struct TileView<'a> {
    bucket: Bucket,
    rows: Vec<&'a mut [Color]>,
}

impl<'a> TileView<'a> {
    pub fn bucket(&self) -> Bucket {
        self.bucket
    }

    /// Set a pixel, in coordinates local to the bucket.
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.rows[y as usize][x as usize] = color;
    }

    pub fn get(&self, x: u32, y: u32) -> Color {
        self.rows[y as usize][x as usize]
    }

    /// The bucket's row segments, top row first.
    pub fn rows_mut(&mut self) -> &mut [&'a mut [Color]] {
        &mut self.rows
    }
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Convert a linear color to 8-bit RGB.
pub fn color_to_rgb(color: Color) -> [u8; 3] {
    const INTENSITY: Interval = Interval::new(0.0, 0.999);
    let byte = |c: f64| (256.0 * INTENSITY.clamp(linear_to_gamma(c))) as u8;
    [byte(color.x), byte(color.y), byte(color.z)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_to_gamma() {
        assert_eq!(linear_to_gamma(0.0), 0.0);
        assert_eq!(linear_to_gamma(-1.0), 0.0);
        assert_eq!(linear_to_gamma(f64::NAN), 0.0);
        assert!((linear_to_gamma(0.25) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_color_to_rgb() {
        assert_eq!(color_to_rgb(Color::ZERO), [0, 0, 0]);
        assert_eq!(color_to_rgb(Color::ONE), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::splat(4.0)), [255, 255, 255]);
        assert_eq!(color_to_rgb(Color::new(0.25, -1.0, 1.0)), [128, 0, 255]);
    }

    #[test]
    fn test_write_ppm() {
        let mut fb = Framebuffer::new(2, 1);
        fb.set(1, 0, Color::new(1.0, 0.25, 0.0));

        let mut out = Vec::new();
        fb.write_ppm(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "P3\n2 1\n255\n0 0 0\n255 128 0\n");
    }

    #[test]
    fn test_save_ppm() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.ppm");

        Framebuffer::new(3, 2).save_ppm(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("P3\n3 2\n255\n"));
        assert_eq!(text.lines().count(), 3 + 6);
    }

    #[test]
    fn test_tiles_cover_every_pixel_once() {
        for &(w, h, size) in &[(1, 1, 16), (16, 16, 16), (17, 5, 4), (64, 37, 16), (5, 9, 100)] {
            let mut fb = Framebuffer::new(w, h);
            let grid = TileGrid::new(w, h, size);

            let mut views = fb.tiles_mut(&grid);
            assert_eq!(views.len(), grid.len());
            for view in &mut views {
                for row in view.rows_mut() {
                    row.iter_mut().for_each(|pixel| *pixel += Color::ONE);
                }
            }
            drop(views);

            assert!(fb.pixels().iter().all(|p| *p == Color::ONE), "{w}x{h} tile {size}");
        }
    }

    #[test]
    fn test_tile_view_maps_to_global_pixels() {
        let mut fb = Framebuffer::new(10, 7);
        let grid = TileGrid::new(10, 7, 4);
        {
            let mut views = fb.tiles_mut(&grid);
            let view = views.iter_mut().find(|v| v.bucket().index == 4).unwrap();
            assert_eq!((view.bucket().x, view.bucket().y), (4, 4));
            assert_eq!((view.bucket().width, view.bucket().height), (4, 3));
            view.set(1, 2, Color::X);
            assert_eq!(view.get(1, 2), Color::X);
        }
        assert_eq!(fb.get(5, 6), Color::X);
    }
}
