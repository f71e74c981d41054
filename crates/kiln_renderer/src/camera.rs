//! Camera for ray generation.

use kiln_core::CameraSettings;
use kiln_math::{unit_vector, Point3, Ray, Vec3};
use rand::RngCore;

use crate::sampling::{random_in_unit_disk, sample_square};

/// Camera for generating rays into the scene.
///
/// All derived state is computed once in [`Camera::new`].
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,
    samples_per_pixel: u32,
    max_depth: u32,

    defocus_angle: f64,

    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Derive a camera from its settings.
    pub fn new(settings: &CameraSettings) -> Self {
        let image_width = settings.image_width.max(1);
        let image_height = settings.image_height();
        let center = settings.look_from;

        // Calculate viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * settings.focus_dist;
        let viewport_width = viewport_height * (f64::from(image_width) / f64::from(image_height));

        // Calculate camera basis vectors
        let w = unit_vector(settings.look_from - settings.look_at);
        let u = unit_vector(settings.vup.cross(w));
        let v = w.cross(u);

        // Vectors across the horizontal and down the vertical viewport edges
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / f64::from(image_width);
        let pixel_delta_v = viewport_v / f64::from(image_height);

        let viewport_upper_left =
            center - settings.focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = settings.focus_dist * (settings.defocus_angle / 2.0).to_radians().tan();

        Self {
            image_width,
            image_height,
            samples_per_pixel: settings.samples_per_pixel.max(1),
            max_depth: settings.max_depth,
            defocus_angle: settings.defocus_angle,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        }
    }

    /// Generate a jittered ray through pixel (i, j), counted from the top-left.
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + (f64::from(i) + offset.x) * self.pixel_delta_u
            + (f64::from(j) + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        Ray::new(ray_origin, pixel_sample - ray_origin)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    pub fn samples_per_pixel(&self) -> u32 {
        self.samples_per_pixel
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    pub fn center(&self) -> Point3 {
        self.center
    }

    /// Orthonormal camera frame `(u, v, w)`; the camera looks along `-w`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(&CameraSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn square_camera() -> Camera {
        Camera::new(
            &CameraSettings::default()
                .with_resolution(100, 1.0)
                .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
                .with_lens(90.0, 0.0, 1.0),
        )
    }

    #[test]
    fn test_camera_basis() {
        let camera = square_camera();
        let (u, v, w) = camera.basis();

        assert_eq!(camera.center(), Point3::ZERO);
        assert!((w - Vec3::Z).length() < 1e-12);
        assert!((u - Vec3::X).length() < 1e-12);
        assert!((v - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_image_height_from_aspect() {
        let camera = Camera::new(&CameraSettings::default().with_resolution(400, 16.0 / 9.0));
        assert_eq!(camera.image_width(), 400);
        assert_eq!(camera.image_height(), 225);
    }

    #[test]
    fn test_camera_ray_direction() {
        let camera = square_camera();
        let mut rng = StdRng::seed_from_u64(42);

        // Center ray should point roughly towards -Z
        let ray = camera.get_ray(50, 50, &mut rng);
        assert!(ray.direction().z < 0.0);
        assert!(ray.direction().x.abs() < 0.02);
        assert!(ray.direction().y.abs() < 0.02);

        // Top-left pixel points up and to the left
        let corner = camera.get_ray(0, 0, &mut rng);
        assert!(corner.direction().x < -0.9);
        assert!(corner.direction().y > 0.9);
    }

    #[test]
    fn test_pinhole_rays_share_origin() {
        let camera = square_camera();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..10 {
            assert_eq!(camera.get_ray(10, 90, &mut rng).origin(), Point3::ZERO);
        }
    }

    #[test]
    fn test_defocus_moves_ray_origin() {
        let camera = Camera::new(
            &CameraSettings::default()
                .with_resolution(100, 1.0)
                .with_lens(40.0, 10.0, 3.4),
        );
        let mut rng = StdRng::seed_from_u64(8);
        let radius = 3.4 * 5f64.to_radians().tan();

        let mut moved = 0;
        for _ in 0..50 {
            let origin = camera.get_ray(50, 50, &mut rng).origin();
            assert!(origin.length() <= radius + 1e-12);
            assert!(origin.z.abs() < 1e-12);
            if origin != Point3::ZERO {
                moved += 1;
            }
        }
        assert!(moved > 0);
    }
}
