//! Surface materials.
//!
//! The set of materials is closed, so they are a plain enum rather than trait
//! objects. Geometry shares materials through `Arc<Material>`.

use std::sync::Arc;

use kiln_math::{near_zero, reflect, refract, unit_vector, Color, Ray};
use rand::RngCore;

use crate::hittable::HitRecord;
use crate::sampling::{random_f64, random_unit_vector};
use crate::texture::{SolidColor, Texture};

/// Outcome of a successful scatter: the attenuation color and the new ray.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Scatter {
    pub attenuation: Color,
    pub scattered: Ray,
}

/// How light interacts with a surface.
#[derive(Debug, Clone)]
pub enum Material {
    Lambertian(Lambertian),
    Metal(Metal),
    Dielectric(Dielectric),
    Light(Light),
}

impl Material {
    /// Diffuse material with a constant albedo.
    pub fn lambertian(albedo: Color) -> Self {
        Self::Lambertian(Lambertian::new(albedo))
    }

    /// Diffuse material whose albedo comes from a texture.
    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self::Lambertian(Lambertian::from_texture(texture))
    }

    pub fn metal(albedo: Color, fuzz: f64) -> Self {
        Self::Metal(Metal::new(albedo, fuzz))
    }

    pub fn dielectric(ior: f64) -> Self {
        Self::Dielectric(Dielectric::new(ior))
    }

    pub fn light() -> Self {
        Self::Light(Light)
    }

    /// Scatter an incoming ray.
    ///
    /// Returns `None` if the ray is absorbed.
    pub fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        match self {
            Self::Lambertian(m) => m.scatter(rec, rng),
            Self::Metal(m) => m.scatter(ray_in, rec, rng),
            Self::Dielectric(m) => m.scatter(ray_in, rec, rng),
            Self::Light(_) => None,
        }
    }
}

/// Lambertian (diffuse) material.
#[derive(Debug, Clone)]
pub struct Lambertian {
    albedo: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a new Lambertian material with the given albedo color.
    pub fn new(albedo: Color) -> Self {
        Self::from_texture(Arc::new(SolidColor(albedo)))
    }

    pub fn from_texture(albedo: Arc<dyn Texture>) -> Self {
        Self { albedo }
    }

    fn scatter(&self, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        Some(Scatter {
            attenuation: self.albedo.value(rec.uv),
            scattered: Ray::new(rec.p, scatter_direction),
        })
    }
}

/// Metal (specular) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: The color of the metal
    /// - `fuzz`: Roughness, 0.0 = perfect mirror, 1.0 = very rough
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let reflected = unit_vector(reflect(ray_in.direction(), rec.normal));
        let direction = reflected + self.fuzz * random_unit_vector(rng);

        // Fuzz may push the ray below the surface; absorb it then
        (direction.dot(rec.normal) > 0.0).then(|| Scatter {
            attenuation: self.albedo,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Dielectric (glass) material.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dielectric {
    /// Index of refraction
    ior: f64,
}

impl Dielectric {
    /// Create a new Dielectric material.
    ///
    /// - `ior`: Index of refraction (1.0 = air, 1.5 = glass, 2.4 = diamond)
    pub fn new(ior: f64) -> Self {
        Self { ior }
    }

    /// Schlick's approximation for reflectance
    fn reflectance(cosine: f64, ior: f64) -> f64 {
        let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }

    fn scatter(&self, ray_in: &Ray, rec: &HitRecord, rng: &mut dyn RngCore) -> Option<Scatter> {
        let ri = if rec.front_face { 1.0 / self.ior } else { self.ior };

        let unit_direction = unit_vector(ray_in.direction());
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        // Total internal reflection
        let cannot_refract = ri * sin_theta > 1.0;

        let direction = if cannot_refract || Self::reflectance(cos_theta, ri) > random_f64(rng) {
            reflect(unit_direction, rec.normal)
        } else {
            refract(unit_direction, rec.normal, ri)
        };

        Some(Scatter {
            attenuation: Color::ONE,
            scattered: Ray::new(rec.p, direction),
        })
    }
}

/// Marker material for light sources.
///
/// Absorbs every ray and emits nothing; surfaces using it render black.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Light;
