//! Typed render settings.
//!
//! Everything here is plain value configuration; derived camera state (basis
//! vectors, pixel deltas) is computed by the renderer.

use kiln_math::{Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::config::ConfigFile;

/// Default tile edge length in pixels.
pub const DEFAULT_TILE_SIZE: u32 = 16;

/// Keys understood by [`RenderSettings::from_config`].
pub const KNOWN_KEYS: &[&str] = &[
    "image_width",
    "aspect_ratio",
    "samples_per_pixel",
    "max_depth",
    "vfov",
    "look_from",
    "look_at",
    "vup",
    "defocus_angle",
    "focus_dist",
    "tile_size",
    "threads",
    "seed",
];

/// Older spellings of keys, mapped to the key they stand for.
pub const KEY_ALIASES: &[(&str, &str)] = &[
    ("maximum_depth", "max_depth"),
    ("focus_dst", "focus_dist"),
    ("defoucs_angle", "defocus_angle"),
];

/// The key to read for `name`: the key itself when present, else an alias.
fn resolve_key<'a>(config: &ConfigFile, name: &'a str) -> &'a str {
    if config.get(name).is_some() {
        return name;
    }
    KEY_ALIASES
        .iter()
        .find(|(alias, key)| *key == name && config.get(alias).is_some())
        .map_or(name, |(alias, _)| *alias)
}

/// Camera placement, lens and sampling parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Image width divided by image height
    pub aspect_ratio: f64,
    /// Output width in pixels
    pub image_width: u32,
    /// Jittered paths traced per pixel
    pub samples_per_pixel: u32,
    /// Maximum number of bounces per path
    pub max_depth: u32,
    /// Vertical field of view in degrees
    pub vfov: f64,
    pub look_from: Point3,
    pub look_at: Point3,
    /// Camera-relative up direction
    pub vup: Vec3,
    /// Variation angle of rays through each pixel, in degrees
    pub defocus_angle: f64,
    /// Distance from `look_from` to the plane of perfect focus
    pub focus_dist: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 400,
            samples_per_pixel: 10,
            max_depth: 10,
            vfov: 90.0,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            defocus_angle: 0.0,
            focus_dist: 10.0,
        }
    }
}

impl CameraSettings {
    /// Set image width and aspect ratio.
    pub fn with_resolution(mut self, image_width: u32, aspect_ratio: f64) -> Self {
        self.image_width = image_width;
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Image height implied by width and aspect ratio, never less than one pixel.
    pub fn image_height(&self) -> u32 {
        ((f64::from(self.image_width) / self.aspect_ratio) as u32).max(1)
    }
}

/// Everything needed to run a render besides the scene itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    pub camera: CameraSettings,
    /// Edge length of a square tile in pixels
    pub tile_size: u32,
    /// Worker threads; 0 uses every available core
    pub threads: usize,
    /// Master seed for per-tile random generators
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            camera: CameraSettings::default()
                .with_resolution(600, 16.0 / 9.0)
                .with_quality(100, 10)
                .with_position(Point3::new(0.0, 3.0, 4.0), Point3::new(0.0, 0.5, 0.0), Vec3::Y)
                .with_lens(90.0, 0.0, 2.0),
            tile_size: DEFAULT_TILE_SIZE,
            threads: 0,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Build settings from a config file, falling back to defaults key by key.
    pub fn from_config(config: &ConfigFile) -> Self {
        for key in config.keys() {
            if let Some((_, canonical)) = KEY_ALIASES.iter().find(|(alias, _)| *alias == key) {
                log::debug!("Config key `{}` read as `{}`", key, canonical);
            } else if !KNOWN_KEYS.contains(&key) {
                log::warn!("Ignoring unknown config key `{}`", key);
            }
        }

        let defaults = Self::default();
        let cam = &defaults.camera;

        let camera = CameraSettings {
            aspect_ratio: config.get_with("aspect_ratio", cam.aspect_ratio, parse_aspect_ratio),
            image_width: config.get_with("image_width", cam.image_width, |raw| {
                raw.trim().parse().ok().filter(|w| *w > 0)
            }),
            samples_per_pixel: config.get_with("samples_per_pixel", cam.samples_per_pixel, |raw| {
                raw.trim().parse().ok().filter(|s| *s > 0)
            }),
            max_depth: config.get_or(resolve_key(config, "max_depth"), cam.max_depth),
            vfov: config.get_with("vfov", cam.vfov, |raw| {
                raw.trim().parse().ok().filter(|v: &f64| *v > 0.0 && *v < 180.0)
            }),
            look_from: config.get_or("look_from", cam.look_from),
            look_at: config.get_or("look_at", cam.look_at),
            vup: config.get_or("vup", cam.vup),
            defocus_angle: config.get_or(resolve_key(config, "defocus_angle"), cam.defocus_angle),
            focus_dist: config.get_with(resolve_key(config, "focus_dist"), cam.focus_dist, |raw| {
                raw.trim().parse().ok().filter(|d: &f64| *d > 0.0)
            }),
        };

        Self {
            camera,
            tile_size: config.get_with("tile_size", defaults.tile_size, |raw| {
                raw.trim().parse().ok().filter(|s| *s > 0)
            }),
            threads: config.get_or("threads", defaults.threads),
            seed: config.get_or("seed", defaults.seed),
        }
    }
}

/// Accepts `16:9`, `16/9` or a plain positive number.
fn parse_aspect_ratio(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let ratio = match raw.split_once(|c: char| c == ':' || c == '/') {
        Some((w, h)) => w.trim().parse::<f64>().ok()? / h.trim().parse::<f64>().ok()?,
        None => raw.parse::<f64>().ok()?,
    };
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}
