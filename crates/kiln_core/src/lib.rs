//! Kiln core - everything the renderer consumes but does not compute.
//!
//! This crate provides:
//!
//! - **Configuration**: `key = value` files and the typed render settings read from them
//! - **Meshes**: triangle meshes imported from OBJ files
//! - **Images**: decoded texture images in linear color
//!
//! # Example
//!
//! ```ignore
//! use kiln_core::{ConfigFile, RenderSettings};
//!
//! let settings = match ConfigFile::load("kiln.ini") {
//!     Ok(config) => RenderSettings::from_config(&config),
//!     Err(_) => RenderSettings::default(),
//! };
//! ```

pub mod config;
pub mod mesh;
pub mod obj;
pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use config::{ConfigError, ConfigFile};
pub use mesh::Mesh;
pub use obj::{load_obj, parse_obj, ObjError};
pub use settings::{CameraSettings, RenderSettings, DEFAULT_TILE_SIZE};
pub use texture::{load_image, Image, TextureError};
