//! Wavefront OBJ import.
//!
//! Only geometry is read: vertex positions and faces. Polygons are fan
//! triangulated, every object and group in the file is merged into a single
//! [`Mesh`], and material libraries are not loaded.

use std::io::BufReader;
use std::path::{Path, PathBuf};

use kiln_math::Point3;
use thiserror::Error;

use crate::mesh::Mesh;

/// Errors that can occur while importing an OBJ file.
#[derive(Error, Debug)]
pub enum ObjError {
    #[error("Failed to load OBJ file {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: tobj::LoadError,
    },

    #[error("OBJ data contains no faces")]
    NoGeometry,
}

/// Result type for OBJ import.
pub type ObjResult<T> = Result<T, ObjError>;

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        ignore_points: true,
        ignore_lines: true,
        ..Default::default()
    }
}

/// Load an OBJ file into a single mesh.
pub fn load_obj(path: impl AsRef<Path>) -> ObjResult<Mesh> {
    let path = path.as_ref();
    let (models, _materials) =
        tobj::load_obj(path, &load_options()).map_err(|source| ObjError::Load {
            path: path.to_path_buf(),
            source,
        })?;

    let mesh = merge_models(&models)?;
    log::info!(
        "Loaded {} ({} models, {} vertices, {} triangles)",
        path.display(),
        models.len(),
        mesh.vertex_count(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Parse OBJ text held in memory.
pub fn parse_obj(content: &str) -> ObjResult<Mesh> {
    let mut reader = BufReader::new(content.as_bytes());
    let (models, _materials) =
        tobj::load_obj_buf(&mut reader, &load_options(), |_| {
            Err(tobj::LoadError::OpenFileFailed)
        })
        .map_err(|source| ObjError::Load {
            path: PathBuf::from("<memory>"),
            source,
        })?;

    merge_models(&models)
}

fn merge_models(models: &[tobj::Model]) -> ObjResult<Mesh> {
    let mut mesh = Mesh::default();

    for model in models {
        let positions = model
            .mesh
            .positions
            .chunks_exact(3)
            .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
            .collect();
        let part = Mesh::new(positions, model.mesh.indices.clone());

        log::debug!(
            "OBJ model `{}`: {} vertices, {} triangles",
            model.name,
            part.vertex_count(),
            part.triangle_count()
        );
        mesh.append(&part);
    }

    if mesh.is_empty() {
        return Err(ObjError::NoGeometry);
    }
    Ok(mesh)
}
