//! `kiln` - render a built-in scene to a PPM image.

mod progress;
mod scenes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use kiln_core::{load_image, load_obj, ConfigFile, RenderSettings};
use kiln_renderer::{Renderer, TileGrid};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::progress::TileProgress;
use crate::scenes::{SceneAssets, SceneKind};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Key/value config file; missing or invalid files fall back to defaults
    #[arg(short, long, default_value = "kiln.ini")]
    config: PathBuf,

    /// Output PPM file
    #[arg(short, long, default_value = "image.ppm")]
    output: PathBuf,

    /// Built-in scene to render
    #[arg(long, value_enum, default_value_t = SceneKind::Showcase)]
    scene: SceneKind,

    /// Image width in pixels
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    width: Option<u32>,

    /// Samples per pixel
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
    samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(short, long)]
    depth: Option<u32>,

    /// Worker threads (0 = all cores)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Master random seed
    #[arg(long)]
    seed: Option<u64>,

    /// Tile edge length in pixels
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    tile_size: Option<u32>,

    /// OBJ mesh to place in the showcase scene
    #[arg(long)]
    mesh: Option<PathBuf>,

    /// Image to wrap around an extra sphere in the showcase scene
    #[arg(long)]
    texture: Option<PathBuf>,

    /// Print the effective settings as JSON and exit
    #[arg(long)]
    print_settings: bool,

    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn settings(&self) -> RenderSettings {
        let mut settings = match ConfigFile::load(&self.config) {
            Ok(config) => RenderSettings::from_config(&config),
            Err(e) => {
                log::warn!("{e}; using default settings");
                RenderSettings::default()
            }
        };

        if let Some(width) = self.width {
            settings.camera.image_width = width;
        }
        if let Some(samples) = self.samples {
            settings.camera.samples_per_pixel = samples;
        }
        if let Some(depth) = self.depth {
            settings.camera.max_depth = depth;
        }
        if let Some(threads) = self.threads {
            settings.threads = threads;
        }
        if let Some(seed) = self.seed {
            settings.seed = seed;
        }
        if let Some(tile_size) = self.tile_size {
            settings.tile_size = tile_size;
        }
        settings
    }

    fn assets(&self) -> Result<SceneAssets> {
        let mesh = self
            .mesh
            .as_ref()
            .map(|path| load_obj(path).with_context(|| format!("Failed to load mesh {}", path.display())))
            .transpose()?;
        let texture = self
            .texture
            .as_ref()
            .map(|path| {
                load_image(path)
                    .map(Arc::new)
                    .with_context(|| format!("Failed to load texture {}", path.display()))
            })
            .transpose()?;

        if self.scene != SceneKind::Showcase && (mesh.is_some() || texture.is_some()) {
            log::warn!("--mesh and --texture only apply to the showcase scene");
        }
        Ok(SceneAssets { mesh, texture })
    }
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();
    let settings = args.settings();

    if args.print_settings {
        println!("{}", serde_json::to_string_pretty(&settings)?);
        return Ok(());
    }

    log::info!("Starting Kiln");
    let assets = args.assets()?;
    let mut scene_rng = StdRng::seed_from_u64(settings.seed);
    let scene = scenes::build(args.scene, &assets, &mut scene_rng);

    let renderer = Renderer::new(&settings);
    let camera = renderer.camera();
    let tiles = TileGrid::new(camera.image_width(), camera.image_height(), settings.tile_size).len();
    let progress = if args.quiet {
        TileProgress::hidden(tiles)
    } else {
        TileProgress::new(tiles)
    };

    let image = renderer.render(&scene, &progress).context("Render failed")?;
    progress.finish();

    image
        .save_ppm(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::io::Write;

    #[test]
    fn test_args_are_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_flags_override_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "image_width = 320\nsamples_per_pixel = 8\nseed = 3").unwrap();
        let config = file.path().to_str().unwrap().to_string();

        let args = Args::parse_from(["kiln", "--config", config.as_str(), "--samples", "2", "-j", "1"]);
        let settings = args.settings();
        assert_eq!(settings.camera.image_width, 320);
        assert_eq!(settings.camera.samples_per_pixel, 2);
        assert_eq!(settings.threads, 1);
        assert_eq!(settings.seed, 3);
    }

    #[test]
    fn test_missing_config_uses_defaults() {
        let args = Args::parse_from(["kiln", "--config", "no/such/kiln.ini", "--scene", "simple"]);
        assert_eq!(args.scene, SceneKind::Simple);
        assert_eq!(args.settings(), RenderSettings::default());
    }

    #[test]
    fn test_zero_width_rejected() {
        assert!(Args::try_parse_from(["kiln", "--width", "0"]).is_err());
    }

    #[test]
    fn test_missing_mesh_is_an_error() {
        let args = Args::parse_from(["kiln", "--mesh", "no/such/teapot.obj"]);
        let err = args.assets().unwrap_err();
        assert!(format!("{err:#}").contains("teapot.obj"));
    }
}
