//! Built-in scenes.

use std::sync::Arc;

use clap::ValueEnum;
use kiln_core::{Image, Mesh};
use kiln_math::{Color, Point3, Vec3};
use kiln_renderer::{
    Checker, HittableList, ImageTexture, Material, Plane, Scene, Sphere, TriangleMesh,
};
use rand::{Rng, RngCore};

/// Which built-in scene to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Ground sphere covered in small random spheres, plus three large ones
    Random,
    /// Checkered plane with textured, mirror and glass spheres
    Showcase,
    /// A single diffuse sphere resting on a large ground sphere
    Simple,
}

/// Optional assets for the showcase scene.
#[derive(Debug, Default)]
pub struct SceneAssets {
    pub mesh: Option<Mesh>,
    pub texture: Option<Arc<Image>>,
}

/// Half the side length of the grid of small spheres in the random scene.
const RANDOM_GRID: i32 = 10;

pub fn build(kind: SceneKind, assets: &SceneAssets, rng: &mut dyn RngCore) -> Scene {
    let scene = match kind {
        SceneKind::Random => random_scene(rng),
        SceneKind::Showcase => showcase_scene(assets),
        SceneKind::Simple => simple_scene(),
    };
    log::info!(
        "Built {:?} scene: {} objects, {} lights",
        kind,
        scene.world.len(),
        scene.lights.len()
    );
    scene
}

fn random_color(rng: &mut dyn RngCore, min: f64, max: f64) -> Color {
    Color::new(
        rng.gen_range(min..max),
        rng.gen_range(min..max),
        rng.gen_range(min..max),
    )
}

pub fn random_scene(rng: &mut dyn RngCore) -> Scene {
    let mut world = HittableList::new();

    let ground = Arc::new(Material::lambertian(Color::splat(0.5)));
    world.add(Sphere::new(Point3::new(0.0, -1000.0, 0.0), 1000.0, ground));

    let glass = Arc::new(Material::dielectric(1.5));
    for a in -RANDOM_GRID..RANDOM_GRID {
        for b in -RANDOM_GRID..RANDOM_GRID {
            let choose_mat: f64 = rng.gen();
            let center = Point3::new(
                f64::from(a) + 0.9 * rng.gen::<f64>(),
                0.2,
                f64::from(b) + 0.9 * rng.gen::<f64>(),
            );

            // Keep clear of the large metal sphere
            if (center - Point3::new(4.0, 0.2, 0.0)).length() <= 0.9 {
                continue;
            }

            let material = if choose_mat < 0.8 {
                let albedo = random_color(rng, 0.0, 1.0) * random_color(rng, 0.0, 1.0);
                Arc::new(Material::lambertian(albedo))
            } else if choose_mat < 0.95 {
                let albedo = random_color(rng, 0.5, 1.0);
                Arc::new(Material::metal(albedo, rng.gen_range(0.0..0.5)))
            } else {
                Arc::clone(&glass)
            };
            world.add(Sphere::new(center, 0.2, material));
        }
    }

    world.add(Sphere::new(Point3::new(0.0, 1.0, 0.0), 1.0, glass));
    world.add(Sphere::new(
        Point3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::lambertian(Color::new(0.4, 0.2, 0.1))),
    ));
    world.add(Sphere::new(
        Point3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Material::metal(Color::new(0.7, 0.6, 0.5), 0.0)),
    ));

    Scene::new(world)
}

pub fn showcase_scene(assets: &SceneAssets) -> Scene {
    let mut world = HittableList::new();

    let green = Color::new(6.0, 250.0, 6.0) / 255.0;
    let red = Color::new(250.0, 6.0, 6.0) / 255.0;
    let ground = Arc::new(Material::textured(Arc::new(Checker::new(green, 2, 2))));
    let checkered = Arc::new(Material::textured(Arc::new(Checker::new(red, 12, 12))));

    world.add(Plane::new(Point3::new(0.0, -1.0, 0.0), Vec3::Y, ground));
    world.add(Sphere::new(Point3::new(0.0, 0.0, -1.0), 0.5, checkered));
    world.add(Sphere::new(
        Point3::new(-1.0, 0.0, -1.0),
        0.5,
        Arc::new(Material::metal(Color::splat(0.8), 0.0)),
    ));
    world.add(Sphere::new(
        Point3::new(1.0, 0.0, -1.0),
        0.5,
        Arc::new(Material::dielectric(1.5)),
    ));

    if let Some(mesh) = &assets.mesh {
        let material = Arc::new(Material::metal(Color::new(0.8, 0.6, 0.2), 0.5));
        world.add(TriangleMesh::from_mesh(mesh, Point3::new(0.0, 0.0, -5.0), material));
    }

    if let Some(image) = &assets.texture {
        let material = Arc::new(Material::textured(Arc::new(ImageTexture::new(Arc::clone(image)))));
        world.add(Sphere::new(Point3::new(0.0, 0.0, 1.0), 0.5, material));
    }

    Scene::new(world).with_light(Point3::new(0.0, 5.0, 2.0))
}

pub fn simple_scene() -> Scene {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Point3::new(0.0, 0.0, -1.0),
        0.5,
        Arc::new(Material::lambertian(Color::new(0.1, 0.2, 0.5))),
    ));
    world.add(Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        Arc::new(Material::lambertian(Color::new(0.8, 0.8, 0.0))),
    ));
    Scene::new(world)
}
