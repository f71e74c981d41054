//! End-to-end render of a small diffuse scene.

use std::sync::Arc;

use kiln_core::{CameraSettings, RenderSettings};
use kiln_renderer::{Color, HittableList, Material, Point3, Renderer, Scene, Sphere};

const SIZE: u32 = 100;
const ALBEDO: Color = Color::new(0.1, 0.2, 0.5);

fn diffuse_scene() -> Scene {
    let mut world = HittableList::new();
    world.add(Sphere::new(
        Point3::new(0.0, 0.0, -1.0),
        0.5,
        Arc::new(Material::lambertian(ALBEDO)),
    ));
    world.add(Sphere::new(
        Point3::new(0.0, -100.5, -1.0),
        100.0,
        Arc::new(Material::lambertian(Color::new(0.8, 0.8, 0.0))),
    ));
    Scene::new(world)
}

fn render() -> kiln_renderer::Framebuffer {
    let settings = RenderSettings {
        camera: CameraSettings::default()
            .with_resolution(SIZE, 1.0)
            .with_quality(1, 1),
        tile_size: 16,
        threads: 2,
        seed: 7,
    };
    Renderer::new(&settings).render(&diffuse_scene(), &()).unwrap()
}

#[test]
fn top_row_is_sky_gradient() {
    let image = render();

    for x in 0..SIZE {
        let c = image.get(x, 0);
        // Sky is lerp(white, (0.5, 0.7, 1.0), a) for some a in (0.5, 1)
        assert!((c.z - 1.0).abs() < 1e-9, "pixel {x}: {c}");
        assert!(c.x > 0.5 && c.x < 0.75, "pixel {x}: {c}");
        let a_from_red = (1.0 - c.x) / 0.5;
        let a_from_green = (1.0 - c.y) / 0.3;
        assert!((a_from_red - a_from_green).abs() < 1e-9, "pixel {x}: {c}");
    }
}

#[test]
fn sphere_silhouette_is_tinted() {
    let image = render();

    let mut silhouette = 0;
    let mut lit = 0;
    for y in 0..SIZE {
        for x in 0..SIZE {
            // Normalized screen position; the sphere covers a radius of ~0.58
            let sx = (f64::from(x) + 0.5) / f64::from(SIZE) * 2.0 - 1.0;
            let sy = (f64::from(y) + 0.5) / f64::from(SIZE) * 2.0 - 1.0;
            if sx * sx + sy * sy > 0.4 * 0.4 {
                continue;
            }
            silhouette += 1;

            let c = image.get(x, y);
            // One diffuse bounce off the sphere can never exceed its albedo
            assert!(c.x <= ALBEDO.x + 1e-12 && c.y <= ALBEDO.y + 1e-12 && c.z <= ALBEDO.z + 1e-12);
            if c.max_element() > 0.0 {
                assert!(c.x < c.z, "pixel ({x}, {y}) is not tinted: {c}");
                lit += 1;
            }
        }
    }

    assert!(silhouette > 0);
    assert!(lit * 4 >= silhouette, "only {lit} of {silhouette} silhouette pixels lit");
}
