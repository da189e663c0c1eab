//! Cornell box example.
//!
//! Builds a small box scene with a glass pane and a mirror, renders it and
//! saves a PNG.
//!
//! Usage: `cornell_box [settings.json] [output.png]`

use anyhow::{Context, Result};
use tessel_core::{discover_lights, Color, Material, MaterialId, Mesh, Placement, SceneSource};
use tessel_renderer::{render_scene, CancelToken, Framebuffer, RenderOutcome, RenderSettings, Vec3};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            RenderSettings::from_json(&json)?
        }
        None => RenderSettings::default()
            .with_shadows(true)
            .with_fresnel(true)
            .with_area_lights(true),
    };
    let output = args.next().unwrap_or_else(|| "cornell_box.png".to_string());

    let source = build_scene();
    let lights = discover_lights(&source);
    log::info!(
        "Scene has {} meshes, {} triangles",
        source.meshes.len(),
        source.total_triangle_count()
    );

    let mut framebuffer = Framebuffer::new(WIDTH, HEIGHT);
    let outcome = render_scene(
        &source,
        &Placement::default(),
        &lights,
        &settings,
        &mut framebuffer,
        &CancelToken::new(),
    )?;
    if outcome != RenderOutcome::Complete {
        log::warn!("Render ended early: {outcome:?}");
    }

    framebuffer
        .to_image()
        .save(&output)
        .with_context(|| format!("saving {output}"))?;
    log::info!("Saved to {output}");

    Ok(())
}

fn quad(name: &str, corners: [Vec3; 4], material: MaterialId) -> Mesh {
    Mesh::from_polygons(name, corners.to_vec(), &[vec![0, 1, 2, 3]]).with_material(material)
}

fn build_scene() -> SceneSource {
    let mut source = SceneSource::new();
    let materials = &mut source.materials;

    let white = materials.add(
        Material::new("white")
            .with_ambient(Color::splat(0.05))
            .with_diffuse(Color::splat(0.75))
            .with_specular(Color::splat(0.1), 20.0),
    );
    let red = materials.add(
        Material::new("red")
            .with_ambient(Color::new(0.05, 0.0, 0.0))
            .with_diffuse(Color::new(0.75, 0.1, 0.1)),
    );
    let green = materials.add(
        Material::new("green")
            .with_ambient(Color::new(0.0, 0.05, 0.0))
            .with_diffuse(Color::new(0.1, 0.75, 0.1)),
    );
    let lamp = materials.add(Material::new("ceiling_light").with_emissive(Color::ONE));
    let glass = materials.add(Material::new("glass").with_optics(0.1, 0.9, 1.5));
    let mirror = materials.add(Material::new("mirror").with_optics(1.0, 0.0, 1.0));

    // Open box: x, y in [-1, 1], z in [-3, 0], every face facing inward
    let v = Vec3::new;
    source.add_mesh(quad(
        "floor",
        [v(-1.0, -1.0, 0.0), v(1.0, -1.0, 0.0), v(1.0, -1.0, -3.0), v(-1.0, -1.0, -3.0)],
        white,
    ));
    source.add_mesh(quad(
        "ceiling",
        [v(-1.0, 1.0, -3.0), v(1.0, 1.0, -3.0), v(1.0, 1.0, 0.0), v(-1.0, 1.0, 0.0)],
        white,
    ));
    source.add_mesh(quad(
        "back",
        [v(-1.0, -1.0, -3.0), v(1.0, -1.0, -3.0), v(1.0, 1.0, -3.0), v(-1.0, 1.0, -3.0)],
        white,
    ));
    source.add_mesh(quad(
        "left",
        [v(-1.0, -1.0, 0.0), v(-1.0, -1.0, -3.0), v(-1.0, 1.0, -3.0), v(-1.0, 1.0, 0.0)],
        red,
    ));
    source.add_mesh(quad(
        "right",
        [v(1.0, -1.0, -3.0), v(1.0, -1.0, 0.0), v(1.0, 1.0, 0.0), v(1.0, 1.0, -3.0)],
        green,
    ));

    source.add_mesh(quad(
        "lamp",
        [v(-0.3, 0.99, -1.8), v(0.3, 0.99, -1.8), v(0.3, 0.99, -1.2), v(-0.3, 0.99, -1.2)],
        lamp,
    ));
    source.add_mesh(quad(
        "pane",
        [v(0.2, -1.0, -1.5), v(0.8, -1.0, -1.5), v(0.8, 0.0, -1.5), v(0.2, 0.0, -1.5)],
        glass,
    ));
    source.add_mesh(quad(
        "mirror",
        [v(-0.98, -0.5, -1.5), v(-0.98, -0.5, -2.5), v(-0.98, 0.5, -2.5), v(-0.98, 0.5, -1.5)],
        mirror,
    ));

    source
}
