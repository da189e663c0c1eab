//! Tessel Renderer - recursive CPU ray tracing over triangle meshes.
//!
//! The renderer works on a camera-space [`Scene`] snapshot built from a
//! [`tessel_core::SceneSource`]:
//!
//! - **Geometry**: [`Triangle`] with a cached planar basis, linear-scan
//!   nearest-hit queries on [`Scene`]
//! - **Shading**: Blinn-Phong [`SurfaceElement`]s, Schlick-weighted
//!   reflection and refraction, hard and soft shadows
//! - **Sampling**: Monte Carlo indirect lighting and anti-aliasing with
//!   per-row seeded generators
//! - **Driver**: rayon row-parallel [`render`] into a [`Framebuffer`], with
//!   cooperative cancellation
//!
//! # Example
//!
//! ```ignore
//! use tessel_core::{discover_lights, Placement};
//! use tessel_renderer::{render_scene, CancelToken, Framebuffer, RenderSettings};
//!
//! let lights = discover_lights(&source);
//! let settings = RenderSettings::default().with_shadows(true);
//! let mut framebuffer = Framebuffer::new(640, 480);
//! render_scene(&source, &Placement::default(), &lights, &settings, &mut framebuffer, &CancelToken::new())?;
//! framebuffer.to_image().save("out.png")?;
//! ```

pub mod camera;
pub mod cancel;
pub mod integrator;
pub mod optics;
pub mod renderer;
pub mod sampler;
pub mod scene;
pub mod settings;
pub mod surfel;
pub mod triangle;

pub use camera::{PixelCamera, Projection};
pub use cancel::{CancelSource, CancelToken};
pub use integrator::{Integrator, AIR_REFRACTIVE_INDEX, MAX_SHADOW_STEPS};
pub use optics::{reflect, refract, COLLISION_BIAS};
pub use renderer::{
    colour_to_rgba, render, render_pixel, render_scene, Framebuffer, RenderError, RenderOutcome, RenderResult,
};
pub use sampler::{gen_f32, random_monte_carlo_direction, row_rng};
pub use scene::{CollisionInfo, Scene, NO_INTERSECT};
pub use settings::{RenderSettings, SettingsError, SettingsResult};
pub use surfel::SurfaceElement;
pub use triangle::Triangle;

/// Re-export common math types from tessel_math
pub use tessel_math::{Ray, Vec3};
