//! Pixel driver.
//!
//! Renders a frame row-parallel with rayon. Each row owns a disjoint slice of
//! the framebuffer and its own seeded generator, so a frame is reproducible
//! regardless of thread count or scheduling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

use image::{Rgba, RgbaImage};
use rand::RngCore;
use rayon::prelude::*;
use tessel_core::{Color, Light, Placement, SceneError, SceneSource};
use thiserror::Error;

use crate::camera::PixelCamera;
use crate::cancel::CancelToken;
use crate::integrator::{Integrator, AIR_REFRACTIVE_INDEX};
use crate::sampler::row_rng;
use crate::scene::Scene;
use crate::settings::{RenderSettings, SettingsError};

/// Errors that stop a render pass before it starts.
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Framebuffer has zero size ({width}x{height})")]
    EmptyFramebuffer { width: u32, height: u32 },

    #[error("Scene sync failed: {0}")]
    Scene(#[from] SceneError),

    #[error("Invalid render settings: {0}")]
    Settings(#[from] SettingsError),
}

pub type RenderResult<T> = Result<T, RenderError>;

/// How a pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    Complete,
    /// Superseded before every row was drawn. Undrawn rows keep their
    /// previous contents.
    Cancelled { rows_rendered: u32 },
}

/// RGBA8 pixel storage, row 0 at the bottom.
#[derive(Debug, Clone)]
pub struct Framebuffer {
    pub width: u32,
    pub height: u32,
    pixels: Vec<[u8; 4]>,
}

impl Framebuffer {
    /// Create a framebuffer filled with opaque black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0, 0, 0, 255]; (width as usize) * (height as usize)],
        }
    }

    pub fn get(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels[self.index(x, y)]
    }

    pub fn set(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let index = self.index(x, y);
        self.pixels[index] = rgba;
    }

    pub fn fill(&mut self, rgba: [u8; 4]) {
        self.pixels.fill(rgba);
    }

    /// Raw bytes, bottom row first.
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.pixels)
    }

    /// Top-down image for saving or display.
    pub fn to_image(&self) -> RgbaImage {
        RgbaImage::from_fn(self.width, self.height, |x, y| Rgba(self.get(x, self.height - 1 - y)))
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + x as usize
    }
}

/// Apply gamma correction and quantize to 8-bit RGBA.
pub fn colour_to_rgba(colour: Color, gamma: f32) -> [u8; 4] {
    let encode = |c: f32| (255.0 * c.max(0.0).powf(1.0 / gamma).clamp(0.0, 1.0)) as u8;
    [encode(colour.x), encode(colour.y), encode(colour.z), 255]
}

/// Colour of pixel `(i, j)`.
///
/// With Monte Carlo enabled the pixel averages jittered sub-pixel rays;
/// otherwise one ray goes through its centre.
pub fn render_pixel(
    integrator: &Integrator<'_>,
    camera: &PixelCamera,
    i: u32,
    j: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let settings = integrator.settings();

    if !settings.monte_carlo_enabled {
        let (px, py) = camera.pixel_centre(i, j);
        let ray = camera.ray_to_pixel(px, py);
        return integrator.raytrace_colour(&ray, AIR_REFRACTIVE_INDEX, settings.max_bounces, rng);
    }

    let samples = settings.anti_aliasing_samples.max(1);
    let mut colour = Color::ZERO;
    for _ in 0..samples {
        let (px, py) = camera.sampled_pixel(i, j, rng);
        let ray = camera.ray_to_pixel(px, py);
        colour += integrator.raytrace_colour(&ray, AIR_REFRACTIVE_INDEX, settings.max_bounces, rng);
    }

    colour / samples as f32
}

/// Render every row of `framebuffer` that is reached before `cancel` fires.
pub fn render(
    integrator: &Integrator<'_>,
    framebuffer: &mut Framebuffer,
    cancel: &CancelToken,
) -> RenderResult<RenderOutcome> {
    let (width, height) = (framebuffer.width, framebuffer.height);
    if width == 0 || height == 0 {
        return Err(RenderError::EmptyFramebuffer { width, height });
    }

    let settings = integrator.settings();
    settings.validate()?;

    let camera = PixelCamera::new(width, height).with_projection(settings.projection());
    log::info!(
        "Start raytracing {}x{} ({} triangles, {} lights, aspect ratio {:.3})",
        width,
        height,
        integrator.scene().len(),
        integrator.lights().len(),
        camera.aspect_ratio()
    );

    let start = Instant::now();
    let rows_rendered = AtomicU32::new(0);
    let progress_step = (height / 10).max(1);

    framebuffer
        .pixels
        .par_chunks_mut(width as usize)
        .enumerate()
        .for_each(|(j, row)| {
            if cancel.is_cancelled() {
                return;
            }

            let j = j as u32;
            let mut rng = row_rng(settings.seed, j);
            for (i, pixel) in row.iter_mut().enumerate() {
                let colour = render_pixel(integrator, &camera, i as u32, j, &mut rng);
                *pixel = colour_to_rgba(colour, settings.gamma);
            }

            let done = rows_rendered.fetch_add(1, Ordering::Relaxed) + 1;
            if done % progress_step == 0 {
                log::debug!("Rendered {done}/{height} rows");
            }
        });

    let rows_rendered = rows_rendered.into_inner();
    if rows_rendered < height {
        log::info!("Raytracing cancelled after {rows_rendered}/{height} rows");
        return Ok(RenderOutcome::Cancelled { rows_rendered });
    }

    log::info!("Done raytracing in {:.2?}", start.elapsed());
    Ok(RenderOutcome::Complete)
}

/// Sync the scene to `placement` and render it.
///
/// `lights` are in model space, as returned by
/// [`discover_lights`](tessel_core::discover_lights).
pub fn render_scene(
    source: &SceneSource,
    placement: &Placement,
    lights: &[Light],
    settings: &RenderSettings,
    framebuffer: &mut Framebuffer,
    cancel: &CancelToken,
) -> RenderResult<RenderOutcome> {
    let model_view = placement.model_view();
    let scene = Scene::build(source, model_view)?;
    let integrator = Integrator::new(&scene, &source.materials, lights, &model_view, settings);

    render(&integrator, framebuffer, cancel)
}
