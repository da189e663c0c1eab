//! Per-pixel camera rays.

use rand::RngCore;
use tessel_math::{Ray, Vec3};

use crate::sampler::gen_f32;

/// How pixel rays leave the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Projection {
    /// Rays fan out from the origin through the `z = -1` image plane.
    #[default]
    Perspective,
    /// Parallel rays along `-Z` from the `z = 0` plane.
    Orthographic,
}

/// Generates camera-space rays for pixel coordinates.
///
/// Pixel coordinates grow right and up, `(0, 0)` is the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelCamera {
    pub width: u32,
    pub height: u32,
    pub projection: Projection,
}

impl PixelCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            projection: Projection::Perspective,
        }
    }

    /// Set projection mode.
    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Ray through the (possibly fractional) pixel position `(px, py)`.
    ///
    /// The wider image axis is stretched by the aspect ratio so the shorter
    /// one spans `[-1, 1]`.
    pub fn ray_to_pixel(&self, px: f32, py: f32) -> Ray {
        let x_ndc = (px / self.width.max(1) as f32 - 0.5) * 2.0;
        let y_ndc = (py / self.height.max(1) as f32 - 0.5) * 2.0;

        let aspect = self.aspect_ratio();
        let (x, y) = if aspect > 1.0 {
            (x_ndc * aspect, y_ndc)
        } else {
            (x_ndc, y_ndc / aspect)
        };

        let ray = match self.projection {
            Projection::Orthographic => Ray::new(Vec3::new(x, y, 0.0), Vec3::NEG_Z),
            Projection::Perspective => Ray::new(Vec3::ZERO, Vec3::new(x, y, -1.0).normalize()),
        };

        if self.is_corner(px, py) {
            log::trace!(
                "Ray to pixel ({px}, {py}): origin {:?}, direction {:?}",
                ray.origin,
                ray.direction
            );
        }

        ray
    }

    /// Centre of pixel `(i, j)`.
    pub fn pixel_centre(&self, i: u32, j: u32) -> (f32, f32) {
        (i as f32 + 0.5, j as f32 + 0.5)
    }

    /// Jittered position within half a pixel of `(i, j)`, kept inside the image.
    pub fn sampled_pixel(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> (f32, f32) {
        let di = gen_f32(rng) - 0.5;
        let dj = gen_f32(rng) - 0.5;

        (
            (i as f32 + di).clamp(0.0, self.width as f32),
            (j as f32 + dj).clamp(0.0, self.height as f32),
        )
    }

    fn is_corner(&self, px: f32, py: f32) -> bool {
        let last_x = self.width.saturating_sub(1) as f32;
        let last_y = self.height.saturating_sub(1) as f32;
        let on_x_edge = px == 0.0 || px == last_x;
        let on_y_edge = py == 0.0 || py == last_y;
        on_x_edge && on_y_edge
    }
}
