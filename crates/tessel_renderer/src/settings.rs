//! Render configuration.
//!
//! Settings are read-only for the duration of a pass. They can be built in
//! code with the `with_*` helpers or loaded from JSON, where missing fields
//! take their defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::camera::Projection;

/// Errors from loading or validating [`RenderSettings`].
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{field} must be at least 1")]
    ZeroSamples { field: &'static str },

    #[error("gamma must be positive, got {0}")]
    InvalidGamma(f32),
}

pub type SettingsResult<T> = Result<T, SettingsError>;

/// Render-mode flags and sampling tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSettings {
    /// Show `|normal|` as colour instead of shading
    pub interpolation_debug: bool,
    pub shadows_enabled: bool,
    /// Weight dielectric branches with Schlick's approximation
    pub fresnel_rendering: bool,
    /// Stochastic indirect lighting and anti-aliasing
    pub monte_carlo_enabled: bool,
    /// Soft shadows from jittered area-light positions
    pub area_lights_enabled: bool,
    pub ortho_projection: bool,

    pub max_bounces: u32,
    pub monte_carlo_samples: u32,
    pub anti_aliasing_samples: u32,
    pub soft_shadow_samples: u32,
    pub gamma: f32,
    /// Base seed for the per-row generators
    pub seed: u64,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            interpolation_debug: false,
            shadows_enabled: false,
            fresnel_rendering: false,
            monte_carlo_enabled: false,
            area_lights_enabled: false,
            ortho_projection: false,
            max_bounces: 5,
            monte_carlo_samples: 4,
            anti_aliasing_samples: 10,
            soft_shadow_samples: 20,
            gamma: 2.2,
            seed: 0,
        }
    }
}

impl RenderSettings {
    /// Parse and validate settings from JSON.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject sample counts of zero and non-positive gamma.
    ///
    /// `max_bounces` may be zero, which renders black.
    pub fn validate(&self) -> SettingsResult<()> {
        let counts = [
            ("monte_carlo_samples", self.monte_carlo_samples),
            ("anti_aliasing_samples", self.anti_aliasing_samples),
            ("soft_shadow_samples", self.soft_shadow_samples),
        ];
        if let Some(&(field, _)) = counts.iter().find(|(_, count)| *count == 0) {
            return Err(SettingsError::ZeroSamples { field });
        }

        if self.gamma.is_nan() || self.gamma <= 0.0 {
            return Err(SettingsError::InvalidGamma(self.gamma));
        }

        Ok(())
    }

    pub fn projection(&self) -> Projection {
        if self.ortho_projection {
            Projection::Orthographic
        } else {
            Projection::Perspective
        }
    }

    pub fn with_interpolation_debug(mut self, enabled: bool) -> Self {
        self.interpolation_debug = enabled;
        self
    }

    pub fn with_shadows(mut self, enabled: bool) -> Self {
        self.shadows_enabled = enabled;
        self
    }

    pub fn with_fresnel(mut self, enabled: bool) -> Self {
        self.fresnel_rendering = enabled;
        self
    }

    pub fn with_monte_carlo(mut self, enabled: bool) -> Self {
        self.monte_carlo_enabled = enabled;
        self
    }

    pub fn with_area_lights(mut self, enabled: bool) -> Self {
        self.area_lights_enabled = enabled;
        self
    }

    pub fn with_ortho_projection(mut self, enabled: bool) -> Self {
        self.ortho_projection = enabled;
        self
    }

    /// Set sample counts and bounce budget.
    pub fn with_quality(
        mut self,
        max_bounces: u32,
        monte_carlo_samples: u32,
        anti_aliasing_samples: u32,
        soft_shadow_samples: u32,
    ) -> Self {
        self.max_bounces = max_bounces;
        self.monte_carlo_samples = monte_carlo_samples;
        self.anti_aliasing_samples = anti_aliasing_samples;
        self.soft_shadow_samples = soft_shadow_samples;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}
