//! Recursive light transport.
//!
//! [`Integrator::trace_colour`] follows a ray through mirror and dielectric
//! surfaces, splitting it into reflected and refracted branches, until it
//! lands on a Phong surface or runs out of bounces. Primary rays collect the
//! full surface colour there; secondary rays only collect direct lighting.

use std::f32::consts::PI;

use rand::RngCore;
use tessel_core::{Color, Light, MaterialStore};
use tessel_math::{Mat4, Ray, Vec3};

use crate::optics::{reflect, refract, COLLISION_BIAS};
use crate::sampler::random_monte_carlo_direction;
use crate::scene::Scene;
use crate::settings::RenderSettings;
use crate::surfel::SurfaceElement;

/// Refractive index of the medium camera rays start in.
pub const AIR_REFRACTIVE_INDEX: f32 = 1.0003;

/// Upper bound on the refraction segments followed by one shadow ray.
pub const MAX_SHADOW_STEPS: usize = 32;

/// Colour evaluation over a read-only scene snapshot.
pub struct Integrator<'a> {
    scene: &'a Scene,
    materials: &'a MaterialStore,
    lights: Vec<Light>,
    settings: &'a RenderSettings,
}

impl<'a> Integrator<'a> {
    /// `lights` are given in model space and moved into camera space with
    /// `model_view`, the same transform the scene was built with.
    pub fn new(
        scene: &'a Scene,
        materials: &'a MaterialStore,
        lights: &[Light],
        model_view: &Mat4,
        settings: &'a RenderSettings,
    ) -> Self {
        let lights = lights
            .iter()
            .map(|light| light.to_camera_space(model_view))
            .collect();

        Self {
            scene,
            materials,
            lights,
            settings,
        }
    }

    pub fn settings(&self) -> &RenderSettings {
        self.settings
    }

    pub fn scene(&self) -> &Scene {
        self.scene
    }

    /// Camera-space lights.
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// Colour of a camera ray, with every contribution.
    pub fn raytrace_colour(&self, ray: &Ray, medium_ior: f32, bounces: u32, rng: &mut dyn RngCore) -> Color {
        self.trace_colour(ray, medium_ior, bounces, true, rng)
    }

    /// Colour of a secondary ray, direct lighting only.
    pub fn pathtrace_colour(&self, ray: &Ray, medium_ior: f32, bounces: u32, rng: &mut dyn RngCore) -> Color {
        self.trace_colour(ray, medium_ior, bounces, false, rng)
    }

    /// Colour seen along `ray` travelling through a medium of index
    /// `medium_ior`, with at most `bounces` surface interactions.
    pub fn trace_colour(
        &self,
        ray: &Ray,
        medium_ior: f32,
        bounces: u32,
        is_primary: bool,
        rng: &mut dyn RngCore,
    ) -> Color {
        if bounces == 0 {
            return Color::ZERO;
        }

        let Some(surfel) = self.surfel_along(ray) else {
            return Color::ZERO;
        };

        if self.settings.interpolation_debug {
            return surfel.normal.abs();
        }

        if !surfel.is_phong() {
            let reflectivity = self.reflectance(ray, &surfel, medium_ior);
            let refractivity = 1.0 - reflectivity;
            let mut colour = Color::ZERO;

            if reflectivity > 0.0 {
                let reflected = reflect(ray, &surfel);
                colour += reflectivity * self.trace_colour(&reflected, medium_ior, bounces - 1, is_primary, rng);
            }

            if refractivity > 0.0 {
                let refracted = refract(ray, medium_ior, &surfel);
                let inner_ior = surfel.index_of_refraction();
                colour += refractivity * self.trace_colour(&refracted, inner_ior, bounces - 1, is_primary, rng);
            }

            return colour;
        }

        if !is_primary {
            return self.direct_lighting_colour(&surfel, ray.origin, rng);
        }

        self.surface_colour(&surfel, ray.origin, rng)
    }

    /// Weight of the reflected branch at a non-Phong surface, in [0, 1].
    ///
    /// With Fresnel rendering this is Schlick's approximation. Otherwise it is
    /// the material's reflectivity for transparent surfaces, and 1 for opaque
    /// mirrors.
    pub fn reflectance(&self, ray: &Ray, surfel: &SurfaceElement<'_>, medium_ior: f32) -> f32 {
        if self.settings.fresnel_rendering {
            return surfel.schlick(ray, medium_ior);
        }

        if surfel.material.transparency > 0.0 {
            surfel.material.reflectivity
        } else {
            1.0
        }
    }

    /// Direct, emissive and indirect lighting at a Phong surface, clamped to [0, 1].
    pub fn surface_colour(&self, surfel: &SurfaceElement<'_>, eye: Vec3, rng: &mut dyn RngCore) -> Color {
        let mut colour = self.direct_lighting_colour(surfel, eye, rng);
        colour += surfel.emissive();

        if self.settings.monte_carlo_enabled {
            colour += self.indirect_estimate(surfel, rng);
        } else {
            colour += surfel.indirect_lighting();
        }

        colour.clamp(Color::ZERO, Color::ONE)
    }

    /// Monte Carlo estimate of light arriving from other surfaces.
    fn indirect_estimate(&self, surfel: &SurfaceElement<'_>, rng: &mut dyn RngCore) -> Color {
        let samples = self.settings.monte_carlo_samples;
        if samples == 0 {
            return Color::ZERO;
        }

        let origin = surfel.point + COLLISION_BIAS * surfel.normal;
        let mut indirect = Color::ZERO;

        for _ in 0..samples {
            let direction = random_monte_carlo_direction(surfel.normal, rng);
            let ray = Ray::new(origin, direction);
            indirect += self.pathtrace_colour(&ray, surfel.index_of_refraction(), self.settings.max_bounces, rng);
        }

        let distribution = samples as f32 / 2.0 * PI;
        indirect / distribution
    }

    /// Blinn-Phong contribution of every enabled light, shadowed when
    /// shadows are on, clamped to [0, 1].
    pub fn direct_lighting_colour(&self, surfel: &SurfaceElement<'_>, eye: Vec3, rng: &mut dyn RngCore) -> Color {
        // Shadow rays start just off the surface to avoid acne
        let biased_point = surfel.point + COLLISION_BIAS * surfel.normal;
        let mut colour = Color::ZERO;

        for light in self.lights.iter().filter(|light| light.enabled) {
            let mut direct = surfel.direct_lighting(light.position, light.color, eye);

            if self.settings.shadows_enabled {
                direct *= self.shadow_modulation(biased_point, light, rng);
            }

            colour += direct;
        }

        colour.clamp(Color::ZERO, Color::ONE)
    }

    /// Fraction of `light` visible from `point`.
    ///
    /// Soft shadows average binary tests against jittered positions on the
    /// light; hard shadows test its nominal position once.
    pub fn shadow_modulation(&self, point: Vec3, light: &Light, rng: &mut dyn RngCore) -> f32 {
        if !self.settings.area_lights_enabled {
            return if self.is_shadow_hit(light.position, point) { 0.0 } else { 1.0 };
        }

        let samples = self.settings.soft_shadow_samples.max(1);
        let hits = (0..samples)
            .filter(|_| self.is_shadow_hit(light.sampled_position(rng), point))
            .count();

        1.0 - hits as f32 / samples as f32
    }

    /// Whether `point` is shadowed from `light_position`.
    ///
    /// The shadow ray refracts through transmissive surfaces. It is blocked
    /// only by a Phong surface that is not itself a light. Opaque mirrors and
    /// walks longer than [`MAX_SHADOW_STEPS`] leave the point lit.
    pub fn is_shadow_hit(&self, light_position: Vec3, point: Vec3) -> bool {
        let mut ray = Ray::new(point, (light_position - point).normalize_or_zero());
        let mut medium_ior = AIR_REFRACTIVE_INDEX;

        for _ in 0..MAX_SHADOW_STEPS {
            let collision = self.scene.closest_triangle(&ray);
            if !collision.is_shadow_hit(self.materials) {
                return false;
            }
            let Some(triangle) = collision.hit() else {
                return false;
            };

            let surfel = SurfaceElement::from_hit(triangle, ray.at(collision.t), self.materials);
            if surfel.is_phong() {
                return true;
            }

            let refractivity = 1.0 - self.reflectance(&ray, &surfel, medium_ior);
            if refractivity <= 0.0 {
                return false;
            }

            ray = refract(&ray, medium_ior, &surfel);
            medium_ior = surfel.index_of_refraction();
        }

        log::trace!("Shadow walk from {point:?} did not settle");
        false
    }

    fn surfel_along(&self, ray: &Ray) -> Option<SurfaceElement<'a>> {
        let collision = self.scene.closest_triangle(ray);
        let triangle = collision.hit()?;
        Some(SurfaceElement::from_hit(triangle, ray.at(collision.t), self.materials))
    }
}
