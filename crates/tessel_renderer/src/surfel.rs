//! Shading points.
//!
//! A [`SurfaceElement`] bundles a hit triangle, its material, the hit point
//! and the interpolated shading normal. It lives for one trace step.

use tessel_core::{Color, Material, MaterialStore};
use tessel_math::{is_greater_equal, Ray, Vec2, Vec3, EPS};

use crate::triangle::Triangle;

/// A shading point on a triangle.
#[derive(Debug, Clone, Copy)]
pub struct SurfaceElement<'a> {
    pub triangle: &'a Triangle,
    pub material: &'a Material,
    pub point: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl<'a> SurfaceElement<'a> {
    /// Barycentric interpolation of the triangle's attributes at `point`.
    pub fn from_hit(triangle: &'a Triangle, point: Vec3, materials: &'a MaterialStore) -> Self {
        let weights = triangle.barycentric_coordinates(point);

        Self {
            triangle,
            material: materials.resolve(triangle.material()),
            point,
            normal: triangle.weighted_normal(weights),
            uv: triangle.weighted_uv(weights),
        }
    }

    /// Blinn-Phong contribution of one light seen from `eye`.
    ///
    /// Surfaces facing away from the light get nothing. Attenuation is
    /// `1 / (1 + d^2)` with `d` the distance to the light.
    pub fn direct_lighting(&self, light_position: Vec3, light_color: Color, eye: Vec3) -> Color {
        let vl = light_position - self.point;

        if !is_greater_equal(self.normal.dot(vl), 0.0) {
            return Color::ZERO;
        }

        let distance = vl.length();
        let attenuation = 1.0 / (1.0 + distance * distance);

        // Half vector; no need to halve it since it is normalised
        let ve = eye - self.point;
        let vb = vl + ve;
        let cos_specular = self.normal.dot(vb.normalize_or_zero()).max(0.0);
        let specular = cos_specular.powf(self.material.shininess) * self.material.specular * light_color;

        let cos_diffuse = self.normal.dot(vl.normalize_or_zero()).max(0.0);
        let diffuse = cos_diffuse * self.material.diffuse * light_color;

        (diffuse + specular) * attenuation
    }

    /// Light emitted by the surface itself.
    pub fn emissive(&self) -> Color {
        self.material.emissive
    }

    /// Constant ambient term, used when stochastic indirect lighting is off.
    pub fn indirect_lighting(&self) -> Color {
        self.material.ambient
    }

    /// Texture color at the interpolated texture coordinates.
    pub fn texel(&self) -> Option<Color> {
        self.material.texture.as_ref().map(|texture| texture.sample(self.uv))
    }

    /// Whether the surface is shaded directly rather than reflecting or refracting.
    pub fn is_phong(&self) -> bool {
        self.material.is_phong()
    }

    pub fn is_light(&self) -> bool {
        self.material.is_light()
    }

    pub fn index_of_refraction(&self) -> f32 {
        self.material.index_of_refraction
    }

    /// Schlick's approximation of the Fresnel reflectance for a ray arriving
    /// from a medium with index `medium_ior`.
    ///
    /// Matched indices reflect nothing; total internal reflection reflects
    /// everything.
    pub fn schlick(&self, ray: &Ray, medium_ior: f32) -> f32 {
        let cos_theta1 = -ray.direction.dot(self.normal);

        let n1 = medium_ior;
        let n2 = self.index_of_refraction();

        // Same medium on both sides: everything is refracted
        if (n1 - n2).abs() < EPS {
            return 0.0;
        }

        let n = n1 / n2;
        let sin_theta2_squared = n * n * (1.0 - cos_theta1 * cos_theta1);
        if sin_theta2_squared > 1.0 {
            return 1.0;
        }

        let r0 = ((n1 - n2) / (n1 + n2)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cos_theta1).powi(5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tessel_core::{MaterialId, Texture};

    fn floor(material: MaterialId) -> Triangle {
        // z = -2 plane facing +Z
        Triangle::new(
            [
                Vec3::new(-1.0, -1.0, -2.0),
                Vec3::new(1.0, -1.0, -2.0),
                Vec3::new(0.0, 2.0, -2.0),
            ],
            [Vec3::Z; 3],
            [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)],
            material,
        )
    }

    fn store_with(material: Material) -> (MaterialStore, MaterialId) {
        let mut store = MaterialStore::new();
        let id = store.add(material);
        (store, id)
    }

    #[test]
    fn test_from_hit_interpolates() {
        let (store, id) = store_with(Material::new("plain"));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(-1.0, -1.0, -2.0), &store);

        assert!((surfel.normal - Vec3::Z).length() < 1e-5);
        assert!(surfel.uv.length() < 1e-5);
        assert_eq!(surfel.material.name, "plain");
    }

    #[test]
    fn test_direct_lighting_blinn_phong() {
        let material = Material::new("matte")
            .with_diffuse(Color::new(0.6, 0.4, 0.2))
            .with_specular(Color::splat(0.2), 10.0);
        let (store, id) = store_with(material);
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        // Light one unit above the point, eye at the origin: both cosines are 1
        let color = surfel.direct_lighting(Vec3::new(0.0, 0.0, -1.0), Color::ONE, Vec3::ZERO);
        let expected = (Color::new(0.6, 0.4, 0.2) + Color::splat(0.2)) * 0.5;
        assert!((color - expected).length() < 1e-5);
    }

    #[test]
    fn test_direct_lighting_behind_surface_is_black() {
        let (store, id) = store_with(Material::new("matte").with_diffuse(Color::ONE));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        let color = surfel.direct_lighting(Vec3::new(0.0, 0.0, -3.0), Color::ONE, Vec3::ZERO);
        assert_eq!(color, Color::ZERO);
    }

    #[test]
    fn test_emissive_and_ambient() {
        let material = Material::new("glow")
            .with_emissive(Color::new(1.0, 0.0, 0.0))
            .with_ambient(Color::new(0.0, 0.1, 0.0));
        let (store, id) = store_with(material);
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        assert_eq!(surfel.emissive(), Color::new(1.0, 0.0, 0.0));
        assert_eq!(surfel.indirect_lighting(), Color::new(0.0, 0.1, 0.0));
        assert!(surfel.is_phong());
        assert!(surfel.texel().is_none());
    }

    #[test]
    fn test_texel_samples_material_texture() {
        let texture = Arc::new(Texture::solid_color(Color::new(0.2, 0.4, 0.6)));
        let (store, id) = store_with(Material::new("painted").with_texture(texture));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        let texel = surfel.texel().unwrap();
        assert!((texel - Color::new(0.2, 0.4, 0.6)).length() < 1e-5);
    }

    #[test]
    fn test_schlick_matched_indices_reflect_nothing() {
        let (store, id) = store_with(Material::new("air_box").with_optics(0.0, 1.0, 1.0003));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        let ray = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert_eq!(surfel.schlick(&ray, 1.0003), 0.0);
    }

    #[test]
    fn test_schlick_total_internal_reflection() {
        // Leaving glass into air at a grazing angle
        let (store, id) = store_with(Material::new("air").with_optics(0.0, 1.0, 1.0));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        let grazing = Ray::new(Vec3::new(-1.0, 0.0, -1.9), Vec3::new(1.0, 0.0, -0.1).normalize());
        assert_eq!(surfel.schlick(&grazing, 1.5), 1.0);
    }

    #[test]
    fn test_schlick_normal_incidence() {
        let (store, id) = store_with(Material::new("glass").with_optics(0.0, 1.0, 1.5));
        let tri = floor(id);
        let surfel = SurfaceElement::from_hit(&tri, Vec3::new(0.0, 0.0, -2.0), &store);

        // Head-on, reflectance is R0 = ((1 - 1.5) / 2.5)^2 = 0.04
        let head_on = Ray::new(Vec3::ZERO, Vec3::NEG_Z);
        assert!((surfel.schlick(&head_on, 1.0) - 0.04).abs() < 1e-5);

        // Grazing angles reflect more
        let oblique = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, -0.2).normalize());
        assert!(surfel.schlick(&oblique, 1.0) > 0.04);
    }
}
