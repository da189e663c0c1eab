//! Light sources.
//!
//! Lights are discovered once from light-tagged geometry and persist for the
//! session. Their `enabled` flag may be toggled between render passes.

use rand::{Rng, RngCore};
use tessel_math::{Mat4, Vec3};

use crate::material::Color;
use crate::mesh::Mesh;
use crate::scene::SceneSource;

/// Half-extent of the jitter applied across an area light's tangent rectangle.
const AREA_SAMPLE_SPREAD: f32 = 0.25;

/// The shape of a light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightKind {
    /// Emits from a single position
    Point,
    /// Emits along `direction`; shaded from its nominal position
    Directional,
    /// Rectangle spanned by two tangents around the position
    Area { tangent1: Vec3, tangent2: Vec3 },
}

/// A light source in model or camera space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub kind: LightKind,
    pub position: Vec3,
    pub direction: Vec3,
    pub color: Color,
    pub enabled: bool,
}

impl Light {
    /// Create an enabled point light.
    pub fn point(color: Color, position: Vec3) -> Self {
        Self {
            kind: LightKind::Point,
            position,
            direction: Vec3::ZERO,
            color,
            enabled: true,
        }
    }

    /// Create an enabled directional light.
    pub fn directional(color: Color, position: Vec3, direction: Vec3) -> Self {
        Self {
            kind: LightKind::Directional,
            position,
            direction,
            color,
            enabled: true,
        }
    }

    /// Create an enabled area light centred on `position`.
    pub fn area(color: Color, position: Vec3, direction: Vec3, tangent1: Vec3, tangent2: Vec3) -> Self {
        Self {
            kind: LightKind::Area { tangent1, tangent2 },
            position,
            direction,
            color,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn is_area(&self) -> bool {
        matches!(self.kind, LightKind::Area { .. })
    }

    /// Jittered emission point for soft shadows.
    ///
    /// Area lights offset the position by up to a quarter of each tangent in
    /// either direction; other lights return their position unchanged.
    pub fn sampled_position(&self, rng: &mut dyn RngCore) -> Vec3 {
        match self.kind {
            LightKind::Area { tangent1, tangent2 } => {
                let u = (rng.gen::<f32>() - 0.5) * 2.0 * AREA_SAMPLE_SPREAD;
                let v = (rng.gen::<f32>() - 0.5) * 2.0 * AREA_SAMPLE_SPREAD;
                self.position + u * tangent1 + v * tangent2
            }
            LightKind::Point | LightKind::Directional => self.position,
        }
    }

    /// The same light with positions transformed as points and directions
    /// and tangents transformed as vectors.
    pub fn to_camera_space(&self, model_view: &Mat4) -> Self {
        let kind = match self.kind {
            LightKind::Area { tangent1, tangent2 } => LightKind::Area {
                tangent1: model_view.transform_vector3(tangent1),
                tangent2: model_view.transform_vector3(tangent2),
            },
            other => other,
        };

        Self {
            kind,
            position: model_view.transform_point3(self.position),
            direction: model_view.transform_vector3(self.direction),
            ..*self
        }
    }
}

/// Build lights from every mesh whose material is tagged as a light.
///
/// A two-triangle mesh is treated as a rectangular area light; anything else
/// becomes a point light at the mean of its vertices. Light color is the
/// material's emissive color.
pub fn discover_lights(source: &SceneSource) -> Vec<Light> {
    let mut lights = Vec::new();

    for mesh in &source.meshes {
        let material = source.materials.resolve(source.material_of(mesh));
        if !material.is_light() {
            continue;
        }

        let light = if mesh.triangle_count() == 2 {
            area_light(mesh, material.emissive)
        } else {
            None
        };

        lights.push(light.unwrap_or_else(|| Light::point(material.emissive, mesh.centroid())));
    }

    log::info!("Found #{} lights", lights.len());

    lights
}

/// Area light from a quad split into two triangles.
///
/// The corner of the first triangle not shared with the second is the quad's
/// origin; the edges to the other two corners span the rectangle.
fn area_light(mesh: &Mesh, color: Color) -> Option<Light> {
    let mut triangles = mesh.triangles();
    let first = triangles.next()?;
    let second = triangles.next()?;

    let corner = (0..3).find(|&i| !second.contains(&first[i]))?;

    let position = |i: usize| mesh.positions.get(first[(corner + i) % 3] as usize).copied();
    let v1 = position(0)?;
    let v2 = position(1)?;
    let v3 = position(2)?;

    let tangent1 = v2 - v1;
    let tangent2 = v3 - v1;
    let center = v1 + tangent1 / 2.0 + tangent2 / 2.0;

    let normal = mesh
        .vertex_normals()
        .get(first[0] as usize)
        .copied()
        .unwrap_or(Vec3::ZERO);

    Some(Light::area(color, center, normal, tangent1, tangent2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn light_quad() -> Mesh {
        // Quad in the y = 1 plane, facing down
        Mesh::from_polygons(
            "lamp",
            vec![
                Vec3::new(-0.5, 1.0, -0.5),
                Vec3::new(0.5, 1.0, -0.5),
                Vec3::new(0.5, 1.0, 0.5),
                Vec3::new(-0.5, 1.0, 0.5),
            ],
            &[vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_discover_area_light() {
        let mut source = SceneSource::new();
        let lamp = source
            .materials
            .add(Material::new("light").with_emissive(Color::new(1.0, 0.9, 0.8)));
        source.add_mesh(light_quad().with_material(lamp));

        let lights = discover_lights(&source);
        assert_eq!(lights.len(), 1);

        let light = lights[0];
        assert!(light.is_area());
        assert!(light.enabled);
        assert_eq!(light.color, Color::new(1.0, 0.9, 0.8));
        assert!((light.position - Vec3::new(0.0, 1.0, 0.0)).length() < 0.001);

        match light.kind {
            LightKind::Area { tangent1, tangent2 } => {
                assert!((tangent1.length() - 1.0).abs() < 0.001);
                assert!((tangent2.length() - 1.0).abs() < 0.001);
                assert!(tangent1.dot(tangent2).abs() < 0.001);
            }
            _ => panic!("expected an area light"),
        }
    }

    #[test]
    fn test_discover_point_light() {
        let mut source = SceneSource::new();
        let bulb = source.materials.add(Material::new("bulb_light").with_emissive(Color::ONE));
        source.add_mesh(
            Mesh::new(
                "bulb",
                vec![Vec3::new(0.0, 2.0, 0.0), Vec3::new(1.0, 2.0, 0.0), Vec3::new(0.0, 2.0, 1.0)],
                vec![0, 1, 2],
            )
            .with_material(bulb),
        );

        let lights = discover_lights(&source);
        assert_eq!(lights.len(), 1);
        assert_eq!(lights[0].kind, LightKind::Point);
        assert!((lights[0].position - Vec3::new(1.0 / 3.0, 2.0, 1.0 / 3.0)).length() < 0.001);
    }

    #[test]
    fn test_non_light_meshes_are_ignored() {
        let mut source = SceneSource::new();
        source.add_mesh(light_quad());
        assert!(discover_lights(&source).is_empty());
    }

    #[test]
    fn test_sampled_position_stays_on_rectangle() {
        let light = Light::area(Color::ONE, Vec3::ZERO, Vec3::NEG_Y, Vec3::X, Vec3::Z);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..100 {
            let p = light.sampled_position(&mut rng);
            assert!(p.x.abs() <= AREA_SAMPLE_SPREAD);
            assert!(p.z.abs() <= AREA_SAMPLE_SPREAD);
            assert_eq!(p.y, 0.0);
        }
    }

    #[test]
    fn test_point_light_sample_is_fixed() {
        let light = Light::point(Color::ONE, Vec3::new(1.0, 2.0, 3.0));
        let mut rng = StdRng::seed_from_u64(7);
        assert_eq!(light.sampled_position(&mut rng), light.position);
    }

    #[test]
    fn test_to_camera_space() {
        let light = Light::area(Color::ONE, Vec3::ZERO, Vec3::NEG_Y, Vec3::X, Vec3::Z);
        let mv = Mat4::from_translation(Vec3::new(0.0, 0.0, -1.0));
        let moved = light.to_camera_space(&mv);

        assert_eq!(moved.position, Vec3::new(0.0, 0.0, -1.0));
        assert_eq!(moved.direction, Vec3::NEG_Y);
        assert_eq!(
            moved.kind,
            LightKind::Area {
                tangent1: Vec3::X,
                tangent2: Vec3::Z
            }
        );
    }
}
