//! Camera-space triangle snapshot and nearest-hit queries.
//!
//! A [`Scene`] is rebuilt wholesale from a [`SceneSource`] whenever the
//! model-view transform changes, and is read-only for the whole render pass.
//! Intersection is a linear scan over every triangle; there is no spatial
//! acceleration structure.

use tessel_core::{MaterialStore, SceneResult, SceneSource};
use tessel_math::{Mat4, Ray, Vec2};

use crate::triangle::Triangle;

/// Sentinel `t` for a ray that hits nothing.
pub const NO_INTERSECT: f32 = -1.0;

/// Result of a nearest-hit query.
///
/// `t > 0` iff a triangle was hit; misses carry [`NO_INTERSECT`] and no triangle.
#[derive(Debug, Clone, Copy)]
pub struct CollisionInfo<'a> {
    pub triangle: Option<&'a Triangle>,
    pub t: f32,
}

impl<'a> CollisionInfo<'a> {
    /// A miss.
    pub fn miss() -> Self {
        Self {
            triangle: None,
            t: NO_INTERSECT,
        }
    }

    pub fn is_hit(&self) -> bool {
        self.t > 0.0
    }

    /// The hit triangle, if any.
    pub fn hit(&self) -> Option<&'a Triangle> {
        if self.is_hit() {
            self.triangle
        } else {
            None
        }
    }

    /// A hit on geometry that can occlude light; light emitters never do.
    pub fn is_shadow_hit(&self, materials: &MaterialStore) -> bool {
        self.hit()
            .is_some_and(|triangle| !materials.resolve(triangle.material()).is_light())
    }
}

/// The ordered camera-space triangles of one render pass.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    triangles: Vec<Triangle>,
}

impl Scene {
    /// Create a scene from already transformed triangles.
    pub fn new(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Transform every mesh of `source` into camera space.
    ///
    /// Positions are transformed as points and normals as vectors (w = 0).
    /// Meshes keep their order, and triangles keep their order within a mesh.
    pub fn build(source: &SceneSource, model_view: Mat4) -> SceneResult<Self> {
        source.validate()?;

        log::debug!("ModelView Matrix: {:?}", model_view);

        let mut triangles = Vec::with_capacity(source.total_triangle_count());

        for mesh in &source.meshes {
            let material = source.material_of(mesh);
            let normals = mesh.vertex_normals();

            for indices in mesh.triangles() {
                let [i0, i1, i2] = indices.map(|i| i as usize);

                let vertices = [i0, i1, i2].map(|i| model_view.transform_point3(mesh.positions[i]));
                let vertex_normals = [i0, i1, i2].map(|i| model_view.transform_vector3(normals[i]));
                let uvs = match &mesh.uvs {
                    Some(uvs) => [uvs[i0], uvs[i1], uvs[i2]],
                    None => [Vec2::ZERO; 3],
                };

                triangles.push(Triangle::new(vertices, vertex_normals, uvs, material));
            }
        }

        let degenerate = triangles.iter().filter(|t| t.is_degenerate()).count();
        if degenerate > 0 {
            log::warn!("{} degenerate triangles will never be hit", degenerate);
        }

        log::info!(
            "Scene synced: {} triangles from {} meshes",
            triangles.len(),
            source.meshes.len()
        );

        Ok(Self { triangles })
    }

    /// Nearest triangle with a strictly positive `t` along the ray.
    ///
    /// Ties keep the first triangle in scan order.
    pub fn closest_triangle(&self, ray: &Ray) -> CollisionInfo<'_> {
        let mut closest = CollisionInfo::miss();
        let mut min_t = f32::INFINITY;

        for triangle in &self.triangles {
            let t = triangle.intersect(ray);

            if 0.0 < t && t < min_t {
                closest = CollisionInfo {
                    triangle: Some(triangle),
                    t,
                };
                min_t = t;
            }
        }

        closest
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Get the number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// Check if the scene is empty.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }
}
