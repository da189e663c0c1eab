//! Mesh geometry in model space.
//!
//! Meshes are the source geometry the renderer's transform sync turns into
//! camera-space triangles. They can be populated from any loader; polygon
//! faces are fan-triangulated on the way in.

use std::borrow::Cow;

use tessel_math::{Vec2, Vec3};

use crate::material::MaterialId;
use crate::scene::{SceneError, SceneResult};

/// A mesh consisting of vertex positions, optional normals and UVs, and
/// triangle indices, bound to one material.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Object name (for diagnostics)
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - smooth normals are computed if missing)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Material handle; `None` renders with the store's fallback material
    pub material: Option<MaterialId>,
}

impl Mesh {
    /// Create a new mesh from positions and triangle indices.
    pub fn new(name: impl Into<String>, positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            name: name.into(),
            positions,
            normals: None,
            uvs: None,
            indices,
            material: None,
        }
    }

    /// Create a mesh from polygon faces, fan-triangulating each face.
    ///
    /// A face `[a, b, c, d]` becomes triangles `[a, b, c]` and `[a, c, d]`.
    /// Faces with fewer than three vertices are skipped.
    pub fn from_polygons(name: impl Into<String>, positions: Vec<Vec3>, faces: &[Vec<u32>]) -> Self {
        let mut indices = Vec::new();

        for face in faces {
            if face.len() < 3 {
                continue;
            }
            for k in 1..face.len() - 1 {
                indices.extend_from_slice(&[face[0], face[k], face[k + 1]]);
            }
        }

        Self::new(name, positions, indices)
    }

    pub fn with_normals(mut self, normals: Vec<Vec3>) -> Self {
        self.normals = Some(normals);
        self
    }

    pub fn with_uvs(mut self, uvs: Vec<Vec2>) -> Self {
        self.uvs = Some(uvs);
        self
    }

    pub fn with_material(mut self, material: MaterialId) -> Self {
        self.material = Some(material);
        self
    }

    /// Compute smooth vertex normals by averaging face normals.
    ///
    /// Faces are assumed to wind counter-clockwise when viewed from the
    /// side the normal points to.
    pub fn compute_normals(&mut self) {
        self.normals = Some(self.smooth_normals());
    }

    /// Ensure the mesh has normals, computing them if missing or if the
    /// existing array does not have one normal per vertex.
    pub fn ensure_normals(&mut self) {
        let should_compute = match &self.normals {
            None => true,
            Some(normals) => normals.len() != self.positions.len(),
        };

        if should_compute {
            if let Some(normals) = &self.normals {
                log::debug!(
                    "Mesh '{}': normals array length ({}) doesn't match vertex count ({}), computing smooth normals",
                    self.name,
                    normals.len(),
                    self.positions.len()
                );
            }
            self.compute_normals();
        }
    }

    /// Per-vertex normals, borrowing the stored ones when they are usable.
    pub fn vertex_normals(&self) -> Cow<'_, [Vec3]> {
        match &self.normals {
            Some(normals) if normals.len() == self.positions.len() => Cow::Borrowed(normals.as_slice()),
            _ => Cow::Owned(self.smooth_normals()),
        }
    }

    fn smooth_normals(&self) -> Vec<Vec3> {
        let vertex_count = self.positions.len();
        let mut normals = vec![Vec3::ZERO; vertex_count];

        // Accumulate face normals at each vertex
        for [i0, i1, i2] in self.triangles() {
            let (i0, i1, i2) = (i0 as usize, i1 as usize, i2 as usize);
            if i0 >= vertex_count || i1 >= vertex_count || i2 >= vertex_count {
                continue;
            }

            let p0 = self.positions[i0];
            let edge1 = self.positions[i1] - p0;
            let edge2 = self.positions[i2] - p0;
            let face_normal = edge1.cross(edge2);

            normals[i0] += face_normal;
            normals[i1] += face_normal;
            normals[i2] += face_normal;
        }

        for normal in &mut normals {
            let len = normal.length();
            if len > 0.0 {
                *normal /= len;
            } else {
                *normal = Vec3::Y; // Default up normal for degenerate cases
            }
        }

        normals
    }

    /// Check if the mesh has normals.
    pub fn has_normals(&self) -> bool {
        self.normals.is_some()
    }

    /// Check if the mesh has UV coordinates.
    pub fn has_uvs(&self) -> bool {
        self.uvs.is_some()
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Iterate over triangles as index triples.
    pub fn triangles(&self) -> impl Iterator<Item = [u32; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
    }

    /// Mean of all vertex positions.
    pub fn centroid(&self) -> Vec3 {
        if self.positions.is_empty() {
            return Vec3::ZERO;
        }
        self.positions.iter().copied().sum::<Vec3>() / self.positions.len() as f32
    }

    /// Check index and attribute consistency.
    pub fn validate(&self) -> SceneResult<()> {
        if self.indices.len() % 3 != 0 {
            return Err(SceneError::MalformedIndices {
                mesh: self.name.clone(),
                len: self.indices.len(),
            });
        }

        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.positions.len())
        {
            return Err(SceneError::IndexOutOfRange {
                mesh: self.name.clone(),
                index,
                vertex_count: self.positions.len(),
            });
        }

        if let Some(uvs) = &self.uvs {
            if uvs.len() != self.positions.len() {
                return Err(SceneError::AttributeMismatch {
                    mesh: self.name.clone(),
                    attribute: "uvs",
                    len: uvs.len(),
                    vertex_count: self.positions.len(),
                });
            }
        }

        Ok(())
    }
}
