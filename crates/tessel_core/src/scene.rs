//! Scene source types for Tessel.
//!
//! A [`SceneSource`] is the renderer-agnostic description handed to the
//! ray tracer: model-space meshes plus the material store they reference.
//! [`Placement`] carries the externally controlled object placement and
//! produces the model-view matrix used by the transform sync.

use tessel_math::{Mat4, Quat, Vec3};
use thiserror::Error;

use crate::material::{MaterialId, MaterialStore};
use crate::mesh::Mesh;

/// Errors raised while validating or syncing scene geometry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Mesh '{mesh}': index count {len} is not a multiple of 3")]
    MalformedIndices { mesh: String, len: usize },

    #[error("Mesh '{mesh}': vertex index {index} out of range ({vertex_count} vertices)")]
    IndexOutOfRange {
        mesh: String,
        index: u32,
        vertex_count: usize,
    },

    #[error("Mesh '{mesh}': {attribute} has {len} entries for {vertex_count} vertices")]
    AttributeMismatch {
        mesh: String,
        attribute: &'static str,
        len: usize,
        vertex_count: usize,
    },

    #[error("Mesh '{mesh}': unknown material handle {material:?}")]
    UnknownMaterial { mesh: String, material: MaterialId },
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;

/// Depth offset that places the scene in front of a camera at the origin.
pub const SCENE_Z_OFFSET: f32 = -1.0;

/// Object placement controlled from outside the renderer (sliders, arcball).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    /// Translation
    pub translation: Vec3,

    /// Rotation (as quaternion)
    pub rotation: Quat,
}

impl Default for Placement {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

impl Placement {
    /// Create a placement with only translation.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            translation,
            ..Default::default()
        }
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    /// Model-view matrix: `T(x, y, z - 1) * R`, used for pre-multiplication.
    pub fn model_view(&self) -> Mat4 {
        let translation = self.translation + Vec3::new(0.0, 0.0, SCENE_Z_OFFSET);
        Mat4::from_translation(translation) * Mat4::from_quat(self.rotation)
    }
}

/// Model-space meshes and the materials they use.
#[derive(Clone, Debug, Default)]
pub struct SceneSource {
    /// Meshes in render order
    pub meshes: Vec<Mesh>,

    /// Materials shared by the meshes
    pub materials: MaterialStore,
}

impl SceneSource {
    /// Create an empty scene source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scene source from an existing material store.
    pub fn with_materials(materials: MaterialStore) -> Self {
        Self {
            meshes: Vec::new(),
            materials,
        }
    }

    /// Add a mesh.
    pub fn add_mesh(&mut self, mesh: Mesh) {
        self.meshes.push(mesh);
    }

    /// Material handle a mesh renders with.
    pub fn material_of(&self, mesh: &Mesh) -> MaterialId {
        mesh.material.unwrap_or(MaterialStore::DEFAULT)
    }

    /// Validate every mesh and its material handle.
    pub fn validate(&self) -> SceneResult<()> {
        for mesh in &self.meshes {
            mesh.validate()?;

            let material = self.material_of(mesh);
            if !self.materials.contains(material) {
                return Err(SceneError::UnknownMaterial {
                    mesh: mesh.name.clone(),
                    material,
                });
            }
        }
        Ok(())
    }

    /// Get total triangle count across all meshes.
    pub fn total_triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }
}
