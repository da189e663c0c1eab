//! Tessel Core - scene source types for the Tessel ray tracer.
//!
//! This crate provides:
//!
//! - **Geometry**: `Mesh` in model space, with fan triangulation and smooth normals
//! - **Materials**: `Material`, shared through `MaterialStore` handles
//! - **Lights**: `Light` discovered from light-tagged meshes
//! - **Placement**: the model-view transform supplied by the host application
//!
//! # Example
//!
//! ```ignore
//! use tessel_core::{discover_lights, Material, Mesh, SceneSource};
//!
//! let mut source = SceneSource::new();
//! let lamp = source.materials.add(Material::new("light").with_emissive(Color::ONE));
//! source.add_mesh(quad.with_material(lamp));
//! let lights = discover_lights(&source);
//! ```

pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod texture;

// Re-export commonly used types
pub use light::{discover_lights, Light, LightKind};
pub use material::{Color, Material, MaterialId, MaterialStore};
pub use mesh::Mesh;
pub use scene::{Placement, SceneError, SceneResult, SceneSource, SCENE_Z_OFFSET};
pub use texture::{Texture, TextureError, TextureResult};
