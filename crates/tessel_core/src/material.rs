//! Surface materials and the store that owns them.
//!
//! Materials are created once when a scene is loaded and shared by every
//! triangle that uses them. Triangles hold a [`MaterialId`] handle into a
//! [`MaterialStore`] rather than a reference, so the store's lifetime is
//! independent of any triangle snapshot.

use std::sync::Arc;

use tessel_math::Vec3;

use crate::texture::Texture;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// A Blinn-Phong material with reflection and refraction parameters.
///
/// Maps to `.mtl` properties plus `N_mirr` (reflectivity), `N_transp`
/// (transparency) and `N_ior` (index of refraction).
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name; names containing "light" mark emitters
    pub name: String,

    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,

    /// Specular exponent (>= 0)
    pub shininess: f32,

    /// Mirror weight in [0, 1]
    pub reflectivity: f32,

    /// Transmission weight in [0, 1]
    pub transparency: f32,

    /// Index of refraction (>= 1)
    pub index_of_refraction: f32,

    /// Optional decoded texture
    pub texture: Option<Arc<Texture>>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            ambient: Color::ZERO,
            diffuse: Color::ZERO,
            specular: Color::ZERO,
            emissive: Color::ZERO,
            shininess: 0.0,
            reflectivity: 0.0,
            transparency: 0.0,
            index_of_refraction: 1.0,
            texture: None,
        }
    }
}

impl Material {
    /// Create a black material with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Grey material used for meshes that do not name one.
    pub fn fallback() -> Self {
        Self {
            ambient: Color::splat(0.5),
            diffuse: Color::splat(0.5),
            specular: Color::splat(0.5),
            shininess: 1.0,
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ambient: Color) -> Self {
        self.ambient = ambient;
        self
    }

    pub fn with_diffuse(mut self, diffuse: Color) -> Self {
        self.diffuse = diffuse;
        self
    }

    /// Set the specular color and exponent.
    pub fn with_specular(mut self, specular: Color, shininess: f32) -> Self {
        self.specular = specular;
        self.shininess = shininess;
        self
    }

    pub fn with_emissive(mut self, emissive: Color) -> Self {
        self.emissive = emissive;
        self
    }

    /// Set the mirror and transmission weights and the index of refraction.
    pub fn with_optics(mut self, reflectivity: f32, transparency: f32, index_of_refraction: f32) -> Self {
        self.reflectivity = reflectivity;
        self.transparency = transparency;
        self.index_of_refraction = index_of_refraction;
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Light-emitting materials are tagged by name.
    pub fn is_light(&self) -> bool {
        self.name.contains("light")
    }

    /// Opaque, non-mirrored surfaces that are shaded directly instead of
    /// spawning reflection and refraction rays.
    pub fn is_phong(&self) -> bool {
        self.reflectivity == 0.0 && self.transparency == 0.0
    }

    /// Clamp parameters into their valid ranges, logging anything that moved.
    fn sanitized(mut self) -> Self {
        let clamp = |value: f32, min: f32, max: f32, field: &str, name: &str| {
            let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
            if clamped != value {
                log::warn!("Material '{}': {} {} clamped to {}", name, field, value, clamped);
            }
            clamped
        };

        let name = self.name.clone();
        self.shininess = clamp(self.shininess, 0.0, f32::INFINITY, "shininess", &name);
        self.reflectivity = clamp(self.reflectivity, 0.0, 1.0, "reflectivity", &name);
        self.transparency = clamp(self.transparency, 0.0, 1.0, "transparency", &name);
        self.index_of_refraction =
            clamp(self.index_of_refraction, 1.0, f32::INFINITY, "index of refraction", &name);
        self
    }
}

/// Handle to a material inside a [`MaterialStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MaterialId(usize);

impl MaterialId {
    /// Index of the material in its store.
    pub fn index(self) -> usize {
        self.0
    }
}

/// Owns every material of a scene.
///
/// The fallback material always occupies [`MaterialStore::DEFAULT`].
#[derive(Clone, Debug)]
pub struct MaterialStore {
    materials: Vec<Material>,
}

impl MaterialStore {
    /// Handle of the grey fallback material.
    pub const DEFAULT: MaterialId = MaterialId(0);

    /// Create a store holding only the fallback material.
    pub fn new() -> Self {
        Self {
            materials: vec![Material::fallback()],
        }
    }

    /// Add a material and return its handle.
    pub fn add(&mut self, material: Material) -> MaterialId {
        let id = MaterialId(self.materials.len());
        self.materials.push(material.sanitized());
        id
    }

    /// Get a material by handle.
    pub fn get(&self, id: MaterialId) -> Option<&Material> {
        self.materials.get(id.0)
    }

    /// Get a material by handle, falling back to the default material for
    /// handles that belong to another store.
    pub fn resolve(&self, id: MaterialId) -> &Material {
        self.materials
            .get(id.0)
            .unwrap_or(&self.materials[Self::DEFAULT.0])
    }

    /// Check whether a handle refers to a material in this store.
    pub fn contains(&self, id: MaterialId) -> bool {
        id.0 < self.materials.len()
    }

    /// Find the first material with the given name.
    pub fn find(&self, name: &str) -> Option<MaterialId> {
        self.materials
            .iter()
            .position(|m| m.name == name)
            .map(MaterialId)
    }

    /// Number of materials, including the fallback.
    pub fn len(&self) -> usize {
        self.materials.len()
    }

    /// A store is never empty; it always holds the fallback material.
    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials
            .iter()
            .enumerate()
            .map(|(i, m)| (MaterialId(i), m))
    }
}

impl Default for MaterialStore {
    fn default() -> Self {
        Self::new()
    }
}
