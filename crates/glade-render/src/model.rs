//! Shared models, materials and the model registry

use std::collections::BTreeMap;

use glade_core::{Color, GladeError, ModelId, Result};

/// Opaque handle to geometry uploaded to the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RawModel {
    pub id: u32,
    /// Indices to draw (or vertices, for non-indexed geometry)
    pub vertex_count: u32,
}

/// Opaque handle to a texture uploaded to the GPU
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u32);

/// One lighting term of a material: a texture, a flat colour, or a blend
#[derive(Debug, Clone, PartialEq)]
pub struct LightingComponent {
    pub texture: Option<TextureHandle>,
    /// 1 samples the texture only, 0 uses `color` only
    pub texture_weight: f32,
    pub color: Color,
}

impl LightingComponent {
    pub fn textured(texture: TextureHandle) -> Self {
        Self {
            texture: Some(texture),
            texture_weight: 1.0,
            color: Color::new(0.0, 0.0, 0.0, 0.0),
        }
    }

    pub fn flat(color: Color) -> Self {
        Self {
            texture: None,
            texture_weight: 0.0,
            color,
        }
    }
}

impl Default for LightingComponent {
    fn default() -> Self {
        Self::flat(Color::new(0.0, 0.0, 0.0, 0.0))
    }
}

/// Surface description shared by every instance of a model part
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub diffuse: LightingComponent,
    pub shine_damper: f32,
    pub reflectivity: f32,
    /// Transparent parts are drawn with face culling disabled
    pub has_transparency: bool,
    /// Light the part as if every normal pointed straight up (grass, ferns)
    pub normals_pointing_up: bool,
    /// Rows (and columns) in the texture atlas; 1 for a plain texture
    pub atlas_factor: u32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: LightingComponent::default(),
            shine_damper: 1.0,
            reflectivity: 0.0,
            has_transparency: false,
            normals_pointing_up: false,
            atlas_factor: 1,
        }
    }
}

/// Geometry paired with the material it is drawn with
#[derive(Debug, Clone, PartialEq)]
pub struct RawModelMaterial {
    pub model: RawModel,
    pub material: Material,
}

/// Model parts that share a group and material key
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialGroup {
    pub parts: Vec<RawModelMaterial>,
}

impl MaterialGroup {
    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

/// Batching key of a model part: object group plus material name
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    pub group: String,
    pub material: String,
}

impl GroupKey {
    pub fn new(group: impl Into<String>, material: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            material: material.into(),
        }
    }
}

/// The shared visual representation referenced by many entities
#[derive(Debug, Clone, Default)]
pub struct GenericModel {
    pub name: String,
    pub groups: BTreeMap<GroupKey, MaterialGroup>,
}

impl GenericModel {
    pub fn new(name: impl Into<String>, groups: BTreeMap<GroupKey, MaterialGroup>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }

    /// Every part in group order
    pub fn parts(&self) -> impl Iterator<Item = &RawModelMaterial> {
        self.groups.values().flat_map(|g| g.parts.iter())
    }

    /// Atlas factor of the first textured part, 1 otherwise
    pub fn atlas_factor(&self) -> u32 {
        self.parts()
            .map(|p| p.material.atlas_factor)
            .find(|f| *f > 1)
            .unwrap_or(1)
    }
}

/// Arena of loaded models, addressed by [`ModelId`]
#[derive(Default)]
pub struct ModelRegistry {
    models: Vec<GenericModel>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, model: GenericModel) -> ModelId {
        let id = ModelId(self.models.len() as u32);
        log::debug!("Registered model '{}' as {}", model.name, id);
        self.models.push(model);
        id
    }

    pub fn get(&self, id: ModelId) -> Option<&GenericModel> {
        self.models.get(id.index())
    }

    /// Like [`get`](Self::get), failing with `ModelNotFound`
    pub fn require(&self, id: ModelId) -> Result<&GenericModel> {
        self.get(id)
            .ok_or_else(|| GladeError::ModelNotFound(id.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> Option<ModelId> {
        self.models
            .iter()
            .position(|m| m.name == name)
            .map(|i| ModelId(i as u32))
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
