//! Grouping of model parts and scene entities into draw batches

use std::collections::{BTreeMap, HashMap};

use glade_core::{Color, ModelId, Result};

use crate::backend::{GpuLoader, MeshData};
use crate::entity::Entity;
use crate::model::{GenericModel, GroupKey, LightingComponent, Material, MaterialGroup, RawModelMaterial, TextureHandle};
use crate::obj::{Shape, ShapeMaterial};

/// Surface settings applied to every part of a loaded model
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelOptions {
    pub has_transparency: bool,
    pub normals_pointing_up: bool,
    pub shine_damper: f32,
    pub reflectivity: f32,
    pub atlas_factor: u32,
}

impl Default for ModelOptions {
    fn default() -> Self {
        Self {
            has_transparency: false,
            normals_pointing_up: false,
            shine_damper: 10.0,
            reflectivity: 1.0,
            atlas_factor: 1,
        }
    }
}

/// Groups model parts and entities by their batching keys
pub struct MaterialGroupBatcher;

impl MaterialGroupBatcher {
    /// Merge parts that share a `(group, material)` key.
    ///
    /// Equal keys always land in the same group whatever the input order.
    pub fn group_by_key<I>(parts: I) -> BTreeMap<GroupKey, MaterialGroup>
    where
        I: IntoIterator<Item = (GroupKey, RawModelMaterial)>,
    {
        let mut groups: BTreeMap<GroupKey, MaterialGroup> = BTreeMap::new();
        for (key, part) in parts {
            groups.entry(key).or_default().parts.push(part);
        }
        groups
    }

    /// Bucket entities by the model they share, creating buckets on first use.
    ///
    /// Every input entity appears in exactly one bucket.
    pub fn group_entities_by_model<'a, I>(entities: I) -> HashMap<ModelId, Vec<Entity>>
    where
        I: IntoIterator<Item = &'a Entity>,
    {
        let mut batches: HashMap<ModelId, Vec<Entity>> = HashMap::new();
        for entity in entities {
            batches.entry(entity.model).or_default().push(entity.clone());
        }
        batches
    }

    /// Upload every shape and group the results into a [`GenericModel`].
    ///
    /// `resolve_texture` maps a diffuse texture file name to an uploaded
    /// texture; shapes whose texture cannot be resolved fall back to their
    /// diffuse colour.
    pub fn load_model<L, F>(
        loader: &mut L,
        name: &str,
        shapes: &[Shape],
        options: ModelOptions,
        mut resolve_texture: F,
    ) -> Result<GenericModel>
    where
        L: GpuLoader,
        F: FnMut(&str) -> Option<TextureHandle>,
    {
        let mut parts = Vec::with_capacity(shapes.len());
        for shape in shapes {
            let mesh = MeshData::from_flat(&shape.positions, &shape.normals, &shape.tex_coords, shape.indices.clone())?;
            let model = loader.upload_mesh(&mesh)?;
            let diffuse = diffuse_lighting(shape.material.as_ref(), &mut resolve_texture);
            let material = Material {
                diffuse,
                shine_damper: options.shine_damper,
                reflectivity: options.reflectivity,
                has_transparency: options.has_transparency,
                normals_pointing_up: options.normals_pointing_up,
                atlas_factor: options.atlas_factor,
            };
            parts.push((shape.key(), RawModelMaterial { model, material }));
        }

        let groups = Self::group_by_key(parts);
        log::debug!("Model '{}': {} shapes in {} groups", name, shapes.len(), groups.len());
        Ok(GenericModel::new(name, groups))
    }
}

fn diffuse_lighting<F>(material: Option<&ShapeMaterial>, resolve_texture: &mut F) -> LightingComponent
where
    F: FnMut(&str) -> Option<TextureHandle>,
{
    let Some(material) = material else {
        return LightingComponent::default();
    };
    if let Some(texture) = material.diffuse_texture.as_deref().and_then(|t| resolve_texture(t)) {
        return LightingComponent::textured(texture);
    }
    match material.diffuse_color {
        Some([r, g, b]) => LightingComponent::flat(Color::new(r, g, b, material.dissolve.unwrap_or(1.0))),
        None => LightingComponent::default(),
    }
}
