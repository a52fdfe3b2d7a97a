//! Wavefront OBJ/MTL shape import

use std::io::{BufRead, BufReader, Cursor};
use std::path::Path;

use glade_core::{GladeError, Result};

use crate::model::GroupKey;

/// Material properties read from an MTL library
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeMaterial {
    pub name: String,
    pub diffuse_texture: Option<String>,
    pub diffuse_color: Option<[f32; 3]>,
    pub dissolve: Option<f32>,
}

/// One group- and material-homogeneous slice of a model
#[derive(Debug, Clone, PartialEq)]
pub struct Shape {
    pub group_name: String,
    pub material_name: String,
    /// 3 floats per vertex
    pub positions: Vec<f32>,
    /// 3 floats per vertex, may be empty
    pub normals: Vec<f32>,
    /// 2 floats per vertex, may be empty
    pub tex_coords: Vec<f32>,
    pub indices: Vec<u32>,
    pub material: Option<ShapeMaterial>,
}

impl Shape {
    pub fn key(&self) -> GroupKey {
        GroupKey::new(&self.group_name, &self.material_name)
    }
}

fn load_options() -> tobj::LoadOptions {
    tobj::LoadOptions {
        triangulate: true,
        single_index: true,
        ..Default::default()
    }
}

/// Load every shape of an OBJ file, resolving its material libraries
/// relative to the file.
pub fn load_obj(path: &Path) -> Result<Vec<Shape>> {
    let (models, materials) = tobj::load_obj(path, &load_options()).map_err(|e| {
        GladeError::AssetError(format!("Failed to load model '{}': {}", path.display(), e))
    })?;
    let materials = materials.unwrap_or_else(|e| {
        log::warn!("Materials for '{}' unavailable: {}", path.display(), e);
        Vec::new()
    });
    let shapes = to_shapes(models, &materials);
    log::debug!("Loaded {} shapes from '{}'", shapes.len(), path.display());
    Ok(shapes)
}

/// Parse OBJ text, taking materials from `mtl` when given
pub fn parse_obj<R: BufRead>(reader: &mut R, mtl: Option<&str>) -> Result<Vec<Shape>> {
    let (models, materials) = tobj::load_obj_buf(reader, &load_options(), |_| match mtl {
        Some(text) => tobj::load_mtl_buf(&mut BufReader::new(Cursor::new(text))),
        None => Ok(Default::default()),
    })
    .map_err(|e| GladeError::AssetError(format!("Failed to parse model: {}", e)))?;
    let materials = materials.unwrap_or_default();
    Ok(to_shapes(models, &materials))
}

fn to_shapes(models: Vec<tobj::Model>, materials: &[tobj::Material]) -> Vec<Shape> {
    models
        .into_iter()
        .map(|m| {
            let material = m.mesh.material_id.and_then(|id| materials.get(id)).map(|mat| ShapeMaterial {
                name: mat.name.clone(),
                diffuse_texture: mat.diffuse_texture.clone().filter(|t| !t.is_empty()),
                diffuse_color: mat.diffuse,
                dissolve: mat.dissolve,
            });
            // OBJ puts v = 0 at the bottom of the image
            let tex_coords = m
                .mesh
                .texcoords
                .chunks_exact(2)
                .flat_map(|t| [t[0], 1.0 - t[1]])
                .collect();

            Shape {
                group_name: m.name,
                material_name: material.as_ref().map(|mat| mat.name.clone()).unwrap_or_default(),
                positions: m.mesh.positions,
                normals: m.mesh.normals,
                tex_coords,
                indices: m.mesh.indices,
                material,
            }
        })
        .collect()
}
