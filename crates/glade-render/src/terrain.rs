//! Terrain tiles paired with their GPU resources

use glade_core::Result;
use glade_terrain::Terrain;

use crate::backend::{GpuLoader, MeshData};
use crate::entity::to_glam;
use crate::model::{RawModel, TextureHandle};

/// Textures blended across a terrain by its blend map
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerrainTexturePack {
    pub background: TextureHandle,
    pub r: TextureHandle,
    pub g: TextureHandle,
    pub b: TextureHandle,
    pub blend_map: TextureHandle,
}

impl TerrainTexturePack {
    /// One texture everywhere
    pub fn uniform(texture: TextureHandle) -> Self {
        Self {
            background: texture,
            r: texture,
            g: texture,
            b: texture,
            blend_map: texture,
        }
    }
}

/// A placed terrain ready to draw
#[derive(Debug, Clone)]
pub struct TerrainModel {
    pub terrain: Terrain,
    pub model: RawModel,
    pub textures: TerrainTexturePack,
}

impl TerrainModel {
    /// Upload the terrain mesh
    pub fn load<L: GpuLoader>(loader: &mut L, terrain: Terrain, textures: TerrainTexturePack) -> Result<Self> {
        let model = loader.upload_mesh(&MeshData::from_terrain(&terrain.mesh))?;
        Ok(Self {
            terrain,
            model,
            textures,
        })
    }

    pub fn transformation_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_translation(to_glam(self.terrain.origin))
    }

    /// Whether world `(x, z)` is over this tile
    pub fn covers(&self, x: f32, z: f32) -> bool {
        let origin = self.terrain.origin;
        x >= origin.x && x < origin.x + self.terrain.size && z >= origin.z && z < origin.z + self.terrain.size
    }
}

/// Ground height under world `(x, z)`, from the tile covering it, or 0
pub fn ground_height<'a, I>(terrains: I, x: f32, z: f32) -> f32
where
    I: IntoIterator<Item = &'a TerrainModel>,
{
    terrains
        .into_iter()
        .find(|t| t.covers(x, z))
        .map(|t| t.terrain.height_of_terrain(x, z))
        .unwrap_or(0.0)
}
