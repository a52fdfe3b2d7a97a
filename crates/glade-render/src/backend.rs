//! GPU capability interfaces and upload data

use std::path::Path;

use bytemuck::{Pod, Zeroable};
use glade_core::{Color, GladeError, Result, Vec2};
use glade_terrain::TerrainMesh;

use crate::gui::GuiTexture;
use crate::model::{Material, RawModel, TextureHandle};
use crate::skybox::{Light, SkyBox};
use crate::terrain::TerrainModel;

/// Interleaved vertex layout used for every mesh upload
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

/// Indexed triangle mesh ready for upload
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Build from flat attribute arrays (3 floats per position and normal,
    /// 2 per texture coordinate). Missing normals and texture coordinates
    /// default to up and zero.
    pub fn from_flat(positions: &[f32], normals: &[f32], tex_coords: &[f32], indices: Vec<u32>) -> Result<Self> {
        if positions.len() % 3 != 0 {
            return Err(GladeError::ValidationError(format!(
                "position array of {} floats is not a multiple of 3",
                positions.len()
            )));
        }
        let vertex_count = positions.len() / 3;
        if let Some(bad) = indices.iter().find(|i| **i as usize >= vertex_count) {
            return Err(GladeError::ValidationError(format!(
                "index {bad} out of range for {vertex_count} vertices"
            )));
        }

        let positions: Vec<[f32; 3]> = positions.chunks_exact(3).map(|c| [c[0], c[1], c[2]]).collect();
        let normals = (0..vertex_count)
            .map(|i| match normals.get(i * 3..i * 3 + 3) {
                Some(n) => [n[0], n[1], n[2]],
                None => [0.0, 1.0, 0.0],
            })
            .collect();
        let tex_coords = (0..vertex_count)
            .map(|i| match tex_coords.get(i * 2..i * 2 + 2) {
                Some(t) => [t[0], t[1]],
                None => [0.0, 0.0],
            })
            .collect();

        Ok(Self {
            positions,
            normals,
            tex_coords,
            indices,
        })
    }

    pub fn from_terrain(mesh: &TerrainMesh) -> Self {
        Self {
            positions: mesh.positions.iter().map(|p| p.to_array()).collect(),
            normals: mesh.normals.iter().map(|n| n.to_array()).collect(),
            tex_coords: mesh.tex_coords.iter().map(|t| t.to_array()).collect(),
            indices: mesh.indices.clone(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn index_count(&self) -> usize {
        self.indices.len()
    }

    /// Interleave attributes into the upload layout
    pub fn vertices(&self) -> Vec<Vertex> {
        self.positions
            .iter()
            .zip(&self.normals)
            .zip(&self.tex_coords)
            .map(|((position, normal), tex_coords)| Vertex {
                position: *position,
                normal: *normal,
                tex_coords: *tex_coords,
            })
            .collect()
    }

    /// Vertex buffer contents
    pub fn vertex_bytes(&self) -> Vec<u8> {
        bytemuck::cast_slice(&self.vertices()).to_vec()
    }

    /// Index buffer contents
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

/// Decoded RGBA8 image
#[derive(Debug, Clone, PartialEq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    pub fn from_file(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            GladeError::AssetError(format!("Failed to load texture '{}': {}", path.display(), e))
        })?;
        let rgba = img.to_rgba8();
        Ok(Self {
            width: rgba.width(),
            height: rgba.height(),
            pixels: rgba.into_raw(),
        })
    }

    /// Single-colour texture
    pub fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let pixels = rgba
            .iter()
            .copied()
            .cycle()
            .take((width * height * 4) as usize)
            .collect();
        Self {
            width,
            height,
            pixels,
        }
    }
}

/// Per-frame values shared by every draw
#[derive(Debug, Clone, Copy)]
pub struct SceneUniforms<'a> {
    pub projection: glam::Mat4,
    pub view: glam::Mat4,
    pub sky_colour: Color,
    pub lights: &'a [Light],
}

/// Turns raw arrays into GPU-resident handles
pub trait GpuLoader {
    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<RawModel>;

    /// Non-indexed 2D positions (GUI quads)
    fn upload_positions_2d(&mut self, positions: &[f32]) -> Result<RawModel>;

    /// Non-indexed 3D positions (the sky box)
    fn upload_positions_3d(&mut self, positions: &[f32]) -> Result<RawModel>;

    fn upload_texture(&mut self, texture: &TextureData, repeat: bool) -> Result<TextureHandle>;

    fn upload_cube_map(&mut self, faces: &[TextureData; 6]) -> Result<TextureHandle>;
}

/// Issues the draw calls of one frame
pub trait GpuBackend {
    /// Clear colour and depth
    fn prepare(&mut self, clear_colour: Color);

    /// Load the uniforms shared by every draw of the frame
    fn load_scene(&mut self, scene: &SceneUniforms<'_>);

    /// Bind geometry and material state for the draws that follow
    fn bind_model(&mut self, model: &RawModel, material: &Material);

    fn set_culling(&mut self, enabled: bool);

    /// Draw the bound model once with a per-instance transform
    fn draw_entity(&mut self, transform: &glam::Mat4, texture_offset: Vec2);

    fn draw_terrain(&mut self, terrain: &TerrainModel, transform: &glam::Mat4);

    fn draw_sky_box(&mut self, sky_box: &SkyBox);

    fn draw_gui(&mut self, quad: &RawModel, gui: &GuiTexture);

    fn finish(&mut self);
}
