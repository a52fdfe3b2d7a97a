//! Terrain grid mesh generation

use glade_core::{GladeError, Result, Vec2, Vec3};

use crate::heightmap::HeightField;

/// Horizontal scale used when estimating normals from neighbour heights
const NORMAL_HORIZONTAL_SCALE: f32 = 2.0;

/// Deformed square grid mesh for one terrain tile.
///
/// Vertex `(x, z)` lives at linear index `z * N + x`. The height field the
/// mesh was built from is kept for ground-height queries.
#[derive(Debug, Clone)]
pub struct TerrainMesh {
    /// Vertex positions in terrain-local space
    pub positions: Vec<Vec3>,
    /// Unit vertex normals
    pub normals: Vec<Vec3>,
    /// Texture coordinates in `[0, 1]` over the whole tile
    pub tex_coords: Vec<Vec2>,
    /// Triangle list, two triangles per grid cell
    pub indices: Vec<u32>,
    heights: HeightField,
}

impl TerrainMesh {
    /// Vertices per side
    pub fn vertex_count(&self) -> u32 {
        self.heights.size()
    }

    /// The retained height field
    pub fn heights(&self) -> &HeightField {
        &self.heights
    }
}

/// Builds [`TerrainMesh`]es from height fields.
pub struct TerrainMeshBuilder;

impl TerrainMeshBuilder {
    /// Generate an `N x N` grid spanning `side_length` world units.
    ///
    /// The height field must be exactly `vertex_count` samples per side, and
    /// a grid needs at least two vertices per side.
    pub fn build(heights: HeightField, side_length: f32, vertex_count: u32) -> Result<TerrainMesh> {
        let n = vertex_count;
        if heights.size() != n {
            return Err(GladeError::TerrainError(format!(
                "height field has {} samples per side, expected {n}",
                heights.size()
            )));
        }
        if n < 2 {
            return Err(GladeError::TerrainError(format!(
                "terrain needs at least 2 vertices per side, got {n}"
            )));
        }

        let count = (n * n) as usize;
        let last = (n - 1) as f32;

        let mut positions = Vec::with_capacity(count);
        let mut tex_coords = Vec::with_capacity(count);
        for z in 0..n {
            for x in 0..n {
                let u = x as f32 / last;
                let v = z as f32 / last;
                positions.push(Vec3::new(
                    u * side_length,
                    heights.get(x as i64, z as i64),
                    v * side_length,
                ));
                tex_coords.push(Vec2::new(u, v));
            }
        }

        // Needs every height in place before it runs
        let mut normals = Vec::with_capacity(count);
        for z in 0..n as i64 {
            for x in 0..n as i64 {
                normals.push(estimate_normal(&heights, x, z));
            }
        }

        let cells = n - 1;
        let mut indices = Vec::with_capacity((6 * cells * cells) as usize);
        for gz in 0..cells {
            for gx in 0..cells {
                let top_left = gz * n + gx;
                let top_right = top_left + 1;
                let bottom_left = (gz + 1) * n + gx;
                let bottom_right = bottom_left + 1;

                indices.extend_from_slice(&[top_left, bottom_left, top_right]);
                indices.extend_from_slice(&[top_right, bottom_left, bottom_right]);
            }
        }

        log::debug!(
            "Built terrain mesh: {} vertices, {} triangles",
            positions.len(),
            indices.len() / 3
        );

        Ok(TerrainMesh {
            positions,
            normals,
            tex_coords,
            indices,
            heights,
        })
    }
}

/// Central-difference normal. Neighbours past the grid edge read as height 0.
fn estimate_normal(heights: &HeightField, x: i64, z: i64) -> Vec3 {
    let height_l = heights.get(x - 1, z);
    let height_r = heights.get(x + 1, z);
    let height_d = heights.get(x, z - 1);
    let height_u = heights.get(x, z + 1);
    Vec3::new(
        height_l - height_r,
        NORMAL_HORIZONTAL_SCALE,
        height_d - height_u,
    )
    .normalized()
}
