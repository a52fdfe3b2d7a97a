//! Placed terrain tiles and ground-height queries

use glade_core::{Result, Vec3};

use crate::heightmap::{HeightField, HeightSampler, Raster};
use crate::mesh::{TerrainMesh, TerrainMeshBuilder};

/// Configuration for generating one terrain tile
#[derive(Debug, Clone, PartialEq)]
pub struct TerrainConfig {
    /// World-space side length of the tile
    pub size: f32,
    /// Vertices per side; the heightmap must match it exactly
    pub vertex_count: u32,
    /// Altitude of intensity 0
    pub min_height: f32,
    /// Altitude of the maximum intensity
    pub max_height: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 500.0,
            vertex_count: 128,
            min_height: -40.0,
            max_height: 40.0,
        }
    }
}

/// A terrain tile placed in the world
#[derive(Debug, Clone)]
pub struct Terrain {
    /// World position of the tile's `(0, 0)` corner
    pub origin: Vec3,
    /// Side length in world units
    pub size: f32,
    /// The tile geometry
    pub mesh: TerrainMesh,
}

impl Terrain {
    /// Generate a tile from a heightmap raster.
    ///
    /// `grid_position` is measured in tiles, so the world origin is
    /// `grid_position * size`.
    pub fn generate(raster: &Raster, config: &TerrainConfig, grid_position: Vec3) -> Result<Self> {
        let sampler = HeightSampler::new(config.min_height, config.max_height);
        let heights = HeightField::from_raster(raster, &sampler, config.vertex_count)?;
        Self::from_heights(heights, config, grid_position)
    }

    /// Generate a tile from precomputed heights
    pub fn from_heights(heights: HeightField, config: &TerrainConfig, grid_position: Vec3) -> Result<Self> {
        let mesh = TerrainMeshBuilder::build(heights, config.size, config.vertex_count)?;
        let origin = grid_position * config.size;

        log::info!(
            "Generated {}x{} terrain at ({:.1}, {:.1}, {:.1})",
            config.vertex_count,
            config.vertex_count,
            origin.x,
            origin.y,
            origin.z
        );

        Ok(Self {
            origin,
            size: config.size,
            mesh,
        })
    }

    /// Ground height under world position `(world_x, world_z)`.
    ///
    /// Interpolates across the triangle of the grid cell containing the
    /// point. Positions off the tile return 0.
    pub fn height_of_terrain(&self, world_x: f32, world_z: f32) -> f32 {
        let terrain_x = world_x - self.origin.x;
        let terrain_z = world_z - self.origin.z;

        let heights = self.mesh.heights();
        let cells = heights.size() - 1;
        let square = self.size / cells as f32;

        let grid_x = (terrain_x / square).floor();
        let grid_z = (terrain_z / square).floor();
        if grid_x < 0.0 || grid_z < 0.0 || grid_x >= cells as f32 || grid_z >= cells as f32 {
            return 0.0;
        }
        let gx = grid_x as i64;
        let gz = grid_z as i64;

        let x_coord = (terrain_x % square) / square;
        let z_coord = (terrain_z % square) / square;

        if x_coord <= 1.0 - z_coord {
            barycentric(
                Vec3::new(0.0, heights.get(gx, gz), 0.0),
                Vec3::new(1.0, heights.get(gx + 1, gz), 0.0),
                Vec3::new(0.0, heights.get(gx, gz + 1), 1.0),
                x_coord,
                z_coord,
            )
        } else {
            barycentric(
                Vec3::new(1.0, heights.get(gx + 1, gz), 0.0),
                Vec3::new(1.0, heights.get(gx + 1, gz + 1), 1.0),
                Vec3::new(0.0, heights.get(gx, gz + 1), 1.0),
                x_coord,
                z_coord,
            )
        }
    }
}

/// Interpolate the `y` of triangle `(p1, p2, p3)` at `(x, z)`
fn barycentric(p1: Vec3, p2: Vec3, p3: Vec3, x: f32, z: f32) -> f32 {
    let det = (p2.z - p3.z) * (p1.x - p3.x) + (p3.x - p2.x) * (p1.z - p3.z);
    let l1 = ((p2.z - p3.z) * (x - p3.x) + (p3.x - p2.x) * (z - p3.z)) / det;
    let l2 = ((p3.z - p1.z) * (x - p3.x) + (p1.x - p3.x) * (z - p3.z)) / det;
    let l3 = 1.0 - l1 - l2;
    l1 * p1.y + l2 * p2.y + l3 * p3.y
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(n: u32, size: f32) -> TerrainConfig {
        TerrainConfig {
            size,
            vertex_count: n,
            min_height: -40.0,
            max_height: 40.0,
        }
    }

    #[test]
    fn barycentric_hits_corners() {
        let a = Vec3::new(0.0, 1.0, 0.0);
        let b = Vec3::new(1.0, 2.0, 0.0);
        let c = Vec3::new(0.0, 3.0, 1.0);
        assert!((barycentric(a, b, c, 0.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((barycentric(a, b, c, 1.0, 0.0) - 2.0).abs() < 1e-6);
        assert!((barycentric(a, b, c, 0.0, 1.0) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn origin_is_grid_position_times_size() {
        let field = HeightField::from_heights(2, vec![0.0; 4]).unwrap();
        let terrain = Terrain::from_heights(field, &config(2, 500.0), Vec3::new(0.0, 0.0, -0.1)).unwrap();
        assert_eq!(terrain.origin.x, 0.0);
        assert!((terrain.origin.z - -50.0).abs() < 1e-4);
    }

    #[test]
    fn height_interpolates_inside_cells() {
        // Height equals x grid index
        let field = HeightField::from_heights(3, vec![0.0, 1.0, 2.0, 0.0, 1.0, 2.0, 0.0, 1.0, 2.0]).unwrap();
        let terrain = Terrain::from_heights(field, &config(3, 20.0), Vec3::ZERO).unwrap();

        assert!((terrain.height_of_terrain(5.0, 2.0) - 0.5).abs() < 1e-5);
        assert!((terrain.height_of_terrain(15.0, 8.0) - 1.5).abs() < 1e-5);
        assert!((terrain.height_of_terrain(12.5, 17.5) - 1.25).abs() < 1e-5);
    }

    #[test]
    fn height_off_tile_is_zero() {
        let field = HeightField::from_heights(2, vec![7.0; 4]).unwrap();
        let terrain = Terrain::from_heights(field, &config(2, 10.0), Vec3::ZERO).unwrap();
        assert!((terrain.height_of_terrain(5.0, 5.0) - 7.0).abs() < 1e-5);
        assert_eq!(terrain.height_of_terrain(-1.0, 5.0), 0.0);
        assert_eq!(terrain.height_of_terrain(5.0, 10.0), 0.0);
    }

    #[test]
    fn height_respects_offset_origin() {
        let field = HeightField::from_heights(2, vec![3.0; 4]).unwrap();
        let terrain = Terrain::from_heights(field, &config(2, 10.0), Vec3::new(1.0, 0.0, 1.0)).unwrap();
        assert!((terrain.height_of_terrain(15.0, 15.0) - 3.0).abs() < 1e-5);
        assert_eq!(terrain.height_of_terrain(5.0, 5.0), 0.0);
    }
}
