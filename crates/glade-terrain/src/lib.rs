//! Glade Terrain - Heightmap-based terrain generation
//!
//! Turns a heightmap raster into a deformed grid mesh with per-vertex
//! normals and answers ground-height queries. Does not depend on
//! glade-render; outputs raw vertex data for the renderer to upload.

pub mod heightmap;
pub mod mesh;
pub mod terrain;

pub use heightmap::{HeightField, HeightSampler, Raster};
pub use mesh::{TerrainMesh, TerrainMeshBuilder};
pub use terrain::{Terrain, TerrainConfig};

#[cfg(test)]
mod tests {
    use super::*;
    use glade_core::Vec3;

    fn flat_raster(n: u32) -> Raster {
        // 32768 / 65536 is exactly one half
        Raster::from_raw(vec![32768; (n * n) as usize], n, n, 65536).unwrap()
    }

    fn config(n: u32) -> TerrainConfig {
        TerrainConfig {
            size: 500.0,
            vertex_count: n,
            min_height: -40.0,
            max_height: 40.0,
        }
    }

    #[test]
    fn flat_heightmap_generates_flat_mesh() {
        let terrain = Terrain::generate(&flat_raster(4), &config(4), Vec3::ZERO).unwrap();
        let mesh = &terrain.mesh;

        assert_eq!(mesh.positions.len(), 16);
        assert_eq!(mesh.indices.len(), 54);
        assert_eq!(&mesh.indices[0..3], &[0, 4, 1]);

        for p in &mesh.positions {
            assert!(p.y.abs() < 1e-5, "height {} is not mid-range", p.y);
        }
        for n in &mesh.normals {
            assert!((n.x).abs() < 1e-6);
            assert!((n.y - 1.0).abs() < 1e-6);
            assert!((n.z).abs() < 1e-6);
        }
        assert!((mesh.positions[15].x - 500.0).abs() < 1e-4);
        assert!((mesh.positions[15].z - 500.0).abs() < 1e-4);
    }

    #[test]
    fn vertex_and_index_counts_for_any_size() {
        for n in [2u32, 3, 5, 8, 17] {
            let field = HeightField::from_heights(n, vec![1.0; (n * n) as usize]).unwrap();
            let mesh = TerrainMeshBuilder::build(field, 100.0, n).unwrap();
            assert_eq!(mesh.positions.len(), (n * n) as usize);
            assert_eq!(mesh.normals.len(), (n * n) as usize);
            assert_eq!(mesh.tex_coords.len(), (n * n) as usize);
            assert_eq!(mesh.indices.len(), (6 * (n - 1) * (n - 1)) as usize);
            assert!(mesh.indices.iter().all(|i| *i < n * n));
        }
    }

    #[test]
    fn sampled_heights_stay_in_range() {
        let n = 6u32;
        let pixels: Vec<u32> = (0..n * n).map(|i| (i * 7919) % 256).collect();
        let raster = Raster::from_raw(pixels, n, n, 255).unwrap();
        let sampler = HeightSampler::new(-40.0, 40.0);
        for y in 0..n {
            for x in 0..n {
                let h = sampler.height(&raster, x, y);
                assert!((-40.0..=40.0).contains(&h));
            }
        }
    }

    #[test]
    fn interior_normals_are_unit_length() {
        let n = 7u32;
        let pixels: Vec<u32> = (0..n * n).map(|i| (i * 37 + i * i) % 1000).collect();
        let raster = Raster::from_raw(pixels, n, n, 1000).unwrap();
        let terrain = Terrain::generate(&raster, &config(n), Vec3::ZERO).unwrap();

        for z in 1..n - 1 {
            for x in 1..n - 1 {
                let normal = terrain.mesh.normals[(z * n + x) as usize];
                assert!((normal.length() - 1.0).abs() < 1e-5);
            }
        }
    }

    #[test]
    fn wrong_sized_heightmap_fails_fast() {
        let raster = flat_raster(5);
        assert!(Terrain::generate(&raster, &config(4), Vec3::ZERO).is_err());
    }

    #[test]
    fn ground_query_matches_vertex_heights() {
        let n = 5u32;
        let pixels: Vec<u32> = (0..n * n).map(|i| i * 10).collect();
        let raster = Raster::from_raw(pixels, n, n, 240).unwrap();
        let terrain = Terrain::generate(&raster, &config(n), Vec3::ZERO).unwrap();

        // Interior vertex (2, 1) sits on a cell corner
        let p = terrain.mesh.positions[(n + 2) as usize];
        let h = terrain.height_of_terrain(p.x + 1e-3, p.z + 1e-3);
        assert!((h - p.y).abs() < 0.05);
    }
}
