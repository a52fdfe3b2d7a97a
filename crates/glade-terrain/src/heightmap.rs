//! Heightmap rasters, height sampling, and the retained height field

use std::path::Path;

use glade_core::{GladeError, Result};

/// A decoded single-channel raster image.
///
/// Each pixel holds a scalar intensity in `0..=max_value`.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// Intensity that maps to the top of the altitude range
    pub max_value: u32,
    /// Row-major intensities
    pixels: Vec<u32>,
}

impl Raster {
    /// Load a heightmap from a PNG file.
    /// Colour images are reduced to luminance; intensities are 16-bit.
    pub fn from_png(path: &Path) -> Result<Self> {
        let img = image::open(path).map_err(|e| {
            GladeError::AssetError(format!(
                "Failed to load heightmap '{}': {}",
                path.display(),
                e
            ))
        })?;

        let gray = img.into_luma16();
        let width = gray.width();
        let height = gray.height();
        let pixels: Vec<u32> = gray.pixels().map(|p| p.0[0] as u32).collect();

        log::debug!(
            "Loaded heightmap '{}' ({}x{})",
            path.display(),
            width,
            height
        );

        Self::from_raw(pixels, width, height, u16::MAX as u32)
    }

    /// Create a raster from raw intensities.
    ///
    /// Fails when the sample count does not match the dimensions or a sample
    /// exceeds `max_value`.
    pub fn from_raw(pixels: Vec<u32>, width: u32, height: u32, max_value: u32) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(GladeError::DimensionMismatch {
                expected,
                got: pixels.len(),
            });
        }
        if max_value == 0 {
            return Err(GladeError::ValidationError(
                "raster max_value must be positive".into(),
            ));
        }
        if let Some(bad) = pixels.iter().find(|p| **p > max_value) {
            return Err(GladeError::ValidationError(format!(
                "raster sample {bad} exceeds max_value {max_value}"
            )));
        }

        Ok(Self {
            width,
            height,
            max_value,
            pixels,
        })
    }

    /// Intensity at `(x, y)`. Panics when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> u32 {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) outside {}x{} raster",
            self.width,
            self.height
        );
        self.pixels[y as usize * self.width as usize + x as usize]
    }
}

/// Maps raster intensities linearly onto an altitude range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeightSampler {
    pub min_height: f32,
    pub max_height: f32,
}

impl HeightSampler {
    pub fn new(min_height: f32, max_height: f32) -> Self {
        Self {
            min_height,
            max_height,
        }
    }

    /// Altitude of the pixel at `(x, y)`.
    ///
    /// Intensity 0 maps to `min_height`, `max_value` maps to `max_height`.
    /// Coordinates must lie inside the raster.
    pub fn height(&self, raster: &Raster, x: u32, y: u32) -> f32 {
        let normalized = raster.pixel(x, y) as f32 / raster.max_value as f32;
        normalized * (self.max_height - self.min_height) + self.min_height
    }
}

/// Square grid of altitudes, one per terrain vertex.
///
/// Immutable after construction. Lookups outside the grid return 0.
#[derive(Debug, Clone, PartialEq)]
pub struct HeightField {
    size: u32,
    /// Row-major by z: index is `z * size + x`
    heights: Vec<f32>,
}

impl HeightField {
    /// Sample every pixel of a square raster.
    ///
    /// The raster must be exactly `vertex_count` pixels on each side.
    pub fn from_raster(raster: &Raster, sampler: &HeightSampler, vertex_count: u32) -> Result<Self> {
        if raster.width != vertex_count || raster.height != vertex_count {
            return Err(GladeError::TerrainError(format!(
                "heightmap is {}x{} but the terrain needs {vertex_count}x{vertex_count} samples",
                raster.width, raster.height
            )));
        }

        let mut heights = Vec::with_capacity(vertex_count as usize * vertex_count as usize);
        for z in 0..vertex_count {
            for x in 0..vertex_count {
                heights.push(sampler.height(raster, x, z));
            }
        }

        Ok(Self {
            size: vertex_count,
            heights,
        })
    }

    /// Build a field from precomputed altitudes (row-major by z)
    pub fn from_heights(size: u32, heights: Vec<f32>) -> Result<Self> {
        let expected = size as usize * size as usize;
        if heights.len() != expected {
            return Err(GladeError::DimensionMismatch {
                expected,
                got: heights.len(),
            });
        }
        Ok(Self { size, heights })
    }

    /// Samples per side
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Altitude at grid coordinate `(x, z)`, or 0 outside the grid
    pub fn get(&self, x: i64, z: i64) -> f32 {
        let n = self.size as i64;
        if x < 0 || x >= n || z < 0 || z >= n {
            return 0.0;
        }
        self.heights[(z * n + x) as usize]
    }
}
