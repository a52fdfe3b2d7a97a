//! Sky box geometry and scene lights

use glade_core::{Color, Result, Vec3};

use crate::backend::{GpuLoader, TextureData};
use crate::model::{RawModel, TextureHandle};

const SIZE: f32 = 500.0;

/// Cube around the camera, 12 triangles as bare positions
#[rustfmt::skip]
pub const SKY_BOX_VERTICES: [f32; 108] = [
    -SIZE,  SIZE, -SIZE,  -SIZE, -SIZE, -SIZE,   SIZE, -SIZE, -SIZE,
     SIZE, -SIZE, -SIZE,   SIZE,  SIZE, -SIZE,  -SIZE,  SIZE, -SIZE,

    -SIZE, -SIZE,  SIZE,  -SIZE, -SIZE, -SIZE,  -SIZE,  SIZE, -SIZE,
    -SIZE,  SIZE, -SIZE,  -SIZE,  SIZE,  SIZE,  -SIZE, -SIZE,  SIZE,

     SIZE, -SIZE, -SIZE,   SIZE, -SIZE,  SIZE,   SIZE,  SIZE,  SIZE,
     SIZE,  SIZE,  SIZE,   SIZE,  SIZE, -SIZE,   SIZE, -SIZE, -SIZE,

    -SIZE, -SIZE,  SIZE,  -SIZE,  SIZE,  SIZE,   SIZE,  SIZE,  SIZE,
     SIZE,  SIZE,  SIZE,   SIZE, -SIZE,  SIZE,  -SIZE, -SIZE,  SIZE,

    -SIZE,  SIZE, -SIZE,   SIZE,  SIZE, -SIZE,   SIZE,  SIZE,  SIZE,
     SIZE,  SIZE,  SIZE,  -SIZE,  SIZE,  SIZE,  -SIZE,  SIZE, -SIZE,

    -SIZE, -SIZE, -SIZE,  -SIZE, -SIZE,  SIZE,   SIZE, -SIZE, -SIZE,
     SIZE, -SIZE, -SIZE,  -SIZE, -SIZE,  SIZE,   SIZE, -SIZE,  SIZE,
];

/// Cube-mapped background drawn around the camera
#[derive(Debug, Clone, PartialEq)]
pub struct SkyBox {
    pub model: RawModel,
    pub texture: TextureHandle,
}

impl SkyBox {
    /// Upload the cube and its six faces (right, left, top, bottom, back, front)
    pub fn load<L: GpuLoader>(loader: &mut L, faces: &[TextureData; 6]) -> Result<Self> {
        let model = loader.upload_positions_3d(&SKY_BOX_VERTICES)?;
        let texture = loader.upload_cube_map(faces)?;
        Ok(Self { model, texture })
    }
}

/// A point light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub position: Vec3,
    pub colour: Color,
}

impl Light {
    pub fn new(position: Vec3, colour: Color) -> Self {
        Self { position, colour }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::headless::HeadlessGpu;

    #[test]
    fn test_sky_box_is_a_closed_cube() {
        assert_eq!(SKY_BOX_VERTICES.len() / 3, 36);
        assert!(SKY_BOX_VERTICES.iter().all(|c| c.abs() == SIZE));
    }

    #[test]
    fn test_sky_box_load_uploads_cube_and_faces() {
        let mut gpu = HeadlessGpu::new();
        let faces: [TextureData; 6] = std::array::from_fn(|_| TextureData::solid(2, 2, [10, 20, 30, 255]));
        let sky_box = SkyBox::load(&mut gpu, &faces).unwrap();
        assert_eq!(sky_box.model.vertex_count, 36);
        assert_eq!(gpu.textures_uploaded(), 1);
    }
}
