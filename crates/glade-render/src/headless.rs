//! Headless GPU backend for offscreen runs and tests

use glade_core::{Color, GladeError, Result, Vec2};

use crate::backend::{GpuBackend, GpuLoader, MeshData, SceneUniforms, TextureData};
use crate::gui::GuiTexture;
use crate::model::{Material, RawModel, TextureHandle};
use crate::skybox::SkyBox;
use crate::terrain::TerrainModel;

/// One recorded draw, in submission order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DrawCall {
    Terrain(RawModel),
    Entity(RawModel),
    SkyBox(RawModel),
    Gui(TextureHandle),
}

/// Counters for a single frame
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameStats {
    pub model_binds: u32,
    pub entity_draws: u32,
    pub terrain_draws: u32,
    pub sky_box_draws: u32,
    pub gui_draws: u32,
    pub culling_toggles: u32,
    /// Lights loaded for the frame
    pub lights: usize,
    pub calls: Vec<DrawCall>,
}

/// A GPU that validates and counts instead of drawing.
///
/// Hands out sequential handles and keeps statistics of the last
/// finished frame.
#[derive(Default)]
pub struct HeadlessGpu {
    next_handle: u32,
    meshes_uploaded: usize,
    textures_uploaded: usize,
    bound: Option<RawModel>,
    culling: bool,
    in_frame: bool,
    frame: FrameStats,
    last_frame: FrameStats,
    frames_finished: u64,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_handle(&mut self) -> u32 {
        self.next_handle += 1;
        self.next_handle
    }

    pub fn meshes_uploaded(&self) -> usize {
        self.meshes_uploaded
    }

    pub fn textures_uploaded(&self) -> usize {
        self.textures_uploaded
    }

    /// Statistics of the most recently finished frame
    pub fn last_frame(&self) -> &FrameStats {
        &self.last_frame
    }

    pub fn frames_finished(&self) -> u64 {
        self.frames_finished
    }

    pub fn culling_enabled(&self) -> bool {
        self.culling
    }
}

impl GpuLoader for HeadlessGpu {
    fn upload_mesh(&mut self, mesh: &MeshData) -> Result<RawModel> {
        if mesh.index_count() % 3 != 0 {
            return Err(GladeError::RenderError(format!(
                "mesh has {} indices, not a triangle list",
                mesh.index_count()
            )));
        }
        self.meshes_uploaded += 1;
        log::trace!(
            "upload_mesh: {} vertices ({} bytes), {} indices",
            mesh.vertex_count(),
            mesh.vertex_bytes().len(),
            mesh.index_count()
        );
        Ok(RawModel {
            id: self.next_handle(),
            vertex_count: mesh.index_count() as u32,
        })
    }

    fn upload_positions_2d(&mut self, positions: &[f32]) -> Result<RawModel> {
        if positions.len() % 2 != 0 {
            return Err(GladeError::RenderError("odd 2D position array".into()));
        }
        self.meshes_uploaded += 1;
        Ok(RawModel {
            id: self.next_handle(),
            vertex_count: (positions.len() / 2) as u32,
        })
    }

    fn upload_positions_3d(&mut self, positions: &[f32]) -> Result<RawModel> {
        if positions.len() % 3 != 0 {
            return Err(GladeError::RenderError(
                "3D position array is not a multiple of 3".into(),
            ));
        }
        self.meshes_uploaded += 1;
        Ok(RawModel {
            id: self.next_handle(),
            vertex_count: (positions.len() / 3) as u32,
        })
    }

    fn upload_texture(&mut self, texture: &TextureData, _repeat: bool) -> Result<TextureHandle> {
        let expected = (texture.width * texture.height * 4) as usize;
        if texture.pixels.len() != expected {
            return Err(GladeError::DimensionMismatch {
                expected,
                got: texture.pixels.len(),
            });
        }
        self.textures_uploaded += 1;
        Ok(TextureHandle(self.next_handle()))
    }

    fn upload_cube_map(&mut self, faces: &[TextureData; 6]) -> Result<TextureHandle> {
        let (width, height) = (faces[0].width, faces[0].height);
        if faces.iter().any(|f| f.width != width || f.height != height) {
            return Err(GladeError::RenderError(
                "cube map faces differ in size".into(),
            ));
        }
        self.textures_uploaded += 1;
        Ok(TextureHandle(self.next_handle()))
    }
}

impl GpuBackend for HeadlessGpu {
    fn prepare(&mut self, _clear_colour: Color) {
        self.frame = FrameStats::default();
        self.bound = None;
        self.in_frame = true;
    }

    fn load_scene(&mut self, scene: &SceneUniforms<'_>) {
        self.frame.lights = scene.lights.len();
    }

    fn bind_model(&mut self, model: &RawModel, _material: &Material) {
        self.bound = Some(*model);
        self.frame.model_binds += 1;
    }

    fn set_culling(&mut self, enabled: bool) {
        if self.culling != enabled {
            self.culling = enabled;
            self.frame.culling_toggles += 1;
        }
    }

    fn draw_entity(&mut self, _transform: &glam::Mat4, _texture_offset: Vec2) {
        debug_assert!(self.in_frame, "draw outside of a frame");
        match self.bound {
            Some(model) => {
                self.frame.entity_draws += 1;
                self.frame.calls.push(DrawCall::Entity(model));
            }
            None => log::warn!("draw_entity with no model bound"),
        }
    }

    fn draw_terrain(&mut self, terrain: &TerrainModel, _transform: &glam::Mat4) {
        self.frame.terrain_draws += 1;
        self.frame.calls.push(DrawCall::Terrain(terrain.model));
    }

    fn draw_sky_box(&mut self, sky_box: &SkyBox) {
        self.frame.sky_box_draws += 1;
        self.frame.calls.push(DrawCall::SkyBox(sky_box.model));
    }

    fn draw_gui(&mut self, _quad: &RawModel, gui: &GuiTexture) {
        self.frame.gui_draws += 1;
        self.frame.calls.push(DrawCall::Gui(gui.texture));
    }

    fn finish(&mut self) {
        self.in_frame = false;
        self.bound = None;
        self.frames_finished += 1;
        self.last_frame = std::mem::take(&mut self.frame);
    }
}
