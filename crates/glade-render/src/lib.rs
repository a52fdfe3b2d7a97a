//! Glade Render - Scene batching and per-frame render driving
//!
//! This crate turns loaded models, entities and terrains into an ordered
//! stream of draw calls. The GPU itself sits behind the [`GpuLoader`] and
//! [`GpuBackend`] traits; [`HeadlessGpu`] implements both without a device
//! for offscreen runs and tests.

mod backend;
mod batch;
mod camera;
mod entity;
mod gui;
mod headless;
mod model;
pub mod obj;
mod player;
mod renderer;
mod skybox;
mod terrain;

pub use backend::{GpuBackend, GpuLoader, MeshData, SceneUniforms, TextureData, Vertex};
pub use batch::{MaterialGroupBatcher, ModelOptions};
pub use camera::{Camera, CameraInput, FollowTarget, Projection};
pub use entity::{Behavior, Entity, EntityKind};
pub use gui::{update_gamepad, GuiTexture, GUI_QUAD};
pub use headless::{DrawCall, FrameStats, HeadlessGpu};
pub use model::{
    GenericModel, GroupKey, LightingComponent, Material, MaterialGroup, ModelRegistry, RawModel,
    RawModelMaterial, TextureHandle,
};
pub use obj::{load_obj, parse_obj, Shape, ShapeMaterial};
pub use player::{move_player, PlayerMotion, PlayerSettings};
pub use renderer::{MasterRender, RenderSettings, SceneFrameState};
pub use skybox::{Light, SkyBox, SKY_BOX_VERTICES};
pub use terrain::{ground_height, TerrainModel, TerrainTexturePack};
