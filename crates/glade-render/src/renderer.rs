//! Per-frame scene aggregation and render driving

use std::collections::HashMap;
use std::rc::Rc;

use glade_core::{Color, ModelId, Result};
use glade_runtime::{FrameClock, InputState};

use crate::backend::{GpuBackend, GpuLoader, SceneUniforms};
use crate::batch::MaterialGroupBatcher;
use crate::camera::{Camera, CameraInput, Projection};
use crate::entity::Entity;
use crate::gui::{update_gamepad, GuiTexture, GUI_QUAD};
use crate::model::{GenericModel, ModelRegistry, RawModel};
use crate::player::{move_player, PlayerSettings};
use crate::skybox::{Light, SkyBox};
use crate::terrain::{ground_height, TerrainModel};

/// Fixed parameters of the renderer
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSettings {
    pub projection: Projection,
    pub sky_colour: Color,
    pub player: PlayerSettings,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            projection: Projection::default(),
            sky_colour: Color::GREY,
            player: PlayerSettings::default(),
        }
    }
}

/// What gets drawn this frame, refilled by the `process_*` calls
#[derive(Default)]
pub struct SceneFrameState {
    pub entities: HashMap<ModelId, Vec<Entity>>,
    pub terrains: Vec<Rc<TerrainModel>>,
    pub guis: Vec<GuiTexture>,
    pub sky_box: Option<SkyBox>,
}

impl SceneFrameState {
    pub fn entity_count(&self) -> usize {
        self.entities.values().map(Vec::len).sum()
    }
}

/// Drives one frame: player physics, camera, then terrain, entities,
/// sky box and GUI draws in that order.
pub struct MasterRender {
    settings: RenderSettings,
    projection_matrix: glam::Mat4,
    state: SceneFrameState,
    player: Option<Entity>,
    camera: Camera,
    clock: FrameClock,
    gui_quad: RawModel,
}

impl MasterRender {
    pub fn new<L: GpuLoader>(loader: &mut L, settings: RenderSettings, camera: Camera, clock: FrameClock) -> Result<Self> {
        let gui_quad = loader.upload_positions_2d(&GUI_QUAD)?;
        Ok(Self {
            projection_matrix: settings.projection.matrix(),
            settings,
            state: SceneFrameState::default(),
            player: None,
            camera,
            clock,
            gui_quad,
        })
    }

    /// Replace the entity batches
    pub fn process_entities(&mut self, entities: &[Entity]) {
        self.state.entities = MaterialGroupBatcher::group_entities_by_model(entities);
    }

    /// Replace the terrain list
    pub fn process_terrains(&mut self, terrains: &[Rc<TerrainModel>]) {
        self.state.terrains.clear();
        self.state.terrains.extend(terrains.iter().cloned());
    }

    /// Replace the GUI list
    pub fn process_guis(&mut self, guis: &[GuiTexture]) {
        self.state.guis.clear();
        self.state.guis.extend_from_slice(guis);
    }

    pub fn process_sky_box(&mut self, sky_box: Option<SkyBox>) {
        self.state.sky_box = sky_box;
    }

    /// Hand the player to the renderer; it is moved every frame
    pub fn process_player(&mut self, player: Entity) {
        self.player = Some(player);
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.as_ref()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn state(&self) -> &SceneFrameState {
        &self.state
    }

    /// Duration of the previous frame in seconds
    pub fn time_to_render(&self) -> f32 {
        self.clock.delta()
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    pub fn start_frame_render(&mut self) {
        self.clock.start_frame();
    }

    pub fn end_frame_render(&mut self) {
        self.clock.end_frame();
    }

    /// Ground height under world `(x, z)` across the current terrains
    pub fn ground_height(&self, x: f32, z: f32) -> f32 {
        ground_height_rc(&self.state.terrains, x, z)
    }

    /// Render one frame
    pub fn render<G: GpuBackend>(
        &mut self,
        gpu: &mut G,
        models: &ModelRegistry,
        lights: &[Light],
        input: &mut InputState,
    ) -> Result<()> {
        gpu.prepare(self.settings.sky_colour);

        update_gamepad(&self.state.guis, input);
        self.update_player(input);
        self.update_camera(input);

        gpu.load_scene(&SceneUniforms {
            projection: self.projection_matrix,
            view: self.camera.view_matrix(),
            sky_colour: self.settings.sky_colour,
            lights,
        });

        for terrain in &self.state.terrains {
            gpu.draw_terrain(terrain, &terrain.transformation_matrix());
        }

        for (model_id, batch) in &self.state.entities {
            let model = models.require(*model_id)?;
            render_batch(gpu, model, batch);
        }
        if let Some(player) = &self.player {
            let model = models.require(player.model)?;
            render_batch(gpu, model, std::slice::from_ref(player));
        }

        if let Some(sky_box) = &self.state.sky_box {
            gpu.draw_sky_box(sky_box);
        }

        for gui in &self.state.guis {
            gpu.draw_gui(&self.gui_quad, gui);
        }

        gpu.finish();

        log::trace!(
            "frame: {} terrains, {} entities in {} batches, {} guis",
            self.state.terrains.len(),
            self.state.entity_count(),
            self.state.entities.len(),
            self.state.guis.len()
        );
        Ok(())
    }

    fn update_player(&mut self, input: &InputState) {
        let dt = self.clock.delta();
        let terrains = &self.state.terrains;
        if let Some(player) = self.player.as_mut() {
            move_player(player, input, &self.settings.player, dt, |x, z| {
                ground_height_rc(terrains, x, z)
            });
        }
    }

    fn update_camera(&mut self, input: &InputState) {
        let terrains = &self.state.terrains;
        if let Some(player) = &self.player {
            self.camera
                .update(player, CameraInput::from_input(input), |x, z| ground_height_rc(terrains, x, z));
        }
    }
}

fn ground_height_rc(terrains: &[Rc<TerrainModel>], x: f32, z: f32) -> f32 {
    ground_height(terrains.iter().map(Rc::as_ref), x, z)
}

/// Bind each part of `model` once and draw every instance with it.
/// Opaque parts are drawn with back-face culling.
fn render_batch<G: GpuBackend>(gpu: &mut G, model: &GenericModel, batch: &[Entity]) {
    let atlas_factor = model.atlas_factor();
    for part in model.parts() {
        let opaque = !part.material.has_transparency;
        if opaque {
            gpu.set_culling(true);
        }
        gpu.bind_model(&part.model, &part.material);
        for entity in batch {
            gpu.draw_entity(&entity.transformation_matrix(), entity.texture_offset(atlas_factor));
        }
        if opaque {
            gpu.set_culling(false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Behavior, EntityKind};
    use crate::headless::{DrawCall, HeadlessGpu};
    use crate::model::{GroupKey, Material, MaterialGroup, RawModelMaterial, TextureHandle};
    use crate::player::PlayerMotion;
    use glade_core::{Vec2, Vec3};
    use glade_runtime::Key;
    use glade_terrain::{HeightField, Terrain, TerrainConfig};
    use std::collections::BTreeMap;

    use crate::terrain::TerrainTexturePack;

    fn single_part_model(gpu: &mut HeadlessGpu, name: &str, transparent: bool) -> GenericModel {
        let model = gpu.upload_positions_3d(&[0.0; 9]).unwrap();
        let mut groups = BTreeMap::new();
        groups.insert(
            GroupKey::new(name, name),
            MaterialGroup {
                parts: vec![RawModelMaterial {
                    model,
                    material: Material {
                        has_transparency: transparent,
                        ..Material::default()
                    },
                }],
            },
        );
        GenericModel::new(name, groups)
    }

    fn flat_terrain(gpu: &mut HeadlessGpu, height: f32) -> Rc<TerrainModel> {
        let config = TerrainConfig {
            size: 100.0,
            vertex_count: 5,
            min_height: 0.0,
            max_height: 1.0,
        };
        let field = HeightField::from_heights(5, vec![height; 25]).unwrap();
        let terrain = Terrain::from_heights(field, &config, Vec3::ZERO).unwrap();
        Rc::new(TerrainModel::load(gpu, terrain, TerrainTexturePack::uniform(TextureHandle(0))).unwrap())
    }

    struct Scene {
        gpu: HeadlessGpu,
        models: ModelRegistry,
        renderer: MasterRender,
        tree: ModelId,
        fern: ModelId,
        player_model: ModelId,
    }

    fn scene() -> Scene {
        let mut gpu = HeadlessGpu::new();
        let mut models = ModelRegistry::new();
        let tree = models.insert(single_part_model(&mut gpu, "tree", false));
        let fern = models.insert(single_part_model(&mut gpu, "fern", true));
        let player_model = models.insert(single_part_model(&mut gpu, "player", false));
        let renderer = MasterRender::new(
            &mut gpu,
            RenderSettings::default(),
            Camera::third_person(20.0, Default::default()),
            FrameClock::simulated(0.1),
        )
        .unwrap();
        Scene {
            gpu,
            models,
            renderer,
            tree,
            fern,
            player_model,
        }
    }

    fn entity(model: ModelId, x: f32) -> Entity {
        Entity::new(model, EntityKind::Tree, Vec3::new(x, 0.0, 10.0), Vec3::ZERO, 1.0)
    }

    #[test]
    fn test_process_calls_replace_contents() {
        let mut s = scene();
        let entities = vec![entity(s.tree, 1.0), entity(s.tree, 2.0), entity(s.fern, 3.0)];
        s.renderer.process_entities(&entities);
        assert_eq!(s.renderer.state().entity_count(), 3);
        assert_eq!(s.renderer.state().entities.len(), 2);

        s.renderer.process_entities(&entities[..1]);
        assert_eq!(s.renderer.state().entity_count(), 1);

        let gui = GuiTexture::new(TextureHandle(3), Vec2::ZERO, Vec2::new(0.1, 0.1));
        s.renderer.process_guis(&[gui.clone(), gui.clone()]);
        s.renderer.process_guis(&[gui]);
        assert_eq!(s.renderer.state().guis.len(), 1);

        let terrain = flat_terrain(&mut s.gpu, 0.0);
        s.renderer.process_terrains(&[terrain.clone(), terrain.clone()]);
        s.renderer.process_terrains(&[terrain]);
        assert_eq!(s.renderer.state().terrains.len(), 1);
    }

    #[test]
    fn test_render_order_is_terrain_entities_sky_gui() {
        let mut s = scene();
        let terrain = flat_terrain(&mut s.gpu, 0.0);
        let faces: [crate::backend::TextureData; 6] =
            std::array::from_fn(|_| crate::backend::TextureData::solid(1, 1, [0; 4]));
        let sky_box = SkyBox::load(&mut s.gpu, &faces).unwrap();

        s.renderer.process_terrains(&[terrain]);
        s.renderer.process_entities(&[entity(s.tree, 1.0), entity(s.tree, 2.0)]);
        s.renderer.process_sky_box(Some(sky_box));
        s.renderer
            .process_guis(&[GuiTexture::new(TextureHandle(9), Vec2::ZERO, Vec2::new(0.1, 0.1))]);

        let mut input = InputState::new();
        s.renderer
            .render(&mut s.gpu, &s.models, &[], &mut input)
            .unwrap();

        let calls = &s.gpu.last_frame().calls;
        let kinds: Vec<u8> = calls
            .iter()
            .map(|c| match c {
                DrawCall::Terrain(_) => 0,
                DrawCall::Entity(_) => 1,
                DrawCall::SkyBox(_) => 2,
                DrawCall::Gui(_) => 3,
            })
            .collect();
        assert_eq!(kinds, vec![0, 1, 1, 2, 3]);
    }

    #[test]
    fn test_batch_binds_once_per_part() {
        let mut s = scene();
        let entities: Vec<Entity> = (0..10).map(|i| entity(s.tree, i as f32)).collect();
        s.renderer.process_entities(&entities);
        s.renderer
            .render(&mut s.gpu, &s.models, &[], &mut InputState::new())
            .unwrap();

        let stats = s.gpu.last_frame();
        assert_eq!(stats.model_binds, 1);
        assert_eq!(stats.entity_draws, 10);
    }

    #[test]
    fn test_culling_only_for_opaque_parts() {
        let mut s = scene();
        s.renderer.process_entities(&[entity(s.fern, 1.0)]);
        s.renderer
            .render(&mut s.gpu, &s.models, &[], &mut InputState::new())
            .unwrap();
        assert_eq!(s.gpu.last_frame().culling_toggles, 0);

        s.renderer.process_entities(&[entity(s.tree, 1.0)]);
        s.renderer
            .render(&mut s.gpu, &s.models, &[], &mut InputState::new())
            .unwrap();
        assert_eq!(s.gpu.last_frame().culling_toggles, 2);
        assert!(!s.gpu.culling_enabled());
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let mut s = scene();
        s.renderer.process_entities(&[entity(ModelId(42), 0.0)]);
        assert!(s
            .renderer
            .render(&mut s.gpu, &s.models, &[], &mut InputState::new())
            .is_err());
    }

    #[test]
    fn test_player_moves_with_measured_dt_and_camera_follows() {
        let mut s = scene();
        let terrain = flat_terrain(&mut s.gpu, 0.5);
        s.renderer.process_terrains(&[terrain]);
        let player = Entity::new(s.player_model, EntityKind::Player, Vec3::new(50.0, 0.0, 50.0), Vec3::ZERO, 1.0)
            .with_behavior(Behavior::PlayerControlled(PlayerMotion::default()));
        s.renderer.process_player(player);

        let mut input = InputState::new();
        input.process_key_down(Key::W);

        // First frame: no measured frame yet, dt is 0
        s.renderer.start_frame_render();
        s.renderer.render(&mut s.gpu, &s.models, &[], &mut input).unwrap();
        s.renderer.end_frame_render();
        assert_eq!(s.renderer.player().unwrap().position.z, 50.0);

        s.renderer.start_frame_render();
        s.renderer.render(&mut s.gpu, &s.models, &[], &mut input).unwrap();
        s.renderer.end_frame_render();

        let player = s.renderer.player().unwrap();
        assert!((player.position.z - 56.0).abs() < 1e-3);
        assert!((player.position.y - 0.5).abs() < 1e-5);
        assert!(s.renderer.camera().position.z < player.position.z);
        assert!(s.renderer.camera().position.y >= s.renderer.ground_height(
            s.renderer.camera().position.x,
            s.renderer.camera().position.z
        ));
        // Player is drawn with the entities
        assert_eq!(s.gpu.last_frame().entity_draws, 1);
    }
}
