//! World generation: terrain, scattered entities, lights, GUIs, sky and
//! player, built once at startup.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glade_core::{Color, GladeError, ModelId, Result, Vec2, Vec3};
use glade_render::{
    load_obj, Behavior, Entity, EntityKind, GenericModel, GpuLoader, GuiTexture, Light, MaterialGroupBatcher,
    ModelOptions, ModelRegistry, PlayerMotion, Shape, SkyBox, TerrainModel, TerrainTexturePack, TextureData,
    TextureHandle,
};
use glade_runtime::Action;
use glade_terrain::{Raster, Terrain};

use crate::config::{EngineConfig, EntityCounts};
use crate::rand::ScatterRng;

const SKY_FACES: [&str; 6] = ["right", "left", "top", "bottom", "back", "front"];

const BUTTON_ZOOM: f32 = 0.07;
const UPPER_BUTTONS: f32 = -0.7;
const MIDDLE_BUTTONS: f32 = -0.8;
const BOTTOM_BUTTONS: f32 = -0.9;

/// How one kind of entity is loaded and scattered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KindPlacement {
    pub kind: EntityKind,
    /// OBJ file stem in the assets directory
    pub model: &'static str,
    /// Upper bound of the random scale
    pub max_scale: f32,
    pub has_transparency: bool,
    pub normals_pointing_up: bool,
    pub count: u32,
}

impl KindPlacement {
    pub fn options(&self) -> ModelOptions {
        ModelOptions {
            has_transparency: self.has_transparency,
            normals_pointing_up: self.normals_pointing_up,
            ..ModelOptions::default()
        }
    }
}

/// Every scattered kind with its configured count
pub fn kind_placements(counts: &EntityCounts) -> [KindPlacement; 6] {
    let placement = |kind, model, max_scale, has_transparency, normals_pointing_up, count| KindPlacement {
        kind,
        model,
        max_scale,
        has_transparency,
        normals_pointing_up,
        count,
    };
    [
        placement(EntityKind::BananaTree, "banana_tree", 1.0, true, false, counts.banana_trees),
        placement(EntityKind::Fern, "fern", 1.0, true, true, counts.ferns),
        placement(EntityKind::Tree, "tree", 10.0, false, false, counts.trees),
        placement(EntityKind::Grass, "grass", 1.0, true, true, counts.grass),
        placement(EntityKind::Flower, "flower", 1.0, true, false, counts.flowers),
        placement(EntityKind::Marble, "marble", 5.0, false, false, counts.marbles),
    ]
}

/// Place `placement.count` instances of `model` at random points of the area,
/// standing on the ground
pub fn scatter_entities<G>(
    model: ModelId,
    placement: &KindPlacement,
    area: ([f32; 2], [f32; 2]),
    rng: &mut ScatterRng,
    ground: G,
) -> Vec<Entity>
where
    G: Fn(f32, f32) -> f32,
{
    let ([x0, x1], [z0, z1]) = area;
    (0..placement.count)
        .map(|_| {
            let x = rng.range(x0, x1);
            let z = rng.range(z0, z1);
            let scale = rng.next_f32() * placement.max_scale;
            Entity::new(model, placement.kind, Vec3::new(x, ground(x, z), z), Vec3::ZERO, scale)
        })
        .collect()
}

/// The sun plus a red, a green and a blue light at the same spot
pub fn lights(config: &EngineConfig) -> Vec<Light> {
    let position = Vec3::from_array(config.render.sun_position);
    let [r, g, b] = config.render.sun_colour;
    vec![
        Light::new(position, Color::new(r, g, b, 1.0)),
        Light::new(position, Color::new(1.0, 0.0, 0.0, 1.0)),
        Light::new(position, Color::new(0.0, 1.0, 0.0, 1.0)),
        Light::new(position, Color::new(0.0, 0.0, 1.0, 1.0)),
    ]
}

/// Engine logo, plus the on-screen pad when enabled
pub fn guis<F>(gamepad: bool, mut texture: F) -> Result<Vec<GuiTexture>>
where
    F: FnMut(&str) -> Result<TextureHandle>,
{
    let mut guis = vec![GuiTexture::new(
        texture("gui/game_engine_logo.png")?,
        Vec2::new(0.0, 0.9),
        Vec2::new(0.1, 0.1),
    )];
    if gamepad {
        let buttons = [
            ("gui/pad_left.png", -0.8, MIDDLE_BUTTONS, Action::TurnLeft),
            ("gui/pad_up.png", -0.7, UPPER_BUTTONS, Action::Forward),
            ("gui/pad_down.png", -0.7, BOTTOM_BUTTONS, Action::Backward),
            ("gui/pad_right.png", -0.6, MIDDLE_BUTTONS, Action::TurnRight),
            ("gui/pad_jump.png", 0.7, BOTTOM_BUTTONS, Action::Jump),
        ];
        for (file, x, y, action) in buttons {
            guis.push(
                GuiTexture::new(texture(file)?, Vec2::new(x, y), Vec2::new(BUTTON_ZOOM, BUTTON_ZOOM))
                    .with_gamepad_key(action),
            );
        }
    }
    Ok(guis)
}

/// Uploads image files once each, relative to the assets directory
pub struct TextureCache {
    root: PathBuf,
    loaded: HashMap<String, Option<TextureHandle>>,
    blank: Option<TextureHandle>,
}

impl TextureCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            loaded: HashMap::new(),
            blank: None,
        }
    }

    /// Upload `name`, or `None` (logged once) when it cannot be read
    pub fn get<L: GpuLoader>(&mut self, loader: &mut L, name: &str, repeat: bool) -> Option<TextureHandle> {
        if let Some(handle) = self.loaded.get(name) {
            return *handle;
        }
        let path = self.root.join(name);
        let handle = match TextureData::from_file(&path).and_then(|data| loader.upload_texture(&data, repeat)) {
            Ok(handle) => Some(handle),
            Err(e) => {
                log::warn!("{e}");
                None
            }
        };
        self.loaded.insert(name.to_string(), handle);
        handle
    }

    /// Like [`get`](Self::get), substituting a white texture
    pub fn get_or_blank<L: GpuLoader>(&mut self, loader: &mut L, name: &str, repeat: bool) -> Result<TextureHandle> {
        if let Some(handle) = self.get(loader, name, repeat) {
            return Ok(handle);
        }
        if let Some(blank) = self.blank {
            return Ok(blank);
        }
        let blank = loader.upload_texture(&TextureData::solid(1, 1, [255; 4]), true)?;
        self.blank = Some(blank);
        Ok(blank)
    }
}

/// Everything the frame loop draws and hears
pub struct World {
    pub models: ModelRegistry,
    pub terrains: Vec<Rc<TerrainModel>>,
    pub entities: Vec<Entity>,
    pub player: Entity,
    pub lights: Vec<Light>,
    pub guis: Vec<GuiTexture>,
    pub sky_box: Option<SkyBox>,
}

impl World {
    /// Build the world from the assets directory.
    ///
    /// The heightmap is required. Missing models, textures and sky faces are
    /// logged and left out.
    pub fn load<L: GpuLoader>(loader: &mut L, config: &EngineConfig, rng: &mut ScatterRng) -> Result<Self> {
        let assets = config.world.assets.clone();
        let mut textures = TextureCache::new(&assets);

        let terrain = Rc::new(load_terrain(loader, config, &mut textures)?);

        let mut models = ModelRegistry::new();
        let mut entities = Vec::new();
        let area = (config.world.scatter_x, config.world.scatter_z);
        for placement in kind_placements(&config.world.counts) {
            if placement.count == 0 {
                continue;
            }
            let shapes = match load_obj(&assets.join(format!("{}.obj", placement.model))) {
                Ok(shapes) => shapes,
                Err(e) => {
                    log::warn!("Skipping {:?}: {}", placement.kind, e);
                    continue;
                }
            };
            let id = register_model(loader, &mut models, &mut textures, placement.model, &shapes, placement.options())?;
            entities.extend(scatter_entities(id, &placement, area, rng, |x, z| {
                terrain.terrain.height_of_terrain(x, z)
            }));
        }

        let player = load_player(loader, &mut models, &mut textures, config)?;
        let guis = guis(config.world.gamepad, |name| textures.get_or_blank(loader, name, false))?;
        let sky_box = load_sky_box(loader, &assets);

        log::info!(
            "World: {} entities of {} models, {} guis, sky box {}",
            entities.len(),
            models.len(),
            guis.len(),
            if sky_box.is_some() { "loaded" } else { "missing" }
        );

        Ok(Self {
            models,
            terrains: vec![terrain],
            entities,
            player,
            lights: lights(config),
            guis,
            sky_box,
        })
    }
}

fn load_terrain<L: GpuLoader>(
    loader: &mut L,
    config: &EngineConfig,
    textures: &mut TextureCache,
) -> Result<TerrainModel> {
    let path = config.heightmap_path();
    let raster = Raster::from_png(&path)
        .map_err(|e| GladeError::TerrainError(format!("heightmap '{}' is required: {}", path.display(), e)))?;
    let terrain = Terrain::generate(&raster, &config.terrain_config(), config.grid_position())?;

    let pack = TerrainTexturePack {
        background: textures.get_or_blank(loader, "terrain.png", true)?,
        r: textures.get_or_blank(loader, "mud.png", true)?,
        g: textures.get_or_blank(loader, "terrain_grass.png", true)?,
        b: textures.get_or_blank(loader, "path.png", true)?,
        blend_map: textures.get_or_blank(loader, "weight_map.png", true)?,
    };
    TerrainModel::load(loader, terrain, pack)
}

fn register_model<L: GpuLoader>(
    loader: &mut L,
    models: &mut ModelRegistry,
    textures: &mut TextureCache,
    name: &str,
    shapes: &[Shape],
    options: ModelOptions,
) -> Result<ModelId> {
    let mut uploads: Vec<(String, Option<TextureHandle>)> = Vec::new();
    for texture in shapes
        .iter()
        .filter_map(|s| s.material.as_ref().and_then(|m| m.diffuse_texture.clone()))
    {
        let handle = textures.get(loader, &texture, false);
        uploads.push((texture, handle));
    }
    let model = MaterialGroupBatcher::load_model(loader, name, shapes, options, |texture| {
        uploads.iter().find(|(name, _)| name == texture).and_then(|(_, h)| *h)
    })?;
    Ok(models.insert(model))
}

fn load_player<L: GpuLoader>(
    loader: &mut L,
    models: &mut ModelRegistry,
    textures: &mut TextureCache,
    config: &EngineConfig,
) -> Result<Entity> {
    let path = config.world.assets.join("player.obj");
    let model = match load_obj(&path) {
        Ok(shapes) => register_model(loader, models, textures, "player", &shapes, ModelOptions::default())?,
        Err(e) => {
            log::warn!("Player model unavailable, the player is invisible: {e}");
            models.insert(GenericModel::new("player", Default::default()))
        }
    };
    Ok(player_entity(model, Vec3::from_array(config.player.start)))
}

/// A player-controlled entity at `position`
pub fn player_entity(model: ModelId, position: Vec3) -> Entity {
    Entity::new(model, EntityKind::Player, position, Vec3::ZERO, 1.0)
        .with_behavior(Behavior::PlayerControlled(PlayerMotion::default()))
}

fn load_sky_box<L: GpuLoader>(loader: &mut L, assets: &Path) -> Option<SkyBox> {
    let mut faces = Vec::with_capacity(SKY_FACES.len());
    for face in SKY_FACES {
        let path = assets.join("sky").join(format!("{face}.png"));
        match TextureData::from_file(&path) {
            Ok(data) => faces.push(data),
            Err(e) => {
                log::warn!("No sky box: {e}");
                return None;
            }
        }
    }
    let faces: [TextureData; 6] = faces.try_into().ok()?;
    SkyBox::load(loader, &faces)
        .map_err(|e| log::warn!("No sky box: {e}"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glade_render::HeadlessGpu;

    #[test]
    fn test_scatter_places_on_ground_within_area() {
        let placement = kind_placements(&EntityCounts::default())[2];
        assert_eq!(placement.kind, EntityKind::Tree);
        let mut rng = ScatterRng::new(3);
        let entities = scatter_entities(ModelId(4), &placement, ([20.0, 220.0], [0.0, 200.0]), &mut rng, |x, z| {
            x * 0.01 + z * 0.02
        });

        assert_eq!(entities.len(), 10);
        for e in &entities {
            assert_eq!(e.model, ModelId(4));
            assert!((20.0..220.0).contains(&e.position.x));
            assert!((0.0..200.0).contains(&e.position.z));
            assert!((e.position.y - (e.position.x * 0.01 + e.position.z * 0.02)).abs() < 1e-5);
            assert!((0.0..10.0).contains(&e.scale));
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let placement = kind_placements(&EntityCounts::default())[0];
        let area = ([0.0, 10.0], [0.0, 10.0]);
        let a = scatter_entities(ModelId(0), &placement, area, &mut ScatterRng::new(9), |_, _| 0.0);
        let b = scatter_entities(ModelId(0), &placement, area, &mut ScatterRng::new(9), |_, _| 0.0);
        let positions = |v: &[Entity]| v.iter().map(|e| e.position).collect::<Vec<_>>();
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn test_kind_placements_follow_counts() {
        let counts = EntityCounts {
            marbles: 2,
            ..EntityCounts::default()
        };
        let placements = kind_placements(&counts);
        let marble = placements.iter().find(|s| s.kind == EntityKind::Marble).unwrap();
        assert_eq!(marble.count, 2);
        assert_eq!(marble.max_scale, 5.0);
        assert!(placements.iter().filter(|s| s.has_transparency).count() >= 4);
    }

    #[test]
    fn test_lights() {
        let lights = lights(&EngineConfig::default());
        assert_eq!(lights.len(), 4);
        assert_eq!(lights[0].position, Vec3::new(10.0, 100.0, 10.0));
        assert_eq!(lights[0].colour, Color::WHITE);
    }

    #[test]
    fn test_gamepad_guis() {
        let mut next = 0;
        let plain = guis(false, |_| {
            next += 1;
            Ok(TextureHandle(next))
        })
        .unwrap();
        assert_eq!(plain.len(), 1);
        assert!(plain[0].gamepad_key.is_none());

        let pad = guis(true, |_| Ok(TextureHandle(1))).unwrap();
        assert_eq!(pad.len(), 6);
        let bound: Vec<Action> = pad.iter().filter_map(|g| g.gamepad_key).collect();
        for action in Action::ALL {
            assert!(bound.contains(&action));
        }
    }

    #[test]
    fn test_texture_cache_falls_back_to_one_blank() {
        let mut gpu = HeadlessGpu::new();
        let mut cache = TextureCache::new("/nonexistent");
        let a = cache.get_or_blank(&mut gpu, "mud.png", true).unwrap();
        let b = cache.get_or_blank(&mut gpu, "path.png", true).unwrap();
        assert_eq!(a, b);
        assert_eq!(gpu.textures_uploaded(), 1);
        assert_eq!(cache.get(&mut gpu, "mud.png", true), None);
    }

    #[test]
    fn test_missing_heightmap_is_fatal() {
        let mut gpu = HeadlessGpu::new();
        let mut config = EngineConfig::default();
        config.world.assets = PathBuf::from("/nonexistent");
        assert!(World::load(&mut gpu, &config, &mut ScatterRng::new(1)).is_err());
    }
}
