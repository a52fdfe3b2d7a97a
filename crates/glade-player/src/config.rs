//! Engine configuration
//!
//! Read from `glade.toml`. Every field has a default, so a missing file or
//! a partial one yields the built-in world.

use std::path::{Path, PathBuf};

use glade_audio::AudioThresholds;
use glade_core::{Color, GladeError, Result, Vec3};
use glade_render::{FollowTarget, PlayerSettings, Projection, RenderSettings};
use glade_terrain::TerrainConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainSection {
    /// Heightmap image, relative to the assets directory
    pub heightmap: PathBuf,
    pub size: f32,
    pub vertex_count: u32,
    pub min_height: f32,
    pub max_height: f32,
    /// Tile position in terrain-grid units
    pub grid_position: [f32; 3],
}

impl Default for TerrainSection {
    fn default() -> Self {
        Self {
            heightmap: PathBuf::from("heightmap.png"),
            size: 500.0,
            vertex_count: 128,
            min_height: -40.0,
            max_height: 40.0,
            grid_position: [0.0, 0.0, -0.1],
        }
    }
}

/// How many of each kind to scatter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EntityCounts {
    pub trees: u32,
    pub banana_trees: u32,
    pub ferns: u32,
    pub grass: u32,
    pub flowers: u32,
    pub marbles: u32,
}

impl Default for EntityCounts {
    fn default() -> Self {
        Self {
            trees: 10,
            banana_trees: 5,
            ferns: 10,
            grass: 10,
            flowers: 20,
            marbles: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldSection {
    pub seed: u32,
    pub assets: PathBuf,
    pub counts: EntityCounts,
    pub scatter_x: [f32; 2],
    pub scatter_z: [f32; 2],
    /// Add the on-screen gamepad buttons
    pub gamepad: bool,
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            seed: 1,
            assets: PathBuf::from("assets"),
            counts: EntityCounts::default(),
            scatter_x: [20.0, 220.0],
            scatter_z: [0.0, 200.0],
            gamepad: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSection {
    pub run_speed: f32,
    pub turn_speed: f32,
    pub gravity: f32,
    pub jump_power: f32,
    pub start: [f32; 3],
}

impl Default for PlayerSection {
    fn default() -> Self {
        let settings = PlayerSettings::default();
        Self {
            run_speed: settings.run_speed,
            turn_speed: settings.turn_speed,
            gravity: settings.gravity,
            jump_power: settings.jump_power,
            start: [20.0, -1.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSection {
    pub distance: f32,
    pub pitch: f32,
    pub angle_around_player: f32,
    pub height_offset: f32,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    pub aspect: f32,
}

impl Default for CameraSection {
    fn default() -> Self {
        let follow = FollowTarget::default();
        let projection = Projection::default();
        Self {
            distance: follow.distance,
            pitch: 20.0,
            angle_around_player: follow.angle_around_player,
            height_offset: follow.height_offset,
            fov: projection.fov,
            near: projection.near,
            far: projection.far,
            aspect: projection.aspect,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSection {
    /// Channels in total, one of them kept for the player
    pub sources: usize,
    pub sound_threshold: f32,
    pub rough_threshold: f32,
    pub crash_threshold: f32,
    /// Sound directory, relative to the assets directory
    pub sounds: PathBuf,
}

impl Default for AudioSection {
    fn default() -> Self {
        let thresholds = AudioThresholds::default();
        Self {
            sources: 32,
            sound_threshold: thresholds.sound,
            rough_threshold: thresholds.rough,
            crash_threshold: thresholds.crash,
            sounds: PathBuf::from("sounds"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderSection {
    pub sky_colour: [f32; 4],
    pub sun_position: [f32; 3],
    pub sun_colour: [f32; 3],
}

impl Default for RenderSection {
    fn default() -> Self {
        Self {
            sky_colour: Color::GREY.to_array(),
            sun_position: [10.0, 100.0, 10.0],
            sun_colour: [1.0, 1.0, 1.0],
        }
    }
}

/// Top-level config file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub terrain: TerrainSection,
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub player: PlayerSection,
    #[serde(default)]
    pub camera: CameraSection,
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub render: RenderSection,
}

impl EngineConfig {
    /// Load from `path`, using the defaults when the file does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::info!("No config at '{}', using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config = Self::parse(&content)?;
        log::debug!("Loaded config from '{}'", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: EngineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.terrain.vertex_count < 2 {
            return Err(GladeError::ValidationError(format!(
                "terrain.vertex_count must be at least 2, got {}",
                self.terrain.vertex_count
            )));
        }
        if self.terrain.size <= 0.0 {
            return Err(GladeError::ValidationError("terrain.size must be positive".into()));
        }
        if self.terrain.min_height > self.terrain.max_height {
            return Err(GladeError::ValidationError(
                "terrain.min_height is above terrain.max_height".into(),
            ));
        }
        let [x0, x1] = self.world.scatter_x;
        let [z0, z1] = self.world.scatter_z;
        if x0 > x1 || z0 > z1 {
            return Err(GladeError::ValidationError("world scatter range is reversed".into()));
        }
        if self.audio.sources == 0 {
            return Err(GladeError::ValidationError("audio.sources must be at least 1".into()));
        }
        Ok(())
    }

    pub fn terrain_config(&self) -> TerrainConfig {
        TerrainConfig {
            size: self.terrain.size,
            vertex_count: self.terrain.vertex_count,
            min_height: self.terrain.min_height,
            max_height: self.terrain.max_height,
        }
    }

    pub fn grid_position(&self) -> Vec3 {
        Vec3::from_array(self.terrain.grid_position)
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            run_speed: self.player.run_speed,
            turn_speed: self.player.turn_speed,
            gravity: self.player.gravity,
            jump_power: self.player.jump_power,
        }
    }

    pub fn follow_target(&self) -> FollowTarget {
        FollowTarget {
            distance: self.camera.distance,
            angle_around_player: self.camera.angle_around_player,
            height_offset: self.camera.height_offset,
        }
    }

    pub fn render_settings(&self) -> RenderSettings {
        let [r, g, b, a] = self.render.sky_colour;
        RenderSettings {
            projection: Projection {
                fov: self.camera.fov,
                aspect: self.camera.aspect,
                near: self.camera.near,
                far: self.camera.far,
            },
            sky_colour: Color::new(r, g, b, a),
            player: self.player_settings(),
        }
    }

    pub fn audio_thresholds(&self) -> AudioThresholds {
        AudioThresholds {
            sound: self.audio.sound_threshold,
            rough: self.audio.rough_threshold,
            crash: self.audio.crash_threshold,
        }
    }

    pub fn sounds_dir(&self) -> PathBuf {
        self.world.assets.join(&self.audio.sounds)
    }

    pub fn heightmap_path(&self) -> PathBuf {
        self.world.assets.join(&self.terrain.heightmap)
    }
}
