//! Headless game loop
//!
//! Drives the renderer and the audio allocator one frame at a time, with an
//! autopilot standing in for the keyboard.

use glade_audio::{KiraAudio, MasterPlayer};
use glade_core::Result;
use glade_render::{Camera, HeadlessGpu, MasterRender};
use glade_runtime::{FrameClock, InputState, Key, TimeSource};

use crate::config::EngineConfig;
use crate::world::World;

/// Scripted key presses: always run forward, turn now and then, jump now
/// and then
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Autopilot {
    pub turn_every: u64,
    pub turn_frames: u64,
    pub jump_every: u64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            turn_every: 180,
            turn_frames: 40,
            jump_every: 150,
        }
    }
}

impl Autopilot {
    /// Press and release keys for frame `frame`
    pub fn drive(&self, frame: u64, input: &mut InputState) {
        input.process_key_down(Key::W);

        if self.turn_every > 0 && frame % self.turn_every < self.turn_frames {
            input.process_key_down(Key::D);
        } else {
            input.process_key_up(Key::D);
        }

        if self.jump_every > 0 && frame % self.jump_every == 0 {
            input.process_key_down(Key::Space);
        } else {
            input.process_key_up(Key::Space);
        }
    }
}

/// Totals for a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    pub simulated_seconds: f64,
    pub entity_draws: u64,
    pub player_distance: f32,
    pub max_audio_channels: usize,
}

pub struct App {
    gpu: HeadlessGpu,
    world: World,
    render: MasterRender,
    input: InputState,
    audio: Option<MasterPlayer<KiraAudio>>,
    autopilot: Autopilot,
}

impl App {
    /// Load the world and set up the renderer; `audio` is optional
    pub fn new<F>(config: &EngineConfig, world_loader: F, audio: bool, wall_clock: bool) -> Result<Self>
    where
        F: FnOnce(&mut HeadlessGpu) -> Result<World>,
    {
        let mut gpu = HeadlessGpu::new();
        let world = world_loader(&mut gpu)?;

        let clock = if wall_clock {
            FrameClock::new(TimeSource::Wall)
        } else {
            FrameClock::simulated(1.0 / 60.0)
        };
        let camera = Camera::third_person(config.camera.pitch, config.follow_target());
        let render = MasterRender::new(&mut gpu, config.render_settings(), camera, clock)?;

        let audio = if audio {
            let mut backend = KiraAudio::new(config.audio.sound_threshold);
            let loaded = backend.load_library(&config.sounds_dir());
            log::info!("Loaded {loaded} sounds from '{}'", config.sounds_dir().display());
            Some(MasterPlayer::new(backend, config.audio.sources, config.audio_thresholds())?)
        } else {
            None
        };

        Ok(Self::assemble(gpu, world, render, audio))
    }

    /// Wire already built parts together and hand the scene to the renderer
    pub fn assemble(
        gpu: HeadlessGpu,
        world: World,
        mut render: MasterRender,
        audio: Option<MasterPlayer<KiraAudio>>,
    ) -> Self {
        render.process_player(world.player.clone());
        let mut app = Self {
            gpu,
            world,
            render,
            input: InputState::new(),
            audio,
            autopilot: Autopilot::default(),
        };
        if let Some(audio) = app.audio.as_mut() {
            audio.set_entities(&app.world.entities);
        }
        app
    }

    pub fn with_autopilot(mut self, autopilot: Autopilot) -> Self {
        self.autopilot = autopilot;
        self
    }

    /// Run one frame: input, render, then audio
    pub fn frame(&mut self) -> Result<()> {
        let frame = self.render.clock().frame_count;
        self.autopilot.drive(frame, &mut self.input);

        self.render.start_frame_render();
        self.render.process_terrains(&self.world.terrains);
        self.render.process_entities(&self.world.entities);
        self.render.process_sky_box(self.world.sky_box.clone());
        self.render.process_guis(&self.world.guis);
        self.render
            .render(&mut self.gpu, &self.world.models, &self.world.lights, &mut self.input)?;
        self.render.end_frame_render();
        self.input.end_frame();

        if let Some(player) = self.render.player() {
            self.world.player = player.clone();
        }
        if let Some(audio) = self.audio.as_mut() {
            audio.set_player(self.world.player.clone());
            audio.play();
        }
        Ok(())
    }

    /// Run `frames` frames and report what happened
    pub fn run(&mut self, frames: u64) -> Result<RunSummary> {
        let start = self.world.player.position;
        let mut summary = RunSummary::default();
        for _ in 0..frames {
            self.frame()?;
            summary.entity_draws += u64::from(self.gpu.last_frame().entity_draws);
            if let Some(audio) = &self.audio {
                summary.max_audio_channels = summary.max_audio_channels.max(audio.allocator().pool().assigned_count());
            }
        }
        summary.frames = self.gpu.frames_finished();
        summary.simulated_seconds = self.render.clock().total_time;
        summary.player_distance = self.world.player.position.distance_squared(&start).sqrt();
        log::info!(
            "Ran {} frames ({:.1}s): {} entity draws, player moved {:.1}, at most {} audio channels",
            summary.frames,
            summary.simulated_seconds,
            summary.entity_draws,
            summary.player_distance,
            summary.max_audio_channels
        );
        Ok(summary)
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn gpu(&self) -> &HeadlessGpu {
        &self.gpu
    }

    pub fn audio(&self) -> Option<&MasterPlayer<KiraAudio>> {
        self.audio.as_ref()
    }
}
