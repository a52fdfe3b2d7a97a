//! Glade Audio - Proximity audio (Kira backend)
//!
//! Provides positional audio for the Glade engine:
//! - `AudioBackend` - channel-level playback interface
//! - `KiraAudio` - Kira AudioManager implementation, silent without a device
//! - `ProximityAudioAllocator` - lends a fixed channel pool to nearby entities
//! - `MasterPlayer` - per-frame entry point driven by the game loop

pub mod allocator;
pub mod backend;
pub mod engine;
pub mod pool;
pub mod rules;
#[cfg(test)]
mod scripted;

pub use allocator::{AudioThresholds, ProximityAudioAllocator};
pub use backend::{AudioBackend, SoundEffect, SourceId};
pub use engine::KiraAudio;
pub use pool::AudioChannelPool;
pub use rules::{AudioRule, AudioRules, CrashGate, CrashRule};

use glade_core::Result;
use glade_render::Entity;

/// Plays every sound of the scene once per frame
pub struct MasterPlayer<B: AudioBackend> {
    backend: B,
    allocator: ProximityAudioAllocator,
    entities: Vec<Entity>,
    player: Option<Entity>,
}

impl<B: AudioBackend> MasterPlayer<B> {
    /// Allocate `sources` channels from `backend`; one of them is kept for
    /// the player
    pub fn new(mut backend: B, sources: usize, thresholds: AudioThresholds) -> Result<Self> {
        let ids = backend.allocate_sources(sources)?;
        Ok(Self {
            backend,
            allocator: ProximityAudioAllocator::new(ids, thresholds),
            entities: Vec::new(),
            player: None,
        })
    }

    pub fn with_rules(mut self, rules: AudioRules) -> Self {
        self.allocator = self.allocator.with_rules(rules);
        self
    }

    /// Replace the entities that may produce sound
    pub fn set_entities(&mut self, entities: &[Entity]) {
        self.entities.clear();
        self.entities.extend_from_slice(entities);
    }

    /// Set the player, who is also the listener
    pub fn set_player(&mut self, player: Entity) {
        self.player = Some(player);
    }

    /// Play one frame; does nothing until a player is set
    pub fn play(&mut self) {
        let Some(player) = &self.player else {
            return;
        };
        self.allocator.update(&mut self.backend, player, &self.entities);
    }

    pub fn allocator(&self) -> &ProximityAudioAllocator {
        &self.allocator
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}
