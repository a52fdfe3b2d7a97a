//! Deterministic in-memory backend for tests

use std::collections::HashSet;

use glade_core::{Result, Vec3};

use crate::backend::{AudioBackend, SoundEffect, SourceId};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptedChannel {
    pub playing: bool,
    pub paused: bool,
    pub loaded: Option<SoundEffect>,
    pub looping: bool,
    pub pitch: f32,
    pub volume: f32,
    pub position: Vec3,
}

/// Sounds play until [`ScriptedAudio::finish`] ends them
#[derive(Debug, Default)]
pub struct ScriptedAudio {
    pub channels: Vec<ScriptedChannel>,
    pub listener: Vec3,
    /// Every `play` call in order
    pub played: Vec<(SourceId, SoundEffect)>,
    /// Sounds reported as absent from the library
    pub missing: HashSet<SoundEffect>,
}

impl ScriptedAudio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn channel(&self, source: SourceId) -> &ScriptedChannel {
        &self.channels[source.0 as usize]
    }

    fn channel_mut(&mut self, source: SourceId) -> &mut ScriptedChannel {
        &mut self.channels[source.0 as usize]
    }

    /// Let the sound on `source` run out
    pub fn finish(&mut self, source: SourceId) {
        let channel = self.channel_mut(source);
        channel.playing = false;
        channel.paused = false;
    }

    pub fn plays_of(&self, sound: SoundEffect) -> usize {
        self.played.iter().filter(|(_, s)| *s == sound).count()
    }
}

impl AudioBackend for ScriptedAudio {
    fn allocate_sources(&mut self, count: usize) -> Result<Vec<SourceId>> {
        let first = self.channels.len();
        self.channels.resize(first + count, ScriptedChannel::default());
        Ok((first..first + count).map(|i| SourceId(i as u32)).collect())
    }

    fn position_listener(&mut self, position: Vec3) {
        self.listener = position;
    }

    fn has_sound(&self, sound: SoundEffect) -> bool {
        !self.missing.contains(&sound)
    }

    fn play(&mut self, source: SourceId, sound: SoundEffect) {
        self.played.push((source, sound));
        let channel = self.channel_mut(source);
        channel.playing = true;
        channel.paused = false;
        channel.loaded = Some(sound);
    }

    fn pause(&mut self, source: SourceId) {
        let channel = self.channel_mut(source);
        if channel.playing {
            channel.playing = false;
            channel.paused = true;
        }
    }

    fn resume(&mut self, source: SourceId) {
        let channel = self.channel_mut(source);
        if channel.paused {
            channel.playing = true;
            channel.paused = false;
        }
    }

    fn stop(&mut self, source: SourceId) {
        let channel = self.channel_mut(source);
        channel.playing = false;
        channel.paused = false;
        channel.loaded = None;
    }

    fn set_position(&mut self, source: SourceId, position: Vec3) {
        self.channel_mut(source).position = position;
    }

    fn set_pitch(&mut self, source: SourceId, pitch: f32) {
        self.channel_mut(source).pitch = pitch;
    }

    fn set_volume(&mut self, source: SourceId, volume: f32) {
        self.channel_mut(source).volume = volume;
    }

    fn set_loop(&mut self, source: SourceId, looping: bool) {
        self.channel_mut(source).looping = looping;
    }

    fn is_playing(&self, source: SourceId) -> bool {
        self.channel(source).playing
    }

    fn is_paused(&self, source: SourceId) -> bool {
        self.channel(source).paused
    }

    fn loaded_sound(&self, source: SourceId) -> Option<SoundEffect> {
        self.channel(source).loaded
    }
}
