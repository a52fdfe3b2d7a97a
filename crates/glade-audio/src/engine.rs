//! Audio backend wrapping Kira's AudioManager
//!
//! One spatial sub-track per channel, all heard through a single listener.
//! Degrades gracefully when no audio device is available: channels still
//! exist but never report playing.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use glade_core::{GladeError, Result, Vec3};
use kira::listener::ListenerHandle;
use kira::sound::static_sound::{StaticSoundData, StaticSoundHandle};
use kira::sound::PlaybackState;
use kira::track::{SpatialTrackBuilder, SpatialTrackDistances, SpatialTrackHandle};
use kira::{AudioManager, AudioManagerSettings, DefaultBackend, Easing, Tween};

use crate::backend::{AudioBackend, SoundEffect, SourceId};

const SOUND_EXTENSIONS: [&str; 2] = ["ogg", "wav"];

const IMMEDIATE: Tween = Tween {
    start_time: kira::StartTime::Immediate,
    duration: Duration::ZERO,
    easing: Easing::Linear,
};

struct Channel {
    track: Option<SpatialTrackHandle>,
    handle: Option<StaticSoundHandle>,
    sound: Option<SoundEffect>,
    pitch: f64,
    volume: f64,
    looping: bool,
}

impl Channel {
    fn new(track: Option<SpatialTrackHandle>) -> Self {
        Self {
            track,
            handle: None,
            sound: None,
            pitch: 1.0,
            volume: 1.0,
            looping: false,
        }
    }

    fn state(&self) -> PlaybackState {
        self.handle.as_ref().map(|h| h.state()).unwrap_or(PlaybackState::Stopped)
    }
}

/// Kira-backed [`AudioBackend`]
pub struct KiraAudio {
    manager: Option<AudioManager<DefaultBackend>>,
    listener: Option<ListenerHandle>,
    library: HashMap<SoundEffect, StaticSoundData>,
    channels: Vec<Channel>,
    /// Distance over which channels fade out
    max_distance: f32,
}

impl KiraAudio {
    /// Open the default device, falling back to silence without one
    pub fn new(max_distance: f32) -> Self {
        let manager = AudioManager::<DefaultBackend>::new(AudioManagerSettings::default())
            .map_err(|e| log::warn!("Audio: no device available ({e}), running silent"))
            .ok();
        let mut audio = Self {
            manager,
            listener: None,
            library: HashMap::new(),
            channels: Vec::new(),
            max_distance,
        };
        audio.create_listener();
        audio
    }

    /// A backend that never opens a device
    pub fn silent() -> Self {
        Self {
            manager: None,
            listener: None,
            library: HashMap::new(),
            channels: Vec::new(),
            max_distance: 1.0,
        }
    }

    /// Whether audio is actually available
    pub fn is_available(&self) -> bool {
        self.manager.is_some()
    }

    fn create_listener(&mut self) {
        let Some(manager) = &mut self.manager else {
            return;
        };
        match manager.add_listener(glam::Vec3::ZERO, glam::Quat::IDENTITY) {
            Ok(listener) => self.listener = Some(listener),
            Err(e) => {
                log::warn!("Audio: failed to create listener ({e}), running silent");
                self.manager = None;
            }
        }
    }

    /// Load one sound file into the library
    pub fn load_sound(&mut self, sound: SoundEffect, path: &Path) -> Result<()> {
        let data = StaticSoundData::from_file(path)
            .map_err(|e| GladeError::AudioError(format!("Failed to load '{}': {}", path.display(), e)))?;
        self.library.insert(sound, data);
        Ok(())
    }

    /// Load every known sound found in `dir`, returning how many loaded.
    /// Missing or unreadable files are logged and skipped.
    pub fn load_library(&mut self, dir: &Path) -> usize {
        let mut loaded = 0;
        for sound in SoundEffect::ALL {
            let found = SOUND_EXTENSIONS
                .iter()
                .map(|ext| dir.join(format!("{}.{}", sound.stem(), ext)))
                .find(|path| path.exists());
            let Some(path) = found else {
                log::warn!("Sound '{}' not found in '{}'", sound.stem(), dir.display());
                continue;
            };
            match self.load_sound(sound, &path) {
                Ok(()) => loaded += 1,
                Err(e) => log::warn!("{e}"),
            }
        }
        log::info!("Loaded {} of {} sounds", loaded, SoundEffect::ALL.len());
        loaded
    }

    fn create_track(&mut self) -> Option<SpatialTrackHandle> {
        let manager = self.manager.as_mut()?;
        let listener_id = self.listener.as_ref()?.id();
        let builder = SpatialTrackBuilder::new()
            .distances(SpatialTrackDistances {
                min_distance: 1.0,
                max_distance: self.max_distance,
            })
            .attenuation_function(Some(Easing::OutPowf(2.0)));
        manager
            .add_spatial_sub_track(listener_id, glam::Vec3::ZERO, builder)
            .map_err(|e| log::warn!("Audio: failed to create spatial track: {e}"))
            .ok()
    }

    fn channel_mut(&mut self, source: SourceId) -> Option<&mut Channel> {
        self.channels.get_mut(source.0 as usize)
    }

    fn channel(&self, source: SourceId) -> Option<&Channel> {
        self.channels.get(source.0 as usize)
    }
}

impl AudioBackend for KiraAudio {
    fn allocate_sources(&mut self, count: usize) -> Result<Vec<SourceId>> {
        let first = self.channels.len();
        for _ in 0..count {
            let track = self.create_track();
            self.channels.push(Channel::new(track));
        }
        log::debug!("Allocated {} audio channels", count);
        Ok((first..first + count).map(|i| SourceId(i as u32)).collect())
    }

    fn position_listener(&mut self, position: Vec3) {
        if let Some(listener) = &mut self.listener {
            listener.set_position(to_glam_vec3(position), IMMEDIATE);
        }
    }

    fn has_sound(&self, sound: SoundEffect) -> bool {
        self.library.contains_key(&sound)
    }

    fn play(&mut self, source: SourceId, sound: SoundEffect) {
        let data = self.library.get(&sound).cloned();
        let Some(channel) = self.channel_mut(source) else {
            return;
        };
        if let Some(mut old) = channel.handle.take() {
            old.stop(IMMEDIATE);
        }
        channel.sound = Some(sound);

        let (Some(track), Some(data)) = (channel.track.as_mut(), data) else {
            return;
        };
        let mut data = data
            .volume(amplitude_to_db(channel.volume))
            .playback_rate(kira::PlaybackRate(channel.pitch));
        if channel.looping {
            data = data.loop_region(..);
        }
        match track.play(data) {
            Ok(handle) => channel.handle = Some(handle),
            Err(e) => log::warn!("Audio: failed to play '{}' on {}: {}", sound.stem(), source, e),
        }
    }

    fn pause(&mut self, source: SourceId) {
        if let Some(handle) = self.channel_mut(source).and_then(|c| c.handle.as_mut()) {
            handle.pause(IMMEDIATE);
        }
    }

    fn resume(&mut self, source: SourceId) {
        if let Some(handle) = self.channel_mut(source).and_then(|c| c.handle.as_mut()) {
            handle.resume(IMMEDIATE);
        }
    }

    fn stop(&mut self, source: SourceId) {
        if let Some(channel) = self.channel_mut(source) {
            if let Some(mut handle) = channel.handle.take() {
                handle.stop(IMMEDIATE);
            }
            channel.sound = None;
        }
    }

    fn set_position(&mut self, source: SourceId, position: Vec3) {
        if let Some(track) = self.channel_mut(source).and_then(|c| c.track.as_mut()) {
            track.set_position(to_glam_vec3(position), IMMEDIATE);
        }
    }

    fn set_pitch(&mut self, source: SourceId, pitch: f32) {
        if let Some(channel) = self.channel_mut(source) {
            channel.pitch = pitch as f64;
            if let Some(handle) = channel.handle.as_mut() {
                handle.set_playback_rate(kira::PlaybackRate(pitch as f64), IMMEDIATE);
            }
        }
    }

    fn set_volume(&mut self, source: SourceId, volume: f32) {
        if let Some(channel) = self.channel_mut(source) {
            channel.volume = volume as f64;
            if let Some(handle) = channel.handle.as_mut() {
                handle.set_volume(amplitude_to_db(volume as f64), IMMEDIATE);
            }
        }
    }

    fn set_loop(&mut self, source: SourceId, looping: bool) {
        if let Some(channel) = self.channel_mut(source) {
            channel.looping = looping;
        }
    }

    fn is_playing(&self, source: SourceId) -> bool {
        self.channel(source).is_some_and(|c| {
            matches!(
                c.state(),
                PlaybackState::Playing | PlaybackState::Resuming | PlaybackState::WaitingToResume
            )
        })
    }

    fn is_paused(&self, source: SourceId) -> bool {
        self.channel(source)
            .is_some_and(|c| matches!(c.state(), PlaybackState::Paused | PlaybackState::Pausing))
    }

    fn loaded_sound(&self, source: SourceId) -> Option<SoundEffect> {
        self.channel(source).and_then(|c| c.sound)
    }
}

/// Convert Glade Vec3 to glam Vec3
fn to_glam_vec3(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}

/// Convert linear amplitude (0.0–2.0) to decibels
fn amplitude_to_db(amplitude: f64) -> kira::Decibels {
    if amplitude <= 0.0 {
        kira::Decibels(-60.0) // silence
    } else {
        kira::Decibels((20.0 * (amplitude as f32).log10()).max(-60.0))
    }
}
