//! Audio capability interface

use std::fmt;

use glade_core::{Result, Vec3};

/// Handle of one backend playback channel
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct SourceId(pub u32);

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Every sound the world can make
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum SoundEffect {
    Bounce,
    BreakingWood,
    Falcon,
    Footsteps,
    Wind,
}

impl SoundEffect {
    pub const ALL: [SoundEffect; 5] = [
        SoundEffect::Bounce,
        SoundEffect::BreakingWood,
        SoundEffect::Falcon,
        SoundEffect::Footsteps,
        SoundEffect::Wind,
    ];

    /// File name without extension inside the sounds directory
    pub fn stem(self) -> &'static str {
        match self {
            SoundEffect::Bounce => "bounce",
            SoundEffect::BreakingWood => "breaking wood",
            SoundEffect::Falcon => "falcon",
            SoundEffect::Footsteps => "footsteps",
            SoundEffect::Wind => "wind",
        }
    }
}

/// A positional audio device with a fixed set of channels.
///
/// A channel remembers the last sound started on it until it is stopped,
/// even after playback has finished on its own. Loop, pitch and volume set
/// before `play` apply to that playback.
pub trait AudioBackend {
    /// Create `count` channels
    fn allocate_sources(&mut self, count: usize) -> Result<Vec<SourceId>>;

    /// Move the listener; its velocity is always zero
    fn position_listener(&mut self, position: Vec3);

    fn has_sound(&self, sound: SoundEffect) -> bool;

    /// Stop whatever the channel plays and start `sound` from the beginning
    fn play(&mut self, source: SourceId, sound: SoundEffect);

    fn pause(&mut self, source: SourceId);

    /// Continue a paused channel from where it stopped
    fn resume(&mut self, source: SourceId);

    /// Stop playback and forget the loaded sound
    fn stop(&mut self, source: SourceId);

    fn set_position(&mut self, source: SourceId, position: Vec3);

    fn set_pitch(&mut self, source: SourceId, pitch: f32);

    fn set_volume(&mut self, source: SourceId, volume: f32);

    fn set_loop(&mut self, source: SourceId, looping: bool);

    fn is_playing(&self, source: SourceId) -> bool;

    fn is_paused(&self, source: SourceId) -> bool;

    /// Last sound started on the channel and not stopped since
    fn loaded_sound(&self, source: SourceId) -> Option<SoundEffect>;
}
