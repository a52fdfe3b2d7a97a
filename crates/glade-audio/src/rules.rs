//! What each kind of entity sounds like

use std::collections::HashMap;

use glade_render::EntityKind;

use crate::backend::SoundEffect;

/// When a crash sound may start on a channel
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CrashGate {
    /// Start unless the same sound is already playing
    Interrupt,
    /// Start only on an idle channel with nothing loaded
    WhenIdle,
}

impl CrashGate {
    pub fn allows(self, sound: SoundEffect, playing: bool, loaded: Option<SoundEffect>) -> bool {
        match self {
            CrashGate::Interrupt => !playing || loaded != Some(sound),
            CrashGate::WhenIdle => !playing && loaded.is_none(),
        }
    }
}

/// One-shot sound played when the player runs into an entity
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CrashRule {
    pub sound: SoundEffect,
    pub gate: CrashGate,
}

/// Audio behaviour of one entity kind
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AudioRule {
    pub crash: Option<CrashRule>,
    /// Looping sound while the player is near but not touching
    pub ambient: Option<SoundEffect>,
}

impl AudioRule {
    pub const SILENT: AudioRule = AudioRule {
        crash: None,
        ambient: None,
    };
}

/// Lookup table from entity kind to its [`AudioRule`]
#[derive(Clone, Debug)]
pub struct AudioRules {
    rules: HashMap<EntityKind, AudioRule>,
}

impl Default for AudioRules {
    /// Trees call like falcons and crack when hit; marbles crack once
    fn default() -> Self {
        let mut rules = Self::empty();
        rules.set(
            EntityKind::Tree,
            AudioRule {
                crash: Some(CrashRule {
                    sound: SoundEffect::BreakingWood,
                    gate: CrashGate::Interrupt,
                }),
                ambient: Some(SoundEffect::Falcon),
            },
        );
        rules.set(
            EntityKind::Marble,
            AudioRule {
                crash: Some(CrashRule {
                    sound: SoundEffect::BreakingWood,
                    gate: CrashGate::WhenIdle,
                }),
                ambient: None,
            },
        );
        rules
    }
}

impl AudioRules {
    /// Every kind silent
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    pub fn set(&mut self, kind: EntityKind, rule: AudioRule) {
        self.rules.insert(kind, rule);
    }

    pub fn get(&self, kind: EntityKind) -> AudioRule {
        self.rules.get(&kind).copied().unwrap_or(AudioRule::SILENT)
    }
}
