//! Proximity-driven assignment of audio channels to entities

use std::collections::HashMap;

use glade_core::{EntityId, Result};
use glade_render::Entity;

use crate::backend::{AudioBackend, SoundEffect, SourceId};
use crate::pool::AudioChannelPool;
use crate::rules::AudioRules;

/// Footstep pitch is the player's speed divided by this
const FOOTSTEP_PITCH_DIVISOR: f32 = 30.0;

/// Distances, in world units, that drive channel assignment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AudioThresholds {
    /// Box half-extent within which an entity can be heard
    pub sound: f32,
    /// Box half-extent of the cheap pre-test for a crash
    pub rough: f32,
    /// Compared against the squared distance
    pub crash: f32,
}

impl Default for AudioThresholds {
    fn default() -> Self {
        Self {
            sound: 50.0,
            rough: 10.0,
            crash: 2.0,
        }
    }
}

/// Hands a limited set of audio channels to the entities nearest the player.
///
/// One channel is kept aside for the player's footsteps; the rest form the
/// pool that entities borrow while they are within earshot.
pub struct ProximityAudioAllocator {
    thresholds: AudioThresholds,
    rules: AudioRules,
    player_source: Option<SourceId>,
    pool: AudioChannelPool,
}

impl ProximityAudioAllocator {
    /// The last of `sources` becomes the player channel
    pub fn new(mut sources: Vec<SourceId>, thresholds: AudioThresholds) -> Self {
        let player_source = sources.pop();
        Self {
            thresholds,
            rules: AudioRules::default(),
            player_source,
            pool: AudioChannelPool::new(sources),
        }
    }

    pub fn with_rules(mut self, rules: AudioRules) -> Self {
        self.rules = rules;
        self
    }

    pub fn thresholds(&self) -> &AudioThresholds {
        &self.thresholds
    }

    pub fn pool(&self) -> &AudioChannelPool {
        &self.pool
    }

    pub fn player_source(&self) -> Option<SourceId> {
        self.player_source
    }

    pub fn source_of(&self, entity: EntityId) -> Option<SourceId> {
        self.pool.source_of(entity)
    }

    pub fn check_conservation(&self) -> Result<()> {
        self.pool.check_conservation()
    }

    /// Run one frame of audio for `player` among `entities`
    pub fn update<B: AudioBackend>(&mut self, backend: &mut B, player: &Entity, entities: &[Entity]) {
        self.play_player(backend, player);
        self.assign_sources(backend, player, entities);
        self.play_entities(backend, player, entities);

        debug_assert!(
            self.pool.check_conservation().is_ok(),
            "audio pool lost track of a source"
        );
    }

    fn play_player<B: AudioBackend>(&self, backend: &mut B, player: &Entity) {
        backend.position_listener(player.position);
        let Some(source) = self.player_source else {
            return;
        };

        let speed = player.current_speed();
        if speed == 0.0 {
            if backend.is_playing(source) {
                backend.pause(source);
            }
            return;
        }

        let pitch = speed.abs() / FOOTSTEP_PITCH_DIVISOR;
        if backend.is_paused(source) {
            backend.set_pitch(source, pitch);
            backend.resume(source);
        } else if !backend.is_playing(source) && backend.has_sound(SoundEffect::Footsteps) {
            backend.set_pitch(source, pitch);
            backend.set_volume(source, 1.0);
            backend.set_loop(source, true);
            backend.play(source, SoundEffect::Footsteps);
        }
        backend.set_position(source, player.position);
    }

    fn assign_sources<B: AudioBackend>(&mut self, backend: &mut B, player: &Entity, entities: &[Entity]) {
        // Entities that left the scene give their channel back
        let stale: Vec<EntityId> = self
            .pool
            .assignments()
            .map(|(id, _)| id)
            .filter(|id| !entities.iter().any(|e| e.id == *id))
            .collect();
        for id in stale {
            if let Some(source) = self.pool.reclaim(id) {
                backend.stop(source);
            }
        }

        for entity in entities {
            if player.position.within_box(&entity.position, self.thresholds.sound) {
                if self.pool.assign(entity.id).is_none() {
                    log::trace!("No audio channel left for entity {}", entity.id);
                }
            } else if let Some(source) = self.pool.reclaim(entity.id) {
                backend.stop(source);
            }
        }
    }

    fn play_entities<B: AudioBackend>(&self, backend: &mut B, player: &Entity, entities: &[Entity]) {
        let by_id: HashMap<EntityId, &Entity> = entities.iter().map(|e| (e.id, e)).collect();
        for (id, source) in self.pool.assignments() {
            let Some(entity) = by_id.get(&id) else {
                continue;
            };
            if !self.play_crash(backend, player, entity, source) {
                self.play_ambient(backend, entity, source);
            }
        }
    }

    /// Returns whether the player is touching `entity`
    fn play_crash<B: AudioBackend>(&self, backend: &mut B, player: &Entity, entity: &Entity, source: SourceId) -> bool {
        let touching = player.position.within_box(&entity.position, self.thresholds.rough)
            && player.position.distance_squared(&entity.position) < self.thresholds.crash;
        if !touching {
            return false;
        }

        if let Some(crash) = self.rules.get(entity.kind).crash {
            if crash
                .gate
                .allows(crash.sound, backend.is_playing(source), backend.loaded_sound(source))
            {
                log::debug!("Entity {} crashed, playing '{}'", entity.id, crash.sound.stem());
                start(backend, source, crash.sound, entity, false);
            }
        }
        true
    }

    fn play_ambient<B: AudioBackend>(&self, backend: &mut B, entity: &Entity, source: SourceId) {
        let rule = self.rules.get(entity.kind);
        let Some(ambient) = rule.ambient else {
            return;
        };
        // Let a crash sound ring out
        if rule.crash.is_some_and(|c| backend.loaded_sound(source) == Some(c.sound)) {
            return;
        }
        if !backend.is_playing(source) {
            start(backend, source, ambient, entity, true);
        }
    }
}

fn start<B: AudioBackend>(backend: &mut B, source: SourceId, sound: SoundEffect, entity: &Entity, looping: bool) {
    if !backend.has_sound(sound) {
        log::trace!("Sound '{}' is not loaded, {} stays quiet", sound.stem(), source);
        return;
    }
    backend.set_pitch(source, 1.0);
    backend.set_volume(source, 1.0);
    backend.set_position(source, entity.position);
    backend.set_loop(source, looping);
    backend.play(source, sound);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scripted::ScriptedAudio;
    use glade_core::{ModelId, Vec3};
    use glade_render::{Behavior, EntityKind, PlayerMotion};

    fn setup(sources: usize) -> (ScriptedAudio, ProximityAudioAllocator) {
        let mut audio = ScriptedAudio::new();
        let ids = audio.allocate_sources(sources).unwrap();
        (audio, ProximityAudioAllocator::new(ids, AudioThresholds::default()))
    }

    fn player(speed: f32) -> Entity {
        Entity::new(ModelId(0), EntityKind::Player, Vec3::ZERO, Vec3::ZERO, 1.0).with_behavior(
            Behavior::PlayerControlled(PlayerMotion {
                current_speed: speed,
                ..PlayerMotion::default()
            }),
        )
    }

    fn at(kind: EntityKind, x: f32) -> Entity {
        Entity::new(ModelId(1), kind, Vec3::new(x, 0.0, 0.0), Vec3::ZERO, 1.0)
    }

    #[test]
    fn test_missing_sounds_are_not_played() {
        let (mut audio, mut allocator) = setup(2);
        audio.missing.insert(SoundEffect::BreakingWood);
        audio.missing.insert(SoundEffect::Footsteps);
        let tree = at(EntityKind::Tree, 1.0);

        for _ in 0..3 {
            allocator.update(&mut audio, &player(30.0), std::slice::from_ref(&tree));
        }
        let source = allocator.source_of(tree.id).unwrap();
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 0);
        assert_eq!(audio.plays_of(SoundEffect::Footsteps), 0);
        assert!(!audio.channel(source).playing);
        allocator.check_conservation().unwrap();

        let mut away = tree.clone();
        away.position.x = 20.0;
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&away));
        assert_eq!(audio.plays_of(SoundEffect::Falcon), 1);
    }

    #[test]
    fn test_player_channel_is_reserved() {
        let (_, allocator) = setup(4);
        assert_eq!(allocator.player_source(), Some(SourceId(3)));
        assert_eq!(allocator.pool().total(), 3);
    }

    #[test]
    fn test_threshold_boundary_both_ways() {
        let eps = 1e-3;
        let (mut audio, mut allocator) = setup(2);
        let inside = at(EntityKind::Fern, 50.0 - eps);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&inside));
        assert!(allocator.source_of(inside.id).is_some());

        let mut moved = inside.clone();
        moved.position.x = 50.0 + eps;
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&moved));
        assert!(allocator.source_of(moved.id).is_none());
        assert_eq!(allocator.pool().available(), 1);

        let outside = at(EntityKind::Fern, 50.0 + eps);
        allocator.update(&mut audio, &player(0.0), &[outside.clone()]);
        assert!(allocator.source_of(outside.id).is_none());
    }

    #[test]
    fn test_reclaim_stops_the_channel() {
        let (mut audio, mut allocator) = setup(2);
        let mut tree = at(EntityKind::Tree, 20.0);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        let source = allocator.source_of(tree.id).unwrap();
        assert!(audio.channel(source).playing);

        tree.position.x = 80.0;
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        assert!(!audio.channel(source).playing);
        assert_eq!(audio.channel(source).loaded, None);
    }

    #[test]
    fn test_exhausted_pool_degrades_silently() {
        let (mut audio, mut allocator) = setup(3);
        let entities: Vec<Entity> = (0..5).map(|i| at(EntityKind::Fern, i as f32 * 3.0 + 5.0)).collect();
        allocator.update(&mut audio, &player(0.0), &entities);

        let assigned = entities.iter().filter(|e| allocator.source_of(e.id).is_some()).count();
        assert_eq!(assigned, 2);
        assert_eq!(allocator.pool().available(), 0);
        allocator.check_conservation().unwrap();
    }

    #[test]
    fn test_conservation_while_entities_wander() {
        let (mut audio, mut allocator) = setup(6);
        let mut entities: Vec<Entity> = (0..12).map(|i| at(EntityKind::Tree, i as f32 * 10.0)).collect();
        for frame in 0..40 {
            for (i, e) in entities.iter_mut().enumerate() {
                e.position.x = ((frame * 7 + i * 13) % 120) as f32 - 60.0;
            }
            let visible = &entities[..12 - frame % 4];
            allocator.update(&mut audio, &player(30.0), visible);
            allocator.check_conservation().unwrap();
            let pool = allocator.pool();
            assert_eq!(pool.available() + pool.assigned_count(), 5);
        }
    }

    #[test]
    fn test_crash_scenario() {
        let (mut audio, mut allocator) = setup(2);
        let mut tree = at(EntityKind::Tree, 10.0);

        // Heard but not touching: the tree calls like a falcon
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        let source = allocator.source_of(tree.id).unwrap();
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 0);
        assert_eq!(audio.channel(source).loaded, Some(SoundEffect::Falcon));
        assert!(audio.channel(source).looping);

        tree.position = Vec3::new(1.0, 0.0, 0.0);
        for _ in 0..5 {
            allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        }
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 1);
        assert!(!audio.channel(source).looping);

        // Once it rings out it may crack again
        audio.finish(source);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 2);
    }

    #[test]
    fn test_crash_radius_is_compared_squared() {
        let (mut audio, mut allocator) = setup(2);
        let marble = at(EntityKind::Marble, 1.5);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&marble));
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 0);

        let close = at(EntityKind::Marble, 1.4);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&close));
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 1);
    }

    #[test]
    fn test_marble_cracks_only_on_fresh_channel() {
        let (mut audio, mut allocator) = setup(2);
        let marble = at(EntityKind::Marble, 1.0);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&marble));
        let source = allocator.source_of(marble.id).unwrap();
        audio.finish(source);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&marble));
        assert_eq!(audio.plays_of(SoundEffect::BreakingWood), 1);
    }

    #[test]
    fn test_falcon_waits_for_crash_to_clear() {
        let (mut audio, mut allocator) = setup(2);
        let mut tree = at(EntityKind::Tree, 1.0);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        let source = allocator.source_of(tree.id).unwrap();

        tree.position.x = 20.0;
        audio.finish(source);
        allocator.update(&mut audio, &player(0.0), std::slice::from_ref(&tree));
        assert_eq!(audio.plays_of(SoundEffect::Falcon), 0);
    }

    #[test]
    fn test_footsteps_pause_and_resume() {
        let (mut audio, mut allocator) = setup(1);
        let source = allocator.player_source().unwrap();

        allocator.update(&mut audio, &player(60.0), &[]);
        assert!(audio.channel(source).playing);
        assert!(audio.channel(source).looping);
        assert!((audio.channel(source).pitch - 2.0).abs() < 1e-6);

        allocator.update(&mut audio, &player(0.0), &[]);
        assert!(audio.channel(source).paused);

        allocator.update(&mut audio, &player(30.0), &[]);
        assert!(audio.channel(source).playing);
        assert!((audio.channel(source).pitch - 1.0).abs() < 1e-6);
        // Resumed, not restarted
        assert_eq!(audio.plays_of(SoundEffect::Footsteps), 1);
    }

    #[test]
    fn test_listener_follows_player() {
        let (mut audio, mut allocator) = setup(1);
        let mut p = player(0.0);
        p.position = Vec3::new(3.0, 4.0, 5.0);
        allocator.update(&mut audio, &p, &[]);
        assert_eq!(audio.listener, Vec3::new(3.0, 4.0, 5.0));
    }
}
