//! Player-controlled movement

use glade_runtime::{Action, InputState};

use crate::entity::{Behavior, Entity};

/// Tuning for player movement
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSettings {
    /// Units per second
    pub run_speed: f32,
    /// Degrees per second
    pub turn_speed: f32,
    /// Vertical acceleration in units per second squared
    pub gravity: f32,
    /// Upward velocity given by a jump
    pub jump_power: f32,
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self {
            run_speed: 60.0,
            turn_speed: 160.0,
            gravity: -50.0,
            jump_power: 30.0,
        }
    }
}

/// Per-frame motion state of a player-controlled entity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerMotion {
    pub current_speed: f32,
    pub current_turn_speed: f32,
    pub upwards_speed: f32,
    pub is_jumping: bool,
}

impl PlayerMotion {
    /// Read the movement actions for this frame
    pub fn check_inputs(&mut self, input: &InputState, settings: &PlayerSettings) -> bool {
        self.current_speed = if input.is_action_pressed(Action::Forward) {
            settings.run_speed
        } else if input.is_action_pressed(Action::Backward) {
            -settings.run_speed
        } else {
            0.0
        };

        self.current_turn_speed = if input.is_action_pressed(Action::TurnLeft) {
            -settings.turn_speed
        } else if input.is_action_pressed(Action::TurnRight) {
            settings.turn_speed
        } else {
            0.0
        };

        input.is_action_pressed(Action::Jump)
    }
}

/// Advance a player-controlled entity by `dt` seconds.
///
/// `ground` gives the terrain height under a world `(x, z)`. Entities that
/// are not player controlled are left untouched.
pub fn move_player<G>(
    entity: &mut Entity,
    input: &InputState,
    settings: &PlayerSettings,
    dt: f32,
    ground: G,
) where
    G: Fn(f32, f32) -> f32,
{
    let Behavior::PlayerControlled(motion) = &mut entity.behavior else {
        return;
    };
    let wants_jump = motion.check_inputs(input, settings);
    let mut motion = motion.clone();

    // Turn, then walk along the new heading
    entity.increase_rotation(0.0, motion.current_turn_speed * dt, 0.0);
    let distance = motion.current_speed * dt;
    let heading = entity.rotation.y.to_radians();
    entity.increase_position(-distance * heading.sin(), 0.0, distance * heading.cos());

    let terrain_height = ground(entity.position.x, entity.position.z);

    if wants_jump && !motion.is_jumping && entity.position.y <= terrain_height {
        motion.upwards_speed = settings.jump_power;
        motion.is_jumping = true;
    }

    if motion.is_jumping && (entity.position.y > terrain_height || motion.upwards_speed > 0.0) {
        motion.upwards_speed += settings.gravity * dt;
        entity.increase_position(0.0, motion.upwards_speed * dt, 0.0);
    } else {
        // Walking keeps the player glued to the surface
        entity.position.y = terrain_height;
    }

    if entity.position.y <= terrain_height {
        entity.position.y = terrain_height;
        motion.upwards_speed = 0.0;
        motion.is_jumping = false;
    }

    entity.behavior = Behavior::PlayerControlled(motion);
}
