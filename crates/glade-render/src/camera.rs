//! Third-person camera

use glade_core::Vec3;
use glade_runtime::{InputState, MouseButton};

use crate::entity::{to_glam, Entity};

/// Perspective projection parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Width / height
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for Projection {
    fn default() -> Self {
        Self {
            fov: 45.0,
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

impl Projection {
    pub fn matrix(&self) -> glam::Mat4 {
        glam::Mat4::perspective_rh_gl(self.fov.to_radians(), self.aspect, self.near, self.far)
    }
}

/// How a camera trails the entity it follows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowTarget {
    /// Distance from the target along the line of sight
    pub distance: f32,
    /// Orbit offset in degrees around the target's heading
    pub angle_around_player: f32,
    /// Height above the reference point the camera looks from
    pub height_offset: f32,
}

impl Default for FollowTarget {
    fn default() -> Self {
        Self {
            distance: 25.0,
            angle_around_player: 0.0,
            height_offset: 10.0,
        }
    }
}

/// Mouse-driven camera adjustments for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CameraInput {
    pub zoom: f32,
    pub pitch_delta: f32,
    pub angle_delta: f32,
}

impl CameraInput {
    /// Wheel zooms, right drag pitches, left drag orbits
    pub fn from_input(input: &InputState) -> Self {
        let (dx, dy) = input.mouse_delta();
        let pitch_delta = if input.is_mouse_button_down(MouseButton::Right) {
            dy * 0.1
        } else {
            0.0
        };
        let angle_delta = if input.is_mouse_button_down(MouseButton::Left) {
            dx * 0.3
        } else {
            0.0
        };
        Self {
            zoom: input.wheel_delta() * 0.1,
            pitch_delta,
            angle_delta,
        }
    }
}

/// A camera with an optional follow target
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    pub position: Vec3,
    /// Degrees
    pub pitch: f32,
    /// Degrees
    pub yaw: f32,
    /// Degrees
    pub roll: f32,
    pub follow: Option<FollowTarget>,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            pitch: 20.0,
            yaw: 0.0,
            roll: 0.0,
            follow: None,
        }
    }
}

impl Camera {
    pub fn third_person(pitch: f32, follow: FollowTarget) -> Self {
        Self {
            pitch,
            follow: Some(follow),
            ..Self::default()
        }
    }

    /// Place the camera behind `target`.
    ///
    /// The camera never ends up below the ground under its own position;
    /// `ground` gives the terrain height at a world `(x, z)`. A camera
    /// without a follow target does not move.
    pub fn update<G>(&mut self, target: &Entity, input: CameraInput, ground: G)
    where
        G: Fn(f32, f32) -> f32,
    {
        let Some(follow) = self.follow.as_mut() else {
            return;
        };
        follow.distance -= input.zoom;
        follow.angle_around_player -= input.angle_delta;
        self.pitch -= input.pitch_delta;
        let follow = *follow;

        let pitch = self.pitch.to_radians();
        let horizontal = follow.distance * pitch.cos();
        let vertical = follow.distance * pitch.sin();

        let theta = (target.rotation.y + follow.angle_around_player).to_radians();
        self.position.x = target.position.x + horizontal * theta.sin();
        self.position.z = target.position.z - horizontal * theta.cos();

        let terrain_height = ground(self.position.x, self.position.z);
        let reference = terrain_height.max(target.position.y);
        self.position.y = reference + follow.height_offset + vertical;
        if self.position.y < terrain_height {
            self.position.y = terrain_height + follow.height_offset;
        }

        self.yaw = 180.0 - target.rotation.y + follow.angle_around_player;
    }

    /// Rotate by pitch and yaw, then move the world opposite the camera
    pub fn view_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_rotation_x(self.pitch.to_radians())
            * glam::Mat4::from_rotation_y(self.yaw.to_radians())
            * glam::Mat4::from_translation(-to_glam(self.position))
    }
}
