//! Scene entities

use glade_core::{EntityId, ModelId, Vec2, Vec3};

use crate::player::PlayerMotion;

/// The fixed set of things the world is built from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    BananaTree,
    Fern,
    Flower,
    Grass,
    Marble,
    Player,
    Tree,
}

/// How an entity moves each frame
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Behavior {
    #[default]
    Static,
    PlayerControlled(PlayerMotion),
}

/// One placed instance of a shared model
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub id: EntityId,
    pub model: ModelId,
    pub kind: EntityKind,
    pub behavior: Behavior,
    pub position: Vec3,
    /// Rotation around each axis in degrees
    pub rotation: Vec3,
    pub scale: f32,
    /// Cell of the model's texture atlas
    pub texture_index: u32,
}

impl Entity {
    pub fn new(model: ModelId, kind: EntityKind, position: Vec3, rotation: Vec3, scale: f32) -> Self {
        Self {
            id: EntityId::new(),
            model,
            kind,
            behavior: Behavior::Static,
            position,
            rotation,
            scale,
            texture_index: 0,
        }
    }

    pub fn with_texture_index(mut self, index: u32) -> Self {
        self.texture_index = index;
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    pub fn increase_position(&mut self, dx: f32, dy: f32, dz: f32) {
        self.position += Vec3::new(dx, dy, dz);
    }

    pub fn increase_rotation(&mut self, dx: f32, dy: f32, dz: f32) {
        self.rotation += Vec3::new(dx, dy, dz);
    }

    /// Player motion state, if this entity is player controlled
    pub fn motion(&self) -> Option<&PlayerMotion> {
        match &self.behavior {
            Behavior::PlayerControlled(motion) => Some(motion),
            Behavior::Static => None,
        }
    }

    /// Current ground speed; static entities never move
    pub fn current_speed(&self) -> f32 {
        self.motion().map(|m| m.current_speed).unwrap_or(0.0)
    }

    /// Model matrix: translate, rotate about x then y then z, uniform scale
    pub fn transformation_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_translation(to_glam(self.position))
            * glam::Mat4::from_rotation_x(self.rotation.x.to_radians())
            * glam::Mat4::from_rotation_y(self.rotation.y.to_radians())
            * glam::Mat4::from_rotation_z(self.rotation.z.to_radians())
            * glam::Mat4::from_scale(glam::Vec3::splat(self.scale))
    }

    /// Offset of this entity's atlas cell, for an atlas of `factor` x `factor` cells
    pub fn texture_offset(&self, factor: u32) -> Vec2 {
        let factor = factor.max(1);
        let column = self.texture_index % factor;
        let row = self.texture_index / factor;
        Vec2::new(column as f32 / factor as f32, row as f32 / factor as f32)
    }
}

pub(crate) fn to_glam(v: Vec3) -> glam::Vec3 {
    glam::Vec3::new(v.x, v.y, v.z)
}
