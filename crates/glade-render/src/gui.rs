//! 2D overlay textures and the on-screen gamepad

use glade_core::Vec2;
use glade_runtime::{Action, InputState};

use crate::model::TextureHandle;

/// Vertices of the unit quad every GUI is drawn with (triangle strip)
pub const GUI_QUAD: [f32; 8] = [-1.0, 1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0];

/// A textured rectangle drawn over the scene
#[derive(Debug, Clone, PartialEq)]
pub struct GuiTexture {
    pub texture: TextureHandle,
    /// Centre in normalized device coordinates
    pub position: Vec2,
    /// Half extents in normalized device coordinates
    pub scale: Vec2,
    /// Action pressed while a touch is inside this texture
    pub gamepad_key: Option<Action>,
}

impl GuiTexture {
    pub fn new(texture: TextureHandle, position: Vec2, scale: Vec2) -> Self {
        Self {
            texture,
            position,
            scale,
            gamepad_key: None,
        }
    }

    pub fn with_gamepad_key(mut self, action: Action) -> Self {
        self.gamepad_key = Some(action);
        self
    }

    /// Whether `(x, y)` lies inside `position ± scale`
    pub fn contains_location(&self, x: f32, y: f32) -> bool {
        x >= self.position.x - self.scale.x
            && x <= self.position.x + self.scale.x
            && y >= self.position.y - self.scale.y
            && y <= self.position.y + self.scale.y
    }

    /// Model matrix placing the unit quad
    pub fn transformation_matrix(&self) -> glam::Mat4 {
        glam::Mat4::from_translation(glam::Vec3::new(self.position.x, self.position.y, 0.0))
            * glam::Mat4::from_scale(glam::Vec3::new(self.scale.x, self.scale.y, 1.0))
    }
}

/// Press every gamepad action whose button is under the current touch,
/// and release the rest.
pub fn update_gamepad(guis: &[GuiTexture], input: &mut InputState) {
    let touch = input.touch();
    for gui in guis {
        let Some(action) = gui.gamepad_key else {
            continue;
        };
        let pressed = touch
            .map(|(x, y)| gui.contains_location(x, y))
            .unwrap_or(false);
        input.set_virtual_action(action, pressed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn button(x: f32, y: f32, action: Action) -> GuiTexture {
        GuiTexture::new(TextureHandle(1), Vec2::new(x, y), Vec2::new(0.1, 0.1)).with_gamepad_key(action)
    }

    #[test]
    fn test_contains_location_inclusive_box() {
        let gui = GuiTexture::new(TextureHandle(1), Vec2::new(0.5, 0.5), Vec2::new(0.25, 0.25));
        assert!(gui.contains_location(0.5, 0.5));
        assert!(gui.contains_location(0.75, 0.25));
        assert!(!gui.contains_location(0.8, 0.5));
        assert!(!gui.contains_location(0.5, 0.2));
    }

    #[test]
    fn test_gamepad_follows_touch() {
        let guis = vec![
            button(-0.8, -0.8, Action::TurnLeft),
            button(-0.5, -0.8, Action::TurnRight),
            GuiTexture::new(TextureHandle(2), Vec2::ZERO, Vec2::new(1.0, 1.0)),
        ];
        let mut input = InputState::new();

        input.process_touch(-0.8, -0.75);
        update_gamepad(&guis, &mut input);
        assert!(input.is_action_pressed(Action::TurnLeft));
        assert!(!input.is_action_pressed(Action::TurnRight));

        input.process_touch(-0.5, -0.8);
        update_gamepad(&guis, &mut input);
        assert!(!input.is_action_pressed(Action::TurnLeft));
        assert!(input.is_action_pressed(Action::TurnRight));

        input.process_touch_end();
        update_gamepad(&guis, &mut input);
        assert!(!input.is_action_pressed(Action::TurnRight));
    }

    #[test]
    fn test_transformation_places_quad() {
        let gui = GuiTexture::new(TextureHandle(1), Vec2::new(0.5, -0.5), Vec2::new(0.25, 0.1));
        let corner = gui
            .transformation_matrix()
            .transform_point3(glam::Vec3::new(1.0, 1.0, 0.0));
        assert!((corner - glam::Vec3::new(0.75, -0.4, 0.0)).length() < 1e-5);
    }
}
