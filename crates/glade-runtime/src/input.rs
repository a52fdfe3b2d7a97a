//! Input state management

use std::collections::{HashMap, HashSet};

/// Keyboard keys the engine reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    W,
    A,
    S,
    D,
    Up,
    Down,
    Left,
    Right,
    Space,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

/// Player actions, bound to keys or to on-screen gamepad buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    TurnLeft,
    TurnRight,
    Jump,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::Forward,
        Action::Backward,
        Action::TurnLeft,
        Action::TurnRight,
        Action::Jump,
    ];
}

/// Tracks keyboard, mouse and touch input state per frame
pub struct InputState {
    /// Keys currently held down
    keys_down: HashSet<Key>,
    /// Actions held through the virtual gamepad
    virtual_actions: HashSet<Action>,

    mouse_buttons_down: HashSet<MouseButton>,
    /// Current mouse position in window pixels
    pub mouse_position: (f32, f32),
    /// Mouse movement delta this frame
    mouse_delta: (f32, f32),
    /// Wheel movement this frame
    wheel_delta: f32,

    /// Active touch in normalized device coordinates
    touch: Option<(f32, f32)>,

    /// Action map: action -> key bindings
    action_map: HashMap<Action, Vec<Key>>,
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

impl InputState {
    pub fn new() -> Self {
        Self {
            keys_down: HashSet::new(),
            virtual_actions: HashSet::new(),
            mouse_buttons_down: HashSet::new(),
            mouse_position: (0.0, 0.0),
            mouse_delta: (0.0, 0.0),
            wheel_delta: 0.0,
            touch: None,
            action_map: Self::default_action_map(),
        }
    }

    fn default_action_map() -> HashMap<Action, Vec<Key>> {
        let mut map = HashMap::new();
        map.insert(Action::Forward, vec![Key::W, Key::Up]);
        map.insert(Action::Backward, vec![Key::S, Key::Down]);
        map.insert(Action::TurnLeft, vec![Key::A, Key::Left]);
        map.insert(Action::TurnRight, vec![Key::D, Key::Right]);
        map.insert(Action::Jump, vec![Key::Space]);
        map
    }

    /// Bind an action to one or more keys
    pub fn bind_action(&mut self, action: Action, keys: Vec<Key>) {
        self.action_map.insert(action, keys);
    }

    pub fn process_key_down(&mut self, key: Key) {
        self.keys_down.insert(key);
    }

    pub fn process_key_up(&mut self, key: Key) {
        self.keys_down.remove(&key);
    }

    pub fn process_mouse_button_down(&mut self, button: MouseButton) {
        self.mouse_buttons_down.insert(button);
    }

    pub fn process_mouse_button_up(&mut self, button: MouseButton) {
        self.mouse_buttons_down.remove(&button);
    }

    /// Process mouse movement (cursor position mode)
    pub fn process_mouse_move(&mut self, x: f32, y: f32) {
        self.mouse_delta.0 += x - self.mouse_position.0;
        self.mouse_delta.1 += y - self.mouse_position.1;
        self.mouse_position = (x, y);
    }

    pub fn process_wheel(&mut self, delta: f32) {
        self.wheel_delta += delta;
    }

    /// Start or move a touch, in normalized device coordinates
    pub fn process_touch(&mut self, x: f32, y: f32) {
        self.touch = Some((x, y));
    }

    pub fn process_touch_end(&mut self) {
        self.touch = None;
    }

    /// Press or release an action from an on-screen control
    pub fn set_virtual_action(&mut self, action: Action, pressed: bool) {
        if pressed {
            self.virtual_actions.insert(action);
        } else {
            self.virtual_actions.remove(&action);
        }
    }

    /// Call at end of frame to clear per-frame state
    pub fn end_frame(&mut self) {
        self.mouse_delta = (0.0, 0.0);
        self.wheel_delta = 0.0;
    }

    // --- Query methods ---

    pub fn is_key_down(&self, key: Key) -> bool {
        self.keys_down.contains(&key)
    }

    /// Is an action currently held? (any bound key, or the virtual gamepad)
    pub fn is_action_pressed(&self, action: Action) -> bool {
        let key_match = self
            .action_map
            .get(&action)
            .map(|keys| keys.iter().any(|k| self.keys_down.contains(k)))
            .unwrap_or(false);
        key_match || self.virtual_actions.contains(&action)
    }

    pub fn mouse_delta(&self) -> (f32, f32) {
        self.mouse_delta
    }

    pub fn wheel_delta(&self) -> f32 {
        self.wheel_delta
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// The active touch, if any
    pub fn touch(&self) -> Option<(f32, f32)> {
        self.touch
    }
}
