use std::collections::HashSet;

use glam::Vec2;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::config::{FieldSource, Resolution};
use crate::error::EventError;

/// Identifier for a physical keyboard key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    Named(NamedKey),
    Character(char),
    Digit(u8),
    Function(u8),
}

impl KeyCode {
    pub fn from_name(name: &str) -> Option<Self> {
        if let Some(key) = parse_named_key(name) {
            return Some(key);
        }
        let mut chars = name.chars();
        if let (Some(ch), None) = (chars.next(), chars.next()) {
            if ch.is_ascii_alphabetic() {
                return Some(Self::Character(ch.to_ascii_uppercase()));
            }
            if ch.is_ascii_digit() {
                return Some(Self::Digit(ch as u8 - b'0'));
            }
        }
        if let Some(function) = name.strip_prefix('F').or_else(|| name.strip_prefix('f')) {
            if let Ok(index) = function.parse::<u8>() {
                if (1..=25).contains(&index) {
                    return Some(Self::Function(index));
                }
            }
        }
        None
    }

    /// Maps a DOM `KeyboardEvent.key` value.
    pub fn from_dom_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" => Some(Self::Named(NamedKey::Left)),
            "ArrowRight" => Some(Self::Named(NamedKey::Right)),
            "ArrowUp" => Some(Self::Named(NamedKey::Up)),
            "ArrowDown" => Some(Self::Named(NamedKey::Down)),
            " " => Some(Self::Named(NamedKey::Space)),
            other => Self::from_name(other),
        }
    }
}

fn parse_named_key(name: &str) -> Option<KeyCode> {
    use NamedKey::*;
    let key = match name {
        "Space" => Space,
        "Enter" | "Return" => Enter,
        "Tab" => Tab,
        "Left" => Left,
        "Right" => Right,
        "Up" => Up,
        "Down" => Down,
        "Escape" | "Esc" => Escape,
        "Backspace" => Backspace,
        "Home" => Home,
        "End" => End,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        "Shift" => Shift,
        "Control" => Control,
        "Alt" => Alt,
        _ => return None,
    };
    Some(KeyCode::Named(key))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedKey {
    Space,
    Enter,
    Tab,
    Left,
    Right,
    Up,
    Down,
    Escape,
    Backspace,
    Home,
    End,
    PageUp,
    PageDown,
    Shift,
    Control,
    Alt,
}

/// Identifier for a mouse button (left button is zero, as in the DOM).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MouseButton(u8);

impl MouseButton {
    pub const LEFT: Self = Self(0);
    pub const MIDDLE: Self = Self(1);
    pub const RIGHT: Self = Self(2);

    pub fn new(index: u8) -> Self {
        Self(index)
    }

    pub fn index(self) -> u8 {
        self.0
    }
}

/// One input event forwarded by the host page.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    MouseMove { position: Vec2 },
    MouseDown { button: MouseButton, position: Vec2 },
    MouseUp { button: MouseButton },
    Wheel { delta: f32 },
    KeyDown(KeyCode),
    KeyUp(KeyCode),
    Resize(Resolution),
    SelectScenario(usize),
}

impl InputEvent {
    /// Decodes an event from its `type` string and fields.
    ///
    /// Field names follow the DOM where one exists (`deltaY`, `key`,
    /// `button`); positions are `x`/`y` in canvas pixels.
    pub fn from_fields(kind: &str, fields: &impl FieldSource) -> Result<Self, EventError> {
        let number = |field: &'static str| -> Result<f64, EventError> {
            let value = fields.number(field).ok_or_else(|| EventError::MissingField {
                kind: kind.to_string(),
                field,
            })?;
            if !value.is_finite() {
                return Err(EventError::NonFinite {
                    kind: kind.to_string(),
                    field,
                });
            }
            Ok(value)
        };
        let position = || -> Result<Vec2, EventError> {
            Ok(Vec2::new(number("x")? as f32, number("y")? as f32))
        };
        let button = || -> Result<MouseButton, EventError> {
            Ok(MouseButton::new(number("button")?.clamp(0.0, 255.0) as u8))
        };
        let key = || -> Result<KeyCode, EventError> {
            let name = fields.text("key").ok_or_else(|| EventError::MissingField {
                kind: kind.to_string(),
                field: "key",
            })?;
            KeyCode::from_dom_key(&name).ok_or(EventError::UnknownKey(name))
        };

        Ok(match kind {
            "mousemove" => Self::MouseMove {
                position: position()?,
            },
            "mousedown" => Self::MouseDown {
                button: button()?,
                position: position()?,
            },
            "mouseup" => Self::MouseUp { button: button()? },
            "wheel" => Self::Wheel {
                delta: number("deltaY")? as f32,
            },
            "keydown" => Self::KeyDown(key()?),
            "keyup" => Self::KeyUp(key()?),
            "resize" => {
                let size = position()?;
                Self::Resize(Resolution::new(size.x.max(0.0) as u32, size.y.max(0.0) as u32))
            }
            "select_scenario" => Self::SelectScenario(number("index")?.max(0.0) as usize),
            other => return Err(EventError::UnknownKind(other.to_string())),
        })
    }
}

/// Input snapshot accumulated between frames.
#[derive(Debug, Default)]
pub struct InputState {
    keys: RwLock<HashSet<KeyCode>>,
    mouse_buttons: RwLock<HashSet<MouseButton>>,
    mouse_position: RwLock<Vec2>,
    drag_delta: RwLock<Vec2>,
    scroll_delta: RwLock<f32>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key_down(&self, key: KeyCode) {
        self.keys.write().insert(key);
    }

    pub fn set_key_up(&self, key: KeyCode) {
        self.keys.write().remove(&key);
    }

    pub fn set_mouse_button_down(&self, button: MouseButton) {
        self.mouse_buttons.write().insert(button);
    }

    pub fn set_mouse_button_up(&self, button: MouseButton) {
        self.mouse_buttons.write().remove(&button);
    }

    /// Moves the cursor, accumulating a drag while the left button is held.
    pub fn set_mouse_position(&self, position: Vec2) {
        if !position.is_finite() {
            return;
        }
        let mut current = self.mouse_position.write();
        if self.is_mouse_button_down(MouseButton::LEFT) {
            *self.drag_delta.write() += position - *current;
        }
        *current = position;
    }

    pub fn add_scroll(&self, delta: f32) {
        *self.scroll_delta.write() += delta;
    }

    pub fn is_key_down(&self, key: KeyCode) -> bool {
        self.keys.read().contains(&key)
    }

    pub fn is_mouse_button_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons.read().contains(&button)
    }

    /// Returns and resets the drag and scroll accumulated since the last call.
    pub fn take_frame_deltas(&self) -> (Vec2, f32) {
        let drag = std::mem::take(&mut *self.drag_delta.write());
        let scroll = std::mem::take(&mut *self.scroll_delta.write());
        (drag, scroll)
    }

    /// Folds a host event into the snapshot.
    pub fn apply(&self, event: &InputEvent) {
        match event {
            InputEvent::MouseMove { position } => self.set_mouse_position(*position),
            InputEvent::MouseDown { button, position } => {
                *self.mouse_position.write() = *position;
                self.set_mouse_button_down(*button);
            }
            InputEvent::MouseUp { button } => self.set_mouse_button_up(*button),
            InputEvent::Wheel { delta } => self.add_scroll(*delta),
            InputEvent::KeyDown(key) => self.set_key_down(*key),
            InputEvent::KeyUp(key) => self.set_key_up(*key),
            InputEvent::Resize(_) | InputEvent::SelectScenario(_) => {}
        }
    }
}
