use glam::DVec2;

/// Pointer event phase as delivered by the host input layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerEventKind {
    /// A pointer went down (button press or touch start).
    Down,
    /// A pointer went up.
    Up,
    /// A pointer moved while at least one button/contact is held.
    Move,
    /// A pointer moved with no button/contact held.
    Hover,
}

/// Device class that produced a pointer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    /// Mouse or trackpad.
    Mouse,
    /// Touch screen contact.
    Touch,
}

/// Platform-agnostic mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button, DOM index 0.
    Left,
    /// Middle mouse button (wheel click), DOM index 1.
    Middle,
    /// Secondary (right) mouse button, DOM index 2.
    Right,
    /// Any other button, by DOM index.
    Other(u16),
}

impl MouseButton {
    /// Map a DOM-style button index.
    #[must_use]
    pub fn from_index(index: u16) -> Self {
        match index {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            other => Self::Other(other),
        }
    }
}

/// Modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    /// Shift key.
    pub shift: bool,
    /// Control key.
    pub ctrl: bool,
    /// Alt / Option key.
    pub alt: bool,
    /// Meta / Command / Super key.
    pub meta: bool,
}

/// A pointer event in canvas pixel space (origin top-left, Y down).
#[derive(Debug, Clone, PartialEq)]
pub struct PointerEvent {
    /// Event phase.
    pub kind: PointerEventKind,
    /// Whether this is the primary pointer of the gesture.
    pub is_primary: bool,
    /// Number of pointers currently down.
    pub pointer_count: usize,
    /// Positions of all active pointers, in canvas pixels.
    pub positions: Vec<DVec2>,
    /// Position of this pointer, in canvas pixels.
    pub x: f64,
    /// Position of this pointer, in canvas pixels.
    pub y: f64,
    /// Horizontal movement since the previous event of this pointer.
    pub movement_x: f64,
    /// Vertical movement since the previous event of this pointer.
    pub movement_y: f64,
    /// Button that changed (meaningful for mouse `Down`/`Up`).
    pub button: MouseButton,
    /// Modifier keys held.
    pub modifiers: Modifiers,
    /// Producing device class.
    pub source: PointerSource,
}

impl PointerEvent {
    /// Primary mouse event at `(x, y)` with no movement and no modifiers.
    #[must_use]
    pub fn mouse(kind: PointerEventKind, button: MouseButton, x: f64, y: f64) -> Self {
        Self {
            kind,
            is_primary: true,
            pointer_count: usize::from(kind != PointerEventKind::Hover),
            positions: vec![DVec2::new(x, y)],
            x,
            y,
            movement_x: 0.0,
            movement_y: 0.0,
            button,
            modifiers: Modifiers::default(),
            source: PointerSource::Mouse,
        }
    }

    /// Touch event for the given active contact positions. The first
    /// position is the event's own location.
    #[must_use]
    pub fn touch(kind: PointerEventKind, positions: Vec<DVec2>) -> Self {
        let first = positions.first().copied().unwrap_or(DVec2::ZERO);
        Self {
            kind,
            is_primary: true,
            pointer_count: positions.len(),
            positions,
            x: first.x,
            y: first.y,
            movement_x: 0.0,
            movement_y: 0.0,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
            source: PointerSource::Touch,
        }
    }

    /// Set the movement since the previous event.
    #[must_use]
    pub fn with_movement(mut self, dx: f64, dy: f64) -> Self {
        self.movement_x = dx;
        self.movement_y = dy;
        self
    }

    /// Set the held modifier keys.
    #[must_use]
    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Mark the event as belonging to a secondary pointer.
    #[must_use]
    pub fn secondary(mut self) -> Self {
        self.is_primary = false;
        self
    }
}

/// Discrete trigger events.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TriggerKind {
    /// Scroll wheel step; positive values dolly out.
    Wheel {
        /// Wheel steps, typically ±1 per notch.
        delta: f64,
    },
}

/// A trigger event in canvas pixel space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TriggerEvent {
    /// What was triggered.
    pub kind: TriggerKind,
    /// Pointer position at trigger time, in canvas pixels.
    pub x: f64,
    /// Pointer position at trigger time, in canvas pixels.
    pub y: f64,
}

impl TriggerEvent {
    /// Wheel event at `(x, y)`.
    #[must_use]
    pub fn wheel(delta: f64, x: f64, y: f64) -> Self {
        Self {
            kind: TriggerKind::Wheel { delta },
            x,
            y,
        }
    }
}

/// Events that carry a canvas position and can be hit-tested.
pub trait Located {
    /// Position in canvas pixels.
    fn position(&self) -> DVec2;
}

impl Located for PointerEvent {
    fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

impl Located for TriggerEvent {
    fn position(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }
}

#[cfg(feature = "viewer")]
impl From<winit::event::MouseButton> for MouseButton {
    fn from(button: winit::event::MouseButton) -> Self {
        match button {
            winit::event::MouseButton::Left => Self::Left,
            winit::event::MouseButton::Right => Self::Right,
            winit::event::MouseButton::Middle => Self::Middle,
            winit::event::MouseButton::Back => Self::Other(3),
            winit::event::MouseButton::Forward => Self::Other(4),
            winit::event::MouseButton::Other(index) => Self::Other(index),
        }
    }
}

#[cfg(feature = "viewer")]
impl From<winit::keyboard::ModifiersState> for Modifiers {
    fn from(state: winit::keyboard::ModifiersState) -> Self {
        Self {
            shift: state.shift_key(),
            ctrl: state.control_key(),
            alt: state.alt_key(),
            meta: state.super_key(),
        }
    }
}
