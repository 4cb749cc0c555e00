//! Platform-agnostic pointer and trigger events consumed by viewports and
//! the orbit manipulator.

/// Pointer, wheel and modifier event types.
pub mod event;

pub use event::{
    Located, Modifiers, MouseButton, PointerEvent, PointerEventKind,
    PointerSource, TriggerEvent, TriggerKind,
};
