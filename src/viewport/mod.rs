//! Canvas viewports: relative/absolute rectangles, device coordinates,
//! pick rectangles, built-in cameras and multi-viewport event routing.

mod core;
mod dispatch;
mod rect;

pub use self::core::{Routed, Viewport, ViewportId, ViewportProps};
pub use dispatch::ViewportSet;
pub use rect::{PickRect, ViewportRect};
