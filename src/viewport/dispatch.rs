use super::core::{Routed, Viewport, ViewportId};
use crate::input::{Located, PointerEvent, PointerEventKind, TriggerEvent};

/// Ordered collection of viewports sharing one canvas.
///
/// Pointer-down events go to the first enabled viewport containing the
/// point. A primary pointer-down captures that viewport: later events of
/// the gesture go to it regardless of position until the primary pointer
/// is released.
#[derive(Debug, Default)]
pub struct ViewportSet {
    viewports: Vec<Viewport>,
    next_id: u32,
    canvas: Option<(f64, f64)>,
    captured: Option<ViewportId>,
}

impl ViewportSet {
    /// Create an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a viewport. It is hit-tested after every viewport already in
    /// the set.
    pub fn add(&mut self, mut viewport: Viewport) -> ViewportId {
        let id = ViewportId(self.next_id);
        self.next_id += 1;
        viewport.set_id(id);
        if let Some((width, height)) = self.canvas {
            viewport.set_canvas_size(width, height);
        }
        self.viewports.push(viewport);
        id
    }

    /// Remove a viewport, releasing capture if it held it.
    pub fn remove(&mut self, id: ViewportId) -> Option<Viewport> {
        let index = self.viewports.iter().position(|v| v.id() == id)?;
        if self.captured == Some(id) {
            self.captured = None;
        }
        Some(self.viewports.remove(index))
    }

    /// Look up a viewport.
    #[must_use]
    pub fn get(&self, id: ViewportId) -> Option<&Viewport> {
        self.viewports.iter().find(|v| v.id() == id)
    }

    /// Look up a viewport mutably.
    pub fn get_mut(&mut self, id: ViewportId) -> Option<&mut Viewport> {
        self.viewports.iter_mut().find(|v| v.id() == id)
    }

    /// Viewports in hit-test order.
    pub fn iter(&self) -> impl Iterator<Item = &Viewport> {
        self.viewports.iter()
    }

    /// Viewports in hit-test order, mutably.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Viewport> {
        self.viewports.iter_mut()
    }

    /// Number of viewports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.viewports.len()
    }

    /// Whether the set has no viewports.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.viewports.is_empty()
    }

    /// Viewport holding the current drag, if any.
    #[must_use]
    pub fn captured(&self) -> Option<ViewportId> {
        self.captured
    }

    /// Resize the canvas for every viewport. Ignored if either extent is
    /// not positive.
    pub fn set_canvas_size(&mut self, width: f64, height: f64) {
        if width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring degenerate canvas size {width}x{height}");
            return;
        }
        self.canvas = Some((width, height));
        for viewport in &mut self.viewports {
            viewport.set_canvas_size(width, height);
        }
    }

    /// First enabled viewport containing the event, in insertion order.
    #[must_use]
    pub fn hit_test<E: Located>(&self, event: E) -> Option<Routed<E>> {
        let position = event.position();
        self.viewports
            .iter()
            .find(|v| v.is_enabled() && v.is_point_inside(position.x, position.y))
            .map(|v| v.to_routed(event))
    }

    /// Decide which viewport receives a pointer event, updating capture.
    pub fn route_pointer(&mut self, event: &PointerEvent) -> Option<Routed<PointerEvent>> {
        if let Some(id) = self.captured {
            if event.is_primary && event.kind == PointerEventKind::Up {
                log::debug!("viewport {} released", id.0);
                self.captured = None;
            }
            if let Some(viewport) = self.get(id) {
                return Some(viewport.to_routed(event.clone()));
            }
            self.captured = None;
        }

        let routed = self.hit_test(event.clone())?;
        if event.is_primary && event.kind == PointerEventKind::Down {
            log::debug!("viewport {} captured", routed.viewport.0);
            self.captured = Some(routed.viewport);
        }
        Some(routed)
    }

    /// Route a pointer event and hand it to the receiving viewport.
    ///
    /// Returns `true` if a viewport used the event.
    pub fn on_pointer(&mut self, event: &PointerEvent) -> bool {
        let Some(routed) = self.route_pointer(event) else {
            return false;
        };
        self.get_mut(routed.viewport)
            .is_some_and(|viewport| viewport.on_pointer(&routed.event))
    }

    /// Route a trigger event by hit test and hand it to the receiving
    /// viewport.
    pub fn on_trigger(&mut self, event: &TriggerEvent) -> bool {
        let Some(routed) = self.hit_test(*event) else {
            return false;
        };
        self.get_mut(routed.viewport)
            .is_some_and(|viewport| viewport.on_trigger(&routed.event))
    }

    /// Advance every viewport's manipulator into its built-in camera and
    /// sync aspects.
    pub fn update_cameras(&mut self) {
        for viewport in &mut self.viewports {
            let _ = viewport.update_camera(None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::{ManipPhase, ProjectionKind};
    use crate::input::MouseButton;
    use crate::viewport::ViewportProps;

    fn split() -> (ViewportSet, ViewportId, ViewportId) {
        let mut set = ViewportSet::new();
        let left = set.add(Viewport::new(&ViewportProps {
            width: 0.5,
            ..ViewportProps::default()
        }));
        let right = set.add(Viewport::new(&ViewportProps {
            left: 0.5,
            width: 0.5,
            ..ViewportProps::default()
        }));
        set.set_canvas_size(800.0, 600.0);
        for viewport in set.iter_mut() {
            viewport.set_built_in_camera(ProjectionKind::Perspective, None);
            let _ = viewport.enable_camera_manip(true);
        }
        (set, left, right)
    }

    fn mouse_at(kind: PointerEventKind, x: f64, y: f64) -> PointerEvent {
        PointerEvent::mouse(kind, MouseButton::Left, x, y)
    }

    fn mouse(kind: PointerEventKind, x: f64) -> PointerEvent {
        mouse_at(kind, x, 100.0)
    }

    #[test]
    fn first_match_wins() {
        let mut set = ViewportSet::new();
        let back = set.add(Viewport::default());
        let _front = set.add(Viewport::default());
        set.set_canvas_size(100.0, 100.0);
        // The bottom and right edges belong to no viewport
        assert!(set.route_pointer(&mouse_at(PointerEventKind::Hover, 50.0, 100.0)).is_none());
        assert!(set.route_pointer(&mouse_at(PointerEventKind::Hover, 100.0, 50.0)).is_none());

        let routed = set.route_pointer(&mouse_at(PointerEventKind::Down, 50.0, 50.0));
        assert_eq!(routed.map(|r| r.viewport), Some(back));
    }

    #[test]
    fn disabled_viewports_are_skipped() {
        let mut set = ViewportSet::new();
        let first = set.add(Viewport::default());
        let second = set.add(Viewport::default());
        set.set_canvas_size(100.0, 100.0);
        set.get_mut(first).unwrap().set_enabled(false);
        let routed = set.route_pointer(&mouse_at(PointerEventKind::Hover, 10.0, 50.0));
        assert_eq!(routed.map(|r| r.viewport), Some(second));
    }

    #[test]
    fn drag_sticks_to_origin_viewport() {
        let (mut set, left, right) = split();
        assert!(set.on_pointer(&mouse(PointerEventKind::Down, 100.0)));
        assert_eq!(set.captured(), Some(left));

        // Moves into the right half still go to the left viewport
        let drag = mouse(PointerEventKind::Move, 600.0).with_movement(500.0, 0.0);
        let routed = set.route_pointer(&drag).unwrap();
        assert_eq!(routed.viewport, left);
        assert!(routed.device.x > 1.0);

        assert!(set.on_pointer(&mouse(PointerEventKind::Up, 600.0)));
        assert_eq!(set.captured(), None);
        let phase = set.get(left).unwrap().manipulator().unwrap().phase();
        assert_eq!(phase, ManipPhase::Release);
        let idle = set.get(right).unwrap().manipulator().unwrap().phase();
        assert_eq!(idle, ManipPhase::Off);

        // Capture released: the next event routes by position again
        let routed = set.route_pointer(&mouse(PointerEventKind::Hover, 600.0));
        assert_eq!(routed.map(|r| r.viewport), Some(right));
    }

    #[test]
    fn secondary_up_keeps_capture() {
        let (mut set, left, _) = split();
        let _ = set.on_pointer(&mouse(PointerEventKind::Down, 100.0));
        let _ = set.route_pointer(&mouse(PointerEventKind::Up, 100.0).secondary());
        assert_eq!(set.captured(), Some(left));
    }

    #[test]
    fn wheel_routes_by_position() {
        let (mut set, left, right) = split();
        assert!(set.on_trigger(&TriggerEvent::wheel(1.0, 700.0, 10.0)));
        set.update_cameras();
        let z = |set: &ViewportSet, id| set.get(id).unwrap().manipulator().unwrap().pose().offset.z;
        assert!(z(&set, right) > z(&set, left));
        assert!(!set.on_trigger(&TriggerEvent::wheel(1.0, 900.0, 10.0)));
    }

    #[test]
    fn removing_captured_viewport_releases_capture() {
        let (mut set, left, _) = split();
        let _ = set.on_pointer(&mouse(PointerEventKind::Down, 100.0));
        assert!(set.remove(left).is_some());
        assert_eq!(set.captured(), None);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn added_viewports_pick_up_canvas_size() {
        let mut set = ViewportSet::new();
        set.set_canvas_size(320.0, 240.0);
        let id = set.add(Viewport::default());
        assert_eq!(set.get(id).unwrap().width(), 320.0);
    }
}
