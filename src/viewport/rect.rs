use glam::{DMat4, DVec4};

/// Axis-aligned rectangle with a top-left origin.
///
/// Used both for relative rectangles (fractions of the canvas) and for
/// absolute rectangles in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportRect {
    /// Left edge.
    pub left: f64,
    /// Top edge.
    pub top: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewportRect {
    /// The whole canvas, as a relative rectangle.
    pub const FULL: Self = Self::new(0.0, 0.0, 1.0, 1.0);

    /// Create a rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge (exclusive).
    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Half-open containment: left/top edges inside, right/bottom outside.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.left && x < self.right() && y >= self.top && y < self.bottom()
    }

    /// Width over height, or `None` when the height is not positive.
    #[must_use]
    pub fn aspect(&self) -> Option<f64> {
        (self.height > 0.0).then(|| self.width / self.height)
    }

    /// Whether both extents are positive.
    #[must_use]
    pub fn has_area(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }

    /// Scale a relative rectangle to canvas pixels, rounding each edge
    /// value to whole pixels.
    #[must_use]
    pub fn to_absolute(&self, canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            left: (self.left * canvas_width).round(),
            top: (self.top * canvas_height).round(),
            width: (self.width * canvas_width).round(),
            height: (self.height * canvas_height).round(),
        }
    }
}

impl Default for ViewportRect {
    fn default() -> Self {
        Self::FULL
    }
}

/// Render-target viewport that makes a full-viewport render land a chosen
/// pixel at the target's origin.
///
/// `x` and `y` follow the bottom-left convention of a GL style viewport and
/// are usually negative. Backends that cannot set negative viewports apply
/// [`Self::clip_transform`] to the projection instead and render with a
/// viewport covering the whole target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickRect {
    /// Viewport left edge in target pixels.
    pub x: f64,
    /// Viewport bottom edge in target pixels.
    pub y: f64,
    /// Source viewport width.
    pub width: f64,
    /// Source viewport height.
    pub height: f64,
    /// Width of the pick render target.
    pub target_width: f64,
    /// Height of the pick render target.
    pub target_height: f64,
}

impl PickRect {
    /// Pick rectangle for the canvas pixel `(query_x, query_y)` inside
    /// `viewport`, rendered into a target of the given size.
    ///
    /// The queried pixel ends up in the top-left texel of the target.
    #[must_use]
    pub fn new(
        viewport: &ViewportRect,
        query_x: f64,
        query_y: f64,
        target_width: f64,
        target_height: f64,
    ) -> Self {
        let local_x = (query_x - viewport.left).floor();
        let local_y = (query_y - viewport.top).floor();
        Self {
            x: -local_x,
            y: -viewport.height + local_y + target_height,
            width: viewport.width,
            height: viewport.height,
            target_width,
            target_height,
        }
    }

    /// Clip-space transform equivalent to rendering through this viewport
    /// into a viewport covering the whole target.
    ///
    /// Pre-multiply the view-projection matrix with it.
    #[must_use]
    pub fn clip_transform(&self) -> DMat4 {
        let sx = self.width / self.target_width;
        let sy = self.height / self.target_height;
        let tx = (2.0 * self.x + self.width) / self.target_width - 1.0;
        let ty = (2.0 * self.y + self.height) / self.target_height - 1.0;
        DMat4::from_cols(
            DVec4::new(sx, 0.0, 0.0, 0.0),
            DVec4::new(0.0, sy, 0.0, 0.0),
            DVec4::new(0.0, 0.0, 1.0, 0.0),
            DVec4::new(tx, ty, 0.0, 1.0),
        )
    }
}
