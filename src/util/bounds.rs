//! Axis-aligned bounding boxes and the selection bracket built from them.

use glam::DVec3;

/// Axis-aligned bounding box in double precision.
///
/// A freshly created box is *empty* (`min = +inf`, `max = -inf`) and becomes
/// finite once at least one point has been added.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Minimum corner.
    pub min: DVec3,
    /// Maximum corner.
    pub max: DVec3,
}

impl Default for Bounds {
    fn default() -> Self {
        Self::empty()
    }
}

impl Bounds {
    /// An empty box that contains nothing.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            min: DVec3::splat(f64::INFINITY),
            max: DVec3::splat(f64::NEG_INFINITY),
        }
    }

    /// Box spanning the given corners.
    #[must_use]
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    /// Cube centered on the origin with the given half extent.
    #[must_use]
    pub fn cube(half_extent: f64) -> Self {
        Self {
            min: DVec3::splat(-half_extent),
            max: DVec3::splat(half_extent),
        }
    }

    /// Smallest box containing all `points`; empty when `points` is empty.
    #[must_use]
    pub fn from_points(points: &[DVec3]) -> Self {
        points.iter().fold(Self::empty(), |mut acc, p| {
            acc.union_point(*p);
            acc
        })
    }

    /// Grow the box to contain `point`.
    pub fn union_point(&mut self, point: DVec3) {
        self.min = self.min.min(point);
        self.max = self.max.max(point);
    }

    /// `true` if both corners are finite and ordered.
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite()
            && self.max.is_finite()
            && self.min.cmple(self.max).all()
    }

    /// Center point.
    #[must_use]
    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    /// Edge lengths along each axis.
    #[must_use]
    pub fn size(&self) -> DVec3 {
        self.max - self.min
    }

    /// Radius of the bounding sphere around [`Self::center`].
    #[must_use]
    pub fn radius(&self) -> f64 {
        self.size().length() * 0.5
    }

    /// Line segments of a corner bracket around the box.
    ///
    /// Each of the eight corners gets three short edges pointing inward,
    /// `length` being the fraction of the box size per axis. A box without
    /// finite extent produces a unit axis cross centered on the origin
    /// instead.
    #[must_use]
    pub fn bracket_segments(&self, length: f64) -> Vec<[DVec3; 2]> {
        let arm = self.size() * length;
        if !self.min.is_finite() || !self.max.is_finite() || !arm.is_finite()
        {
            return vec![
                [DVec3::NEG_X, DVec3::X],
                [DVec3::NEG_Y, DVec3::Y],
                [DVec3::NEG_Z, DVec3::Z],
            ];
        }

        let mut segments = Vec::with_capacity(24);
        for corner in 0..8u8 {
            let pick_max = |bit: u8| corner & (1 << bit) != 0;
            let origin = DVec3::new(
                if pick_max(0) { self.max.x } else { self.min.x },
                if pick_max(1) { self.max.y } else { self.min.y },
                if pick_max(2) { self.max.z } else { self.min.z },
            );
            // Arms point back toward the interior of the box.
            let sign = DVec3::new(
                if pick_max(0) { -1.0 } else { 1.0 },
                if pick_max(1) { -1.0 } else { 1.0 },
                if pick_max(2) { -1.0 } else { 1.0 },
            );
            segments.push([origin, origin + DVec3::X * arm.x * sign.x]);
            segments.push([origin, origin + DVec3::Y * arm.y * sign.y]);
            segments.push([origin, origin + DVec3::Z * arm.z * sign.z]);
        }
        segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_box_is_not_finite() {
        assert!(!Bounds::empty().is_finite());
        assert!(!Bounds::from_points(&[]).is_finite());
    }

    #[test]
    fn from_points_spans_all_points() {
        let b = Bounds::from_points(&[
            DVec3::new(1.0, -2.0, 3.0),
            DVec3::new(-1.0, 4.0, 0.0),
        ]);
        assert!(b.is_finite());
        assert_eq!(b.min, DVec3::new(-1.0, -2.0, 0.0));
        assert_eq!(b.max, DVec3::new(1.0, 4.0, 3.0));
        assert_eq!(b.center(), DVec3::new(0.0, 1.0, 1.5));
    }

    #[test]
    fn bracket_has_three_arms_per_corner() {
        let b = Bounds::cube(1.0);
        let segments = b.bracket_segments(0.25);
        assert_eq!(segments.len(), 24);
        // Every arm is a quarter of the 2-unit edge
        for [a, b] in &segments {
            assert!(((*b - *a).length() - 0.5).abs() < 1e-12);
        }
        // Arms stay inside the box
        for [_, end] in &segments {
            assert!(end.abs().max_element() <= 1.0);
        }
    }

    #[test]
    fn degenerate_bracket_falls_back_to_axis_cross() {
        let segments = Bounds::empty().bracket_segments(0.25);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0], [DVec3::NEG_X, DVec3::X]);
        assert!(segments.iter().flatten().all(|p| p.is_finite()));
    }
}
