//! Segment representation used by the sweep.
//!
//! Endpoints are normalized into sweep order on construction: the
//! `upper` endpoint is the one visited first by a sweep line moving
//! top to bottom, left to right. Segments are immutable once built
//! and identified by their input index.

use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat, Line};

use crate::error::SweepError;
use crate::geometry::{approx_cmp, coords_eq};

/// Identifier of an input segment: its index in the input sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub usize);

/// A line segment with endpoints in sweep order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment<T: GeoFloat> {
    id: SegmentId,
    upper: Coordinate<T>,
    lower: Coordinate<T>,
}

impl<T: GeoFloat> Segment<T> {
    /// Build a segment from an input line, normalizing the endpoint
    /// order. Rejects non-finite coordinates and segments of
    /// (near-)zero length.
    pub fn new(id: SegmentId, line: Line<T>, eps: T) -> Result<Self, SweepError> {
        let a = line.start;
        let b = line.end;
        let finite =
            a.x.is_finite() && a.y.is_finite() && b.x.is_finite() && b.y.is_finite();
        if !finite || coords_eq(a, b, eps) {
            return Err(SweepError::InvalidSegment { index: id.0 });
        }
        // Ordering under the same tolerance as everything else, so a
        // segment horizontal within it normalizes left to right.
        let a_first = match approx_cmp(a.y, b.y, eps) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => a.x < b.x,
        };
        let (upper, lower) = if a_first { (a, b) } else { (b, a) };
        Ok(Segment { id, upper, lower })
    }

    #[inline]
    pub fn id(&self) -> SegmentId {
        self.id
    }

    #[inline]
    pub fn upper(&self) -> Coordinate<T> {
        self.upper
    }

    #[inline]
    pub fn lower(&self) -> Coordinate<T> {
        self.lower
    }

    #[inline]
    pub fn line(&self) -> Line<T> {
        Line::new(self.upper, self.lower)
    }

    /// Whether the segment is horizontal within the tolerance.
    #[inline]
    pub fn is_horizontal(&self, eps: T) -> bool {
        approx_cmp(self.upper.y, self.lower.y, eps) == Ordering::Equal
    }

    /// The segment's x position at sweep height `y`.
    ///
    /// Segments horizontal within the tolerance answer with their
    /// left endpoint, leaving finer placement to the slope tie-break
    /// in the status ordering; extrapolating their near-zero rise
    /// would blow the key up instead.
    pub fn x_at_y(&self, y: T, eps: T) -> T {
        let dy = self.upper.y - self.lower.y;
        if approx_cmp(dy, T::zero(), eps) == Ordering::Equal {
            self.upper.x
        } else {
            self.upper.x + (y - self.upper.y) * (self.upper.x - self.lower.x) / dy
        }
    }

    /// The slope dx/dy of the segment, the x change per unit of
    /// ascending y, used to order segments that meet the sweep line
    /// at a common point. Segments horizontal within the tolerance
    /// map to negative infinity so they sort after everything else
    /// just below the line.
    pub fn sweep_slope(&self, eps: T) -> T {
        let dy = self.upper.y - self.lower.y;
        if approx_cmp(dy, T::zero(), eps) == Ordering::Equal {
            T::neg_infinity()
        } else {
            (self.upper.x - self.lower.x) / dy
        }
    }

    /// Whether `pt` lies within the segment's bounding box, expanded
    /// by the tolerance.
    pub fn bounds_contain(&self, pt: Coordinate<T>, eps: T) -> bool {
        let (min_x, max_x) = if self.upper.x <= self.lower.x {
            (self.upper.x, self.lower.x)
        } else {
            (self.lower.x, self.upper.x)
        };
        pt.x >= min_x - eps
            && pt.x <= max_x + eps
            && pt.y >= self.lower.y - eps
            && pt.y <= self.upper.y + eps
    }

    /// Whether `pt` coincides with either endpoint.
    #[inline]
    pub fn is_endpoint(&self, pt: Coordinate<T>, eps: T) -> bool {
        coords_eq(pt, self.upper, eps) || coords_eq(pt, self.lower, eps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn seg(line: [(f64, f64); 2]) -> Segment<f64> {
        Segment::new(SegmentId(0), Line::from(line), EPS).unwrap()
    }

    #[test]
    fn test_normalization() {
        let s = seg([(3., 1.), (1., 3.)]);
        assert_eq!(s.upper(), Coordinate { x: 1., y: 3. });
        assert_eq!(s.lower(), Coordinate { x: 3., y: 1. });

        // Horizontal: left endpoint is upper.
        let h = seg([(5., 2.), (1., 2.)]);
        assert_eq!(h.upper(), Coordinate { x: 1., y: 2. });
        assert_eq!(h.lower(), Coordinate { x: 5., y: 2. });
    }

    #[test]
    fn test_invalid_input() {
        assert!(Segment::new(SegmentId(3), Line::from([(1., 1.), (1., 1.)]), EPS).is_err());
        assert!(
            Segment::new(SegmentId(3), Line::from([(f64::NAN, 1.), (2., 2.)]), EPS).is_err()
        );
        assert!(Segment::new(
            SegmentId(3),
            Line::from([(f64::INFINITY, 1.), (2., 2.)]),
            EPS
        )
        .is_err());
    }

    #[test]
    fn test_x_at_y() {
        let s = seg([(0., 0.), (10., 10.)]);
        assert_eq!(s.x_at_y(5., EPS), 5.);

        let v = seg([(6., 1.), (6., 4.5)]);
        assert_eq!(v.x_at_y(3., EPS), 6.);

        let h = seg([(1., 2.), (5., 2.)]);
        assert_eq!(h.x_at_y(2., EPS), 1.);
    }

    #[test]
    fn test_sweep_slope() {
        // x shrinks as y rises.
        let s = seg([(0., 10.), (10., 0.)]);
        assert_eq!(s.sweep_slope(EPS), -1.);

        // x grows as y rises.
        let r = seg([(0., 0.), (10., 10.)]);
        assert_eq!(r.sweep_slope(EPS), 1.);

        let v = seg([(6., 1.), (6., 4.5)]);
        assert_eq!(v.sweep_slope(EPS), 0.);

        let h = seg([(1., 2.), (5., 2.)]);
        assert_eq!(h.sweep_slope(EPS), f64::NEG_INFINITY);
    }

    #[test]
    fn test_near_horizontal_is_horizontal() {
        // A rise below the tolerance behaves exactly like a flat
        // segment: left-to-right normalization, left-endpoint key,
        // horizontal slope.
        let s = seg([(10., 1e-10), (0., 0.)]);
        assert!(s.is_horizontal(EPS));
        assert_eq!(s.upper(), Coordinate { x: 0., y: 0. });
        assert_eq!(s.x_at_y(0., EPS), 0.);
        assert_eq!(s.sweep_slope(EPS), f64::NEG_INFINITY);
    }

    #[test]
    fn test_bounds_contain() {
        let s = seg([(0., 0.), (10., 10.)]);
        assert!(s.bounds_contain(Coordinate { x: 5., y: 5. }, EPS));
        assert!(s.bounds_contain(Coordinate { x: 0., y: 0. }, EPS));
        assert!(!s.bounds_contain(Coordinate { x: 11., y: 5. }, EPS));
        assert!(!s.bounds_contain(Coordinate { x: 5., y: -1. }, EPS));
    }
}
