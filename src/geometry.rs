//! Tolerance-aware geometric predicates used throughout the sweep.
//!
//! Every floating-point comparison in the crate funnels through
//! [`approx_cmp`] so that the robustness policy is defined in exactly
//! one place. An inconsistent mix of tolerances would break the total
//! order required by the status structure.

use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};

use crate::segments::Segment;

/// Compare two scalars, treating values within `eps` of each other as
/// equal.
#[inline]
pub fn approx_cmp<T: GeoFloat>(a: T, b: T, eps: T) -> Ordering {
    if (a - b).abs() <= eps {
        Ordering::Equal
    } else if a < b {
        Ordering::Less
    } else {
        Ordering::Greater
    }
}

/// Scalar equality under the tolerance.
#[inline]
pub fn approx_eq<T: GeoFloat>(a: T, b: T, eps: T) -> bool {
    approx_cmp(a, b, eps) == Ordering::Equal
}

/// Coordinate equality under the tolerance.
#[inline]
pub fn coords_eq<T: GeoFloat>(a: Coordinate<T>, b: Coordinate<T>, eps: T) -> bool {
    approx_eq(a.x, b.x, eps) && approx_eq(a.y, b.y, eps)
}

/// Order two coordinates in sweep order: descending `y`, then
/// ascending `x`. The sweep line moves from top to bottom, visiting
/// points on the same height from left to right.
#[inline]
pub fn sweep_cmp<T: GeoFloat>(a: Coordinate<T>, b: Coordinate<T>, eps: T) -> Ordering {
    approx_cmp(b.y, a.y, eps).then_with(|| approx_cmp(a.x, b.x, eps))
}

/// Position of a point relative to a directed line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    Left,
    Right,
    Collinear,
}

/// Orientation of `r` with respect to the directed line from `p`
/// through `q`, via the sign of the cross-product determinant.
pub fn orient2d<T: GeoFloat>(
    p: Coordinate<T>,
    q: Coordinate<T>,
    r: Coordinate<T>,
    eps: T,
) -> Orientation {
    let det = (q.x - p.x) * (r.y - p.y) - (q.y - p.y) * (r.x - p.x);
    match approx_cmp(det, T::zero(), eps) {
        Ordering::Equal => Orientation::Collinear,
        Ordering::Greater => Orientation::Left,
        Ordering::Less => Orientation::Right,
    }
}

/// A non-empty intersection of two segments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SegmentIntersection<T: GeoFloat> {
    /// The segments meet at a single point (including shared or
    /// touching endpoints).
    Point(Coordinate<T>),
    /// The segments are collinear and overlap on an interval; the
    /// boundary points are given in sweep order.
    Overlap(Coordinate<T>, Coordinate<T>),
}

/// Intersect two segments, returning `None` if they do not meet.
///
/// Uses the same tolerance as the rest of the crate: a near-zero
/// denominator is treated as parallel, and candidate points are
/// accepted if they fall within `eps` of both segments' bounds.
pub fn intersect<T: GeoFloat>(
    a: &Segment<T>,
    b: &Segment<T>,
    eps: T,
) -> Option<SegmentIntersection<T>> {
    let (p1, p2) = (a.upper(), a.lower());
    let (q1, q2) = (b.upper(), b.lower());
    let d1 = Coordinate {
        x: p2.x - p1.x,
        y: p2.y - p1.y,
    };
    let d2 = Coordinate {
        x: q2.x - q1.x,
        y: q2.y - q1.y,
    };
    let denom = d1.x * d2.y - d1.y * d2.x;

    if approx_eq(denom, T::zero(), eps) {
        // Parallel; only collinear segments can still meet.
        if orient2d(p1, p2, q1, eps) != Orientation::Collinear {
            return None;
        }
        // Overlap is the intersection of the two endpoint intervals
        // in sweep order.
        let start = if sweep_cmp(p1, q1, eps) == Ordering::Less {
            q1
        } else {
            p1
        };
        let end = if sweep_cmp(p2, q2, eps) == Ordering::Less {
            p2
        } else {
            q2
        };
        match sweep_cmp(start, end, eps) {
            Ordering::Greater => None,
            Ordering::Equal => Some(SegmentIntersection::Point(start)),
            Ordering::Less => Some(SegmentIntersection::Overlap(start, end)),
        }
    } else {
        let rx = q1.x - p1.x;
        let ry = q1.y - p1.y;
        let t = (rx * d2.y - ry * d2.x) / denom;
        let pt = Coordinate {
            x: p1.x + t * d1.x,
            y: p1.y + t * d1.y,
        };
        if a.bounds_contain(pt, eps) && b.bounds_contain(pt, eps) {
            Some(SegmentIntersection::Point(pt))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::segments::SegmentId;
    use geo::Line;

    const EPS: f64 = 1e-9;

    fn seg(id: usize, line: [(f64, f64); 2]) -> Segment<f64> {
        Segment::new(SegmentId(id), Line::from(line), EPS).unwrap()
    }

    #[test]
    fn test_approx_cmp() {
        assert_eq!(approx_cmp(1.0, 1.0 + 1e-12, EPS), Ordering::Equal);
        assert_eq!(approx_cmp(1.0, 2.0, EPS), Ordering::Less);
        assert_eq!(approx_cmp(2.0, 1.0, EPS), Ordering::Greater);
    }

    #[test]
    fn test_orientation() {
        let p = Coordinate { x: 0., y: 0. };
        let q = Coordinate { x: 1., y: 0. };
        let above = Coordinate { x: 0.5, y: 1. };
        let below = Coordinate { x: 0.5, y: -1. };
        let on = Coordinate { x: 2., y: 0. };
        assert_eq!(orient2d(p, q, above, EPS), Orientation::Left);
        assert_eq!(orient2d(p, q, below, EPS), Orientation::Right);
        assert_eq!(orient2d(p, q, on, EPS), Orientation::Collinear);
    }

    #[test]
    fn test_crossing_intersection() {
        let a = seg(0, [(0., 0.), (10., 10.)]);
        let b = seg(1, [(0., 10.), (10., 0.)]);
        match intersect(&a, &b, EPS) {
            Some(SegmentIntersection::Point(p)) => {
                assert!(coords_eq(p, Coordinate { x: 5., y: 5. }, 1e-6));
            }
            other => panic!("expected point intersection, got {:?}", other),
        }
    }

    #[test]
    fn test_shared_endpoint() {
        let a = seg(0, [(0., 0.), (5., 5.)]);
        let b = seg(1, [(5., 5.), (10., 0.)]);
        match intersect(&a, &b, EPS) {
            Some(SegmentIntersection::Point(p)) => {
                assert!(coords_eq(p, Coordinate { x: 5., y: 5. }, 1e-6));
            }
            other => panic!("expected shared endpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_disjoint_parallel() {
        let a = seg(0, [(0., 0.), (10., 10.)]);
        let b = seg(1, [(0., 1.), (10., 11.)]);
        assert!(intersect(&a, &b, EPS).is_none());
    }

    #[test]
    fn test_collinear_overlap() {
        let a = seg(0, [(0., 0.), (4., 4.)]);
        let b = seg(1, [(1., 1.), (3., 3.)]);
        match intersect(&a, &b, EPS) {
            Some(SegmentIntersection::Overlap(start, end)) => {
                // Sweep order: higher point first.
                assert!(coords_eq(start, Coordinate { x: 3., y: 3. }, 1e-6));
                assert!(coords_eq(end, Coordinate { x: 1., y: 1. }, 1e-6));
            }
            other => panic!("expected overlap, got {:?}", other),
        }
    }

    #[test]
    fn test_collinear_disjoint() {
        let a = seg(0, [(0., 0.), (1., 1.)]);
        let b = seg(1, [(2., 2.), (3., 3.)]);
        assert!(intersect(&a, &b, EPS).is_none());
    }

    #[test]
    fn test_near_miss() {
        let a = seg(0, [(0., 0.), (4., 4.)]);
        let b = seg(1, [(5., 5.5), (9., 9.)]);
        assert!(intersect(&a, &b, EPS).is_none());
    }
}
