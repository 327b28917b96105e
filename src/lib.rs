//! Compute all intersections among a set of 2-D line segments using
//! the Bentley-Ottmann plane sweep: O((n + k) log n) time for n
//! segments with k intersection points.
//!
//! The sweep line moves top to bottom, left to right along ties,
//! pausing at event points: segment endpoints and discovered
//! crossings. A balanced status structure keeps the segments that
//! currently straddle the line ordered left to right, so only
//! adjacent segments ever need an intersection test. Robustness is
//! tolerance-based: every coordinate comparison funnels through a
//! single epsilon, configurable via [`SweepConfig`].
//!
//! # Example
//!
//! ```rust
//! use geo::Line;
//! use sweepline_intersections::{intersections, SweepConfig};
//!
//! let lines = vec![
//!     Line::from([(0., 0.), (10., 10.)]),
//!     Line::from([(0., 10.), (10., 0.)]),
//! ];
//!
//! let found = intersections(lines, &SweepConfig::default()).unwrap();
//! assert_eq!(found.len(), 1);
//! assert_eq!(found[0].segments.len(), 2);
//! ```
//!
//! Multiple segments through one point are reported as a single
//! [`Intersection`] listing every participant. Collinear overlaps are
//! reported at the two boundary points of the shared interval.
//!
//! [`naive::brute_force`] provides a quadratic all-pairs oracle with
//! the same tolerance policy, useful for cross-checking.

mod error;
mod events;
mod geometry;
pub mod naive;
mod segments;
mod status;
mod sweep;

pub use error::{SweepError, SweepFailure};
pub use geometry::{
    approx_cmp, intersect, orient2d, sweep_cmp, Orientation, SegmentIntersection,
};
pub use segments::{Segment, SegmentId};
pub use sweep::{
    intersections, Intersection, Sweep, SweepConfig, SweepStats, DEFAULT_EPSILON,
};
