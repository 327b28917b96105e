//! Error types for the sweep.

use geo::GeoFloat;
use thiserror::Error;

use crate::sweep::Intersection;

/// Failure conditions of the sweep.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepError {
    /// An input segment was degenerate: zero length within the
    /// tolerance, or a non-finite coordinate.
    #[error("input segment {index} is degenerate or non-finite")]
    InvalidSegment { index: usize },

    /// The tolerance-based ordering became non-transitive and a
    /// status lookup could not be completed. Continuing would corrupt
    /// the status structure.
    #[error("status ordering became inconsistent under the tolerance")]
    InconsistentOrder,

    /// The configured work budget was exhausted before the sweep
    /// completed.
    #[error("sweep exceeded the configured budget of {budget} operations")]
    BudgetExceeded { budget: usize },
}

/// A mid-run failure, carrying the intersections discovered before
/// the sweep aborted.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{kind}")]
pub struct SweepFailure<T: GeoFloat> {
    pub kind: SweepError,
    /// Intersections recorded before the failure.
    pub partial: Vec<Intersection<T>>,
}

impl<T: GeoFloat> SweepFailure<T> {
    pub(crate) fn new(kind: SweepError, partial: Vec<Intersection<T>>) -> Self {
        SweepFailure { kind, partial }
    }
}
