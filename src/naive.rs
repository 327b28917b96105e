//! Quadratic all-pairs intersection, with the same tolerance policy
//! as the sweep. The cross-check oracle for randomized tests and a
//! debugging aid; use [`crate::intersections`] for real workloads.

use geo::{Coordinate, GeoFloat, Line};
use itertools::Itertools;

use crate::error::SweepError;
use crate::geometry::{self, coords_eq, SegmentIntersection};
use crate::segments::{Segment, SegmentId};
use crate::sweep::{Intersection, SweepConfig};

/// Intersect every pair of segments, merging points that coincide
/// under the tolerance.
pub fn brute_force<T: GeoFloat>(
    lines: &[Line<T>],
    config: &SweepConfig<T>,
) -> Result<Vec<Intersection<T>>, SweepError> {
    let eps = config.eps;
    let segments: Vec<Segment<T>> = lines
        .iter()
        .enumerate()
        .map(|(index, &line)| Segment::new(SegmentId(index), line, eps))
        .collect::<Result<_, _>>()?;

    let mut out: Vec<Intersection<T>> = Vec::new();
    for (a, b) in segments.iter().tuple_combinations::<(_, _)>() {
        match geometry::intersect(a, b, eps) {
            None => {}
            Some(SegmentIntersection::Point(p)) => record(&mut out, p, a.id(), b.id(), eps),
            Some(SegmentIntersection::Overlap(start, end)) => {
                record(&mut out, start, a.id(), b.id(), eps);
                record(&mut out, end, a.id(), b.id(), eps);
            }
        }
    }
    for entry in &mut out {
        entry.segments.sort();
    }
    Ok(out)
}

fn record<T: GeoFloat>(
    out: &mut Vec<Intersection<T>>,
    p: Coordinate<T>,
    a: SegmentId,
    b: SegmentId,
    eps: T,
) {
    if let Some(entry) = out.iter_mut().find(|e| coords_eq(e.point, p, eps)) {
        for &id in &[a, b] {
            if !entry.segments.contains(&id) {
                entry.segments.push(id);
            }
        }
    } else {
        out.push(Intersection {
            point: p,
            segments: vec![a, b],
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_pair() {
        let lines = vec![
            Line::from([(0., 0.), (10., 10.)]),
            Line::from([(0., 10.), (10., 0.)]),
        ];
        let out = brute_force(&lines, &SweepConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].segments, vec![SegmentId(0), SegmentId(1)]);
    }

    #[test]
    fn test_merges_common_point() {
        let lines = vec![
            Line::from([(0., 0.), (4., 4.)]),
            Line::from([(0., 4.), (4., 0.)]),
            Line::from([(2., 0.), (2., 4.)]),
        ];
        let out = brute_force(&lines, &SweepConfig::default()).unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(
            out[0].segments,
            vec![SegmentId(0), SegmentId(1), SegmentId(2)]
        );
    }

    #[test]
    fn test_rejects_degenerate_input() {
        let lines = vec![Line::from([(1., 1.), (1., 1.)])];
        assert_eq!(
            brute_force(&lines, &SweepConfig::default()),
            Err(SweepError::InvalidSegment { index: 0 })
        );
    }
}
