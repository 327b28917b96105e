//! Sweep points, events and the event queue.
//!
//! Events are keyed by their coordinate in sweep order and merged:
//! at most one event exists per (tolerance-equal) point, carrying the
//! sets of segments that start, end, or pass through it.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use geo::{Coordinate, GeoFloat};
use smallvec::SmallVec;

use crate::geometry::sweep_cmp;
use crate::segments::SegmentId;

/// A coordinate ordered by the sweep: descending `y`, then ascending
/// `x`, with ties resolved under the tolerance.
#[derive(Debug, Clone, Copy)]
pub struct SweepPoint<T: GeoFloat> {
    pub coord: Coordinate<T>,
    eps: T,
}

impl<T: GeoFloat> SweepPoint<T> {
    pub fn new(coord: Coordinate<T>, eps: T) -> Self {
        SweepPoint { coord, eps }
    }
}

impl<T: GeoFloat> PartialEq for SweepPoint<T> {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}
impl<T: GeoFloat> Eq for SweepPoint<T> {}

impl<T: GeoFloat> PartialOrd for SweepPoint<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T: GeoFloat> Ord for SweepPoint<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        sweep_cmp(self.coord, other.coord, self.eps)
    }
}

/// Which role a segment plays at an event point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// The segment starts (its upper endpoint) here.
    Upper,
    /// The segment ends (its lower endpoint) here.
    Lower,
    /// The point lies in the segment's interior.
    Interior,
}

/// The merged event at one sweep point.
#[derive(Debug, Clone, Default)]
pub struct Event {
    pub upper: SmallVec<[SegmentId; 2]>,
    pub lower: SmallVec<[SegmentId; 2]>,
    pub interior: SmallVec<[SegmentId; 2]>,
}

impl Event {
    fn add(&mut self, kind: EventKind, id: SegmentId) {
        let set = match kind {
            EventKind::Upper => &mut self.upper,
            EventKind::Lower => &mut self.lower,
            EventKind::Interior => &mut self.interior,
        };
        if !set.contains(&id) {
            set.push(id);
        }
    }
}

/// Priority queue of pending events, at most one per sweep point.
#[derive(Debug)]
pub struct EventQueue<T: GeoFloat> {
    events: BTreeMap<SweepPoint<T>, Event>,
}

impl<T: GeoFloat> EventQueue<T> {
    pub fn new() -> Self {
        EventQueue {
            events: BTreeMap::new(),
        }
    }

    /// Register `id` at `point` with the given role, merging into an
    /// existing event when the point is already scheduled.
    pub fn schedule(&mut self, point: SweepPoint<T>, kind: EventKind, id: SegmentId) {
        self.events
            .entry(point)
            .or_insert_with(Event::default)
            .add(kind, id);
    }

    /// Remove and return the next event in sweep order.
    pub fn pop(&mut self) -> Option<(SweepPoint<T>, Event)> {
        let point = *self.events.keys().next()?;
        let event = self.events.remove(&point)?;
        Some((point, event))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn pt(x: f64, y: f64) -> SweepPoint<f64> {
        SweepPoint::new(Coordinate { x, y }, EPS)
    }

    #[test]
    fn test_sweep_order() {
        // Higher y first, then smaller x.
        assert!(pt(5., 10.) < pt(0., 9.));
        assert!(pt(1., 4.) < pt(2., 4.));
        assert_eq!(pt(1., 4.), pt(1. + 1e-12, 4.));
    }

    #[test]
    fn test_queue_ordering() {
        let mut queue = EventQueue::new();
        queue.schedule(pt(2., 4.), EventKind::Upper, SegmentId(0));
        queue.schedule(pt(1., 9.), EventKind::Upper, SegmentId(1));
        queue.schedule(pt(1., 4.), EventKind::Lower, SegmentId(2));

        let order: Vec<_> = std::iter::from_fn(|| queue.pop())
            .map(|(p, _)| (p.coord.x, p.coord.y))
            .collect();
        assert_eq!(order, vec![(1., 9.), (1., 4.), (2., 4.)]);
    }

    #[test]
    fn test_merge_at_equal_points() {
        let mut queue = EventQueue::new();
        queue.schedule(pt(3., 3.), EventKind::Upper, SegmentId(0));
        queue.schedule(pt(3. + 1e-12, 3.), EventKind::Lower, SegmentId(1));
        queue.schedule(pt(3., 3. - 1e-12), EventKind::Interior, SegmentId(2));
        // Duplicate registration is idempotent.
        queue.schedule(pt(3., 3.), EventKind::Upper, SegmentId(0));

        let (_, event) = queue.pop().unwrap();
        assert_eq!(event.upper.as_slice(), &[SegmentId(0)]);
        assert_eq!(event.lower.as_slice(), &[SegmentId(1)]);
        assert_eq!(event.interior.as_slice(), &[SegmentId(2)]);
        assert!(queue.pop().is_none());
    }
}
