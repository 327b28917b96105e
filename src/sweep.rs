//! The sweep controller: drives the event loop of the
//! Bentley-Ottmann algorithm and collects the output.
//!
//! The sweep line moves top to bottom, left to right along ties.
//! Each event point is processed in one pass: segments ending or
//! passing through the point leave the status structure under the
//! ordering of the previous event point, segments starting or passing
//! through re-enter under the ordering of the current point (which
//! realizes the crossing swap), and the newly adjacent pairs are
//! tested for intersections ahead of the sweep.

use std::mem;

use geo::{Coordinate, GeoFloat, Line};
use log::{debug, trace};
use slab::Slab;
use smallvec::SmallVec;

use crate::error::{SweepError, SweepFailure};
use crate::events::{Event, EventKind, EventQueue, SweepPoint};
use crate::geometry::{self, approx_cmp, sweep_cmp, SegmentIntersection};
use crate::segments::{Segment, SegmentId};
use crate::status::{OrderCtx, StatusTree};

use std::cmp::Ordering;

/// Default tolerance for coordinate comparisons.
pub const DEFAULT_EPSILON: f64 = 1e-9;

/// Sweep parameters.
#[derive(Debug, Clone, Copy)]
pub struct SweepConfig<T: GeoFloat> {
    /// Tolerance under which coordinates compare equal.
    pub eps: T,
    /// Optional cap on total work (events processed plus status
    /// operations). `None` leaves the sweep unbounded.
    pub budget: Option<usize>,
}

impl<T: GeoFloat> Default for SweepConfig<T> {
    fn default() -> Self {
        SweepConfig {
            eps: T::from(DEFAULT_EPSILON).expect("epsilon representable in the scalar type"),
            budget: None,
        }
    }
}

/// One reported intersection point with every segment through it.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection<T: GeoFloat> {
    pub point: Coordinate<T>,
    /// Identifiers of all segments through the point, sorted.
    pub segments: Vec<SegmentId>,
}

/// Work counters of a finished (or aborted) sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepStats {
    /// Events processed.
    pub events: usize,
    /// Operations performed on the status structure.
    pub status_ops: usize,
}

/// Compute all intersections among `lines`.
///
/// Convenience wrapper around [`Sweep`]; input validation errors are
/// reported as a failure with empty partial output.
pub fn intersections<T, I>(
    lines: I,
    config: &SweepConfig<T>,
) -> Result<Vec<Intersection<T>>, SweepFailure<T>>
where
    T: GeoFloat,
    I: IntoIterator<Item = Line<T>>,
{
    let mut sweep =
        Sweep::new(lines, config).map_err(|kind| SweepFailure::new(kind, Vec::new()))?;
    sweep.run()?;
    Ok(sweep.into_intersections())
}

/// State of one sweep over a set of segments.
pub struct Sweep<T: GeoFloat> {
    segments: Slab<Segment<T>>,
    queue: EventQueue<T>,
    status: StatusTree,
    output: Vec<Intersection<T>>,
    /// The previous event point; the status arrangement is valid for
    /// the ordering there until the current event mutates it.
    sweep_pos: Option<Coordinate<T>>,
    /// Horizontal segments lying on the current sweep height.
    live_horizontals: SmallVec<[SegmentId; 2]>,
    eps: T,
    budget: Option<usize>,
    events_processed: usize,
}

impl<T: GeoFloat> Sweep<T> {
    /// Validate the input and seed the event queue with the segment
    /// endpoints.
    pub fn new<I>(lines: I, config: &SweepConfig<T>) -> Result<Self, SweepError>
    where
        I: IntoIterator<Item = Line<T>>,
    {
        let mut segments = Slab::new();
        let mut queue = EventQueue::new();
        for (index, line) in lines.into_iter().enumerate() {
            let seg = Segment::new(SegmentId(index), line, config.eps)?;
            let key = segments.insert(seg);
            debug_assert_eq!(key, index);
            queue.schedule(
                SweepPoint::new(seg.upper(), config.eps),
                EventKind::Upper,
                seg.id(),
            );
            queue.schedule(
                SweepPoint::new(seg.lower(), config.eps),
                EventKind::Lower,
                seg.id(),
            );
        }
        Ok(Sweep {
            segments,
            queue,
            status: StatusTree::new(),
            output: Vec::new(),
            sweep_pos: None,
            live_horizontals: SmallVec::new(),
            eps: config.eps,
            budget: config.budget,
            events_processed: 0,
        })
    }

    /// Run the sweep to completion.
    pub fn run(&mut self) -> Result<(), SweepFailure<T>> {
        while let Some((point, event)) = self.queue.pop() {
            if let Some(budget) = self.budget {
                let work = self.events_processed + self.status.ops();
                if work > budget {
                    debug!("aborting after {} units of work", work);
                    return Err(self.fail(SweepError::BudgetExceeded { budget }));
                }
            }
            self.events_processed += 1;
            if let Err(kind) = self.handle_event(point.coord, event) {
                return Err(self.fail(kind));
            }
        }
        Ok(())
    }

    /// Intersections found so far.
    pub fn intersections(&self) -> &[Intersection<T>] {
        &self.output
    }

    pub fn into_intersections(self) -> Vec<Intersection<T>> {
        self.output
    }

    pub fn stats(&self) -> SweepStats {
        SweepStats {
            events: self.events_processed,
            status_ops: self.status.ops(),
        }
    }

    fn fail(&mut self, kind: SweepError) -> SweepFailure<T> {
        SweepFailure::new(kind, mem::take(&mut self.output))
    }

    fn handle_event(&mut self, p: Coordinate<T>, event: Event) -> Result<(), SweepError> {
        trace!(
            "event: {} upper, {} lower, {} interior",
            event.upper.len(),
            event.lower.len(),
            event.interior.len()
        );

        let mut contrib: SmallVec<[SegmentId; 4]> = SmallVec::new();
        for &id in event
            .upper
            .iter()
            .chain(event.lower.iter())
            .chain(event.interior.iter())
        {
            if !contrib.contains(&id) {
                contrib.push(id);
            }
        }

        // Horizontals above the current height are gone.
        {
            let eps = self.eps;
            let segments = &self.segments;
            self.live_horizontals
                .retain(|id| approx_cmp(segments[id.0].upper().y, p.y, eps) == Ordering::Equal);
        }

        // Segments ending or passing through p leave the status under
        // the ordering at the previous event point, where the tree's
        // arrangement is still valid. Each removal makes its former
        // neighbors adjacent, so that pair is tested; a horizontal
        // occupies the tree at its left endpoint, away from p, and a
        // lookup at p alone would miss the gap it leaves.
        let mut checks: SmallVec<[(SegmentId, SegmentId); 2]> = SmallVec::new();
        let prev = self.sweep_pos.unwrap_or(p);
        {
            let ctx = OrderCtx {
                segments: &self.segments,
                at: prev,
                eps: self.eps,
            };
            for &id in event.lower.iter().chain(event.interior.iter()) {
                let (pred, succ) = self.status.neighbors(id, &ctx)?;
                self.status.remove(id, &ctx)?;
                if let (Some(a), Some(b)) = (pred, succ) {
                    checks.push((a, b));
                }
            }
        }

        // Starting and continuing segments enter at p itself; the
        // recomputed keys place continuing segments in post-crossing
        // order.
        let ctx = OrderCtx {
            segments: &self.segments,
            at: p,
            eps: self.eps,
        };
        let mut inserted: SmallVec<[SegmentId; 4]> = SmallVec::new();
        for &id in event.upper.iter().chain(event.interior.iter()) {
            self.status.insert(id, &ctx)?;
            inserted.push(id);
        }

        if inserted.is_empty() {
            // Pure lower event: the former neighbors of the removed
            // segments meet across p. A segment sitting on p's x is a
            // contributor in its own right.
            let xn = self.status.neighbors_of_x(p.x, &ctx);
            if let Some(on) = xn.on {
                if !contrib.contains(&on) {
                    contrib.push(on);
                }
                if let Some(l) = xn.left {
                    checks.push((l, on));
                }
                if let Some(r) = xn.right {
                    checks.push((on, r));
                }
            } else if let (Some(l), Some(r)) = (xn.left, xn.right) {
                checks.push((l, r));
            }
        } else {
            let mut leftmost = inserted[0];
            let mut rightmost = inserted[0];
            for &id in &inserted[1..] {
                if ctx.cmp(id, leftmost) == Ordering::Less {
                    leftmost = id;
                }
                if ctx.cmp(id, rightmost) == Ordering::Greater {
                    rightmost = id;
                }
            }
            let (pred, _) = self.status.neighbors(leftmost, &ctx)?;
            if let Some(pred) = pred {
                checks.push((pred, leftmost));
            }
            let (_, succ) = self.status.neighbors(rightmost, &ctx)?;
            if let Some(succ) = succ {
                checks.push((rightmost, succ));
            }
        }

        for (a, b) in checks {
            self.check_candidate(a, b, p, &mut contrib);
        }

        // A horizontal starting here scans its span for segments it
        // crosses; segments entering the span later are caught by the
        // live list below.
        for i in 0..event.upper.len() {
            let id = event.upper[i];
            if self.segments[id.0].is_horizontal(self.eps) {
                self.sweep_horizontal(id, p)?;
                self.live_horizontals.push(id);
            }
        }

        // Any live horizontal spanning p passes through this event
        // point even when no event set mentions it.
        for i in 0..self.live_horizontals.len() {
            let id = self.live_horizontals[i];
            let seg = &self.segments[id.0];
            if !contrib.contains(&id)
                && p.x >= seg.upper().x - self.eps
                && p.x <= seg.lower().x + self.eps
            {
                contrib.push(id);
            }
        }

        if contrib.len() >= 2 {
            contrib.sort();
            debug!("{} segments meet at an event point", contrib.len());
            self.output.push(Intersection {
                point: p,
                segments: contrib.to_vec(),
            });
        }

        self.sweep_pos = Some(p);
        Ok(())
    }

    /// Test a candidate pair and route whatever it yields.
    fn check_candidate(
        &mut self,
        a: SegmentId,
        b: SegmentId,
        p: Coordinate<T>,
        contrib: &mut SmallVec<[SegmentId; 4]>,
    ) {
        let sa = self.segments[a.0];
        let sb = self.segments[b.0];
        match geometry::intersect(&sa, &sb, self.eps) {
            None => {}
            Some(SegmentIntersection::Point(r)) => self.found(r, a, b, p, contrib),
            Some(SegmentIntersection::Overlap(start, end)) => {
                // Only the boundary points of a collinear overlap are
                // reported; the shared interior is not enumerated.
                self.found(start, a, b, p, contrib);
                self.found(end, a, b, p, contrib);
            }
        }
    }

    /// Route a discovered intersection point: record it if it lies on
    /// the current event point, schedule it if it lies ahead of the
    /// sweep, drop it if the sweep has already passed it.
    fn found(
        &mut self,
        r: Coordinate<T>,
        a: SegmentId,
        b: SegmentId,
        p: Coordinate<T>,
        contrib: &mut SmallVec<[SegmentId; 4]>,
    ) {
        match sweep_cmp(r, p, self.eps) {
            Ordering::Equal => {
                for &id in &[a, b] {
                    if !contrib.contains(&id) {
                        contrib.push(id);
                    }
                }
            }
            Ordering::Greater => {
                debug!("scheduling a crossing ahead of the sweep");
                for &id in &[a, b] {
                    // Endpoint events are already seeded; only true
                    // interior passages need a new event.
                    if !self.segments[id.0].is_endpoint(r, self.eps) {
                        self.queue
                            .schedule(SweepPoint::new(r, self.eps), EventKind::Interior, id);
                    }
                }
            }
            Ordering::Less => {
                trace!("dropping a crossing behind the sweep");
            }
        }
    }

    /// Walk rightward from a freshly inserted horizontal, scheduling
    /// an interior event for every segment crossing its span. Cost is
    /// proportional to the crossings found.
    fn sweep_horizontal(&mut self, id: SegmentId, p: Coordinate<T>) -> Result<(), SweepError> {
        let right_x = self.segments[id.0].lower().x;
        let ctx = OrderCtx {
            segments: &self.segments,
            at: p,
            eps: self.eps,
        };
        let mut cur = id;
        loop {
            let (_, succ) = self.status.neighbors(cur, &ctx)?;
            let next = match succ {
                None => break,
                Some(next) => next,
            };
            let x = ctx.x_of(next);
            if approx_cmp(x, right_x, self.eps) == Ordering::Greater {
                break;
            }
            let r = Coordinate { x, y: p.y };
            // Crossings at p itself are handled by the current event;
            // endpoint touches by the events seeded at construction.
            if approx_cmp(x, p.x, self.eps) == Ordering::Greater
                && !self.segments[next.0].is_endpoint(r, self.eps)
            {
                trace!("horizontal span crossing scheduled");
                self.queue
                    .schedule(SweepPoint::new(r, self.eps), EventKind::Interior, next);
            }
            cur = next;
        }
        Ok(())
    }
}
