//! The sweep status structure: an AVL tree over the segments that
//! currently straddle the sweep line, ordered left to right.
//!
//! Nodes live in a [`Slab`] arena and reference each other by index,
//! so there are no parent pointers and no reference cycles. Ordering
//! is never stored: every operation receives an [`OrderCtx`] carrying
//! the sweep position, and keys are recomputed from it on demand.
//! This is what lets the tree stay valid as crossings reorder the
//! segments, as long as mutations happen at the right sweep position.

use std::cmp::Ordering;

use geo::{Coordinate, GeoFloat};
use slab::Slab;

use crate::error::SweepError;
use crate::geometry::approx_cmp;
use crate::segments::{Segment, SegmentId};

/// The ordering context for status operations: the segment store and
/// the sweep position at which keys are evaluated.
#[derive(Debug, Clone, Copy)]
pub struct OrderCtx<'a, T: GeoFloat> {
    pub segments: &'a Slab<Segment<T>>,
    pub at: Coordinate<T>,
    pub eps: T,
}

impl<'a, T: GeoFloat> OrderCtx<'a, T> {
    #[inline]
    fn segment(&self, id: SegmentId) -> &Segment<T> {
        &self.segments[id.0]
    }

    /// The x position of `id` at the sweep height.
    #[inline]
    pub fn x_of(&self, id: SegmentId) -> T {
        self.segment(id).x_at_y(self.at.y, self.eps)
    }

    /// Left-to-right order of two segments at the sweep position.
    ///
    /// Segments meeting the sweep line at one point are ordered by
    /// slope: ascending while the meeting point still lies ahead of
    /// the sweep position (the segments have not crossed yet), and
    /// descending once the sweep has reached it, which realizes the
    /// order infinitesimally below the line. Remaining ties fall back
    /// to the segment identifier.
    pub fn cmp(&self, a: SegmentId, b: SegmentId) -> Ordering {
        if a == b {
            return Ordering::Equal;
        }
        let xa = self.x_of(a);
        let xb = self.x_of(b);
        approx_cmp(xa, xb, self.eps)
            .then_with(|| {
                let slope_ord = self
                    .segment(a)
                    .sweep_slope(self.eps)
                    .partial_cmp(&self.segment(b).sweep_slope(self.eps))
                    .unwrap_or(Ordering::Equal);
                if approx_cmp(xa, self.at.x, self.eps) == Ordering::Greater {
                    slope_ord
                } else {
                    slope_ord.reverse()
                }
            })
            .then_with(|| a.cmp(&b))
    }
}

/// Neighborhood of a bare x position on the sweep line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XNeighbors {
    /// Greatest segment strictly left of the position.
    pub left: Option<SegmentId>,
    /// A segment passing through the position, if any.
    pub on: Option<SegmentId>,
    /// Smallest segment strictly right of the position.
    pub right: Option<SegmentId>,
}

#[derive(Debug, Clone, Copy)]
struct Node {
    segment: SegmentId,
    left: Option<usize>,
    right: Option<usize>,
    height: i32,
}

/// AVL tree over the segments intersecting the sweep line.
#[derive(Debug, Default)]
pub struct StatusTree {
    nodes: Slab<Node>,
    root: Option<usize>,
    ops: usize,
}

impl StatusTree {
    pub fn new() -> Self {
        StatusTree::default()
    }

    /// Number of tree operations performed so far. Backs the sweep's
    /// work budget and performance accounting.
    pub fn ops(&self) -> usize {
        self.ops
    }

    /// Insert `id` at the position dictated by `ctx`.
    ///
    /// Finding `id` already present means the comparator disagrees
    /// with the tree's arrangement, which is reported rather than
    /// papered over.
    pub fn insert<T: GeoFloat>(
        &mut self,
        id: SegmentId,
        ctx: &OrderCtx<T>,
    ) -> Result<(), SweepError> {
        self.ops += 1;
        let root = self.root;
        let new_root = self.insert_at(root, id, ctx)?;
        self.root = Some(new_root);
        Ok(())
    }

    fn insert_at<T: GeoFloat>(
        &mut self,
        node: Option<usize>,
        id: SegmentId,
        ctx: &OrderCtx<T>,
    ) -> Result<usize, SweepError> {
        let idx = match node {
            None => {
                return Ok(self.nodes.insert(Node {
                    segment: id,
                    left: None,
                    right: None,
                    height: 1,
                }))
            }
            Some(idx) => idx,
        };
        match ctx.cmp(id, self.nodes[idx].segment) {
            Ordering::Less => {
                let child = self.insert_at(self.nodes[idx].left, id, ctx)?;
                self.nodes[idx].left = Some(child);
            }
            Ordering::Greater => {
                let child = self.insert_at(self.nodes[idx].right, id, ctx)?;
                self.nodes[idx].right = Some(child);
            }
            Ordering::Equal => return Err(SweepError::InconsistentOrder),
        }
        Ok(self.rebalance(idx))
    }

    /// Remove `id`, locating it via the comparator. A lookup the
    /// comparator cannot complete is an [`SweepError::InconsistentOrder`].
    pub fn remove<T: GeoFloat>(
        &mut self,
        id: SegmentId,
        ctx: &OrderCtx<T>,
    ) -> Result<(), SweepError> {
        self.ops += 1;
        let root = self.root;
        self.root = self.remove_at(root, id, ctx)?;
        Ok(())
    }

    fn remove_at<T: GeoFloat>(
        &mut self,
        node: Option<usize>,
        id: SegmentId,
        ctx: &OrderCtx<T>,
    ) -> Result<Option<usize>, SweepError> {
        let idx = node.ok_or(SweepError::InconsistentOrder)?;
        match ctx.cmp(id, self.nodes[idx].segment) {
            Ordering::Less => {
                let child = self.remove_at(self.nodes[idx].left, id, ctx)?;
                self.nodes[idx].left = child;
            }
            Ordering::Greater => {
                let child = self.remove_at(self.nodes[idx].right, id, ctx)?;
                self.nodes[idx].right = child;
            }
            Ordering::Equal => {
                let Node { left, right, .. } = self.nodes[idx];
                match (left, right) {
                    (None, None) => {
                        self.nodes.remove(idx);
                        return Ok(None);
                    }
                    (Some(l), None) => {
                        self.nodes.remove(idx);
                        return Ok(Some(l));
                    }
                    (None, Some(r)) => {
                        self.nodes.remove(idx);
                        return Ok(Some(r));
                    }
                    (Some(_), Some(r)) => {
                        let (min_seg, new_right) = self.detach_min(r);
                        self.nodes[idx].segment = min_seg;
                        self.nodes[idx].right = new_right;
                    }
                }
            }
        }
        Ok(Some(self.rebalance(idx)))
    }

    /// Detach the minimum node of the subtree at `idx`, returning its
    /// segment and the rebalanced remainder.
    fn detach_min(&mut self, idx: usize) -> (SegmentId, Option<usize>) {
        match self.nodes[idx].left {
            None => {
                let Node { segment, right, .. } = self.nodes[idx];
                self.nodes.remove(idx);
                (segment, right)
            }
            Some(l) => {
                let (segment, new_left) = self.detach_min(l);
                self.nodes[idx].left = new_left;
                (segment, Some(self.rebalance(idx)))
            }
        }
    }

    /// Predecessor and successor of `id` in the current order.
    pub fn neighbors<T: GeoFloat>(
        &mut self,
        id: SegmentId,
        ctx: &OrderCtx<T>,
    ) -> Result<(Option<SegmentId>, Option<SegmentId>), SweepError> {
        self.ops += 1;
        let mut pred = None;
        let mut succ = None;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.nodes[idx];
            match ctx.cmp(id, node.segment) {
                Ordering::Less => {
                    succ = Some(node.segment);
                    cur = node.left;
                }
                Ordering::Greater => {
                    pred = Some(node.segment);
                    cur = node.right;
                }
                Ordering::Equal => {
                    if let Some(l) = node.left {
                        pred = Some(self.max_in(l));
                    }
                    if let Some(r) = node.right {
                        succ = Some(self.min_in(r));
                    }
                    return Ok((pred, succ));
                }
            }
        }
        Err(SweepError::InconsistentOrder)
    }

    /// Segments around a bare x position on the sweep line, including
    /// any occupant within the tolerance of it.
    pub fn neighbors_of_x<T: GeoFloat>(&mut self, x: T, ctx: &OrderCtx<T>) -> XNeighbors {
        self.ops += 1;
        let mut left = None;
        let mut on = None;
        let mut right = None;
        let mut cur = self.root;
        while let Some(idx) = cur {
            let node = self.nodes[idx];
            match approx_cmp(x, ctx.x_of(node.segment), ctx.eps) {
                Ordering::Less => {
                    right = Some(node.segment);
                    cur = node.left;
                }
                Ordering::Greater => {
                    left = Some(node.segment);
                    cur = node.right;
                }
                Ordering::Equal => {
                    on = Some(node.segment);
                    if let Some(l) = node.left {
                        left = Some(self.max_in(l));
                    }
                    if let Some(r) = node.right {
                        right = Some(self.min_in(r));
                    }
                    break;
                }
            }
        }
        XNeighbors { left, on, right }
    }

    fn min_in(&self, mut idx: usize) -> SegmentId {
        while let Some(l) = self.nodes[idx].left {
            idx = l;
        }
        self.nodes[idx].segment
    }

    fn max_in(&self, mut idx: usize) -> SegmentId {
        while let Some(r) = self.nodes[idx].right {
            idx = r;
        }
        self.nodes[idx].segment
    }

    fn height(&self, node: Option<usize>) -> i32 {
        node.map_or(0, |i| self.nodes[i].height)
    }

    fn update_height(&mut self, idx: usize) {
        let node = self.nodes[idx];
        self.nodes[idx].height = 1 + self.height(node.left).max(self.height(node.right));
    }

    fn balance(&self, idx: usize) -> i32 {
        self.height(self.nodes[idx].right) - self.height(self.nodes[idx].left)
    }

    fn rebalance(&mut self, idx: usize) -> usize {
        self.update_height(idx);
        let balance = self.balance(idx);
        if balance > 1 {
            let right = self.nodes[idx]
                .right
                .expect("right-heavy node has a right child");
            if self.balance(right) < 0 {
                let new_right = self.rotate_right(right);
                self.nodes[idx].right = Some(new_right);
            }
            self.rotate_left(idx)
        } else if balance < -1 {
            let left = self.nodes[idx]
                .left
                .expect("left-heavy node has a left child");
            if self.balance(left) > 0 {
                let new_left = self.rotate_left(left);
                self.nodes[idx].left = Some(new_left);
            }
            self.rotate_right(idx)
        } else {
            idx
        }
    }

    fn rotate_left(&mut self, idx: usize) -> usize {
        let r = self.nodes[idx]
            .right
            .expect("left rotation requires a right child");
        self.nodes[idx].right = self.nodes[r].left;
        self.nodes[r].left = Some(idx);
        self.update_height(idx);
        self.update_height(r);
        r
    }

    fn rotate_right(&mut self, idx: usize) -> usize {
        let l = self.nodes[idx]
            .left
            .expect("right rotation requires a left child");
        self.nodes[idx].left = self.nodes[l].right;
        self.nodes[l].right = Some(idx);
        self.update_height(idx);
        self.update_height(l);
        l
    }

    #[cfg(test)]
    fn in_order(&self) -> Vec<SegmentId> {
        fn walk(tree: &StatusTree, node: Option<usize>, out: &mut Vec<SegmentId>) {
            if let Some(idx) = node {
                walk(tree, tree.nodes[idx].left, out);
                out.push(tree.nodes[idx].segment);
                walk(tree, tree.nodes[idx].right, out);
            }
        }
        let mut out = Vec::with_capacity(self.nodes.len());
        walk(self, self.root, &mut out);
        out
    }

    #[cfg(test)]
    fn assert_invariants<T: GeoFloat>(&self, ctx: &OrderCtx<T>) {
        fn check(tree: &StatusTree, node: Option<usize>) -> i32 {
            let idx = match node {
                None => return 0,
                Some(idx) => idx,
            };
            let lh = check(tree, tree.nodes[idx].left);
            let rh = check(tree, tree.nodes[idx].right);
            assert!((rh - lh).abs() <= 1, "balance factor out of range");
            assert_eq!(tree.nodes[idx].height, 1 + lh.max(rh), "stale height");
            1 + lh.max(rh)
        }
        check(self, self.root);
        let order = self.in_order();
        for pair in order.windows(2) {
            assert_eq!(
                ctx.cmp(pair[0], pair[1]),
                Ordering::Less,
                "in-order traversal not sorted: {:?}",
                order
            );
        }
    }
}
