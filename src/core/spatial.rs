//! Nearest-neighbour queries over the free partons of a pool.
//!
//! [`SpatialIndex`] is a 3D kd-tree built once from the partons that are
//! free at construction time. It never changes afterwards; queries take the
//! current [`Availability`] and skip consumed partons, but a caller that
//! consumes partons while walking a result list must still re-check each
//! entry before using it.

use crate::core::particle::{distance_sq, Parton, DIM};
use crate::core::pool::Availability;
use ordered_float::OrderedFloat;
use std::collections::BinaryHeap;

/// Maximum number of points stored in a leaf.
const LEAF_SIZE: usize = 10;

/// Default number of candidates examined by [`SpatialIndex::nearest_opposite`].
pub const DEFAULT_OPPOSITE_WINDOW: usize = 10;

/// Candidate multiplier for [`SpatialIndex::nearest_same`].
pub const SAME_WINDOW_FACTOR: usize = 5;

/// A query hit: the parton slot and its distance to the query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor {
    pub slot: usize,
    pub distance: f64,
}

#[derive(Debug, Clone, Copy)]
struct Point {
    slot: usize,
    /// Position in the slot list the index was built from; breaks distance ties.
    order: usize,
    r: [f64; DIM],
}

#[derive(Debug, Clone, Copy)]
enum Node {
    Leaf {
        start: usize,
        end: usize,
    },
    Split {
        axis: usize,
        value: f64,
        left: usize,
        right: usize,
    },
}

/// Heap entry ordered by (squared distance, construction order).
type Ranked = (OrderedFloat<f64>, usize, usize);

/// Immutable kd-tree over parton positions.
#[derive(Debug, Clone)]
pub struct SpatialIndex<'a> {
    partons: &'a [Parton],
    points: Vec<Point>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

impl<'a> SpatialIndex<'a> {
    /// Build from the free partons among `slots`, in the given order.
    pub fn build(partons: &'a [Parton], slots: &[usize], avail: &Availability) -> Self {
        let mut points: Vec<Point> = avail
            .filter_free(slots)
            .filter_map(|slot| partons.get(slot).map(|q| (slot, q.r)))
            .enumerate()
            .map(|(order, (slot, r))| Point { slot, order, r })
            .collect();
        let mut nodes = Vec::new();
        let root = if points.is_empty() {
            None
        } else {
            Some(build_node(&mut points, 0, &mut nodes))
        };
        Self {
            partons,
            points,
            nodes,
            root,
        }
    }

    /// Number of partons indexed.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True if no parton was free when the index was built.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Up to `k` nearest free partons to `query`, excluding the query itself,
    /// by ascending distance; equal distances keep construction order.
    pub fn k_nearest(&self, query: usize, k: usize, avail: &Availability) -> Vec<Neighbor> {
        let Some(center) = self.partons.get(query) else {
            return Vec::new();
        };
        if k == 0 {
            return Vec::new();
        }
        let Some(root) = self.root else {
            return Vec::new();
        };
        // never more hits than points, whatever the caller asks for
        let k = k.min(self.points.len());
        let mut heap: BinaryHeap<Ranked> = BinaryHeap::with_capacity(k + 1);
        self.search(root, &center.r, query, k, avail, &mut heap);
        let mut ranked = heap.into_vec();
        ranked.sort_unstable();
        ranked
            .into_iter()
            .map(|(d2, _, idx)| Neighbor {
                slot: self.points[idx].slot,
                distance: d2.into_inner().sqrt(),
            })
            .collect()
    }

    /// First free parton of opposite charge sign among the `window`
    /// nearest free partons.
    ///
    /// This is a bounded approximation: when `window` or more same-sign
    /// partons sit closer than every opposite-sign one, `None` is returned
    /// even though an opposite-sign parton exists further out.
    pub fn nearest_opposite(
        &self,
        query: usize,
        window: usize,
        avail: &Availability,
    ) -> Option<Neighbor> {
        let center = self.partons.get(query)?;
        self.k_nearest(query, window, avail)
            .into_iter()
            .find(|n| !self.partons[n.slot].same_sign(center))
    }

    /// Up to `k` free same-sign partons among the `SAME_WINDOW_FACTOR * k`
    /// nearest free partons. Same approximation caveat as
    /// [`nearest_opposite`](Self::nearest_opposite).
    pub fn nearest_same(&self, query: usize, k: usize, avail: &Availability) -> Vec<Neighbor> {
        let Some(center) = self.partons.get(query) else {
            return Vec::new();
        };
        self.k_nearest(query, k.saturating_mul(SAME_WINDOW_FACTOR), avail)
            .into_iter()
            .filter(|n| self.partons[n.slot].same_sign(center))
            .take(k)
            .collect()
    }

    fn search(
        &self,
        node: usize,
        q: &[f64; DIM],
        exclude: usize,
        k: usize,
        avail: &Availability,
        heap: &mut BinaryHeap<Ranked>,
    ) {
        match self.nodes[node] {
            Node::Leaf { start, end } => {
                for idx in start..end {
                    let pt = &self.points[idx];
                    if pt.slot == exclude || !avail.is_free(pt.slot) {
                        continue;
                    }
                    let entry = (OrderedFloat(distance_sq(q, &pt.r)), pt.order, idx);
                    if heap.len() < k {
                        heap.push(entry);
                    } else if heap.peek().is_some_and(|worst| entry < *worst) {
                        heap.pop();
                        heap.push(entry);
                    }
                }
            }
            Node::Split {
                axis,
                value,
                left,
                right,
            } => {
                let diff = q[axis] - value;
                let (near, far) = if diff <= 0.0 {
                    (left, right)
                } else {
                    (right, left)
                };
                self.search(near, q, exclude, k, avail, heap);
                // `<=` so equidistant points across the plane still compete on order.
                let visit_far = heap.len() < k
                    || heap
                        .peek()
                        .is_some_and(|worst| diff * diff <= worst.0.into_inner());
                if visit_far {
                    self.search(far, q, exclude, k, avail, heap);
                }
            }
        }
    }
}

/// Recursively split `points[..]` (which starts at `offset` in the full
/// array) and return the index of the created node.
fn build_node(points: &mut [Point], offset: usize, nodes: &mut Vec<Node>) -> usize {
    if points.len() <= LEAF_SIZE {
        nodes.push(Node::Leaf {
            start: offset,
            end: offset + points.len(),
        });
        return nodes.len() - 1;
    }

    let axis = widest_axis(points);
    let mid = points.len() / 2;
    points.select_nth_unstable_by(mid, |a, b| a.r[axis].total_cmp(&b.r[axis]));
    let value = points[mid].r[axis];

    let slot = nodes.len();
    nodes.push(Node::Leaf { start: 0, end: 0 });
    let (lo, hi) = points.split_at_mut(mid);
    let left = build_node(lo, offset, nodes);
    let right = build_node(hi, offset + mid, nodes);
    nodes[slot] = Node::Split {
        axis,
        value,
        left,
        right,
    };
    slot
}

fn widest_axis(points: &[Point]) -> usize {
    let mut best_axis = 0;
    let mut best_spread = f64::NEG_INFINITY;
    for axis in 0..DIM {
        let (lo, hi) = points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.r[axis]), hi.max(p.r[axis]))
        });
        if hi - lo > best_spread {
            best_spread = hi - lo;
            best_axis = axis;
        }
    }
    best_axis
}

/// Linear-scan counterpart of [`SpatialIndex::k_nearest`] with no `k` limit:
/// every free parton among `slots` except `query`, by ascending distance,
/// ties kept in slot-list order.
pub fn scan_nearest(
    partons: &[Parton],
    slots: &[usize],
    query: usize,
    avail: &Availability,
) -> Vec<Neighbor> {
    let Some(center) = partons.get(query) else {
        return Vec::new();
    };
    let mut hits: Vec<(OrderedFloat<f64>, usize, usize)> = avail
        .filter_free(slots)
        .enumerate()
        .filter(|&(_, slot)| slot != query)
        .filter_map(|(order, slot)| {
            partons
                .get(slot)
                .map(|q| (OrderedFloat(center.distance_sq_to(q)), order, slot))
        })
        .collect();
    hits.sort_unstable();
    hits.into_iter()
        .map(|(d2, _, slot)| Neighbor {
            slot,
            distance: d2.into_inner().sqrt(),
        })
        .collect()
}
