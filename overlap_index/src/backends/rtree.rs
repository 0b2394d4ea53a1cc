// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! R-tree backend generic over scalar `T: Scalar` with SAH-like split.
//!
//! The tree is height-balanced: every item lives in a leaf and all leaves sit at
//! the same depth. Nodes live in a flat arena and are recycled through a free
//! list, so a body that is removed and re-inserted every frame does not grow
//! memory.

use alloc::boxed::Box;
use alloc::vec;
use alloc::vec::Vec;
use core::fmt::Debug;
use core::ops::{Index, IndexMut};

use crate::backend::Backend;
use crate::types::{Aabb2D, Scalar, area, union_aabb};

/// Default maximum number of children per node.
pub const DEFAULT_MAX_CHILDREN: usize = 9;

/// Default minimum number of children per non-root node.
pub const DEFAULT_MIN_CHILDREN: usize = 4;

/// R-tree backend using least-enlargement descent and SAH-like splits.
pub struct RTree<T: Scalar, P: Copy + Debug> {
    max_children: usize,
    min_children: usize,
    root: Option<NodeIdx>,
    arena: Arena<T, P>,
    slots: Vec<Option<Aabb2D<T>>>,
}

#[derive(Clone)]
struct RNode<T: Scalar, P: Copy + Debug> {
    bbox: Aabb2D<T>,
    leaf: bool,
    children: Vec<RChild<T, P>>,
}

#[derive(Clone)]
enum RChild<T: Scalar, P: Copy + Debug> {
    Node(NodeIdx),
    Item {
        slot: usize,
        bbox: Aabb2D<T>,
        _p: core::marker::PhantomData<P>,
    },
}

impl<T: Scalar, P: Copy + Debug> RChild<T, P> {
    fn item(slot: usize, bbox: Aabb2D<T>) -> Self {
        Self::Item {
            slot,
            bbox,
            _p: core::marker::PhantomData,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
struct NodeIdx(usize);

impl NodeIdx {
    const fn get(self) -> usize {
        self.0
    }
}

/// Node storage with slot recycling.
#[derive(Clone)]
struct Arena<T: Scalar, P: Copy + Debug> {
    nodes: Vec<RNode<T, P>>,
    free: Vec<usize>,
}

impl<T: Scalar, P: Copy + Debug> Arena<T, P> {
    const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            free: Vec::new(),
        }
    }

    fn alloc(&mut self, node: RNode<T, P>) -> usize {
        if let Some(idx) = self.free.pop() {
            self.nodes[idx] = node;
            idx
        } else {
            self.nodes.push(node);
            self.nodes.len() - 1
        }
    }

    fn release(&mut self, idx: usize) {
        let node = &mut self.nodes[idx];
        node.children.clear();
        node.leaf = true;
        self.free.push(idx);
    }

    fn live(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
    }

    fn child_bbox(&self, child: &RChild<T, P>) -> Aabb2D<T> {
        match child {
            RChild::Node(i) => self.nodes[i.get()].bbox,
            RChild::Item { bbox, .. } => *bbox,
        }
    }
}

impl<T: Scalar, P: Copy + Debug> Index<usize> for Arena<T, P> {
    type Output = RNode<T, P>;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.nodes[idx]
    }
}

impl<T: Scalar, P: Copy + Debug> IndexMut<usize> for Arena<T, P> {
    fn index_mut(&mut self, idx: usize) -> &mut Self::Output {
        &mut self.nodes[idx]
    }
}

impl<T: Scalar, P: Copy + Debug> Default for RTree<T, P> {
    fn default() -> Self {
        Self::with_fanout(DEFAULT_MAX_CHILDREN, DEFAULT_MIN_CHILDREN)
    }
}

// Reduce clippy::type_complexity noise for local helpers.
type RChildren<TS, PS> = Vec<RChild<TS, PS>>;

impl<T: Scalar, P: Copy + Debug> RTree<T, P> {
    /// Create an empty tree with a custom fan-out.
    ///
    /// `max_children` is raised to at least 2 and `min_children` is clamped
    /// into `1..=(max_children + 1) / 2` so that every split can honor it.
    pub fn with_fanout(max_children: usize, min_children: usize) -> Self {
        let max_children = max_children.max(2);
        let min_children = min_children.clamp(1, max_children.div_ceil(2));
        Self {
            max_children,
            min_children,
            root: None,
            arena: Arena::new(),
            slots: Vec::new(),
        }
    }

    /// Number of levels in the tree (0 when empty).
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut cursor = self.root;
        while let Some(idx) = cursor {
            height += 1;
            let node = &self.arena[idx.get()];
            cursor = if node.leaf {
                None
            } else {
                node.children.iter().find_map(|c| match c {
                    RChild::Node(i) => Some(*i),
                    RChild::Item { .. } => None,
                })
            };
        }
        height
    }

    /// Number of nodes currently in use.
    pub fn node_count(&self) -> usize {
        self.arena.live()
    }

    fn ensure_slot(&mut self, slot: usize, bbox: Aabb2D<T>) {
        if self.slots.len() <= slot {
            self.slots.resize_with(slot + 1, || None);
        }
        self.slots[slot] = Some(bbox);
    }

    fn node_bbox(arena: &Arena<T, P>, children: &[RChild<T, P>]) -> Aabb2D<T> {
        let mut it = children.iter();
        let first = match it.next() {
            Some(c) => arena.child_bbox(c),
            None => Aabb2D::new(T::ZERO, T::ZERO, T::ZERO, T::ZERO),
        };
        it.fold(first, |acc, c| union_aabb(acc, arena.child_bbox(c)))
    }

    fn enlarge_cost(a: &Aabb2D<T>, b: &Aabb2D<T>) -> T::Acc {
        let u = union_aabb(*a, *b);
        area(&u) - area(a)
    }

    /// Least-enlargement child; ties go to the child with the smaller area.
    fn choose_child(arena: &Arena<T, P>, children: &[RChild<T, P>], bbox: &Aabb2D<T>) -> usize {
        let mut best_idx = 0_usize;
        let mut best: Option<(T::Acc, T::Acc)> = None;
        for (i, c) in children.iter().enumerate() {
            let cb = arena.child_bbox(c);
            let cost = Self::enlarge_cost(&cb, bbox);
            let size = area(&cb);
            let better = match best {
                None => true,
                Some((bc, bs)) => cost < bc || (cost == bc && size < bs),
            };
            if better {
                best = Some((cost, size));
                best_idx = i;
            }
        }
        best_idx
    }

    /// SAH-like split: sort along an axis, precompute prefix/suffix AABBs, and
    /// choose `k` that minimizes `area(LB_k) * k + area(RB_k) * (n - k)`.
    fn split_children(
        arena: &Arena<T, P>,
        children: RChildren<T, P>,
        min_children: usize,
    ) -> (RChildren<T, P>, RChildren<T, P>) {
        let n = children.len();
        let mut best: Option<(T::Acc, usize, usize)> = None;
        let mut sorted: [RChildren<T, P>; 2] = [children.clone(), children];
        for (axis, v) in sorted.iter_mut().enumerate() {
            v.sort_by(|a, b| {
                let (ba, bb) = (arena.child_bbox(a), arena.child_bbox(b));
                let (ka, kb) = if axis == 0 {
                    (T::midpoint(ba.min_x, ba.max_x), T::midpoint(bb.min_x, bb.max_x))
                } else {
                    (T::midpoint(ba.min_y, ba.max_y), T::midpoint(bb.min_y, bb.max_y))
                };
                ka.partial_cmp(&kb).unwrap_or(core::cmp::Ordering::Equal)
            });

            // Prefix and suffix bounding boxes make each candidate split O(1).
            let boxes: Vec<Aabb2D<T>> = v.iter().map(|c| arena.child_bbox(c)).collect();
            let mut prefix: Vec<Aabb2D<T>> = Vec::with_capacity(n);
            for (i, bb) in boxes.iter().enumerate() {
                let acc = if i == 0 {
                    *bb
                } else {
                    union_aabb(prefix[i - 1], *bb)
                };
                prefix.push(acc);
            }
            let mut suffix: Vec<Aabb2D<T>> = boxes.clone();
            for i in (0..n.saturating_sub(1)).rev() {
                suffix[i] = union_aabb(boxes[i], suffix[i + 1]);
            }

            for k in min_children..=(n - min_children) {
                let lb = prefix[k - 1];
                let rb = suffix[k];
                let c = area(&lb) * T::count(k) + area(&rb) * T::count(n - k);
                if best.map(|(bc, _, _)| c < bc).unwrap_or(true) {
                    best = Some((c, axis, k));
                }
            }
        }
        let (axis, k) = best.map(|(_, axis, k)| (axis, k)).unwrap_or((0, n / 2));
        let mut left = core::mem::take(&mut sorted[axis]);
        let right = left.split_off(k);
        (left, right)
    }

    /// Insert an item below `node_idx`. Returns the index of a new right sibling
    /// if `node_idx` overflowed and was split.
    fn insert_node(
        arena: &mut Arena<T, P>,
        node_idx: usize,
        slot: usize,
        bbox: Aabb2D<T>,
        max_children: usize,
        min_children: usize,
    ) -> Option<usize> {
        if arena[node_idx].leaf {
            let node = &mut arena[node_idx];
            node.children.push(RChild::item(slot, bbox));
            node.bbox = if node.children.len() == 1 {
                bbox
            } else {
                union_aabb(node.bbox, bbox)
            };
        } else {
            // Choose child without holding &mut to the node across arena borrows
            let idx = Self::choose_child(arena, &arena[node_idx].children, &bbox);
            let split = match arena[node_idx].children[idx] {
                RChild::Node(child_idx) => Self::insert_node(
                    arena,
                    child_idx.get(),
                    slot,
                    bbox,
                    max_children,
                    min_children,
                ),
                RChild::Item { .. } => None,
            };
            arena[node_idx].bbox = union_aabb(arena[node_idx].bbox, bbox);
            if let Some(new_right_idx) = split {
                arena[node_idx]
                    .children
                    .insert(idx + 1, RChild::Node(NodeIdx(new_right_idx)));
            }
        }

        if arena[node_idx].children.len() <= max_children {
            return None;
        }

        let leaf = arena[node_idx].leaf;
        let children = core::mem::take(&mut arena[node_idx].children);
        let (left, right) = Self::split_children(arena, children, min_children);
        let l_bbox = Self::node_bbox(arena, &left);
        let r_bbox = Self::node_bbox(arena, &right);
        log::trace!(
            "rtree: split {} node into {}+{}",
            if leaf { "leaf" } else { "branch" },
            left.len(),
            right.len()
        );
        {
            let node = &mut arena[node_idx];
            node.children = left;
            node.bbox = l_bbox;
        }
        Some(arena.alloc(RNode {
            bbox: r_bbox,
            leaf,
            children: right,
        }))
    }

    /// Insert an item without touching the slot table.
    fn insert_item(&mut self, slot: usize, bbox: Aabb2D<T>) {
        let Some(root_idx) = self.root else {
            let idx = self.arena.alloc(RNode {
                bbox,
                leaf: true,
                children: vec![RChild::item(slot, bbox)],
            });
            self.root = Some(NodeIdx(idx));
            return;
        };
        let split = Self::insert_node(
            &mut self.arena,
            root_idx.get(),
            slot,
            bbox,
            self.max_children,
            self.min_children,
        );
        if let Some(right_idx) = split {
            // Grow upward: a new root combining old root and its new sibling.
            let new_bb = union_aabb(self.arena[root_idx.get()].bbox, self.arena[right_idx].bbox);
            let idx = self.arena.alloc(RNode {
                bbox: new_bb,
                leaf: false,
                children: vec![RChild::Node(root_idx), RChild::Node(NodeIdx(right_idx))],
            });
            self.root = Some(NodeIdx(idx));
        }
    }

    /// Remove `slot` from the subtree at `node_idx`.
    ///
    /// Child nodes left with fewer than `min_children` entries are detached and
    /// their items pushed to `orphans` for reinsertion. Returns true if found.
    fn remove_from(
        arena: &mut Arena<T, P>,
        node_idx: usize,
        slot: usize,
        old: &Aabb2D<T>,
        min_children: usize,
        orphans: &mut Vec<(usize, Aabb2D<T>)>,
    ) -> bool {
        if !arena[node_idx].bbox.intersects(old) {
            return false;
        }
        if arena[node_idx].leaf {
            let pos = arena[node_idx]
                .children
                .iter()
                .position(|c| matches!(c, RChild::Item { slot: s, .. } if *s == slot));
            let Some(pos) = pos else {
                return false;
            };
            arena[node_idx].children.remove(pos);
            let bb = Self::node_bbox(arena, &arena[node_idx].children);
            arena[node_idx].bbox = bb;
            return true;
        }

        let mut i = 0;
        while i < arena[node_idx].children.len() {
            let RChild::Node(ci) = arena[node_idx].children[i] else {
                i += 1;
                continue;
            };
            if Self::remove_from(arena, ci.get(), slot, old, min_children, orphans) {
                if arena[ci.get()].children.len() < min_children {
                    arena[node_idx].children.remove(i);
                    Self::collect_items(arena, ci.get(), orphans);
                    log::trace!("rtree: condensed underfull node, {} orphans", orphans.len());
                }
                let bb = Self::node_bbox(arena, &arena[node_idx].children);
                arena[node_idx].bbox = bb;
                return true;
            }
            i += 1;
        }
        false
    }

    /// Move every item of a detached subtree into `out` and release its nodes.
    fn collect_items(arena: &mut Arena<T, P>, node_idx: usize, out: &mut Vec<(usize, Aabb2D<T>)>) {
        let children = core::mem::take(&mut arena[node_idx].children);
        for c in children {
            match c {
                RChild::Node(ci) => Self::collect_items(arena, ci.get(), out),
                RChild::Item { slot, bbox, .. } => out.push((slot, bbox)),
            }
        }
        arena.release(node_idx);
    }

    /// Drop an empty root, and replace a branch root that has a single child by that child.
    fn shrink_root(&mut self) {
        while let Some(root_idx) = self.root {
            let root = &self.arena[root_idx.get()];
            match (root.leaf, root.children.len()) {
                (_, 0) => {
                    self.root = None;
                    self.arena.clear();
                }
                (false, 1) => {
                    let RChild::Node(only) = root.children[0] else {
                        break;
                    };
                    self.arena.release(root_idx.get());
                    self.root = Some(only);
                }
                _ => break,
            }
        }
    }

    fn collect_rect(&self, rect: &Aabb2D<T>) -> Vec<usize> {
        let mut out = Vec::new();
        let Some(root_idx) = self.root else {
            return out;
        };
        let mut stack = vec![root_idx];
        while let Some(i) = stack.pop() {
            let n = &self.arena[i.get()];
            if !n.bbox.intersects(rect) {
                continue;
            }
            for c in &n.children {
                match c {
                    RChild::Item { slot, bbox, .. } if bbox.intersects(rect) => out.push(*slot),
                    RChild::Item { .. } => {}
                    RChild::Node(ci) => stack.push(*ci),
                }
            }
        }
        out
    }
}

impl<T: Scalar, P: Copy + Debug> Backend<T, P> for RTree<T, P> {
    fn insert(&mut self, slot: usize, aabb: Aabb2D<T>) {
        if self.slots.get(slot).copied().flatten().is_some() {
            self.remove(slot);
        }
        self.ensure_slot(slot, aabb);
        self.insert_item(slot, aabb);
    }

    fn update(&mut self, slot: usize, aabb: Aabb2D<T>) {
        self.remove(slot);
        self.ensure_slot(slot, aabb);
        self.insert_item(slot, aabb);
    }

    fn remove(&mut self, slot: usize) {
        let Some(old) = self.slots.get_mut(slot).and_then(Option::take) else {
            return;
        };
        let Some(root_idx) = self.root else {
            return;
        };
        let mut orphans = Vec::new();
        let _ = Self::remove_from(
            &mut self.arena,
            root_idx.get(),
            slot,
            &old,
            self.min_children,
            &mut orphans,
        );
        self.shrink_root();
        for (s, bbox) in orphans {
            self.insert_item(s, bbox);
        }
    }

    fn clear(&mut self) {
        self.root = None;
        self.arena.clear();
        self.slots.clear();
    }

    fn query_point<'a>(&'a self, x: T, y: T) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.collect_rect(&Aabb2D::new(x, y, x, y)).into_iter())
    }

    fn query_rect<'a>(&'a self, rect: Aabb2D<T>) -> Box<dyn Iterator<Item = usize> + 'a> {
        Box::new(self.collect_rect(&rect).into_iter())
    }

    fn visit_nodes(&self, visit: &mut dyn FnMut(Aabb2D<T>, usize)) {
        let Some(root_idx) = self.root else {
            return;
        };
        let mut stack = vec![(root_idx, 0_usize)];
        while let Some((i, depth)) = stack.pop() {
            let n = &self.arena[i.get()];
            visit(n.bbox, depth);
            for c in &n.children {
                if let RChild::Node(ci) = c {
                    stack.push((*ci, depth + 1));
                }
            }
        }
    }
}

impl<T: Scalar, P: Copy + Debug> Debug for RTree<T, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let total = self.slots.len();
        let alive = self.slots.iter().filter(|e| e.is_some()).count();
        f.debug_struct("RTree")
            .field("max_children", &self.max_children)
            .field("min_children", &self.min_children)
            .field("arena_nodes", &self.arena.nodes.len())
            .field("live_nodes", &self.arena.live())
            .field("total_slots", &total)
            .field("alive", &alive)
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

/// R-tree with i64 coordinates and i128 metrics.
pub type RTreeI64<P> = RTree<i64, P>;

/// R-tree with f64 coordinates and f64 metrics.
pub type RTreeF64<P> = RTree<f64, P>;
