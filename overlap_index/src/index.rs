// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public `Index` API and generic implementation over a pluggable backend.
//!
//! Mutations reach the backend immediately, so queries always observe the latest
//! boxes. What changed is remembered per entry and handed out in one batch by
//! [`IndexGeneric::take_damage`].

use alloc::vec::Vec;
use core::fmt::Debug;

use crate::backend::Backend;
use crate::damage::Damage;
use crate::types::Aabb2D;

/// Generational handle for entries.
///
/// A key stays valid until its entry is removed; a slot reused afterwards gets a
/// new generation, so stale keys are rejected rather than aliasing a new entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Key(u32, u32);

impl Key {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Index keys are intentionally 32-bit; higher bits are truncated by design."
    )]
    const fn new(idx: usize, generation: u32) -> Self {
        Self(idx as u32, generation)
    }

    const fn idx(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Mark {
    Added,
    Updated,
}

#[derive(Clone, Debug)]
struct Entry<T, P> {
    aabb: Aabb2D<T>,
    payload: P,
    mark: Option<Mark>,
    // Box as of the last `take_damage`, for moved damage.
    prev_aabb: Option<Aabb2D<T>>,
}

#[derive(Clone, Debug)]
struct Slot<T, P> {
    generation: u32,
    entry: Option<Entry<T, P>>,
}

/// A generic AABB index parameterized by a spatial backend.
#[derive(Debug)]
pub struct IndexGeneric<T: Copy + PartialOrd + Debug, P: Copy + Debug, B: Backend<T, P>> {
    slots: Vec<Slot<T, P>>,
    free_list: Vec<usize>,
    len: usize,
    removed: Vec<Aabb2D<T>>,
    backend: B,
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T, P> + Default,
{
    /// Create an empty index using the backend's default constructor.
    pub fn new() -> Self {
        Self::with_backend(B::default())
    }
}

impl<T, P, B> IndexGeneric<T, P, B>
where
    T: Copy + PartialOrd + Debug,
    P: Copy + Debug,
    B: Backend<T, P>,
{
    /// Create an empty index over an already configured backend.
    pub fn with_backend(backend: B) -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            removed: Vec::new(),
            backend,
        }
    }

    /// Reserve space for at least `n` entries.
    pub fn reserve(&mut self, n: usize) {
        self.slots.reserve(n);
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Borrow the backend, e.g. for diagnostics.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Insert a new AABB with payload. Returns a stable handle `Key`.
    pub fn insert(&mut self, aabb: Aabb2D<T>, payload: P) -> Key {
        let entry = Entry {
            aabb,
            payload,
            mark: Some(Mark::Added),
            prev_aabb: None,
        };
        let idx = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.wrapping_add(1);
            slot.entry = Some(entry);
            idx
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: Some(entry),
            });
            self.slots.len() - 1
        };
        self.backend.insert(idx, aabb);
        self.len += 1;
        Key::new(idx, self.slots[idx].generation)
    }

    /// Move an existing entry to a new AABB.
    ///
    /// Returns `false` for a stale key. Updating to the current box leaves the
    /// backend untouched and records no damage.
    pub fn update(&mut self, key: Key, aabb: Aabb2D<T>) -> bool {
        let Some(e) = self.entry_mut(key) else {
            return false;
        };
        if e.aabb == aabb {
            return true;
        }
        if e.mark.is_none() {
            e.prev_aabb = Some(e.aabb);
        }
        e.aabb = aabb;
        e.mark = Some(match e.mark {
            Some(Mark::Added) => Mark::Added,
            _ => Mark::Updated,
        });
        self.backend.update(key.idx(), aabb);
        true
    }

    /// Remove an entry, returning its payload. Stale keys return `None`.
    pub fn remove(&mut self, key: Key) -> Option<P> {
        self.entry_mut(key)?;
        let e = self.slots[key.idx()].entry.take()?;
        self.backend.remove(key.idx());
        self.free_list.push(key.idx());
        self.len -= 1;
        match e.mark {
            Some(Mark::Added) => {}
            _ => self.removed.push(e.prev_aabb.unwrap_or(e.aabb)),
        }
        Some(e.payload)
    }

    /// Whether `key` refers to a live entry.
    pub fn contains(&self, key: Key) -> bool {
        self.entry(key).is_some()
    }

    /// The current box and payload of an entry.
    pub fn get(&self, key: Key) -> Option<(Aabb2D<T>, P)> {
        self.entry(key).map(|e| (e.aabb, e.payload))
    }

    /// Iterate over every live entry in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Key, Aabb2D<T>, P)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            s.entry
                .as_ref()
                .map(|e| (Key::new(i, s.generation), e.aabb, e.payload))
        })
    }

    /// Remove every entry. Keys handed out before remain stale afterwards; no damage is reported.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            slot.entry = None;
        }
        self.free_list = (0..self.slots.len()).rev().collect();
        self.len = 0;
        self.removed.clear();
        self.backend.clear();
    }

    /// Hand out the damage accumulated since the previous call and reset it.
    pub fn take_damage(&mut self) -> Damage<T> {
        let mut dmg = Damage {
            removed: core::mem::take(&mut self.removed),
            ..Damage::default()
        };
        for e in self.slots.iter_mut().filter_map(|s| s.entry.as_mut()) {
            match e.mark.take() {
                Some(Mark::Added) => dmg.added.push(e.aabb),
                Some(Mark::Updated) => {
                    if let Some(prev) = e.prev_aabb.take()
                        && prev != e.aabb
                    {
                        dmg.moved.push((prev, e.aabb));
                    }
                }
                None => {}
            }
        }
        dmg
    }

    /// Query for entries whose AABB contains the point.
    pub fn query_point(&self, x: T, y: T) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_point(x, y))
    }

    /// Query for entries whose AABB intersects the given rectangle.
    pub fn query_rect(&self, rect: Aabb2D<T>) -> impl Iterator<Item = (Key, P)> + '_ {
        self.resolve(self.backend.query_rect(rect))
    }

    /// Visit the bounding box and depth of every internal backend node.
    pub fn visit_nodes(&self, mut visit: impl FnMut(Aabb2D<T>, usize)) {
        self.backend.visit_nodes(&mut visit);
    }

    fn resolve<'a>(
        &'a self,
        slots: impl Iterator<Item = usize> + 'a,
    ) -> impl Iterator<Item = (Key, P)> + 'a {
        slots.filter_map(|i| {
            let s = self.slots.get(i)?;
            s.entry
                .as_ref()
                .map(|e| (Key::new(i, s.generation), e.payload))
        })
    }

    fn entry(&self, key: Key) -> Option<&Entry<T, P>> {
        let s = self.slots.get(key.idx())?;
        if s.generation != key.1 {
            return None;
        }
        s.entry.as_ref()
    }

    fn entry_mut(&mut self, key: Key) -> Option<&mut Entry<T, P>> {
        let s = self.slots.get_mut(key.idx())?;
        if s.generation != key.1 {
            return None;
        }
        s.entry.as_mut()
    }
}

/// Default index using a flat vector backend.
pub type Index<T, P> = IndexGeneric<T, P, crate::backends::flatvec::FlatVec<T, P>>;

impl<T: Copy + PartialOrd + Debug, P: Copy + Debug> Default for Index<T, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: Copy + Debug> Index<f64, P> {
    /// Create an R-tree-backed index (f64 coordinates).
    pub fn with_rtree() -> IndexGeneric<f64, P, crate::backends::rtree::RTreeF64<P>> {
        IndexGeneric::new()
    }
}

impl<P: Copy + Debug> Index<i64, P> {
    /// Create an i64 R-tree-backed index using integer SAH splits.
    pub fn with_rtree() -> IndexGeneric<i64, P, crate::backends::rtree::RTreeI64<P>> {
        IndexGeneric::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn insert_update_and_query() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        let _ = idx.take_damage();
        assert!(idx.update(k1, Aabb2D::new(5, 5, 15, 15)));
        assert!(!idx.take_damage().is_empty());

        let hits: Vec<_> = idx.query_point(6, 6).collect();
        assert_eq!(hits, [(k1, 1)]);
    }

    #[test]
    fn queries_see_changes_before_damage_is_taken() {
        let mut idx = Index::<f64, u8>::with_rtree();
        let k = idx.insert(Aabb2D::new(0.0, 0.0, 1.0, 1.0), 7);
        assert_eq!(idx.query_point(0.5, 0.5).count(), 1);
        idx.update(k, Aabb2D::new(10.0, 10.0, 11.0, 11.0));
        assert_eq!(idx.query_point(0.5, 0.5).count(), 0);
        assert_eq!(idx.query_point(10.5, 10.5).count(), 1);
    }

    #[test]
    fn added_then_removed_before_take_is_ignored() {
        let mut idx: Index<i64, u32> = Index::new();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        assert_eq!(idx.remove(k), Some(1));
        assert!(idx.take_damage().is_empty());
        assert_eq!(idx.query_point(1, 1).count(), 0);
        assert!(idx.is_empty());
    }

    #[test]
    fn removed_after_take_reports_last_committed_box() {
        let mut idx: Index<i64, u32> = Index::new();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        let _ = idx.take_damage();
        idx.update(k, Aabb2D::new(3, 3, 4, 4));
        idx.remove(k);
        let dmg = idx.take_damage();
        assert_eq!(dmg.removed, [Aabb2D::new(0, 0, 10, 10)]);
        assert!(dmg.added.is_empty() && dmg.moved.is_empty());
    }

    #[test]
    fn moved_reports_pair() {
        let mut idx: Index<i64, u32> = Index::new();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        let _ = idx.take_damage();
        idx.update(k, Aabb2D::new(5, 5, 15, 15));
        let dmg = idx.take_damage();
        assert_eq!(dmg.moved, [(Aabb2D::new(0, 0, 10, 10), Aabb2D::new(5, 5, 15, 15))]);
    }

    #[test]
    fn same_box_update_is_not_damage() {
        let mut idx = Index::<i64, u32>::with_rtree();
        let k = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
        let _ = idx.take_damage();
        assert!(idx.update(k, Aabb2D::new(0, 0, 10, 10)));
        assert!(idx.take_damage().is_empty());
    }

    #[test]
    fn stale_keys_are_rejected() {
        let mut idx: Index<i64, u32> = Index::new();
        let k1 = idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        idx.remove(k1);
        let k2 = idx.insert(Aabb2D::new(0, 0, 1, 1), 2);
        assert_ne!(k1, k2);
        assert_eq!(idx.get(k1), None);
        assert!(!idx.update(k1, Aabb2D::new(5, 5, 6, 6)));
        assert_eq!(idx.remove(k1), None);
        assert_eq!(idx.get(k2), Some((Aabb2D::new(0, 0, 1, 1), 2)));

        idx.clear();
        assert!(!idx.contains(k2));
        let k3 = idx.insert(Aabb2D::new(0, 0, 1, 1), 3);
        assert_ne!(k2, k3);
    }

    #[test]
    fn iter_lists_live_entries() {
        let mut idx: Index<i64, u32> = Index::new();
        let a = idx.insert(Aabb2D::new(0, 0, 1, 1), 1);
        let b = idx.insert(Aabb2D::new(2, 2, 3, 3), 2);
        idx.remove(a);
        let all: Vec<_> = idx.iter().collect();
        assert_eq!(all, [(b, Aabb2D::new(2, 2, 3, 3), 2)]);
        assert_eq!(idx.len(), 1);
    }
}
