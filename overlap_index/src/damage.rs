// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Damage records returned by [`Index::take_damage`](crate::IndexGeneric::take_damage).

use alloc::vec::Vec;

use crate::types::{Aabb2D, union_aabb};

/// Summary of index mutations since the last call to `take_damage`.
///
/// An entry added and removed between two calls contributes nothing. An entry
/// updated to the box it already had is not reported as moved.
#[derive(Clone, Debug, PartialEq)]
pub struct Damage<T> {
    /// Newly added AABBs.
    pub added: Vec<Aabb2D<T>>,
    /// Removed AABBs (their last indexed box).
    pub removed: Vec<Aabb2D<T>>,
    /// Moved AABBs: (old, new).
    pub moved: Vec<(Aabb2D<T>, Aabb2D<T>)>,
}

impl<T> Default for Damage<T> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            removed: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl<T: Copy + PartialOrd> Damage<T> {
    /// True if no damage entries recorded.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }

    /// Total number of recorded changes.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len() + self.moved.len()
    }

    /// Union of all AABBs affected. Returns `None` if empty.
    pub fn union(&self) -> Option<Aabb2D<T>> {
        let mut it = self
            .added
            .iter()
            .copied()
            .chain(self.removed.iter().copied())
            .chain(self.moved.iter().flat_map(|(a, b)| [*a, *b]));
        let first = it.next()?;
        Some(it.fold(first, union_aabb))
    }
}
