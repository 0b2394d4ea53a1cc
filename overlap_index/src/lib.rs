// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap Index: a generic 2D AABB index.
//!
//! - Insert, update, and remove axis-aligned bounding boxes (AABBs) with user payloads.
//! - Query by point or intersecting rectangle.
//! - Collect the boxes that were added, removed, or moved with [`IndexGeneric::take_damage`].
//!
//! It is generic over the scalar type `T` and does not depend on any geometry crate.
//! The `overlap` crate computes padded world-space boxes for its bodies and feeds them here.
//!
//! Backends are pluggable via a small trait so the spatial strategy can be swapped
//! without API churn. The default backend is a flat vector (linear scan); the
//! R-tree is the one to use for anything beyond a handful of entries.
//!
//! # Example
//!
//! ```rust
//! use overlap_index::{Aabb2D, Index};
//!
//! let mut idx = Index::<i64, u32>::with_rtree();
//! let k1 = idx.insert(Aabb2D::new(0, 0, 10, 10), 1);
//! let _k2 = idx.insert(Aabb2D::new(5, 5, 15, 15), 2);
//! let _ = idx.take_damage();
//!
//! // Move the first box; queries see it right away.
//! idx.update(k1, Aabb2D::new(20, 0, 30, 10));
//! let damage = idx.take_damage();
//! assert_eq!(damage.moved.len(), 1);
//!
//! let hits: Vec<_> = idx.query_point(6, 6).collect();
//! assert_eq!(hits.len(), 1);
//! assert_eq!(hits[0].1, 2);
//! ```
//!
//! ## Choosing a backend
//!
//! - `FlatVec` (default): simplest and smallest, linear scans.
//! - `RTreeF64`/`RTreeI64`: height-balanced R-tree with SAH-like splits and widened
//!   metrics; nodes are recycled, so frequent remove/insert cycles do not grow memory.
//!   See the [`backends`] docs for a brief SAH overview.
//!
//! ### Float semantics
//!
//! This crate assumes no NaNs for floating-point coordinates.

#![no_std]

extern crate alloc;

pub mod backend;
pub mod backends;
pub mod damage;
pub mod index;
pub mod types;

pub use backend::Backend;
pub use backends::flatvec::FlatVec;
pub use backends::rtree::{DEFAULT_MAX_CHILDREN, DEFAULT_MIN_CHILDREN, RTree, RTreeF64, RTreeI64};
pub use damage::Damage;
pub use index::{Index, IndexGeneric, Key};
pub use types::Aabb2D;
