// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend implementations for different spatial strategies.
//!
//! - `rtree`: height-balanced R-tree (`T: Scalar`) with SAH-like split (aliases: `RTreeI64`, `RTreeF64`).
//! - `flatvec`: flat vector with linear scans (small, simple, used as a test oracle).
//!
//! SAH note
//! --------
//! For a split point `k` along a sorted axis the R-tree minimizes:
//!
//! `cost(k) = area(LB_k) * k + area(RB_k) * (n - k)`
//!
//! where `LB_k` and `RB_k` are the bounding boxes of the first `k` and remaining `n - k` children.
//! All `k` are evaluated in O(n) per axis using prefix/suffix bounding boxes.
//! Accumulators are widened (`f64`→`f64`, `i64`→`i128`) for robust comparisons.
//!
//! Removal follows the classic condense step: a node left under-full is detached and
//! its items are reinserted, and a branch root with a single child is replaced by it.

pub mod flatvec;
pub mod rtree;
