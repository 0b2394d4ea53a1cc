// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Primitive geometry types and helpers.

use core::cmp::Ordering;
use core::fmt::Debug;

/// Axis-aligned bounding box in 2D.
///
/// Bounds are inclusive: two boxes that share an edge intersect.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Aabb2D<T> {
    /// Minimum x (left)
    pub min_x: T,
    /// Minimum y (top)
    pub min_y: T,
    /// Maximum x (right)
    pub max_x: T,
    /// Maximum y (bottom)
    pub max_y: T,
}

impl<T> Aabb2D<T> {
    /// Create a new AABB from min/max corners.
    pub const fn new(min_x: T, min_y: T, max_x: T, max_y: T) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}

impl<T: Copy + PartialOrd> Aabb2D<T> {
    /// Whether this AABB contains the point.
    pub fn contains_point(&self, x: T, y: T) -> bool {
        le(self.min_x, x) && le(self.min_y, y) && le(x, self.max_x) && le(y, self.max_y)
    }

    /// Whether `other` lies entirely inside this AABB (edges may touch).
    pub fn contains(&self, other: &Self) -> bool {
        le(self.min_x, other.min_x)
            && le(self.min_y, other.min_y)
            && le(other.max_x, self.max_x)
            && le(other.max_y, self.max_y)
    }

    /// Whether the two AABBs share at least one point.
    pub fn intersects(&self, other: &Self) -> bool {
        !self.intersect(other).is_empty()
    }

    /// The intersection of two AABBs.
    pub fn intersect(&self, other: &Self) -> Self {
        let min_x = max_t(self.min_x, other.min_x);
        let min_y = max_t(self.min_y, other.min_y);
        let max_x = min_t(self.max_x, other.max_x);
        let max_y = min_t(self.max_y, other.max_y);
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The smallest AABB enclosing both.
    pub fn union(&self, other: &Self) -> Self {
        union_aabb(*self, *other)
    }

    /// Return true if the AABB is empty or inverted (no area). Assumes no NaN.
    pub fn is_empty(&self) -> bool {
        lt(self.max_x, self.min_x) || lt(self.max_y, self.min_y)
    }
}

impl Aabb2D<f64> {
    /// Create an AABB from origin and size in f64.
    pub const fn from_xywh(x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

impl Aabb2D<i64> {
    /// Create an AABB from origin and size in i64.
    pub const fn from_xywh(x: i64, y: i64, w: i64, h: i64) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + w,
            max_y: y + h,
        }
    }
}

/// Coordinate type usable by the R-tree.
///
/// Area and split costs are accumulated in [`Scalar::Acc`], which is wider than
/// the coordinate for integers (`i64` → `i128`) so products cannot overflow.
pub trait Scalar: Copy + PartialOrd + Debug {
    /// Accumulator for areas and split costs.
    type Acc: Copy
        + PartialOrd
        + core::ops::Add<Output = Self::Acc>
        + core::ops::Sub<Output = Self::Acc>
        + core::ops::Mul<Output = Self::Acc>
        + Debug;

    /// The origin coordinate.
    const ZERO: Self;

    /// Length of the interval `lo..hi` in the accumulator type; zero when inverted.
    fn extent(lo: Self, hi: Self) -> Self::Acc;

    /// Center of `a..b`, used to order boxes before splitting.
    fn midpoint(a: Self, b: Self) -> Self;

    /// An entry count as an accumulator weight.
    fn count(n: usize) -> Self::Acc;
}

impl Scalar for f64 {
    type Acc = Self;

    const ZERO: Self = 0.0;

    fn extent(lo: Self, hi: Self) -> Self {
        (hi - lo).max(0.0)
    }

    fn midpoint(a: Self, b: Self) -> Self {
        0.5 * (a + b)
    }

    #[allow(
        clippy::cast_precision_loss,
        reason = "Node fan-out is a handful of entries."
    )]
    fn count(n: usize) -> Self {
        n as Self
    }
}

impl Scalar for i64 {
    type Acc = i128;

    const ZERO: Self = 0;

    fn extent(lo: Self, hi: Self) -> i128 {
        (i128::from(hi) - i128::from(lo)).max(0)
    }

    fn midpoint(a: Self, b: Self) -> Self {
        // Floor of the mean; cannot overflow.
        (a & b) + ((a ^ b) >> 1)
    }

    fn count(n: usize) -> i128 {
        n as i128
    }
}

/// Area of a box in the accumulator type; inverted boxes have zero area.
pub fn area<T: Scalar>(a: &Aabb2D<T>) -> T::Acc {
    T::extent(a.min_x, a.max_x) * T::extent(a.min_y, a.max_y)
}

pub(crate) fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

pub(crate) fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

pub(crate) fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

pub(crate) fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}

pub(crate) fn union_aabb<T: PartialOrd + Copy>(a: Aabb2D<T>, b: Aabb2D<T>) -> Aabb2D<T> {
    Aabb2D {
        min_x: min_t(a.min_x, b.min_x),
        min_y: min_t(a.min_y, b.min_y),
        max_x: max_t(a.max_x, b.max_x),
        max_y: max_t(a.max_y, b.max_y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_intersect() {
        let a = Aabb2D::new(0.0, 0.0, 1.0, 1.0);
        let b = Aabb2D::new(1.0, 0.0, 2.0, 1.0);
        assert!(a.intersects(&b));
        let c = Aabb2D::new(1.5, 0.0, 2.0, 1.0);
        assert!(!a.intersects(&c));
    }

    #[test]
    fn containment_is_inclusive() {
        let outer = Aabb2D::new(0_i64, 0, 10, 10);
        assert!(outer.contains(&Aabb2D::new(0, 0, 10, 10)));
        assert!(outer.contains(&Aabb2D::new(2, 2, 3, 3)));
        assert!(!outer.contains(&Aabb2D::new(-1, 2, 3, 3)));
        assert!(!outer.contains(&Aabb2D::new(2, 2, 3, 11)));
    }

    #[test]
    fn area_clamps_inverted_boxes() {
        assert_eq!(area(&Aabb2D::new(0_i64, 0, 4, 5)), 20);
        assert_eq!(area(&Aabb2D::new(4_i64, 0, 0, 5)), 0);
        assert_eq!(<i64 as Scalar>::midpoint(-3, 4), 0);
        assert_eq!(<i64 as Scalar>::extent(i64::MIN, i64::MAX), i128::from(u64::MAX));
    }
}
