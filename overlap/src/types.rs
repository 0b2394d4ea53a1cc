// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types: body identifiers, kind labels, and kind flags.

/// Identifier for a body held by a [`System`](crate::System).
///
/// A small, copyable handle made of a slot index and a generation counter.
///
/// ## Semantics
///
/// - On insert, a fresh slot is allocated with generation `1`.
/// - On remove (or transfer to another system) the slot is freed and every
///   `BodyId` pointing at it becomes stale.
/// - On reuse of a freed slot its generation is incremented, so a stale id never
///   aliases a different live body.
///
/// Ids are only meaningful for the system that issued them.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct BodyId(pub(crate) u32, pub(crate) u32);

impl BodyId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Kind label of a body.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BodyType {
    /// Polygonal approximation of an ellipse.
    Ellipse,
    /// Exact circle.
    Circle,
    /// Arbitrary simple polygon, possibly non-convex.
    Polygon,
    /// Axis-aligned (before rotation) rectangle.
    Box,
    /// Two-point segment.
    Line,
    /// Tiny box standing in for a point.
    Point,
}

bitflags::bitflags! {
    /// One bit per body kind, usable as a set in queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct BodyGroup: u8 {
        /// [`BodyType::Ellipse`]
        const ELLIPSE = 32;
        /// [`BodyType::Circle`]
        const CIRCLE = 16;
        /// [`BodyType::Polygon`]
        const POLYGON = 8;
        /// [`BodyType::Box`]
        const BOX = 4;
        /// [`BodyType::Line`]
        const LINE = 2;
        /// [`BodyType::Point`]
        const POINT = 1;
    }
}

/// Narrow-phase category: circles are tested exactly, everything else as a polygon.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ShapeClass {
    /// Circle tests.
    Circle,
    /// Polygon tests.
    Polygon,
}

impl BodyType {
    /// The kind flag of this body type.
    pub const fn group(self) -> BodyGroup {
        match self {
            Self::Ellipse => BodyGroup::ELLIPSE,
            Self::Circle => BodyGroup::CIRCLE,
            Self::Polygon => BodyGroup::POLYGON,
            Self::Box => BodyGroup::BOX,
            Self::Line => BodyGroup::LINE,
            Self::Point => BodyGroup::POINT,
        }
    }

    /// Which family of narrow-phase and containment tests applies.
    pub const fn class(self) -> ShapeClass {
        match self {
            Self::Circle => ShapeClass::Circle,
            Self::Ellipse | Self::Polygon | Self::Box | Self::Line | Self::Point => {
                ShapeClass::Polygon
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_flags_are_disjoint() {
        let all = [
            BodyType::Ellipse,
            BodyType::Circle,
            BodyType::Polygon,
            BodyType::Box,
            BodyType::Line,
            BodyType::Point,
        ];
        let mut seen = BodyGroup::empty();
        for t in all {
            let g = t.group();
            assert_eq!(g.bits().count_ones(), 1);
            assert!(!seen.intersects(g), "{t:?} shares a bit");
            seen |= g;
        }
        assert_eq!(seen, BodyGroup::all());
    }

    #[test]
    fn only_circles_use_circle_tests() {
        assert_eq!(BodyType::Circle.class(), ShapeClass::Circle);
        assert_eq!(BodyType::Ellipse.class(), ShapeClass::Polygon);
        assert_eq!(BodyType::Point.class(), ShapeClass::Polygon);
    }
}
