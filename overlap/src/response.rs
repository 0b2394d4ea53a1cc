// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision results handed to callers.

use kurbo::{Point, Vec2};

use crate::sat::Contact;
use crate::types::BodyId;

/// Result of a positive collision check between bodies `a` and `b`.
///
/// `overlap_v` is the smallest translation that, subtracted from `a`'s
/// position, separates the pair.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Response {
    /// The body that was checked.
    pub a: BodyId,
    /// The body it collided with.
    pub b: BodyId,
    /// Penetration depth.
    pub overlap: f64,
    /// Unit direction of the overlap, pointing from `a` into `b`.
    pub overlap_n: Vec2,
    /// `overlap_n * overlap`.
    pub overlap_v: Vec2,
    /// `a` lies entirely inside `b`.
    pub a_in_b: bool,
    /// `b` lies entirely inside `a`.
    pub b_in_a: bool,
}

impl Response {
    pub(crate) fn from_contact(a: BodyId, b: BodyId, contact: Contact) -> Self {
        Self {
            a,
            b,
            overlap: contact.overlap,
            overlap_n: contact.overlap_n,
            overlap_v: contact.overlap_v,
            a_in_b: contact.a_in_b,
            b_in_a: contact.b_in_a,
        }
    }

    /// The same collision seen from `b`.
    pub fn swapped(self) -> Self {
        Self {
            a: self.b,
            b: self.a,
            overlap: self.overlap,
            overlap_n: -self.overlap_n,
            overlap_v: -self.overlap_v,
            a_in_b: self.b_in_a,
            b_in_a: self.a_in_b,
        }
    }
}

/// Nearest body hit by a ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RaycastHit {
    /// World point where the ray first enters the body.
    pub point: Point,
    /// The body that was hit.
    pub body: BodyId,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swapping_flips_direction_and_containment() {
        let r = Response {
            a: BodyId::new(0, 1),
            b: BodyId::new(1, 1),
            overlap: 2.0,
            overlap_n: Vec2::new(1.0, 0.0),
            overlap_v: Vec2::new(2.0, 0.0),
            a_in_b: true,
            b_in_a: false,
        };
        let s = r.swapped();
        assert_eq!(s.a, r.b);
        assert_eq!(s.overlap_v, Vec2::new(-2.0, 0.0));
        assert!(!s.a_in_b && s.b_in_a);
        assert_eq!(s.swapped(), r);
    }
}
