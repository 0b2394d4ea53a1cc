// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Separating-axis tests for convex shapes.
//!
//! Polygons are given as a world position plus points relative to it, wound
//! counter-clockwise; circles are given in world space. Each test returns the
//! minimum translation that pushes `a` out of `b` when the shapes overlap.

use kurbo::{Circle, Point, Vec2};

use crate::decomp::signed_area;
use crate::math::normalize_or_zero;

/// Result of a single convex-versus-convex test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Penetration depth along `overlap_n`.
    pub overlap: f64,
    /// Unit direction in which `a` must move back to separate (it points from `a` into `b`).
    pub overlap_n: Vec2,
    /// `overlap_n * overlap`.
    pub overlap_v: Vec2,
    /// `a` lies entirely inside `b`.
    pub a_in_b: bool,
    /// `b` lies entirely inside `a`.
    pub b_in_a: bool,
}

impl Contact {
    const fn cleared() -> Self {
        Self {
            overlap: f64::MAX,
            overlap_n: Vec2::ZERO,
            overlap_v: Vec2::ZERO,
            a_in_b: true,
            b_in_a: true,
        }
    }

    fn finish(mut self) -> Self {
        self.overlap_v = self.overlap_n * self.overlap;
        self
    }

    /// The same contact seen from the other body.
    pub fn swapped(self) -> Self {
        Self {
            overlap: self.overlap,
            overlap_n: -self.overlap_n,
            overlap_v: -self.overlap_v,
            a_in_b: self.b_in_a,
            b_in_a: self.a_in_b,
        }
    }
}

/// A convex shape ready for testing.
#[derive(Clone, Copy, Debug)]
pub enum ConvexShape<'a> {
    /// World-space circle.
    Circle(Circle),
    /// Convex polygon: world position and counter-clockwise points relative to it.
    Polygon {
        /// World position the points are relative to.
        pos: Point,
        /// Counter-clockwise outline.
        points: &'a [Vec2],
    },
}

/// Test any pair of convex shapes.
pub fn test(a: &ConvexShape<'_>, b: &ConvexShape<'_>) -> Option<Contact> {
    match (*a, *b) {
        (ConvexShape::Circle(ca), ConvexShape::Circle(cb)) => test_circle_circle(ca, cb),
        (ConvexShape::Circle(c), ConvexShape::Polygon { pos, points }) => {
            test_circle_polygon(c, pos, points)
        }
        (ConvexShape::Polygon { pos, points }, ConvexShape::Circle(c)) => {
            test_polygon_circle(pos, points, c)
        }
        (
            ConvexShape::Polygon {
                pos: a_pos,
                points: a_points,
            },
            ConvexShape::Polygon {
                pos: b_pos,
                points: b_points,
            },
        ) => test_polygon_polygon(a_pos, a_points, b_pos, b_points),
    }
}

fn project(points: &[Vec2], axis: Vec2) -> (f64, f64) {
    points.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}

/// Outward normals of a counter-clockwise outline, skipping zero-length edges.
fn normals(points: &[Vec2]) -> impl Iterator<Item = Vec2> + '_ {
    let n = points.len();
    (0..n).filter_map(move |i| {
        let e = points[(i + 1) % n] - points[i];
        let perp = Vec2::new(e.y, -e.x);
        (perp.hypot2() > 0.0).then(|| normalize_or_zero(perp))
    })
}

/// Returns true if `axis` separates the two point sets; otherwise folds the
/// overlap along it into `contact`.
fn is_separating_axis(
    offset: Vec2,
    a_points: &[Vec2],
    b_points: &[Vec2],
    axis: Vec2,
    contact: &mut Contact,
) -> bool {
    let (a0, a1) = project(a_points, axis);
    let (b0, b1) = project(b_points, axis);
    let shift = offset.dot(axis);
    let (b0, b1) = (b0 + shift, b1 + shift);
    if a0 > b1 || b0 > a1 {
        return true;
    }
    let overlap = if a0 < b0 {
        contact.a_in_b = false;
        if a1 < b1 {
            contact.b_in_a = false;
            a1 - b0
        } else {
            let option1 = a1 - b0;
            let option2 = b1 - a0;
            if option1 < option2 { option1 } else { -option2 }
        }
    } else {
        contact.b_in_a = false;
        if a1 > b1 {
            contact.a_in_b = false;
            a0 - b1
        } else {
            let option1 = a1 - b0;
            let option2 = b1 - a0;
            if option1 < option2 { option1 } else { -option2 }
        }
    };
    let abs = overlap.abs();
    if abs < contact.overlap {
        contact.overlap = abs;
        contact.overlap_n = if overlap < 0.0 { -axis } else { axis };
    }
    false
}

/// Polygon against polygon.
pub fn test_polygon_polygon(
    a_pos: Point,
    a_points: &[Vec2],
    b_pos: Point,
    b_points: &[Vec2],
) -> Option<Contact> {
    let offset = b_pos - a_pos;
    let mut contact = Contact::cleared();
    for axis in normals(a_points).chain(normals(b_points)) {
        if is_separating_axis(offset, a_points, b_points, axis, &mut contact) {
            return None;
        }
    }
    // Outlines without area have too few axes; their bounding boxes must meet too.
    if signed_area(a_points) == 0.0 || signed_area(b_points) == 0.0 {
        let mut bounds = contact;
        for axis in [Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)] {
            if is_separating_axis(offset, a_points, b_points, axis, &mut bounds) {
                return None;
            }
        }
    }
    if contact.overlap == f64::MAX {
        // Only degenerate edges: coincident points.
        contact.overlap = 0.0;
    }
    Some(contact.finish())
}

/// Circle against circle.
pub fn test_circle_circle(a: Circle, b: Circle) -> Option<Contact> {
    let diff = b.center - a.center;
    let total = a.radius + b.radius;
    let dist2 = diff.hypot2();
    if dist2 > total * total {
        return None;
    }
    let dist = dist2.sqrt();
    let overlap = total - dist;
    let overlap_n = normalize_or_zero(diff);
    Some(Contact {
        overlap,
        overlap_n,
        overlap_v: overlap_n * overlap,
        a_in_b: a.radius <= b.radius && dist <= b.radius - a.radius,
        b_in_a: b.radius <= a.radius && dist <= a.radius - b.radius,
    })
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Voronoi {
    Left,
    Middle,
    Right,
}

/// Which Voronoi region of segment `line` (from its start) the point lies in.
fn voronoi_region(line: Vec2, point: Vec2) -> Voronoi {
    let dp = point.dot(line);
    if dp < 0.0 {
        Voronoi::Left
    } else if dp > line.hypot2() {
        Voronoi::Right
    } else {
        Voronoi::Middle
    }
}

/// Polygon against circle.
pub fn test_polygon_circle(pos: Point, points: &[Vec2], circle: Circle) -> Option<Contact> {
    let center = circle.center - pos;
    let radius = circle.radius;
    let radius2 = radius * radius;
    let n = points.len();
    let mut contact = Contact::cleared();

    for i in 0..n {
        let next = (i + 1) % n;
        let prev = (i + n - 1) % n;
        let edge = points[next] - points[i];
        let point = center - points[i];
        if point.hypot2() > radius2 {
            contact.a_in_b = false;
        }

        let mut found: Option<(f64, Vec2)> = None;
        match voronoi_region(edge, point) {
            Voronoi::Left => {
                // Possibly in the corner region shared with the previous edge.
                let prev_edge = points[i] - points[prev];
                let point2 = center - points[prev];
                if voronoi_region(prev_edge, point2) == Voronoi::Right {
                    let dist = point.hypot();
                    if dist > radius {
                        return None;
                    }
                    contact.b_in_a = false;
                    found = Some((radius - dist, normalize_or_zero(point)));
                }
            }
            Voronoi::Right => {
                let next_edge = points[(next + 1) % n] - points[next];
                let point = center - points[next];
                if voronoi_region(next_edge, point) == Voronoi::Left {
                    let dist = point.hypot();
                    if dist > radius {
                        return None;
                    }
                    contact.b_in_a = false;
                    found = Some((radius - dist, normalize_or_zero(point)));
                }
            }
            Voronoi::Middle => {
                let normal = normalize_or_zero(Vec2::new(edge.y, -edge.x));
                let dist = point.dot(normal);
                if dist > 0.0 && dist.abs() > radius {
                    return None;
                }
                let overlap = radius - dist;
                if dist >= 0.0 || overlap < 2.0 * radius {
                    contact.b_in_a = false;
                }
                found = Some((overlap, normal));
            }
        }

        if let Some((overlap, normal)) = found
            && overlap.abs() < contact.overlap.abs()
        {
            contact.overlap = overlap;
            contact.overlap_n = normal;
        }
    }
    Some(contact.finish())
}

/// Circle against polygon.
pub fn test_circle_polygon(circle: Circle, pos: Point, points: &[Vec2]) -> Option<Contact> {
    test_polygon_circle(pos, points, circle).map(Contact::swapped)
}

/// Whether `p` lies inside or on the convex outline.
pub fn point_in_convex(p: Point, pos: Point, points: &[Vec2]) -> bool {
    let local = p - pos;
    let n = points.len();
    match n {
        0 => false,
        1 => points[0] == local,
        _ => {
            let mut sign = 0.0_f64;
            for i in 0..n {
                let e = points[(i + 1) % n] - points[i];
                let c = e.cross(local - points[i]);
                if c == 0.0 {
                    continue;
                }
                if sign == 0.0 {
                    sign = c.signum();
                } else if c.signum() != sign {
                    return false;
                }
            }
            true
        }
    }
}

/// Whether `p` lies inside or on the circle.
pub fn point_in_circle(p: Point, circle: Circle) -> bool {
    (p - circle.center).hypot2() <= circle.radius * circle.radius
}
