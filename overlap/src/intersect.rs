// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Closed-form intersection routines and containment predicates.
//!
//! Everything here works in world space on plain `kurbo` values. Degenerate
//! input (parallel lines, zero-length segments, circles with no real solution)
//! yields an empty result rather than an error.

use kurbo::{Circle, Line, Point, Vec2};

use crate::body::Body;
use crate::sat::{point_in_circle, point_in_convex};
use crate::types::ShapeClass;

/// Points where a segment crosses a circle: zero, one, or two, nearest to `line.p0` first.
pub fn intersect_line_circle(line: Line, circle: Circle) -> Vec<Point> {
    let v1 = line.p1 - line.p0;
    let v2 = line.p0 - circle.center;
    let b = v1.dot(v2) * -2.0;
    let c = v1.hypot2() * 2.0;
    let d = (b * b - (v2.hypot2() - circle.radius * circle.radius) * c * 2.0).sqrt();
    if d.is_nan() {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(2);
    for u in [(b - d) / c, (b + d) / c] {
        if (0.0..=1.0).contains(&u) {
            out.push(line.p0 + v1 * u);
        }
    }
    out
}

/// Orientation of `p3` relative to the line `p1 p2`, with a tiny dead zone.
fn turn(p1: Point, p2: Point, p3: Point) -> i8 {
    let a = (p3.x - p1.x) * (p2.y - p1.y);
    let b = (p2.x - p1.x) * (p3.y - p1.y);
    if a > b + f64::EPSILON {
        1
    } else if a + f64::EPSILON < b {
        -1
    } else {
        0
    }
}

/// Whether two segments cross, without computing where.
pub fn intersect_line_line_fast(a: Line, b: Line) -> bool {
    turn(a.p0, b.p0, b.p1) != turn(a.p1, b.p0, b.p1)
        && turn(a.p0, a.p1, b.p0) != turn(a.p0, a.p1, b.p1)
}

/// Crossing point of two segments, endpoints included. Parallel segments give `None`.
pub fn intersect_line_line(a: Line, b: Line) -> Option<Point> {
    let d = a.p1 - a.p0;
    let e = b.p1 - b.p0;
    let determinant = d.x * e.y - e.x * d.y;
    if determinant.abs() < f64::EPSILON {
        return None;
    }
    let lambda =
        (e.y * (b.p1.x - a.p0.x) + (b.p0.x - b.p1.x) * (b.p1.y - a.p0.y)) / determinant;
    let gamma = ((a.p0.y - a.p1.y) * (b.p1.x - a.p0.x) + d.x * (b.p1.y - a.p0.y)) / determinant;
    if !(0.0..=1.0).contains(&lambda) || !(0.0..=1.0).contains(&gamma) {
        return None;
    }
    Some(a.p0 + d * lambda)
}

/// Every point where `line` crosses an edge of the closed outline.
pub fn intersect_line_polygon(line: Line, polygon: &[Point]) -> Vec<Point> {
    let n = polygon.len();
    (0..n)
        .filter_map(|i| {
            let from = polygon[(i + n - 1) % n];
            intersect_line_line(line, Line::new(from, polygon[i]))
        })
        .collect()
}

/// Every point where the two closed outlines cross, without exact duplicates.
pub fn intersect_polygon_polygon(a: &[Point], b: &[Point]) -> Vec<Point> {
    let n = a.len();
    let mut out: Vec<Point> = Vec::new();
    for i in 0..n {
        let edge = Line::new(a[i], a[(i + 1) % n]);
        for p in intersect_line_polygon(edge, b) {
            if !out.contains(&p) {
                out.push(p);
            }
        }
    }
    out
}

/// The two points where circle outlines cross.
///
/// Disjoint circles, nested circles, and concentric circles give no points;
/// tangent circles give the touching point twice.
pub fn intersect_circle_circle(a: Circle, b: Circle) -> Vec<Point> {
    let delta = b.center - a.center;
    let dist = delta.hypot();
    let (r1, r2) = (a.radius, b.radius);
    if dist > r1 + r2 || dist < (r1 - r2).abs() || dist == 0.0 {
        return Vec::new();
    }
    let along = (r1 * r1 - r2 * r2 + dist * dist) / (2.0 * dist);
    let h = (r1 * r1 - along * along).max(0.0).sqrt();
    let mid = a.center + delta * (along / dist);
    let off = Vec2::new(h * delta.y / dist, -h * delta.x / dist);
    vec![mid + off, mid - off]
}

/// Whether `point` lies exactly on the circle outline.
pub fn point_on_circle(point: Point, circle: Circle) -> bool {
    (point - circle.center).hypot2() == circle.radius * circle.radius
}

/// Whether `inner` lies within `outer`, touching allowed.
pub fn circle_in_circle(inner: Circle, outer: Circle) -> bool {
    (inner.center - outer.center).hypot() + inner.radius <= outer.radius
}

/// Whether `point` lies inside the body: one of its convex parts, or its circle.
pub fn point_in_body(point: Point, body: &Body) -> bool {
    match body.world_circle() {
        Some(c) => point_in_circle(point, c),
        None => body
            .convex_polygons()
            .any(|(pos, pts)| point_in_convex(point, pos, pts)),
    }
}

/// Whether every vertex of `polygon` lies inside `circle`.
pub fn polygon_in_circle(polygon: &Body, circle: Circle) -> bool {
    polygon.world_points().all(|p| point_in_circle(p, circle))
}

/// Whether every vertex of `a` lies inside `b`.
pub fn polygon_in_polygon(a: &Body, b: &Body) -> bool {
    a.world_points().all(|p| point_in_body(p, b))
}

fn edges(points: &[Point]) -> impl Iterator<Item = Line> + '_ {
    let n = points.len();
    (0..n).map(move |i| Line::new(points[(i + n - 1) % n], points[i]))
}

/// Whether the circle lies entirely inside the polygon body.
pub fn circle_in_polygon(circle: Circle, polygon: &Body) -> bool {
    if circle.radius == 0.0 || !point_in_body(circle.center, polygon) {
        return false;
    }
    let points: Vec<Point> = polygon.world_points().collect();
    if points.iter().any(|p| point_in_circle(*p, circle)) {
        return false;
    }
    !edges(&points).any(|e| !intersect_line_circle(e, circle).is_empty())
}

/// Whether the circle lies entirely outside the polygon body.
pub fn circle_outside_polygon(circle: Circle, polygon: &Body) -> bool {
    if circle.radius == 0.0 || point_in_body(circle.center, polygon) {
        return false;
    }
    let points: Vec<Point> = polygon.world_points().collect();
    if points
        .iter()
        .any(|p| point_in_circle(*p, circle) || point_on_circle(*p, circle))
    {
        return false;
    }
    !edges(&points).any(|e| !intersect_line_circle(e, circle).is_empty())
}

/// Whether body `a` lies entirely inside body `b`.
///
/// Every pair of shape classes has its own predicate, so adding a body kind
/// only requires mapping it to a [`ShapeClass`].
pub fn body_in_body(a: &Body, b: &Body) -> bool {
    match (a.body_type().class(), b.body_type().class()) {
        (ShapeClass::Circle, ShapeClass::Circle) => {
            match (a.world_circle(), b.world_circle()) {
                (Some(ca), Some(cb)) => circle_in_circle(ca, cb),
                _ => false,
            }
        }
        (ShapeClass::Circle, ShapeClass::Polygon) => {
            a.world_circle().is_some_and(|ca| circle_in_polygon(ca, b))
        }
        (ShapeClass::Polygon, ShapeClass::Circle) => {
            b.world_circle().is_some_and(|cb| polygon_in_circle(a, cb))
        }
        (ShapeClass::Polygon, ShapeClass::Polygon) => polygon_in_polygon(a, b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BodyOptions;
    use approx::assert_abs_diff_eq;

    fn line(x0: f64, y0: f64, x1: f64, y1: f64) -> Line {
        Line::new((x0, y0), (x1, y1))
    }

    #[test]
    fn crossing_diagonals_meet_in_the_middle() {
        let p = intersect_line_line(line(0.0, 0.0, 2.0, 2.0), line(0.0, 2.0, 2.0, 0.0));
        assert_eq!(p, Some(Point::new(1.0, 1.0)));
        assert!(intersect_line_line_fast(
            line(0.0, 0.0, 2.0, 2.0),
            line(0.0, 2.0, 2.0, 0.0)
        ));
    }

    #[test]
    fn parallel_segments_never_meet() {
        assert_eq!(
            intersect_line_line(line(0.0, 0.0, 1.0, 0.0), line(0.0, 1.0, 1.0, 1.0)),
            None
        );
        assert!(!intersect_line_line_fast(
            line(0.0, 0.0, 1.0, 0.0),
            line(0.0, 1.0, 1.0, 1.0)
        ));
    }

    #[test]
    fn segment_endpoints_are_inclusive() {
        let p = intersect_line_line(line(0.0, 0.0, 1.0, 0.0), line(1.0, -1.0, 1.0, 1.0));
        assert_eq!(p, Some(Point::new(1.0, 0.0)));
        assert_eq!(
            intersect_line_line(line(0.0, 0.0, 0.9, 0.0), line(1.0, -1.0, 1.0, 1.0)),
            None
        );
    }

    #[test]
    fn line_circle_entry_first() {
        let hits = intersect_line_circle(line(0.0, 0.0, 10.0, 0.0), Circle::new((5.0, 0.0), 1.0));
        assert_eq!(hits.len(), 2);
        assert_abs_diff_eq!(hits[0].x, 4.0);
        assert_abs_diff_eq!(hits[1].x, 6.0);
        // Segment ending inside the circle only enters.
        let half = intersect_line_circle(line(0.0, 0.0, 5.0, 0.0), Circle::new((5.0, 0.0), 1.0));
        assert_eq!(half.len(), 1);
        assert!(intersect_line_circle(line(0.0, 3.0, 10.0, 3.0), Circle::new((5.0, 0.0), 1.0))
            .is_empty());
        // Zero-length segment.
        assert!(intersect_line_circle(line(1.0, 1.0, 1.0, 1.0), Circle::new((0.0, 0.0), 5.0))
            .is_empty());
    }

    #[test]
    fn circle_circle_cases() {
        let a = Circle::new((0.0, 0.0), 5.0);
        let pts = intersect_circle_circle(a, Circle::new((8.0, 0.0), 5.0));
        assert_eq!(pts.len(), 2);
        for p in &pts {
            assert_abs_diff_eq!(p.x, 4.0, epsilon = 1e-12);
            assert_abs_diff_eq!(p.y.abs(), 3.0, epsilon = 1e-12);
        }
        assert!(intersect_circle_circle(a, Circle::new((20.0, 0.0), 5.0)).is_empty());
        assert!(intersect_circle_circle(a, Circle::new((1.0, 0.0), 1.0)).is_empty());
        assert!(intersect_circle_circle(a, a).is_empty());
    }

    #[test]
    fn polygon_polygon_dedupes_shared_corners() {
        let sq = |x: f64, y: f64| {
            vec![
                Point::new(x, y),
                Point::new(x + 2.0, y),
                Point::new(x + 2.0, y + 2.0),
                Point::new(x, y + 2.0),
            ]
        };
        let pts = intersect_polygon_polygon(&sq(0.0, 0.0), &sq(1.0, 1.0));
        assert_eq!(pts.len(), 2);
        assert!(pts.contains(&Point::new(2.0, 1.0)));
        assert!(pts.contains(&Point::new(1.0, 2.0)));
    }

    #[test]
    fn containment_predicates() {
        let opts = BodyOptions::default();
        let big = Body::rectangle(Point::ORIGIN, 10.0, 10.0, &opts);
        let small = Body::rectangle(Point::new(2.0, 2.0), 1.0, 1.0, &opts);
        assert!(polygon_in_polygon(&small, &big));
        assert!(!polygon_in_polygon(&big, &small));

        let inside = Circle::new((5.0, 5.0), 1.0);
        assert!(circle_in_polygon(inside, &big));
        assert!(!circle_outside_polygon(inside, &big));
        let outside = Circle::new((20.0, 5.0), 1.0);
        assert!(circle_outside_polygon(outside, &big));
        assert!(!circle_in_polygon(outside, &big));
        let straddling = Circle::new((10.0, 5.0), 1.0);
        assert!(!circle_in_polygon(straddling, &big) && !circle_outside_polygon(straddling, &big));
        assert!(!circle_in_polygon(Circle::new((5.0, 5.0), 0.0), &big));

        assert!(polygon_in_circle(&small, Circle::new((2.5, 2.5), 1.0)));
        assert!(circle_in_circle(Circle::new((1.0, 0.0), 1.0), Circle::new((0.0, 0.0), 2.0)));
        assert!(!circle_in_circle(Circle::new((0.0, 0.0), 2.0), Circle::new((1.0, 0.0), 1.0)));
        assert!(point_on_circle(Point::new(0.0, 2.0), Circle::new((0.0, 0.0), 2.0)));
    }
}
