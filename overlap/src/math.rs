// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Small numeric helpers shared by bodies, tests, and callers.

use core::f64::consts::PI;

use kurbo::{Point, Rect, Vec2};

/// Tolerance used by [`almost_equal`] and [`points_equal`].
pub const EPSILON: f64 = 1e-9;

/// Convert degrees to radians.
pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees * (PI / 180.0)
}

/// Convert radians to degrees.
pub fn rad_to_deg(radians: f64) -> f64 {
    radians * (180.0 / PI)
}

/// Whether `a` and `b` differ by less than [`EPSILON`].
pub fn almost_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Whether both coordinates are [`almost_equal`].
pub fn points_equal(a: Point, b: Point) -> bool {
    almost_equal(a.x, b.x) && almost_equal(a.y, b.y)
}

/// Euclidean distance between two points.
pub fn distance(a: Point, b: Point) -> f64 {
    (a - b).hypot()
}

/// Direction `body` bounces off `collider`, treating both as equal-mass circles.
pub fn bounce_direction(body: Point, collider: Point) -> Vec2 {
    let v2 = collider - body;
    let v1 = body - collider;
    let len = v1.dot(normalize_or_zero(v2)) * 2.0;
    normalize_or_zero(v2 * len - v1)
}

/// Unit vector along `v`, or zero for a zero-length vector.
pub(crate) fn normalize_or_zero(v: Vec2) -> Vec2 {
    let len = v.hypot();
    if len > 0.0 { v / len } else { Vec2::ZERO }
}

/// Rotate `v` counter-clockwise by `angle` radians.
pub(crate) fn rotate(v: Vec2, angle: f64) -> Vec2 {
    if angle == 0.0 {
        return v;
    }
    let (sin, cos) = angle.sin_cos();
    Vec2::new(v.x * cos - v.y * sin, v.x * sin + v.y * cos)
}

/// Whether the outline winds clockwise (positive shoelace sum, y up).
pub(crate) fn clockwise(points: &[Vec2]) -> bool {
    let n = points.len();
    let sum: f64 = (0..n)
        .map(|i| {
            let (v1, v2) = (points[i], points[(i + 1) % n]);
            (v2.x - v1.x) * (v2.y + v1.y)
        })
        .sum();
    sum > 0.0
}

/// Reverse a clockwise outline in place so it winds counter-clockwise.
pub(crate) fn ensure_ccw(points: &mut [Vec2]) {
    if clockwise(points) {
        points.reverse();
    }
}

/// Corners of a `width × height` box with its first corner at the origin.
pub(crate) fn box_points(width: f64, height: f64) -> Vec<Vec2> {
    vec![
        Vec2::new(0.0, 0.0),
        Vec2::new(width, 0.0),
        Vec2::new(width, height),
        Vec2::new(0.0, height),
    ]
}

/// Number of vertices used to approximate an ellipse.
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "The count is a small positive integer after ceil and max."
)]
pub(crate) fn ellipse_vertex_count(radius_x: f64, radius_y: f64, step: f64) -> usize {
    let perimeter = PI * radius_x.hypot(radius_y) * 2.0;
    let n = (perimeter / step.max(1.0)).ceil();
    if n.is_finite() { n.max(8.0) as usize } else { 8 }
}

/// Vertices of an origin-centered ellipse, counter-clockwise from +x.
#[allow(
    clippy::cast_precision_loss,
    reason = "Vertex counts are far below 2^52."
)]
pub(crate) fn ellipse_points(radius_x: f64, radius_y: f64, step: f64) -> Vec<Vec2> {
    let n = ellipse_vertex_count(radius_x, radius_y, step);
    (0..n)
        .map(|i| {
            let t = (i as f64 / n as f64) * 2.0 * PI;
            Vec2::new(t.cos() * radius_x, t.sin() * radius_y)
        })
        .collect()
}

/// Inclusive rectangle overlap: touching edges count.
pub(crate) fn rects_overlap(a: Rect, b: Rect) -> bool {
    !(b.x0 > a.x1 || b.y0 > a.y1 || b.x1 < a.x0 || b.y1 < a.y0)
}

/// Whether `inner` lies within `outer`, edges included.
pub(crate) fn rect_contains(outer: Rect, inner: Rect) -> bool {
    inner.x0 >= outer.x0 && inner.y0 >= outer.y0 && inner.x1 <= outer.x1 && inner.y1 <= outer.y1
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn angle_conversions_invert() {
        assert_abs_diff_eq!(deg_to_rad(180.0), PI);
        assert_abs_diff_eq!(rad_to_deg(deg_to_rad(37.5)), 37.5, epsilon = 1e-12);
    }

    #[test]
    fn winding_detection() {
        let mut pts = box_points(2.0, 1.0);
        assert!(!clockwise(&pts));
        pts.reverse();
        assert!(clockwise(&pts));
        ensure_ccw(&mut pts);
        assert!(!clockwise(&pts));
        assert_eq!(pts[0], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn ellipse_has_at_least_eight_vertices() {
        assert_eq!(ellipse_points(1.0, 1.0, 100.0).len(), 8);
        // 2π·hypot(30, 40) = 100π; step 10 → ceil(31.4) = 32.
        assert_eq!(ellipse_vertex_count(30.0, 40.0, 10.0), 32);
        let pts = ellipse_points(3.0, 2.0, 1.0);
        assert_abs_diff_eq!(pts[0].x, 3.0);
        assert!(!clockwise(&pts));
    }

    #[test]
    fn rotation_quarter_turn() {
        let v = rotate(Vec2::new(1.0, 0.0), PI / 2.0);
        assert_abs_diff_eq!(v.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn head_on_bounce_reverses() {
        let d = bounce_direction(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert_abs_diff_eq!(d.x, -1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(d.y, 0.0, epsilon = 1e-12);
        assert!(points_equal(Point::new(1.0, 2.0), Point::new(1.0 + 1e-12, 2.0)));
        assert_abs_diff_eq!(distance(Point::ORIGIN, Point::new(3.0, 4.0)), 5.0);
    }
}
