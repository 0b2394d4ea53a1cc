// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Convex decomposition of simple polygons (Bayazit's algorithm).
//!
//! Input outlines are expected counter-clockwise with y pointing up (see
//! [`make_ccw`]). Every reflex vertex is connected either to the closest vertex
//! it can see inside its reflex cone, or, if there is none, to a Steiner point
//! halfway between the nearest edge hits on either side. The two halves are
//! decomposed recursively, smaller half first.

use kurbo::Vec2;

/// Recursion limit for [`quick_decomp`].
pub const MAX_LEVEL: usize = 100;

#[allow(
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    reason = "Polygon sizes are far below isize::MAX and rem_euclid is non-negative."
)]
fn at(poly: &[Vec2], i: isize) -> Vec2 {
    poly[i.rem_euclid(poly.len() as isize) as usize]
}

/// Twice the signed area of triangle `abc`; positive when counter-clockwise.
fn triangle_area(a: Vec2, b: Vec2, c: Vec2) -> f64 {
    (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y)
}

fn is_left(a: Vec2, b: Vec2, c: Vec2) -> bool {
    triangle_area(a, b, c) > 0.0
}

fn is_left_on(a: Vec2, b: Vec2, c: Vec2) -> bool {
    triangle_area(a, b, c) >= 0.0
}

fn is_right(a: Vec2, b: Vec2, c: Vec2) -> bool {
    triangle_area(a, b, c) < 0.0
}

fn is_right_on(a: Vec2, b: Vec2, c: Vec2) -> bool {
    triangle_area(a, b, c) <= 0.0
}

fn is_reflex(poly: &[Vec2], i: isize) -> bool {
    is_right(at(poly, i - 1), at(poly, i), at(poly, i + 1))
}

/// Intersection of the infinite lines through `p1 p2` and `q1 q2`; origin if parallel.
fn line_intersection(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> Vec2 {
    let a1 = p2.y - p1.y;
    let b1 = p1.x - p2.x;
    let c1 = a1 * p1.x + b1 * p1.y;
    let a2 = q2.y - q1.y;
    let b2 = q1.x - q2.x;
    let c2 = a2 * q1.x + b2 * q1.y;
    let det = a1 * b2 - a2 * b1;
    if det == 0.0 {
        return Vec2::ZERO;
    }
    Vec2::new((b2 * c1 - b1 * c2) / det, (a1 * c2 - a2 * c1) / det)
}

/// Whether segments `p1 p2` and `q1 q2` cross; parallel segments never do.
pub(crate) fn segments_intersect(p1: Vec2, p2: Vec2, q1: Vec2, q2: Vec2) -> bool {
    let dx = p2.x - p1.x;
    let dy = p2.y - p1.y;
    let da = q2.x - q1.x;
    let db = q2.y - q1.y;
    let denom = da * dy - db * dx;
    if denom == 0.0 {
        return false;
    }
    let s = (dx * (q1.y - p1.y) + dy * (p1.x - q1.x)) / denom;
    let t = (da * (p1.y - q1.y) + db * (q1.x - p1.x)) / -denom;
    (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t)
}

/// Whether the diagonal from vertex `a` to vertex `b` crosses no other edge.
fn can_see(poly: &[Vec2], a: usize, b: usize) -> bool {
    let n = poly.len();
    let b = b % n;
    for i in 0..n {
        let j = (i + 1) % n;
        if i == a || i == b || j == a || j == b {
            continue;
        }
        if segments_intersect(poly[a], poly[b], poly[i], poly[j]) {
            return false;
        }
    }
    true
}

fn dist2(a: Vec2, b: Vec2) -> f64 {
    (a - b).hypot2()
}

/// Split a counter-clockwise simple polygon into convex pieces.
///
/// A convex input comes back as a single piece. Inputs with fewer than three
/// points, and branches deeper than [`MAX_LEVEL`], contribute nothing.
pub fn quick_decomp(polygon: &[Vec2]) -> Vec<Vec<Vec2>> {
    let mut result = Vec::new();
    decomp_into(polygon, &mut result, 0);
    result
}

#[allow(
    clippy::cast_possible_wrap,
    reason = "Polygon sizes are far below isize::MAX."
)]
fn decomp_into(poly: &[Vec2], result: &mut Vec<Vec<Vec2>>, level: usize) {
    let n = poly.len();
    if n < 3 {
        return;
    }
    let level = level + 1;
    if level > MAX_LEVEL {
        log::debug!("quick_decomp: max level ({MAX_LEVEL}) reached");
        return;
    }

    let Some(i) = (0..n).find(|&i| is_reflex(poly, i as isize)) else {
        result.push(poly.to_vec());
        return;
    };
    let ii = i as isize;
    let mut lower_int = Vec2::ZERO;
    let mut upper_int = Vec2::ZERO;
    let mut lower_dist = f64::MAX;
    let mut upper_dist = f64::MAX;
    let mut lower_index = 0_usize;
    let mut upper_index = 0_usize;

    for j in 0..n {
        let jj = j as isize;
        // Extend the edge entering `i` and find the closest edge it hits.
        if is_left(at(poly, ii - 1), at(poly, ii), at(poly, jj))
            && is_right_on(at(poly, ii - 1), at(poly, ii), at(poly, jj - 1))
        {
            let p = line_intersection(
                at(poly, ii - 1),
                at(poly, ii),
                at(poly, jj),
                at(poly, jj - 1),
            );
            if is_right(at(poly, ii + 1), at(poly, ii), p) {
                let d = dist2(poly[i], p);
                if d < lower_dist {
                    lower_dist = d;
                    lower_int = p;
                    lower_index = j;
                }
            }
        }
        // Same for the edge leaving `i`.
        if is_left(at(poly, ii + 1), at(poly, ii), at(poly, jj + 1))
            && is_right_on(at(poly, ii + 1), at(poly, ii), at(poly, jj))
        {
            let p = line_intersection(
                at(poly, ii + 1),
                at(poly, ii),
                at(poly, jj),
                at(poly, jj + 1),
            );
            if is_left(at(poly, ii - 1), at(poly, ii), p) {
                let d = dist2(poly[i], p);
                if d < upper_dist {
                    upper_dist = d;
                    upper_int = p;
                    upper_index = j;
                }
            }
        }
    }

    let mut lower_poly: Vec<Vec2> = Vec::new();
    let mut upper_poly: Vec<Vec2> = Vec::new();

    if lower_index == (upper_index + 1) % n {
        // No vertex to connect to: split at a Steiner point.
        let p = (lower_int + upper_int) * 0.5;
        if i < upper_index {
            lower_poly.extend_from_slice(&poly[i..=upper_index]);
            lower_poly.push(p);
            upper_poly.push(p);
            if lower_index != 0 {
                upper_poly.extend_from_slice(&poly[lower_index..]);
            }
            upper_poly.extend_from_slice(&poly[..=i]);
        } else {
            if i != 0 {
                lower_poly.extend_from_slice(&poly[i..]);
            }
            lower_poly.extend_from_slice(&poly[..=upper_index]);
            lower_poly.push(p);
            upper_poly.push(p);
            upper_poly.extend_from_slice(&poly[lower_index..=i]);
        }
    } else {
        // Connect to the closest visible vertex inside the reflex cone.
        if lower_index > upper_index {
            upper_index += n;
        }
        let mut closest_dist = f64::MAX;
        let mut closest_index = 0_usize;
        for j in lower_index..=upper_index {
            let jj = j as isize;
            if is_left_on(at(poly, ii - 1), at(poly, ii), at(poly, jj))
                && is_right_on(at(poly, ii + 1), at(poly, ii), at(poly, jj))
            {
                let d = dist2(at(poly, ii), at(poly, jj));
                if d < closest_dist && can_see(poly, i, j) {
                    closest_dist = d;
                    closest_index = j % n;
                }
            }
        }

        if i < closest_index {
            lower_poly.extend_from_slice(&poly[i..=closest_index]);
            if closest_index != 0 {
                upper_poly.extend_from_slice(&poly[closest_index..]);
            }
            upper_poly.extend_from_slice(&poly[..=i]);
        } else {
            if i != 0 {
                lower_poly.extend_from_slice(&poly[i..]);
            }
            lower_poly.extend_from_slice(&poly[..=closest_index]);
            upper_poly.extend_from_slice(&poly[closest_index..=i]);
        }
    }

    if lower_poly.len() < upper_poly.len() {
        decomp_into(&lower_poly, result, level);
        decomp_into(&upper_poly, result, level);
    } else {
        decomp_into(&upper_poly, result, level);
        decomp_into(&lower_poly, result, level);
    }
}

/// Whether no two non-adjacent edges of the closed outline cross.
pub fn is_simple(path: &[Vec2]) -> bool {
    let n = path.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..i.saturating_sub(1) {
            if segments_intersect(path[i], path[i + 1], path[j], path[j + 1]) {
                return false;
            }
        }
    }
    // The closing edge against every edge it does not touch.
    for i in 1..n.saturating_sub(2) {
        if segments_intersect(path[0], path[n - 1], path[i], path[i + 1]) {
            return false;
        }
    }
    true
}

/// Reorder to counter-clockwise winding; returns true if the input was reversed.
pub fn make_ccw(poly: &mut [Vec2]) -> bool {
    let Some(first) = poly.first().copied() else {
        return false;
    };
    let mut br = 0;
    let mut lowest = first;
    for (i, p) in poly.iter().enumerate().skip(1) {
        if p.y < lowest.y || (p.y == lowest.y && p.x > lowest.x) {
            br = i;
            lowest = *p;
        }
    }
    #[allow(
        clippy::cast_possible_wrap,
        reason = "Polygon sizes are far below isize::MAX."
    )]
    let b = br as isize;
    if is_left(at(poly, b - 1), at(poly, b), at(poly, b + 1)) {
        false
    } else {
        poly.reverse();
        true
    }
}

/// Signed area of a closed outline; positive when counter-clockwise.
pub fn signed_area(points: &[Vec2]) -> f64 {
    let n = points.len();
    0.5 * (0..n)
        .map(|i| points[i].cross(points[(i + 1) % n]))
        .sum::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn v(pts: &[(f64, f64)]) -> Vec<Vec2> {
        pts.iter().map(|&(x, y)| Vec2::new(x, y)).collect()
    }

    #[allow(clippy::cast_possible_wrap, reason = "test sizes are tiny")]
    fn is_convex(poly: &[Vec2]) -> bool {
        (0..poly.len()).all(|i| !is_reflex(poly, i as isize))
    }

    #[test]
    fn convex_input_is_one_piece() {
        let square = v(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]);
        assert_eq!(quick_decomp(&square), [square.clone()]);
    }

    #[test]
    fn l_shape_splits_along_inner_corner() {
        let l = v(&[
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ]);
        let pieces = quick_decomp(&l);
        assert_eq!(
            pieces,
            [
                v(&[(0.0, 0.0), (4.0, 0.0), (4.0, 1.0), (1.0, 1.0)]),
                v(&[(1.0, 1.0), (1.0, 4.0), (0.0, 4.0), (0.0, 0.0)]),
            ]
        );
    }

    #[test]
    fn pieces_are_convex_and_preserve_area() {
        // A comb with three teeth: several reflex vertices.
        let comb = v(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 6.0),
            (8.0, 6.0),
            (8.0, 2.0),
            (6.0, 2.0),
            (6.0, 6.0),
            (4.0, 6.0),
            (4.0, 2.0),
            (2.0, 2.0),
            (2.0, 6.0),
            (0.0, 6.0),
        ]);
        let pieces = quick_decomp(&comb);
        assert!(pieces.len() >= 3, "comb needs at least three pieces");
        for p in &pieces {
            assert!(is_convex(p), "piece {p:?} is not convex");
        }
        let total: f64 = pieces.iter().map(|p| signed_area(p)).sum();
        assert_abs_diff_eq!(total, signed_area(&comb), epsilon = 1e-9);
        assert_abs_diff_eq!(total, 10.0 * 2.0 + 3.0 * 2.0 * 4.0, epsilon = 1e-9);
    }

    #[test]
    fn simplicity() {
        let bowtie = v(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert!(!is_simple(&bowtie));
        let square = v(&[(0.0, 0.0), (2.0, 0.0), (2.0, 2.0), (0.0, 2.0)]);
        assert!(is_simple(&square));
    }

    #[test]
    fn make_ccw_reverses_clockwise() {
        let mut cw = v(&[(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)]);
        assert!(make_ccw(&mut cw));
        assert!(signed_area(&cw) > 0.0);
        assert!(!make_ccw(&mut cw));
    }
}
