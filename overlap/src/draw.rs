// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Debug drawing.
//!
//! The engine never renders anything itself. It walks its geometry and emits
//! path commands into a caller-supplied [`DebugDraw`] sink, which can forward
//! them to a canvas, an SVG writer, or a test recorder.

use kurbo::{Circle, Point, Rect};

use crate::body::Body;
use crate::math::ellipse_points;

/// Dash length used for trigger outlines.
pub const DASH: f64 = 2.0;
/// Gap length used for trigger outlines.
pub const GAP: f64 = 4.0;

/// Path sink receiving debug geometry.
pub trait DebugDraw {
    /// Start a new subpath at `p`.
    fn move_to(&mut self, p: Point);
    /// Extend the current subpath to `p`.
    fn line_to(&mut self, p: Point);
    /// A full circle outline.
    fn circle(&mut self, circle: Circle);
}

/// Emit `from → to` as alternating dashes and gaps.
pub fn dashed_line(sink: &mut impl DebugDraw, from: Point, to: Point, dash: f64, gap: f64) {
    let delta = to - from;
    let len = delta.hypot();
    if len == 0.0 || dash <= 0.0 {
        return;
    }
    let dir = delta / len;
    let mut t = 0.0;
    while t < len {
        let end = (t + dash).min(len);
        sink.move_to(from + dir * t);
        sink.line_to(from + dir * end);
        t = end + gap.max(0.0);
    }
}

fn outline(sink: &mut impl DebugDraw, points: &[Point], dashed: bool) {
    let n = points.len();
    if n == 0 {
        return;
    }
    if dashed {
        for i in 0..n {
            dashed_line(sink, points[i], points[(i + 1) % n], DASH, GAP);
        }
        return;
    }
    sink.move_to(points[0]);
    for p in &points[1..] {
        sink.line_to(*p);
    }
    if n > 2 {
        sink.line_to(points[0]);
    }
}

/// Outline of a body; triggers are dashed.
pub fn draw_body(sink: &mut impl DebugDraw, body: &Body) {
    let dashed = body.is_trigger();
    match body.world_circle() {
        Some(c) if dashed => {
            let pts: Vec<Point> = ellipse_points(c.radius, c.radius, DASH + GAP)
                .into_iter()
                .map(|v| c.center + v)
                .collect();
            outline(sink, &pts, true);
        }
        Some(c) => sink.circle(c),
        None => {
            let pts: Vec<Point> = body.world_points().collect();
            outline(sink, &pts, dashed);
        }
    }
}

/// Outline of an axis-aligned box.
pub fn draw_rect(sink: &mut impl DebugDraw, rect: Rect, dashed: bool) {
    let pts = [
        Point::new(rect.x0, rect.y0),
        Point::new(rect.x1, rect.y0),
        Point::new(rect.x1, rect.y1),
        Point::new(rect.x0, rect.y1),
    ];
    outline(sink, &pts, dashed);
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::BodyOptions;

    /// Records every command, for assertions.
    #[derive(Default, Debug)]
    pub(crate) struct Recorder {
        pub(crate) moves: Vec<Point>,
        pub(crate) lines: Vec<Point>,
        pub(crate) circles: Vec<Circle>,
    }

    impl DebugDraw for Recorder {
        fn move_to(&mut self, p: Point) {
            self.moves.push(p);
        }
        fn line_to(&mut self, p: Point) {
            self.lines.push(p);
        }
        fn circle(&mut self, circle: Circle) {
            self.circles.push(circle);
        }
    }

    #[test]
    fn dashes_cover_the_segment() {
        let mut r = Recorder::default();
        dashed_line(&mut r, Point::ORIGIN, Point::new(13.0, 0.0), 2.0, 4.0);
        // Dashes start at 0, 6, 12; the last one is clipped to the end.
        assert_eq!(r.moves.len(), 3);
        assert_eq!(r.moves[2], Point::new(12.0, 0.0));
        assert_eq!(r.lines[2], Point::new(13.0, 0.0));
    }

    #[test]
    fn solid_and_dashed_bodies() {
        let mut r = Recorder::default();
        let solid = Body::rectangle(Point::ORIGIN, 12.0, 12.0, &BodyOptions::default());
        draw_body(&mut r, &solid);
        assert_eq!(r.moves.len(), 1);
        assert_eq!(r.lines.len(), 4);

        let mut r = Recorder::default();
        let trigger = Body::rectangle(
            Point::ORIGIN,
            12.0,
            12.0,
            &BodyOptions::default().with_trigger(true),
        );
        draw_body(&mut r, &trigger);
        assert_eq!(r.moves.len(), 8);

        let mut r = Recorder::default();
        draw_body(
            &mut r,
            &Body::circle(Point::new(1.0, 1.0), 3.0, &BodyOptions::default()),
        );
        assert_eq!(r.circles, vec![Circle::new((1.0, 1.0), 3.0)]);
    }
}
