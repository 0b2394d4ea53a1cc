// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bodies: shape variants sharing one transform, bounding box, and collision metadata.
//!
//! Polygon-family bodies keep three point lists:
//!
//! - `points_backup`: the outline as given, before scaling,
//! - `points`: the backup multiplied by the current scale,
//! - `calc_points`: `points` shifted by the offset and rotated by the angle.
//!
//! World coordinates are `pos + calc_points[i]`. Scaling always starts again from
//! the backup, so repeated scale changes never accumulate rounding.
//!
//! Non-convex polygons also cache their convex pieces. The pieces are recomputed
//! only when the outline changes; rotation and offset changes just re-rotate the
//! cached pieces.

use core::f64::consts::PI;

use kurbo::{Circle, Line, Point, Rect, Vec2};

use crate::decomp;
use crate::error::BodyError;
use crate::group::Group;
use crate::math::{box_points, ellipse_points, ensure_ccw, rotate};
use crate::options::BodyOptions;
use crate::sat::ConvexShape;
use crate::types::{BodyGroup, BodyType};

/// Side length of the box standing in for a point body.
pub const POINT_SIZE: f64 = 0.001;

/// Shape-specific parameters of a body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Shape {
    /// Exact circle; the radius is before scaling.
    Circle {
        /// Radius before scaling.
        radius: f64,
    },
    /// Arbitrary simple polygon.
    Polygon,
    /// Rectangle with its first corner at the local origin.
    Box {
        /// Width before scaling.
        width: f64,
        /// Height before scaling.
        height: f64,
    },
    /// Polygonal ellipse centered on the local origin.
    Ellipse {
        /// Horizontal radius.
        radius_x: f64,
        /// Vertical radius.
        radius_y: f64,
        /// Approximate outline length per vertex.
        step: f64,
    },
    /// Segment from the body position.
    Line,
    /// Tiny box of side [`POINT_SIZE`].
    Point,
}

impl Shape {
    /// Kind label of this shape.
    pub const fn body_type(&self) -> BodyType {
        match self {
            Self::Circle { .. } => BodyType::Circle,
            Self::Polygon => BodyType::Polygon,
            Self::Box { .. } => BodyType::Box,
            Self::Ellipse { .. } => BodyType::Ellipse,
            Self::Line => BodyType::Line,
            Self::Point => BodyType::Point,
        }
    }
}

/// One convex piece of a non-convex polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct ConvexPiece {
    points: Vec<Vec2>,
    calc_points: Vec<Vec2>,
}

impl ConvexPiece {
    /// Outline in the parent's scaled local frame, before offset and rotation.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Outline relative to the parent position, after offset and rotation.
    pub fn calc_points(&self) -> &[Vec2] {
        &self.calc_points
    }
}

/// A collision body.
///
/// Bodies are plain values: build one, then hand it to a
/// [`System`](crate::System), which owns it until it is removed. Setters
/// update geometry and the tight bounding box right away and mark the body
/// dirty; the system re-indexes dirty bodies on [`System::update`](crate::System::update)
/// or immediately through its own mutators.
#[derive(Clone, Debug)]
pub struct Body {
    shape: Shape,
    pos: Point,
    angle: f64,
    offset: Vec2,
    scale: Vec2,
    points: Vec<Vec2>,
    points_backup: Vec<Vec2>,
    calc_points: Vec<Vec2>,
    centered: bool,
    is_convex: bool,
    convex: Vec<ConvexPiece>,
    is_static: bool,
    is_trigger: bool,
    padding: f64,
    group: Group,
    user_data: u128,
    bbox: Rect,
    padded: Rect,
    padding_changed: bool,
    dirty: bool,
}

impl Body {
    fn with_shape(shape: Shape, pos: Point, points: Vec<Vec2>) -> Self {
        let mut body = Self {
            shape,
            pos,
            angle: 0.0,
            offset: Vec2::ZERO,
            scale: Vec2::new(1.0, 1.0),
            points_backup: points.clone(),
            calc_points: Vec::with_capacity(points.len()),
            points,
            centered: matches!(shape, Shape::Ellipse { .. }),
            is_convex: true,
            convex: Vec::new(),
            is_static: false,
            is_trigger: false,
            padding: 0.0,
            group: Group::ALL,
            user_data: 0,
            bbox: Rect::ZERO,
            padded: Rect::ZERO,
            padding_changed: false,
            dirty: false,
        };
        body.update_convex();
        body.recalc();
        body
    }

    fn apply_options(mut self, opts: &BodyOptions) -> Self {
        self.is_static = opts.is_static;
        self.is_trigger = opts.is_trigger;
        self.padding = opts.padding.max(0.0);
        self.group = opts.group;
        self.user_data = opts.user_data;
        if opts.is_centered {
            self.set_centered(true);
        }
        if opts.angle != 0.0 {
            self.set_angle(opts.angle);
        }
        self.padded = self.bbox.inflate(self.padding, self.padding);
        self.dirty = false;
        self
    }

    /// A circle centered on `pos`.
    pub fn circle(pos: Point, radius: f64, opts: &BodyOptions) -> Self {
        let shape = Shape::Circle {
            radius: radius.abs(),
        };
        Self::with_shape(shape, pos, Vec::new()).apply_options(opts)
    }

    /// A polygon through `points`, relative to `pos`.
    ///
    /// Clockwise outlines are reversed. Non-convex outlines are decomposed into
    /// convex pieces.
    pub fn polygon(pos: Point, points: &[Vec2], opts: &BodyOptions) -> Result<Self, BodyError> {
        if points.is_empty() {
            return Err(BodyError::NoPoints);
        }
        let mut pts = points.to_vec();
        ensure_ccw(&mut pts);
        Ok(Self::with_shape(Shape::Polygon, pos, pts).apply_options(opts))
    }

    /// A `width × height` box with its first corner at `pos`.
    pub fn rectangle(pos: Point, width: f64, height: f64, opts: &BodyOptions) -> Self {
        let shape = Shape::Box { width, height };
        Self::with_shape(shape, pos, box_points(width, height)).apply_options(opts)
    }

    /// A polygonal ellipse centered on `pos`.
    ///
    /// `step` defaults to `(radius_x + radius_y) / π`.
    pub fn ellipse(
        pos: Point,
        radius_x: f64,
        radius_y: f64,
        step: Option<f64>,
        opts: &BodyOptions,
    ) -> Self {
        let step = step.unwrap_or((radius_x + radius_y) / PI);
        let shape = Shape::Ellipse {
            radius_x,
            radius_y,
            step,
        };
        Self::with_shape(shape, pos, ellipse_points(radius_x, radius_y, step)).apply_options(opts)
    }

    /// A segment from `start` to `end`; the body position is `start`.
    pub fn line(start: Point, end: Point, opts: &BodyOptions) -> Result<Self, BodyError> {
        if !start.is_finite() || !end.is_finite() || start == end {
            return Err(BodyError::DegenerateLine { start, end });
        }
        let pts = vec![Vec2::ZERO, end - start];
        Ok(Self::with_shape(Shape::Line, start, pts).apply_options(opts))
    }

    /// A point body: a box of side [`POINT_SIZE`] at `pos`.
    pub fn point(pos: Point, opts: &BodyOptions) -> Self {
        Self::with_shape(Shape::Point, pos, box_points(POINT_SIZE, POINT_SIZE)).apply_options(opts)
    }

    // --- accessors ---

    /// Shape parameters.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Kind label.
    pub fn body_type(&self) -> BodyType {
        self.shape.body_type()
    }

    /// Kind flag.
    pub fn body_group(&self) -> BodyGroup {
        self.body_type().group()
    }

    /// World position.
    pub fn pos(&self) -> Point {
        self.pos
    }

    /// Rotation in radians.
    pub fn angle(&self) -> f64 {
        self.angle
    }

    /// Offset applied to the outline before rotation.
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Per-axis scale.
    pub fn scale(&self) -> Vec2 {
        self.scale
    }

    /// Scaled local outline, before offset and rotation. Empty for circles.
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    /// Outline relative to [`pos`](Self::pos), after offset and rotation. Empty for circles.
    pub fn calc_points(&self) -> &[Vec2] {
        &self.calc_points
    }

    /// World-space outline. Empty for circles.
    pub fn world_points(&self) -> impl Iterator<Item = Point> + '_ {
        self.calc_points.iter().map(|p| self.pos + *p)
    }

    /// World-space edge from vertex `index` to the next one.
    pub fn edge(&self, index: usize) -> Option<Line> {
        let n = self.calc_points.len();
        let a = *self.calc_points.get(index)?;
        let b = self.calc_points[(index + 1) % n];
        Some(Line::new(self.pos + a, self.pos + b))
    }

    /// World-space circle, for circle bodies.
    pub fn world_circle(&self) -> Option<Circle> {
        match self.shape {
            Shape::Circle { radius } => Some(Circle::new(
                self.pos + rotate(self.offset, self.angle),
                radius * self.scale.x,
            )),
            _ => None,
        }
    }

    /// Scaled radius of a circle body.
    pub fn radius(&self) -> Option<f64> {
        self.world_circle().map(|c| c.radius)
    }

    /// Whether the outline is convex (always true except for some polygons).
    pub fn is_convex(&self) -> bool {
        self.is_convex
    }

    /// Cached convex pieces; empty for convex bodies.
    pub fn convex_pieces(&self) -> &[ConvexPiece] {
        &self.convex
    }

    /// Whether the outline has been recentered on its centroid.
    pub fn is_centered(&self) -> bool {
        self.centered
    }

    /// Never displaced by separation.
    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// Reported by queries but never pushes or gets pushed.
    pub fn is_trigger(&self) -> bool {
        self.is_trigger
    }

    /// Margin around the tight box used for indexing.
    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// Interaction group.
    pub fn group(&self) -> Group {
        self.group
    }

    /// Caller payload; see [`BodyOptions::user_data`] for how to encode handles.
    pub fn user_data(&self) -> u128 {
        self.user_data
    }

    /// Tight world-space bounding box.
    pub fn bbox(&self) -> Rect {
        self.bbox
    }

    /// Padded bounding box as last stored in the index.
    pub fn padded_bbox(&self) -> Rect {
        self.padded
    }

    /// Changed since it was last reconciled with the index.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Segment of a line body.
    pub fn line_segment(&self) -> Option<Line> {
        match self.shape {
            Shape::Line => self.edge(0),
            _ => None,
        }
    }

    /// Area-weighted centroid of the outline relative to [`pos`](Self::pos).
    ///
    /// Falls back to the vertex average for outlines without area.
    pub fn centroid(&self) -> Vec2 {
        if self.world_circle().is_some() {
            return rotate(self.offset, self.angle);
        }
        let pts = &self.calc_points;
        let n = pts.len();
        let (mut cx, mut cy, mut area) = (0.0, 0.0, 0.0);
        for i in 0..n {
            let p1 = pts[i];
            let p2 = pts[(i + 1) % n];
            let a = p1.cross(p2);
            cx += (p1.x + p2.x) * a;
            cy += (p1.y + p2.y) * a;
            area += a;
        }
        if area.abs() < crate::math::EPSILON {
            #[allow(clippy::cast_precision_loss, reason = "Vertex counts are small.")]
            let count = n.max(1) as f64;
            return pts.iter().fold(Vec2::ZERO, |acc, p| acc + *p) / count;
        }
        Vec2::new(cx, cy) / (area * 3.0)
    }

    /// Whether the world outline does not cross itself.
    pub fn is_simple(&self) -> bool {
        decomp::is_simple(&self.calc_points)
    }

    /// Every convex polygon making up the body, as (world position, outline).
    ///
    /// A convex polygon yields itself; circles yield nothing.
    pub fn convex_polygons(&self) -> impl Iterator<Item = (Point, &[Vec2])> + '_ {
        let whole = (self.is_convex && self.world_circle().is_none())
            .then_some((self.pos, self.calc_points.as_slice()));
        whole.into_iter().chain(
            self.convex
                .iter()
                .map(move |piece| (self.pos, piece.calc_points.as_slice())),
        )
    }

    /// The whole body as one convex shape (meaningful when [`is_convex`](Self::is_convex)).
    pub(crate) fn as_convex(&self) -> ConvexShape<'_> {
        match self.world_circle() {
            Some(c) => ConvexShape::Circle(c),
            None => ConvexShape::Polygon {
                pos: self.pos,
                points: &self.calc_points,
            },
        }
    }

    /// Convex parts to test pairwise: the body itself when convex, else its pieces.
    pub(crate) fn convex_parts(&self) -> impl Iterator<Item = ConvexShape<'_>> + '_ {
        let whole = self.is_convex.then(|| self.as_convex());
        whole.into_iter().chain(
            self.convex
                .iter()
                .map(move |piece| ConvexShape::Polygon {
                    pos: self.pos,
                    points: &piece.calc_points,
                }),
        )
    }

    // --- transforms ---

    /// Teleport to `pos`.
    pub fn set_position(&mut self, pos: Point) {
        self.pos = pos;
        self.update_bbox();
        self.dirty = true;
    }

    /// Move by `speed` along the current angle.
    pub fn move_forward(&mut self, speed: f64) {
        if speed == 0.0 {
            return;
        }
        self.set_position(self.pos + Vec2::from_angle(self.angle) * speed);
    }

    /// Set the rotation, in radians. Cached convex pieces follow without being recomputed.
    pub fn set_angle(&mut self, angle: f64) {
        self.angle = angle;
        self.recalc();
        self.dirty = true;
    }

    /// Set the offset applied before rotation.
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.recalc();
        self.dirty = true;
    }

    /// Scale the outline relative to its unscaled points. Circles use `x` only.
    pub fn set_scale(&mut self, x: f64, y: f64) {
        self.scale = Vec2::new(x.abs(), y.abs());
        if self.world_circle().is_none() {
            self.points = self.scaled_backup();
            self.update_convex();
        }
        self.recalc();
        self.dirty = true;
    }

    /// Replace the outline. The points are taken as unscaled; the current scale applies.
    pub fn set_points(&mut self, points: &[Vec2]) -> Result<(), BodyError> {
        match self.shape {
            Shape::Circle { .. } => {
                return Err(BodyError::Unsupported {
                    body_type: BodyType::Circle,
                    operation: "set_points",
                });
            }
            Shape::Line => {
                if points.len() != 2 || points[0] == points[1] {
                    let first = points.first().copied().unwrap_or(Vec2::ZERO);
                    let last = points.last().copied().unwrap_or(Vec2::ZERO);
                    return Err(BodyError::DegenerateLine {
                        start: self.pos + first,
                        end: self.pos + last,
                    });
                }
                self.replace_points(points.to_vec());
                return Ok(());
            }
            _ => {}
        }
        if points.is_empty() {
            return Err(BodyError::NoPoints);
        }
        let mut pts = points.to_vec();
        ensure_ccw(&mut pts);
        self.replace_points(pts);
        Ok(())
    }

    /// Recenter the outline on its centroid, or put the first point back on the origin.
    ///
    /// Circles and ellipses are always centered and ignore this.
    pub fn set_centered(&mut self, center: bool) {
        if matches!(self.shape, Shape::Circle { .. } | Shape::Ellipse { .. }) {
            return;
        }
        if self.centered == center {
            return;
        }
        let shift = if center {
            -self.run_without_rotation(|b| b.centroid())
        } else {
            -self.points[0]
        };
        self.shift_points(shift);
        self.centered = center;
    }

    /// Run `f` with the rotation temporarily set to zero, then restore it.
    pub fn run_without_rotation<R>(&mut self, f: impl FnOnce(&mut Self) -> R) -> R {
        let angle = self.angle;
        self.angle = 0.0;
        self.recalc();
        let out = f(self);
        self.angle = angle;
        self.recalc();
        out
    }

    /// Bake a rotation into the outline (the body angle is unchanged).
    pub fn rotate(&mut self, angle: f64) {
        if self.world_circle().is_some() {
            self.offset = rotate(self.offset, angle);
        } else {
            for p in &mut self.points {
                *p = rotate(*p, angle);
            }
            self.rebase_backup();
            self.update_convex();
        }
        self.recalc();
        self.dirty = true;
    }

    /// Bake a translation into the outline (the body position is unchanged).
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if self.world_circle().is_some() {
            self.offset += Vec2::new(dx, dy);
            self.recalc();
            self.dirty = true;
        } else {
            self.shift_points(Vec2::new(dx, dy));
        }
    }

    // --- shape-specific setters ---

    /// Resize a box, keeping it centered if it was.
    pub fn set_box_size(&mut self, width: f64, height: f64) -> Result<(), BodyError> {
        let Shape::Box { .. } = self.shape else {
            return Err(self.unsupported("set_box_size"));
        };
        self.shape = Shape::Box { width, height };
        let centered = self.centered;
        self.centered = false;
        self.replace_points(box_points(width, height));
        if centered {
            self.set_centered(true);
        }
        Ok(())
    }

    /// Width and height of a box body, before scaling.
    pub fn box_size(&self) -> Option<(f64, f64)> {
        match self.shape {
            Shape::Box { width, height } => Some((width, height)),
            _ => None,
        }
    }

    /// Change the radius of a circle body (before scaling).
    pub fn set_radius(&mut self, radius: f64) -> Result<(), BodyError> {
        let Shape::Circle { .. } = self.shape else {
            return Err(self.unsupported("set_radius"));
        };
        self.shape = Shape::Circle {
            radius: radius.abs(),
        };
        self.recalc();
        self.dirty = true;
        Ok(())
    }

    /// Change the horizontal radius of an ellipse.
    pub fn set_radius_x(&mut self, radius_x: f64) -> Result<(), BodyError> {
        self.reshape_ellipse("set_radius_x", |rx, _, _| *rx = radius_x)
    }

    /// Change the vertical radius of an ellipse.
    pub fn set_radius_y(&mut self, radius_y: f64) -> Result<(), BodyError> {
        self.reshape_ellipse("set_radius_y", |_, ry, _| *ry = radius_y)
    }

    /// Change the outline length per vertex of an ellipse.
    pub fn set_step(&mut self, step: f64) -> Result<(), BodyError> {
        self.reshape_ellipse("set_step", |_, _, s| *s = step)
    }

    fn reshape_ellipse(
        &mut self,
        operation: &'static str,
        edit: impl FnOnce(&mut f64, &mut f64, &mut f64),
    ) -> Result<(), BodyError> {
        let Shape::Ellipse {
            mut radius_x,
            mut radius_y,
            mut step,
        } = self.shape
        else {
            return Err(self.unsupported(operation));
        };
        edit(&mut radius_x, &mut radius_y, &mut step);
        self.shape = Shape::Ellipse {
            radius_x,
            radius_y,
            step,
        };
        self.replace_points(ellipse_points(radius_x, radius_y, step));
        Ok(())
    }

    /// World start of a line body.
    pub fn start(&self) -> Option<Point> {
        self.line_segment().map(|l| l.p0)
    }

    /// World end of a line body.
    pub fn end(&self) -> Option<Point> {
        self.line_segment().map(|l| l.p1)
    }

    /// Move a line so that it starts at `start`, keeping its direction and length.
    pub fn set_start(&mut self, start: Point) -> Result<(), BodyError> {
        let Some(current) = self.start() else {
            return Err(self.unsupported("set_start"));
        };
        self.set_position(self.pos + (start - current));
        Ok(())
    }

    /// Re-aim a line so that it ends exactly at `end`.
    pub fn set_end(&mut self, end: Point) -> Result<(), BodyError> {
        let Some(start) = self.start() else {
            return Err(self.unsupported("set_end"));
        };
        if !end.is_finite() || end == start {
            return Err(BodyError::DegenerateLine { start, end });
        }
        self.points[1] = rotate(end - self.pos, -self.angle) - self.offset;
        self.rebase_backup();
        self.recalc();
        self.dirty = true;
        Ok(())
    }

    // --- metadata ---

    /// Set whether the body is static.
    pub fn set_static(&mut self, is_static: bool) {
        self.is_static = is_static;
    }

    /// Set whether the body is a trigger.
    pub fn set_trigger(&mut self, is_trigger: bool) {
        self.is_trigger = is_trigger;
    }

    /// Change the indexing margin; the body is re-indexed on its next update.
    pub fn set_padding(&mut self, padding: f64) {
        self.padding = padding.max(0.0);
        self.padding_changed = true;
        self.dirty = true;
    }

    /// Change the interaction group.
    pub fn set_group(&mut self, group: Group) {
        self.group = group;
    }

    /// Replace the caller payload.
    pub fn set_user_data(&mut self, user_data: u128) {
        self.user_data = user_data;
    }

    // --- internals ---

    fn unsupported(&self, operation: &'static str) -> BodyError {
        BodyError::Unsupported {
            body_type: self.body_type(),
            operation,
        }
    }

    fn scaled_backup(&self) -> Vec<Vec2> {
        self.points_backup
            .iter()
            .map(|p| Vec2::new(p.x * self.scale.x, p.y * self.scale.y))
            .collect()
    }

    /// Recompute the unscaled backup from the current (scaled) points.
    fn rebase_backup(&mut self) {
        let unscale = |v: f64, s: f64| if s == 0.0 { v } else { v / s };
        self.points_backup = self
            .points
            .iter()
            .map(|p| Vec2::new(unscale(p.x, self.scale.x), unscale(p.y, self.scale.y)))
            .collect();
    }

    fn replace_points(&mut self, unscaled: Vec<Vec2>) {
        self.points_backup = unscaled;
        self.points = self.scaled_backup();
        self.update_convex();
        self.recalc();
        self.dirty = true;
    }

    fn shift_points(&mut self, shift: Vec2) {
        for p in &mut self.points {
            *p += shift;
        }
        self.rebase_backup();
        self.update_convex();
        self.recalc();
        self.dirty = true;
    }

    /// Re-run decomposition for polygons whose outline changed.
    fn update_convex(&mut self) {
        self.convex.clear();
        self.is_convex = true;
        if self.shape != Shape::Polygon || self.points.len() < 4 {
            return;
        }
        let pieces = decomp::quick_decomp(&self.points);
        if pieces.is_empty() {
            log::debug!(
                "convex decomposition of {} points gave no pieces; treating body as convex",
                self.points.len()
            );
            return;
        }
        if pieces.len() == 1 {
            return;
        }
        self.is_convex = false;
        self.convex = pieces
            .into_iter()
            .map(|mut points| {
                ensure_ccw(&mut points);
                ConvexPiece {
                    points,
                    calc_points: Vec::new(),
                }
            })
            .collect();
    }

    /// Recompute calc points (body and pieces) and the tight box.
    fn recalc(&mut self) {
        let (offset, angle) = (self.offset, self.angle);
        self.calc_points.clear();
        self.calc_points
            .extend(self.points.iter().map(|p| rotate(*p + offset, angle)));
        for piece in &mut self.convex {
            piece.calc_points.clear();
            piece
                .calc_points
                .extend(piece.points.iter().map(|p| rotate(*p + offset, angle)));
        }
        self.update_bbox();
    }

    fn update_bbox(&mut self) {
        if let Some(c) = self.world_circle() {
            self.bbox = Rect::new(
                c.center.x - c.radius,
                c.center.y - c.radius,
                c.center.x + c.radius,
                c.center.y + c.radius,
            );
            return;
        }
        let (min, max) = self.calc_points.iter().fold(
            (
                Vec2::new(f64::INFINITY, f64::INFINITY),
                Vec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY),
            ),
            |(lo, hi), p| {
                (
                    Vec2::new(lo.x.min(p.x), lo.y.min(p.y)),
                    Vec2::new(hi.x.max(p.x), hi.y.max(p.y)),
                )
            },
        );
        self.bbox = Rect::from_points(self.pos + min, self.pos + max);
    }

    /// Padded box the index should hold for the current tight box.
    pub(crate) fn wanted_padded(&self) -> Rect {
        self.bbox.inflate(self.padding, self.padding)
    }

    /// Whether the index entry must move: the tight box left the padded one,
    /// or the padding itself changed.
    pub(crate) fn needs_reindex(&self) -> bool {
        self.padding_changed || !crate::math::rect_contains(self.padded, self.bbox)
    }

    pub(crate) fn mark_indexed(&mut self, padded: Rect) {
        self.padded = padded;
        self.padding_changed = false;
        self.dirty = false;
    }

    pub(crate) fn mark_clean(&mut self) {
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn l_shape() -> Vec<Vec2> {
        [
            (0.0, 0.0),
            (4.0, 0.0),
            (4.0, 1.0),
            (1.0, 1.0),
            (1.0, 4.0),
            (0.0, 4.0),
        ]
        .iter()
        .map(|&(x, y)| Vec2::new(x, y))
        .collect()
    }

    fn opts() -> BodyOptions {
        BodyOptions::default()
    }

    #[test]
    fn empty_polygon_is_rejected() {
        assert_eq!(
            Body::polygon(Point::ORIGIN, &[], &opts()).unwrap_err(),
            BodyError::NoPoints
        );
    }

    #[test]
    fn degenerate_line_is_rejected() {
        let p = Point::new(1.0, 1.0);
        assert!(matches!(
            Body::line(p, p, &opts()),
            Err(BodyError::DegenerateLine { .. })
        ));
        assert!(Body::line(p, Point::new(f64::NAN, 0.0), &opts()).is_err());
    }

    #[test]
    fn scale_round_trip_is_exact() {
        let pts = vec![
            Vec2::new(0.1, 0.3),
            Vec2::new(1.7, 0.2),
            Vec2::new(1.3, 2.9),
        ];
        let mut b = Body::polygon(Point::new(3.0, 4.0), &pts, &opts()).unwrap();
        let before = b.points().to_vec();
        b.set_scale(2.0, 2.0);
        assert_abs_diff_eq!(b.points()[1].x, 3.4);
        b.set_scale(1.0, 1.0);
        assert_eq!(b.points(), before.as_slice());
        for _ in 0..10 {
            b.set_scale(1.1, 0.7);
        }
        b.set_scale(1.0, 1.0);
        assert_eq!(b.points(), before.as_slice());
    }

    #[test]
    fn convex_bodies_have_no_pieces() {
        let square = Body::rectangle(Point::ORIGIN, 2.0, 2.0, &opts());
        assert!(square.is_convex() && square.convex_pieces().is_empty());
        let e = Body::ellipse(Point::ORIGIN, 5.0, 3.0, None, &opts());
        assert!(e.is_convex() && e.convex_pieces().is_empty());
        let tri = Body::polygon(
            Point::ORIGIN,
            &[Vec2::ZERO, Vec2::new(1.0, 0.0), Vec2::new(0.0, 1.0)],
            &opts(),
        )
        .unwrap();
        assert!(tri.is_convex() && tri.convex_pieces().is_empty());
    }

    #[test]
    fn non_convex_pieces_preserve_area() {
        let b = Body::polygon(Point::new(10.0, -3.0), &l_shape(), &opts()).unwrap();
        assert!(!b.is_convex());
        assert_eq!(b.convex_pieces().len(), 2);
        let total: f64 = b
            .convex_pieces()
            .iter()
            .map(|p| decomp::signed_area(p.points()))
            .sum();
        assert_abs_diff_eq!(total, 7.0, epsilon = 1e-9);
        assert_abs_diff_eq!(total, decomp::signed_area(b.points()), epsilon = 1e-9);
    }

    #[test]
    fn rotation_moves_pieces_without_redecomposing() {
        let mut b = Body::polygon(Point::ORIGIN, &l_shape(), &opts()).unwrap();
        let local: Vec<Vec<Vec2>> = b.convex_pieces().iter().map(|p| p.points().to_vec()).collect();
        b.set_angle(PI / 2.0);
        let after: Vec<Vec<Vec2>> = b.convex_pieces().iter().map(|p| p.points().to_vec()).collect();
        assert_eq!(local, after);
        // (4, 0) rotated a quarter turn lands on (0, 4).
        let rotated = b.convex_pieces()[0].calc_points()[1];
        assert_abs_diff_eq!(rotated.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rotated.y, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.bbox().x0, -4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.bbox().y1, 4.0, epsilon = 1e-12);
    }

    #[test]
    fn centering_moves_centroid_to_origin() {
        let mut b = Body::rectangle(Point::new(5.0, 5.0), 4.0, 2.0, &opts());
        b.set_angle(0.3);
        b.set_centered(true);
        assert!(b.is_centered());
        assert_eq!(b.points()[0], Vec2::new(-2.0, -1.0));
        let c = b.run_without_rotation(|b| b.centroid());
        assert_abs_diff_eq!(c.x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(c.y, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.angle(), 0.3);
        b.set_centered(false);
        assert_eq!(b.points()[0], Vec2::ZERO);
    }

    #[test]
    fn centered_box_stays_centered_on_resize() {
        let o = opts().with_centered(true);
        let mut b = Body::rectangle(Point::ORIGIN, 2.0, 2.0, &o);
        b.set_box_size(6.0, 4.0).unwrap();
        assert_eq!(b.box_size(), Some((6.0, 4.0)));
        assert_eq!(b.bbox(), Rect::new(-3.0, -2.0, 3.0, 2.0));
        assert!(b.set_radius(1.0).is_err());
    }

    #[test]
    fn line_end_is_exact_under_rotation_and_offset() {
        let mut line = Body::line(Point::new(1.0, 1.0), Point::new(4.0, 5.0), &opts()).unwrap();
        assert_eq!(line.end(), Some(Point::new(4.0, 5.0)));
        line.set_angle(0.7);
        line.set_offset(Vec2::new(0.25, -0.5));
        let target = Point::new(-3.0, 8.0);
        line.set_end(target).unwrap();
        let end = line.end().unwrap();
        assert_abs_diff_eq!(end.x, target.x, epsilon = 1e-12);
        assert_abs_diff_eq!(end.y, target.y, epsilon = 1e-12);
        let start = line.start().unwrap();
        assert!(line.set_end(start).is_err());

        line.set_start(Point::new(10.0, 10.0)).unwrap();
        let moved = line.start().unwrap();
        assert_abs_diff_eq!(moved.x, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(moved.y, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn circle_geometry() {
        let mut c = Body::circle(Point::new(2.0, 3.0), 1.5, &opts());
        assert_eq!(c.bbox(), Rect::new(0.5, 1.5, 3.5, 4.5));
        c.set_scale(2.0, 7.0);
        assert_eq!(c.radius(), Some(3.0));
        c.set_offset(Vec2::new(1.0, 0.0));
        c.set_angle(PI);
        let center = c.world_circle().unwrap().center;
        assert_abs_diff_eq!(center.x, 1.0, epsilon = 1e-12);
        assert!(c.set_points(&[Vec2::ZERO]).is_err());
        c.set_centered(true);
        assert!(!c.is_centered());
    }

    #[test]
    fn options_are_applied() {
        let o = BodyOptions::default()
            .with_static(true)
            .with_trigger(true)
            .with_padding(2.0)
            .with_group(Group::new(1, 1))
            .with_user_data(42)
            .with_angle(PI);
        let b = Body::rectangle(Point::ORIGIN, 1.0, 1.0, &o);
        assert!(b.is_static() && b.is_trigger());
        assert_eq!(b.padding(), 2.0);
        assert_eq!(b.group(), Group::new(1, 1));
        assert_eq!(b.user_data(), 42);
        assert_abs_diff_eq!(b.bbox().x0, -1.0, epsilon = 1e-12);
        assert!(!b.is_dirty());
        assert_abs_diff_eq!(b.padded_bbox().x0, -3.0, epsilon = 1e-12);
    }

    #[test]
    fn point_and_ellipse_shapes() {
        let p = Body::point(Point::new(1.0, 1.0), &opts());
        assert_eq!(p.body_type(), BodyType::Point);
        assert_abs_diff_eq!(p.bbox().width(), POINT_SIZE, epsilon = 1e-12);
        let mut e = Body::ellipse(Point::ORIGIN, 30.0, 40.0, Some(10.0), &opts());
        assert_eq!(e.points().len(), 32);
        assert!(e.is_centered());
        e.set_step(100.0).unwrap();
        assert_eq!(e.points().len(), 8);
        e.set_radius_x(10.0).unwrap();
        assert_abs_diff_eq!(e.bbox().x1, 10.0, epsilon = 1e-12);
        assert!(e.set_box_size(1.0, 1.0).is_err());
    }

    #[test]
    fn move_forward_follows_angle() {
        let mut b = Body::point(Point::ORIGIN, &opts());
        b.set_angle(PI / 2.0);
        b.move_forward(3.0);
        assert_abs_diff_eq!(b.pos().x, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(b.pos().y, 3.0, epsilon = 1e-12);
        assert!(b.is_dirty());
    }

    #[test]
    fn clockwise_input_is_reversed_and_simple() {
        let mut pts = l_shape();
        pts.reverse();
        let b = Body::polygon(Point::ORIGIN, &pts, &opts()).unwrap();
        assert_eq!(b.points(), l_shape().as_slice());
        assert!(b.is_simple());
        let bowtie = Body::polygon(
            Point::ORIGIN,
            &[
                Vec2::new(0.0, 0.0),
                Vec2::new(2.0, 2.0),
                Vec2::new(2.0, 0.0),
                Vec2::new(0.0, 2.0),
            ],
            &opts(),
        )
        .unwrap();
        assert!(!bowtie.is_simple());
    }

    #[test]
    fn baked_transforms_keep_backup_consistent() {
        let mut b = Body::rectangle(Point::ORIGIN, 2.0, 1.0, &opts());
        b.set_scale(2.0, 2.0);
        b.translate(1.0, 0.0);
        assert_eq!(b.points()[0], Vec2::new(1.0, 0.0));
        b.set_scale(1.0, 1.0);
        assert_eq!(b.points()[0], Vec2::new(0.5, 0.0));
        b.rotate(PI);
        assert_abs_diff_eq!(b.points()[0].x, -0.5, epsilon = 1e-12);
    }
}
