// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The collision system: body storage, broad phase, and narrow phase.
//!
//! A [`System`] owns its bodies. Each body has one entry in an R-tree keyed by
//! its padded bounding box. Queries search the tree, filter candidates by
//! [`Group`](crate::Group), and then run separating-axis tests, pairwise over
//! convex pieces for non-convex polygons.

use kurbo::{Line, Point, Rect, Vec2};
use overlap_index::{Aabb2D, Damage, Index, IndexGeneric, Key, RTreeF64};

use crate::body::Body;
use crate::draw::{self, DebugDraw};
use crate::error::BodyError;
use crate::intersect::{
    body_in_body, intersect_circle_circle, intersect_line_circle, intersect_line_line,
    intersect_line_polygon,
};
use crate::math::{distance, normalize_or_zero, points_equal, rects_overlap};
use crate::options::BodyOptions;
use crate::response::{RaycastHit, Response};
use crate::sat;
use crate::types::BodyId;

type BodyIndex = IndexGeneric<f64, BodyId, RTreeF64<BodyId>>;

fn to_aabb(r: Rect) -> Aabb2D<f64> {
    Aabb2D::new(r.x0, r.y0, r.x1, r.y1)
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug)]
struct Entry {
    body: Body,
    key: Key,
}

/// A set of bodies with a shared spatial index.
///
/// ```
/// use kurbo::Point;
/// use overlap::{BodyOptions, System};
///
/// let mut system = System::new();
/// let a = system.create_circle(Point::new(0.0, 0.0), 10.0, &BodyOptions::default());
/// let b = system.create_circle(Point::new(15.0, 0.0), 10.0, &BodyOptions::default());
/// let hit = system.check_collision(a, b).unwrap();
/// assert!((hit.overlap - 5.0).abs() < 1e-9);
/// ```
#[derive(Debug)]
pub struct System {
    slots: Vec<Slot>,
    free_list: Vec<usize>,
    len: usize,
    index: BodyIndex,
    ray: Option<Body>,
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}

impl System {
    /// Create an empty system.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            index: Index::<f64, BodyId>::with_rtree(),
            ray: None,
        }
    }

    /// Number of bodies.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the system holds no bodies.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    // --- lifecycle ---

    /// Take ownership of `body` and index it by its padded box.
    pub fn insert(&mut self, mut body: Body) -> BodyId {
        let padded = body.wanted_padded();
        let (idx, generation) = if let Some(idx) = self.free_list.pop() {
            let slot = &mut self.slots[idx];
            slot.generation = slot.generation.wrapping_add(1).max(1);
            (idx, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 1,
                entry: None,
            });
            (self.slots.len() - 1, 1)
        };
        #[allow(
            clippy::cast_possible_truncation,
            reason = "Slot counts stay far below u32::MAX."
        )]
        let id = BodyId::new(idx as u32, generation);
        let key = self.index.insert(to_aabb(padded), id);
        body.mark_indexed(padded);
        self.slots[idx].entry = Some(Entry { body, key });
        self.len += 1;
        id
    }

    /// Remove a body and hand it back. Stale ids give `None`.
    pub fn remove(&mut self, id: BodyId) -> Option<Body> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        let entry = slot.entry.take()?;
        self.free_list.push(id.idx());
        self.len -= 1;
        self.index.remove(entry.key);
        log::debug!("removed body {id:?}");
        Some(entry.body)
    }

    /// Move a body into `other`, returning its id there.
    ///
    /// The body leaves this system's index before it enters the other one.
    pub fn transfer(&mut self, id: BodyId, other: &mut Self) -> Option<BodyId> {
        let body = self.remove(id)?;
        let new_id = other.insert(body);
        log::debug!("transferred body {id:?} to {new_id:?}");
        Some(new_id)
    }

    /// Whether `id` refers to a live body.
    pub fn contains(&self, id: BodyId) -> bool {
        self.entry(id).is_some()
    }

    /// Borrow a body.
    pub fn get(&self, id: BodyId) -> Option<&Body> {
        self.entry(id).map(|e| &e.body)
    }

    /// Borrow a body for deferred edits; [`update`](Self::update) re-indexes it.
    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.entry_mut(id).map(|e| &mut e.body)
    }

    /// Iterate over every body.
    pub fn iter(&self) -> impl Iterator<Item = (BodyId, &Body)> + '_ {
        self.slots.iter().enumerate().filter_map(|(i, s)| {
            #[allow(
                clippy::cast_possible_truncation,
                reason = "Slot counts stay far below u32::MAX."
            )]
            let id = BodyId::new(i as u32, s.generation);
            s.entry.as_ref().map(|e| (id, &e.body))
        })
    }

    /// Ids of every body.
    pub fn ids(&self) -> Vec<BodyId> {
        self.iter().map(|(id, _)| id).collect()
    }

    /// Reconcile one body with the index.
    ///
    /// Nothing in the tree changes while the tight box stays inside the padded
    /// box last stored. Returns `false` for stale ids.
    pub fn update_body(&mut self, id: BodyId) -> bool {
        let Some(idx) = self.entry_index(id) else {
            return false;
        };
        let Some(entry) = self.slots[idx].entry.as_mut() else {
            return false;
        };
        if !entry.body.needs_reindex() {
            log::trace!("body {id:?} still inside its padding; index untouched");
            entry.body.mark_clean();
            return true;
        }
        let padded = entry.body.wanted_padded();
        self.index.update(entry.key, to_aabb(padded));
        entry.body.mark_indexed(padded);
        log::trace!("re-indexed body {id:?} at {padded:?}");
        true
    }

    /// Reconcile every dirty body with the index.
    pub fn update(&mut self) {
        let dirty: Vec<BodyId> = self
            .iter()
            .filter(|(_, b)| b.is_dirty())
            .map(|(id, _)| id)
            .collect();
        for id in dirty {
            self.update_body(id);
        }
    }

    /// Drain the index mutations recorded since the last call.
    pub fn take_damage(&mut self) -> Damage<f64> {
        self.index.take_damage()
    }

    // --- factories ---

    /// Build and insert a point body.
    pub fn create_point(&mut self, pos: Point, opts: &BodyOptions) -> BodyId {
        self.insert(Body::point(pos, opts))
    }

    /// Build and insert a line body.
    pub fn create_line(
        &mut self,
        start: Point,
        end: Point,
        opts: &BodyOptions,
    ) -> Result<BodyId, BodyError> {
        Ok(self.insert(Body::line(start, end, opts)?))
    }

    /// Build and insert a circle body.
    pub fn create_circle(&mut self, pos: Point, radius: f64, opts: &BodyOptions) -> BodyId {
        self.insert(Body::circle(pos, radius, opts))
    }

    /// Build and insert a box body.
    pub fn create_box(
        &mut self,
        pos: Point,
        width: f64,
        height: f64,
        opts: &BodyOptions,
    ) -> BodyId {
        self.insert(Body::rectangle(pos, width, height, opts))
    }

    /// Build and insert an ellipse body.
    pub fn create_ellipse(
        &mut self,
        pos: Point,
        radius_x: f64,
        radius_y: f64,
        step: Option<f64>,
        opts: &BodyOptions,
    ) -> BodyId {
        self.insert(Body::ellipse(pos, radius_x, radius_y, step, opts))
    }

    /// Build and insert a polygon body.
    pub fn create_polygon(
        &mut self,
        pos: Point,
        points: &[Vec2],
        opts: &BodyOptions,
    ) -> Result<BodyId, BodyError> {
        Ok(self.insert(Body::polygon(pos, points, opts)?))
    }

    // --- mutators ---

    fn edit(&mut self, id: BodyId, update_now: bool, f: impl FnOnce(&mut Body)) -> bool {
        let Some(body) = self.body_mut(id) else {
            return false;
        };
        f(body);
        if update_now {
            self.update_body(id);
        }
        true
    }

    /// Teleport a body. Returns `false` for stale ids.
    pub fn set_position(&mut self, id: BodyId, pos: Point, update_now: bool) -> bool {
        self.edit(id, update_now, |b| b.set_position(pos))
    }

    /// Move a body by `delta`.
    pub fn move_body(&mut self, id: BodyId, delta: Vec2, update_now: bool) -> bool {
        self.edit(id, update_now, |b| b.set_position(b.pos() + delta))
    }

    /// Rotate a body to `angle` radians.
    pub fn set_angle(&mut self, id: BodyId, angle: f64, update_now: bool) -> bool {
        self.edit(id, update_now, |b| b.set_angle(angle))
    }

    /// Scale a body.
    pub fn set_scale(&mut self, id: BodyId, x: f64, y: f64, update_now: bool) -> bool {
        self.edit(id, update_now, |b| b.set_scale(x, y))
    }

    /// Change a body's offset.
    pub fn set_offset(&mut self, id: BodyId, offset: Vec2, update_now: bool) -> bool {
        self.edit(id, update_now, |b| b.set_offset(offset))
    }

    /// Replace a body's outline. `Ok(false)` for stale ids.
    pub fn set_points(
        &mut self,
        id: BodyId,
        points: &[Vec2],
        update_now: bool,
    ) -> Result<bool, BodyError> {
        let Some(body) = self.body_mut(id) else {
            return Ok(false);
        };
        body.set_points(points)?;
        if update_now {
            self.update_body(id);
        }
        Ok(true)
    }

    // --- queries ---

    /// Ids whose padded box intersects `area`.
    pub fn search(&self, area: Rect) -> Vec<BodyId> {
        self.index.query_rect(to_aabb(area)).map(|(_, id)| id).collect()
    }

    /// Ids whose padded box intersects the padded box of `id`, excluding `id`.
    pub fn potentials(&self, id: BodyId) -> Vec<BodyId> {
        let Some(body) = self.get(id) else {
            return Vec::new();
        };
        self.index
            .query_rect(to_aabb(body.padded_bbox()))
            .map(|(_, other)| other)
            .filter(|other| *other != id)
            .collect()
    }

    /// Narrow-phase test of two bodies.
    pub fn check_collision(&self, a: BodyId, b: BodyId) -> Option<Response> {
        collide(a, self.get(a)?, b, self.get(b)?)
    }

    /// Test `id` against every nearby body, calling `callback` for each collision.
    ///
    /// Stops and returns `true` as soon as the callback returns `true`. Static
    /// non-trigger bodies are never the checking side and return `false`.
    pub fn check_one(&self, id: BodyId, mut callback: impl FnMut(&Response) -> bool) -> bool {
        let Some(body) = self.get(id) else {
            return false;
        };
        if body.is_static() && !body.is_trigger() {
            return false;
        }
        for (_, other_id) in self.index.query_rect(to_aabb(body.padded_bbox())) {
            if other_id == id {
                continue;
            }
            let Some(other) = self.get(other_id) else {
                continue;
            };
            if let Some(response) = collide(id, body, other_id, other)
                && callback(&response)
            {
                return true;
            }
        }
        false
    }

    /// [`check_one`](Self::check_one) for every body found in `area`.
    pub fn check_area(&self, area: Rect, mut callback: impl FnMut(&Response) -> bool) -> bool {
        self.search(area)
            .into_iter()
            .any(|id| self.check_one(id, &mut callback))
    }

    /// [`check_one`](Self::check_one) for every body.
    pub fn check_all(&self, mut callback: impl FnMut(&Response) -> bool) -> bool {
        self.ids()
            .into_iter()
            .any(|id| self.check_one(id, &mut callback))
    }

    /// Push a body out of everything it overlaps in one combined step.
    ///
    /// Sums the overlap against every non-trigger counterpart for which
    /// `callback` returns `true`, then moves the body back by that sum. Static
    /// and trigger bodies never move. Returns whether the body moved.
    pub fn separate_body(&mut self, id: BodyId, mut callback: impl FnMut(&Response) -> bool) -> bool {
        let Some(body) = self.get(id) else {
            return false;
        };
        if body.is_static() && !body.is_trigger() {
            return false;
        }
        let is_trigger = body.is_trigger();
        let mut offset = Vec2::ZERO;
        self.check_one(id, |r| {
            let other_is_trigger = self.get(r.b).is_some_and(Body::is_trigger);
            if callback(r) && !is_trigger && !other_is_trigger {
                offset += r.overlap_v;
            }
            false
        });
        if offset == Vec2::ZERO {
            return false;
        }
        self.move_body(id, -offset, true)
    }

    /// [`separate_body`](Self::separate_body) for every body.
    pub fn separate(&mut self, mut callback: impl FnMut(&Response) -> bool) {
        for id in self.ids() {
            self.separate_body(id, &mut callback);
        }
    }

    /// Nearest body crossed by the segment `start → end`.
    ///
    /// `allow` filters candidates. A ray of zero length hits nothing.
    pub fn raycast(
        &mut self,
        start: Point,
        end: Point,
        mut allow: impl FnMut(BodyId, &Body) -> bool,
    ) -> Option<RaycastHit> {
        let ray = match self.ray.take() {
            Some(mut ray) => {
                let placed = ray.set_start(start).and_then(|()| ray.set_end(end));
                if placed.is_err() {
                    self.ray = Some(ray);
                    return None;
                }
                ray
            }
            None => Body::line(start, end, &BodyOptions::default().with_trigger(true)).ok()?,
        };
        let ray_id = self.insert(ray);
        let segment = Line::new(start, end);
        let mut nearest = f64::INFINITY;
        let mut hit = None;
        self.check_one(ray_id, |r| {
            let Some(body) = self.get(r.b) else {
                return false;
            };
            if !allow(r.b, body) {
                return false;
            }
            let points = match body.world_circle() {
                Some(c) => intersect_line_circle(segment, c),
                None => {
                    let outline: Vec<Point> = body.world_points().collect();
                    intersect_line_polygon(segment, &outline)
                }
            };
            for point in points {
                let d = distance(start, point);
                if d < nearest {
                    nearest = d;
                    hit = Some(RaycastHit { point, body: r.b });
                }
            }
            false
        });
        self.ray = self.remove(ray_id);
        hit
    }

    /// World points where the outlines of `a` and `b` cross.
    pub fn collision_points(&self, a: BodyId, b: BodyId) -> Vec<Point> {
        let (Some(a), Some(b)) = (self.get(a), self.get(b)) else {
            return Vec::new();
        };
        let edges = |body: &Body| -> Vec<Line> {
            (0..body.calc_points().len())
                .filter_map(|i| body.edge(i))
                .collect()
        };
        let mut points = Vec::new();
        match (a.world_circle(), b.world_circle()) {
            (Some(ca), Some(cb)) => points.extend(intersect_circle_circle(ca, cb)),
            (Some(c), None) => {
                for e in edges(b) {
                    points.extend(intersect_line_circle(e, c));
                }
            }
            (None, Some(c)) => {
                for e in edges(a) {
                    points.extend(intersect_line_circle(e, c));
                }
            }
            (None, None) => {
                let edges_b = edges(b);
                for ea in edges(a) {
                    points.extend(edges_b.iter().filter_map(|eb| intersect_line_line(ea, *eb)));
                }
            }
        }
        let mut unique: Vec<Point> = Vec::with_capacity(points.len());
        for p in points {
            if !unique.iter().any(|q| points_equal(*q, p)) {
                unique.push(p);
            }
        }
        unique
    }

    // --- debug drawing ---

    /// Outline every body.
    pub fn draw(&self, sink: &mut impl DebugDraw) {
        for (_, body) in self.iter() {
            draw::draw_body(sink, body);
        }
    }

    /// Outline every index node and every body's padded box.
    pub fn draw_bvh(&self, sink: &mut impl DebugDraw) {
        self.index.visit_nodes(|aabb, _depth| {
            let rect = Rect::new(aabb.min_x, aabb.min_y, aabb.max_x, aabb.max_y);
            draw::draw_rect(sink, rect, false);
        });
        for (_, body) in self.iter() {
            draw::draw_rect(sink, body.padded_bbox(), body.is_trigger());
        }
    }

    // --- internals ---

    fn entry_index(&self, id: BodyId) -> Option<usize> {
        let s = self.slots.get(id.idx())?;
        (s.generation == id.1 && s.entry.is_some()).then_some(id.idx())
    }

    fn entry(&self, id: BodyId) -> Option<&Entry> {
        let s = self.slots.get(id.idx())?;
        if s.generation != id.1 {
            return None;
        }
        s.entry.as_ref()
    }

    fn entry_mut(&mut self, id: BodyId) -> Option<&mut Entry> {
        let s = self.slots.get_mut(id.idx())?;
        if s.generation != id.1 {
            return None;
        }
        s.entry.as_mut()
    }
}

/// Group filter, tight-box reject, then SAT over whole bodies or convex pieces.
fn collide(a_id: BodyId, a: &Body, b_id: BodyId, b: &Body) -> Option<Response> {
    if !a.group().can_interact(b.group()) {
        return None;
    }
    if (a.padding() > 0.0 || b.padding() > 0.0) && !rects_overlap(a.bbox(), b.bbox()) {
        return None;
    }
    if a.is_convex() && b.is_convex() {
        let contact = sat::test(&a.as_convex(), &b.as_convex())?;
        return Some(Response::from_contact(a_id, b_id, contact));
    }
    let mut collided = false;
    let mut sum = Vec2::ZERO;
    for pa in a.convex_parts() {
        for pb in b.convex_parts() {
            if let Some(contact) = sat::test(&pa, &pb) {
                collided = true;
                sum += contact.overlap_v;
            }
        }
    }
    if !collided {
        return None;
    }
    Some(Response {
        a: a_id,
        b: b_id,
        overlap: sum.hypot(),
        overlap_n: normalize_or_zero(sum),
        overlap_v: sum,
        a_in_b: body_in_body(a, b),
        b_in_a: body_in_body(b, a),
    })
}
