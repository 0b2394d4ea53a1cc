// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlap: 2D collision detection for games and interactive tools.
//!
//! - [`Body`]: circles, boxes, polygons (convex or not), ellipses, lines, and points,
//!   all sharing a position, rotation, scale, offset, padding, and [`Group`].
//! - [`System`]: owns bodies, keeps them in an R-tree keyed by padded bounding
//!   boxes, and answers collision, separation, and raycast queries.
//! - [`sat`]: separating-axis tests for convex shapes.
//! - [`decomp`]: convex decomposition of simple polygons.
//! - [`intersect`]: closed-form segment, circle, and polygon intersections.
//!
//! Non-convex polygons are split into convex pieces once, when their outline
//! changes. A collision between two bodies sums the overlap of every colliding
//! piece pair.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Point;
//! use overlap::{BodyOptions, System};
//!
//! let mut system = System::new();
//! let wall = system.create_box(
//!     Point::new(10.0, 0.0),
//!     10.0,
//!     10.0,
//!     &BodyOptions::default().with_static(true),
//! );
//! let ball = system.create_circle(Point::new(8.0, 5.0), 3.0, &BodyOptions::default());
//!
//! let mut hits = Vec::new();
//! system.check_one(ball, |r| {
//!     hits.push(r.b);
//!     false
//! });
//! assert_eq!(hits, vec![wall]);
//!
//! // Push the ball out of the wall.
//! system.separate_body(ball, |_| true);
//! assert!(system.check_collision(ball, wall).is_none_or(|r| r.overlap < 1e-9));
//! ```
//!
//! Nothing here logs through a concrete backend; diagnostics go through the
//! [`log`] facade at `trace` and `debug` levels.

pub mod body;
pub mod decomp;
pub mod draw;
pub mod error;
pub mod group;
pub mod intersect;
pub mod math;
pub mod options;
pub mod response;
pub mod sat;
pub mod system;
pub mod types;

pub use body::{Body, ConvexPiece, POINT_SIZE, Shape};
pub use draw::DebugDraw;
pub use error::BodyError;
pub use group::Group;
pub use math::{
    EPSILON, almost_equal, bounce_direction, deg_to_rad, distance, points_equal, rad_to_deg,
};
pub use options::BodyOptions;
pub use response::{RaycastHit, Response};
pub use system::System;
pub use types::{BodyGroup, BodyId, BodyType, ShapeClass};
