// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Construction errors.

use kurbo::Point;

use crate::types::BodyType;

/// Errors raised when a body is built or reshaped from invalid geometry.
///
/// These are caller mistakes and are reported where the shape is built, never
/// later during insertion or collision checks.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
#[non_exhaustive]
pub enum BodyError {
    /// A polygon-family shape was given an empty point list.
    #[error("no points in polygon")]
    NoPoints,
    /// A line whose end point coincides with its start or is not finite.
    #[error("degenerate line from {start:?} to {end:?}")]
    DegenerateLine {
        /// Requested start point.
        start: Point,
        /// Requested end point.
        end: Point,
    },
    /// The operation does not apply to this kind of body.
    #[error("{operation} is not supported for {body_type:?} bodies")]
    Unsupported {
        /// Kind of the body the operation was attempted on.
        body_type: BodyType,
        /// Name of the rejected operation.
        operation: &'static str,
    },
}
