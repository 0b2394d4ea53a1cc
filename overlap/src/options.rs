// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-body construction options.

use crate::group::Group;

/// Options applied when a body is built.
///
/// ```
/// use overlap::{BodyOptions, Group};
///
/// let opts = BodyOptions::default()
///     .with_static(true)
///     .with_padding(4.0)
///     .with_group(Group::new(1, 2));
/// assert!(opts.is_static && !opts.is_trigger);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BodyOptions {
    /// The body is never displaced by separation.
    pub is_static: bool,
    /// The body is reported by queries but never pushes or gets pushed.
    pub is_trigger: bool,
    /// Margin added around the tight bounding box before indexing.
    pub padding: f64,
    /// Interaction group.
    pub group: Group,
    /// Opaque caller payload, copied into the body and never read by the engine.
    ///
    /// Bodies are owned by a [`System`](crate::System), so references back into
    /// caller state are stored as handles: an entity id, an index into the
    /// caller's own table, or a packed `(index, generation)` pair.
    ///
    /// ```
    /// use kurbo::Point;
    /// use overlap::{BodyOptions, System};
    ///
    /// fn pack(index: u64, generation: u64) -> u128 {
    ///     (u128::from(generation) << 64) | u128::from(index)
    /// }
    ///
    /// let mut system = System::new();
    /// let opts = BodyOptions::default().with_user_data(pack(7, 3));
    /// let id = system.create_circle(Point::ORIGIN, 1.0, &opts);
    /// let data = system.get(id).map(|b| b.user_data()).unwrap_or_default();
    /// assert_eq!(data as u64, 7);
    /// assert_eq!((data >> 64) as u64, 3);
    /// ```
    pub user_data: u128,
    /// Recenter the points around their centroid (ignored by circles and ellipses).
    pub is_centered: bool,
    /// Initial rotation in radians.
    pub angle: f64,
}

impl Default for BodyOptions {
    fn default() -> Self {
        Self {
            is_static: false,
            is_trigger: false,
            padding: 0.0,
            group: Group::ALL,
            user_data: 0,
            is_centered: false,
            angle: 0.0,
        }
    }
}

impl BodyOptions {
    /// Set [`is_static`](Self::is_static).
    pub fn with_static(mut self, is_static: bool) -> Self {
        self.is_static = is_static;
        self
    }

    /// Set [`is_trigger`](Self::is_trigger).
    pub fn with_trigger(mut self, is_trigger: bool) -> Self {
        self.is_trigger = is_trigger;
        self
    }

    /// Set [`padding`](Self::padding). Negative values are treated as zero.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding.max(0.0);
        self
    }

    /// Set [`group`](Self::group).
    pub fn with_group(mut self, group: Group) -> Self {
        self.group = group;
        self
    }

    /// Set [`user_data`](Self::user_data).
    pub fn with_user_data(mut self, user_data: u128) -> Self {
        self.user_data = user_data;
        self
    }

    /// Set [`is_centered`](Self::is_centered).
    pub fn with_centered(mut self, is_centered: bool) -> Self {
        self.is_centered = is_centered;
        self
    }

    /// Set [`angle`](Self::angle).
    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }
}
