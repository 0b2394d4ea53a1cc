// Copyright 2025 the Overlap Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Interaction groups: which pairs of bodies may collide at all.

/// A 31-bit interaction group: category in the high 16 bits, mask in the low 16.
///
/// Two bodies interact when each one's category shares a bit with the other's
/// mask. Bodies with identical groups always interact.
///
/// ```
/// use overlap::Group;
///
/// let walls = Group::new(0b01, 0b10);
/// let player = Group::new(0b10, 0b01);
/// let ghost = Group::new(0b100, 0);
/// assert!(walls.can_interact(player));
/// assert!(!ghost.can_interact(walls));
/// assert!(ghost.can_interact(ghost));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Group(u32);

impl Group {
    /// Largest valid group; interacts with every group that accepts it.
    pub const ALL: Self = Self(0x7fff_ffff);

    /// Build a group from category and mask bits.
    ///
    /// The combined value is read as a signed 32-bit integer, so a category with
    /// its top bit set yields a negative value, which clamps to an empty group.
    #[allow(
        clippy::cast_possible_wrap,
        reason = "Groups are 32-bit signed values; wrapping is the documented behavior."
    )]
    pub fn new(category: u16, mask: u16) -> Self {
        let bits = ((u32::from(category) << 16) | u32::from(mask)) as i32;
        Self::from_bits(i64::from(bits))
    }

    /// Build a group from raw bits, clamped into `0..=0x7fff_ffff`.
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "The value is clamped into u32 range first."
    )]
    pub fn from_bits(bits: i64) -> Self {
        Self(bits.clamp(0, i64::from(Self::ALL.0)) as u32)
    }

    /// Raw value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Category bits (high 16).
    pub const fn category(self) -> u32 {
        self.0 >> 16
    }

    /// Mask bits (low 16).
    pub const fn mask(self) -> u32 {
        self.0 & 0xffff
    }

    /// Whether bodies in these two groups may collide.
    pub const fn can_interact(self, other: Self) -> bool {
        self.0 == other.0
            || ((self.category() & other.mask()) != 0 && (other.category() & self.mask()) != 0)
    }
}

impl Default for Group {
    fn default() -> Self {
        Self::ALL
    }
}
