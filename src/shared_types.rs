//! This module contains types that don't really belong into other modules,
//! yet are used by several of them.

use core::ops::{Add, AddAssign, Sub, SubAssign};

use fixed::{types::extra::U8, FixedI32};

/// A fixed-point number is used because the GBA has no FPU.
/// The number has 23 bits of precision before and 8 after the comma.
pub type Fixed = FixedI32<U8>;

/// A 2D position with sub-pixel precision.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct FixedPoint {
    pub x: Fixed,
    pub y: Fixed,
}

impl FixedPoint {
    pub const fn new(x: Fixed, y: Fixed) -> FixedPoint {
        return FixedPoint { x, y };
    }

    /// Create a position from whole pixel coordinates.
    pub fn from_ints(x: i32, y: i32) -> FixedPoint {
        return FixedPoint {
            x: Fixed::from_num(x),
            y: Fixed::from_num(y),
        };
    }

    /// Returns the value before the comma.
    pub fn floor(&self) -> (i32, i32) {
        return (self.x.to_num(), self.y.to_num());
    }
}

impl Add for FixedPoint {
    type Output = FixedPoint;

    fn add(self, other: FixedPoint) -> FixedPoint {
        return FixedPoint::new(self.x + other.x, self.y + other.y);
    }
}

impl AddAssign for FixedPoint {
    fn add_assign(&mut self, other: FixedPoint) {
        *self = *self + other;
    }
}

impl Sub for FixedPoint {
    type Output = FixedPoint;

    fn sub(self, other: FixedPoint) -> FixedPoint {
        return FixedPoint::new(self.x - other.x, self.y - other.y);
    }
}

impl SubAssign for FixedPoint {
    fn sub_assign(&mut self, other: FixedPoint) {
        *self = *self - other;
    }
}
