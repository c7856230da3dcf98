//! Integer edge lengths and a fixed-point scaled representation used for LP objective
//! coefficients, reduced costs, and Lagrangian-style penalty arithmetic.

use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div, Mul, Sub, SubAssign},
};

const FIXED_POINT_FRACTIONAL_BITS: u32 = 5;

/// An integer edge length / tour length, over a symmetric nonnegative integer length function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Distance(pub i64);

impl Distance {
    pub const ZERO: Distance = Distance(0);
    pub const MAX: Distance = Distance(i64::MAX >> FIXED_POINT_FRACTIONAL_BITS);
    pub const MIN: Distance = Distance(i64::MIN + (1 << FIXED_POINT_FRACTIONAL_BITS));
}

impl Add for Distance {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        Distance(self.0 + other.0)
    }
}

impl AddAssign for Distance {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Distance {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        Distance(self.0 - other.0)
    }
}

impl Sum<Distance> for Distance {
    fn sum<I: Iterator<Item = Distance>>(iter: I) -> Self {
        iter.fold(Distance(0), |acc, d| acc + d)
    }
}

impl<'a> Sum<&'a Distance> for Distance {
    fn sum<I: Iterator<Item = &'a Distance>>(iter: I) -> Self {
        iter.fold(Distance(0), |acc, d| acc + *d)
    }
}

impl Mul<Distance> for i64 {
    type Output = Distance;

    fn mul(self, rhs: Distance) -> Self::Output {
        Distance(self * rhs.0)
    }
}

/// A fixed-point scaled [`Distance`], used when fractional adjustments (pricing, penalty
/// subgradient steps) need sub-integer precision without floats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ScaledDistance(pub i64);

impl ScaledDistance {
    pub const MAX: ScaledDistance = ScaledDistance(i64::MAX);
    pub const MIN: ScaledDistance = ScaledDistance(i64::MIN);

    pub fn from_i64(value: i64) -> Self {
        ScaledDistance(value << FIXED_POINT_FRACTIONAL_BITS)
    }

    pub fn from_distance(value: Distance) -> Self {
        ScaledDistance(value.0 << FIXED_POINT_FRACTIONAL_BITS)
    }

    pub fn to_distance(self) -> Distance {
        Distance(self.0 >> FIXED_POINT_FRACTIONAL_BITS)
    }

    pub fn to_distance_rounded_up(self) -> Distance {
        let adjusted = self.0 + (1 << FIXED_POINT_FRACTIONAL_BITS) - 1;
        Distance(adjusted >> FIXED_POINT_FRACTIONAL_BITS)
    }
}

impl Add for ScaledDistance {
    type Output = Self;

    fn add(self, other: Self) -> Self::Output {
        ScaledDistance(self.0 + other.0)
    }
}

impl Sub for ScaledDistance {
    type Output = Self;

    fn sub(self, other: Self) -> Self::Output {
        ScaledDistance(self.0 - other.0)
    }
}

impl Div<i64> for ScaledDistance {
    type Output = ScaledDistance;

    fn div(self, rhs: i64) -> Self::Output {
        ScaledDistance(self.0 / rhs)
    }
}

impl<'a> Sum<&'a ScaledDistance> for ScaledDistance {
    fn sum<I: Iterator<Item = &'a ScaledDistance>>(iter: I) -> Self {
        iter.fold(ScaledDistance(0), |acc, d| acc + *d)
    }
}

impl Mul<ScaledDistance> for i64 {
    type Output = ScaledDistance;

    fn mul(self, rhs: ScaledDistance) -> Self::Output {
        ScaledDistance(self * rhs.0)
    }
}

impl AddAssign for ScaledDistance {
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl SubAssign for ScaledDistance {
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Tolerance used throughout the solver for "is this LP value effectively zero/an integer".
pub const EPSILON: f64 = 1e-7;
