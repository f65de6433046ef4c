//! Squared-distance value types.

use std::fmt;
use std::ops::Add;

/// The square of a distance in light-years.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct SquareFloat(f64);

impl SquareFloat {
    /// Square a distance.
    #[inline]
    pub fn new(distance: f64) -> Self {
        Self(distance * distance)
    }

    /// Wrap a value that is already squared.
    #[inline]
    pub const fn from_squared(value: f64) -> Self {
        Self(value)
    }

    /// The squared value itself.
    #[inline]
    pub const fn value(self) -> f64 {
        self.0
    }

    /// The distance this square was taken from.
    #[inline]
    pub fn root(self) -> f64 {
        self.0.sqrt()
    }
}

impl Add for SquareFloat {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl fmt::Display for SquareFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}²", self.root())
    }
}

/// The square of a distance measured in whole sector-grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SquareInt(i64);

impl SquareInt {
    /// Square a cell count.
    #[inline]
    pub const fn new(cells: i64) -> Self {
        Self(cells.saturating_mul(cells))
    }

    /// The squared value itself.
    #[inline]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl Add for SquareInt {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}
