//! Fixed-point math for curve pricing

// required for clippy
#![allow(clippy::assign_op_pattern)]
#![allow(clippy::manual_range_contains)]

mod fixed_point;

pub use fixed_point::*;

use crate::error::CurveError;

/// Number of fractional bits of [`Fixed64x64`]
pub const FRACTION_BITS: u32 = 64;
/// Raw representation of one
pub const ONE_RAW: i128 = 1 << FRACTION_BITS;

/// Try to subtract, return an error on underflow
pub trait TrySub: Sized {
    /// Subtract
    fn try_sub(self, rhs: Self) -> Result<Self, CurveError>;
}

/// Try to add, return an error on overflow
pub trait TryAdd: Sized {
    /// Add
    fn try_add(self, rhs: Self) -> Result<Self, CurveError>;
}

/// Try to divide, return an error on overflow or divide by zero
pub trait TryDiv<RHS>: Sized {
    /// Divide
    fn try_div(self, rhs: RHS) -> Result<Self, CurveError>;
}

/// Try to multiply, return an error on overflow
pub trait TryMul<RHS>: Sized {
    /// Multiply
    fn try_mul(self, rhs: RHS) -> Result<Self, CurveError>;
}
