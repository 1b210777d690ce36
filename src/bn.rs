//! Big number types

#![allow(clippy::assign_op_pattern)]
#![allow(clippy::ptr_offset_with_cast)]
#![allow(clippy::manual_range_contains)]

use std::convert::TryInto;

use uint::construct_uint;

use crate::error::CurveError;

construct_uint! {
    /// 256-bit unsigned integer.
    pub struct U256(4);
}

impl U256 {
    /// Convert u256 to u64
    pub fn to_u64(val: U256) -> Result<u64, CurveError> {
        val.try_into().map_err(|_| CurveError::ConversionFailure)
    }

    /// Convert u256 to u128
    pub fn to_u128(val: U256) -> Result<u128, CurveError> {
        val.try_into().map_err(|_| CurveError::ConversionFailure)
    }

    /// div with floor
    pub fn checked_floor_div(&self, other: Self) -> Result<Self, CurveError> {
        if other.is_zero() {
            return Err(CurveError::DivisionByZero);
        }
        Ok(*self / other)
    }

    /// div rounding half up
    pub fn checked_round_div(&self, other: Self) -> Result<Self, CurveError> {
        if other.is_zero() {
            return Err(CurveError::DivisionByZero);
        }
        let half = other >> 1;
        self.checked_bn_add(half)?.checked_floor_div(other)
    }

    /// mul with CurveError
    pub fn checked_bn_mul(&self, other: Self) -> Result<Self, CurveError> {
        self.checked_mul(other).ok_or(CurveError::Overflow)
    }

    /// add with CurveError
    pub fn checked_bn_add(&self, other: Self) -> Result<Self, CurveError> {
        self.checked_add(other).ok_or(CurveError::Overflow)
    }

    /// sub with CurveError
    pub fn checked_bn_sub(&self, other: Self) -> Result<Self, CurveError> {
        self.checked_sub(other).ok_or(CurveError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic() {
        let a = U256::from(7u64);
        let b = U256::from(2u64);
        assert_eq!(a.checked_floor_div(b).unwrap(), U256::from(3u64));
        assert_eq!(a.checked_round_div(b).unwrap(), U256::from(4u64));
        assert_eq!(
            U256::from(5u64).checked_round_div(U256::from(3u64)).unwrap(),
            U256::from(2u64)
        );
        assert_eq!(a.checked_floor_div(U256::zero()), Err(CurveError::DivisionByZero));
        assert_eq!(b.checked_bn_sub(a), Err(CurveError::Overflow));
        assert_eq!(U256::max_value().checked_bn_add(U256::one()), Err(CurveError::Overflow));
        assert_eq!(U256::max_value().checked_bn_mul(b), Err(CurveError::Overflow));
        assert_eq!(U256::to_u64(U256::from(u64::MAX)).unwrap(), u64::MAX);
        assert_eq!(
            U256::to_u64(U256::from(u64::MAX) + 1),
            Err(CurveError::ConversionFailure)
        );
        assert_eq!(U256::to_u128(U256::from(u128::MAX)).unwrap(), u128::MAX);
    }
}
