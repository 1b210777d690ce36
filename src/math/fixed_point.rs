//! Signed 64.64 fixed-point number

use std::convert::TryFrom;

use super::*;
use crate::{bn::U256, error::CurveError};

/// exp2 input limit: 2^63 no longer fits the integer part
const EXP2_UPPER_BOUND: i128 = 63 << FRACTION_BITS;
/// exp2 inputs below this flush to zero
const EXP2_LOWER_BOUND: i128 = -(64 << FRACTION_BITS);
/// Mask of the fractional bits
const FRACTION_MASK: i128 = ONE_RAW - 1;
/// Largest magnitude of a negative value
const MIN_MAGNITUDE: u128 = 1 << 127;

/// `2^(2^-i)` for i = 1..=64, scaled by 2^128
const EXP2_FRACTION_FACTORS: [U256; 64] = [
    U256([0xb2fb1366ea957d3e, 0x6a09e667f3bcc908, 0x1, 0]),
    U256([0x8d5a46305c85eded, 0x306fe0a31b7152de, 0x1, 0]),
    U256([0xf7c8c50eb14a7920, 0x172b83c7d517adcd, 0x1, 0]),
    U256([0x8b92b71842a98364, 0x0b5586cf9890f629, 0x1, 0]),
    U256([0x7c548eb68ca417fe, 0x059b0d31585743ae, 0x1, 0]),
    U256([0xf7caca4f7a29bde9, 0x02c9a3e778060ee6, 0x1, 0]),
    U256([0x4a66ae336dcdfa40, 0x0163da9fb33356d8, 0x1, 0]),
    U256([0x29ab13ec11dc9544, 0x00b1afa5abcbed61, 0x1, 0]),
    U256([0xff19d294cf2f679c, 0x0058c86da1c09ea1, 0x1, 0]),
    U256([0x6d21bfc89a23a011, 0x002c605e2e8cec50, 0x1, 0]),
    U256([0x28bca9c55c31e5e0, 0x00162f3904051fa1, 0x1, 0]),
    U256([0x38e31671ca939726, 0x000b175effdc76ba, 0x1, 0]),
    U256([0x6cacd4b180917c3e, 0x00058ba01fb9f96d, 0x1, 0]),
    U256([0xd0985c348c68e7b4, 0x0002c5cc37da9491, 0x1, 0]),
    U256([0x54457d5995292027, 0x000162e525ee0547, 0x1, 0]),
    U256([0x0618bf4a4ade83fd, 0x0000b17255775c04, 0x1, 0]),
    U256([0x2eed81e9b7d4cfac, 0x000058b91b5bc9ae, 0x1, 0]),
    U256([0xa4d7c8acc017b7ca, 0x00002c5c89d5ec6c, 0x1, 0]),
    U256([0x060e02d839a9d16d, 0x0000162e43f4f831, 0x1, 0]),
    U256([0xd9f890ea06911763, 0x00000b1721bcfc99, 0x1, 0]),
    U256([0x97f9ca14dbcc1629, 0x0000058b90cf1e6d, 0x1, 0]),
    U256([0x016468f6bac5ca2c, 0x000002c5c863b73f, 0x1, 0]),
    U256([0x8f6119e3c02282a6, 0x00000162e430e5a1, 0x1, 0]),
    U256([0x4b86e6d96efd1bff, 0x000000b172183551, 0x1, 0]),
    U256([0xc6be5df846c5b2f0, 0x00000058b90c0b48, 0x1, 0]),
    U256([0x6b9e94213c72737b, 0x0000002c5c8601cc, 0x1, 0]),
    U256([0x37df38aa2b219f07, 0x000000162e42fff0, 0x1, 0]),
    U256([0x9c739aa5819f44fa, 0x0000000b17217fba, 0x1, 0]),
    U256([0xee5acd3c1cedc824, 0x000000058b90bfcd, 0x1, 0]),
    U256([0x1f35a6a30da1be51, 0x00000002c5c85fe3, 0x1, 0]),
    U256([0x999ce3541b9fffd0, 0x0000000162e42ff0, 0x1, 0]),
    U256([0x0f4ef5aadda45554, 0x00000000b17217f8, 0x1, 0]),
    U256([0xf8479bd5a81b51ae, 0x0000000058b90bfb, 0x1, 0]),
    U256([0xf84bd62ae30a74cd, 0x000000002c5c85fd, 0x1, 0]),
    U256([0xfb2fed257559bdaa, 0x00000000162e42fe, 0x1, 0]),
    U256([0x7d5a7716bba4a9af, 0x000000000b17217f, 0x1, 0]),
    U256([0xbe9ddbac5e109ccf, 0x00000000058b90bf, 0x1, 0]),
    U256([0xdf4b15de6f17eb0e, 0x0000000002c5c85f, 0x1, 0]),
    U256([0xefa494f1478fde05, 0x000000000162e42f, 0x1, 0]),
    U256([0xf7d20cf927c8e94d, 0x0000000000b17217, 0x1, 0]),
    U256([0xfbe8f71cb4e4b33e, 0x000000000058b90b, 0x1, 0]),
    U256([0xfdf477b662b26946, 0x00000000002c5c85, 0x1, 0]),
    U256([0xfefa3ae53369388d, 0x0000000000162e42, 0x1, 0]),
    U256([0x7f7d1d351a389d41, 0x00000000000b1721, 0x1, 0]),
    U256([0xbfbe8e8b2d3d4edf, 0x0000000000058b90, 0x1, 0]),
    U256([0x5fdf4741bea6e77f, 0x000000000002c5c8, 0x1, 0]),
    U256([0x2fefa39fe95583c3, 0x00000000000162e4, 0x1, 0]),
    U256([0x17f7d1cfb72b45e3, 0x000000000000b172, 0x1, 0]),
    U256([0x0bfbe8e7cc35c3f2, 0x00000000000058b9, 0x1, 0]),
    U256([0x85fdf473e242ea39, 0x0000000000002c5c, 0x1, 0]),
    U256([0x42fefa39f02b772c, 0x000000000000162e, 0x1, 0]),
    U256([0x217f7d1cf7d83c1a, 0x0000000000000b17, 0x1, 0]),
    U256([0x90bfbe8e7bdcbe2e, 0x000000000000058b, 0x1, 0]),
    U256([0xc85fdf473dea871f, 0x00000000000002c5, 0x1, 0]),
    U256([0xe42fefa39ef44d92, 0x0000000000000162, 0x1, 0]),
    U256([0x7217f7d1cf79e949, 0x00000000000000b1, 0x1, 0]),
    U256([0xb90bfbe8e7bce545, 0x0000000000000058, 0x1, 0]),
    U256([0x5c85fdf473de6eca, 0x000000000000002c, 0x1, 0]),
    U256([0x2e42fefa39ef366f, 0x0000000000000016, 0x1, 0]),
    U256([0x17217f7d1cf79afa, 0x000000000000000b, 0x1, 0]),
    U256([0x8b90bfbe8e7bcd6e, 0x0000000000000005, 0x1, 0]),
    U256([0xc5c85fdf473de6b3, 0x0000000000000002, 0x1, 0]),
    U256([0x62e42fefa39ef359, 0x0000000000000001, 0x1, 0]),
    U256([0xb17217f7d1cf79ac, 0x0000000000000000, 0x1, 0]),
];

/// Signed fixed-point number with 64 integer bits and 64 fractional bits
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Fixed64x64(i128);

impl Fixed64x64 {
    /// Zero
    pub const ZERO: Self = Self(0);
    /// One
    pub const ONE: Self = Self(ONE_RAW);
    /// Largest representable value
    pub const MAX: Self = Self(i128::MAX);
    /// Smallest representable value
    pub const MIN: Self = Self(i128::MIN);

    /// Wrap a raw 64.64 value
    pub const fn from_raw(raw: i128) -> Self {
        Self(raw)
    }

    /// Raw 64.64 value
    pub const fn raw(self) -> i128 {
        self.0
    }

    /// Create from an integer, failing if it does not fit the integer part
    pub fn from_integer(value: i128) -> Result<Self, CurveError> {
        if value < i128::from(i64::MIN) || value > i128::from(i64::MAX) {
            return Err(CurveError::Overflow);
        }
        Ok(Self(value << FRACTION_BITS))
    }

    /// Integer part, truncated toward zero
    pub fn to_integer(self) -> i64 {
        (self.0 / ONE_RAW) as i64
    }

    /// Create `numerator / denominator`, truncated
    pub fn from_ratio(numerator: u128, denominator: u128) -> Result<Self, CurveError> {
        if denominator == 0 {
            return Err(CurveError::DivisionByZero);
        }
        let value = (U256::from(numerator) << FRACTION_BITS) / U256::from(denominator);
        Self::from_magnitude(value, false)
    }

    /// Raw value as unsigned, for scaling positive results into integers
    pub fn to_unsigned_raw(self) -> Result<u128, CurveError> {
        u128::try_from(self.0).map_err(|_| CurveError::DomainError)
    }

    /// Returns true if the value is strictly positive
    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    fn from_magnitude(magnitude: U256, negative: bool) -> Result<Self, CurveError> {
        let magnitude = U256::to_u128(magnitude).map_err(|_| CurveError::Overflow)?;
        if negative {
            if magnitude > MIN_MAGNITUDE {
                return Err(CurveError::Overflow);
            }
            Ok(Self((magnitude as i128).wrapping_neg()))
        } else {
            i128::try_from(magnitude)
                .map(Self)
                .map_err(|_| CurveError::Overflow)
        }
    }

    /// Binary logarithm, defined for positive values only.
    ///
    /// The integer part comes from the most significant bit; each of the 64
    /// fractional bits is produced by squaring the normalized mantissa, so the
    /// result is exact for powers of two and `log2(1) == 0`.
    pub fn log2(self) -> Result<Self, CurveError> {
        if self.0 <= 0 {
            return Err(CurveError::DomainError);
        }
        let x = self.0 as u128;
        let msb = 127 - x.leading_zeros();
        let mut result = (i128::from(msb) - i128::from(FRACTION_BITS)) << FRACTION_BITS;

        // mantissa in [2^127, 2^128), i.e. [1, 2) with 127 fractional bits
        let mut mantissa = U256::from(x) << (127 - msb);
        let mut bit: i128 = 1 << (FRACTION_BITS - 1);
        while bit > 0 {
            mantissa = mantissa.checked_bn_mul(mantissa)?;
            let carry = (mantissa >> 255u32).low_u32();
            mantissa = mantissa >> (127 + carry);
            if carry == 1 {
                result += bit;
            }
            bit >>= 1;
        }
        Ok(Self(result))
    }

    /// Binary exponent.
    ///
    /// Fails with overflow for inputs of 63 and above; inputs below -64 are
    /// smaller than the resolution and return zero.
    pub fn exp2(self) -> Result<Self, CurveError> {
        if self.0 >= EXP2_UPPER_BOUND {
            return Err(CurveError::Overflow);
        }
        if self.0 < EXP2_LOWER_BOUND {
            return Ok(Self::ZERO);
        }
        // floor for negative inputs, fraction in [0, 1)
        let whole = self.0 >> FRACTION_BITS;
        let fraction = (self.0 & FRACTION_MASK) as u128;

        // 1.0 with 126 fractional bits, stays below 2.0
        let mut result = U256::one() << 126u32;
        for (i, factor) in EXP2_FRACTION_FACTORS.iter().enumerate() {
            if fraction & (1u128 << (FRACTION_BITS as usize - 1 - i)) != 0 {
                result = result.checked_bn_mul(*factor)? >> 128u32;
            }
        }

        let shift = u32::try_from(62 - whole).map_err(|_| CurveError::Overflow)?;
        Self::from_magnitude(result >> shift, false)
    }

    /// `self ^ exponent` for a positive base, via `exp2(log2(self) * exponent)`
    pub fn pow(self, exponent: Self) -> Result<Self, CurveError> {
        if self.0 <= 0 {
            return Err(CurveError::DomainError);
        }
        self.log2()?.try_mul(exponent)?.exp2()
    }
}

impl TryAdd for Fixed64x64 {
    fn try_add(self, rhs: Self) -> Result<Self, CurveError> {
        self.0
            .checked_add(rhs.0)
            .map(Self)
            .ok_or(CurveError::Overflow)
    }
}

impl TrySub for Fixed64x64 {
    fn try_sub(self, rhs: Self) -> Result<Self, CurveError> {
        self.0
            .checked_sub(rhs.0)
            .map(Self)
            .ok_or(CurveError::Overflow)
    }
}

impl TryMul<Fixed64x64> for Fixed64x64 {
    fn try_mul(self, rhs: Self) -> Result<Self, CurveError> {
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let product = U256::from(self.0.unsigned_abs())
            .checked_bn_mul(U256::from(rhs.0.unsigned_abs()))?
            >> FRACTION_BITS;
        Self::from_magnitude(product, negative)
    }
}

impl TryDiv<Fixed64x64> for Fixed64x64 {
    fn try_div(self, rhs: Self) -> Result<Self, CurveError> {
        if rhs.0 == 0 {
            return Err(CurveError::DivisionByZero);
        }
        let negative = (self.0 < 0) != (rhs.0 < 0);
        let quotient = (U256::from(self.0.unsigned_abs()) << FRACTION_BITS)
            / U256::from(rhs.0.unsigned_abs());
        Self::from_magnitude(quotient, negative)
    }
}
