//! Exponential bonding curve

use super::*;

use std::convert::TryFrom;

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use log::{debug, trace};
use solana_program::{
    program_error::ProgramError,
    program_pack::{Pack, Sealed},
};

/// Result of pricing a purchase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuyQuote {
    /// Reserve units owed for the purchase
    pub total_cost: u64,
    /// Supply once the purchase is minted
    pub new_supply: u64,
    /// Unit price at the new supply
    pub new_price: u64,
}

/// Result of pricing a sale
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SellQuote {
    /// Reserve units paid out for the sale
    pub proceeds: u64,
    /// Supply once the sale is burnt
    pub new_supply: u64,
    /// Unit price at the new supply
    pub new_price: u64,
}

/// Exponential curve parameters.
///
/// price(supply) = base_price * f ^ (supply / 10^decimals),
/// where f = growth_numerator / growth_denominator.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExponentialCurve {
    /// Price of the first unit, at zero supply
    pub base_price: u64,
    /// Growth ratio numerator
    pub growth_numerator: u64,
    /// Growth ratio denominator
    pub growth_denominator: u64,
    /// Hard issuance cap in smallest token units
    pub max_supply: u64,
    /// Decimals of the issued token
    pub decimals: u8,
}

impl ExponentialCurve {
    /// Create new curve, validating the parameters
    pub fn new(
        base_price: u64,
        growth_numerator: u64,
        growth_denominator: u64,
        max_supply: u64,
        decimals: u8,
    ) -> Result<Self, CurveError> {
        let curve = Self {
            base_price,
            growth_numerator,
            growth_denominator,
            max_supply,
            decimals,
        };
        curve.validate()?;
        Ok(curve)
    }

    /// Check `base_price > 0`, `growth_denominator > 0`, a growth ratio of at
    /// least `1 + 2^-MIN_GROWTH_BITS` and a supported number of decimals.
    pub fn validate(&self) -> Result<(), CurveError> {
        if self.base_price == 0
            || self.growth_denominator == 0
            || self.growth_numerator <= self.growth_denominator
        {
            return Err(CurveError::InvalidCurveParameters);
        }
        let growth_delta = u128::from(self.growth_numerator - self.growth_denominator);
        if (growth_delta << MIN_GROWTH_BITS) < u128::from(self.growth_denominator) {
            debug!(
                "growth {}/{} too close to one",
                self.growth_numerator, self.growth_denominator
            );
            return Err(CurveError::InvalidCurveParameters);
        }
        unit_scale(self.decimals)?;
        Ok(())
    }

    /// Smallest token units per whole unit
    pub fn unit(&self) -> Result<u64, CurveError> {
        unit_scale(self.decimals)
    }

    fn growth_power(&self, supply: u64) -> Result<Fixed64x64, CurveError> {
        growth_power(
            supply,
            self.unit()?,
            self.growth_numerator,
            self.growth_denominator,
        )
    }

    /// Unit price at a given supply
    pub fn price_at_supply(&self, supply: u64) -> Result<u64, CurveError> {
        let price = scaled_price(self.base_price, self.growth_power(supply)?)?;
        trace!("price_at_supply: supply={} price={}", supply, price);
        Ok(price)
    }

    /// Reserve that backs the curve at a given supply
    pub fn reserve_at_supply(&self, supply: u64) -> Result<u128, CurveError> {
        geometric_reserve(
            self.base_price,
            self.growth_power(supply)?,
            self.growth_numerator,
            self.growth_denominator,
        )
    }

    /// Reserve units needed to move the supply from `start_supply` up to
    /// `end_supply`, or returned when moving it back down.
    pub fn cost(&self, start_supply: u64, end_supply: u64) -> Result<u64, CurveError> {
        if start_supply >= end_supply {
            return Err(CurveError::InvalidRange);
        }
        let cost = self
            .reserve_at_supply(end_supply)?
            .checked_sub(self.reserve_at_supply(start_supply)?)
            .ok_or(CurveError::Overflow)?;
        u64::try_from(cost).map_err(|_| CurveError::Overflow)
    }

    /// Price a purchase of `amount` tokens at `current_supply`
    pub fn quote_buy(&self, current_supply: u64, amount: u64) -> Result<BuyQuote, CurveError> {
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        let new_supply = current_supply
            .checked_add(amount)
            .filter(|supply| *supply <= self.max_supply)
            .ok_or(CurveError::SupplyCapExceeded)?;
        let quote = BuyQuote {
            total_cost: self.cost(current_supply, new_supply)?,
            new_supply,
            new_price: self.price_at_supply(new_supply)?,
        };
        debug!(
            "quote_buy: supply={} amount={} cost={} price={}",
            current_supply, amount, quote.total_cost, quote.new_price
        );
        Ok(quote)
    }

    /// Price a sale of `amount` tokens at `current_supply`
    pub fn quote_sell(&self, current_supply: u64, amount: u64) -> Result<SellQuote, CurveError> {
        if amount == 0 {
            return Err(CurveError::ZeroAmount);
        }
        let new_supply = current_supply
            .checked_sub(amount)
            .ok_or(CurveError::InsufficientSupply)?;
        let quote = SellQuote {
            proceeds: self.cost(new_supply, current_supply)?,
            new_supply,
            new_price: self.price_at_supply(new_supply)?,
        };
        debug!(
            "quote_sell: supply={} amount={} proceeds={} price={}",
            current_supply, amount, quote.proceeds, quote.new_price
        );
        Ok(quote)
    }
}

impl Sealed for ExponentialCurve {}

/// ExponentialCurve packed size
pub const EXPONENTIAL_CURVE_SIZE: usize = 33; // 8 + 8 + 8 + 8 + 1
impl Pack for ExponentialCurve {
    const LEN: usize = EXPONENTIAL_CURVE_SIZE;
    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, EXPONENTIAL_CURVE_SIZE];
        #[allow(clippy::ptr_offset_with_cast)]
        let (base_price, growth_numerator, growth_denominator, max_supply, decimals) =
            array_refs![input, 8, 8, 8, 8, 1];
        Ok(Self {
            base_price: u64::from_le_bytes(*base_price),
            growth_numerator: u64::from_le_bytes(*growth_numerator),
            growth_denominator: u64::from_le_bytes(*growth_denominator),
            max_supply: u64::from_le_bytes(*max_supply),
            decimals: decimals[0],
        })
    }

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, EXPONENTIAL_CURVE_SIZE];
        #[allow(clippy::ptr_offset_with_cast)]
        let (base_price, growth_numerator, growth_denominator, max_supply, decimals) =
            mut_array_refs![output, 8, 8, 8, 8, 1];
        *base_price = self.base_price.to_le_bytes();
        *growth_numerator = self.growth_numerator.to_le_bytes();
        *growth_denominator = self.growth_denominator.to_le_bytes();
        *max_supply = self.max_supply.to_le_bytes();
        decimals[0] = self.decimals;
    }
}
