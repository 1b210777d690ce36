//! State transition types

use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use log::debug;
use solana_program::{
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::{Pubkey, PUBKEY_BYTES},
};

use crate::{
    curve::{ExponentialCurve, SellQuote},
    error::CurveError,
};

/// Current version of the program and all new accounts created
pub const PROGRAM_VERSION: u8 = 1;

/// Accounts are created with data zeroed out, so uninitialized state instances
/// will have the version set to 0.
pub const UNINITIALIZED_VERSION: u8 = 0;

/// Settled purchase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BuyOutcome {
    /// Reserve units collected from the buyer
    pub total_cost: u64,
    /// Part of the payment left with the buyer
    pub refund: u64,
    /// Supply once the purchase is minted
    pub new_supply: u64,
    /// Committed unit price
    pub new_price: u64,
}

/// Bonding curve state.
#[repr(C)]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CurveInfo {
    /// Version of the curve account layout
    pub version: u8,

    /// Nonce used in program address
    /// The program address is created deterministically with the nonce,
    /// curve program id, and curve account pubkey. This program address is
    /// the mint authority of the token and owns the reserve vault.
    pub nonce: u8,

    /// Set while a buy or sell settles its transfers
    pub is_locked: bool,

    /// Account allowed to withdraw from the reserve
    pub owner: Pubkey,
    /// Mint of the issued token
    pub token_mint: Pubkey,
    /// Mint of the reserve currency
    pub reserve_mint: Pubkey,
    /// Token account holding the reserve
    pub reserve_vault: Pubkey,

    /// Pricing parameters
    pub curve: ExponentialCurve,
    /// Unit price at the current supply
    pub current_price: u64,
}

impl CurveInfo {
    /// Fail if an operation is still settling
    pub fn check_unlocked(&self) -> Result<(), CurveError> {
        if self.is_locked {
            debug!("curve is locked");
            return Err(CurveError::Reentrancy);
        }
        Ok(())
    }

    /// Take the lock for the transfers of a buy or sell
    pub fn lock(&mut self) -> Result<(), CurveError> {
        self.check_unlocked()?;
        self.is_locked = true;
        Ok(())
    }

    /// Release the lock
    pub fn unlock(&mut self) {
        self.is_locked = false;
    }

    /// Settle a purchase of `amount` tokens against `payment` reserve units.
    ///
    /// Only `current_price` changes, and only on success.
    pub fn execute_buy(
        &mut self,
        current_supply: u64,
        payment: u64,
        amount: u64,
    ) -> Result<BuyOutcome, CurveError> {
        self.check_unlocked()?;
        let quote = self.curve.quote_buy(current_supply, amount)?;
        let refund = payment
            .checked_sub(quote.total_cost)
            .ok_or(CurveError::InsufficientPayment)?;

        self.current_price = quote.new_price;
        Ok(BuyOutcome {
            total_cost: quote.total_cost,
            refund,
            new_supply: quote.new_supply,
            new_price: quote.new_price,
        })
    }

    /// Settle a sale of `amount` tokens paid out of a reserve holding
    /// `reserve_balance`.
    pub fn execute_sell(
        &mut self,
        current_supply: u64,
        reserve_balance: u64,
        amount: u64,
    ) -> Result<SellQuote, CurveError> {
        self.check_unlocked()?;
        let quote = self.curve.quote_sell(current_supply, amount)?;
        if quote.proceeds > reserve_balance {
            return Err(CurveError::InsufficientReserve);
        }

        self.current_price = quote.new_price;
        Ok(quote)
    }

    /// Check that `signer` may take `amount` out of a reserve holding
    /// `reserve_balance`.
    pub fn check_withdraw(
        &self,
        signer: &Pubkey,
        is_signer: bool,
        reserve_balance: u64,
        amount: u64,
    ) -> ProgramResult {
        self.check_unlocked()?;
        if amount == 0 {
            return Err(CurveError::ZeroAmount.into());
        }
        if *signer != self.owner {
            return Err(CurveError::Unauthorized.into());
        }
        if !is_signer {
            return Err(ProgramError::MissingRequiredSignature);
        }
        if amount > reserve_balance {
            return Err(CurveError::InsufficientReserve.into());
        }
        Ok(())
    }
}

impl Sealed for CurveInfo {}
impl IsInitialized for CurveInfo {
    fn is_initialized(&self) -> bool {
        self.version != UNINITIALIZED_VERSION
    }
}

#[doc(hidden)]
pub const CURVE_INFO_SIZE: usize = 172;
impl Pack for CurveInfo {
    const LEN: usize = CURVE_INFO_SIZE;

    /// Unpacks a byte buffer into a [CurveInfo](struct.CurveInfo.html).
    fn unpack_from_slice(input: &[u8]) -> Result<Self, ProgramError> {
        let input = array_ref![input, 0, CURVE_INFO_SIZE];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            nonce,
            is_locked,
            owner,
            token_mint,
            reserve_mint,
            reserve_vault,
            curve,
            current_price,
        ) = array_refs![
            input,
            1,
            1,
            1,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            ExponentialCurve::LEN,
            8
        ];

        let version = u8::from_le_bytes(*version);
        if version > PROGRAM_VERSION {
            return Err(ProgramError::InvalidAccountData);
        }

        Ok(Self {
            version,
            nonce: u8::from_le_bytes(*nonce),
            is_locked: unpack_bool(is_locked)?,
            owner: Pubkey::new_from_array(*owner),
            token_mint: Pubkey::new_from_array(*token_mint),
            reserve_mint: Pubkey::new_from_array(*reserve_mint),
            reserve_vault: Pubkey::new_from_array(*reserve_vault),
            curve: ExponentialCurve::unpack_from_slice(curve)?,
            current_price: u64::from_le_bytes(*current_price),
        })
    }

    fn pack_into_slice(&self, output: &mut [u8]) {
        let output = array_mut_ref![output, 0, CURVE_INFO_SIZE];
        #[allow(clippy::ptr_offset_with_cast)]
        let (
            version,
            nonce,
            is_locked,
            owner,
            token_mint,
            reserve_mint,
            reserve_vault,
            curve,
            current_price,
        ) = mut_array_refs![
            output,
            1,
            1,
            1,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            PUBKEY_BYTES,
            ExponentialCurve::LEN,
            8
        ];
        *version = self.version.to_le_bytes();
        *nonce = self.nonce.to_le_bytes();
        pack_bool(self.is_locked, is_locked);
        owner.copy_from_slice(self.owner.as_ref());
        token_mint.copy_from_slice(self.token_mint.as_ref());
        reserve_mint.copy_from_slice(self.reserve_mint.as_ref());
        reserve_vault.copy_from_slice(self.reserve_vault.as_ref());
        self.curve.pack_into_slice(&mut curve[..]);
        *current_price = self.current_price.to_le_bytes();
    }
}

/// Pack boolean
pub fn pack_bool(boolean: bool, dst: &mut [u8; 1]) {
    *dst = (boolean as u8).to_le_bytes()
}

/// Unpack boolean
pub fn unpack_bool(src: &[u8; 1]) -> Result<bool, ProgramError> {
    match u8::from_le_bytes(*src) {
        0 => Ok(false),
        1 => Ok(true),
        _ => Err(ProgramError::InvalidAccountData),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNIT: u64 = 1_000_000_000;
    const BASE_PRICE: u64 = 10_000_000_000_000_000;

    fn default_curve_info() -> CurveInfo {
        CurveInfo {
            version: PROGRAM_VERSION,
            nonce: 255,
            is_locked: false,
            owner: Pubkey::new_from_array([3u8; 32]),
            token_mint: Pubkey::new_from_array([4u8; 32]),
            reserve_mint: Pubkey::new_from_array([5u8; 32]),
            reserve_vault: Pubkey::new_from_array([6u8; 32]),
            curve: ExponentialCurve::new(BASE_PRICE, 101, 100, 10 * UNIT, 9).unwrap(),
            current_price: BASE_PRICE,
        }
    }

    #[test]
    fn test_curve_info_packing() {
        let curve_info = default_curve_info();

        let mut packed = [0u8; CurveInfo::LEN];
        CurveInfo::pack(curve_info.clone(), &mut packed).unwrap();
        let unpacked = CurveInfo::unpack(&packed).unwrap();
        assert_eq!(curve_info, unpacked);

        let mut packed = vec![];
        packed.push(PROGRAM_VERSION);
        packed.push(255);
        packed.push(0);
        packed.extend_from_slice(&[3u8; 32]);
        packed.extend_from_slice(&[4u8; 32]);
        packed.extend_from_slice(&[5u8; 32]);
        packed.extend_from_slice(&[6u8; 32]);
        packed.extend_from_slice(&BASE_PRICE.to_le_bytes());
        packed.extend_from_slice(&101u64.to_le_bytes());
        packed.extend_from_slice(&100u64.to_le_bytes());
        packed.extend_from_slice(&(10 * UNIT).to_le_bytes());
        packed.push(9);
        packed.extend_from_slice(&BASE_PRICE.to_le_bytes());
        let unpacked = CurveInfo::unpack(&packed).unwrap();
        assert_eq!(curve_info, unpacked);

        let packed = [0u8; CurveInfo::LEN];
        let unpacked = CurveInfo::unpack_unchecked(&packed).unwrap();
        assert_eq!(unpacked, CurveInfo::default());
        assert!(!unpacked.is_initialized());
        assert_eq!(
            CurveInfo::unpack(&packed),
            Err(ProgramError::UninitializedAccount)
        );

        let mut packed = [0u8; CurveInfo::LEN];
        packed[0] = PROGRAM_VERSION + 1;
        assert_eq!(
            CurveInfo::unpack_unchecked(&packed),
            Err(ProgramError::InvalidAccountData)
        );
    }

    #[test]
    fn test_execute_buy() {
        let mut curve_info = default_curve_info();

        let outcome = curve_info.execute_buy(0, BASE_PRICE, UNIT).unwrap();
        assert_eq!(outcome.total_cost, BASE_PRICE);
        assert_eq!(outcome.refund, 0);
        assert_eq!(outcome.new_supply, UNIT);
        assert_eq!(curve_info.current_price, 10_100_000_000_000_000);

        let outcome = curve_info
            .execute_buy(UNIT, 2 * BASE_PRICE, UNIT)
            .unwrap();
        assert_eq!(outcome.total_cost, 10_100_000_000_000_000);
        assert_eq!(outcome.refund, 2 * BASE_PRICE - 10_100_000_000_000_000);
        assert_eq!(curve_info.current_price, 10_201_000_000_000_000);
    }

    #[test]
    fn test_execute_buy_failures_leave_state() {
        let mut curve_info = default_curve_info();
        let before = curve_info.clone();

        assert_eq!(
            curve_info.execute_buy(0, BASE_PRICE - 1, UNIT),
            Err(CurveError::InsufficientPayment)
        );
        assert_eq!(
            curve_info.execute_buy(0, u64::MAX, 0),
            Err(CurveError::ZeroAmount)
        );
        assert_eq!(
            curve_info.execute_buy(10 * UNIT, u64::MAX, 1),
            Err(CurveError::SupplyCapExceeded)
        );
        assert_eq!(curve_info, before);

        curve_info.lock().unwrap();
        assert_eq!(
            curve_info.execute_buy(0, BASE_PRICE, UNIT),
            Err(CurveError::Reentrancy)
        );
        assert_eq!(curve_info.current_price, BASE_PRICE);
    }

    #[test]
    fn test_execute_sell() {
        let mut curve_info = default_curve_info();
        curve_info.execute_buy(0, u64::MAX, 2 * UNIT).unwrap();
        assert_eq!(curve_info.current_price, 10_201_000_000_000_000);
        let reserve = 20_100_000_000_000_000;

        assert_eq!(
            curve_info.execute_sell(2 * UNIT, reserve, 3 * UNIT),
            Err(CurveError::InsufficientSupply)
        );
        assert_eq!(
            curve_info.execute_sell(2 * UNIT, reserve, 0),
            Err(CurveError::ZeroAmount)
        );
        assert_eq!(
            curve_info.execute_sell(2 * UNIT, BASE_PRICE, UNIT),
            Err(CurveError::InsufficientReserve)
        );
        assert_eq!(curve_info.current_price, 10_201_000_000_000_000);

        let quote = curve_info.execute_sell(2 * UNIT, reserve, UNIT).unwrap();
        assert_eq!(quote.proceeds, 10_100_000_000_000_000);
        assert_eq!(quote.new_supply, UNIT);
        assert_eq!(curve_info.current_price, 10_100_000_000_000_000);

        let quote = curve_info
            .execute_sell(UNIT, reserve - 10_100_000_000_000_000, UNIT)
            .unwrap();
        assert_eq!(quote.proceeds, BASE_PRICE);
        assert_eq!(curve_info.current_price, BASE_PRICE);
    }

    #[test]
    fn test_check_withdraw() {
        let curve_info = default_curve_info();
        let owner = curve_info.owner;
        let stranger = Pubkey::new_from_array([9u8; 32]);

        assert_eq!(curve_info.check_withdraw(&owner, true, 100, 100), Ok(()));
        assert_eq!(
            curve_info.check_withdraw(&owner, true, 100, 0),
            Err(CurveError::ZeroAmount.into())
        );
        assert_eq!(
            curve_info.check_withdraw(&stranger, true, 100, 1),
            Err(CurveError::Unauthorized.into())
        );
        assert_eq!(
            curve_info.check_withdraw(&owner, false, 100, 1),
            Err(ProgramError::MissingRequiredSignature)
        );
        assert_eq!(
            curve_info.check_withdraw(&owner, true, 100, 101),
            Err(CurveError::InsufficientReserve.into())
        );
    }

    #[test]
    fn test_lock() {
        let mut curve_info = default_curve_info();
        curve_info.lock().unwrap();
        assert_eq!(curve_info.lock(), Err(CurveError::Reentrancy));
        assert_eq!(
            curve_info.check_withdraw(&curve_info.owner.clone(), true, 1, 1),
            Err(CurveError::Reentrancy.into())
        );
        curve_info.unlock();
        assert_eq!(curve_info.lock(), Ok(()));
    }
}
