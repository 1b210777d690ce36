//! Instruction types

use std::{convert::TryInto, mem::size_of};

use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::error::CurveError;

/// Initialize instruction data
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct InitializeData {
    /// Nonce used to create valid program address
    pub nonce: u8,
    /// Price of the first unit, in reserve units
    pub base_price: u64,
    /// Per-unit growth ratio numerator
    pub growth_numerator: u64,
    /// Per-unit growth ratio denominator
    pub growth_denominator: u64,
    /// Issuance cap in smallest token units
    pub max_supply: u64,
}

/// Buy instruction data
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct BuyData {
    /// Tokens to mint, in smallest units
    pub amount: u64,
    /// Most reserve units the buyer is willing to pay
    pub payment: u64,
}

/// Sell instruction data
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct SellData {
    /// Tokens to burn, in smallest units
    pub amount: u64,
}

/// Withdraw instruction data
#[repr(C)]
#[derive(Clone, Debug, PartialEq)]
pub struct WithdrawData {
    /// Reserve units to take out of the vault
    pub amount: u64,
}

/// Instructions supported by the bonding curve program.
#[repr(C)]
#[derive(Debug, PartialEq)]
pub enum CurveInstruction {
    ///   Initializes a new curve.
    ///
    ///   0. `[writable]` Curve account, owned by the program and zeroed.
    ///   1. `[]` $authority derived from `create_program_address(&[curve account])`
    ///   2. `[]` Owner allowed to withdraw from the reserve.
    ///   3. `[]` Token mint, $authority is the mint authority, zero supply.
    ///   4. `[]` Reserve vault, owned by $authority.
    ///   5. `[]` Token program id
    Initialize(InitializeData),

    ///   Buy tokens at the curve price.
    ///
    ///   0. `[writable]` Curve account
    ///   1. `[]` $authority
    ///   2. `[writable]` Token mint, $authority is the mint authority
    ///   3. `[writable]` Buyer reserve account, total cost is transferable by $authority
    ///   4. `[writable]` Reserve vault
    ///   5. `[writable]` Buyer token account to credit
    ///   6. `[]` Token program id
    Buy(BuyData),

    ///   Sell tokens back to the curve.
    ///
    ///   0. `[writable]` Curve account
    ///   1. `[]` $authority
    ///   2. `[writable]` Token mint, $authority is the mint authority
    ///   3. `[writable]` Seller token account, amount is burnable by $authority
    ///   4. `[writable]` Reserve vault
    ///   5. `[writable]` Seller reserve account to credit
    ///   6. `[]` Token program id
    Sell(SellData),

    ///   Withdraw reserve funds.
    ///
    ///   0. `[]` Curve account
    ///   1. `[]` $authority
    ///   2. `[signer]` Owner
    ///   3. `[writable]` Reserve vault
    ///   4. `[writable]` Destination reserve account
    ///   5. `[]` Token program id
    Withdraw(WithdrawData),
}

impl CurveInstruction {
    /// Unpacks a byte buffer into a [CurveInstruction](enum.CurveInstruction.html).
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (&tag, rest) = input.split_first().ok_or(CurveError::InvalidInstruction)?;
        Ok(match tag {
            0 => {
                let (&nonce, rest) = rest.split_first().ok_or(CurveError::InvalidInstruction)?;
                let (base_price, rest) = unpack_u64(rest)?;
                let (growth_numerator, rest) = unpack_u64(rest)?;
                let (growth_denominator, rest) = unpack_u64(rest)?;
                let (max_supply, _rest) = unpack_u64(rest)?;
                Self::Initialize(InitializeData {
                    nonce,
                    base_price,
                    growth_numerator,
                    growth_denominator,
                    max_supply,
                })
            }
            1 => {
                let (amount, rest) = unpack_u64(rest)?;
                let (payment, _rest) = unpack_u64(rest)?;
                Self::Buy(BuyData { amount, payment })
            }
            2 => {
                let (amount, _rest) = unpack_u64(rest)?;
                Self::Sell(SellData { amount })
            }
            3 => {
                let (amount, _rest) = unpack_u64(rest)?;
                Self::Withdraw(WithdrawData { amount })
            }
            _ => return Err(CurveError::InvalidInstruction.into()),
        })
    }

    /// Packs a [CurveInstruction](enum.CurveInstruction.html) into a byte buffer.
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(size_of::<Self>());
        match *self {
            Self::Initialize(InitializeData {
                nonce,
                base_price,
                growth_numerator,
                growth_denominator,
                max_supply,
            }) => {
                buf.push(0);
                buf.push(nonce);
                buf.extend_from_slice(&base_price.to_le_bytes());
                buf.extend_from_slice(&growth_numerator.to_le_bytes());
                buf.extend_from_slice(&growth_denominator.to_le_bytes());
                buf.extend_from_slice(&max_supply.to_le_bytes());
            }
            Self::Buy(BuyData { amount, payment }) => {
                buf.push(1);
                buf.extend_from_slice(&amount.to_le_bytes());
                buf.extend_from_slice(&payment.to_le_bytes());
            }
            Self::Sell(SellData { amount }) => {
                buf.push(2);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::Withdraw(WithdrawData { amount }) => {
                buf.push(3);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
        }
        buf
    }
}

/// Creates an 'initialize' instruction.
#[allow(clippy::too_many_arguments)]
pub fn initialize(
    program_id: &Pubkey,
    token_program_id: &Pubkey,
    curve_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    token_mint_pubkey: &Pubkey,
    reserve_vault_pubkey: &Pubkey,
    nonce: u8,
    base_price: u64,
    growth_numerator: u64,
    growth_denominator: u64,
    max_supply: u64,
) -> Result<Instruction, ProgramError> {
    let data = CurveInstruction::Initialize(InitializeData {
        nonce,
        base_price,
        growth_numerator,
        growth_denominator,
        max_supply,
    })
    .pack();

    let accounts = vec![
        AccountMeta::new(*curve_pubkey, false),
        AccountMeta::new_readonly(*authority_pubkey, false),
        AccountMeta::new_readonly(*owner_pubkey, false),
        AccountMeta::new_readonly(*token_mint_pubkey, false),
        AccountMeta::new_readonly(*reserve_vault_pubkey, false),
        AccountMeta::new_readonly(*token_program_id, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a 'buy' instruction.
#[allow(clippy::too_many_arguments)]
pub fn buy(
    program_id: &Pubkey,
    token_program_id: &Pubkey,
    curve_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    token_mint_pubkey: &Pubkey,
    source_pubkey: &Pubkey,
    reserve_vault_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    amount: u64,
    payment: u64,
) -> Result<Instruction, ProgramError> {
    let data = CurveInstruction::Buy(BuyData { amount, payment }).pack();

    let accounts = vec![
        AccountMeta::new(*curve_pubkey, false),
        AccountMeta::new_readonly(*authority_pubkey, false),
        AccountMeta::new(*token_mint_pubkey, false),
        AccountMeta::new(*source_pubkey, false),
        AccountMeta::new(*reserve_vault_pubkey, false),
        AccountMeta::new(*destination_pubkey, false),
        AccountMeta::new_readonly(*token_program_id, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a 'sell' instruction.
#[allow(clippy::too_many_arguments)]
pub fn sell(
    program_id: &Pubkey,
    token_program_id: &Pubkey,
    curve_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    token_mint_pubkey: &Pubkey,
    source_pubkey: &Pubkey,
    reserve_vault_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = CurveInstruction::Sell(SellData { amount }).pack();

    let accounts = vec![
        AccountMeta::new(*curve_pubkey, false),
        AccountMeta::new_readonly(*authority_pubkey, false),
        AccountMeta::new(*token_mint_pubkey, false),
        AccountMeta::new(*source_pubkey, false),
        AccountMeta::new(*reserve_vault_pubkey, false),
        AccountMeta::new(*destination_pubkey, false),
        AccountMeta::new_readonly(*token_program_id, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

/// Creates a 'withdraw' instruction.
#[allow(clippy::too_many_arguments)]
pub fn withdraw(
    program_id: &Pubkey,
    token_program_id: &Pubkey,
    curve_pubkey: &Pubkey,
    authority_pubkey: &Pubkey,
    owner_pubkey: &Pubkey,
    reserve_vault_pubkey: &Pubkey,
    destination_pubkey: &Pubkey,
    amount: u64,
) -> Result<Instruction, ProgramError> {
    let data = CurveInstruction::Withdraw(WithdrawData { amount }).pack();

    let accounts = vec![
        AccountMeta::new_readonly(*curve_pubkey, false),
        AccountMeta::new_readonly(*authority_pubkey, false),
        AccountMeta::new_readonly(*owner_pubkey, true),
        AccountMeta::new(*reserve_vault_pubkey, false),
        AccountMeta::new(*destination_pubkey, false),
        AccountMeta::new_readonly(*token_program_id, false),
    ];

    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data,
    })
}

fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
    if input.len() >= 8 {
        let (amount, rest) = input.split_at(8);
        let amount = amount
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(CurveError::InvalidInstruction)?;
        Ok((amount, rest))
    } else {
        Err(CurveError::InvalidInstruction.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_curve_instruction_packing() {
        let nonce: u8 = 255;
        let base_price: u64 = 10_000_000_000_000_000;
        let growth_numerator: u64 = 101;
        let growth_denominator: u64 = 100;
        let max_supply: u64 = 1_000_000_000_000;
        let check = CurveInstruction::Initialize(InitializeData {
            nonce,
            base_price,
            growth_numerator,
            growth_denominator,
            max_supply,
        });
        let packed = check.pack();
        let mut expect: Vec<u8> = vec![0, nonce];
        expect.extend_from_slice(&base_price.to_le_bytes());
        expect.extend_from_slice(&growth_numerator.to_le_bytes());
        expect.extend_from_slice(&growth_denominator.to_le_bytes());
        expect.extend_from_slice(&max_supply.to_le_bytes());
        assert_eq!(packed, expect);
        let unpacked = CurveInstruction::unpack(&expect).unwrap();
        assert_eq!(
            unpacked, check,
            "test packing and unpacking of the initialize instruction"
        );

        let amount: u64 = 1_000_000_000;
        let payment: u64 = 10_000_000_000_000_000;
        let check = CurveInstruction::Buy(BuyData { amount, payment });
        let packed = check.pack();
        let mut expect: Vec<u8> = vec![1];
        expect.extend_from_slice(&amount.to_le_bytes());
        expect.extend_from_slice(&payment.to_le_bytes());
        assert_eq!(packed, expect);
        let unpacked = CurveInstruction::unpack(&expect).unwrap();
        assert_eq!(
            unpacked, check,
            "test packing and unpacking of the buy instruction"
        );

        let check = CurveInstruction::Sell(SellData { amount });
        let packed = check.pack();
        let mut expect: Vec<u8> = vec![2];
        expect.extend_from_slice(&amount.to_le_bytes());
        assert_eq!(packed, expect);
        let unpacked = CurveInstruction::unpack(&expect).unwrap();
        assert_eq!(
            unpacked, check,
            "test packing and unpacking of the sell instruction"
        );

        let check = CurveInstruction::Withdraw(WithdrawData { amount });
        let packed = check.pack();
        let mut expect: Vec<u8> = vec![3];
        expect.extend_from_slice(&amount.to_le_bytes());
        assert_eq!(packed, expect);
        let unpacked = CurveInstruction::unpack(&expect).unwrap();
        assert_eq!(
            unpacked, check,
            "test packing and unpacking of the withdraw instruction"
        );
    }

    #[test]
    fn test_invalid_instruction_data() {
        let invalid: Result<CurveInstruction, ProgramError> =
            Err(CurveError::InvalidInstruction.into());
        assert_eq!(CurveInstruction::unpack(&[]), invalid);
        assert_eq!(CurveInstruction::unpack(&[4]), invalid);
        assert_eq!(CurveInstruction::unpack(&[0]), invalid);
        assert_eq!(CurveInstruction::unpack(&[0, 255, 1, 2, 3]), invalid);

        let mut truncated_buy = vec![1];
        truncated_buy.extend_from_slice(&1u64.to_le_bytes());
        assert_eq!(CurveInstruction::unpack(&truncated_buy), invalid);
        assert_eq!(CurveInstruction::unpack(&[2, 1, 0, 0]), invalid);
        assert_eq!(CurveInstruction::unpack(&[3]), invalid);
    }

    #[test]
    fn test_withdraw_requires_owner_signature() {
        let program_id = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let ix = withdraw(
            &program_id,
            &spl_token::id(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &owner,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            10,
        )
        .unwrap();
        assert_eq!(ix.accounts.len(), 6);
        assert_eq!(ix.accounts[2], AccountMeta::new_readonly(owner, true));
        assert_eq!(ix.data, vec![3, 10, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_initialize_accounts() {
        let program_id = Pubkey::new_unique();
        let curve = Pubkey::new_unique();
        let ix = initialize(
            &program_id,
            &spl_token::id(),
            &curve,
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            &Pubkey::new_unique(),
            255,
            1,
            101,
            100,
            1_000,
        )
        .unwrap();
        assert_eq!(ix.accounts.len(), 6);
        assert_eq!(ix.accounts[0], AccountMeta::new(curve, false));
        assert!(ix.accounts.iter().all(|meta| !meta.is_signer));
        assert_eq!(ix.data[0], 0);
        assert_eq!(ix.data[1], 255);
    }
}
