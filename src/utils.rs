//! Utility methods

use solana_program::{account_info::AccountInfo, program_pack::Pack, pubkey::Pubkey};
use spl_token::state::{Account, Mint};

use crate::error::CurveError;

/// Default token decimals
pub const DEFAULT_TOKEN_DECIMALS: u8 = 9;

/// Calculates the authority id by generating a program address.
pub fn authority_id(
    program_id: &Pubkey,
    my_info: &Pubkey,
    nonce: u8,
) -> Result<Pubkey, CurveError> {
    Pubkey::create_program_address(&[&my_info.to_bytes()[..32], &[nonce]], program_id)
        .or(Err(CurveError::InvalidProgramAddress))
}

/// Unpacks a spl_token `Account`.
pub fn unpack_token_account(
    account_info: &AccountInfo,
    token_program_id: &Pubkey,
) -> Result<Account, CurveError> {
    if account_info.owner != token_program_id {
        Err(CurveError::IncorrectTokenProgramId)
    } else {
        Account::unpack(&account_info.data.borrow()).map_err(|_| CurveError::ExpectedAccount)
    }
}

/// Unpacks a spl_token `Mint`.
pub fn unpack_mint(
    account_info: &AccountInfo,
    token_program_id: &Pubkey,
) -> Result<Mint, CurveError> {
    if account_info.owner != token_program_id {
        Err(CurveError::IncorrectTokenProgramId)
    } else {
        Mint::unpack(&account_info.data.borrow()).map_err(|_| CurveError::ExpectedMint)
    }
}
