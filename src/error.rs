//! Error types

use num_derive::FromPrimitive;
use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use thiserror::Error;

/// Errors that may be returned by the bonding curve program.
#[derive(Clone, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum CurveError {
    // 0.
    /// The account cannot be initialized because it is already being used.
    #[error("Curve account already in use")]
    AlreadyInUse,
    /// The program address provided doesn't match the value generated by the program.
    #[error("Invalid program address generated from nonce and key")]
    InvalidProgramAddress,
    /// The owner of the input isn't set to the program address generated by the program.
    #[error("Input account owner is not the program address")]
    InvalidOwner,
    /// The program id of a token account does not match the token program passed in.
    #[error("Input token account is not owned by the passed token program")]
    IncorrectTokenProgramId,
    /// The deserialization of the account returned something besides State::Mint.
    #[error("Deserialized account is not an SPL Token mint")]
    ExpectedMint,

    // 5.
    /// The deserialization of the account returned something besides State::Account.
    #[error("Deserialized account is not an SPL Token account")]
    ExpectedAccount,
    /// The instruction data could not be decoded.
    #[error("Invalid instruction")]
    InvalidInstruction,
    /// Token mint does not match the one stored in the curve.
    #[error("Address of the provided token mint is incorrect")]
    IncorrectMint,
    /// Reserve vault does not match the one stored in the curve.
    #[error("Address of the provided reserve vault is incorrect")]
    IncorrectReserveVault,
    /// Token mint and reserve mint are the same.
    #[error("Reserve currency and issued token have the same mint")]
    RepeatedMint,

    // 10.
    /// The token mint must start with zero supply.
    #[error("Token mint has a non-zero supply")]
    InvalidSupply,
    /// The token mint has a freeze authority.
    #[error("Token mint has a freeze authority")]
    InvalidFreezeAuthority,
    /// The reserve vault has a delegate.
    #[error("Reserve vault has a delegate")]
    InvalidDelegate,
    /// The reserve vault has a close authority.
    #[error("Reserve vault has a close authority")]
    InvalidCloseAuthority,
    /// Base price, growth ratio or decimals are out of range.
    #[error("Invalid curve parameters")]
    InvalidCurveParameters,

    // 15.
    /// Buy or sell of zero tokens.
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    /// Supply range is empty or reversed.
    #[error("Start supply must be below end supply")]
    InvalidRange,
    /// Purchase would push the supply past the configured cap.
    #[error("Purchase exceeds the maximum supply")]
    SupplyCapExceeded,
    /// Sale of more tokens than exist.
    #[error("Sale exceeds the current supply")]
    InsufficientSupply,
    /// Attached payment does not cover the purchase cost.
    #[error("Payment does not cover the cost")]
    InsufficientPayment,

    // 20.
    /// Reserve vault holds less than required.
    #[error("Reserve vault balance is insufficient")]
    InsufficientReserve,
    /// Signer is not the curve owner.
    #[error("Account is not authorized to execute this instruction")]
    Unauthorized,
    /// Arithmetic result does not fit its type.
    #[error("Arithmetic overflow")]
    Overflow,
    /// Input outside of a function's domain, such as log2 of a non-positive value.
    #[error("Input outside of the function domain")]
    DomainError,
    /// Division by zero.
    #[error("Division by zero")]
    DivisionByZero,

    // 25.
    /// Conversion between integer widths failed.
    #[error("Conversion to u64 failed with an overflow or underflow")]
    ConversionFailure,
    /// A state-mutating instruction started while another one is still settling.
    #[error("Curve is locked by an operation in progress")]
    Reentrancy,
    /// A user account aliases the reserve vault.
    #[error("InvalidInput")]
    InvalidInput,
}

impl From<CurveError> for ProgramError {
    fn from(e: CurveError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl<T> DecodeError<T> for CurveError {
    fn type_of() -> &'static str {
        "Curve Error"
    }
}

impl PrintProgramError for CurveError {
    fn print<E>(&self)
    where
        E: 'static
            + std::error::Error
            + DecodeError<E>
            + PrintProgramError
            + num_traits::FromPrimitive,
    {
        msg!(&self.to_string());
    }
}
