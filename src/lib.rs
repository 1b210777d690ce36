#![deny(missing_docs)]

//! An exponential bonding curve issuance program for the Solana blockchain.

pub mod bn;
pub mod curve;
pub mod entrypoint;
pub mod error;
pub mod instruction;
pub mod math;
pub mod processor;
pub mod state;
pub mod utils;

// Export current solana-program types for downstream users who may also be
// building with a different solana-program version
pub use solana_program;

solana_program::declare_id!("BCurve1111111111111111111111111111111111111");
