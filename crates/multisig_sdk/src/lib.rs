//! client side sdk for the multisig program
//!
//! every request builder returns an unsigned [`solana_sdk::transaction::Transaction`],
//! signing and submission are left to a [`provider::Submitter`]

pub mod actions;
pub mod client;
pub mod encoding;
pub mod error;
pub mod execute;
pub mod filter;
pub mod inspect;
pub mod instruction;
pub mod pda;
pub mod provider;
pub mod state;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use {client::MultisigClient, error::MultisigError};

/// default deployment of the multisig program
pub const ID: solana_sdk::pubkey::Pubkey =
    solana_sdk::pubkey!("4GUuiefBoY1Qeou69d2bM2mQTEgr8wBFes3KqZaFXZzn");
