//! Mnemonic wallet management
//!
//! This module turns a BIP-39 mnemonic phrase into a single signing keypair.
//! The private key NEVER leaves this module and is NEVER exposed outside the
//! signing operations.

mod signer;

pub use signer::{MnemonicWallet, DERIVATION_PATH};
