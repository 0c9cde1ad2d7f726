//! Error types for the token sweeper

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The mnemonic phrase failed BIP-39 word-list or checksum validation.
    ///
    /// This is the expected state while a phrase is still being typed, not a
    /// fatal condition.
    #[error("invalid mnemonic phrase")]
    InvalidMnemonic,

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("wallet error: {0}")]
    Wallet(String),

    #[error("chain client error: {0}")]
    Chain(String),

    #[error("ABI error: {0}")]
    Abi(#[from] alloy::sol_types::Error),

    /// Broadcast or on-chain execution failed. Surfaced verbatim; the core
    /// never retries a fund-moving operation.
    #[error("transaction rejected: {0}")]
    TransactionRejected(String),

    /// Gas estimation failed before broadcast. Hard stop; nothing was sent.
    #[error("pre-flight validation failed: {0}")]
    Preflight(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),
}

pub type Result<T> = std::result::Result<T, Error>;
