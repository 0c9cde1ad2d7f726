//! Token Sweeper
//!
//! Discovers every asset a mnemonic-derived wallet is entitled to (native ETH,
//! registered ERC-20 tokens, and claimable token-drop grants locked in a claims
//! contract) and sweeps any one of them, in a single step, to a chosen
//! destination address.
//!
//! # Security Model
//!
//! - The derived private key never leaves the wallet module
//! - All fund-moving operations are single-shot: no retries, no silent recovery
//! - Claim redemptions are authorized off-chain and paid for by a relayer; the
//!   contract independently re-derives and verifies the signed message

pub mod chain;
pub mod claims;
pub mod config;
pub mod contracts;
pub mod deposit;
pub mod discovery;
pub mod sweep;
pub mod tokens;
pub mod tx;
pub mod wallet;

mod error;

// Re-export commonly used types
pub use config::Config;
pub use deposit::{DepositBuilder, DepositOutcome, DEPOSIT_CHUNK_SIZE};
pub use discovery::{AssetKind, AssetPosition, DiscoveryEngine, DiscoveryReport, SweepAction};
pub use error::{Error, Result};
pub use sweep::SweepExecutor;
pub use tokens::{TokenDescriptor, TokenRegistry};
pub use wallet::MnemonicWallet;
