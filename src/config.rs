//! Configuration for the token sweeper
//!
//! Environment variables take priority, with a public-RPC fallback for
//! testing:
//!
//! ```bash
//! export ETH_RPC_URL="https://eth-mainnet.g.alchemy.com/v2/YOUR_KEY"
//! export CLAIMS_CONTRACT="0x..."   # required
//! export RELAYER_ADDRESS="0x..."   # optional, needed for claim sweeps
//! export CHAIN_ID=1                # defaults to mainnet
//! ```

use crate::tokens::{TokenDescriptor, TokenRegistry};
use crate::{Error, Result};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Public RPC endpoint (rate limited, for testing only)
const PUBLIC_RPC: &str = "https://eth.llamarpc.com";

/// Environment variable names
mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const RPC_URL: &str = "RPC_URL";
    pub const CHAIN_ID: &str = "CHAIN_ID";
    pub const CLAIMS_CONTRACT: &str = "CLAIMS_CONTRACT";
    pub const RELAYER_ADDRESS: &str = "RELAYER_ADDRESS";
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// JSON-RPC endpoint
    pub rpc_url: String,
    /// Chain ID transactions are signed for
    pub chain_id: u64,
    /// Address of the claims contract
    pub claims_contract: Address,
    /// Fee payer for relayed claim redemptions (node-managed account)
    #[serde(default)]
    pub relayer: Option<Address>,
    /// Token registry entries, scanned in order during discovery
    #[serde(default = "default_tokens")]
    pub tokens: Vec<TokenDescriptor>,
}

fn default_tokens() -> Vec<TokenDescriptor> {
    TokenRegistry::mainnet().iter().cloned().collect()
}

impl Config {
    /// Build configuration from environment variables
    ///
    /// `CLAIMS_CONTRACT` is required; everything else has a default.
    pub fn from_env() -> Result<Self> {
        let rpc_url = std::env::var(env_vars::ETH_RPC_URL)
            .or_else(|_| std::env::var(env_vars::RPC_URL))
            .unwrap_or_else(|_| {
                tracing::warn!("no RPC URL configured, using public RPC (rate limited)");
                PUBLIC_RPC.to_string()
            });

        let chain_id = match std::env::var(env_vars::CHAIN_ID) {
            Ok(raw) => raw
                .parse()
                .map_err(|e| Error::Config(format!("bad CHAIN_ID: {}", e)))?,
            Err(_) => 1,
        };

        let claims_contract = std::env::var(env_vars::CLAIMS_CONTRACT)
            .map_err(|_| Error::Config("CLAIMS_CONTRACT not set".to_string()))?
            .parse()
            .map_err(|e| Error::Config(format!("bad CLAIMS_CONTRACT: {}", e)))?;

        let relayer = match std::env::var(env_vars::RELAYER_ADDRESS) {
            Ok(raw) => Some(
                raw.parse()
                    .map_err(|e| Error::Config(format!("bad RELAYER_ADDRESS: {}", e)))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            rpc_url,
            chain_id,
            claims_contract,
            relayer,
            tokens: default_tokens(),
        })
    }

    /// Load configuration from a JSON file
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let content =
            std::fs::read_to_string(path).map_err(|e| Error::Config(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }

    /// The token registry this configuration describes
    pub fn registry(&self) -> TokenRegistry {
        TokenRegistry::new(self.tokens.clone())
    }
}
