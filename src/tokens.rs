//! Static token registry
//!
//! The registry is the fixed list of ERC-20 tokens discovery scans for. It is
//! loaded once at startup (from config, or the mainnet defaults) and never
//! mutated afterwards; entry order is the order token positions appear in
//! discovery results.

use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// One registry entry: a token contract and its display metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Token contract address
    pub address: Address,
    /// Token symbol (e.g., "USDC", "WETH")
    pub symbol: String,
    /// Number of decimals for display precision
    pub decimals: u8,
}

impl TokenDescriptor {
    pub fn new(address: Address, symbol: &str, decimals: u8) -> Self {
        Self {
            address,
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// Well-known mainnet token addresses
pub mod addresses {
    use alloy::primitives::{address, Address};

    pub const USDC: Address = address!("a0b86991c6218b36c1d19d4a2e9eb0ce3606eb48");
    pub const USDT: Address = address!("dac17f958d2ee523a2206206994597c13d831ec7");
    pub const DAI: Address = address!("6b175474e89094c44da98b954eedeac495271d0f");
    pub const WETH: Address = address!("c02aaa39b223fe8d0a0e5c4f27ead9083c756cc2");
    pub const WBTC: Address = address!("2260fac5e5542a773aa44fbcfedf7c193bc2c599");
}

/// Ordered, immutable token registry
#[derive(Debug, Clone)]
pub struct TokenRegistry {
    tokens: Vec<TokenDescriptor>,
}

impl TokenRegistry {
    /// Build a registry from explicit entries (registry order is preserved)
    pub fn new(tokens: Vec<TokenDescriptor>) -> Self {
        Self { tokens }
    }

    /// Registry of well-known mainnet tokens
    pub fn mainnet() -> Self {
        Self::new(vec![
            TokenDescriptor::new(addresses::USDC, "USDC", 6),
            TokenDescriptor::new(addresses::USDT, "USDT", 6),
            TokenDescriptor::new(addresses::DAI, "DAI", 18),
            TokenDescriptor::new(addresses::WETH, "WETH", 18),
            TokenDescriptor::new(addresses::WBTC, "WBTC", 8),
        ])
    }

    /// Iterate entries in registry order
    pub fn iter(&self) -> impl Iterator<Item = &TokenDescriptor> {
        self.tokens.iter()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Look up a token by contract address
    pub fn get(&self, address: &Address) -> Option<&TokenDescriptor> {
        self.tokens.iter().find(|t| &t.address == address)
    }
}

impl Default for TokenRegistry {
    fn default() -> Self {
        Self::mainnet()
    }
}

/// Format a raw token amount with the given number of decimals
///
/// This is the display rule for balances: `raw / 10^decimals`, with trailing
/// zeros trimmed.
pub fn format_units(value: U256, decimals: u32) -> String {
    if value.is_zero() {
        return "0".to_string();
    }

    let divisor = U256::from(10).pow(U256::from(decimals));
    let whole = value / divisor;
    let remainder = value % divisor;

    if remainder.is_zero() {
        whole.to_string()
    } else {
        let remainder_str = format!("{:0>width$}", remainder, width = decimals as usize);
        let trimmed = remainder_str.trim_end_matches('0');
        if trimmed.is_empty() {
            whole.to_string()
        } else {
            format!("{}.{}", whole, trimmed)
        }
    }
}
