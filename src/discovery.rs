//! Asset discovery engine
//!
//! Fans out across the three asset sources (claim records, registered
//! tokens, native ETH) and merges the results into one list of sweepable
//! positions. Each source degrades independently: a failing source
//! contributes an attributed failure to the report instead of aborting the
//! pass. Discovery is idempotent and caches nothing; positions are recomputed
//! from chain state on every call.

use crate::chain::ChainClient;
use crate::contracts::{ClaimsContract, Erc20};
use crate::sweep::NATIVE_TRANSFER_GAS;
use crate::tokens::{format_units, TokenRegistry};
use crate::{Error, Result};
use alloy::primitives::{Address, U256};
use futures::future::join_all;
use std::sync::Arc;

/// The three structurally different asset sources
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Native,
    Token,
    Claim,
}

impl std::fmt::Display for AssetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssetKind::Native => write!(f, "native"),
            AssetKind::Token => write!(f, "token"),
            AssetKind::Claim => write!(f, "claim"),
        }
    }
}

/// Everything needed to reconstruct a position's exact execution path at
/// sweep time
///
/// A tagged variant rather than a captured closure, so positions stay plain
/// data and the executor decides how to move value when it is called.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SweepAction {
    /// Self-paid value transfer of `balance - gasPrice * NATIVE_TRANSFER_GAS`
    Native,
    /// Self-paid `transfer(destination, balance)` on the token contract
    Token { token: Address },
    /// Relayed redemption of the claim at `index` via the signature protocol
    Claim {
        token: Address,
        claim_id: U256,
        index: U256,
    },
}

/// One sweepable asset position
///
/// Invariant: only surfaced when the raw balance is strictly positive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetPosition {
    /// Human-readable name (token symbol, or "ETH")
    pub name: String,
    /// Raw balance in the asset's smallest unit
    pub balance: U256,
    /// Display precision
    pub decimals: u8,
    /// How to move this position
    pub action: SweepAction,
}

impl AssetPosition {
    pub fn kind(&self) -> AssetKind {
        match self.action {
            SweepAction::Native => AssetKind::Native,
            SweepAction::Token { .. } => AssetKind::Token,
            SweepAction::Claim { .. } => AssetKind::Claim,
        }
    }

    /// Balance formatted at this position's display precision
    pub fn display_balance(&self) -> String {
        format_units(self.balance, self.decimals as u32)
    }
}

/// A sub-procedure failure, attributed to its asset kind
#[derive(Debug)]
pub struct DiscoveryFailure {
    pub kind: AssetKind,
    pub error: Error,
}

/// The outcome of one discovery pass
///
/// Positions are ordered {claims, tokens, native}, each sub-list in its
/// source order (claim index ascending, registry order). Failed kinds are
/// omitted from `positions` and reported in `failures`.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub positions: Vec<AssetPosition>,
    pub failures: Vec<DiscoveryFailure>,
}

impl DiscoveryReport {
    /// True if every sub-procedure completed
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Queries the chain client and the token registry to produce the unified
/// list of sweepable positions for an owner address
pub struct DiscoveryEngine {
    client: Arc<dyn ChainClient>,
    registry: TokenRegistry,
    claims_contract: Address,
}

impl DiscoveryEngine {
    pub fn new(
        client: Arc<dyn ChainClient>,
        registry: TokenRegistry,
        claims_contract: Address,
    ) -> Self {
        Self {
            client,
            registry,
            claims_contract,
        }
    }

    /// Run all three discovery procedures concurrently and merge the results
    pub async fn discover(&self, owner: Address) -> DiscoveryReport {
        let (claims, tokens, native) = tokio::join!(
            self.discover_claims(owner),
            self.discover_tokens(owner),
            self.discover_native(owner),
        );

        let mut positions = Vec::new();
        let mut failures = Vec::new();

        for (kind, result) in [
            (AssetKind::Claim, claims),
            (AssetKind::Token, tokens),
            (AssetKind::Native, native),
        ] {
            match result {
                Ok(mut found) => positions.append(&mut found),
                Err(error) => {
                    tracing::warn!(%kind, %error, "discovery sub-procedure failed");
                    failures.push(DiscoveryFailure { kind, error });
                }
            }
        }

        tracing::info!(
            owner = %owner,
            positions = positions.len(),
            failed_kinds = failures.len(),
            "discovery pass complete"
        );

        DiscoveryReport {
            positions,
            failures,
        }
    }

    /// Native ETH: one position, suppressed when the balance cannot cover the
    /// gas reserve for its own transfer
    pub async fn discover_native(&self, owner: Address) -> Result<Vec<AssetPosition>> {
        let balance = self.client.get_balance(owner).await?;
        if balance.is_zero() {
            return Ok(vec![]);
        }

        let gas_price = self.client.get_gas_price().await?;
        let reserve = U256::from(gas_price) * U256::from(NATIVE_TRANSFER_GAS);
        if balance <= reserve {
            tracing::debug!(%balance, %reserve, "native balance cannot cover its own transfer");
            return Ok(vec![]);
        }

        Ok(vec![AssetPosition {
            name: "ETH".to_string(),
            balance,
            decimals: 18,
            action: SweepAction::Native,
        }])
    }

    /// Registered tokens: `balanceOf` fanned out across the registry, one
    /// position per strictly positive balance, in registry order
    pub async fn discover_tokens(&self, owner: Address) -> Result<Vec<AssetPosition>> {
        let queries = self.registry.iter().map(|token| async move {
            let erc20 = Erc20::new(self.client.as_ref(), token.address);
            (token, erc20.balance_of(owner).await)
        });

        let mut positions = Vec::new();
        for (token, result) in join_all(queries).await {
            match result {
                Ok(balance) if balance > U256::ZERO => positions.push(AssetPosition {
                    name: token.symbol.clone(),
                    balance,
                    decimals: token.decimals,
                    action: SweepAction::Token {
                        token: token.address,
                    },
                }),
                Ok(_) => {}
                // One token's failure never aborts the pass
                Err(error) => {
                    tracing::warn!(token = %token.address, symbol = %token.symbol, %error,
                        "token balance query failed; skipping");
                }
            }
        }

        Ok(positions)
    }

    /// Claim records: `dropCount`, then per index the record and its token's
    /// metadata, fanned out across indices and serialized within each claim
    pub async fn discover_claims(&self, owner: Address) -> Result<Vec<AssetPosition>> {
        let contract = ClaimsContract::new(self.client.as_ref(), self.claims_contract);
        let count = contract.drop_count(owner).await?;

        let contract = &contract;
        let lookups = (0..count).map(|i| async move {
            let index = U256::from(i);
            let drop = contract.get_drop(owner, index).await?;

            let erc20 = Erc20::new(self.client.as_ref(), drop.token);
            let symbol = erc20.symbol().await?;
            let decimals = erc20.decimals().await?;

            Ok::<_, Error>((index, drop, symbol, decimals))
        });

        // join_all preserves input order, so positions come out index-ascending
        let mut positions = Vec::new();
        for result in join_all(lookups).await {
            let (index, drop, symbol, decimals) = result?;

            // Zero quantity means the record was redeemed or withdrawn
            if drop.quantity.is_zero() {
                continue;
            }

            positions.push(AssetPosition {
                name: symbol,
                balance: drop.quantity,
                decimals,
                action: SweepAction::Claim {
                    token: drop.token,
                    claim_id: drop.claim_id,
                    index,
                },
            });
        }

        Ok(positions)
    }
}
