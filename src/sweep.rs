//! Sweep executor
//!
//! Given a discovered position and a destination, builds, signs and
//! broadcasts the transaction that moves it. Every sweep is single-shot:
//! exactly one on-chain transaction (or, for claims, one signature plus one
//! relayed call) per invocation, no retries, failures surfaced unmodified.

use crate::chain::ChainClient;
use crate::claims::ClaimRedeemer;
use crate::contracts::Erc20;
use crate::discovery::{AssetPosition, SweepAction};
use crate::wallet::MnemonicWallet;
use crate::{tx, Error, Result};
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;

/// Gas limit for a native transfer, with headroom over the 21k intrinsic cost
pub const NATIVE_TRANSFER_GAS: u64 = 23_300;

/// Padding added to estimated gas for contract calls
pub const TOKEN_GAS_MARGIN: u64 = 20_000;

/// Moves one discovered position to a destination address
pub struct SweepExecutor {
    client: Arc<dyn ChainClient>,
    claims_contract: Address,
    /// Fee payer for relayed claim redemptions; claim sweeps fail fast
    /// without one
    relayer: Option<Address>,
}

impl SweepExecutor {
    pub fn new(
        client: Arc<dyn ChainClient>,
        claims_contract: Address,
        relayer: Option<Address>,
    ) -> Self {
        Self {
            client,
            claims_contract,
            relayer,
        }
    }

    /// Sweep `position` to `destination`
    ///
    /// The destination must not be the zero address; hex shape is enforced by
    /// the [`Address`] type at the parsing boundary. Concurrent sweeps from
    /// the same wallet must be serialized by the caller.
    pub async fn sweep(
        &self,
        wallet: &MnemonicWallet,
        position: &AssetPosition,
        destination: Address,
    ) -> Result<TxHash> {
        if destination == Address::ZERO {
            return Err(Error::InvalidAddress(
                "destination is the zero address".to_string(),
            ));
        }

        tracing::info!(
            kind = %position.kind(),
            name = %position.name,
            balance = %position.balance,
            destination = %destination,
            "sweeping position"
        );

        match position.action {
            SweepAction::Native => {
                self.sweep_native(wallet, position.balance, destination).await
            }
            SweepAction::Token { token } => {
                self.sweep_token(wallet, token, position.balance, destination)
                    .await
            }
            SweepAction::Claim {
                claim_id, index, ..
            } => {
                ClaimRedeemer::new(self.client.clone(), self.claims_contract, self.relayer)
                    .redeem(wallet, destination, claim_id, index)
                    .await
            }
        }
    }

    /// Native sweep: send `balance - gasPrice * NATIVE_TRANSFER_GAS`
    async fn sweep_native(
        &self,
        wallet: &MnemonicWallet,
        balance: U256,
        destination: Address,
    ) -> Result<TxHash> {
        let gas_price = self.client.get_gas_price().await?;
        let reserve = U256::from(gas_price) * U256::from(NATIVE_TRANSFER_GAS);

        // Discovery already filtered unsweepable balances, but the gas price
        // may have moved since; never send a zero or underflowed amount.
        let amount = balance
            .checked_sub(reserve)
            .filter(|a| !a.is_zero())
            .ok_or_else(|| {
                Error::Preflight(format!(
                    "balance {} no longer covers the gas reserve {}",
                    balance, reserve
                ))
            })?;

        tx::sign_and_send(
            self.client.as_ref(),
            wallet,
            destination,
            amount,
            Default::default(),
            NATIVE_TRANSFER_GAS,
            gas_price,
        )
        .await
    }

    /// Token sweep: `transfer(destination, balance)` with estimated gas
    async fn sweep_token(
        &self,
        wallet: &MnemonicWallet,
        token: Address,
        balance: U256,
        destination: Address,
    ) -> Result<TxHash> {
        let gas_price = self.client.get_gas_price().await?;
        let data = Erc20::transfer_calldata(destination, balance);

        let request = TransactionRequest::default()
            .from(wallet.address())
            .to(token)
            .input(data.clone().into());
        let gas_limit = self
            .client
            .estimate_gas(&request)
            .await?
            .checked_add(TOKEN_GAS_MARGIN)
            .ok_or_else(|| Error::Preflight("gas limit overflow".into()))?;

        tx::sign_and_send(
            self.client.as_ref(),
            wallet,
            token,
            U256::ZERO,
            data,
            gas_limit,
            gas_price,
        )
        .await
    }
}
