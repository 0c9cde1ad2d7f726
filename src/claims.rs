//! Claim signature protocol
//!
//! The gasless redemption scheme: the claim's owner signs an authorization
//! off-chain and a relayer (any party, paying from its own account) submits
//! the redemption on-chain. The contract recovers the signer from (v, r, s)
//! and pays out only if it matches the claim's recorded owner.
//!
//! The canonical message hash is always fetched from the contract's own
//! `computeSignatureHash` entry point, never recomputed locally, so signer and
//! verifier agree bit for bit.

use crate::chain::ChainClient;
use crate::contracts::ClaimsContract;
use crate::sweep::TOKEN_GAS_MARGIN;
use crate::wallet::MnemonicWallet;
use crate::{tx, Error, Result};
use alloy::primitives::{Address, TxHash, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::signers::Signature;
use std::sync::Arc;

/// A recoverable ECDSA authorization over a claim's canonical hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimSignature {
    /// Recovery id, 27 or 28
    pub v: u8,
    pub r: B256,
    pub s: B256,
}

impl From<Signature> for ClaimSignature {
    fn from(sig: Signature) -> Self {
        Self {
            v: if sig.v() { 28 } else { 27 },
            r: B256::from(sig.r().to_be_bytes::<32>()),
            s: B256::from(sig.s().to_be_bytes::<32>()),
        }
    }
}

/// Signs claim authorizations and submits relayed redemptions
pub struct ClaimRedeemer {
    client: Arc<dyn ChainClient>,
    contract: Address,
    /// Account redemption calls are paid from (node-managed); redemptions
    /// fail fast without one
    relayer: Option<Address>,
}

impl ClaimRedeemer {
    pub fn new(client: Arc<dyn ChainClient>, contract: Address, relayer: Option<Address>) -> Self {
        Self {
            client,
            contract,
            relayer,
        }
    }

    /// Sign the contract's canonical hash for `(recipient, claim_id)` with the
    /// owner's key
    pub async fn sign_claim(
        &self,
        wallet: &MnemonicWallet,
        recipient: Address,
        claim_id: U256,
    ) -> Result<ClaimSignature> {
        let contract = ClaimsContract::new(self.client.as_ref(), self.contract);
        let hash = contract.compute_signature_hash(recipient, claim_id).await?;

        let signature = wallet.sign_hash(hash)?;
        Ok(signature.into())
    }

    /// Sign and submit a relayed redemption of the claim at `index`
    ///
    /// Gas is estimated first; if estimation fails the redemption would revert
    /// (stale index, wrong signer) and nothing is broadcast. A rejected
    /// submission surfaces as [`Error::TransactionRejected`] and is never
    /// retried, with this or any other key.
    pub async fn redeem(
        &self,
        wallet: &MnemonicWallet,
        recipient: Address,
        claim_id: U256,
        index: U256,
    ) -> Result<TxHash> {
        let relayer = self.relayer.ok_or_else(|| {
            Error::InvalidArgument("no relayer configured for claim redemption".to_string())
        })?;

        let signature = self.sign_claim(wallet, recipient, claim_id).await?;

        let data = ClaimsContract::redeem_for_calldata(
            recipient,
            claim_id,
            index,
            signature.v,
            signature.r,
            signature.s,
        );

        // Pre-flight: a failing estimate means a guaranteed revert
        let request = TransactionRequest::default()
            .from(relayer)
            .to(self.contract)
            .input(data.clone().into());
        self.client.estimate_gas(&request).await?;

        tracing::info!(
            owner = %wallet.address(),
            recipient = %recipient,
            claim_id = %claim_id,
            index = %index,
            relayer = %relayer,
            "submitting relayed claim redemption"
        );

        self.client
            .send_transaction(relayer, self.contract, data)
            .await
    }

    /// Withdraw an unredeemed claim back to its owner, self-paid
    pub async fn withdraw(
        &self,
        wallet: &MnemonicWallet,
        index: U256,
        claim_id: U256,
    ) -> Result<TxHash> {
        let data = ClaimsContract::withdraw_calldata(index, claim_id);

        let gas_price = self.client.get_gas_price().await?;
        let request = TransactionRequest::default()
            .from(wallet.address())
            .to(self.contract)
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
            self.contract,
            U256::ZERO,
            data,
            gas_limit,
            gas_price,
        )
        .await
    }
}
