//! The chain client capability trait

use crate::Result;
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// Blockchain read/write operations consumed by this crate
///
/// Every method is a network round trip and therefore a suspension point.
/// The core attaches no timeout or cancellation contract to these calls; a
/// caller-level timeout around each one is recommended.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// Native currency balance of an account, in wei
    async fn get_balance(&self, address: Address) -> Result<U256>;

    /// Outgoing transaction count (nonce) of an account
    ///
    /// Always fetched fresh at send time, never cached, to reduce nonce
    /// collisions under concurrent sends.
    async fn get_transaction_count(&self, address: Address) -> Result<u64>;

    /// Current gas price, in wei
    async fn get_gas_price(&self) -> Result<u128>;

    /// Estimate gas for a transaction without executing it
    ///
    /// Failure here means the call would revert; callers treat it as a
    /// pre-flight validation failure and broadcast nothing.
    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64>;

    /// Broadcast signed raw transaction bytes
    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash>;

    /// Read-only contract call with ABI-encoded calldata
    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes>;

    /// Submit a contract call paid for by a node-managed account
    ///
    /// Used for relayed claim redemptions, where the fee payer is not the
    /// claim's owner.
    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash>;

    /// Chain ID transactions are signed for
    fn chain_id(&self) -> u64;
}
