//! HTTP JSON-RPC chain client

use crate::chain::ChainClient;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;

/// [`ChainClient`] backed by an alloy HTTP provider
pub struct RpcChainClient {
    provider: DynProvider,
    chain_id: u64,
}

impl RpcChainClient {
    pub fn new(rpc_url: &str, chain_id: u64) -> Result<Self> {
        let url: url::Url = rpc_url
            .parse()
            .map_err(|e| Error::Chain(format!("invalid RPC URL: {}", e)))?;

        let provider = ProviderBuilder::new().connect_http(url).erased();

        Ok(Self { provider, chain_id })
    }
}

#[async_trait]
impl ChainClient for RpcChainClient {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        self.provider
            .get_balance(address)
            .await
            .map_err(|e| Error::Chain(format!("get_balance: {}", e)))
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        self.provider
            .get_transaction_count(address)
            .await
            .map_err(|e| Error::Chain(format!("get_transaction_count: {}", e)))
    }

    async fn get_gas_price(&self) -> Result<u128> {
        self.provider
            .get_gas_price()
            .await
            .map_err(|e| Error::Chain(format!("get_gas_price: {}", e)))
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        self.provider
            .estimate_gas(tx.clone())
            .await
            .map_err(|e| Error::Preflight(parse_revert_reason(&e.to_string())))
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash> {
        let pending = self
            .provider
            .send_raw_transaction(&raw)
            .await
            .map_err(|e| Error::TransactionRejected(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        let tx = TransactionRequest::default().to(to).input(data.into());

        self.provider
            .call(tx)
            .await
            .map_err(|e| Error::Chain(format!("call: {}", e)))
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash> {
        let tx = TransactionRequest::default()
            .from(from)
            .to(to)
            .input(data.into());

        let pending = self
            .provider
            .send_transaction(tx)
            .await
            .map_err(|e| Error::TransactionRejected(e.to_string()))?;

        Ok(*pending.tx_hash())
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}

/// Parse a human-readable revert reason from an RPC error message
fn parse_revert_reason(error: &str) -> String {
    if error.contains("execution reverted") {
        if let Some(start) = error.find("revert: ") {
            let reason = &error[start + 8..];
            if let Some(end) = reason.find('"') {
                return reason[..end].to_string();
            }
            return reason.to_string();
        }
        return "execution reverted".to_string();
    }

    error.to_string()
}
