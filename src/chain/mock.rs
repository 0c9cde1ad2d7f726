//! Deterministic in-memory chain client for tests
//!
//! Answers the same ABI-encoded calls a real node would, against state seeded
//! by the test, and records everything submitted for later assertions.

use crate::chain::ChainClient;
use crate::contracts::{DropInfo, IERC20, ITokenDrop};
use crate::{Error, Result};
use alloy::primitives::{keccak256, Address, Bytes, TxHash, TxKind, B256, U256};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const MOCK_GAS_ESTIMATE: u64 = 60_000;

#[derive(Default)]
pub struct MockChainClient {
    chain_id: u64,
    claims_contract: Address,
    gas_price: u128,
    balances: HashMap<Address, U256>,
    nonces: HashMap<Address, u64>,
    /// (token, owner) -> balance
    token_balances: HashMap<(Address, Address), U256>,
    /// token -> (symbol, decimals)
    token_meta: HashMap<Address, (String, u8)>,
    drops: HashMap<Address, Vec<DropInfo>>,
    /// Addresses whose `call`s fail with a chain error
    failing_calls: HashSet<Address>,
    /// Addresses whose gas estimation reverts
    reverting: HashSet<Address>,
    fail_balance: bool,
    /// Reject raw broadcasts once this many have been accepted
    fail_raw_after: Option<usize>,
    pub sent_raw: Mutex<Vec<Bytes>>,
    pub sent_transactions: Mutex<Vec<(Address, Address, Bytes)>>,
    pub estimate_requests: Mutex<Vec<TransactionRequest>>,
}

impl MockChainClient {
    pub fn new(claims_contract: Address) -> Self {
        Self {
            chain_id: 1,
            claims_contract,
            gas_price: 1_000_000_000, // 1 gwei
            ..Default::default()
        }
    }

    pub fn with_gas_price(mut self, gas_price: u128) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_balance(mut self, address: Address, balance: U256) -> Self {
        self.balances.insert(address, balance);
        self
    }

    pub fn with_nonce(mut self, address: Address, nonce: u64) -> Self {
        self.nonces.insert(address, nonce);
        self
    }

    pub fn with_token(mut self, token: Address, symbol: &str, decimals: u8) -> Self {
        self.token_meta.insert(token, (symbol.to_string(), decimals));
        self
    }

    pub fn with_token_balance(mut self, token: Address, owner: Address, balance: U256) -> Self {
        self.token_balances.insert((token, owner), balance);
        self
    }

    pub fn with_drop(mut self, owner: Address, drop: DropInfo) -> Self {
        self.drops.entry(owner).or_default().push(drop);
        self
    }

    /// Make every `call` against `address` fail with a chain error
    pub fn failing_calls_to(mut self, address: Address) -> Self {
        self.failing_calls.insert(address);
        self
    }

    /// Make gas estimation against `address` revert
    pub fn reverting_at(mut self, address: Address) -> Self {
        self.reverting.insert(address);
        self
    }

    /// Make native balance queries fail
    pub fn failing_balance(mut self) -> Self {
        self.fail_balance = true;
        self
    }

    /// Accept the first `n` raw broadcasts, reject the rest
    pub fn failing_raw_after(mut self, n: usize) -> Self {
        self.fail_raw_after = Some(n);
        self
    }

    /// The canonical hash the mock contract signs claims over:
    /// keccak256(contract ++ recipient ++ claimId)
    pub fn signature_hash(contract: Address, recipient: Address, claim_id: U256) -> B256 {
        let mut preimage = Vec::with_capacity(20 + 20 + 32);
        preimage.extend_from_slice(contract.as_slice());
        preimage.extend_from_slice(recipient.as_slice());
        preimage.extend_from_slice(&claim_id.to_be_bytes::<32>());
        keccak256(&preimage)
    }

    pub fn raw_sends(&self) -> Vec<Bytes> {
        self.sent_raw.lock().unwrap().clone()
    }

    pub fn relayed_sends(&self) -> Vec<(Address, Address, Bytes)> {
        self.sent_transactions.lock().unwrap().clone()
    }

    fn call_claims(&self, data: &[u8]) -> Result<Bytes> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Chain("calldata too short".into()))?;

        if selector == ITokenDrop::dropCountCall::SELECTOR {
            let call = ITokenDrop::dropCountCall::abi_decode(data)?;
            let count = self.drops.get(&call.owner).map_or(0, |d| d.len());
            let ret = ITokenDrop::dropCountCall::abi_encode_returns(&U256::from(count));
            return Ok(ret.into());
        }

        if selector == ITokenDrop::getDropCall::SELECTOR {
            let call = ITokenDrop::getDropCall::abi_decode(data)?;
            let index: usize = call
                .index
                .try_into()
                .map_err(|_| Error::Chain("drop index out of range".into()))?;
            let drop = self
                .drops
                .get(&call.owner)
                .and_then(|d| d.get(index))
                .ok_or_else(|| Error::Chain("no such drop".into()))?;
            let ret = ITokenDrop::getDropCall::abi_encode_returns(&ITokenDrop::getDropReturn {
                token: drop.token,
                dropId: drop.claim_id,
                quantity: drop.quantity,
            });
            return Ok(ret.into());
        }

        if selector == ITokenDrop::computeSignatureHashCall::SELECTOR {
            let call = ITokenDrop::computeSignatureHashCall::abi_decode(data)?;
            let hash = Self::signature_hash(self.claims_contract, call.recipient, call.dropId);
            let ret = ITokenDrop::computeSignatureHashCall::abi_encode_returns(&hash);
            return Ok(ret.into());
        }

        Err(Error::Chain(format!("unexpected claims call: {:x?}", selector)))
    }

    fn call_token(&self, token: Address, data: &[u8]) -> Result<Bytes> {
        let selector: [u8; 4] = data
            .get(..4)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| Error::Chain("calldata too short".into()))?;

        if selector == IERC20::balanceOfCall::SELECTOR {
            let call = IERC20::balanceOfCall::abi_decode(data)?;
            let balance = self
                .token_balances
                .get(&(token, call.owner))
                .copied()
                .unwrap_or(U256::ZERO);
            return Ok(IERC20::balanceOfCall::abi_encode_returns(&balance).into());
        }

        let (symbol, decimals) = self
            .token_meta
            .get(&token)
            .ok_or_else(|| Error::Chain(format!("unknown token {}", token)))?;

        if selector == IERC20::symbolCall::SELECTOR {
            return Ok(IERC20::symbolCall::abi_encode_returns(symbol).into());
        }

        if selector == IERC20::decimalsCall::SELECTOR {
            return Ok(IERC20::decimalsCall::abi_encode_returns(decimals).into());
        }

        Err(Error::Chain(format!("unexpected token call: {:x?}", selector)))
    }
}

#[async_trait]
impl ChainClient for MockChainClient {
    async fn get_balance(&self, address: Address) -> Result<U256> {
        if self.fail_balance {
            return Err(Error::Chain("balance query unavailable".into()));
        }
        Ok(self.balances.get(&address).copied().unwrap_or(U256::ZERO))
    }

    async fn get_transaction_count(&self, address: Address) -> Result<u64> {
        // Pending-block semantics: every raw broadcast bumps the count.
        let sent = self.sent_raw.lock().unwrap().len() as u64;
        Ok(self.nonces.get(&address).copied().unwrap_or(0) + sent)
    }

    async fn get_gas_price(&self) -> Result<u128> {
        Ok(self.gas_price)
    }

    async fn estimate_gas(&self, tx: &TransactionRequest) -> Result<u64> {
        self.estimate_requests.lock().unwrap().push(tx.clone());

        if let Some(TxKind::Call(to)) = tx.to {
            if self.reverting.contains(&to) {
                return Err(Error::Preflight("execution reverted".into()));
            }
        }

        Ok(MOCK_GAS_ESTIMATE)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<TxHash> {
        let mut sent = self.sent_raw.lock().unwrap();
        if let Some(limit) = self.fail_raw_after {
            if sent.len() >= limit {
                return Err(Error::TransactionRejected(
                    "insufficient funds for gas * price + value".into(),
                ));
            }
        }

        let hash = keccak256(&raw);
        sent.push(raw);
        Ok(hash)
    }

    async fn call(&self, to: Address, data: Bytes) -> Result<Bytes> {
        if self.failing_calls.contains(&to) {
            return Err(Error::Chain(format!("call to {} failed", to)));
        }

        if to == self.claims_contract {
            self.call_claims(&data)
        } else {
            self.call_token(to, &data)
        }
    }

    async fn send_transaction(&self, from: Address, to: Address, data: Bytes) -> Result<TxHash> {
        let mut preimage = Vec::new();
        preimage.extend_from_slice(from.as_slice());
        preimage.extend_from_slice(to.as_slice());
        preimage.extend_from_slice(&data);
        let hash = keccak256(&preimage);

        self.sent_transactions.lock().unwrap().push((from, to, data));
        Ok(hash)
    }

    fn chain_id(&self) -> u64 {
        self.chain_id
    }
}
