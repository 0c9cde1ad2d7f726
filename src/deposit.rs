//! Batched deposit builder
//!
//! Creates new claim records for a list of recipients: one approval granting
//! the claims contract the full allowance, then one deposit transaction per
//! chunk of recipients. Chunking keeps each transaction inside per-transaction
//! gas and size limits, at the cost of cross-transaction atomicity: a failing
//! chunk does not roll back the chunks already submitted, and the outcome
//! reports partial completion.

use crate::chain::ChainClient;
use crate::contracts::{ClaimsContract, Erc20};
use crate::sweep::TOKEN_GAS_MARGIN;
use crate::wallet::MnemonicWallet;
use crate::{tx, Error, Result};
use alloy::primitives::{Address, TxHash, U256};
use alloy::rpc::types::TransactionRequest;
use std::sync::Arc;

/// Maximum recipients per deposit transaction
pub const DEPOSIT_CHUNK_SIZE: usize = 100;

/// A chunk that could not be submitted
#[derive(Debug)]
pub struct ChunkFailure {
    /// Zero-based index of the failed chunk
    pub chunk: usize,
    pub error: Error,
}

/// What actually happened on-chain
///
/// `deposits` holds the hash of every chunk submitted before the first
/// failure; when `failure` is set, those chunks are already on-chain and are
/// not rolled back.
#[derive(Debug)]
pub struct DepositOutcome {
    pub approval: TxHash,
    pub deposits: Vec<TxHash>,
    pub failure: Option<ChunkFailure>,
}

impl DepositOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Creates claim records in the claims contract
pub struct DepositBuilder {
    client: Arc<dyn ChainClient>,
    claims_contract: Address,
}

impl DepositBuilder {
    pub fn new(client: Arc<dyn ChainClient>, claims_contract: Address) -> Self {
        Self {
            client,
            claims_contract,
        }
    }

    /// Deposit `quantity` of `token` for every recipient
    ///
    /// Input validation is atomic: any malformed recipient or non-positive
    /// quantity rejects the whole batch before anything is sent. The balance
    /// pre-check is advisory only; the authoritative check is the on-chain
    /// approve/deposit path.
    pub async fn create_claims(
        &self,
        wallet: &MnemonicWallet,
        token: Address,
        recipients: &[Address],
        quantity: U256,
    ) -> Result<DepositOutcome> {
        if recipients.is_empty() {
            return Err(Error::InvalidArgument("recipient list is empty".into()));
        }
        if recipients.contains(&Address::ZERO) {
            return Err(Error::InvalidAddress(
                "recipient list contains the zero address".into(),
            ));
        }
        if quantity.is_zero() {
            return Err(Error::InvalidArgument(
                "quantity per recipient must be positive".into(),
            ));
        }

        let total = quantity
            .checked_mul(U256::from(recipients.len()))
            .ok_or_else(|| Error::InvalidArgument("total deposit amount overflows".into()))?;

        let erc20 = Erc20::new(self.client.as_ref(), token);
        let held = erc20.balance_of(wallet.address()).await?;
        if held < total {
            return Err(Error::InsufficientBalance(format!(
                "deposit needs {} but the wallet holds {}",
                total, held
            )));
        }

        let chunks: Vec<&[Address]> = recipients.chunks(DEPOSIT_CHUNK_SIZE).collect();
        tracing::info!(
            token = %token,
            recipients = recipients.len(),
            chunks = chunks.len(),
            %total,
            "creating claims"
        );

        let approval = self.approve(wallet, token, total).await?;
        tracing::info!(tx = %approval, "allowance approved");

        let mut deposits = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.into_iter().enumerate() {
            match self.deposit_chunk(wallet, token, chunk, quantity).await {
                Ok(hash) => {
                    tracing::info!(chunk = i, recipients = chunk.len(), tx = %hash,
                        "deposit chunk submitted");
                    deposits.push(hash);
                }
                Err(error) => {
                    tracing::warn!(chunk = i, %error,
                        "deposit chunk failed; earlier chunks remain on-chain");
                    return Ok(DepositOutcome {
                        approval,
                        deposits,
                        failure: Some(ChunkFailure { chunk: i, error }),
                    });
                }
            }
        }

        Ok(DepositOutcome {
            approval,
            deposits,
            failure: None,
        })
    }

    /// Approve the claims contract to pull the full total
    async fn approve(
        &self,
        wallet: &MnemonicWallet,
        token: Address,
        total: U256,
    ) -> Result<TxHash> {
        let gas_price = self.client.get_gas_price().await?;
        let data = Erc20::approve_calldata(self.claims_contract, total);

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

    /// Submit one deposit transaction for one chunk of recipients
    async fn deposit_chunk(
        &self,
        wallet: &MnemonicWallet,
        token: Address,
        chunk: &[Address],
        quantity: U256,
    ) -> Result<TxHash> {
        // Gas price and nonce are fetched fresh for every chunk
        let gas_price = self.client.get_gas_price().await?;
        let data = ClaimsContract::deposit_calldata(token, chunk.to_vec(), quantity);

        let request = TransactionRequest::default()
            .from(wallet.address())
            .to(self.claims_contract)
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
            self.claims_contract,
            U256::ZERO,
            data,
            gas_limit,
            gas_price,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::mock::MockChainClient;
    use crate::contracts::{IERC20, ITokenDrop};
    use alloy::consensus::{Transaction, TxEnvelope};
    use alloy::eips::eip2718::Decodable2718;
    use alloy::primitives::address;
    use alloy::sol_types::SolCall;

    const CLAIMS: Address = address!("cccccccccccccccccccccccccccccccccccccccc");
    const TOKEN: Address = address!("00000000000000000000000000000000000000aa");

    fn wallet() -> MnemonicWallet {
        MnemonicWallet::from_mnemonic(
            "test test test test test test test test test test test junk",
        )
        .unwrap()
    }

    fn recipients(n: usize) -> Vec<Address> {
        (1..=n)
            .map(|i| Address::from_slice(&{
                let mut bytes = [0u8; 20];
                bytes[12..].copy_from_slice(&(i as u64).to_be_bytes());
                bytes
            }))
            .collect()
    }

    fn funded_client(owner: Address, balance: U256) -> MockChainClient {
        MockChainClient::new(CLAIMS)
            .with_token(TOKEN, "AAA", 18)
            .with_token_balance(TOKEN, owner, balance)
    }

    #[tokio::test]
    async fn test_250_recipients_split_into_three_chunks() {
        let wallet = wallet();
        let quantity = U256::from(10);
        let client = Arc::new(funded_client(wallet.address(), U256::from(2500)));
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let recipients = recipients(250);
        let outcome = builder
            .create_claims(&wallet, TOKEN, &recipients, quantity)
            .await
            .unwrap();

        assert!(outcome.is_complete());
        assert_eq!(outcome.deposits.len(), 3);

        // 1 approval + 3 deposits, in order
        let raw = client.raw_sends();
        assert_eq!(raw.len(), 4);

        let approval = TxEnvelope::decode_2718(&mut raw[0].as_ref()).unwrap();
        assert_eq!(approval.to(), Some(TOKEN));
        let approve = IERC20::approveCall::abi_decode(approval.input()).unwrap();
        assert_eq!(approve.spender, CLAIMS);
        assert_eq!(approve.value, U256::from(2500));

        let mut seen = Vec::new();
        for (raw_tx, expected_len) in raw[1..].iter().zip([100usize, 100, 50]) {
            let envelope = TxEnvelope::decode_2718(&mut raw_tx.as_ref()).unwrap();
            assert_eq!(envelope.to(), Some(CLAIMS));
            let call = ITokenDrop::depositCall::abi_decode(envelope.input()).unwrap();
            assert_eq!(call.recipients.len(), expected_len);
            assert_eq!(call.quantity, quantity);
            seen.extend(call.recipients);
        }

        // Original recipient order preserved across chunks
        assert_eq!(seen, recipients);
    }

    #[tokio::test]
    async fn test_exactly_one_chunk_for_100_recipients() {
        let wallet = wallet();
        let client = Arc::new(funded_client(wallet.address(), U256::from(1000)));
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let outcome = builder
            .create_claims(&wallet, TOKEN, &recipients(100), U256::from(10))
            .await
            .unwrap();

        assert_eq!(outcome.deposits.len(), 1);
        assert_eq!(client.raw_sends().len(), 2); // approve + 1 deposit
    }

    #[tokio::test]
    async fn test_zero_recipient_rejects_whole_batch() {
        let wallet = wallet();
        let client = Arc::new(funded_client(wallet.address(), U256::from(1000)));
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let mut list = recipients(5);
        list[3] = Address::ZERO;

        let result = builder
            .create_claims(&wallet, TOKEN, &list, U256::from(10))
            .await;

        assert!(matches!(result, Err(Error::InvalidAddress(_))));
        assert!(client.raw_sends().is_empty());
    }

    #[tokio::test]
    async fn test_zero_quantity_rejected() {
        let wallet = wallet();
        let client = Arc::new(funded_client(wallet.address(), U256::from(1000)));
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let result = builder
            .create_claims(&wallet, TOKEN, &recipients(5), U256::ZERO)
            .await;

        assert!(matches!(result, Err(Error::InvalidArgument(_))));
        assert!(client.raw_sends().is_empty());
    }

    #[tokio::test]
    async fn test_failed_chunk_reports_partial_completion() {
        let wallet = wallet();
        // Accept the approval and the first deposit chunk, reject the second
        let client = Arc::new(
            funded_client(wallet.address(), U256::from(2500)).failing_raw_after(2),
        );
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let outcome = builder
            .create_claims(&wallet, TOKEN, &recipients(250), U256::from(10))
            .await
            .unwrap();

        assert!(!outcome.is_complete());
        assert_eq!(outcome.deposits.len(), 1);
        let failure = outcome.failure.unwrap();
        assert_eq!(failure.chunk, 1);
        assert!(matches!(failure.error, Error::TransactionRejected(_)));

        // The submitted chunk stays on-chain
        assert_eq!(client.raw_sends().len(), 2);
    }

    #[tokio::test]
    async fn test_insufficient_balance_is_advisory_stop() {
        let wallet = wallet();
        // Needs 50, holds 49
        let client = Arc::new(funded_client(wallet.address(), U256::from(49)));
        let builder = DepositBuilder::new(client.clone(), CLAIMS);

        let result = builder
            .create_claims(&wallet, TOKEN, &recipients(5), U256::from(10))
            .await;

        assert!(matches!(result, Err(Error::InsufficientBalance(_))));
        assert!(client.raw_sends().is_empty());
    }
}
