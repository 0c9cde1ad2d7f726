//! Transaction construction and broadcast
//!
//! The one path every self-paid operation goes through: fetch the nonce fresh,
//! sign a legacy transaction with the wallet's key, broadcast the raw bytes.
//! Nonce is never cached; concurrent sends from one address must be serialized
//! by the caller.

use crate::chain::ChainClient;
use crate::wallet::MnemonicWallet;
use crate::Result;
use alloy::consensus::{SignableTransaction, TxEnvelope, TxLegacy};
use alloy::eips::eip2718::Encodable2718;
use alloy::primitives::{Address, Bytes, TxHash, TxKind, U256};

/// Sign and broadcast one legacy transaction from the wallet's address
pub async fn sign_and_send(
    client: &dyn ChainClient,
    wallet: &MnemonicWallet,
    to: Address,
    value: U256,
    input: Bytes,
    gas_limit: u64,
    gas_price: u128,
) -> Result<TxHash> {
    let nonce = client.get_transaction_count(wallet.address()).await?;

    let mut tx = TxLegacy {
        chain_id: Some(client.chain_id()),
        nonce,
        gas_price,
        gas_limit,
        to: TxKind::Call(to),
        value,
        input,
    };

    let signature = wallet.sign_transaction(&mut tx)?;
    let raw = TxEnvelope::Legacy(tx.into_signed(signature)).encoded_2718();

    tracing::debug!(to = %to, nonce, gas_limit, gas_price, "broadcasting signed transaction");

    client.send_raw_transaction(raw.into()).await
}
