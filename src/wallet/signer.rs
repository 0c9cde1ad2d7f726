//! Mnemonic-derived wallet implementation
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are derived deterministically from the mnemonic, never stored
//! - Keys are held in alloy's PrivateKeySigner which handles crypto securely
//! - Keys are never serialized and never logged
//! - The only egress is through the signing operations below

use crate::{Error, Result};
use alloy::consensus::TxLegacy;
use alloy::primitives::{Address, B256};
use alloy::signers::local::{coins_bip39::English, MnemonicBuilder, PrivateKeySigner};
use alloy::signers::Signature;

/// The fixed hierarchical derivation path for the session key.
///
/// Standard Ethereum account zero; re-running derivation with the same
/// mnemonic always yields the same keypair.
pub const DERIVATION_PATH: &str = "m/44'/60'/0'/0/0";

/// A wallet holding the single keypair derived from a mnemonic phrase
///
/// Created once per mnemonic entry and owned exclusively by the session.
/// Nothing here is persisted; dropping the wallet destroys the key.
pub struct MnemonicWallet {
    /// The signer (the only copy of the private key)
    signer: PrivateKeySigner,
    /// Public address (safe to expose)
    address: Address,
}

impl MnemonicWallet {
    /// Derive a wallet from a BIP-39 mnemonic phrase
    ///
    /// Returns [`Error::InvalidMnemonic`] if the phrase fails word-list or
    /// checksum validation. That is the expected state while a user is still
    /// typing a phrase, not a fatal error.
    pub fn from_mnemonic(phrase: &str) -> Result<Self> {
        let phrase = phrase.trim();
        if phrase.is_empty() {
            return Err(Error::InvalidMnemonic);
        }

        let signer = MnemonicBuilder::<English>::default()
            .phrase(phrase)
            .derivation_path(DERIVATION_PATH)
            .map_err(|e| Error::Wallet(format!("bad derivation path: {}", e)))?
            .build()
            .map_err(|_| Error::InvalidMnemonic)?;

        let address = signer.address();

        Ok(Self { signer, address })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a legacy transaction payload
    ///
    /// Fills in the signature only; nonce, gas price and gas limit must
    /// already be set by the caller.
    pub fn sign_transaction(&self, tx: &mut TxLegacy) -> Result<Signature> {
        use alloy::network::TxSignerSync;

        self.signer
            .sign_transaction_sync(tx)
            .map_err(|e| Error::Wallet(format!("transaction signing failed: {}", e)))
    }

    /// Sign an arbitrary 32-byte message hash with recoverable ECDSA
    ///
    /// Used by the claim protocol, where the hash comes from the claims
    /// contract's own hashing entry point.
    pub fn sign_hash(&self, hash: B256) -> Result<Signature> {
        use alloy::signers::SignerSync;

        self.signer
            .sign_hash_sync(&hash)
            .map_err(|e| Error::Wallet(format!("hash signing failed: {}", e)))
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for MnemonicWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MnemonicWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
