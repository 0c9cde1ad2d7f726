//! Contract ABI bindings and typed call wrappers
//!
//! The claims contract is an external collaborator: this crate models it only
//! through the operations it calls and the ABI it guarantees. Claims are
//! addressed by `(claimId, index)` and authorized with the hash-based signing
//! scheme; the canonical hash always comes from the contract's own
//! `computeSignatureHash` entry point so signer and verifier agree bit for bit.

use crate::chain::ChainClient;
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, B256, U256};
use alloy::sol;
use alloy::sol_types::SolCall;

sol! {
    /// Minimal ERC-20 surface used by discovery and sweeping.
    interface IERC20 {
        function balanceOf(address owner) external view returns (uint256);
        function transfer(address to, uint256 value) external returns (bool);
        function approve(address spender, uint256 value) external returns (bool);
        function symbol() external view returns (string);
        function decimals() external view returns (uint8);
    }

    /// The claims ("token drop") contract.
    ///
    /// One claim record per (owner, index); a record is live while its
    /// quantity is positive and is deleted once redeemed or withdrawn.
    interface ITokenDrop {
        function dropCount(address owner) external view returns (uint256);
        function getDrop(address owner, uint256 index)
            external view returns (address token, uint256 dropId, uint256 quantity);
        function computeSignatureHash(address recipient, uint256 dropId)
            external view returns (bytes32);
        function redeemFor(
            address recipient, uint256 dropId, uint256 index,
            uint8 v, bytes32 r, bytes32 s
        ) external;
        function withdraw(uint256 index, uint256 dropId) external;
        function deposit(address token, address[] recipients, uint256 quantity) external;
    }
}

/// Typed read/encode wrapper for an ERC-20 token
pub struct Erc20<'a> {
    client: &'a dyn ChainClient,
    /// Token contract address
    pub address: Address,
}

impl<'a> Erc20<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    pub async fn balance_of(&self, owner: Address) -> Result<U256> {
        let data = IERC20::balanceOfCall { owner }.abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        Ok(IERC20::balanceOfCall::abi_decode_returns(&ret)?)
    }

    pub async fn symbol(&self) -> Result<String> {
        let data = IERC20::symbolCall {}.abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        Ok(IERC20::symbolCall::abi_decode_returns(&ret)?)
    }

    pub async fn decimals(&self) -> Result<u8> {
        let data = IERC20::decimalsCall {}.abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        Ok(IERC20::decimalsCall::abi_decode_returns(&ret)?)
    }

    /// Calldata for `transfer(to, value)`
    pub fn transfer_calldata(to: Address, value: U256) -> Bytes {
        IERC20::transferCall { to, value }.abi_encode().into()
    }

    /// Calldata for `approve(spender, value)`
    pub fn approve_calldata(spender: Address, value: U256) -> Bytes {
        IERC20::approveCall { spender, value }.abi_encode().into()
    }
}

/// One claim record as reported by the claims contract
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DropInfo {
    /// Underlying token the claim pays out in
    pub token: Address,
    /// Claim identifier the signature scheme is keyed by
    pub claim_id: U256,
    /// Remaining quantity; zero means the record is logically deleted
    pub quantity: U256,
}

/// Typed read/encode wrapper for the claims contract
pub struct ClaimsContract<'a> {
    client: &'a dyn ChainClient,
    /// Claims contract address
    pub address: Address,
}

impl<'a> ClaimsContract<'a> {
    pub fn new(client: &'a dyn ChainClient, address: Address) -> Self {
        Self { client, address }
    }

    /// Number of claim records belonging to `owner`
    pub async fn drop_count(&self, owner: Address) -> Result<u64> {
        let data = ITokenDrop::dropCountCall { owner }.abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        let count = ITokenDrop::dropCountCall::abi_decode_returns(&ret)?;
        count
            .try_into()
            .map_err(|_| Error::Chain(format!("drop count out of range: {}", count)))
    }

    /// Fetch the claim record at `index` in the owner's claim list
    pub async fn get_drop(&self, owner: Address, index: U256) -> Result<DropInfo> {
        let data = ITokenDrop::getDropCall { owner, index }.abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        let drop = ITokenDrop::getDropCall::abi_decode_returns(&ret)?;
        Ok(DropInfo {
            token: drop.token,
            claim_id: drop.dropId,
            quantity: drop.quantity,
        })
    }

    /// Fetch the canonical signature hash for `(recipient, claim_id)` from the
    /// contract's own hashing entry point.
    ///
    /// The preimage is the contract's responsibility to define; this core never
    /// invents its own hash construction.
    pub async fn compute_signature_hash(
        &self,
        recipient: Address,
        claim_id: U256,
    ) -> Result<B256> {
        let data = ITokenDrop::computeSignatureHashCall {
            recipient,
            dropId: claim_id,
        }
        .abi_encode();
        let ret = self.client.call(self.address, data.into()).await?;
        Ok(ITokenDrop::computeSignatureHashCall::abi_decode_returns(
            &ret,
        )?)
    }

    /// Calldata for the relayed redemption call
    pub fn redeem_for_calldata(
        recipient: Address,
        claim_id: U256,
        index: U256,
        v: u8,
        r: B256,
        s: B256,
    ) -> Bytes {
        ITokenDrop::redeemForCall {
            recipient,
            dropId: claim_id,
            index,
            v,
            r,
            s,
        }
        .abi_encode()
        .into()
    }

    /// Calldata for an owner withdrawing their own unredeemed claim
    pub fn withdraw_calldata(index: U256, claim_id: U256) -> Bytes {
        ITokenDrop::withdrawCall {
            index,
            dropId: claim_id,
        }
        .abi_encode()
        .into()
    }

    /// Calldata for creating one claim record per recipient
    pub fn deposit_calldata(token: Address, recipients: Vec<Address>, quantity: U256) -> Bytes {
        ITokenDrop::depositCall {
            token,
            recipients,
            quantity,
        }
        .abi_encode()
        .into()
    }
}
