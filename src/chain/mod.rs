//! Chain client adapter
//!
//! The narrow set of blockchain read/write operations the rest of the crate
//! needs, expressed as an injected capability rather than an ambient provider
//! handle. Every component takes its client explicitly; nothing in this crate
//! touches a process-wide singleton.

mod client;
mod rpc;

#[cfg(test)]
pub mod mock;

pub use client::ChainClient;
pub use rpc::RpcChainClient;
