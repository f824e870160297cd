//! Ethereum infrastructure - Alloy provider implementations

mod provider;

pub use provider::{AlloyChainClient, ChainClient, ProviderConfig};
