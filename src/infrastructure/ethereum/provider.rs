//! Read-only chain access through Alloy providers
//!
//! One provider per configured chain. Only `eth_call` is needed: the engine
//! reads a proxy's implementation address and nothing else.

use std::collections::HashMap;
use std::fmt;

use alloy::network::Ethereum;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{
    fillers::{BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller},
    Identity, Provider, ProviderBuilder, RootProvider,
};
use alloy::rpc::types::{TransactionInput, TransactionRequest};
use anyhow::{Context, Result};

use crate::domain::chain::{ChainAddress, ChainType};

/// Read-only contract calls
#[async_trait::async_trait]
pub trait ChainClient: Send + Sync + 'static {
    /// Whether calls on `chain` can be served at all
    fn supports(&self, chain: ChainType) -> bool;

    /// Execute `eth_call` against `to` and return the raw result bytes
    async fn call_contract(
        &self,
        from: Option<Address>,
        to: &ChainAddress,
        data: Bytes,
    ) -> Result<Bytes>;
}

/// Endpoint configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderConfig {
    /// HTTP JSON-RPC endpoint
    Http(String),
    /// WebSocket endpoint
    WebSocket(String),
}

impl ProviderConfig {
    /// Pick the transport from the URL scheme
    pub fn from_url(url: &str) -> Self {
        if url.starts_with("ws://") || url.starts_with("wss://") {
            ProviderConfig::WebSocket(url.to_string())
        } else {
            ProviderConfig::Http(url.to_string())
        }
    }

    /// Get display name for this endpoint
    pub fn display(&self) -> &str {
        match self {
            ProviderConfig::Http(url) | ProviderConfig::WebSocket(url) => url,
        }
    }
}

// Both transports produce the same filled provider type
type FilledProvider = FillProvider<
    JoinFill<
        Identity,
        JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
    >,
    RootProvider,
    Ethereum,
>;

struct Endpoint {
    provider: FilledProvider,
    display: String,
}

/// `ChainClient` backed by one Alloy provider per chain
#[derive(Default)]
pub struct AlloyChainClient {
    endpoints: HashMap<ChainType, Endpoint>,
}

impl fmt::Debug for AlloyChainClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.endpoints.iter().map(|(k, v)| (k, &v.display)))
            .finish()
    }
}

impl AlloyChainClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connect a provider for `chain`, replacing any previous one
    pub async fn connect(&mut self, chain: ChainType, config: ProviderConfig) -> Result<()> {
        if !chain.is_evm() {
            anyhow::bail!("{chain} is not an EVM chain");
        }

        let provider = match &config {
            ProviderConfig::Http(url) => {
                let rpc_url = url.parse().context("Invalid HTTP URL")?;
                ProviderBuilder::new().connect_http(rpc_url)
            }
            ProviderConfig::WebSocket(url) => ProviderBuilder::new()
                .connect(url)
                .await
                .context("Failed to create WebSocket provider")?,
        };

        tracing::debug!(%chain, endpoint = config.display(), "connected chain provider");
        self.endpoints.insert(
            chain,
            Endpoint {
                provider,
                display: config.display().to_string(),
            },
        );
        Ok(())
    }

    pub fn chains(&self) -> impl Iterator<Item = ChainType> + '_ {
        self.endpoints.keys().copied()
    }
}

#[async_trait::async_trait]
impl ChainClient for AlloyChainClient {
    fn supports(&self, chain: ChainType) -> bool {
        self.endpoints.contains_key(&chain)
    }

    async fn call_contract(
        &self,
        from: Option<Address>,
        to: &ChainAddress,
        data: Bytes,
    ) -> Result<Bytes> {
        let endpoint = self
            .endpoints
            .get(&to.chain)
            .with_context(|| format!("no provider configured for {}", to.chain))?;

        let mut request = TransactionRequest::default()
            .to(to.address)
            .input(TransactionInput::new(data));
        if let Some(from) = from {
            request = request.from(from);
        }

        let result = endpoint
            .provider
            .call(request)
            .await
            .with_context(|| format!("eth_call to {to} via {}", endpoint.display))?;
        Ok(result)
    }
}
