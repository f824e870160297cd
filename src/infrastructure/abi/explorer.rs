//! Verified contract interfaces from Sourcify

use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::chain::ChainAddress;

pub const DEFAULT_SOURCIFY_URL: &str = "https://sourcify.dev/server";

/// A source of verified contract interfaces
#[async_trait::async_trait]
pub trait ContractExplorer: Send + Sync + 'static {
    /// Interface JSON for `address`, or `None` if the contract is not verified
    async fn verified_interface(&self, address: &ChainAddress) -> Result<Option<String>>;
}

/// Sourcify API response structures
#[derive(Debug, Deserialize)]
struct SourcifyResponse {
    #[serde(default)]
    abi: Option<serde_json::Value>,
    #[serde(default)]
    name: Option<String>,
}

/// Sourcify v2 lookup client
#[derive(Debug, Clone)]
pub struct SourcifyExplorer {
    http: reqwest::Client,
    base_url: String,
}

impl SourcifyExplorer {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn contract_url(&self, chain_id: u64, address: &ChainAddress) -> String {
        format!(
            "{}/v2/contract/{}/{}?fields=abi,name",
            self.base_url,
            chain_id,
            address.address_hex()
        )
    }
}

#[async_trait::async_trait]
impl ContractExplorer for SourcifyExplorer {
    async fn verified_interface(&self, address: &ChainAddress) -> Result<Option<String>> {
        let chain_id = address
            .chain
            .evm_chain_id()
            .with_context(|| format!("{} has no EVM chain id", address.chain))?;

        let url = self.contract_url(chain_id, address);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .context("Failed to query Sourcify API")?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("Sourcify returned status {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read Sourcify response")?;
        parse_response(&body)
    }
}

fn parse_response(body: &str) -> Result<Option<String>> {
    let data: SourcifyResponse =
        serde_json::from_str(body).context("Failed to parse Sourcify response")?;
    match data.abi {
        Some(abi) if abi.is_array() => {
            tracing::debug!(contract = data.name.as_deref().unwrap_or("?"), "verified interface");
            Ok(Some(abi.to_string()))
        }
        _ => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::ChainType;
    use alloy_primitives::Address;

    #[test]
    fn test_contract_url() {
        let explorer =
            SourcifyExplorer::new("https://sourcify.dev/server/", Duration::from_secs(1)).unwrap();
        let address = ChainAddress::new(ChainType::Polygon, Address::repeat_byte(0xab));
        assert_eq!(
            explorer.contract_url(137, &address),
            "https://sourcify.dev/server/v2/contract/137/0xabababababababababababababababababababab?fields=abi,name"
        );
    }

    #[test]
    fn test_parse_response() {
        let body = r#"{"name":"Token","abi":[{"type":"function","name":"x","inputs":[],"outputs":[],"stateMutability":"view"}]}"#;
        let abi = parse_response(body).unwrap().unwrap();
        assert!(abi.starts_with('['));

        assert!(parse_response(r#"{"name":"Token"}"#).unwrap().is_none());
        assert!(parse_response(r#"{"abi":null}"#).unwrap().is_none());
        assert!(parse_response("<html>").is_err());
    }

    #[tokio::test]
    async fn test_non_evm_chain_rejected() {
        let explorer = SourcifyExplorer::new(DEFAULT_SOURCIFY_URL, Duration::from_secs(1)).unwrap();
        let address = ChainAddress::new(ChainType::Bitcoin, Address::ZERO);
        assert!(explorer.verified_interface(&address).await.is_err());
    }
}
