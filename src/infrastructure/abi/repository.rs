//! Contract interface resolution by logical name or address
//!
//! Address lookups go to the explorer once per address and are then served
//! from the shared [`AbiCache`]. A freshly fetched interface that exposes
//! `implementation() returns (address)` is treated as a proxy: the
//! implementation's interface is fetched and cached under the proxy's address.
//! Unwrapping stops after one hop, and any failure along the way keeps the
//! proxy's own interface.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, Bytes};

use crate::domain::abi::{AbiSource, ContractAbi, Method};
use crate::domain::chain::ChainAddress;
use crate::error::{DecodeError, Result};
use crate::infrastructure::abi::artifacts::ArtifactStore;
use crate::infrastructure::abi::explorer::ContractExplorer;
use crate::infrastructure::ethereum::ChainClient;
use crate::store::abi_cache::{AbiCache, CacheKey};

/// Logical name of the standard token interface
pub const ERC20_ABI: &str = "erc20";
/// Logical name of the custody wallet interface
pub const MULTISIG_ABI: &str = "multisig";

const IMPLEMENTATION_METHOD: &str = "implementation";

pub const DEFAULT_NETWORK_TIMEOUT: Duration = Duration::from_secs(10);

/// Tunables for [`AbiRepository`]
#[derive(Debug, Clone)]
pub struct RepositoryOptions {
    /// Logical name -> artifact id
    pub artifacts: HashMap<String, String>,
    /// Use the `erc20` artifact for unverified token contracts
    pub erc20_standard_fallback: bool,
    /// Upper bound for each explorer or chain call
    pub network_timeout: Duration,
}

impl Default for RepositoryOptions {
    fn default() -> Self {
        Self {
            artifacts: default_artifacts(),
            erc20_standard_fallback: false,
            network_timeout: DEFAULT_NETWORK_TIMEOUT,
        }
    }
}

pub fn default_artifacts() -> HashMap<String, String> {
    HashMap::from([
        (ERC20_ABI.to_string(), "ERC20".to_string()),
        (MULTISIG_ABI.to_string(), "MultiSigWallet".to_string()),
    ])
}

/// Resolves and caches contract interfaces
pub struct AbiRepository {
    artifacts: Arc<dyn ArtifactStore>,
    explorer: Arc<dyn ContractExplorer>,
    chain: Arc<dyn ChainClient>,
    cache: AbiCache,
    options: RepositoryOptions,
}

impl AbiRepository {
    pub fn new(
        artifacts: Arc<dyn ArtifactStore>,
        explorer: Arc<dyn ContractExplorer>,
        chain: Arc<dyn ChainClient>,
        cache: AbiCache,
        options: RepositoryOptions,
    ) -> Self {
        Self {
            artifacts,
            explorer,
            chain,
            cache,
            options,
        }
    }

    pub fn cache(&self) -> &AbiCache {
        &self.cache
    }

    pub fn options(&self) -> &RepositoryOptions {
        &self.options
    }

    /// Interface for a logical name such as `erc20` or `multisig`
    pub async fn resolve_by_name(&self, name: &str) -> Result<Arc<ContractAbi>> {
        let key = CacheKey::Name(name.to_string());
        if let Some(abi) = self.cache.get(&key).await {
            return Ok(abi);
        }

        let artifact = self
            .options
            .artifacts
            .get(name)
            .ok_or_else(|| DecodeError::ArtifactNotFound {
                name: name.to_string(),
            })?;

        let content = self
            .artifacts
            .load(artifact)
            .map_err(|e| DecodeError::ArtifactMalformed {
                artifact: artifact.clone(),
                reason: format!("{e:#}"),
            })?
            .ok_or_else(|| DecodeError::ArtifactNotFound {
                name: format!("{name} ({artifact})"),
            })?;

        let source = AbiSource::Artifact {
            name: name.to_string(),
            artifact: artifact.clone(),
        };
        let abi = Arc::new(ContractAbi::from_json(source, artifact, &content)?);
        tracing::debug!(name, artifact = %artifact, methods = abi.len(), "loaded artifact");

        self.cache.insert(key, abi.clone()).await;
        Ok(abi)
    }

    /// Interface deployed at `address`, unwrapping a single proxy hop
    pub async fn resolve_by_address(&self, address: &ChainAddress) -> Result<Arc<ContractAbi>> {
        if !address.chain.is_evm() {
            return Err(DecodeError::ChainNotSupported {
                chain: address.chain.to_string(),
            });
        }

        let key = CacheKey::Address(*address);
        if let Some(abi) = self.cache.get(&key).await {
            return Ok(abi);
        }

        let abi = Arc::new(self.fetch_verified(address).await?);
        self.cache.insert(key.clone(), abi.clone()).await;

        match self.unwrap_proxy(address, &abi).await {
            Ok(Some(implementation)) => {
                tracing::debug!(
                    proxy = %address,
                    source = %implementation.source,
                    "using implementation interface"
                );
                self.cache.insert(key, implementation.clone()).await;
                Ok(implementation)
            }
            Ok(None) => Ok(abi),
            Err(err) => {
                tracing::warn!(
                    proxy = %address,
                    error = %err,
                    "proxy resolution failed, keeping proxy interface"
                );
                Ok(abi)
            }
        }
    }

    /// Interface for a token contract.
    ///
    /// With `erc20_standard_fallback`, an unverified contract gets the
    /// standard `erc20` artifact instead of an error.
    pub async fn resolve_token(&self, address: &ChainAddress) -> Result<Arc<ContractAbi>> {
        match self.resolve_by_address(address).await {
            Err(DecodeError::ContractUnverified { .. }) if self.options.erc20_standard_fallback => {
                tracing::debug!(token = %address, "unverified token, using standard erc20");
                self.resolve_by_name(ERC20_ABI).await
            }
            other => other,
        }
    }

    async fn fetch_verified(&self, address: &ChainAddress) -> Result<ContractAbi> {
        let content = self
            .bounded(self.explorer.verified_interface(address))
            .await?
            .map_err(|e| DecodeError::ExplorerFailed {
                address: address.to_string(),
                reason: format!("{e:#}"),
            })?
            .ok_or_else(|| DecodeError::ContractUnverified {
                address: address.to_string(),
            })?;

        ContractAbi::from_json(
            AbiSource::Verified { address: *address },
            &address.to_string(),
            &content,
        )
    }

    /// `Ok(None)` when the interface is not a proxy
    async fn unwrap_proxy(
        &self,
        proxy: &ChainAddress,
        abi: &ContractAbi,
    ) -> Result<Option<Arc<ContractAbi>>> {
        let Some(method) = abi.method_by_name(IMPLEMENTATION_METHOD) else {
            return Ok(None);
        };
        check_implementation_signature(method)?;

        if !self.chain.supports(proxy.chain) {
            return Err(DecodeError::ChainNotSupported {
                chain: proxy.chain.to_string(),
            });
        }

        let call = self.chain.call_contract(
            None,
            proxy,
            Bytes::copy_from_slice(&method.selector),
        );
        let result = self
            .bounded(call)
            .await?
            .map_err(|e| DecodeError::ChainCallFailed {
                reason: format!("{e:#}"),
            })?;

        let implementation = ChainAddress::new(proxy.chain, implementation_address(&result)?);
        if implementation == *proxy {
            return Ok(None);
        }

        // Fetched fresh: a cached entry for the implementation may itself be unwrapped
        let target = self.fetch_verified(&implementation).await?;
        Ok(Some(Arc::new(target.with_source(AbiSource::Proxy {
            proxy: *proxy,
            implementation,
        }))))
    }

    async fn bounded<T>(&self, fut: impl Future<Output = T>) -> Result<T> {
        let limit = self.options.network_timeout;
        tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DecodeError::DeadlineExceeded {
                ms: limit.as_millis() as u64,
            })
    }
}

/// `implementation()` must take nothing and return a single address
fn check_implementation_signature(method: &Method) -> Result<()> {
    let returns_address = method.outputs.len() == 1 && method.outputs[0].kind == "address";
    if method.inputs.is_empty() && returns_address {
        Ok(())
    } else {
        Err(DecodeError::MethodNotFound {
            method: format!("{IMPLEMENTATION_METHOD}() returns (address)"),
        })
    }
}

/// Address from an ABI-encoded `address` return word
fn implementation_address(result: &[u8]) -> Result<Address> {
    let Some(word) = result.get(..32) else {
        return Err(DecodeError::PayloadTooShort { len: result.len() });
    };
    if word[..12].iter().any(|b| *b != 0) {
        return Err(DecodeError::AbiDecodeFailed {
            reason: "implementation() result has dirty high bytes".into(),
        });
    }
    let address = Address::from_slice(&word[12..]);
    if address.is_zero() {
        return Err(DecodeError::ArgumentNilValue {
            key: IMPLEMENTATION_METHOD.into(),
        });
    }
    Ok(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::ParamSpec;
    use crate::domain::selectors::IMPLEMENTATION;

    fn word_for(address: Address) -> Vec<u8> {
        let mut word = vec![0u8; 12];
        word.extend_from_slice(address.as_slice());
        word
    }

    #[test]
    fn test_implementation_address() {
        let target = Address::repeat_byte(0x5a);
        assert_eq!(implementation_address(&word_for(target)).unwrap(), target);

        assert!(matches!(
            implementation_address(&[0u8; 20]),
            Err(DecodeError::PayloadTooShort { len: 20 })
        ));
        assert!(matches!(
            implementation_address(&[0u8; 32]),
            Err(DecodeError::ArgumentNilValue { .. })
        ));

        let mut dirty = word_for(target);
        dirty[0] = 1;
        assert!(matches!(
            implementation_address(&dirty),
            Err(DecodeError::AbiDecodeFailed { .. })
        ));
    }

    #[test]
    fn test_implementation_signature() {
        let mut method = Method {
            name: "implementation".into(),
            signature: "implementation()".into(),
            selector: *IMPLEMENTATION,
            inputs: vec![],
            outputs: vec![ParamSpec {
                name: String::new(),
                kind: "address".into(),
            }],
        };
        assert!(check_implementation_signature(&method).is_ok());

        method.outputs[0].kind = "bytes32".into();
        assert!(check_implementation_signature(&method).is_err());

        method.outputs[0].kind = "address".into();
        method.inputs.push(ParamSpec {
            name: "slot".into(),
            kind: "uint256".into(),
        });
        assert!(check_implementation_signature(&method).is_err());
    }

    #[test]
    fn test_default_options() {
        let options = RepositoryOptions::default();
        assert_eq!(options.artifacts[ERC20_ABI], "ERC20");
        assert_eq!(options.artifacts[MULTISIG_ABI], "MultiSigWallet");
        assert!(!options.erc20_standard_fallback);
        assert_eq!(options.network_timeout, Duration::from_secs(10));
    }
}
