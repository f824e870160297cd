//! In-memory cache of resolved contract interfaces

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::domain::abi::ContractAbi;
use crate::domain::chain::ChainAddress;

/// Cache key: a logical artifact name or a contract address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Name(String),
    Address(ChainAddress),
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::Name(name) => write!(f, "name:{name}"),
            CacheKey::Address(address) => write!(f, "address:{address}"),
        }
    }
}

/// Shared interface cache. Entries are never invalidated.
///
/// Cloning yields another handle onto the same map.
#[derive(Clone, Default)]
pub struct AbiCache {
    entries: Arc<RwLock<HashMap<CacheKey, Arc<ContractAbi>>>>,
}

impl AbiCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, key: &CacheKey) -> Option<Arc<ContractAbi>> {
        self.entries.read().await.get(key).cloned()
    }

    /// Store `abi` under `key`; the last writer wins
    pub async fn insert(&self, key: CacheKey, abi: Arc<ContractAbi>) {
        self.entries.write().await.insert(key, abi);
    }

    pub async fn contains(&self, key: &CacheKey) -> bool {
        self.entries.read().await.contains_key(key)
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl fmt::Debug for AbiCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AbiCache").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::abi::AbiSource;
    use crate::domain::chain::ChainType;
    use alloy_primitives::Address;

    fn abi(name: &str) -> Arc<ContractAbi> {
        Arc::new(ContractAbi::from_methods(
            AbiSource::Artifact {
                name: name.into(),
                artifact: name.into(),
            },
            vec![],
        ))
    }

    #[tokio::test]
    async fn test_handles_share_entries() {
        let cache = AbiCache::new();
        let other = cache.clone();
        let key = CacheKey::Address(ChainAddress::new(ChainType::Base, Address::repeat_byte(7)));

        assert!(cache.get(&key).await.is_none());
        other.insert(key.clone(), abi("a")).await;
        assert!(cache.contains(&key).await);
        assert_eq!(cache.len().await, 1);

        // Name and address keys never collide
        assert!(!cache.contains(&CacheKey::Name("a".into())).await);
    }

    #[tokio::test]
    async fn test_last_writer_wins() {
        let cache = AbiCache::new();
        let key = CacheKey::Name("erc20".into());
        cache.insert(key.clone(), abi("first")).await;
        cache.insert(key.clone(), abi("second")).await;
        let stored = cache.get(&key).await.unwrap();
        assert_eq!(
            stored.source,
            AbiSource::Artifact {
                name: "second".into(),
                artifact: "second".into()
            }
        );
    }

    #[tokio::test]
    async fn test_concurrent_writers() {
        let cache = AbiCache::new();
        let mut handles = Vec::new();
        for i in 0..16u8 {
            let cache = cache.clone();
            handles.push(tokio::spawn(async move {
                let key = CacheKey::Address(ChainAddress::new(
                    ChainType::Ethereum,
                    Address::repeat_byte(i % 4),
                ));
                cache.insert(key.clone(), abi("x")).await;
                cache.get(&key).await.is_some()
            }));
        }
        for handle in handles {
            assert!(handle.await.unwrap());
        }
        assert_eq!(cache.len().await, 4);
    }
}
