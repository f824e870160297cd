//! Write-once metadata bag staged on a transaction during classification

use std::collections::BTreeMap;

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use crate::domain::chain::ChainAddress;
use crate::error::{DecodeError, Result};

pub const TOKEN_ADDRESS: &str = "token_address";
pub const TOKEN_SYMBOL: &str = "token_symbol";
pub const TOKEN_DECIMALS: &str = "token_decimals";
pub const RECIPIENT: &str = "recipient";
pub const AMOUNT: &str = "amount";
pub const REQUEST_ID: &str = "request_id";
pub const PROPOSAL_ID: &str = "proposal_id";
pub const WITHDRAWAL_NONCE: &str = "withdrawal_nonce";
pub const RECOVERY_ADDRESS: &str = "recovery_address";
pub const CONTRACT_ADDRESS: &str = "contract_address";

/// A single staged value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum MetaValue {
    Address(ChainAddress),
    Bytes32(B256),
    BigInt(U256),
    Uint64(u64),
    Str(String),
    /// Stored nil, e.g. a `null` persisted by an upstream component
    Null,
}

impl MetaValue {
    pub fn kind(&self) -> &'static str {
        match self {
            MetaValue::Address(_) => "address",
            MetaValue::Bytes32(_) => "bytes32",
            MetaValue::BigInt(_) => "bigint",
            MetaValue::Uint64(_) => "uint64",
            MetaValue::Str(_) => "string",
            MetaValue::Null => "null",
        }
    }
}

impl From<ChainAddress> for MetaValue {
    fn from(value: ChainAddress) -> Self {
        MetaValue::Address(value)
    }
}

impl From<B256> for MetaValue {
    fn from(value: B256) -> Self {
        MetaValue::Bytes32(value)
    }
}

impl From<U256> for MetaValue {
    fn from(value: U256) -> Self {
        MetaValue::BigInt(value)
    }
}

impl From<u64> for MetaValue {
    fn from(value: u64) -> Self {
        MetaValue::Uint64(value)
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_string())
    }
}

/// String-keyed metadata. Each key is written at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    entries: BTreeMap<String, MetaValue>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stage a value under `key`.
    ///
    /// Re-writing an identical value is a no-op; a different value is a conflict.
    pub fn insert_once(&mut self, key: &str, value: impl Into<MetaValue>) -> Result<()> {
        let value = value.into();
        match self.entries.get(key) {
            Some(existing) if *existing == value => Ok(()),
            Some(_) => Err(DecodeError::MetadataConflict {
                key: key.to_string(),
            }),
            None => {
                self.entries.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&MetaValue> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetaValue)> {
        self.entries.iter()
    }

    fn require(&self, key: &str) -> Result<&MetaValue> {
        match self.entries.get(key) {
            None => Err(DecodeError::ArgumentMissing {
                key: key.to_string(),
            }),
            Some(MetaValue::Null) => Err(DecodeError::ArgumentNilValue {
                key: key.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    pub fn get_address(&self, key: &str) -> Result<ChainAddress> {
        match self.require(key)? {
            MetaValue::Address(address) => Ok(*address),
            other => Err(mismatch(key, "address", other)),
        }
    }

    /// A zero identifier is treated as nil.
    pub fn get_bytes32(&self, key: &str) -> Result<B256> {
        match self.require(key)? {
            MetaValue::Bytes32(value) if value.is_zero() => Err(DecodeError::ArgumentNilValue {
                key: key.to_string(),
            }),
            MetaValue::Bytes32(value) => Ok(*value),
            other => Err(mismatch(key, "bytes32", other)),
        }
    }

    pub fn get_big_int(&self, key: &str) -> Result<U256> {
        match self.require(key)? {
            MetaValue::BigInt(value) => Ok(*value),
            MetaValue::Uint64(value) => Ok(U256::from(*value)),
            other => Err(mismatch(key, "bigint", other)),
        }
    }

    pub fn get_uint64(&self, key: &str) -> Result<u64> {
        match self.require(key)? {
            MetaValue::Uint64(value) => Ok(*value),
            MetaValue::BigInt(value) => u64::try_from(*value).map_err(|_| {
                DecodeError::ArgumentTypeMismatch {
                    key: key.to_string(),
                    expected: "uint64",
                    got: "bigint (overflows uint64)".to_string(),
                }
            }),
            other => Err(mismatch(key, "uint64", other)),
        }
    }

    pub fn get_string(&self, key: &str) -> Result<String> {
        match self.require(key)? {
            MetaValue::Str(value) => Ok(value.clone()),
            other => Err(mismatch(key, "string", other)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, got: &MetaValue) -> DecodeError {
    DecodeError::ArgumentTypeMismatch {
        key: key.to_string(),
        expected,
        got: got.kind().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chain::ChainType;
    use alloy_primitives::Address;

    #[test]
    fn test_getter_distinguishes_failures() {
        let mut meta = Metadata::new();
        meta.insert_once(AMOUNT, "not a number").unwrap();
        meta.insert_once(REQUEST_ID, MetaValue::Null).unwrap();

        assert!(matches!(
            meta.get_big_int(RECIPIENT),
            Err(DecodeError::ArgumentMissing { .. })
        ));
        assert!(matches!(
            meta.get_big_int(AMOUNT),
            Err(DecodeError::ArgumentTypeMismatch { .. })
        ));
        assert!(matches!(
            meta.get_bytes32(REQUEST_ID),
            Err(DecodeError::ArgumentNilValue { .. })
        ));
    }

    #[test]
    fn test_zero_identifier_is_nil() {
        let mut meta = Metadata::new();
        meta.insert_once(PROPOSAL_ID, B256::ZERO).unwrap();
        assert!(matches!(
            meta.get_bytes32(PROPOSAL_ID),
            Err(DecodeError::ArgumentNilValue { .. })
        ));
    }

    #[test]
    fn test_insert_once() {
        let mut meta = Metadata::new();
        let token = ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(1));
        meta.insert_once(TOKEN_ADDRESS, token).unwrap();
        meta.insert_once(TOKEN_ADDRESS, token).unwrap();

        let other = ChainAddress::new(ChainType::Ethereum, Address::repeat_byte(2));
        assert!(matches!(
            meta.insert_once(TOKEN_ADDRESS, other),
            Err(DecodeError::MetadataConflict { .. })
        ));
        assert_eq!(meta.get_address(TOKEN_ADDRESS).unwrap(), token);
    }

    #[test]
    fn test_uint64_narrowing() {
        let mut meta = Metadata::new();
        meta.insert_once(WITHDRAWAL_NONCE, U256::from(7u64)).unwrap();
        meta.insert_once(AMOUNT, U256::MAX).unwrap();
        assert_eq!(meta.get_uint64(WITHDRAWAL_NONCE).unwrap(), 7);
        assert!(meta.get_uint64(AMOUNT).is_err());
    }

    #[test]
    fn test_json_persistence() {
        let mut meta = Metadata::new();
        meta.insert_once(TOKEN_SYMBOL, "USDC").unwrap();
        meta.insert_once(TOKEN_DECIMALS, 6u64).unwrap();
        meta.insert_once(REQUEST_ID, MetaValue::Null).unwrap();

        let json = serde_json::to_string(&meta).unwrap();
        let back: Metadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back, meta);
    }
}
