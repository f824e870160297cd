//! ABI decoder trait and decoded argument types

use std::collections::HashMap;

use alloy_primitives::{Address, B256, I256, U256};
use serde::{Deserialize, Serialize};

use super::ContractAbi;
use crate::error::{DecodeError, Result};

/// A decoded argument value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum DecodedValue {
    Address(Address),
    /// `bytesN`; the word is right-padded and `size` gives N
    FixedBytes { word: B256, size: usize },
    Uint { value: U256, bits: usize },
    Int { value: I256, bits: usize },
    Bool(bool),
    Bytes(Vec<u8>),
    String(String),
    Array(Vec<DecodedValue>),
    Tuple(Vec<DecodedValue>),
    /// Values the engine has no representation for
    Null,
}

impl DecodedValue {
    pub fn kind(&self) -> String {
        match self {
            DecodedValue::Address(_) => "address".into(),
            DecodedValue::FixedBytes { size, .. } => format!("bytes{size}"),
            DecodedValue::Uint { bits, .. } => format!("uint{bits}"),
            DecodedValue::Int { bits, .. } => format!("int{bits}"),
            DecodedValue::Bool(_) => "bool".into(),
            DecodedValue::Bytes(_) => "bytes".into(),
            DecodedValue::String(_) => "string".into(),
            DecodedValue::Array(_) => "array".into(),
            DecodedValue::Tuple(_) => "tuple".into(),
            DecodedValue::Null => "null".into(),
        }
    }
}

/// Arguments of one decoded call, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecodedArgs {
    /// Method the arguments belong to
    pub method: String,
    names: Vec<String>,
    values: HashMap<String, DecodedValue>,
}

impl DecodedArgs {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            ..Self::default()
        }
    }

    /// Record an argument; unnamed parameters are keyed `arg{n}`
    pub fn push(&mut self, name: &str, value: DecodedValue) {
        let key = if name.trim().is_empty() {
            format!("arg{}", self.names.len())
        } else {
            name.to_string()
        };
        self.names.push(key.clone());
        self.values.insert(key, value);
    }

    /// Key of the argument at `index`
    pub fn key_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    pub fn get(&self, key: &str) -> Option<&DecodedValue> {
        self.values.get(key)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.names
            .iter()
            .filter_map(|name| self.values.get(name).map(|v| (name.as_str(), v)))
    }

    fn require(&self, key: &str) -> Result<&DecodedValue> {
        match self.values.get(key) {
            None => Err(DecodeError::ArgumentMissing {
                key: key.to_string(),
            }),
            Some(DecodedValue::Null) => Err(DecodeError::ArgumentNilValue {
                key: key.to_string(),
            }),
            Some(value) => Ok(value),
        }
    }

    pub fn get_address(&self, key: &str) -> Result<Address> {
        match self.require(key)? {
            DecodedValue::Address(address) => Ok(*address),
            other => Err(mismatch(key, "address", other)),
        }
    }

    /// A zero identifier is treated as nil.
    pub fn get_bytes32(&self, key: &str) -> Result<B256> {
        match self.require(key)? {
            DecodedValue::FixedBytes { word, size: 32 } if word.is_zero() => {
                Err(DecodeError::ArgumentNilValue {
                    key: key.to_string(),
                })
            }
            DecodedValue::FixedBytes { word, size: 32 } => Ok(*word),
            other => Err(mismatch(key, "bytes32", other)),
        }
    }

    pub fn get_big_int(&self, key: &str) -> Result<U256> {
        match self.require(key)? {
            DecodedValue::Uint { value, .. } => Ok(*value),
            other => Err(mismatch(key, "uint256", other)),
        }
    }

    pub fn get_uint64(&self, key: &str) -> Result<u64> {
        match self.require(key)? {
            DecodedValue::Uint { value, bits } => {
                u64::try_from(*value).map_err(|_| DecodeError::ArgumentTypeMismatch {
                    key: key.to_string(),
                    expected: "uint64",
                    got: format!("uint{bits} (overflows uint64)"),
                })
            }
            other => Err(mismatch(key, "uint64", other)),
        }
    }
}

fn mismatch(key: &str, expected: &'static str, got: &DecodedValue) -> DecodeError {
    DecodeError::ArgumentTypeMismatch {
        key: key.to_string(),
        expected,
        got: got.kind(),
    }
}

/// Trait for ABI decoding implementations
///
/// This trait abstracts over the actual ABI decoding implementation,
/// allowing us to swap out alloy-dyn-abi for a different library if needed.
pub trait AbiDecoder: Send + Sync {
    /// Decode call data against an interface
    ///
    /// # Arguments
    /// * `abi` - The interface to decode with
    /// * `method` - When given, the method's selector must match the data;
    ///   otherwise the method is found by the data's selector
    /// * `data` - The call data bytes (including the 4-byte selector)
    fn decode_arguments(
        &self,
        abi: &ContractAbi,
        method: Option<&str>,
        data: &[u8],
    ) -> Result<DecodedArgs>;
}
