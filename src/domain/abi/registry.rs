//! Parsed contract interfaces - methods indexed by selector

use std::collections::HashMap;
use std::fmt;

use alloy_json_abi::{JsonAbi, Param};
use serde::{Deserialize, Serialize};

use crate::domain::chain::ChainAddress;
use crate::domain::selectors::{selector_hex, Selector};
use crate::error::{DecodeError, Result};

/// A method parameter specification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (may be empty)
    pub name: String,
    /// Solidity type (e.g., "address", "uint256", "(uint256,address)")
    pub kind: String,
}

impl From<&Param> for ParamSpec {
    fn from(param: &Param) -> Self {
        Self {
            name: param.name.clone(),
            kind: param.selector_type().into_owned(),
        }
    }
}

/// A method with its selector and typed inputs/outputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Full signature string (e.g., "transfer(address,uint256)")
    pub signature: String,
    pub selector: Selector,
    pub inputs: Vec<ParamSpec>,
    pub outputs: Vec<ParamSpec>,
}

impl Method {
    pub fn selector_hex(&self) -> String {
        selector_hex(self.selector)
    }
}

/// Where an interface came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AbiSource {
    /// Named artifact shipped with the deployment
    Artifact { name: String, artifact: String },
    /// Verified source fetched from the explorer
    Verified { address: ChainAddress },
    /// Implementation interface reached through a proxy
    Proxy {
        proxy: ChainAddress,
        implementation: ChainAddress,
    },
}

impl fmt::Display for AbiSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbiSource::Artifact { name, artifact } => write!(f, "artifact {name} ({artifact})"),
            AbiSource::Verified { address } => write!(f, "verified {address}"),
            AbiSource::Proxy {
                proxy,
                implementation,
            } => write!(f, "proxy {proxy} -> {implementation}"),
        }
    }
}

/// A contract interface
#[derive(Debug, Clone)]
pub struct ContractAbi {
    pub source: AbiSource,
    methods: Vec<Method>,
    /// Index into `methods` by selector; first method for a selector wins
    by_selector: HashMap<Selector, usize>,
}

impl ContractAbi {
    /// Parse an interface document.
    ///
    /// Accepts either a raw ABI array or an artifact object with an `abi` field.
    pub fn from_json(source: AbiSource, label: &str, content: &str) -> Result<Self> {
        let malformed = |reason: String| DecodeError::ArtifactMalformed {
            artifact: label.to_string(),
            reason,
        };

        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;
        let abi_value = if value.is_array() {
            value
        } else if let Some(abi) = value.get("abi") {
            abi.clone()
        } else {
            return Err(malformed("no ABI array found".into()));
        };

        let abi: JsonAbi = serde_json::from_value(abi_value).map_err(|e| malformed(e.to_string()))?;
        Ok(Self::from_json_abi(source, &abi))
    }

    pub fn from_json_abi(source: AbiSource, abi: &JsonAbi) -> Self {
        let methods = abi
            .functions()
            .map(|function| Method {
                name: function.name.clone(),
                signature: function.signature(),
                selector: function.selector().0,
                inputs: function.inputs.iter().map(ParamSpec::from).collect(),
                outputs: function.outputs.iter().map(ParamSpec::from).collect(),
            })
            .collect();
        Self::from_methods(source, methods)
    }

    pub fn from_methods(source: AbiSource, methods: Vec<Method>) -> Self {
        let mut by_selector = HashMap::new();
        for (idx, method) in methods.iter().enumerate() {
            by_selector.entry(method.selector).or_insert(idx);
        }
        Self {
            source,
            methods,
            by_selector,
        }
    }

    /// Same methods, different provenance
    pub fn with_source(&self, source: AbiSource) -> Self {
        Self {
            source,
            methods: self.methods.clone(),
            by_selector: self.by_selector.clone(),
        }
    }

    pub fn method_by_selector(&self, selector: Selector) -> Option<&Method> {
        self.by_selector.get(&selector).map(|&idx| &self.methods[idx])
    }

    /// First overload with this name
    pub fn method_by_name(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|m| m.name == name)
    }

    /// The overload of `name` whose selector is `selector`
    pub fn method_by_name_and_selector(&self, name: &str, selector: Selector) -> Option<&Method> {
        self.methods
            .iter()
            .find(|m| m.name == name && m.selector == selector)
    }

    pub fn methods(&self) -> impl Iterator<Item = &Method> {
        self.methods.iter()
    }

    pub fn len(&self) -> usize {
        self.methods.len()
    }

    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }
}
