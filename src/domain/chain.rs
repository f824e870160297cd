//! Chain identifiers and chain-qualified addresses

use std::fmt;
use std::str::FromStr;

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};

/// Chains the custody backend tracks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainType {
    Ethereum,
    Sepolia,
    Polygon,
    Bsc,
    Base,
    Arbitrum,
    Optimism,
    Bitcoin,
    Solana,
}

impl ChainType {
    pub const ALL: [ChainType; 9] = [
        ChainType::Ethereum,
        ChainType::Sepolia,
        ChainType::Polygon,
        ChainType::Bsc,
        ChainType::Base,
        ChainType::Arbitrum,
        ChainType::Optimism,
        ChainType::Bitcoin,
        ChainType::Solana,
    ];

    /// EIP-155 chain id, `None` for non-EVM chains
    pub fn evm_chain_id(self) -> Option<u64> {
        match self {
            ChainType::Ethereum => Some(1),
            ChainType::Sepolia => Some(11_155_111),
            ChainType::Polygon => Some(137),
            ChainType::Bsc => Some(56),
            ChainType::Base => Some(8453),
            ChainType::Arbitrum => Some(42161),
            ChainType::Optimism => Some(10),
            ChainType::Bitcoin | ChainType::Solana => None,
        }
    }

    pub fn is_evm(self) -> bool {
        self.evm_chain_id().is_some()
    }

    /// Symbol of the chain's native coin
    pub fn native_symbol(self) -> &'static str {
        match self {
            ChainType::Ethereum
            | ChainType::Sepolia
            | ChainType::Base
            | ChainType::Arbitrum
            | ChainType::Optimism => "ETH",
            ChainType::Polygon => "POL",
            ChainType::Bsc => "BNB",
            ChainType::Bitcoin => "BTC",
            ChainType::Solana => "SOL",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChainType::Ethereum => "ethereum",
            ChainType::Sepolia => "sepolia",
            ChainType::Polygon => "polygon",
            ChainType::Bsc => "bsc",
            ChainType::Base => "base",
            ChainType::Arbitrum => "arbitrum",
            ChainType::Optimism => "optimism",
            ChainType::Bitcoin => "bitcoin",
            ChainType::Solana => "solana",
        }
    }
}

impl fmt::Display for ChainType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChainType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ChainType::ALL
            .into_iter()
            .find(|chain| chain.as_str() == wanted)
            .ok_or_else(|| format!("unknown chain '{s}'"))
    }
}

/// An EVM address qualified by the chain it lives on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainAddress {
    pub chain: ChainType,
    pub address: Address,
}

impl ChainAddress {
    pub fn new(chain: ChainType, address: Address) -> Self {
        Self { chain, address }
    }

    pub fn is_zero(&self) -> bool {
        self.address == Address::ZERO
    }

    /// Lowercase hex form used as a storage key
    pub fn address_hex(&self) -> String {
        format!("{:#x}", self.address)
    }
}

impl fmt::Display for ChainAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#x}", self.chain, self.address)
    }
}
