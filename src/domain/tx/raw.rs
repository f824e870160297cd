//! Raw transactions as produced by chain ingestion

use std::fmt;

use alloy_primitives::{Bytes, B256, U256};
use serde::{Deserialize, Serialize};

use super::metadata::Metadata;
use crate::domain::chain::{ChainAddress, ChainType};

/// Classification tag carried by a transaction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxType {
    #[default]
    #[serde(rename = "")]
    Untyped,
    #[serde(rename = "contract_call")]
    ContractCall,
    #[serde(rename = "native_transfer")]
    NativeTransfer,
    #[serde(rename = "contract_deploy")]
    ContractDeploy,
    #[serde(rename = "erc20_transfer")]
    Erc20Transfer,
    #[serde(rename = "multisig_withdrawal_request")]
    MultiSigWithdrawalRequest,
    #[serde(rename = "multisig_sign_withdrawal")]
    MultiSigSignWithdrawal,
    #[serde(rename = "multisig_execute_withdrawal")]
    MultiSigExecuteWithdrawal,
    #[serde(rename = "multisig_add_supported_token")]
    MultiSigAddSupportedToken,
    #[serde(rename = "multisig_remove_supported_token")]
    MultiSigRemoveSupportedToken,
    #[serde(rename = "multisig_recovery_request")]
    MultiSigRecoveryRequest,
    #[serde(rename = "multisig_cancel_recovery")]
    MultiSigCancelRecovery,
    #[serde(rename = "multisig_execute_recovery")]
    MultiSigExecuteRecovery,
    #[serde(rename = "multisig_propose_recovery_address")]
    MultiSigProposeRecoveryAddress,
    #[serde(rename = "multisig_sign_recovery_address")]
    MultiSigSignRecoveryAddress,
}

impl TxType {
    /// Empty and generic contract-call tags both mean "not classified yet"
    pub fn is_untyped(self) -> bool {
        matches!(self, TxType::Untyped | TxType::ContractCall)
    }

    pub fn is_multisig(self) -> bool {
        matches!(
            self,
            TxType::MultiSigWithdrawalRequest
                | TxType::MultiSigSignWithdrawal
                | TxType::MultiSigExecuteWithdrawal
                | TxType::MultiSigAddSupportedToken
                | TxType::MultiSigRemoveSupportedToken
                | TxType::MultiSigRecoveryRequest
                | TxType::MultiSigCancelRecovery
                | TxType::MultiSigExecuteRecovery
                | TxType::MultiSigProposeRecoveryAddress
                | TxType::MultiSigSignRecoveryAddress
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TxType::Untyped => "",
            TxType::ContractCall => "contract_call",
            TxType::NativeTransfer => "native_transfer",
            TxType::ContractDeploy => "contract_deploy",
            TxType::Erc20Transfer => "erc20_transfer",
            TxType::MultiSigWithdrawalRequest => "multisig_withdrawal_request",
            TxType::MultiSigSignWithdrawal => "multisig_sign_withdrawal",
            TxType::MultiSigExecuteWithdrawal => "multisig_execute_withdrawal",
            TxType::MultiSigAddSupportedToken => "multisig_add_supported_token",
            TxType::MultiSigRemoveSupportedToken => "multisig_remove_supported_token",
            TxType::MultiSigRecoveryRequest => "multisig_recovery_request",
            TxType::MultiSigCancelRecovery => "multisig_cancel_recovery",
            TxType::MultiSigExecuteRecovery => "multisig_execute_recovery",
            TxType::MultiSigProposeRecoveryAddress => "multisig_propose_recovery_address",
            TxType::MultiSigSignRecoveryAddress => "multisig_sign_recovery_address",
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxType::Untyped => f.write_str("<untyped>"),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Transaction data parsed by ingestion - chain agnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction {
    pub hash: B256,
    pub chain: ChainType,
    pub from: ChainAddress,
    #[serde(default)]
    pub to: Option<ChainAddress>,
    #[serde(default)]
    pub value: U256,
    #[serde(default)]
    pub data: Bytes,
    #[serde(default)]
    pub nonce: u64,
    #[serde(default)]
    pub gas_limit: u64,
    #[serde(default)]
    pub gas_price: U256,
    #[serde(default)]
    pub block_number: Option<u64>,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, rename = "type")]
    pub tx_type: TxType,
}

impl RawTransaction {
    /// Leading four bytes of the call data, if present
    pub fn selector(&self) -> Option<[u8; 4]> {
        self.data.get(..4).and_then(|s| s.try_into().ok())
    }

    pub fn has_call_data(&self) -> bool {
        self.data.len() >= 4
    }
}
