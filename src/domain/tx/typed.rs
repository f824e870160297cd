//! Strongly typed transaction variants

use alloy_primitives::{B256, U256};
use serde::{Deserialize, Serialize};

use super::raw::{RawTransaction, TxType};
use crate::domain::chain::ChainAddress;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeTransfer {
    pub raw: RawTransaction,
    pub recipient: ChainAddress,
    pub amount: U256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractDeploy {
    pub raw: RawTransaction,
    /// Known once the deployment receipt has been seen
    pub contract_address: Option<ChainAddress>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Erc20Transfer {
    pub raw: RawTransaction,
    pub token_address: ChainAddress,
    pub recipient: ChainAddress,
    pub amount: U256,
    pub token_symbol: String,
    pub token_decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigWithdrawalRequest {
    pub raw: RawTransaction,
    pub token_address: ChainAddress,
    pub recipient: ChainAddress,
    pub amount: U256,
    pub withdrawal_nonce: u64,
    pub token_symbol: String,
    pub token_decimals: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigSignWithdrawal {
    pub raw: RawTransaction,
    pub request_id: B256,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigExecuteWithdrawal {
    pub raw: RawTransaction,
    pub request_id: B256,
}

/// Shared shape of add/remove supported token calls
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigTokenSupport {
    pub raw: RawTransaction,
    pub token_address: ChainAddress,
    pub token_symbol: String,
    pub token_decimals: u8,
}

/// Recovery request, cancel and execute carry no arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigRecovery {
    pub raw: RawTransaction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigProposeRecoveryAddress {
    pub raw: RawTransaction,
    pub recovery_address: ChainAddress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiSigSignRecoveryAddress {
    pub raw: RawTransaction,
    pub proposal_id: B256,
}

/// Result of decoding: either the untouched input or one typed variant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "variant", content = "tx", rename_all = "snake_case")]
pub enum TypedTransaction {
    Untyped(RawTransaction),
    NativeTransfer(NativeTransfer),
    ContractDeploy(ContractDeploy),
    Erc20Transfer(Erc20Transfer),
    MultiSigWithdrawalRequest(MultiSigWithdrawalRequest),
    MultiSigSignWithdrawal(MultiSigSignWithdrawal),
    MultiSigExecuteWithdrawal(MultiSigExecuteWithdrawal),
    MultiSigAddSupportedToken(MultiSigTokenSupport),
    MultiSigRemoveSupportedToken(MultiSigTokenSupport),
    MultiSigRecoveryRequest(MultiSigRecovery),
    MultiSigCancelRecovery(MultiSigRecovery),
    MultiSigExecuteRecovery(MultiSigRecovery),
    MultiSigProposeRecoveryAddress(MultiSigProposeRecoveryAddress),
    MultiSigSignRecoveryAddress(MultiSigSignRecoveryAddress),
}

impl TypedTransaction {
    /// The underlying record, including staged metadata and type tag
    pub fn raw(&self) -> &RawTransaction {
        match self {
            TypedTransaction::Untyped(raw) => raw,
            TypedTransaction::NativeTransfer(tx) => &tx.raw,
            TypedTransaction::ContractDeploy(tx) => &tx.raw,
            TypedTransaction::Erc20Transfer(tx) => &tx.raw,
            TypedTransaction::MultiSigWithdrawalRequest(tx) => &tx.raw,
            TypedTransaction::MultiSigSignWithdrawal(tx) => &tx.raw,
            TypedTransaction::MultiSigExecuteWithdrawal(tx) => &tx.raw,
            TypedTransaction::MultiSigAddSupportedToken(tx)
            | TypedTransaction::MultiSigRemoveSupportedToken(tx) => &tx.raw,
            TypedTransaction::MultiSigRecoveryRequest(tx)
            | TypedTransaction::MultiSigCancelRecovery(tx)
            | TypedTransaction::MultiSigExecuteRecovery(tx) => &tx.raw,
            TypedTransaction::MultiSigProposeRecoveryAddress(tx) => &tx.raw,
            TypedTransaction::MultiSigSignRecoveryAddress(tx) => &tx.raw,
        }
    }

    pub fn into_raw(self) -> RawTransaction {
        match self {
            TypedTransaction::Untyped(raw) => raw,
            TypedTransaction::NativeTransfer(tx) => tx.raw,
            TypedTransaction::ContractDeploy(tx) => tx.raw,
            TypedTransaction::Erc20Transfer(tx) => tx.raw,
            TypedTransaction::MultiSigWithdrawalRequest(tx) => tx.raw,
            TypedTransaction::MultiSigSignWithdrawal(tx) => tx.raw,
            TypedTransaction::MultiSigExecuteWithdrawal(tx) => tx.raw,
            TypedTransaction::MultiSigAddSupportedToken(tx)
            | TypedTransaction::MultiSigRemoveSupportedToken(tx) => tx.raw,
            TypedTransaction::MultiSigRecoveryRequest(tx)
            | TypedTransaction::MultiSigCancelRecovery(tx)
            | TypedTransaction::MultiSigExecuteRecovery(tx) => tx.raw,
            TypedTransaction::MultiSigProposeRecoveryAddress(tx) => tx.raw,
            TypedTransaction::MultiSigSignRecoveryAddress(tx) => tx.raw,
        }
    }

    pub fn tx_type(&self) -> TxType {
        self.raw().tx_type
    }

    pub fn is_typed(&self) -> bool {
        !matches!(self, TypedTransaction::Untyped(_))
    }
}
