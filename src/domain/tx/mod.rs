//! Transaction records, staged metadata and typed variants

pub mod builders;
pub mod metadata;
mod raw;
mod typed;

pub use metadata::{MetaValue, Metadata};
pub use raw::{RawTransaction, TxType};
pub use typed::{
    ContractDeploy, Erc20Transfer, MultiSigExecuteWithdrawal, MultiSigProposeRecoveryAddress,
    MultiSigRecovery, MultiSigSignRecoveryAddress, MultiSigSignWithdrawal, MultiSigTokenSupport,
    MultiSigWithdrawalRequest, NativeTransfer, TypedTransaction,
};
