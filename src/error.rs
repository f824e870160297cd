//! Error types for ABI resolution and transaction classification

use thiserror::Error;

use crate::domain::tx::TxType;

/// Errors produced by the decoding engine.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("artifact not found: {name}")]
    ArtifactNotFound { name: String },

    #[error("artifact {artifact} is malformed: {reason}")]
    ArtifactMalformed { artifact: String, reason: String },

    #[error("contract {address} has no verified interface")]
    ContractUnverified { address: String },

    #[error("explorer lookup for {address} failed: {reason}")]
    ExplorerFailed { address: String, reason: String },

    #[error("selector mismatch for {method}: expected 0x{expected}, got 0x{got}")]
    SelectorMismatch {
        method: String,
        expected: String,
        got: String,
    },

    #[error("method not found: {method}")]
    MethodNotFound { method: String },

    #[error("argument missing: {key}")]
    ArgumentMissing { key: String },

    #[error("argument {key} has type {got}, expected {expected}")]
    ArgumentTypeMismatch {
        key: String,
        expected: &'static str,
        got: String,
    },

    #[error("argument {key} is nil")]
    ArgumentNilValue { key: String },

    #[error("payload too short: {len} bytes")]
    PayloadTooShort { len: usize },

    #[error("payload length {len} is not a multiple of 32")]
    PayloadLengthInvalid { len: usize },

    #[error("ABI decode failed: {reason}")]
    AbiDecodeFailed { reason: String },

    #[error("chain call failed: {reason}")]
    ChainCallFailed { reason: String },

    #[error("chain not supported: {chain}")]
    ChainNotSupported { chain: String },

    #[error("transaction type is {got}, expected {expected}")]
    TypeMismatch { expected: TxType, got: TxType },

    #[error("missing/invalid field: {key}")]
    InvalidField {
        key: String,
        #[source]
        source: Box<DecodeError>,
    },

    #[error("metadata key {key} already holds a different value")]
    MetadataConflict { key: String },

    #[error("deadline exceeded after {ms}ms")]
    DeadlineExceeded { ms: u64 },
}

impl DecodeError {
    /// Errors meaning "this is not the method we were testing for".
    ///
    /// The classifier folds these into a quiet no-match; everything else
    /// is logged loudly before falling through.
    pub fn is_no_match(&self) -> bool {
        matches!(
            self,
            DecodeError::SelectorMismatch { .. }
                | DecodeError::MethodNotFound { .. }
                | DecodeError::ArgumentMissing { .. }
        )
    }

    /// Wrap a getter error as a builder field error.
    pub(crate) fn field(key: &str, source: DecodeError) -> Self {
        DecodeError::InvalidField {
            key: key.to_string(),
            source: Box::new(source),
        }
    }
}

pub type Result<T, E = DecodeError> = std::result::Result<T, E>;
