//! Transaction classification
//!
//! [`TransactionDecoder::decode`] turns a raw transaction into its typed
//! variant. Already-typed input is rebuilt from its metadata and any error
//! there is returned. Untyped input is tried as an ERC20 transfer first and
//! as a MultiSig wallet call second. When neither matches, the input comes
//! back unchanged. Classification works on a private copy and never fails
//! an untyped transaction.

mod enrich;
mod erc20;
mod multisig;

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;

use crate::domain::abi::AbiDecoder;
use crate::domain::tx::builders;
use crate::domain::tx::{RawTransaction, TypedTransaction};
use crate::error::{DecodeError, Result};
use crate::infrastructure::abi::{AbiRepository, AlloyAbiDecoder, MULTISIG_ABI};
use crate::store::tokens::TokenRegistry;

pub use enrich::{NATIVE_COIN_DECIMALS, UNKNOWN_TOKEN_SYMBOL};

/// Classifies raw transactions. Cheap to share behind an `Arc`.
pub struct TransactionDecoder {
    abis: Arc<AbiRepository>,
    decoder: Arc<dyn AbiDecoder>,
    tokens: Arc<dyn TokenRegistry>,
}

impl TransactionDecoder {
    pub fn new(abis: Arc<AbiRepository>, tokens: Arc<dyn TokenRegistry>) -> Self {
        Self::with_decoder(abis, Arc::new(AlloyAbiDecoder::new()), tokens)
    }

    pub fn with_decoder(
        abis: Arc<AbiRepository>,
        decoder: Arc<dyn AbiDecoder>,
        tokens: Arc<dyn TokenRegistry>,
    ) -> Self {
        Self {
            abis,
            decoder,
            tokens,
        }
    }

    pub fn abis(&self) -> &AbiRepository {
        &self.abis
    }

    fn network_timeout(&self) -> Duration {
        self.abis.options().network_timeout
    }

    /// Classify `tx`.
    ///
    /// Errors only when `tx` already carries a typed tag whose metadata no
    /// longer satisfies that variant.
    pub async fn decode(&self, tx: &RawTransaction) -> Result<TypedTransaction> {
        if !tx.tx_type.is_untyped() {
            return builders::build(tx);
        }

        let Some(to) = tx.to else {
            return Ok(unchanged(tx));
        };
        if !tx.has_call_data() || !tx.chain.is_evm() {
            return Ok(unchanged(tx));
        }

        match erc20::classify(self, tx, to).await {
            Ok(Some(typed)) => return Ok(typed),
            Ok(None) => {}
            Err(err) if err.is_no_match() => {
                tracing::debug!(tx = %tx.hash, error = %err, "not an erc20 transfer");
            }
            Err(err) => {
                tracing::warn!(tx = %tx.hash, token = %to, error = %err, "erc20 decode failed, trying multisig");
            }
        }

        let abi = match self.abis.resolve_by_name(MULTISIG_ABI).await {
            Ok(abi) => abi,
            Err(err) => {
                tracing::error!(tx = %tx.hash, error = %err, "multisig interface unavailable");
                return Ok(unchanged(tx));
            }
        };

        match multisig::classify(self, tx, &abi).await {
            Ok(Some(typed)) => Ok(typed),
            Ok(None) => {
                tracing::debug!(tx = %tx.hash, "no known selector");
                Ok(unchanged(tx))
            }
            // The selector already matched a wallet method
            Err(err) => {
                tracing::error!(tx = %tx.hash, contract = %to, error = %err, "multisig decode failed");
                Ok(unchanged(tx))
            }
        }
    }

    /// [`decode`](Self::decode) bounded by a whole-call deadline
    pub async fn decode_within(
        &self,
        tx: &RawTransaction,
        deadline: Duration,
    ) -> Result<TypedTransaction> {
        tokio::time::timeout(deadline, self.decode(tx))
            .await
            .map_err(|_| DecodeError::DeadlineExceeded {
                ms: deadline.as_millis() as u64,
            })?
    }

    /// Decode a batch concurrently; results keep input order
    pub async fn decode_all(&self, txs: &[RawTransaction]) -> Vec<Result<TypedTransaction>> {
        join_all(txs.iter().map(|tx| self.decode(tx))).await
    }
}

fn unchanged(tx: &RawTransaction) -> TypedTransaction {
    TypedTransaction::Untyped(tx.clone())
}
