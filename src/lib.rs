//! Transaction interpretation for a multi-chain custody wallet.
//!
//! Raw transactions come in from chain ingestion as opaque call data. The
//! [`TransactionDecoder`] resolves contract interfaces (unwrapping one proxy
//! hop), decodes arguments and returns a [`TypedTransaction`]: an ERC20
//! transfer, one of the custody MultiSig wallet operations, or the input
//! unchanged when nothing matches.

pub mod classifier;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod logging;
pub mod store;

pub use classifier::TransactionDecoder;
pub use domain::chain::{ChainAddress, ChainType};
pub use domain::tx::{MetaValue, Metadata, RawTransaction, TxType, TypedTransaction};
pub use error::{DecodeError, Result};
pub use infrastructure::abi::{AbiRepository, RepositoryOptions};
pub use store::{AbiCache, TokenInfo, TokenRegistry};
