//! In-process caches and token registries

pub mod abi_cache;
pub mod tokens;

pub use abi_cache::{AbiCache, CacheKey};
pub use tokens::{
    LayeredTokenRegistry, SqliteTokenRegistry, StaticTokenRegistry, TokenInfo, TokenRegistry,
};
