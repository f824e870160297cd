//! Infrastructure layer - External service integrations
//!
//! This layer contains:
//! - Artifact stores and the Sourcify explorer client
//! - ABI decoding using alloy-dyn-abi and the caching ABI repository
//! - Alloy-based chain clients for read-only calls

pub mod abi;
pub mod ethereum;
