//! Domain layer - chain-independent models of interfaces and transactions

pub mod abi;
pub mod chain;
pub mod selectors;
pub mod tx;
