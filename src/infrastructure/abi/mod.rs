//! ABI infrastructure - artifact loading, explorer lookup, decoding and resolution

pub mod artifacts;
mod decoder;
pub mod explorer;
pub mod repository;

pub use artifacts::{ArtifactStore, DirectoryArtifactStore, EmbeddedArtifacts, LayeredArtifactStore};
pub use decoder::{extract_selector, AlloyAbiDecoder};
pub use explorer::{ContractExplorer, SourcifyExplorer};
pub use repository::{AbiRepository, RepositoryOptions, ERC20_ABI, MULTISIG_ABI};
