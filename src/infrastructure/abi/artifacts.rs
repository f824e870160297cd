//! Artifact stores - named contract interface documents

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use walkdir::WalkDir;

/// Files larger than this are never interface documents
const MAX_ARTIFACT_BYTES: u64 = 5 * 1024 * 1024;

/// Supplies contract interface documents by artifact id
pub trait ArtifactStore: Send + Sync {
    /// Raw JSON for `artifact`, or `None` when the store does not have it
    fn load(&self, artifact: &str) -> anyhow::Result<Option<String>>;
}

/// Interfaces compiled into the binary
#[derive(Debug, Clone, Default)]
pub struct EmbeddedArtifacts;

impl EmbeddedArtifacts {
    const ERC20: &'static str = include_str!("../../../abis/ERC20.json");
    const MULTISIG: &'static str = include_str!("../../../abis/MultiSigWallet.json");
}

impl ArtifactStore for EmbeddedArtifacts {
    fn load(&self, artifact: &str) -> anyhow::Result<Option<String>> {
        Ok(match artifact {
            "ERC20" => Some(Self::ERC20.to_string()),
            "MultiSigWallet" => Some(Self::MULTISIG.to_string()),
            _ => None,
        })
    }
}

/// Artifacts discovered under a build output directory (`<artifact-id>.json`)
#[derive(Debug, Clone)]
pub struct DirectoryArtifactStore {
    root: PathBuf,
    index: HashMap<String, PathBuf>,
}

impl DirectoryArtifactStore {
    /// Walk `root` once and index every candidate JSON file by its stem.
    ///
    /// When two files share a stem the first one found wins.
    pub fn open(root: impl AsRef<Path>) -> anyhow::Result<Self> {
        let root = root.as_ref().to_path_buf();
        if !root.is_dir() {
            anyhow::bail!("artifact dir {} is not a directory", root.display());
        }

        let mut index = HashMap::new();
        for entry in WalkDir::new(&root)
            .follow_links(false)
            .into_iter()
            // The root itself is never pruned, even when named like a build dir
            .filter_entry(|e| e.depth() == 0 || !is_ignored_dir(e.path()))
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    tracing::debug!(error = %err, "skipping unreadable artifact entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }
            match entry.metadata() {
                Ok(meta) if meta.len() <= MAX_ARTIFACT_BYTES => {}
                _ => continue,
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                index
                    .entry(stem.to_string())
                    .or_insert_with(|| path.to_path_buf());
            }
        }

        tracing::debug!(root = %root.display(), artifacts = index.len(), "indexed artifact dir");
        Ok(Self { root, index })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl ArtifactStore for DirectoryArtifactStore {
    fn load(&self, artifact: &str) -> anyhow::Result<Option<String>> {
        let Some(path) = self.index.get(artifact) else {
            return Ok(None);
        };
        let content =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Ok(Some(content))
    }
}

/// Directory first, embedded interfaces as fallback
pub struct LayeredArtifactStore {
    stores: Vec<Box<dyn ArtifactStore>>,
}

impl LayeredArtifactStore {
    pub fn new(stores: Vec<Box<dyn ArtifactStore>>) -> Self {
        Self { stores }
    }
}

impl ArtifactStore for LayeredArtifactStore {
    fn load(&self, artifact: &str) -> anyhow::Result<Option<String>> {
        for store in &self.stores {
            if let Some(content) = store.load(artifact)? {
                return Ok(Some(content));
            }
        }
        Ok(None)
    }
}

/// Check if a path should be ignored
fn is_ignored_dir(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|name| {
            matches!(
                name,
                ".git" | "target" | "node_modules" | ".next" | "dist" | "build" | "cache"
            )
        })
        .unwrap_or(false)
}
