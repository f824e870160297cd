//! TOML configuration: ABI sources, explorer, chain endpoints and tokens

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use alloy_primitives::Address;
use anyhow::{Context, Result};
use serde::Deserialize;

use crate::domain::chain::{ChainAddress, ChainType};
use crate::infrastructure::abi::explorer::DEFAULT_SOURCIFY_URL;
use crate::infrastructure::abi::repository::{default_artifacts, RepositoryOptions};
use crate::logging::LogConfig;
use crate::store::tokens::{StaticTokenRegistry, TokenInfo};

pub const CONFIG_ENV: &str = "TXDECODE_CONFIG";
const APP_DIR: &str = "txdecode";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AbiConfig {
    /// Build output directory searched for `<artifact-id>.json`
    pub artifact_dir: Option<PathBuf>,
    /// Logical name -> artifact id; merged over the built-in defaults
    #[serde(default)]
    pub artifacts: HashMap<String, String>,
    #[serde(default)]
    pub erc20_standard_fallback: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExplorerConfig {
    #[serde(default = "default_explorer_url")]
    pub base_url: String,
    /// Also bounds every chain call and token lookup
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ExplorerConfig {
    fn default() -> Self {
        Self {
            base_url: default_explorer_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_explorer_url() -> String {
    DEFAULT_SOURCIFY_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainEndpoint {
    pub chain: ChainType,
    pub rpc: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenSpec {
    pub chain: ChainType,
    pub address: String,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub abi: AbiConfig,

    #[serde(default)]
    pub explorer: ExplorerConfig,

    #[serde(default)]
    pub chains: Vec<ChainEndpoint>,

    #[serde(default)]
    pub tokens: Vec<TokenSpec>,

    /// SQLite token table; defaults to the data dir when that file exists
    pub token_db: Option<PathBuf>,

    #[serde(default)]
    pub log: LogConfig,
}

impl TokenSpec {
    pub fn chain_address(&self) -> Result<ChainAddress> {
        let address: Address = self
            .address
            .trim()
            .parse()
            .with_context(|| format!("invalid token address {}", self.address))?;
        Ok(ChainAddress::new(self.chain, address))
    }

    pub fn display_symbol(&self) -> String {
        self.symbol
            .clone()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| short_addr(&self.address))
    }

    pub fn info(&self) -> TokenInfo {
        TokenInfo::new(self.display_symbol(), self.decimals.unwrap_or(18))
    }
}

impl Config {
    pub fn network_timeout(&self) -> Duration {
        Duration::from_secs(self.explorer.timeout_secs.max(1))
    }

    pub fn repository_options(&self) -> RepositoryOptions {
        let mut artifacts = default_artifacts();
        artifacts.extend(self.abi.artifacts.clone());
        RepositoryOptions {
            artifacts,
            erc20_standard_fallback: self.abi.erc20_standard_fallback,
            network_timeout: self.network_timeout(),
        }
    }

    pub fn static_tokens(&self) -> Result<StaticTokenRegistry> {
        let mut registry = StaticTokenRegistry::new();
        for spec in &self.tokens {
            registry.insert(spec.chain_address()?, spec.info());
        }
        Ok(registry)
    }

    pub fn token_db_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.token_db {
            return Some(path.clone());
        }
        data_dir()
            .map(|dir| dir.join("tokens.sqlite3"))
            .filter(|path| path.exists())
    }
}

/// Load the config file.
///
/// An explicit path must exist. Without one, a missing default file yields
/// the default config.
pub fn load(explicit: Option<&Path>) -> Result<Config> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match config_path() {
            Some(path) if path.exists() => path,
            _ => return Ok(Config::default()),
        },
    };
    let content =
        fs::read_to_string(&path).with_context(|| format!("read config {}", path.display()))?;
    parse(&content).with_context(|| format!("parse config {}", path.display()))
}

pub fn parse(content: &str) -> Result<Config> {
    Ok(toml::from_str::<Config>(content)?)
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join(APP_DIR).join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join(APP_DIR).join("config.toml"));
    }

    directories::ProjectDirs::from("io", APP_DIR, APP_DIR)
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join(APP_DIR));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join(APP_DIR));
    }
    directories::ProjectDirs::from("io", APP_DIR, APP_DIR)
        .map(|dirs| dirs.data_dir().to_path_buf())
}

fn short_addr(value: &str) -> String {
    let value = value.trim();
    if value.len() <= 10 {
        return value.to_string();
    }
    let start: String = value.chars().take(6).collect();
    let end: String = value.chars().skip(value.chars().count() - 4).collect();
    format!("{start}..{end}")
}
