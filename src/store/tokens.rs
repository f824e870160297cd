//! Token metadata registries

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use serde::{Deserialize, Serialize};

use crate::domain::chain::{ChainAddress, ChainType};

/// Display details of a token contract
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    pub symbol: String,
    pub decimals: u8,
}

impl TokenInfo {
    pub fn new(symbol: impl Into<String>, decimals: u8) -> Self {
        Self {
            symbol: symbol.into(),
            decimals,
        }
    }
}

/// Lookup of token symbol and decimals
#[async_trait::async_trait]
pub trait TokenRegistry: Send + Sync + 'static {
    /// `None` when the token is not registered
    async fn lookup(&self, token: &ChainAddress) -> Result<Option<TokenInfo>>;
}

/// Tokens known up front, usually from the config file
#[derive(Debug, Clone, Default)]
pub struct StaticTokenRegistry {
    tokens: HashMap<ChainAddress, TokenInfo>,
}

impl StaticTokenRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, token: ChainAddress, info: TokenInfo) {
        self.tokens.insert(token, info);
    }

    pub fn with(mut self, token: ChainAddress, info: TokenInfo) -> Self {
        self.insert(token, info);
        self
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

#[async_trait::async_trait]
impl TokenRegistry for StaticTokenRegistry {
    async fn lookup(&self, token: &ChainAddress) -> Result<Option<TokenInfo>> {
        Ok(self.tokens.get(token).cloned())
    }
}

/// SQLite-backed token table
#[derive(Debug)]
pub struct SqliteTokenRegistry {
    conn: Mutex<Connection>,
}

impl SqliteTokenRegistry {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).with_context(|| format!("open db {}", path.display()))?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS tokens (
                chain    TEXT NOT NULL,
                address  TEXT NOT NULL,
                symbol   TEXT NOT NULL,
                decimals INTEGER NOT NULL,
                PRIMARY KEY (chain, address)
            );",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow::anyhow!("token db lock poisoned"))
    }

    pub fn upsert(&self, token: &ChainAddress, info: &TokenInfo) -> Result<()> {
        self.conn()?.execute(
            "INSERT INTO tokens(chain, address, symbol, decimals) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(chain, address) DO UPDATE SET symbol=excluded.symbol, decimals=excluded.decimals",
            params![
                token.chain.as_str(),
                token.address_hex(),
                info.symbol,
                info.decimals
            ],
        )?;
        Ok(())
    }

    pub fn remove(&self, token: &ChainAddress) -> Result<()> {
        self.conn()?.execute(
            "DELETE FROM tokens WHERE chain = ?1 AND address = ?2",
            params![token.chain.as_str(), token.address_hex()],
        )?;
        Ok(())
    }

    pub fn load_chain(&self, chain: ChainType) -> Result<Vec<(String, TokenInfo)>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT address, symbol, decimals FROM tokens WHERE chain = ?1 ORDER BY address",
        )?;
        let mut rows = stmt.query(params![chain.as_str()])?;
        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let address: String = row.get(0)?;
            let symbol: String = row.get(1)?;
            let decimals: u8 = row.get(2)?;
            out.push((address, TokenInfo { symbol, decimals }));
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl TokenRegistry for SqliteTokenRegistry {
    async fn lookup(&self, token: &ChainAddress) -> Result<Option<TokenInfo>> {
        let conn = self.conn()?;
        let info = conn
            .query_row(
                "SELECT symbol, decimals FROM tokens WHERE chain = ?1 AND address = ?2",
                params![token.chain.as_str(), token.address_hex()],
                |row| {
                    Ok(TokenInfo {
                        symbol: row.get(0)?,
                        decimals: row.get(1)?,
                    })
                },
            )
            .optional()
            .with_context(|| format!("lookup token {token}"))?;
        Ok(info)
    }
}

/// Several registries consulted in order; the first hit wins
#[derive(Clone, Default)]
pub struct LayeredTokenRegistry {
    layers: Vec<Arc<dyn TokenRegistry>>,
}

impl LayeredTokenRegistry {
    pub fn new(layers: Vec<Arc<dyn TokenRegistry>>) -> Self {
        Self { layers }
    }

    pub fn push(&mut self, layer: Arc<dyn TokenRegistry>) {
        self.layers.push(layer);
    }
}

#[async_trait::async_trait]
impl TokenRegistry for LayeredTokenRegistry {
    /// A failing layer is skipped; its error surfaces only if no layer has the token.
    async fn lookup(&self, token: &ChainAddress) -> Result<Option<TokenInfo>> {
        let mut first_error = None;
        for layer in &self.layers {
            match layer.lookup(token).await {
                Ok(Some(info)) => return Ok(Some(info)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(%token, error = %err, "token registry layer failed");
                    first_error.get_or_insert(err);
                }
            }
        }
        match first_error {
            Some(err) => Err(err),
            None => Ok(None),
        }
    }
}
