//! Tracing subscriber setup

use std::collections::HashMap;

use serde::Deserialize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// `[log]` section of the config file
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// Default level: trace, debug, info, warn, error
    #[serde(default = "default_level")]
    pub level: String,
    /// Per-target overrides, e.g. `wallet_txdecoder::classifier = "debug"`
    #[serde(default)]
    pub components: HashMap<String, String>,
    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            components: HashMap::new(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Filter directives; `RUST_LOG` wins when set
    pub fn directives(&self) -> String {
        if let Ok(env) = std::env::var("RUST_LOG") {
            if !env.trim().is_empty() {
                return env;
            }
        }
        let mut directives = vec![self.level.clone()];
        let mut components: Vec<_> = self.components.iter().collect();
        components.sort();
        for (target, level) in components {
            directives.push(format!("{target}={level}"));
        }
        directives.join(",")
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays machine-readable.
pub fn init_tracing(config: &LogConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(config.directives())
        .map_err(|e| anyhow::anyhow!("invalid log filter: {e}"))?;

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?;
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .try_init()?;
    }
    Ok(())
}
