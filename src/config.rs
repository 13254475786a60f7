use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use std::{fs, path::Path};

use crate::shared::errors::DexError;

const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_RETRY_COUNT: u32 = 3;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SolanaCfg {
    pub rpc_url: String,
    /// mainnet, devnet, testnet
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub timeout_ms: u64,
    /// attempts per ledger read (blockhash, fee, simulate, lookup)
    #[serde(default)]
    pub retry_count: u32,
    /// processed, confirmed, finalized
    #[serde(default)]
    pub commitment: String,
}

impl SolanaCfg {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingCfg {
    #[serde(default)]
    pub level: String,
    /// text or json
    #[serde(default)]
    pub format: String,
}

/// Per-DEX settings; the adapter registered for it carries the same name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DexConfig {
    pub name: String,
    pub program_id: String,
    #[serde(default)]
    pub router_address: Option<String>,
    #[serde(default)]
    pub endpoints: HashMap<String, String>,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub timeout_ms: u64,
    #[serde(default)]
    pub retry_count: u32,
}

impl DexConfig {
    pub fn new(name: &str, program_id: &str) -> Self {
        Self {
            name: name.to_string(),
            program_id: program_id.to_string(),
            enabled: true,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_count: DEFAULT_RETRY_COUNT,
            ..Default::default()
        }
    }

    pub fn with_endpoint(mut self, key: &str, url: &str) -> Self {
        self.endpoints.insert(key.to_string(), url.to_string());
        self
    }

    pub fn with_router(mut self, router: &str) -> Self {
        self.router_address = Some(router.to_string());
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn endpoint(&self, key: &str) -> Option<&str> {
        self.endpoints
            .get(key)
            .map(String::as_str)
            .filter(|url| !url.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub solana: SolanaCfg,
    #[serde(default)]
    pub logging: LoggingCfg,
    #[serde(default)]
    pub dexes: Vec<DexConfig>,
}

impl Config {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config file {}", path.display()))?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: Self = toml::from_str(s).context("parse Config.toml")?;
        cfg.validate().context("invalid config")?;
        cfg.apply_defaults();
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.solana.rpc_url.is_empty() {
            bail!("solana rpc_url is required");
        }
        if self.solana.network.is_empty() {
            bail!("solana network is required");
        }

        let mut seen = HashSet::new();
        for (i, dex) in self.dexes.iter().enumerate() {
            if dex.name.is_empty() {
                bail!("dexes[{}] name is required", i);
            }
            if dex.program_id.is_empty() {
                bail!("dexes[{}] program_id is required", i);
            }
            if !seen.insert(dex.name.as_str()) {
                bail!("dexes[{}] duplicate name: {}", i, dex.name);
            }
        }

        Ok(())
    }

    pub fn apply_defaults(&mut self) {
        if self.solana.timeout_ms == 0 {
            self.solana.timeout_ms = DEFAULT_TIMEOUT_MS;
        }
        if self.solana.retry_count == 0 {
            self.solana.retry_count = DEFAULT_RETRY_COUNT;
        }
        if self.solana.commitment.is_empty() {
            self.solana.commitment = "confirmed".to_string();
        }

        for dex in &mut self.dexes {
            if dex.timeout_ms == 0 {
                dex.timeout_ms = DEFAULT_TIMEOUT_MS;
            }
            if dex.retry_count == 0 {
                dex.retry_count = DEFAULT_RETRY_COUNT;
            }
        }

        if self.logging.level.is_empty() {
            self.logging.level = "info".to_string();
        }
        if self.logging.format.is_empty() {
            self.logging.format = "text".to_string();
        }
    }

    /// Enabled DEX entry by name
    pub fn dex_config(&self, name: &str) -> Result<&DexConfig, DexError> {
        self.dexes
            .iter()
            .find(|dex| dex.name == name && dex.enabled)
            .ok_or_else(|| DexError::Config(format!("dex config not found or disabled: {}", name)))
    }

    pub fn enabled_dexes(&self) -> Vec<&DexConfig> {
        self.dexes.iter().filter(|dex| dex.enabled).collect()
    }
}
