// Configuration structures and loading logic
// Precedence: built-in defaults < YAML file < environment (.env included) < command-line flags

use crate::connection::{MAINNET_BASE_URL, TESTNET_BASE_URL};
use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";

#[derive(Clone)]
pub struct BotConfig {
    pub api_key: String,
    pub api_secret: String,
    /// Use the futures testnet instead of production.
    pub testnet: bool,
    /// Overrides the endpoint picked by `testnet` when set.
    pub base_url: Option<String>,
    pub recv_window_ms: u64,
    pub http_timeout_secs: u64,
    /// Suggested symbol shown in prompts.
    pub default_symbol: String,
    /// Suggested quantity shown in prompts.
    pub default_quantity: Decimal,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_secret: String::new(),
            testnet: default_testnet(),
            base_url: None,
            recv_window_ms: default_recv_window(),
            http_timeout_secs: default_http_timeout_secs(),
            default_symbol: default_symbol(),
            default_quantity: default_quantity(),
        }
    }
}

// Secrets stay out of logs.
impl fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BotConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_secret", &redact(&self.api_secret))
            .field("testnet", &self.testnet)
            .field("base_url", &self.base_url())
            .field("recv_window_ms", &self.recv_window_ms)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("default_symbol", &self.default_symbol)
            .field("default_quantity", &self.default_quantity)
            .finish()
    }
}

fn redact(value: &str) -> &'static str {
    if value.is_empty() {
        "<missing>"
    } else {
        "<redacted>"
    }
}

/// Optional YAML overrides. Every field may be omitted.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub api_secret: Option<String>,
    #[serde(default)]
    pub testnet: Option<bool>,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub recv_window_ms: Option<u64>,
    #[serde(default)]
    pub http_timeout_secs: Option<u64>,
    #[serde(default)]
    pub default_symbol: Option<String>,
    #[serde(default)]
    pub default_quantity: Option<Decimal>,
}

impl FileConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }
}

impl BotConfig {
    /// Layer YAML values over the current settings.
    pub fn apply_file(&mut self, file: FileConfig) {
        if let Some(v) = file.api_key {
            self.api_key = v;
        }
        if let Some(v) = file.api_secret {
            self.api_secret = v;
        }
        if let Some(v) = file.testnet {
            self.testnet = v;
        }
        if file.base_url.is_some() {
            self.base_url = file.base_url;
        }
        if let Some(v) = file.recv_window_ms {
            self.recv_window_ms = v;
        }
        if let Some(v) = file.http_timeout_secs {
            self.http_timeout_secs = v;
        }
        if let Some(v) = file.default_symbol {
            self.default_symbol = v.to_uppercase();
        }
        if let Some(v) = file.default_quantity {
            self.default_quantity = v;
        }
    }

    /// Layer environment variables over the current settings. `lookup` is
    /// `std::env::var` in production and a map in tests.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = get("BINANCE_API_KEY") {
            self.api_key = v;
        }
        if let Some(v) = get("BINANCE_API_SECRET") {
            self.api_secret = v;
        }
        if let Some(v) = get("BINANCE_TESTNET") {
            self.testnet = parse_bool(&v).ok_or_else(|| anyhow!("BINANCE_TESTNET must be true or false, got '{v}'"))?;
        }
        if let Some(v) = get("BINANCE_BASE_URL") {
            self.base_url = Some(v);
        }
        if let Some(v) = get("BINANCE_RECV_WINDOW_MS") {
            self.recv_window_ms = v
                .parse()
                .with_context(|| format!("BINANCE_RECV_WINDOW_MS must be an integer, got '{v}'"))?;
        }
        if let Some(v) = get("BINANCE_HTTP_TIMEOUT_SECS") {
            self.http_timeout_secs = v
                .parse()
                .with_context(|| format!("BINANCE_HTTP_TIMEOUT_SECS must be an integer, got '{v}'"))?;
        }
        if let Some(v) = get("DEFAULT_SYMBOL") {
            self.default_symbol = v.to_uppercase();
        }
        if let Some(v) = get("DEFAULT_QUANTITY") {
            self.default_quantity = Decimal::from_str(&v)
                .with_context(|| format!("DEFAULT_QUANTITY must be a decimal, got '{v}'"))?;
        }
        Ok(())
    }

    pub fn base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url.as_str(),
            None if self.testnet => TESTNET_BASE_URL,
            None => MAINNET_BASE_URL,
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.api_key.trim().is_empty() && !self.api_secret.trim().is_empty()
    }

    /// Sanity checks on values that are not credentials. Missing credentials
    /// are reported when connecting.
    pub fn validate(&self) -> Result<()> {
        if self.recv_window_ms > 60_000 {
            return Err(anyhow!(
                "recv_window_ms must not exceed 60000, got {}",
                self.recv_window_ms
            ));
        }
        if self.http_timeout_secs == 0 {
            return Err(anyhow!("http_timeout_secs must be positive"));
        }
        if self.default_symbol.trim().is_empty() {
            return Err(anyhow!("default_symbol cannot be empty"));
        }
        if self.default_quantity <= Decimal::ZERO {
            return Err(anyhow!(
                "default_quantity must be positive, got {}",
                self.default_quantity
            ));
        }
        Ok(())
    }
}

/// Build the configuration: defaults, then the YAML file if one is given or
/// `./config.yaml` exists, then `.env` / process environment.
pub fn load_config(path: Option<&Path>) -> Result<BotConfig> {
    let _ = dotenvy::dotenv();

    let mut cfg = BotConfig::default();
    match path {
        Some(path) => cfg.apply_file(FileConfig::load(path)?),
        None => {
            let default_path = Path::new("config.yaml");
            if default_path.exists() {
                cfg.apply_file(FileConfig::load(default_path)?);
            }
        }
    }
    cfg.apply_env(|key| std::env::var(key).ok())?;

    if !cfg.has_credentials() {
        log::error!("CONFIG: BINANCE_API_KEY or BINANCE_API_SECRET not found in environment variables");
        log::info!("CONFIG: please set up your API credentials");
    }

    cfg.validate()?;
    Ok(cfg)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Default Value Functions
// ============================================================================

fn default_testnet() -> bool {
    true
}

fn default_recv_window() -> u64 {
    5_000
}

fn default_http_timeout_secs() -> u64 {
    10
}

fn default_symbol() -> String {
    DEFAULT_SYMBOL.to_string()
}

fn default_quantity() -> Decimal {
    Decimal::new(1, 3)
}
