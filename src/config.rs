use crate::constants::{
    get_supported_langs, DEFAULT_BULLETIN_DIR, DEFAULT_CONFIG_PATH, DEFAULT_HOST, DEFAULT_LANG,
    DEFAULT_PORT,
};
use crate::error::{MarketError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub market: MarketConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MarketConfig {
    pub bulletin_dir: PathBuf,
    pub default_lang: String,
    pub supported_langs: Vec<String>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            bulletin_dir: PathBuf::from(DEFAULT_BULLETIN_DIR),
            default_lang: DEFAULT_LANG.to_string(),
            supported_langs: get_supported_langs().into_iter().map(String::from).collect(),
        }
    }
}

impl Config {
    /// Loads `MARKET_CONFIG` (or `config.toml`), then applies env overrides.
    /// A missing config file is not an error.
    pub fn load() -> Result<Self> {
        let config_path =
            std::env::var("MARKET_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut config = Self::load_from(Path::new(&config_path))?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file '{}' not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let config_content = fs::read_to_string(path).map_err(|e| {
            MarketError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config: Config = toml::from_str(&config_content)?;
        config.validate()?;
        info!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(port) = std::env::var("MARKET_PORT") {
            self.server.port = port
                .parse()
                .map_err(|_| MarketError::Config(format!("Invalid MARKET_PORT '{}'", port)))?;
        }
        if let Ok(dir) = std::env::var("MARKET_BULLETIN_DIR") {
            self.market.bulletin_dir = PathBuf::from(dir);
        }
        self.validate()
    }

    fn validate(&self) -> Result<()> {
        if self.market.default_lang.trim().is_empty() {
            return Err(MarketError::Config("market.default_lang must not be empty".into()));
        }
        if !self.market.supported_langs.is_empty()
            && !self.market.supported_langs.contains(&self.market.default_lang)
        {
            return Err(MarketError::Config(format!(
                "market.default_lang '{}' is not listed in supported_langs",
                self.market.default_lang
            )));
        }
        Ok(())
    }
}
