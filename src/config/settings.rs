use crate::error::{LedgerError, Result};
use crate::wallet::Curve;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

const CURVE_KEY: &str = "LEDGER_CURVE";

/// Settings for key generation and signing.
///
/// No process-wide instance exists; callers load one and pass the curve into
/// [`crate::wallet::Keypair::generate`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub curve: Curve,
}

impl Config {
    /// Defaults, overridden by environment variables
    pub fn new() -> Result<Config> {
        Config::default().with_env_overrides()
    }

    pub fn from_toml_str(contents: &str) -> Result<Config> {
        Ok(toml::from_str(contents)?)
    }

    /// Load a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Config> {
        let contents = std::fs::read_to_string(path)?;
        Config::from_toml_str(&contents)?.with_env_overrides()
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string(self).map_err(|e| LedgerError::Config(e.to_string()))
    }

    fn with_env_overrides(mut self) -> Result<Config> {
        if let Ok(curve) = env::var(CURVE_KEY) {
            self.curve = curve.parse()?;
        }
        Ok(self)
    }

    /// Codec stride for keys and signatures under this configuration
    pub fn stride(&self) -> usize {
        self.curve.field_size()
    }
}
