use std::path::Path;

use serde::Deserialize;

use crate::error::{KodikError, Result};

pub const DEFAULT_SCHEME: &str = "https";
pub const DEFAULT_HOST: &str = "kodikapi.com";
pub const DEFAULT_ORIGIN: &str = "kodik";

/// Where and as whom the client talks to Kodik.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct SourceConfig {
    pub token: String,
    #[serde(default = "default_scheme")]
    pub scheme: String,
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default)]
    pub base_path: String,
    /// Identifies the endpoint in the token cache, together with the token.
    #[serde(default = "default_origin")]
    pub origin: String,
}

fn default_scheme() -> String { DEFAULT_SCHEME.to_string() }
fn default_host() -> String { DEFAULT_HOST.to_string() }
fn default_origin() -> String { DEFAULT_ORIGIN.to_string() }

impl SourceConfig {
    /// Default endpoint with the given token.
    pub fn new(token: impl Into<String>) -> Self {
        Self { token: token.into(), scheme: default_scheme(), host: default_host(), base_path: String::new(), origin: default_origin() }
    }

    /// Read `KODIK_TOKEN`, `KODIK_SCHEME`, `KODIK_HOST`, `KODIK_BASE_PATH` and `KODIK_ORIGIN`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = lookup("KODIK_TOKEN").unwrap_or_default();
        let cfg = Self {
            token,
            scheme: lookup("KODIK_SCHEME").filter(|s| !s.trim().is_empty()).unwrap_or_else(default_scheme),
            host: lookup("KODIK_HOST").filter(|s| !s.trim().is_empty()).unwrap_or_else(default_host),
            base_path: lookup("KODIK_BASE_PATH").unwrap_or_default(),
            origin: lookup("KODIK_ORIGIN").filter(|s| !s.trim().is_empty()).unwrap_or_else(default_origin),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load from a TOML file; keys mirror the field names.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| KodikError::InvalidSource(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        let cfg: SourceConfig = toml::from_str(raw).map_err(|e| KodikError::InvalidSource(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.token.trim().is_empty() { return Err(KodikError::InvalidSource("token is missing".to_string())); }
        if self.host.trim().is_empty() { return Err(KodikError::InvalidSource("host is missing".to_string())); }
        Ok(())
    }
}
