//! On-disk configuration.
//!
//! All sections are optional so partial configs work; anything missing falls
//! back to the built-in defaults.

use crate::authors::Identity;
use crate::client::{SemanticScholarClient, DEFAULT_BASE_URL};
use crate::error::{PublistError, Result};
use crate::parse::Normalizer;
use crate::venue::TOP_TIER_VENUES;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// TOML configuration file structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub identity: Identity,
    pub venues: VenuesConfig,
    pub semantic_scholar: SemanticScholarConfig,
    pub bibtex: BibtexConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VenuesConfig {
    pub top_tier: Vec<String>,
}

impl Default for VenuesConfig {
    fn default() -> Self {
        Self {
            top_tier: TOP_TIER_VENUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SemanticScholarConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Requests per second.
    pub rate_limit: f64,
    pub timeout_secs: u64,
}

impl Default for SemanticScholarConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            rate_limit: 1.0,
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BibtexConfig {
    /// Prefix prepended to every path named in a BibTeX index file.
    pub prefix: String,
}

/// Platform config path: `<config_dir>/publist/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("publist").join("config.toml"))
}

impl Config {
    /// Parse a config from TOML text.
    pub fn from_toml(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| PublistError::Config(e.to_string()))
    }

    /// Load a config file. A missing file is an error here.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| PublistError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml(&text).map(Self::with_env)
    }

    /// Load the platform config if present, else defaults.
    pub fn load_default() -> Result<Self> {
        match config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default().with_env()),
        }
    }

    /// Apply environment overrides (`SEMANTIC_SCHOLAR_API_KEY`).
    pub fn with_env(mut self) -> Self {
        if let Ok(key) = std::env::var("SEMANTIC_SCHOLAR_API_KEY") {
            if !key.is_empty() {
                self.semantic_scholar.api_key = Some(key);
            }
        }
        self
    }

    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.identity.clone(), self.venues.top_tier.clone())
    }

    pub fn citation_client(&self) -> Result<SemanticScholarClient> {
        let s2 = &self.semantic_scholar;
        Ok(SemanticScholarClient::with_timeout(
            s2.api_key.clone(),
            Duration::from_secs(s2.timeout_secs),
        )?
        .with_base_url(s2.base_url.as_str())
        .with_rate_limit(s2.rate_limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.identity.given, "Brian");
        assert_eq!(config.venues.top_tier.len(), 5);
    }

    #[test]
    fn test_partial_config() {
        let config = Config::from_toml(
            r#"
            [identity]
            given = "Ada"
            family_variants = ["Lovelace", "Lovelace*"]

            [semantic_scholar]
            rate_limit = 5.0

            [bibtex]
            prefix = "static/bibtex"
            "#,
        )
        .unwrap();

        assert_eq!(config.identity.given, "Ada");
        assert_eq!(config.semantic_scholar.rate_limit, 5.0);
        assert_eq!(config.semantic_scholar.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.bibtex.prefix, "static/bibtex");
        assert_eq!(config.venues, VenuesConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            Config::from_toml("identity = 3"),
            Err(PublistError::Config(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[venues]\ntop_tier = [\"ICML\"]\n").unwrap();

        let config = Config::load(&path).unwrap();
        let normalizer = config.normalizer();
        assert_eq!(normalizer.top_tier, vec!["ICML"]);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(&dir.path().join("nope.toml")).is_err());
    }
}
