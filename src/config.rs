//! Aggregator configuration at ~/.georcoder/config.json.
//!
//! Loaded once at startup and immutable afterwards. Both provider lists may
//! be empty. A missing file falls back to [`AggregatorConfig::default`].

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::provider::http::DEFAULT_TIMEOUT_SECS;
use crate::provider::ProviderKind;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// One provider entry: `{ "type": "arcgis", "params": { ... } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderSpec {
    #[serde(rename = "type")]
    pub kind: ProviderKind,
    #[serde(default)]
    pub params: serde_json::Map<String, Value>,
}

impl ProviderSpec {
    pub fn new(kind: ProviderKind) -> Self {
        Self {
            kind,
            params: serde_json::Map::new(),
        }
    }

    pub fn with_param(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }

    /// First non-empty string param among `keys`.
    pub fn param_str(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|k| self.params.get(*k))
            .filter_map(Value::as_str)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    }
}

/// Ordered primaries plus extenders.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    #[serde(default)]
    pub provider: Vec<ProviderSpec>,
    #[serde(default)]
    pub extend: Vec<ProviderSpec>,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

fn default_timeout() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            provider: vec![ProviderSpec::new(ProviderKind::ArcGis)],
            extend: Vec::new(),
            timeout_secs: default_timeout(),
        }
    }
}

impl AggregatorConfig {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// An explicit path must exist; a missing default file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::read_file(p),
            None => {
                let p = Self::default_path();
                if p.exists() {
                    Self::read_file(&p)
                } else {
                    tracing::debug!(path = %p.display(), "No config file, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".georcoder")
            .join("config.json")
    }

    fn read_file(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                "provider": [
                    {{ "type": "geocoder-arcgis", "params": {{ "token": "t" }} }},
                    {{ "type": "nominatim" }}
                ],
                "extend": [
                    {{ "type": "osm-regions", "params": {{ "url": "http://regions" }} }},
                    {{ "type": "w3w-node-wrapper", "params": {{ "apiKey": "K" }} }}
                ]
            }}"#
        )
        .unwrap();

        let cfg = AggregatorConfig::load(Some(file.path())).unwrap();
        assert_eq!(cfg.provider.len(), 2);
        assert_eq!(cfg.provider[0].kind, ProviderKind::ArcGis);
        assert_eq!(cfg.provider[0].param_str(&["token"]).as_deref(), Some("t"));
        assert_eq!(cfg.provider[1].kind, ProviderKind::Nominatim);
        assert_eq!(cfg.extend[1].param_str(&["api_key", "apiKey"]).as_deref(), Some("K"));
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_empty_lists_allowed() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{{}}").unwrap();
        let cfg = AggregatorConfig::load(Some(file.path())).unwrap();
        assert!(cfg.provider.is_empty());
        assert!(cfg.extend.is_empty());
    }

    #[test]
    fn test_missing_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = AggregatorConfig::load(Some(&dir.path().join("nope.json"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_unknown_provider_type_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{ "provider": [{{ "type": "mapquest" }}] }}"#).unwrap();
        let err = AggregatorConfig::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_param_str_skips_empty() {
        let spec = ProviderSpec::new(ProviderKind::What3Words)
            .with_param("api_key", "")
            .with_param("apiKey", "K");
        assert_eq!(spec.param_str(&["api_key", "apiKey"]).as_deref(), Some("K"));
    }
}
