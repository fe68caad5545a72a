//! Configuration types for restal.
//!
//! Configuration is loaded from a single YAML file (`restal.yaml` by
//! default) and combined into a `RestalConfig` structure:
//!
//! - **upstream**: the Postgres server restal fronts
//! - **http**: the listener the REST surface binds to
//! - **access**: per-table permissions and the global `restrict` switch

pub mod access;
pub mod http;
pub mod upstream;

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub use access::{AccessConfig, Operation, TableRule};
pub use http::HttpConfig;
pub use upstream::UpstreamConfig;

/// Complete restal configuration loaded from a file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestalConfig {
    /// Upstream Postgres connection.
    #[serde(default)]
    pub upstream: UpstreamConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub http: HttpConfig,

    /// Table access rules.
    #[serde(default)]
    pub access: AccessConfig,
}

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl RestalConfig {
    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content.
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(ConfigError::from)
    }

    /// Load configuration from `path`, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_config() {
        let yaml = r#"
upstream:
  host: db.internal
  port: 5432
  database: inventory
  username: api
  password: secret
http:
  listen_addr: 127.0.0.1
  listen_port: 3000
access:
  restrict: true
  tables:
    test_readonly_access:
      read: true
    test_write_and_delete_access:
      write: true
      delete: true
    test_list_only_id:
      read: true
      fields: [id]
"#;

        let config = RestalConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.upstream.host, "db.internal");
        assert_eq!(config.http.listen_port, 3000);
        assert!(config.access.restrict);

        let readonly = &config.access.tables["test_readonly_access"];
        assert!(readonly.read);
        assert!(!readonly.write);
        assert!(!readonly.delete);
        assert!(readonly.fields.is_none());

        let listed = &config.access.tables["test_list_only_id"];
        assert_eq!(listed.fields.as_deref(), Some(&["id".to_string()][..]));
    }

    #[test]
    fn defaults_are_permissive() {
        let config = RestalConfig::from_yaml("{}").unwrap();
        assert!(!config.access.restrict);
        assert!(config.access.tables.is_empty());
        assert_eq!(config.http.listen_addr, "0.0.0.0");
    }
}
