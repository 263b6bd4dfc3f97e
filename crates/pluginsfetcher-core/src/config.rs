//! Service configuration loaded from `pluginsfetcher.toml`.
//!
//! ```toml
//! [registry]
//! snapshot = "plugins.toml"
//!
//! [host]
//! version = 2024100700
//! release = "4.5 (Build: 20241007)"
//! branch = 405
//! dbtype = "pgsql"
//!
//! [host.runtime]
//! version = "8.3.6"
//! versionid = "80306"
//!
//! [services.pluginsfetcher_legacy]
//! enabled = true
//!
//! [[tokens]]
//! token = "0123abcd"
//! user = "monitoring"
//! service = "pluginsfetcher"
//! capabilities = ["moodle/site:config"]
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::auth::{TokenGrant, TokenTable};
use crate::host::RuntimeVersion;
use crate::{Error, Result};

/// Maximum config file size (1 MB)
const MAX_CONFIG_SIZE: u64 = 1024 * 1024;

/// Top-level service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub registry: RegistryConfig,
    pub host: HostConfig,
    /// Per-service overrides keyed by service short name.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub services: BTreeMap<String, ServiceOverride>,
    #[serde(default)]
    pub tokens: Vec<TokenGrant>,
}

/// Where the plugin registry snapshot lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Snapshot path; relative paths resolve against the config file's directory.
    pub snapshot: PathBuf,
}

/// Static host environment values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostConfig {
    pub version: i64,
    pub release: String,
    pub branch: i64,
    pub dbtype: String,
    pub runtime: RuntimeVersion,
    #[serde(default)]
    pub os: OsOverride,
}

/// Optional operating system overrides.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OsOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

/// Override of a built-in service declaration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ServiceOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

impl ServiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// A relative snapshot path is resolved against the directory holding
    /// the config file.
    pub fn load(path: &Path) -> Result<Self> {
        let metadata = match std::fs::metadata(path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::ConfigNotFound {
                    path: path.to_path_buf(),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };
        if metadata.len() > MAX_CONFIG_SIZE {
            return Err(Error::ConfigTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: MAX_CONFIG_SIZE,
            });
        }

        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content).map_err(|message| Error::InvalidConfig {
            path: path.to_path_buf(),
            message,
        })?;

        if config.registry.snapshot.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            config.registry.snapshot = base.join(&config.registry.snapshot);
        }
        Ok(config)
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: Self = toml::from_str(content).map_err(|e| e.to_string())?;
        for grant in &config.tokens {
            if grant.token.trim().is_empty() {
                return Err(format!("token for user '{}' is empty", grant.user));
            }
        }
        Ok(config)
    }

    /// Web-service tokens as a lookup table.
    pub fn token_table(&self) -> TokenTable {
        self.tokens.iter().cloned().collect()
    }

    /// Whether the configuration overrides a service's enabled flag.
    pub fn service_enabled(&self, shortname: &str) -> Option<bool> {
        self.services.get(shortname).and_then(|s| s.enabled)
    }
}
