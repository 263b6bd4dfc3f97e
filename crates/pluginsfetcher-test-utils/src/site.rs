//! [`TestSite`] builder: a temp directory holding `pluginsfetcher.toml` and
//! a plugin snapshot.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use pluginsfetcher_core::config::{OsOverride, RegistryConfig, ServiceOverride};
use pluginsfetcher_core::{HostConfig, PluginRecord, RuntimeVersion, ServiceConfig, TokenGrant};
use serde::Serialize;
use tempfile::TempDir;

use crate::fixtures::{sample_plugins, sample_token_grants};

#[derive(Serialize)]
struct Snapshot<'a> {
    plugin: &'a [PluginRecord],
}

/// A temporary site directory.
///
/// # Example
///
/// ```rust,no_run
/// use pluginsfetcher_test_utils::TestSite;
///
/// let site = TestSite::new().enable_legacy().write();
/// assert!(site.config_path().exists());
/// ```
pub struct TestSite {
    temp_dir: TempDir,
    plugins: Vec<PluginRecord>,
    tokens: Vec<TokenGrant>,
    legacy_enabled: bool,
    write_snapshot: bool,
}

impl Default for TestSite {
    fn default() -> Self {
        Self::new()
    }
}

impl TestSite {
    /// A site with the sample plugins and tokens.
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().unwrap(),
            plugins: sample_plugins(),
            tokens: sample_token_grants(),
            legacy_enabled: false,
            write_snapshot: true,
        }
    }

    pub fn with_plugins(mut self, plugins: Vec<PluginRecord>) -> Self {
        self.plugins = plugins;
        self
    }

    pub fn with_tokens(mut self, tokens: Vec<TokenGrant>) -> Self {
        self.tokens = tokens;
        self
    }

    /// Turn on the legacy service, which is disabled by default.
    pub fn enable_legacy(mut self) -> Self {
        self.legacy_enabled = true;
        self
    }

    /// Leave the snapshot file out so registry reads fail.
    pub fn without_snapshot(mut self) -> Self {
        self.write_snapshot = false;
        self
    }

    /// The configuration this site writes.
    pub fn config(&self) -> ServiceConfig {
        let mut services = BTreeMap::new();
        if self.legacy_enabled {
            services.insert(
                "pluginsfetcher_legacy".to_string(),
                ServiceOverride {
                    enabled: Some(true),
                },
            );
        }

        ServiceConfig {
            registry: RegistryConfig {
                snapshot: PathBuf::from("plugins.toml"),
            },
            host: HostConfig {
                version: 2024100700,
                release: "4.5 (Build: 20241007)".to_string(),
                branch: 405,
                dbtype: "pgsql".to_string(),
                runtime: RuntimeVersion {
                    version: "8.3.6".to_string(),
                    versionid: "80306".to_string(),
                },
                os: OsOverride {
                    name: Some("Linux".to_string()),
                    family: Some("Linux".to_string()),
                },
            },
            services,
            tokens: self.tokens.clone(),
        }
    }

    /// Write config and snapshot to disk.
    pub fn write(self) -> Self {
        if self.write_snapshot {
            let snapshot = toml::to_string(&Snapshot {
                plugin: &self.plugins,
            })
            .unwrap();
            fs::write(self.snapshot_path(), snapshot).unwrap();
        }

        let config = toml::to_string(&self.config()).unwrap();
        fs::write(self.config_path(), config).unwrap();
        self
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn config_path(&self) -> PathBuf {
        self.root().join("pluginsfetcher.toml")
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.root().join("plugins.toml")
    }

    pub fn plugins(&self) -> &[PluginRecord] {
        &self.plugins
    }
}
