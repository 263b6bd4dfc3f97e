//! Plugin records as reported by a [`PluginRegistry`](crate::PluginRegistry).
//!
//! A record is read-only to this crate. Its serialized form is the
//! `[[plugin]]` entry of a registry snapshot file:
//!
//! ```toml
//! [[plugin]]
//! type = "mod"
//! name = "quiz"
//! displayname = "Quiz"
//! versiondb = 2024100700
//! release = "4.5"
//! requires = 2024100100
//! supported = [405]
//! standard = true
//! status = "uptodate"
//! ```

use serde::{Deserialize, Serialize};

/// Metadata of one installed plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginRecord {
    /// Frankenstyle component name, e.g. `mod_quiz`.
    ///
    /// Defaults to `{type}_{name}` when absent from a snapshot.
    #[serde(default)]
    pub component: String,
    /// Plugin type, e.g. `mod`, `block`, `local`.
    #[serde(rename = "type")]
    pub plugin_type: String,
    /// Short internal name, e.g. `quiz`.
    pub name: String,
    /// Human-readable name.
    #[serde(rename = "displayname")]
    pub display_name: String,
    /// Version stamp stored by the host for the installed code.
    #[serde(rename = "versiondb")]
    pub version_db: i64,
    /// Human-readable release string.
    pub release: String,
    /// Minimum host version the plugin requires.
    #[serde(rename = "requires")]
    pub version_requires: i64,
    /// Host branches the plugin declares support for.
    #[serde(default, rename = "supported", skip_serializing_if = "Option::is_none")]
    pub supported: Option<Vec<i64>>,
    /// Bundled with the host (`true`) or third-party (`false`).
    #[serde(rename = "standard")]
    pub is_standard: bool,
    /// Host-defined status such as `uptodate`, `new` or `missing`.
    pub status: String,
}

impl PluginRecord {
    /// Create a record with the component derived from type and name.
    pub fn new(
        plugin_type: impl Into<String>,
        name: impl Into<String>,
        display_name: impl Into<String>,
    ) -> Self {
        let plugin_type = plugin_type.into();
        let name = name.into();
        Self {
            component: component_name(&plugin_type, &name),
            plugin_type,
            name,
            display_name: display_name.into(),
            version_db: 0,
            release: String::new(),
            version_requires: 0,
            supported: None,
            is_standard: false,
            status: "uptodate".to_string(),
        }
    }

    pub fn with_version(mut self, version_db: i64, release: impl Into<String>) -> Self {
        self.version_db = version_db;
        self.release = release.into();
        self
    }

    pub fn with_requires(mut self, version_requires: i64) -> Self {
        self.version_requires = version_requires;
        self
    }

    pub fn with_supported(mut self, branches: Vec<i64>) -> Self {
        self.supported = Some(branches);
        self
    }

    pub fn standard(mut self, is_standard: bool) -> Self {
        self.is_standard = is_standard;
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Fill in the component name if the source left it empty.
    pub(crate) fn normalize_component(&mut self) {
        if self.component.is_empty() {
            self.component = component_name(&self.plugin_type, &self.name);
        }
    }
}

/// One type bucket of the registry, in registry iteration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginTypeGroup {
    pub plugin_type: String,
    pub plugins: Vec<PluginRecord>,
}

impl PluginTypeGroup {
    pub fn new(plugin_type: impl Into<String>) -> Self {
        Self {
            plugin_type: plugin_type.into(),
            plugins: Vec::new(),
        }
    }
}

/// Build the component name for a plugin type and name.
pub fn component_name(plugin_type: &str, name: &str) -> String {
    format!("{plugin_type}_{name}")
}
