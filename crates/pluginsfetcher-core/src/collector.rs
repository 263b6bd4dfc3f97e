//! Plugin and software statistics.
//!
//! Both collectors are pure reads: they query the registry or host
//! environment once per call, build a fresh report, and keep nothing.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::Result;
use crate::host::{HostEnvironment, HostVersion, RuntimeVersion};
use crate::registry::PluginRegistry;

/// Which plugins to include in a report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginFilter {
    /// Only include plugins of this type. Compared exactly.
    pub plugin_type: Option<String>,
    /// Exclude plugins bundled with the host.
    pub contrib_only: bool,
}

impl PluginFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn of_type(plugin_type: impl Into<String>) -> Self {
        Self {
            plugin_type: Some(plugin_type.into()),
            contrib_only: false,
        }
    }

    pub fn contrib_only(mut self) -> Self {
        self.contrib_only = true;
        self
    }
}

/// Projected view of one plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    /// Component name; the report key, not part of the entry.
    #[serde(skip)]
    pub component: String,
    #[serde(rename = "type")]
    pub plugin_type: String,
    pub name: String,
    pub displayname: String,
    pub version: i64,
    pub release: String,
    pub requires: i64,
    pub supported: Vec<i64>,
    pub isstandard: bool,
    pub status: String,
}

/// Aggregate plugin counters.
///
/// `total == standard + contrib` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginCounts {
    pub total: u64,
    pub standard: u64,
    pub contrib: u64,
}

/// Result of [`get_plugin_stats`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PluginStats {
    pub stats: PluginCounts,
    /// Included plugins in registry iteration order.
    pub plugins: Vec<PluginInfo>,
}

impl PluginStats {
    /// Look up an included plugin by component name.
    pub fn get(&self, component: &str) -> Option<&PluginInfo> {
        self.plugins.iter().find(|p| p.component == component)
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

/// Gather statistics about installed plugins.
///
/// A plugin is included iff its type group matches `filter.plugin_type`
/// (when set) and it is not a standard plugin (when `filter.contrib_only`).
/// An unknown type yields an empty report, not an error. Registry failures
/// are returned unchanged.
pub fn get_plugin_stats(registry: &dyn PluginRegistry, filter: &PluginFilter) -> Result<PluginStats> {
    let groups = registry.plugins_by_type()?;
    let mut report = PluginStats::default();

    for group in &groups {
        if filter
            .plugin_type
            .as_deref()
            .is_some_and(|wanted| wanted != group.plugin_type)
        {
            continue;
        }

        for plugin in &group.plugins {
            if filter.contrib_only && plugin.is_standard {
                continue;
            }

            report.plugins.push(PluginInfo {
                component: plugin.component.clone(),
                plugin_type: plugin.plugin_type.clone(),
                name: plugin.name.clone(),
                displayname: plugin.display_name.clone(),
                version: plugin.version_db,
                release: plugin.release.clone(),
                requires: plugin.version_requires,
                supported: plugin.supported.clone().unwrap_or_default(),
                isstandard: plugin.is_standard,
                status: plugin.status.clone(),
            });

            report.stats.total += 1;
            if plugin.is_standard {
                report.stats.standard += 1;
            } else {
                report.stats.contrib += 1;
            }
        }
    }

    debug!(
        plugin_type = ?filter.plugin_type,
        contrib_only = filter.contrib_only,
        total = report.stats.total,
        standard = report.stats.standard,
        contrib = report.stats.contrib,
        "Collected plugin stats"
    );

    Ok(report)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    #[serde(rename = "type")]
    pub db_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OsInfo {
    pub name: String,
    pub family: String,
}

/// Host software versions, as reported by [`get_software_stats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoftwareStats {
    pub moodle: HostVersion,
    pub php: RuntimeVersion,
    pub db: DatabaseInfo,
    pub os: OsInfo,
}

/// Gather host, runtime, database and OS versions.
pub fn get_software_stats(host: &dyn HostEnvironment) -> SoftwareStats {
    SoftwareStats {
        moodle: host.host_version(),
        php: host.runtime_version(),
        db: DatabaseInfo {
            db_type: host.db_type(),
        },
        os: OsInfo {
            name: host.os_name(),
            family: host.os_family(),
        },
    }
}
