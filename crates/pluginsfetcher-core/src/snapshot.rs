//! File-backed plugin registry.
//!
//! The host exports its plugin list to a TOML snapshot; [`SnapshotRegistry`]
//! re-reads that file on every query so each report reflects the file as it
//! is at call time.
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

use std::collections::HashSet;
use std::path::PathBuf;

use serde::Deserialize;
use tracing::debug;

use crate::record::{PluginRecord, PluginTypeGroup};
use crate::registry::PluginRegistry;
use crate::{Error, Result};

/// Maximum snapshot file size (10 MB)
const MAX_SNAPSHOT_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    plugin: Vec<PluginRecord>,
}

/// Registry backed by a TOML snapshot on disk.
#[derive(Debug, Clone)]
pub struct SnapshotRegistry {
    path: PathBuf,
}

impl SnapshotRegistry {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> Result<String> {
        let metadata = match std::fs::metadata(&self.path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SnapshotNotFound {
                    path: self.path.clone(),
                });
            }
            Err(e) => return Err(Error::Io(e)),
        };
        if metadata.len() > MAX_SNAPSHOT_SIZE {
            return Err(Error::SnapshotTooLarge {
                path: self.path.clone(),
                size: metadata.len(),
                max: MAX_SNAPSHOT_SIZE,
            });
        }
        Ok(std::fs::read_to_string(&self.path)?)
    }

    /// Parse snapshot content and group it by plugin type.
    fn parse(&self, content: &str) -> Result<Vec<PluginTypeGroup>> {
        let file: SnapshotFile = toml::from_str(content).map_err(|e| Error::InvalidSnapshot {
            path: self.path.clone(),
            message: e.to_string(),
        })?;

        let mut seen = HashSet::new();
        let mut groups: Vec<PluginTypeGroup> = Vec::new();

        for mut record in file.plugin {
            record.normalize_component();
            if !seen.insert(record.component.clone()) {
                return Err(Error::DuplicateComponent {
                    component: record.component,
                    path: self.path.clone(),
                });
            }

            match groups.iter_mut().find(|g| g.plugin_type == record.plugin_type) {
                Some(group) => group.plugins.push(record),
                None => {
                    let mut group = PluginTypeGroup::new(record.plugin_type.clone());
                    group.plugins.push(record);
                    groups.push(group);
                }
            }
        }

        Ok(groups)
    }
}

impl PluginRegistry for SnapshotRegistry {
    fn plugins_by_type(&self) -> Result<Vec<PluginTypeGroup>> {
        let content = self.read()?;
        let groups = self.parse(&content)?;
        debug!(
            path = %self.path.display(),
            types = groups.len(),
            "Loaded plugin snapshot"
        );
        Ok(groups)
    }
}
