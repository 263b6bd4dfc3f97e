//! Host environment accessors.
//!
//! The values reported here are owned by the host installation. They are
//! read verbatim on every call and never cached or transformed.

use serde::{Deserialize, Serialize};

use crate::config::HostConfig;

/// Host software version triple.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostVersion {
    /// Version stamp, e.g. `2024100700`.
    pub version: i64,
    /// Release string, e.g. `4.5 (Build: 20241007)`.
    pub release: String,
    /// Branch number, e.g. `405`.
    pub branch: i64,
}

/// Version of the runtime the host runs on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeVersion {
    /// Human-readable version, e.g. `8.3.6`.
    pub version: String,
    /// Numeric release id rendered as text, e.g. `80306`.
    pub versionid: String,
}

/// Read access to the host environment.
pub trait HostEnvironment: Send + Sync {
    fn host_version(&self) -> HostVersion;
    fn runtime_version(&self) -> RuntimeVersion;
    /// Database backend type, e.g. `pgsql`.
    fn db_type(&self) -> String;
    fn os_name(&self) -> String;
    fn os_family(&self) -> String;
}

/// Host environment described by the `[host]` configuration table.
///
/// OS name and family fall back to the platform this process runs on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfiguredHost {
    version: HostVersion,
    runtime: RuntimeVersion,
    db_type: String,
    os_name: Option<String>,
    os_family: Option<String>,
}

impl ConfiguredHost {
    pub fn new(version: HostVersion, runtime: RuntimeVersion, db_type: impl Into<String>) -> Self {
        Self {
            version,
            runtime,
            db_type: db_type.into(),
            os_name: None,
            os_family: None,
        }
    }

    /// Override the reported operating system.
    pub fn with_os(mut self, name: impl Into<String>, family: impl Into<String>) -> Self {
        self.os_name = Some(name.into());
        self.os_family = Some(family.into());
        self
    }

    pub fn from_config(config: &HostConfig) -> Self {
        Self {
            version: HostVersion {
                version: config.version,
                release: config.release.clone(),
                branch: config.branch,
            },
            runtime: config.runtime.clone(),
            db_type: config.dbtype.clone(),
            os_name: config.os.name.clone(),
            os_family: config.os.family.clone(),
        }
    }
}

impl HostEnvironment for ConfiguredHost {
    fn host_version(&self) -> HostVersion {
        self.version.clone()
    }

    fn runtime_version(&self) -> RuntimeVersion {
        self.runtime.clone()
    }

    fn db_type(&self) -> String {
        self.db_type.clone()
    }

    fn os_name(&self) -> String {
        self.os_name
            .clone()
            .unwrap_or_else(|| std::env::consts::OS.to_string())
    }

    fn os_family(&self) -> String {
        self.os_family
            .clone()
            .unwrap_or_else(|| std::env::consts::FAMILY.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn host() -> ConfiguredHost {
        ConfiguredHost::new(
            HostVersion {
                version: 2024100700,
                release: "4.5 (Build: 20241007)".to_string(),
                branch: 405,
            },
            RuntimeVersion {
                version: "8.3.6".to_string(),
                versionid: "80306".to_string(),
            },
            "pgsql",
        )
    }

    #[test]
    fn os_defaults_to_running_platform() {
        let host = host();
        assert_eq!(host.os_name(), std::env::consts::OS);
        assert_eq!(host.os_family(), std::env::consts::FAMILY);
    }

    #[test]
    fn os_override_is_reported_verbatim() {
        let host = host().with_os("Linux", "Linux");
        assert_eq!(host.os_name(), "Linux");
        assert_eq!(host.os_family(), "Linux");
        assert_eq!(host.db_type(), "pgsql");
        assert_eq!(host.host_version().branch, 405);
    }
}
