//! Error types for pluginsfetcher-core

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`], used by transports to pick an error code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller lacks a required capability.
    Authorization,
    /// The plugin registry or host environment could not be read.
    DataAccess,
    /// The service configuration is missing or malformed.
    Configuration,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Sorry, but you do not currently have permissions to do that ({capability}) [user: {user}]")]
    MissingCapability { capability: String, user: String },

    #[error("Plugin registry unavailable: {reason}")]
    RegistryUnavailable { reason: String },

    #[error("Plugin snapshot not found at {path}")]
    SnapshotNotFound { path: PathBuf },

    #[error("Invalid plugin snapshot at {path}: {message}")]
    InvalidSnapshot { path: PathBuf, message: String },

    #[error("Duplicate plugin component '{component}' in {path}")]
    DuplicateComponent { component: String, path: PathBuf },

    #[error("Snapshot too large: {path} is {size} bytes (max {max})")]
    SnapshotTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid configuration at {path}: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Config file too large: {path} is {size} bytes (max {max})")]
    ConfigTooLarge { path: PathBuf, size: u64, max: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::MissingCapability { .. } => ErrorKind::Authorization,
            Error::RegistryUnavailable { .. }
            | Error::SnapshotNotFound { .. }
            | Error::InvalidSnapshot { .. }
            | Error::DuplicateComponent { .. }
            | Error::SnapshotTooLarge { .. }
            | Error::Io(_) => ErrorKind::DataAccess,
            Error::ConfigNotFound { .. }
            | Error::InvalidConfig { .. }
            | Error::ConfigTooLarge { .. } => ErrorKind::Configuration,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_errors_are_data_access() {
        let err = Error::RegistryUnavailable {
            reason: "database went away".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::DataAccess);

        let err = Error::SnapshotNotFound {
            path: PathBuf::from("/nope/plugins.toml"),
        };
        assert_eq!(err.kind(), ErrorKind::DataAccess);
    }

    #[test]
    fn missing_capability_message_names_capability() {
        let err = Error::MissingCapability {
            capability: "moodle/site:config".to_string(),
            user: "guest".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Authorization);
        assert!(err.to_string().contains("moodle/site:config"));
    }
}
