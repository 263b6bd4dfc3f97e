//! Plugin inventory reporting for pluginsfetcher.
//!
//! This crate reads an externally owned plugin registry and the host
//! environment, and turns them into the reports served by the
//! `pluginsfetcher-rpc` endpoints:
//!
//! - [`get_plugin_stats`] - filtered plugin list plus standard/contrib counts
//! - [`get_software_stats`] - host, runtime, database and OS versions
//!
//! The registry and host are injected through the [`PluginRegistry`] and
//! [`HostEnvironment`] traits; authorization is an injected
//! [`AuthorizationPolicy`].

pub mod auth;
pub mod collector;
pub mod config;
pub mod error;
pub mod host;
pub mod record;
pub mod registry;
pub mod snapshot;

pub use auth::{
    AuthorizationPolicy, CallerContext, Capability, GrantedCapabilities, TokenGrant, TokenTable,
    require_capability,
};
pub use collector::{
    DatabaseInfo, OsInfo, PluginCounts, PluginFilter, PluginInfo, PluginStats, SoftwareStats,
    get_plugin_stats, get_software_stats,
};
pub use config::{HostConfig, ServiceConfig};
pub use error::{Error, ErrorKind, Result};
pub use host::{ConfiguredHost, HostEnvironment, HostVersion, RuntimeVersion};
pub use record::{PluginRecord, PluginTypeGroup, component_name};
pub use registry::{PluginRegistry, StaticRegistry};
pub use snapshot::SnapshotRegistry;
