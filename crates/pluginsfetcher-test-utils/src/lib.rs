//! Shared test utilities for the pluginsfetcher workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`fixtures`] - sample registry, host and tokens
//! - [`site`] - [`TestSite`] builder writing config and snapshot to a temp dir

pub mod fixtures;
pub mod site;

pub use fixtures::{
    ADMIN_TOKEN, BrokenRegistry, LEGACY_TOKEN, LEGACY_UNPRIVILEGED_TOKEN, MONITOR_TOKEN,
    UNPRIVILEGED_TOKEN, sample_host, sample_plugins, sample_registry, sample_token_grants,
    sample_tokens,
};
pub use site::TestSite;
