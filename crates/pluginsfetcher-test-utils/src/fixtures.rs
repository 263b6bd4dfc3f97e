//! In-memory fixtures resembling a small production site.

use pluginsfetcher_core::{
    Capability, ConfiguredHost, Error, HostVersion, PluginRecord, PluginRegistry, PluginTypeGroup,
    Result, RuntimeVersion, StaticRegistry, TokenGrant, TokenTable,
};

/// Token of a site administrator bound to the current service.
pub const ADMIN_TOKEN: &str = "admintoken0000000000000000000001";
/// Token holding `moodle/site:config`, bound to the current service.
pub const MONITOR_TOKEN: &str = "monitortoken00000000000000000002";
/// Token bound to the current service without any capability.
pub const UNPRIVILEGED_TOKEN: &str = "nocaptoken0000000000000000000003";
/// Token holding `moodle/site:config`, bound to the legacy service.
pub const LEGACY_TOKEN: &str = "legacytoken000000000000000000004";
/// Token bound to the legacy service without any capability.
pub const LEGACY_UNPRIVILEGED_TOKEN: &str = "legacynocap00000000000000000005";

/// Plugins of the sample site, in registry order.
///
/// 4 types, 10 plugins: 6 standard, 4 contrib.
pub fn sample_plugins() -> Vec<PluginRecord> {
    vec![
        PluginRecord::new("mod", "assign", "Assignment")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
        PluginRecord::new("mod", "quiz", "Quiz")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
        PluginRecord::new("mod", "hvp", "Interactive Content")
            .with_version(2024020100, "1.26.1")
            .with_requires(2022112800)
            .with_supported(vec![401, 405]),
        PluginRecord::new("auth", "manual", "Manual accounts")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
        PluginRecord::new("auth", "saml2", "SAML2")
            .with_version(2024012900, "2024012900")
            .with_requires(2020061500)
            .with_status("upgrade"),
        PluginRecord::new("block", "html", "Text")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
        PluginRecord::new("block", "timeline", "Timeline")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
        PluginRecord::new("block", "configurable_reports", "Configurable Reports")
            .with_version(2023081000, "4.1.0")
            .with_requires(2022112800)
            .with_supported(vec![401, 402, 403]),
        PluginRecord::new("local", "pluginsfetcher", "Plugins fetcher")
            .with_version(2025060100, "2.0.0")
            .with_requires(2022112800)
            .with_supported(vec![401, 405])
            .with_status("new"),
        PluginRecord::new("local", "legacy_std", "Bundled local plugin")
            .with_version(2024100700, "4.5")
            .with_requires(2024100100)
            .standard(true),
    ]
}

pub fn sample_registry() -> StaticRegistry {
    sample_plugins().into_iter().collect()
}

pub fn sample_host() -> ConfiguredHost {
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
    .with_os("Linux", "Linux")
}

fn grant(token: &str, user: &str, service: &str, capabilities: &[&str], site_admin: bool) -> TokenGrant {
    TokenGrant {
        token: token.to_string(),
        user: user.to_string(),
        service: service.to_string(),
        capabilities: capabilities.iter().map(|c| c.to_string()).collect(),
        site_admin,
    }
}

pub fn sample_token_grants() -> Vec<TokenGrant> {
    vec![
        grant(ADMIN_TOKEN, "admin", "pluginsfetcher", &[], true),
        grant(
            MONITOR_TOKEN,
            "monitoring",
            "pluginsfetcher",
            &[Capability::SITE_CONFIG],
            false,
        ),
        grant(UNPRIVILEGED_TOKEN, "student", "pluginsfetcher", &[], false),
        grant(
            LEGACY_TOKEN,
            "legacymonitor",
            "pluginsfetcher_legacy",
            &[Capability::SITE_CONFIG],
            false,
        ),
        grant(
            LEGACY_UNPRIVILEGED_TOKEN,
            "legacystudent",
            "pluginsfetcher_legacy",
            &[],
            false,
        ),
    ]
}

pub fn sample_tokens() -> TokenTable {
    sample_token_grants().into_iter().collect()
}

/// A registry that always fails.
#[derive(Debug, Clone, Default)]
pub struct BrokenRegistry;

impl PluginRegistry for BrokenRegistry {
    fn plugins_by_type(&self) -> Result<Vec<PluginTypeGroup>> {
        Err(Error::RegistryUnavailable {
            reason: "error reading from database".to_string(),
        })
    }
}
