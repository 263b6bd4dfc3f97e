//! Function and service declarations.
//!
//! # Functions
//!
//! - `local_pluginsfetcher_get_info` - plugin list, plugin counts and host
//!   software versions
//! - `local_pluginsfetcher_get_information` - legacy flat plugin list
//!
//! # Services
//!
//! A token is bound to one service, and may only call the functions that
//! service lists while it is enabled. The legacy service ships disabled.

use pluginsfetcher_core::{Capability, ServiceConfig};
use serde_json::{Value, json};

use crate::schema::{ExternalDescription, ParamType, to_json_schema};

pub const GET_INFO: &str = "local_pluginsfetcher_get_info";
pub const GET_INFORMATION: &str = "local_pluginsfetcher_get_information";

pub const SERVICE: &str = "pluginsfetcher";
pub const LEGACY_SERVICE: &str = "pluginsfetcher_legacy";

/// Declaration of a callable function.
#[derive(Debug, Clone)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// `read` or `write`.
    pub kind: String,
    pub capabilities: Vec<Capability>,
    pub parameters: ExternalDescription,
    pub returns: ExternalDescription,
}

impl FunctionDefinition {
    /// JSON form used by `functions/list`.
    pub fn to_json(&self, services: &[ServiceDefinition]) -> Value {
        let in_services: Vec<&str> = services
            .iter()
            .filter(|s| s.functions.iter().any(|f| f == &self.name))
            .map(|s| s.shortname.as_str())
            .collect();
        json!({
            "name": self.name,
            "description": self.description,
            "type": self.kind,
            "capabilities": self.capabilities,
            "services": in_services,
            "inputSchema": to_json_schema(&self.parameters),
            "outputSchema": to_json_schema(&self.returns),
        })
    }
}

/// A named group of functions tokens are issued for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDefinition {
    pub shortname: String,
    pub name: String,
    pub functions: Vec<String>,
    pub enabled: bool,
}

impl ServiceDefinition {
    pub fn allows(&self, function: &str) -> bool {
        self.enabled && self.functions.iter().any(|f| f == function)
    }
}

/// Parameters shared by both functions.
fn filter_parameters() -> ExternalDescription {
    ExternalDescription::single(
        "",
        [
            (
                "type",
                ExternalDescription::value(
                    ParamType::Text,
                    "Filter returned plugins by type (e.g., mod, local, block, etc.)",
                )
                .with_default(Value::Null),
            ),
            (
                "contribonly",
                ExternalDescription::value(
                    ParamType::Bool,
                    "If true, only return installed 3rd-party plugins (exclude standard plugins)",
                )
                .with_default(Value::Bool(false)),
            ),
        ],
    )
}

fn text(description: &str) -> ExternalDescription {
    ExternalDescription::value(ParamType::Text, description)
}

fn int(description: &str) -> ExternalDescription {
    ExternalDescription::value(ParamType::Int, description)
}

fn get_info_returns() -> ExternalDescription {
    ExternalDescription::single(
        "",
        [
            (
                "plugins",
                ExternalDescription::multiple(
                    "Info about installed plugins",
                    ExternalDescription::single(
                        "",
                        [
                            ("type", text("Type of the plugin (e.g., mod, local, block, ...)")),
                            ("name", text("Internal name of the plugin (e.g., quiz)")),
                            ("displayname", text("Human-readable name of the plugin (e.g. \"Quiz\")")),
                            ("version", int("Version number of the installed plugin from the database")),
                            ("release", text("Release identifier of the plugin (e.g., 3.11.0)")),
                            ("requires", int("Host version required by the plugin (e.g., 2022112800)")),
                            (
                                "supported",
                                ExternalDescription::multiple(
                                    "",
                                    int("Supported host branches (e.g., 401, 500)"),
                                ),
                            ),
                            (
                                "isstandard",
                                ExternalDescription::value(
                                    ParamType::Bool,
                                    "Whether the plugin is a standard plugin (true) or a contributed plugin (false)",
                                ),
                            ),
                            ("status", text("Status of the plugin (e.g., uptodate, new, upgrade)")),
                        ],
                    ),
                ),
            ),
            (
                "pluginstats",
                ExternalDescription::single(
                    "",
                    [
                        ("total", int("Total number of installed plugins")),
                        ("standard", int("Number of standard plugins installed")),
                        ("contrib", int("Number of contributed plugins installed")),
                    ],
                ),
            ),
            (
                "software",
                ExternalDescription::single(
                    "Info about installed software",
                    [
                        (
                            "moodle",
                            ExternalDescription::single(
                                "",
                                [
                                    ("version", int("Host version number (e.g., 2022112800)")),
                                    ("release", text("Host release identifier (e.g., 4.1)")),
                                    ("branch", int("Host branch number (e.g., 401 for 4.1)")),
                                ],
                            ),
                        ),
                        (
                            "php",
                            ExternalDescription::single(
                                "",
                                [
                                    ("version", text("Runtime version in human-readable format (e.g., 8.1.0)")),
                                    ("versionid", text("Runtime release identifier (e.g., 80100)")),
                                ],
                            ),
                        ),
                        (
                            "db",
                            ExternalDescription::single(
                                "",
                                [("type", text("Database type (e.g., mysql, pgsql)"))],
                            ),
                        ),
                        (
                            "os",
                            ExternalDescription::single(
                                "",
                                [
                                    ("name", text("Operating system name")),
                                    ("family", text("Operating system family")),
                                ],
                            ),
                        ),
                    ],
                ),
            ),
        ],
    )
}

fn get_information_returns() -> ExternalDescription {
    ExternalDescription::multiple(
        "plugins",
        ExternalDescription::single(
            "",
            [
                ("type", text("The type")),
                ("name", text("The name")),
                ("versiondb", text("The installed version")),
                ("release", text("The installed release")),
            ],
        ),
    )
}

/// Get all function definitions
pub fn get_function_definitions() -> Vec<FunctionDefinition> {
    vec![
        FunctionDefinition {
            name: GET_INFO.to_string(),
            description: "Retrieves information about installed plugins and used software versions."
                .to_string(),
            kind: "read".to_string(),
            capabilities: vec![Capability::site_config()],
            parameters: filter_parameters(),
            returns: get_info_returns(),
        },
        FunctionDefinition {
            name: GET_INFORMATION.to_string(),
            description: "Legacy API to retrieve information about installed plugins.".to_string(),
            kind: "read".to_string(),
            capabilities: vec![Capability::site_config()],
            parameters: filter_parameters(),
            returns: get_information_returns(),
        },
    ]
}

/// Look up a function definition by name.
pub fn find_function(name: &str) -> Option<FunctionDefinition> {
    get_function_definitions().into_iter().find(|f| f.name == name)
}

/// Built-in services: the current one enabled, the legacy one disabled.
pub fn default_services() -> Vec<ServiceDefinition> {
    vec![
        ServiceDefinition {
            shortname: SERVICE.to_string(),
            name: "Plugins fetcher".to_string(),
            functions: vec![GET_INFO.to_string()],
            enabled: true,
        },
        ServiceDefinition {
            shortname: LEGACY_SERVICE.to_string(),
            name: "Plugins fetcher (legacy)".to_string(),
            functions: vec![GET_INFORMATION.to_string()],
            enabled: false,
        },
    ]
}

/// Built-in services with the configuration's enabled overrides applied.
pub fn configured_services(config: &ServiceConfig) -> Vec<ServiceDefinition> {
    default_services()
        .into_iter()
        .map(|mut service| {
            if let Some(enabled) = config.service_enabled(&service.shortname) {
                service.enabled = enabled;
            }
            service
        })
        .collect()
}
