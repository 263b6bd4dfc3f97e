//! Function handlers.
//!
//! Both functions run the same steps: validate parameters, check the
//! caller's capabilities, collect, reshape, and check the result against
//! the declared return description. They differ only in the reshaping.
//!
//! Note: handlers are `async fn` to match the server's tokio runtime, even
//! though the collectors are synchronous reads.

use pluginsfetcher_core::{
    AuthorizationPolicy, CallerContext, HostEnvironment, PluginFilter, PluginInfo, PluginRegistry,
    get_plugin_stats, get_software_stats, require_capability,
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::functions::{FunctionDefinition, GET_INFO, GET_INFORMATION};
use crate::schema::{clean_returnvalue, validate_parameters};
use crate::{Error, Result};

/// Everything a handler needs for one call.
pub struct CallContext<'a> {
    pub registry: &'a dyn PluginRegistry,
    pub host: &'a dyn HostEnvironment,
    pub policy: &'a dyn AuthorizationPolicy,
    pub caller: &'a CallerContext,
}

/// Handle a function call by dispatching to the matching handler
pub async fn handle_function_call(
    ctx: &CallContext<'_>,
    function: &FunctionDefinition,
    params: Map<String, Value>,
) -> Result<Value> {
    let result = match function.name.as_str() {
        GET_INFO => handle_get_info(ctx, function, params).await?,
        GET_INFORMATION => handle_get_information(ctx, function, params).await?,
        other => return Err(Error::UnknownFunction(other.to_string())),
    };
    clean_returnvalue(&function.returns, result)
}

/// Validate parameters and check capabilities, in that order.
fn prepare(
    ctx: &CallContext<'_>,
    function: &FunctionDefinition,
    params: Map<String, Value>,
) -> Result<PluginFilter> {
    let params = validate_parameters(&function.parameters, params)?;

    for capability in &function.capabilities {
        require_capability(ctx.policy, ctx.caller, capability)?;
    }

    // An empty type filters nothing, same as an absent one.
    let plugin_type = params
        .get("type")
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    let contrib_only = params
        .get("contribonly")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    Ok(PluginFilter {
        plugin_type,
        contrib_only,
    })
}

/// Handle get_info - plugins, plugin counts and software versions
async fn handle_get_info(
    ctx: &CallContext<'_>,
    function: &FunctionDefinition,
    params: Map<String, Value>,
) -> Result<Value> {
    let filter = prepare(ctx, function, params)?;
    debug!(user = %ctx.caller.user, ?filter, "get_info");

    let stats = get_plugin_stats(ctx.registry, &filter)?;
    let software = get_software_stats(ctx.host);

    Ok(json!({
        "plugins": stats.plugins,
        "pluginstats": stats.stats,
        "software": software,
    }))
}

/// Entry of the legacy plugin list.
#[derive(Debug, Serialize)]
struct LegacyPluginInfo {
    #[serde(rename = "type")]
    plugin_type: String,
    name: String,
    versiondb: String,
    release: String,
}

impl From<PluginInfo> for LegacyPluginInfo {
    fn from(plugin: PluginInfo) -> Self {
        Self {
            plugin_type: plugin.plugin_type,
            name: plugin.name,
            versiondb: plugin.version.to_string(),
            release: plugin.release,
        }
    }
}

/// Handle get_information - legacy flat plugin list
async fn handle_get_information(
    ctx: &CallContext<'_>,
    function: &FunctionDefinition,
    params: Map<String, Value>,
) -> Result<Value> {
    let filter = prepare(ctx, function, params)?;
    debug!(user = %ctx.caller.user, ?filter, "get_information");

    let stats = get_plugin_stats(ctx.registry, &filter)?;
    let plugins: Vec<LegacyPluginInfo> = stats.plugins.into_iter().map(Into::into).collect();

    Ok(serde_json::to_value(plugins)?)
}
