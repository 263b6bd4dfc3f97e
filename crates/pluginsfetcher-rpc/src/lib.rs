//! JSON-RPC endpoints for pluginsfetcher
//!
//! Exposes the plugin inventory collected by `pluginsfetcher-core` to
//! monitoring tools over JSON-RPC 2.0:
//!
//! ```text
//! [ monitoring client ]
//!        | (JSON-RPC, wstoken in params)
//!        v
//! [ pluginsfetcher-rpc ]  token -> service -> validate -> capability
//!        |
//!        v
//! [ pluginsfetcher-core ] collectors over the plugin registry and host
//! ```
//!
//! # Functions
//!
//! - `local_pluginsfetcher_get_info` - plugins, counts and software versions
//! - `local_pluginsfetcher_get_information` - legacy flat plugin list
//!
//! `functions/list` describes both, with JSON schemas for input and output.

pub mod error;
pub mod functions;
pub mod handlers;
pub mod protocol;
pub mod schema;
pub mod server;

pub use error::{Error, Result};
pub use functions::{
    FunctionDefinition, ServiceDefinition, default_services, find_function,
    get_function_definitions,
};
pub use server::PluginsFetcherServer;
