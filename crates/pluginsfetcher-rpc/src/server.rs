//! JSON-RPC server
//!
//! Reads newline-delimited JSON-RPC 2.0 requests from stdin and writes one
//! response line per request to stdout. Every function call goes through
//! the same checks:
//!
//! 1. token lookup and service access
//! 2. parameter validation
//! 3. capability check
//! 4. collection and return-value cleaning

use std::io::{BufRead, Write};
use std::sync::Arc;

use pluginsfetcher_core::{
    AuthorizationPolicy, CallerContext, ConfiguredHost, GrantedCapabilities, HostEnvironment,
    PluginRegistry, ServiceConfig, SnapshotRegistry, TokenTable,
};
use serde_json::{Value, json};
use tracing::{debug, info, warn};

use crate::error::codes;
use crate::functions::{
    FunctionDefinition, ServiceDefinition, configured_services, default_services,
    get_function_definitions,
};
use crate::handlers::{CallContext, handle_function_call};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, split_token};
use crate::{Error, Result};

/// Plugin inventory server
///
/// # Example
///
/// ```ignore
/// use pluginsfetcher_rpc::PluginsFetcherServer;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = pluginsfetcher_core::ServiceConfig::load("pluginsfetcher.toml".as_ref())?;
///     let server = PluginsFetcherServer::from_config(&config);
///     server.run().await?;
///     Ok(())
/// }
/// ```
pub struct PluginsFetcherServer {
    registry: Arc<dyn PluginRegistry>,
    host: Arc<dyn HostEnvironment>,
    policy: Arc<dyn AuthorizationPolicy>,
    tokens: TokenTable,
    services: Vec<ServiceDefinition>,
    functions: Vec<FunctionDefinition>,
}

impl PluginsFetcherServer {
    /// Create a server with the built-in services, no tokens, and the
    /// [`GrantedCapabilities`] policy.
    pub fn new(registry: Arc<dyn PluginRegistry>, host: Arc<dyn HostEnvironment>) -> Self {
        Self {
            registry,
            host,
            policy: Arc::new(GrantedCapabilities),
            tokens: TokenTable::new(),
            services: default_services(),
            functions: get_function_definitions(),
        }
    }

    /// Build a server from loaded configuration.
    pub fn from_config(config: &ServiceConfig) -> Self {
        Self::new(
            Arc::new(SnapshotRegistry::new(&config.registry.snapshot)),
            Arc::new(ConfiguredHost::from_config(&config.host)),
        )
        .with_tokens(config.token_table())
        .with_services(configured_services(config))
    }

    pub fn with_policy(mut self, policy: Arc<dyn AuthorizationPolicy>) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_tokens(mut self, tokens: TokenTable) -> Self {
        self.tokens = tokens;
        self
    }

    pub fn with_services(mut self, services: Vec<ServiceDefinition>) -> Self {
        self.services = services;
        self
    }

    /// Serve requests from stdin until EOF.
    pub async fn run(&self) -> Result<()> {
        let stdin = std::io::stdin();
        let mut stdout = std::io::stdout();

        info!(
            tokens = self.tokens.len(),
            services = self.services.iter().filter(|s| s.enabled).count(),
            "pluginsfetcher ready, listening on stdio"
        );

        for line in stdin.lock().lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }

            let response = self.handle_message(&line).await?;
            if !response.is_empty() {
                writeln!(stdout, "{}", response)?;
                stdout.flush()?;
            }
        }

        info!("stdin closed, shutting down");
        Ok(())
    }

    /// Handle a single JSON-RPC message.
    ///
    /// Returns the serialized response, or an empty string for notifications.
    pub async fn handle_message(&self, message: &str) -> Result<String> {
        debug!(request = %message, "Received message");

        let request: JsonRpcRequest = match serde_json::from_str(message) {
            Ok(request) => request,
            Err(e) => {
                let response =
                    JsonRpcResponse::error(None, codes::PARSE_ERROR, format!("Parse error: {e}"));
                return serde_json::to_string(&response).map_err(Error::from);
            }
        };

        if request.jsonrpc != "2.0" {
            let response = JsonRpcResponse::error(
                request.id,
                codes::INVALID_REQUEST,
                format!("Invalid Request: unsupported jsonrpc version '{}'", request.jsonrpc),
            );
            return serde_json::to_string(&response).map_err(Error::from);
        }

        let notification = request.is_notification();
        let response = match request.method.as_str() {
            "functions/list" => self.handle_functions_list(request.id),
            method => match self.functions.iter().find(|f| f.name == method) {
                Some(function) => match self.call_function(function, request.params).await {
                    Ok(result) => JsonRpcResponse::success(request.id, result),
                    Err(e) => JsonRpcResponse::from_error(request.id, &e),
                },
                None => JsonRpcResponse::error(
                    request.id,
                    codes::METHOD_NOT_FOUND,
                    format!("Method not found: {}", request.method),
                ),
            },
        };

        if notification {
            return Ok(String::new());
        }
        serde_json::to_string(&response).map_err(Error::from)
    }

    /// Handle functions/list: declared functions with their schemas.
    fn handle_functions_list(&self, id: Option<Value>) -> JsonRpcResponse {
        let functions: Vec<Value> = self
            .functions
            .iter()
            .map(|f| f.to_json(&self.services))
            .collect();
        JsonRpcResponse::success(id, json!({ "functions": functions }))
    }

    /// Authenticate the token, then run the function.
    async fn call_function(&self, function: &FunctionDefinition, params: Value) -> Result<Value> {
        let (token, params) = split_token(params)?;
        let caller = self.authenticate(token.as_deref(), &function.name)?;

        let ctx = CallContext {
            registry: self.registry.as_ref(),
            host: self.host.as_ref(),
            policy: self.policy.as_ref(),
            caller: &caller,
        };

        let result = handle_function_call(&ctx, function, params).await;
        match &result {
            Ok(_) => info!(function = %function.name, user = %caller.user, "Function call succeeded"),
            Err(e) => warn!(function = %function.name, user = %caller.user, error = %e, "Function call failed"),
        }
        result
    }

    /// Resolve a token to its caller, checking that the token's service is
    /// enabled and exposes `function`.
    fn authenticate(&self, token: Option<&str>, function: &str) -> Result<CallerContext> {
        let token = token.ok_or_else(|| Error::AccessDenied("Invalid token - token not found".to_string()))?;
        let grant = self
            .tokens
            .get(token)
            .ok_or_else(|| Error::AccessDenied("Invalid token - token not found".to_string()))?;

        let service = self
            .services
            .iter()
            .find(|s| s.shortname == grant.service)
            .ok_or_else(|| {
                Error::AccessDenied(format!("Service '{}' does not exist", grant.service))
            })?;
        if !service.enabled {
            return Err(Error::AccessDenied(format!(
                "Service '{}' is not enabled",
                service.shortname
            )));
        }
        if !service.allows(function) {
            return Err(Error::AccessDenied(format!(
                "Function '{function}' is not available in service '{}'",
                service.shortname
            )));
        }

        Ok(grant.caller())
    }

    /// Declared functions
    pub fn functions(&self) -> &[FunctionDefinition] {
        &self.functions
    }

    /// Services, with configuration applied
    pub fn services(&self) -> &[ServiceDefinition] {
        &self.services
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pluginsfetcher_core::{
        Capability, HostVersion, PluginRecord, RuntimeVersion, StaticRegistry, TokenGrant,
    };

    const TOKEN: &str = "token-1";

    fn server() -> PluginsFetcherServer {
        let registry: StaticRegistry = [PluginRecord::new("mod", "quiz", "Quiz").standard(true)]
            .into_iter()
            .collect();
        let host = ConfiguredHost::new(
            HostVersion {
                version: 2024100700,
                release: "4.5".to_string(),
                branch: 405,
            },
            RuntimeVersion {
                version: "8.3.6".to_string(),
                versionid: "80306".to_string(),
            },
            "pgsql",
        );
        let tokens: TokenTable = [TokenGrant {
            token: TOKEN.to_string(),
            user: "monitor".to_string(),
            service: "pluginsfetcher".to_string(),
            capabilities: vec![Capability::SITE_CONFIG.to_string()],
            site_admin: false,
        }]
        .into_iter()
        .collect();
        PluginsFetcherServer::new(Arc::new(registry), Arc::new(host)).with_tokens(tokens)
    }

    #[test]
    fn server_creation() {
        let server = server();
        assert_eq!(server.functions().len(), 2);
        assert_eq!(server.services().len(), 2);
    }

    #[tokio::test]
    async fn test_handle_functions_list() {
        let request = r#"{"jsonrpc":"2.0","id":1,"method":"functions/list"}"#;
        let response = server().handle_message(request).await.unwrap();
        assert!(response.contains("local_pluginsfetcher_get_info"));
        assert!(response.contains("local_pluginsfetcher_get_information"));
        assert!(response.contains("inputSchema"));
    }

    #[tokio::test]
    async fn test_handle_get_info() {
        let request = format!(
            r#"{{"jsonrpc":"2.0","id":2,"method":"local_pluginsfetcher_get_info","params":{{"wstoken":"{TOKEN}"}}}}"#
        );
        let response: Value =
            serde_json::from_str(&server().handle_message(&request).await.unwrap()).unwrap();
        assert_eq!(response["id"], 2);
        assert_eq!(response["result"]["pluginstats"]["total"], 1);
        assert!(response.get("error").is_none());
    }

    #[tokio::test]
    async fn test_handle_unknown_method() {
        let request = r#"{"jsonrpc":"2.0","id":4,"method":"unknown/method","params":{}}"#;
        let response = server().handle_message(request).await.unwrap();
        assert!(response.contains("-32601"));
        assert!(response.contains("Method not found"));
    }

    #[tokio::test]
    async fn test_handle_invalid_json() {
        let response = server().handle_message(r#"{"invalid json"#).await.unwrap();
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed["error"]["code"], codes::PARSE_ERROR);
        assert_eq!(parsed.get("id"), Some(&Value::Null));
    }

    #[tokio::test]
    async fn test_null_id_gets_a_response() {
        let request = r#"{"jsonrpc":"2.0","id":null,"method":"functions/list"}"#;
        let response = server().handle_message(request).await.unwrap();
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed.get("id"), Some(&Value::Null));
        assert!(parsed["result"]["functions"].is_array());
    }

    #[tokio::test]
    async fn test_notification_gets_no_response() {
        let request = r#"{"jsonrpc":"2.0","method":"functions/list"}"#;
        let response = server().handle_message(request).await.unwrap();
        assert!(response.is_empty());
    }

    #[tokio::test]
    async fn test_wrong_jsonrpc_version() {
        let request = r#"{"jsonrpc":"1.0","id":9,"method":"functions/list"}"#;
        let parsed: Value =
            serde_json::from_str(&server().handle_message(request).await.unwrap()).unwrap();
        assert_eq!(parsed["error"]["code"], codes::INVALID_REQUEST);
        assert_eq!(parsed["id"], 9);
    }
}
