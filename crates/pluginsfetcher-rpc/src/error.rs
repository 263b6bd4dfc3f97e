//! Error types for the RPC server

use pluginsfetcher_core::ErrorKind;
use thiserror::Error;

/// Result type alias for RPC operations
pub type Result<T> = std::result::Result<T, Error>;

/// JSON-RPC error codes used by this server.
pub mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const DATA_ACCESS: i32 = -32000;
    pub const MISSING_CAPABILITY: i32 = -32001;
    pub const ACCESS_DENIED: i32 = -32002;
}

/// Errors that can occur while serving a request
#[derive(Debug, Error)]
pub enum Error {
    /// Error from the collectors, registry, policy or configuration
    #[error(transparent)]
    Core(#[from] pluginsfetcher_core::Error),

    /// Error during JSON serialization/deserialization
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Request parameters do not match the declared description
    #[error("Invalid parameter value detected: {0}")]
    InvalidParameter(String),

    /// Token unknown, or not allowed to call this function
    #[error("Access control exception: {0}")]
    AccessDenied(String),

    /// Handler output does not match the declared return description
    #[error("Invalid response value detected: {0}")]
    InvalidResponse(String),

    /// Unknown function requested
    #[error("unknown function: {0}")]
    UnknownFunction(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// JSON-RPC error code for this error.
    pub fn code(&self) -> i32 {
        match self {
            Error::Core(e) => match e.kind() {
                ErrorKind::Authorization => codes::MISSING_CAPABILITY,
                ErrorKind::DataAccess => codes::DATA_ACCESS,
                ErrorKind::Configuration => codes::INTERNAL_ERROR,
            },
            Error::InvalidParameter(_) => codes::INVALID_PARAMS,
            Error::AccessDenied(_) => codes::ACCESS_DENIED,
            Error::UnknownFunction(_) => codes::METHOD_NOT_FOUND,
            Error::Json(_) | Error::InvalidResponse(_) | Error::Io(_) => codes::INTERNAL_ERROR,
        }
    }

    /// Host-style error code string, if this error has one.
    pub fn errorcode(&self) -> Option<&'static str> {
        match self.code() {
            codes::INVALID_PARAMS => Some("invalidparameter"),
            codes::MISSING_CAPABILITY => Some("nopermissions"),
            codes::ACCESS_DENIED => Some("accessexception"),
            codes::DATA_ACCESS => Some("dmlreadexception"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_by_kind() {
        let err = Error::from(pluginsfetcher_core::Error::MissingCapability {
            capability: "moodle/site:config".to_string(),
            user: "student".to_string(),
        });
        assert_eq!(err.code(), codes::MISSING_CAPABILITY);
        assert_eq!(err.errorcode(), Some("nopermissions"));

        let err = Error::from(pluginsfetcher_core::Error::RegistryUnavailable {
            reason: "down".to_string(),
        });
        assert_eq!(err.code(), codes::DATA_ACCESS);
        assert_eq!(err.errorcode(), Some("dmlreadexception"));
    }

    #[test]
    fn local_errors() {
        assert_eq!(Error::InvalidParameter("x".into()).code(), codes::INVALID_PARAMS);
        assert_eq!(Error::AccessDenied("x".into()).errorcode(), Some("accessexception"));
        assert_eq!(Error::UnknownFunction("x".into()).code(), codes::METHOD_NOT_FOUND);
        assert_eq!(Error::InvalidResponse("x".into()).errorcode(), None);
    }
}
