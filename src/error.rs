//! Error types for the Odoo MCP Server
//!
//! This module defines the error hierarchy for all operations in the server.

use thiserror::Error;

/// Main error type for the Odoo MCP Server
#[derive(Error, Debug)]
pub enum OdooMcpError {
    /// Odoo API errors
    #[error("Odoo error: {0}")]
    Odoo(#[from] OdooError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// MCP protocol errors
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP client errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

/// Errors raised while talking to the remote Odoo instance
#[derive(Error, Debug)]
pub enum OdooError {
    #[error("Not connected to Odoo")]
    NotConnected,

    #[error("Missing connection parameters. Provide url, database, username, password or set environment variables.")]
    MissingConnectionParams,

    #[error("Authentication failed for user '{username}' on database '{database}'")]
    AuthenticationFailed { database: String, username: String },

    /// XML-RPC fault returned by the server
    #[error("Odoo fault {code}: {message}")]
    Fault { code: String, message: String },

    #[error("Malformed XML-RPC response: {message}")]
    MalformedResponse { message: String },

    #[error("XML-RPC request failed ({status}): {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

impl OdooError {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        OdooError::MalformedResponse {
            message: message.into(),
        }
    }
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {var}: '{value}'")]
    InvalidValue { var: String, value: String },
}

/// Validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid parameter: {name} - {message}")]
    InvalidParameter { name: String, message: String },

    #[error("Invalid arguments: {message}")]
    InvalidArguments { message: String },
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by_key(|(name, _)| *name);

        match fields.first() {
            Some((name, errs)) => ValidationError::InvalidParameter {
                name: name.to_string(),
                message: errs
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect::<Vec<_>>()
                    .join(", "),
            },
            None => ValidationError::InvalidArguments {
                message: errors.to_string(),
            },
        }
    }
}

/// MCP protocol errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Transport error: {message}")]
    TransportError { message: String },
}

/// Result type alias for Odoo MCP operations
pub type Result<T> = std::result::Result<T, OdooMcpError>;
