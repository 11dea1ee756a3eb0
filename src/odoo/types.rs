//! Odoo request and connection types
//!
//! Every operation exposed by the server has one request struct here. Both the
//! MCP tools and the HTTP routes deserialize into these, validate them, and the
//! MCP tool catalog derives its input schemas from them.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use validator::Validate;

use crate::config::{odoo::DEFAULT_LIMIT, OdooDefaults};
use crate::error::OdooError;

/// Search filter passed through to Odoo untouched,
/// e.g. `[["is_company", "=", true], "|", ...]`
pub type Domain = Vec<Value>;

fn default_limit() -> Option<u32> {
    Some(DEFAULT_LIMIT)
}

fn default_lazy() -> bool {
    true
}

/// Connect to an Odoo instance
///
/// Missing parameters fall back to the ODOO_* environment variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ConnectRequest {
    /// Odoo server URL
    #[serde(default)]
    pub url: Option<String>,

    /// Database name
    #[serde(default)]
    pub database: Option<String>,

    /// Username
    #[serde(default)]
    pub username: Option<String>,

    /// Password
    #[serde(default)]
    pub password: Option<String>,
}

/// Search and read records of a model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct SearchRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Search domain
    #[serde(default)]
    pub domain: Domain,

    /// Fields to retrieve (empty for all)
    #[serde(default)]
    pub fields: Vec<String>,

    /// Maximum records (null for no limit)
    #[serde(default = "default_limit")]
    pub limit: Option<u32>,
}

/// Read specific records by ID
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ReadRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Record IDs to read
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<i64>,

    /// Fields to retrieve (empty for all)
    #[serde(default)]
    pub fields: Vec<String>,
}

/// Create a new record
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CreateRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Record values
    pub values: Map<String, Value>,
}

/// Update existing records
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct WriteRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Record IDs to update
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<i64>,

    /// Values to update
    pub values: Map<String, Value>,
}

/// Delete records
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct UnlinkRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Record IDs to delete
    #[validate(length(min = 1, message = "ids must not be empty"))]
    pub ids: Vec<i64>,
}

/// Call an arbitrary method on a model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CallMethodRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Method name
    #[validate(length(min = 1, message = "method must not be empty"))]
    pub method: String,

    /// Method arguments
    #[serde(default)]
    pub args: Vec<Value>,

    /// Method keyword arguments
    #[serde(default)]
    pub kwargs: Map<String, Value>,
}

/// List the models installed on the instance
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GetModelsRequest {
    /// Filter models by name pattern
    #[serde(default)]
    pub filter: Option<String>,
}

/// Describe the fields of a model
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct GetFieldsRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,
}

/// Count records matching a domain
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct CountRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Search domain
    #[serde(default)]
    pub domain: Domain,
}

/// Aggregate records with `read_group`
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
pub struct ReadGroupRequest {
    /// Odoo model name
    #[validate(length(min = 1, message = "model must not be empty"))]
    pub model: String,

    /// Search domain
    #[serde(default)]
    pub domain: Domain,

    /// Fields with optional aggregates, e.g. "expected_revenue:sum"
    #[serde(default)]
    pub fields: Vec<String>,

    /// Fields to group by, e.g. ["stage_id"]
    #[serde(default)]
    pub groupby: Vec<String>,

    /// Maximum groups (null for no limit)
    #[serde(default = "default_limit")]
    pub limit: Option<u32>,

    /// Ordering, e.g. "expected_revenue desc"
    #[serde(default)]
    pub orderby: Option<String>,

    /// Only group by the first groupby field
    #[serde(default = "default_lazy")]
    pub lazy: bool,
}

/// Fully resolved credentials for one Odoo instance
#[derive(Clone)]
pub struct ConnectionParams {
    pub url: String,
    pub database: String,
    pub username: String,
    pub password: String,
}

impl ConnectionParams {
    /// Merge a connect request with the configured defaults
    ///
    /// Request values win; empty strings count as absent.
    pub fn resolve(request: ConnectRequest, defaults: &OdooDefaults) -> Result<Self, OdooError> {
        fn pick(given: Option<String>, fallback: &Option<String>) -> Option<String> {
            given
                .filter(|v| !v.trim().is_empty())
                .or_else(|| fallback.clone())
        }

        match (
            pick(request.url, &defaults.url),
            pick(request.database, &defaults.database),
            pick(request.username, &defaults.username),
            pick(request.password, &defaults.password),
        ) {
            (Some(url), Some(database), Some(username), Some(password)) => Ok(Self {
                url,
                database,
                username,
                password,
            }),
            _ => Err(OdooError::MissingConnectionParams),
        }
    }
}

impl std::fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("url", &self.url)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

/// Public description of the active connection
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionInfo {
    pub url: String,
    pub database: String,
    pub username: String,
    pub uid: i64,
}
