//! MCP Tool definitions and handlers
//!
//! Defines all available tools and their implementations.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use validator::Validate;

use crate::config::OdooDefaults;
use crate::error::ValidationError;
use crate::mcp::types::{CallToolResult, Tool};
use crate::odoo::client::OdooClient;
use crate::odoo::session::Session;
use crate::odoo::types::*;

/// Tool names
pub mod names {
    pub const CONNECT: &str = "odoo_connect";
    pub const SEARCH: &str = "odoo_search";
    pub const READ: &str = "odoo_read";
    pub const CREATE: &str = "odoo_create";
    pub const WRITE: &str = "odoo_write";
    pub const UNLINK: &str = "odoo_unlink";
    pub const CALL: &str = "odoo_call";
    pub const GET_MODELS: &str = "odoo_get_models";
    pub const GET_FIELDS: &str = "odoo_get_fields";
    pub const COUNT: &str = "odoo_count";
    pub const READ_GROUP: &str = "odoo_read_group";
}

const NOT_CONNECTED: &str = "Not connected to Odoo. Use odoo_connect first.";

/// Tool handler
pub struct ToolHandler {
    session: Session,

    /// Fallbacks for parameters omitted from `odoo_connect`
    defaults: OdooDefaults,
}

impl ToolHandler {
    /// Create a new tool handler
    pub fn new(session: Session, defaults: OdooDefaults) -> Self {
        Self { session, defaults }
    }

    /// List all available tools
    pub fn list_tools(&self) -> Vec<Tool> {
        vec![
            tool_def::<ConnectRequest>(names::CONNECT, "Connect to Odoo instance"),
            tool_def::<SearchRequest>(names::SEARCH, "Search records in Odoo model"),
            tool_def::<ReadRequest>(names::READ, "Read specific records from Odoo model by ID"),
            tool_def::<CreateRequest>(names::CREATE, "Create new record in Odoo"),
            tool_def::<WriteRequest>(names::WRITE, "Update existing records in Odoo"),
            tool_def::<UnlinkRequest>(names::UNLINK, "Delete records from Odoo"),
            tool_def::<CallMethodRequest>(names::CALL, "Call method on Odoo model"),
            tool_def::<GetModelsRequest>(names::GET_MODELS, "Get list of available Odoo models"),
            tool_def::<GetFieldsRequest>(names::GET_FIELDS, "Get fields information for an Odoo model"),
            tool_def::<CountRequest>(names::COUNT, "Count records in Odoo model"),
            tool_def::<ReadGroupRequest>(names::READ_GROUP, "Aggregate records in Odoo model with read_group"),
        ]
    }

    /// Call a tool by name
    pub async fn call_tool(&self, name: &str, args: Value) -> CallToolResult {
        tracing::debug!(tool = name, "Calling tool");

        match name {
            names::CONNECT => self.handle_connect(args).await,
            names::SEARCH => self.handle_search(args).await,
            names::READ => self.handle_read(args).await,
            names::CREATE => self.handle_create(args).await,
            names::WRITE => self.handle_write(args).await,
            names::UNLINK => self.handle_unlink(args).await,
            names::CALL => self.handle_call(args).await,
            names::GET_MODELS => self.handle_get_models(args).await,
            names::GET_FIELDS => self.handle_get_fields(args).await,
            names::COUNT => self.handle_count(args).await,
            names::READ_GROUP => self.handle_read_group(args).await,
            _ => CallToolResult::error(format!("Unknown tool: {}", name)),
        }
    }

    /// Current client, or a ready-made "not connected" result
    async fn client(&self) -> Result<Arc<OdooClient>, CallToolResult> {
        self.session
            .client()
            .await
            .map_err(|_| CallToolResult::error(NOT_CONNECTED))
    }

    // ==================== Tool Handlers ====================

    async fn handle_connect(&self, args: Value) -> CallToolResult {
        let args: ConnectRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };

        let params = match ConnectionParams::resolve(args, &self.defaults) {
            Ok(p) => p,
            Err(e) => return CallToolResult::error(e.to_string()),
        };

        match self.session.connect(params).await {
            Ok(client) => CallToolResult::text(format!(
                "Successfully connected to Odoo at {} (database: {})",
                client.url(),
                client.database()
            )),
            Err(e) => {
                tracing::error!("Connection error: {}", e);
                CallToolResult::error(format!("Connection failed: {}", e))
            }
        }
    }

    async fn handle_search(&self, args: Value) -> CallToolResult {
        let args: SearchRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client
            .search_read(&args.model, &args.domain, &args.fields, args.limit)
            .await
        {
            Ok(records) => CallToolResult::text(format!(
                "Found {} records: {}",
                records.len(),
                compact(&records)
            )),
            Err(e) => CallToolResult::error(format!("Search failed: {}", e)),
        }
    }

    async fn handle_read(&self, args: Value) -> CallToolResult {
        let args: ReadRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.read(&args.model, &args.ids, &args.fields).await {
            Ok(records) => CallToolResult::text(format!(
                "Found {} records: {}",
                records.len(),
                compact(&records)
            )),
            Err(e) => CallToolResult::error(format!("Read failed: {}", e)),
        }
    }

    async fn handle_create(&self, args: Value) -> CallToolResult {
        let args: CreateRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.create(&args.model, &args.values).await {
            Ok(id) => CallToolResult::text(format!("Created record with ID: {}", id)),
            Err(e) => CallToolResult::error(format!("Create failed: {}", e)),
        }
    }

    async fn handle_write(&self, args: Value) -> CallToolResult {
        let args: WriteRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.write(&args.model, &args.ids, &args.values).await {
            Ok(result) => CallToolResult::text(format!(
                "Updated {} records: {}",
                args.ids.len(),
                result
            )),
            Err(e) => CallToolResult::error(format!("Update failed: {}", e)),
        }
    }

    async fn handle_unlink(&self, args: Value) -> CallToolResult {
        let args: UnlinkRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.unlink(&args.model, &args.ids).await {
            Ok(result) => CallToolResult::text(format!(
                "Deleted {} records: {}",
                args.ids.len(),
                result
            )),
            Err(e) => CallToolResult::error(format!("Delete failed: {}", e)),
        }
    }

    async fn handle_call(&self, args: Value) -> CallToolResult {
        let args: CallMethodRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client
            .call_method(&args.model, &args.method, args.args, args.kwargs)
            .await
        {
            Ok(result) => CallToolResult::text(format!("Method result: {}", compact(&result))),
            Err(e) => CallToolResult::error(format!("Method call failed: {}", e)),
        }
    }

    async fn handle_get_models(&self, args: Value) -> CallToolResult {
        let args: GetModelsRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.get_models(args.filter.as_deref()).await {
            Ok(models) => CallToolResult::text(format!("Available models: {}", pretty(&models))),
            Err(e) => CallToolResult::error(format!("Get models failed: {}", e)),
        }
    }

    async fn handle_get_fields(&self, args: Value) -> CallToolResult {
        let args: GetFieldsRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.get_fields(&args.model).await {
            Ok(fields) => CallToolResult::text(format!(
                "Fields for {}: {}",
                args.model,
                pretty(&fields)
            )),
            Err(e) => CallToolResult::error(format!("Get fields failed: {}", e)),
        }
    }

    async fn handle_count(&self, args: Value) -> CallToolResult {
        let args: CountRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client.count(&args.model, &args.domain).await {
            Ok(count) => CallToolResult::text(format!(
                "Record count for {}: {}",
                args.model, count
            )),
            Err(e) => CallToolResult::error(format!("Count failed: {}", e)),
        }
    }

    async fn handle_read_group(&self, args: Value) -> CallToolResult {
        let args: ReadGroupRequest = match parse_args(args) {
            Ok(a) => a,
            Err(e) => return CallToolResult::error(e.to_string()),
        };
        let client = match self.client().await {
            Ok(c) => c,
            Err(r) => return r,
        };

        match client
            .read_group(
                &args.model,
                &args.domain,
                &args.fields,
                &args.groupby,
                args.limit,
                args.orderby.as_deref(),
                args.lazy,
            )
            .await
        {
            Ok(groups) => CallToolResult::text(format!(
                "Found {} groups: {}",
                groups.len(),
                compact(&groups)
            )),
            Err(e) => CallToolResult::error(format!("Read group failed: {}", e)),
        }
    }
}

/// Deserialize and validate tool arguments
///
/// A missing `arguments` object is treated as `{}`.
pub fn parse_args<T>(args: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let args = if args.is_null() { json!({}) } else { args };

    let parsed: T = serde_json::from_value(args).map_err(|e| ValidationError::InvalidArguments {
        message: e.to_string(),
    })?;
    parsed.validate()?;

    Ok(parsed)
}

// ==================== Schema Definitions ====================

fn tool_def<T: JsonSchema>(name: &str, description: &str) -> Tool {
    Tool {
        name: name.to_string(),
        description: Some(description.to_string()),
        input_schema: input_schema::<T>(),
    }
}

/// JSON schema of a request type, as MCP `inputSchema`
pub fn input_schema<T: JsonSchema>() -> Value {
    let mut schema = serde_json::to_value(schemars::schema_for!(T))
        .unwrap_or_else(|_| json!({"type": "object"}));

    if let Some(obj) = schema.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    schema
}

fn compact<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_default()
}

fn pretty<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}
