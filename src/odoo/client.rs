//! Odoo XML-RPC client
//!
//! Authenticates once against `/xmlrpc/2/common` and forwards every data
//! operation to `execute_kw` on `/xmlrpc/2/object` with the stored credentials.

use std::time::Duration;

use serde_json::{json, Map, Value};

use crate::config::odoo::{COMMON_PATH, OBJECT_PATH};
use crate::error::OdooError;
use crate::odoo::types::{ConnectionInfo, ConnectionParams, Domain};
use crate::odoo::xmlrpc;

type Result<T> = std::result::Result<T, OdooError>;

/// Authenticated Odoo client
///
/// A value of this type only exists after a successful `authenticate` call.
pub struct OdooClient {
    /// HTTP client
    http_client: reqwest::Client,

    /// Server URL without trailing slash
    url: String,

    database: String,
    username: String,
    password: String,

    /// User ID returned by `authenticate`
    uid: i64,
}

impl OdooClient {
    /// Authenticate against an Odoo instance
    pub async fn connect(params: ConnectionParams, timeout: Duration) -> Result<Self> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        let url = params.url.trim_end_matches('/').to_string();

        let result = call(
            &http_client,
            &format!("{}{}", url, COMMON_PATH),
            "authenticate",
            &[
                json!(params.database),
                json!(params.username),
                json!(params.password),
                json!({}),
            ],
        )
        .await?;

        let uid = match result.as_i64() {
            Some(uid) if uid > 0 => uid,
            _ => {
                tracing::warn!(
                    database = %params.database,
                    username = %params.username,
                    "Odoo rejected credentials"
                );
                return Err(OdooError::AuthenticationFailed {
                    database: params.database,
                    username: params.username,
                });
            }
        };

        tracing::info!("Connected to Odoo as user ID: {}", uid);

        Ok(Self {
            http_client,
            url,
            database: params.database,
            username: params.username,
            password: params.password,
            uid,
        })
    }

    /// Server URL the client is bound to
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Database the client is bound to
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Authenticated user ID
    pub fn uid(&self) -> i64 {
        self.uid
    }

    /// Describe the connection without exposing the password
    pub fn info(&self) -> ConnectionInfo {
        ConnectionInfo {
            url: self.url.clone(),
            database: self.database.clone(),
            username: self.username.clone(),
            uid: self.uid,
        }
    }

    // ==================== Raw RPC ====================

    /// Invoke `execute_kw` on the object service
    ///
    /// `kwargs` is omitted from the call entirely when `None`.
    pub async fn execute_kw(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Option<Map<String, Value>>,
    ) -> Result<Value> {
        let mut params = vec![
            json!(self.database),
            json!(self.uid),
            json!(self.password),
            json!(model),
            json!(method),
            Value::Array(args),
        ];
        if let Some(kwargs) = kwargs {
            params.push(Value::Object(kwargs));
        }

        tracing::debug!(model, method, "execute_kw");

        call(
            &self.http_client,
            &format!("{}{}", self.url, OBJECT_PATH),
            "execute_kw",
            &params,
        )
        .await
        .map_err(|e| {
            tracing::error!(model, method, error = %e, "execute_kw failed");
            e
        })
    }

    // ==================== Record Operations ====================

    /// Search and read records
    pub async fn search_read(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[String],
        limit: Option<u32>,
    ) -> Result<Vec<Value>> {
        let result = self
            .execute_kw(
                model,
                "search_read",
                vec![json!(domain)],
                Some(with_limit(kwargs(json!({"fields": fields})), limit)),
            )
            .await?;
        expect_array(result, "search_read")
    }

    /// Read specific records
    pub async fn read(&self, model: &str, ids: &[i64], fields: &[String]) -> Result<Vec<Value>> {
        let result = self
            .execute_kw(
                model,
                "read",
                vec![json!(ids)],
                Some(kwargs(json!({"fields": fields}))),
            )
            .await?;
        expect_array(result, "read")
    }

    /// Create a record, returning its ID
    pub async fn create(&self, model: &str, values: &Map<String, Value>) -> Result<i64> {
        let result = self
            .execute_kw(model, "create", vec![Value::Object(values.clone())], None)
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::malformed(format!("create returned {}", result)))
    }

    /// Update records
    pub async fn write(
        &self,
        model: &str,
        ids: &[i64],
        values: &Map<String, Value>,
    ) -> Result<Value> {
        self.execute_kw(
            model,
            "write",
            vec![json!(ids), Value::Object(values.clone())],
            None,
        )
        .await
    }

    /// Delete records
    pub async fn unlink(&self, model: &str, ids: &[i64]) -> Result<Value> {
        self.execute_kw(model, "unlink", vec![json!(ids)], None).await
    }

    /// Call any model method
    pub async fn call_method(
        &self,
        model: &str,
        method: &str,
        args: Vec<Value>,
        kwargs: Map<String, Value>,
    ) -> Result<Value> {
        self.execute_kw(model, method, args, Some(kwargs)).await
    }

    /// Count records matching a domain
    pub async fn count(&self, model: &str, domain: &Domain) -> Result<i64> {
        let result = self
            .execute_kw(model, "search_count", vec![json!(domain)], None)
            .await?;
        result
            .as_i64()
            .ok_or_else(|| OdooError::malformed(format!("search_count returned {}", result)))
    }

    /// Aggregate records with `read_group`
    #[allow(clippy::too_many_arguments)]
    pub async fn read_group(
        &self,
        model: &str,
        domain: &Domain,
        fields: &[String],
        groupby: &[String],
        limit: Option<u32>,
        orderby: Option<&str>,
        lazy: bool,
    ) -> Result<Vec<Value>> {
        let mut options = with_limit(kwargs(json!({"lazy": lazy})), limit);
        if let Some(orderby) = orderby {
            options.insert("orderby".to_string(), json!(orderby));
        }

        let result = self
            .execute_kw(
                model,
                "read_group",
                vec![json!(domain), json!(fields), json!(groupby)],
                Some(options),
            )
            .await?;
        expect_array(result, "read_group")
    }

    // ==================== Introspection ====================

    /// List installed models, optionally filtered by technical name
    pub async fn get_models(&self, filter: Option<&str>) -> Result<Vec<Value>> {
        // No limit: the filter is applied locally over the full list
        let result = self
            .execute_kw(
                "ir.model",
                "search_read",
                vec![json!([])],
                Some(kwargs(json!({"fields": ["model", "name", "info"]}))),
            )
            .await?;

        Ok(filter_models(expect_array(result, "search_read")?, filter))
    }

    /// Describe the fields of a model
    pub async fn get_fields(&self, model: &str) -> Result<Map<String, Value>> {
        let result = self
            .execute_kw(model, "fields_get", Vec::new(), Some(Map::new()))
            .await?;
        match result {
            Value::Object(fields) => Ok(fields),
            other => Err(OdooError::malformed(format!(
                "fields_get returned {}",
                other
            ))),
        }
    }
}

/// POST one XML-RPC call and decode the response
async fn call(
    http_client: &reqwest::Client,
    endpoint: &str,
    method: &str,
    params: &[Value],
) -> Result<Value> {
    let body = xmlrpc::encode_call(method, params);

    let response = http_client
        .post(endpoint)
        .header(reqwest::header::CONTENT_TYPE, "text/xml")
        .body(body)
        .send()
        .await?;

    let status = response.status();
    let text = response.text().await?;

    if !status.is_success() {
        return Err(OdooError::RequestFailed {
            status: status.as_u16(),
            message: text.chars().take(500).collect(),
        });
    }

    xmlrpc::decode_response(&text)
}

fn kwargs(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

/// `None` leaves `limit` out, which Odoo reads as unlimited
fn with_limit(mut options: Map<String, Value>, limit: Option<u32>) -> Map<String, Value> {
    if let Some(limit) = limit {
        options.insert("limit".to_string(), json!(limit));
    }
    options
}

fn expect_array(value: Value, method: &str) -> Result<Vec<Value>> {
    match value {
        Value::Array(items) => Ok(items),
        other => Err(OdooError::malformed(format!(
            "{} returned {} instead of a list",
            method, other
        ))),
    }
}

/// Keep models whose technical name contains `filter`, case-insensitively
pub fn filter_models(models: Vec<Value>, filter: Option<&str>) -> Vec<Value> {
    let pattern = match filter.map(str::trim).filter(|f| !f.is_empty()) {
        Some(f) => f.to_lowercase(),
        None => return models,
    };

    models
        .into_iter()
        .filter(|m| {
            m.get("model")
                .and_then(Value::as_str)
                .map(|name| name.to_lowercase().contains(&pattern))
                .unwrap_or(false)
        })
        .collect()
}
