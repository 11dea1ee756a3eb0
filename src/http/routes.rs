//! HTTP route handlers
//!
//! One POST route per Odoo operation, plus two GET status routes. Request
//! bodies are the same types the MCP tools accept.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::{json, Value};
use validator::Validate;

use crate::http::error::{ApiError, ApiResult};
use crate::http::extract::ApiJson;
use crate::http::AppState;
use crate::odoo::client::OdooClient;
use crate::odoo::types::*;

/// Service name reported by `GET /`
pub const SERVICE_NAME: &str = "Odoo MCP HTTP API Server";

/// Operation routes, in the order they are listed by `GET /`
pub const ENDPOINTS: &[(&str, &str)] = &[
    ("/connect", "Connect to Odoo"),
    ("/search", "Search records"),
    ("/read", "Read records by ID"),
    ("/create", "Create records"),
    ("/write", "Update records"),
    ("/unlink", "Delete records"),
    ("/call", "Call Odoo methods"),
    ("/models", "List available models"),
    ("/fields", "Get model fields"),
    ("/count", "Count records"),
    ("/read_group", "Aggregate records"),
];

impl AppState {
    async fn client(&self) -> ApiResult<Arc<OdooClient>> {
        self.session
            .client()
            .await
            .map_err(|_| ApiError::not_connected())
    }
}

/// Service description
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    let endpoints: Vec<&str> = ENDPOINTS.iter().map(|(path, _)| *path).collect();

    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": env!("CARGO_PKG_VERSION"),
        "connected": state.session.is_connected().await,
        "endpoints": endpoints,
    }))
}

/// Health check for monitoring, with the active connection if any
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let connection = state.session.info().await;

    Json(json!({
        "status": "healthy",
        "connected": connection.is_some(),
        "connection": connection,
    }))
}

pub async fn connect(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ConnectRequest>,
) -> ApiResult<Json<Value>> {
    let params = ConnectionParams::resolve(req, &state.config.odoo)
        .map_err(|e| ApiError::operation("Connection", e))?;

    let client = state
        .session
        .connect(params)
        .await
        .map_err(|e| ApiError::operation("Connection", e))?;

    Ok(Json(json!({
        "status": "success",
        "message": format!(
            "Successfully connected to Odoo at {} (database: {})",
            client.url(),
            client.database()
        ),
    })))
}

pub async fn search(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SearchRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let records = client
        .search_read(&req.model, &req.domain, &req.fields, req.limit)
        .await
        .map_err(|e| ApiError::operation("Search", e))?;

    Ok(Json(json!({
        "status": "success",
        "count": records.len(),
        "records": records,
    })))
}

pub async fn read(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReadRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let records = client
        .read(&req.model, &req.ids, &req.fields)
        .await
        .map_err(|e| ApiError::operation("Read", e))?;

    Ok(Json(json!({
        "status": "success",
        "count": records.len(),
        "records": records,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let id = client
        .create(&req.model, &req.values)
        .await
        .map_err(|e| ApiError::operation("Create", e))?;

    Ok(Json(json!({
        "status": "success",
        "id": id,
        "message": format!("Created record with ID: {}", id),
    })))
}

pub async fn write(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<WriteRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let result = client
        .write(&req.model, &req.ids, &req.values)
        .await
        .map_err(|e| ApiError::operation("Update", e))?;

    Ok(Json(json!({
        "status": "success",
        "updated": req.ids.len(),
        "result": result,
        "message": format!("Updated {} records", req.ids.len()),
    })))
}

pub async fn unlink(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<UnlinkRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let result = client
        .unlink(&req.model, &req.ids)
        .await
        .map_err(|e| ApiError::operation("Delete", e))?;

    Ok(Json(json!({
        "status": "success",
        "deleted": req.ids.len(),
        "result": result,
        "message": format!("Deleted {} records", req.ids.len()),
    })))
}

pub async fn call_method(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CallMethodRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let result = client
        .call_method(&req.model, &req.method, req.args, req.kwargs)
        .await
        .map_err(|e| ApiError::operation("Method call", e))?;

    Ok(Json(json!({
        "status": "success",
        "result": result,
    })))
}

pub async fn get_models(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GetModelsRequest>,
) -> ApiResult<Json<Value>> {
    let client = state.client().await?;

    let models = client
        .get_models(req.filter.as_deref())
        .await
        .map_err(|e| ApiError::operation("Get models", e))?;

    Ok(Json(json!({
        "status": "success",
        "count": models.len(),
        "models": models,
    })))
}

pub async fn get_fields(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<GetFieldsRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let fields = client
        .get_fields(&req.model)
        .await
        .map_err(|e| ApiError::operation("Get fields", e))?;

    Ok(Json(json!({
        "status": "success",
        "model": req.model,
        "fields": fields,
    })))
}

pub async fn count(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CountRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let count = client
        .count(&req.model, &req.domain)
        .await
        .map_err(|e| ApiError::operation("Count", e))?;

    Ok(Json(json!({
        "status": "success",
        "model": req.model,
        "count": count,
    })))
}

pub async fn read_group(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ReadGroupRequest>,
) -> ApiResult<Json<Value>> {
    req.validate()?;
    let client = state.client().await?;

    let groups = client
        .read_group(
            &req.model,
            &req.domain,
            &req.fields,
            &req.groupby,
            req.limit,
            req.orderby.as_deref(),
            req.lazy,
        )
        .await
        .map_err(|e| ApiError::operation("Read group", e))?;

    Ok(Json(json!({
        "status": "success",
        "count": groups.len(),
        "groups": groups,
    })))
}
