//! Odoo MCP Server Library
//!
//! Exposes an Odoo instance's XML-RPC API as Model Context Protocol tools over
//! stdio and as a REST API over HTTP.

pub mod config;
pub mod error;
pub mod http;
pub mod mcp;
pub mod odoo;

pub use config::Config;
pub use error::{OdooMcpError, Result};
