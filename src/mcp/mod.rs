//! MCP (Model Context Protocol) module
//!
//! JSON-RPC 2.0 over newline-delimited stdio, exposing the Odoo operations
//! as tools.

pub mod server;
pub mod tools;
pub mod types;
