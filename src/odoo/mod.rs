//! Odoo API module
//!
//! Contains the XML-RPC codec, request types, client and shared session for
//! talking to an Odoo instance.

pub mod client;
pub mod session;
pub mod types;
pub mod xmlrpc;
