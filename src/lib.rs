//! stockroom - an inventory service over file-backed record stores
//!
//! Products and users live in JSON snapshot files seeded on first start.
//! Access to the HTTP API is gated by signed bearer tokens.

pub mod auth;
pub mod cli;
pub mod config;
pub mod http_server;
pub mod inventory;
pub mod logging;
pub mod store;
