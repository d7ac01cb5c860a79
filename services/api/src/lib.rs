//! Celine API Library Crate
//!
//! This library contains the HTTP surface of the Celine interview service:
//! the application state, configuration, request/response models, axum
//! handlers and routing, the file-based session archive, and the opaque
//! speech proxies. The `bin/api.rs` binary is a thin wrapper around it.

pub mod archive;
pub mod config;
pub mod handlers;
pub mod models;
pub mod router;
pub mod speech;
pub mod state;
