//! Domains module containing business logic organized by bounded contexts.
//!
//! The server exposes a single domain: markdown context documents served as
//! MCP resources.

pub mod resources;
