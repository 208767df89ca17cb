//! HTTP API: server, routing, configuration and request/response mapping.

pub mod app;
pub mod config;
