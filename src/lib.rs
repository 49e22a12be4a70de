//! staticd - Minimal static file server
//!
//! Core library for HTTP handling and document root resolution.

pub mod config;
pub mod http;
pub mod server;
pub mod static_files;
