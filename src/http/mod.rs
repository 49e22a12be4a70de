//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.0 subset the server speaks: one request
//! per connection, GET and HEAD only, `Connection: close` on every response.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: The per-connection handler implementing the request-response state machine
//! - **`parser`**: Reads the request head off the socket and parses the request line
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`writer`**: Serializes responses and streams file bodies to the client
//! - **`mime`**: MIME type detection based on file extensions
//! - **`date`**: `Date` header formatting
//!
//! # Connection State Machine
//!
//! Each client connection goes through a state machine:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Read until CRLFCRLF (at most 8192 bytes)
//!        └──────┬──────┘
//!               │ Request line parsed     (parse failure → Closed, nothing sent)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Method check, target check, resolve, pick file/listing/error
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send head, then body unless HEAD
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use staticd::config::ServerConfig;
//! use staticd::http::connection::Connection;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Arc::new(ServerConfig::new("/srv/www", 8080)?);
//!     let listener = TcpListener::bind("127.0.0.1:8080").await?;
//!
//!     loop {
//!         let (socket, peer) = listener.accept().await?;
//!         let config = Arc::clone(&config);
//!         tokio::spawn(async move {
//!             Connection::new(socket, peer, config).run().await
//!         });
//!     }
//! }
//! ```

pub mod connection;
pub mod date;
pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;
