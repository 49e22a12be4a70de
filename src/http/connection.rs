use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;

use crate::config::ServerConfig;
use crate::http::parser::read_request;
use crate::http::request::{Method, Request};
use crate::http::response::{Response, StatusCode};
use crate::http::writer::{file_response, write_response};
use crate::static_files::{ResolveError, render_index, resolve, resolve_index};

pub struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
    config: Arc<ServerConfig>,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Request),
    Writing(Response, bool), // bool = head_only
    Closed,
}

impl Connection {
    pub fn new(stream: TcpStream, peer: SocketAddr, config: Arc<ServerConfig>) -> Self {
        Self {
            stream,
            peer,
            config,
            state: ConnectionState::Reading,
        }
    }

    /// Serves exactly one request, then closes.
    ///
    /// The socket is owned by `self`, so it is released however this returns.
    pub async fn run(mut self) -> anyhow::Result<()> {
        loop {
            match std::mem::replace(&mut self.state, ConnectionState::Closed) {
                ConnectionState::Reading => {
                    match read_request(&mut self.stream).await {
                        Ok(req) => {
                            tracing::info!(
                                peer = %self.peer,
                                method = %req.method,
                                path = %req.path,
                                version = %req.version,
                                "request"
                            );
                            self.state = ConnectionState::Processing(req);
                        }
                        Err(e) => {
                            tracing::debug!(peer = %self.peer, error = %e, "closing unparseable request");
                        }
                    }
                }

                ConnectionState::Processing(req) => {
                    let response = handle_request(&self.config, &req).await;
                    self.state = ConnectionState::Writing(response, req.is_head());
                }

                ConnectionState::Writing(response, head_only) => {
                    let status = response.status;
                    write_response(&mut self.stream, response, head_only).await?;
                    tracing::debug!(peer = %self.peer, status = status.as_u16(), "response sent");
                    // Best effort; the peer may already be gone.
                    let _ = self.stream.shutdown().await;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }
}

/// Produces the response for one parsed request.
pub async fn handle_request(config: &ServerConfig, req: &Request) -> Response {
    if !matches!(req.method, Method::GET | Method::HEAD) {
        return Response::error(StatusCode::MethodNotAllowed, "Only GET and HEAD are supported.");
    }

    if !req.path.starts_with('/') {
        return Response::error(StatusCode::BadRequest, "Invalid request path.");
    }

    let target = match resolve(config, &req.path).await {
        Ok(target) => target,
        Err(ResolveError::NotFound) => return Response::not_found(),
        Err(ResolveError::Forbidden | ResolveError::Invalid) => {
            return Response::error(StatusCode::Forbidden, "Access denied.");
        }
    };

    if !target.is_directory {
        return file_response(&target.path).await;
    }

    match resolve_index(config, &target.path).await {
        Ok(Some(index)) => return file_response(&index).await,
        Ok(None) => {}
        Err(_) => return Response::error(StatusCode::Forbidden, "Access denied."),
    }

    match render_index(req.path_without_query(), &target.path).await {
        Ok(html) => Response::html(StatusCode::Ok, html),
        Err(e) => {
            tracing::error!(
                path = %target.path.display(),
                error = %e,
                "failed to list directory"
            );
            Response::error(StatusCode::InternalServerError, "Unable to read directory")
        }
    }
}
