use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;
use crate::http::connection::Connection;

/// Binds the listening socket on all interfaces.
pub async fn bind(port: u16) -> anyhow::Result<TcpListener> {
    let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
    TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to listen on port {}", port))
}

/// Accepts forever, handing each connection to its own task.
///
/// A failed accept is logged and skipped; it never stops the loop.
pub async fn serve(listener: TcpListener, cfg: Arc<ServerConfig>) -> anyhow::Result<()> {
    info!("Listening on {}", listener.local_addr()?);

    loop {
        let (socket, peer) = match listener.accept().await {
            Ok(accepted) => accepted,
            Err(e) => {
                tracing::warn!(error = %e, "failed to accept connection");
                continue;
            }
        };
        tracing::debug!("Accepted connection from {}", peer);

        let cfg = Arc::clone(&cfg);
        tokio::spawn(async move {
            let conn = Connection::new(socket, peer, cfg);
            if let Err(e) = conn.run().await {
                tracing::warn!("Connection error from {}: {:#}", peer, e);
            }
        });
    }
}
