//! TCP accept loop.
//!
//! Listens for client connections and starts a per-connection protocol
//! core for each. Everything above the connection (routing, persistence,
//! subscription registry) belongs to the owner of the request channel.

use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tracing::info;

use crate::config::Config;
use crate::connection::Conn;
use crate::request::Request;

/// Accept clients on `listener` forever, spawning a [`Conn`] per socket.
///
/// Session requests from every connection are reported on `request_tx`.
/// Returns only when the listener itself fails.
pub async fn serve(
    listener: TcpListener,
    config: Arc<dyn Config>,
    request_tx: mpsc::Sender<Request>,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "listening");
    }
    loop {
        let (socket, peer) = listener.accept().await?;
        let conn = Conn::spawn(config.clone(), socket, request_tx.clone());
        info!(conn = conn.id(), %peer, "client accepted");
    }
}
