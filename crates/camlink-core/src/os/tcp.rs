// ── Blocking TCP connector ──
//
// Each attempt runs `TcpStream::connect_timeout` on tokio's blocking
// pool so the calling task (and whatever UI thread drives it) never
// blocks on the socket.

use std::io;
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

use futures_util::future::BoxFuture;
use tracing::trace;

use super::SocketConnector;
use crate::model::AccessPointTarget;

/// [`SocketConnector`] backed by `std::net`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

impl SocketConnector for TcpConnector {
    fn connect<'a>(
        &'a self,
        target: &'a AccessPointTarget,
        timeout: Duration,
    ) -> BoxFuture<'a, io::Result<()>> {
        let host = target.host.clone();
        let port = target.port;
        Box::pin(async move {
            tokio::task::spawn_blocking(move || connect_blocking(&host, port, timeout))
                .await
                .map_err(io::Error::other)?
        })
    }
}

fn connect_blocking(host: &str, port: u16, timeout: Duration) -> io::Result<()> {
    let mut last_err = None;
    for addr in (host, port).to_socket_addrs()? {
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(stream) => {
                trace!(%addr, "socket connected, closing");
                drop(stream);
                return Ok(());
            }
            Err(e) => last_err = Some(e),
        }
    }

    Err(last_err.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{host}:{port} resolved to no addresses"),
        )
    }))
}
