//! WebSocket Server for Live Reload
//!
//! Accepts TCP connections on the reload port and hands them to `WsActor`,
//! which performs the handshake and owns the client list.

use std::net::{IpAddr, SocketAddr, TcpListener};
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::actor::messages::WsMsg;

/// Poll interval of the non-blocking accept loop.
const ACCEPT_POLL: Duration = Duration::from_millis(100);

/// Bind the reload port and start the acceptor thread.
///
/// The port is bound exactly; a port in use is an error. Returns the bound
/// port (useful when `port` is 0). The thread exits once the actor side of
/// `ws_tx` is gone or shutdown is requested, releasing the port.
pub fn start_ws_server(interface: IpAddr, port: u16, ws_tx: mpsc::Sender<WsMsg>) -> Result<u16> {
    let addr = SocketAddr::new(interface, port);
    let listener = TcpListener::bind(addr)
        .with_context(|| format!("Failed to bind WebSocket server on {addr}"))?;
    let actual_port = listener.local_addr()?.port();
    listener.set_nonblocking(true)?;

    std::thread::spawn(move || {
        loop {
            match listener.accept() {
                Ok((stream, addr)) => {
                    crate::debug!("reload"; "client connected: {}", addr);

                    // Set blocking for WebSocket operations
                    let _ = stream.set_nonblocking(false);

                    if ws_tx.blocking_send(WsMsg::AddClient(stream)).is_err() {
                        break;
                    }
                }
                Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    if ws_tx.is_closed() || crate::core::is_shutdown() {
                        break;
                    }
                    std::thread::sleep(ACCEPT_POLL);
                }
                Err(e) => {
                    crate::log!("reload"; "accept error: {}", e);
                    std::thread::sleep(ACCEPT_POLL);
                }
            }
        }
        crate::debug!("reload"; "listener on port {} closed", actual_port);
    });

    Ok(actual_port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, TcpStream};

    #[test]
    fn test_client_forwarded_to_actor() {
        let (tx, mut rx) = mpsc::channel(4);
        let port = start_ws_server(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, tx).unwrap();
        assert_ne!(port, 0);

        let _client = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let msg = rx.blocking_recv().unwrap();
        assert!(matches!(msg, WsMsg::AddClient(_)));
    }

    #[test]
    fn test_port_in_use_is_error() {
        let taken = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = taken.local_addr().unwrap().port();
        let (tx, _rx) = mpsc::channel(1);

        assert!(start_ws_server(IpAddr::V4(Ipv4Addr::LOCALHOST), port, tx).is_err());
    }

    #[test]
    fn test_listener_released_when_actor_gone() {
        let (tx, rx) = mpsc::channel(1);
        let port = start_ws_server(IpAddr::V4(Ipv4Addr::LOCALHOST), 0, tx).unwrap();
        drop(rx);

        let mut rebound = None;
        for _ in 0..50 {
            std::thread::sleep(ACCEPT_POLL);
            if let Ok(listener) = TcpListener::bind(("127.0.0.1", port)) {
                rebound = Some(listener);
                break;
            }
        }
        assert!(rebound.is_some());
    }
}
