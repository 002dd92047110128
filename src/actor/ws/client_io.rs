use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use tungstenite::protocol::Message;

use super::{Clients, WsActor};
use crate::reload::message::HotReloadMessage;

/// Poll interval of the reader thread.
const READ_POLL: Duration = Duration::from_millis(100);

impl WsActor {
    /// Perform the handshake and register a client
    pub(super) fn add_client(&self, stream: TcpStream) {
        // Blocking during handshake, non-blocking afterwards for polling reads
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("ws"; "handshake failed: {}", e);
                return;
            }
        };
        let _ = ws.get_ref().set_nonblocking(true);

        let connected = HotReloadMessage::connected();
        if let Err(e) = ws.send(Message::Text(connected.to_json().into())) {
            crate::log!("ws"; "failed to send connected message: {}", e);
            return;
        }

        if let Some(pending) = self.pending_error.lock().as_ref() {
            let hr_msg = HotReloadMessage::error(&pending.path, &pending.error);
            if let Err(e) = ws.send(Message::Text(hr_msg.to_json().into())) {
                crate::log!("ws"; "failed to send pending error: {}", e);
                return;
            }
            crate::debug!("ws"; "sent pending error to new client");
        }

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("ws"; "client connected (total: {})", clients.len());
    }

    /// Background thread draining client frames and pruning closed clients.
    ///
    /// Clients never send anything meaningful; reading is only needed to
    /// answer pings and notice closes. Exits once the actor is gone.
    pub(super) fn client_reader_loop(clients: Clients) {
        while Arc::strong_count(&clients) > 1 {
            std::thread::sleep(READ_POLL);

            clients.lock().retain_mut(|ws| match ws.read() {
                Ok(Message::Close(_)) => false,
                Ok(_) => true,
                Err(tungstenite::Error::Io(ref e)) if e.kind() == std::io::ErrorKind::WouldBlock => {
                    true
                }
                Err(_) => false,
            });
        }
        crate::debug!("ws"; "reader stopped");
    }
}
