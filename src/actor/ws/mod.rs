//! WebSocket Actor - reload broadcast
//!
//! Owns the connected browser clients and pushes build outcomes to them.
//!
//! # Architecture
//!
//! ```text
//! BuildActor --[Reload/Error/ClearError]--> WsActor --[broadcast]--> Clients
//!                                              ^
//! reload server ------[AddClient]--------------+
//! ```

mod client_io;

use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tungstenite::WebSocket;
use tungstenite::protocol::Message;

use super::messages::WsMsg;
use crate::reload::message::HotReloadMessage;

type Clients = Arc<Mutex<Vec<WebSocket<TcpStream>>>>;

/// Last build error, replayed to clients that connect while it stands
#[derive(Debug, Clone)]
struct PendingError {
    path: String,
    error: String,
}

/// WebSocket Actor - manages client connections and broadcasts
pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    /// Connected clients (shared with the reader thread)
    clients: Clients,
    pending_error: Mutex<Option<PendingError>>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>) -> Self {
        Self {
            rx,
            clients: Arc::new(Mutex::new(Vec::new())),
            pending_error: Mutex::new(None),
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        let clients_for_reader = Arc::clone(&self.clients);
        std::thread::spawn(move || Self::client_reader_loop(clients_for_reader));

        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { reason } => {
                    crate::debug!("ws"; "sending reload: {}", reason);
                    self.broadcast(&HotReloadMessage::reload(reason));
                }

                WsMsg::Error { path, error } => {
                    let hr_msg = HotReloadMessage::error(&path, &error);
                    *self.pending_error.lock() = Some(PendingError { path, error });
                    self.broadcast(&hr_msg);
                }

                WsMsg::ClearError => {
                    *self.pending_error.lock() = None;
                    self.broadcast(&HotReloadMessage::clear_error());
                }

                WsMsg::AddClient(stream) => self.add_client(stream),

                WsMsg::Shutdown => {
                    crate::debug!("ws"; "shutting down");
                    for mut client in self.clients.lock().drain(..) {
                        let _ = client.close(None);
                        let _ = client.flush();
                    }
                    break;
                }
            }
        }
    }

    /// Send a message to every connected client, dropping the ones that fail.
    fn broadcast(&self, msg: &HotReloadMessage) {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("ws"; "no clients connected");
            return;
        }

        let text = Message::Text(msg.to_json().into());
        clients.retain_mut(|client| match client.send(text.clone()) {
            Ok(()) => true,
            Err(e) => {
                crate::debug!("ws"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("ws"; "broadcast to {} clients", clients.len());
    }
}
