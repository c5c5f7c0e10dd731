//! Socket.IO side of the connection registry.
//!
//! Bridges the matchmaker's [`ClientSender`] abstraction to a live
//! socketioxide socket, so the core can deliver messages without knowing
//! anything about the transport.

use socketioxide::extract::SocketRef;
use std::fmt;
use vidimeet_matchmaker::{ClientSender, ConnectionId, SendError, ServerMessage};

/// Send handle stored in the registry for one Socket.IO client.
#[derive(Clone)]
pub struct SocketSender {
    socket: SocketRef,
}

impl SocketSender {
    pub fn new(socket: SocketRef) -> Self {
        Self { socket }
    }
}

impl fmt::Debug for SocketSender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SocketSender")
            .field("id", &self.socket.id.to_string())
            .finish()
    }
}

impl ClientSender for SocketSender {
    /// Emits the message as a named event.
    ///
    /// Payload-less events such as `user-disconnected` are emitted with a
    /// unit argument. The emit only queues the packet on the socket, so this
    /// never blocks on the peer.
    fn send(&self, message: &ServerMessage) -> Result<(), SendError> {
        let result = match message.payload() {
            Some(payload) => self.socket.emit(message.event(), &payload),
            None => self.socket.emit(message.event(), &()),
        };
        result.map_err(|e| SendError::Transport(e.to_string()))
    }
}

/// The connection id the transport assigned to `socket`.
pub fn connection_id(socket: &SocketRef) -> ConnectionId {
    ConnectionId::new(socket.id.to_string())
}
