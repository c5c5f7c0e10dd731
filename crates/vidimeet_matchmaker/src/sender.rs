//! Send handles stored in the connection registry.

use crate::protocol::ServerMessage;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors returned by a [`ClientSender`].
///
/// The matchmaker never propagates these: a failed send to a peer is the same
/// situation as a peer that already vanished.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("connection closed")]
    Closed,

    #[error("transport error: {0}")]
    Transport(String),
}

/// A handle capable of delivering a [`ServerMessage`] to one connection.
///
/// Implementations must not block: delivery is fire-and-forget, with no
/// retry and no queueing beyond what the transport itself provides.
pub trait ClientSender {
    fn send(&self, message: &ServerMessage) -> Result<(), SendError>;
}

/// In-process delivery, used by embedders and tests to observe outbound traffic.
impl ClientSender for mpsc::UnboundedSender<ServerMessage> {
    fn send(&self, message: &ServerMessage) -> Result<(), SendError> {
        mpsc::UnboundedSender::send(self, message.clone()).map_err(|_| SendError::Closed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_sender_delivers_clone() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        ClientSender::send(&tx, &ServerMessage::UserDisconnected).unwrap();
        assert_eq!(rx.try_recv().unwrap(), ServerMessage::UserDisconnected);
    }

    #[test]
    fn closed_receiver_reports_closed() {
        let (tx, rx) = mpsc::unbounded_channel::<ServerMessage>();
        drop(rx);
        let err = ClientSender::send(&tx, &ServerMessage::UserDisconnected).unwrap_err();
        assert!(matches!(err, SendError::Closed));
    }
}
