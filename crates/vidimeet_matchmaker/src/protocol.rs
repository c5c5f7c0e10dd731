//! Wire vocabulary exchanged between clients and the relay.
//!
//! Clients speak in named events with a JSON payload (the Socket.IO model).
//! This module decodes inbound `(name, payload)` pairs into [`ClientEvent`]
//! values and describes every outbound event as a [`ServerMessage`].
//!
//! # Inbound events
//!
//! | Event           | Payload                      |
//! |-----------------|------------------------------|
//! | `join-pool`     | none                         |
//! | `offer`         | `{ roomId, offer }`          |
//! | `answer`        | `{ roomId, answer }`         |
//! | `ice-candidate` | `{ roomId, candidate }`      |
//! | `message`       | `{ roomId, message }`        |
//! | `report`        | `{ userId }`                 |
//! | `leave-room`    | `{ roomId }`                 |
//!
//! Signaling payloads (`offer`, `answer`, `candidate`, `message`) are opaque
//! to the relay and forwarded verbatim.

use crate::ids::{ConnectionId, SessionId};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

/// Opaque error text sent to a client when handling its event faulted.
pub const GENERIC_ERROR_MESSAGE: &str = "An error occurred";

/// Errors produced while decoding an inbound event.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("unknown event '{0}'")]
    UnknownEvent(String),

    #[error("malformed '{event}' payload: {source}")]
    Malformed {
        event: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("'{event}' payload is missing field '{field}'")]
    MissingField {
        event: &'static str,
        field: &'static str,
    },
}

/// The four message kinds relayed between session members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SignalKind {
    Offer,
    Answer,
    IceCandidate,
    Message,
}

impl SignalKind {
    pub const ALL: [SignalKind; 4] = [
        SignalKind::Offer,
        SignalKind::Answer,
        SignalKind::IceCandidate,
        SignalKind::Message,
    ];

    /// Event name used on the wire, inbound and outbound.
    pub fn event(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "ice-candidate",
            SignalKind::Message => "message",
        }
    }

    /// Name of the payload field carrying the relayed value.
    pub fn payload_field(self) -> &'static str {
        match self {
            SignalKind::Offer => "offer",
            SignalKind::Answer => "answer",
            SignalKind::IceCandidate => "candidate",
            SignalKind::Message => "message",
        }
    }

    fn from_event(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.event() == name)
    }
}

/// A signaling or chat message addressed to the other member of a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Signal {
    pub kind: SignalKind,
    pub room_id: SessionId,
    pub payload: Value,
}

/// A decoded inbound event from one connection.
///
/// Connect and disconnect are not part of this enum: they are lifecycle
/// notifications of the transport, not named client events.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    JoinPool,
    Signal(Signal),
    Report { user_id: ConnectionId },
    LeaveRoom { room_id: SessionId },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignalRequest {
    room_id: SessionId,
    #[serde(flatten)]
    fields: Map<String, Value>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportRequest {
    user_id: ConnectionId,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LeaveRequest {
    room_id: SessionId,
}

impl ClientEvent {
    /// Every inbound event name the relay understands.
    pub const NAMES: [&'static str; 7] = [
        "join-pool",
        "offer",
        "answer",
        "ice-candidate",
        "message",
        "report",
        "leave-room",
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinPool => "join-pool",
            ClientEvent::Signal(signal) => signal.kind.event(),
            ClientEvent::Report { .. } => "report",
            ClientEvent::LeaveRoom { .. } => "leave-room",
        }
    }

    /// Decodes a named event and its JSON payload.
    ///
    /// The payload of `join-pool` is ignored. Signaling events require both
    /// `roomId` and their kind-specific field; a `null` value counts as
    /// missing.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError`] for unknown event names, payloads that do not
    /// deserialize, and payloads lacking a required field.
    pub fn decode(name: &str, payload: Value) -> Result<Self, ProtocolError> {
        if let Some(kind) = SignalKind::from_event(name) {
            let request: SignalRequest = serde_json::from_value(payload)
                .map_err(|source| ProtocolError::Malformed { event: kind.event(), source })?;
            let mut fields = request.fields;
            let payload = match fields.remove(kind.payload_field()) {
                Some(value) if !value.is_null() => value,
                _ => {
                    return Err(ProtocolError::MissingField {
                        event: kind.event(),
                        field: kind.payload_field(),
                    })
                }
            };
            return Ok(ClientEvent::Signal(Signal {
                kind,
                room_id: request.room_id,
                payload,
            }));
        }

        match name {
            "join-pool" => Ok(ClientEvent::JoinPool),
            "report" => {
                let request: ReportRequest = serde_json::from_value(payload)
                    .map_err(|source| ProtocolError::Malformed { event: "report", source })?;
                Ok(ClientEvent::Report { user_id: request.user_id })
            }
            "leave-room" => {
                let request: LeaveRequest = serde_json::from_value(payload)
                    .map_err(|source| ProtocolError::Malformed { event: "leave-room", source })?;
                Ok(ClientEvent::LeaveRoom { room_id: request.room_id })
            }
            other => Err(ProtocolError::UnknownEvent(other.to_string())),
        }
    }
}

/// An event the relay emits to one specific connection.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerMessage {
    /// A partner was found; both members receive this with each other's id.
    Matched {
        room_id: SessionId,
        partner_id: ConnectionId,
    },
    /// WebRTC offer, tagged with the sender so the far side can reply.
    Offer {
        room_id: SessionId,
        offer: Value,
        partner_id: ConnectionId,
    },
    Answer {
        room_id: SessionId,
        answer: Value,
    },
    IceCandidate {
        room_id: SessionId,
        candidate: Value,
    },
    /// Text chat. Carries no room id.
    Message {
        message: Value,
    },
    /// The partner left or dropped; the session no longer exists.
    UserDisconnected,
    Error {
        message: String,
    },
}

impl ServerMessage {
    /// Builds the outbound form of a relayed signal.
    ///
    /// # Arguments
    ///
    /// * `signal` - The inbound signal, whose payload is moved unchanged
    /// * `sender` - The connection that sent it (only offers carry it)
    pub fn relayed(signal: Signal, sender: &ConnectionId) -> Self {
        let Signal { kind, room_id, payload } = signal;
        match kind {
            SignalKind::Offer => ServerMessage::Offer {
                room_id,
                offer: payload,
                partner_id: sender.clone(),
            },
            SignalKind::Answer => ServerMessage::Answer { room_id, answer: payload },
            SignalKind::IceCandidate => ServerMessage::IceCandidate {
                room_id,
                candidate: payload,
            },
            SignalKind::Message => ServerMessage::Message { message: payload },
        }
    }

    /// The opaque error notification.
    pub fn generic_error() -> Self {
        ServerMessage::Error {
            message: GENERIC_ERROR_MESSAGE.to_string(),
        }
    }

    /// Event name used on the wire.
    pub fn event(&self) -> &'static str {
        match self {
            ServerMessage::Matched { .. } => "matched",
            ServerMessage::Offer { .. } => SignalKind::Offer.event(),
            ServerMessage::Answer { .. } => SignalKind::Answer.event(),
            ServerMessage::IceCandidate { .. } => SignalKind::IceCandidate.event(),
            ServerMessage::Message { .. } => SignalKind::Message.event(),
            ServerMessage::UserDisconnected => "user-disconnected",
            ServerMessage::Error { .. } => "error",
        }
    }

    /// JSON payload of the event, or `None` for payload-less events.
    pub fn payload(&self) -> Option<Value> {
        let payload = match self {
            ServerMessage::Matched { room_id, partner_id } => json!({
                "roomId": room_id,
                "partnerId": partner_id,
            }),
            ServerMessage::Offer { room_id, offer, partner_id } => json!({
                "roomId": room_id,
                "offer": offer,
                "partnerId": partner_id,
            }),
            ServerMessage::Answer { room_id, answer } => json!({
                "roomId": room_id,
                "answer": answer,
            }),
            ServerMessage::IceCandidate { room_id, candidate } => json!({
                "roomId": room_id,
                "candidate": candidate,
            }),
            ServerMessage::Message { message } => json!({ "message": message }),
            ServerMessage::UserDisconnected => return None,
            ServerMessage::Error { message } => json!({ "message": message }),
        };
        Some(payload)
    }
}
