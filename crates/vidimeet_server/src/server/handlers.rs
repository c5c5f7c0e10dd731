//! Socket.IO event wiring.
//!
//! Every socket on the `/` namespace is registered with the matchmaker on
//! connect, gets one handler per client event name, and is purged on
//! disconnect. Handlers are synchronous: each one takes the matchmaker lock
//! once, runs the operation to completion, and returns.

use crate::connection::{connection_id, SocketSender};
use serde_json::Value;
use socketioxide::{
    extract::{SocketRef, TryData},
    socket::DisconnectReason,
    SocketIo,
};
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use tracing::{debug, error, warn};
use vidimeet_matchmaker::{
    ClientEvent, ClientSender, ConnectOutcome, ConnectionId, DispatchOutcome, JoinOutcome,
    ServerMessage, SharedMatchmaker,
};

/// The matchmaker as wired to the Socket.IO transport.
pub type RelayMatchmaker = SharedMatchmaker<SocketSender>;

/// Registers the connect handler for the default namespace.
pub fn register(io: &SocketIo, matchmaker: RelayMatchmaker) {
    io.ns("/", move |socket: SocketRef| on_connect(socket, matchmaker.clone()));
}

fn on_connect(socket: SocketRef, matchmaker: RelayMatchmaker) {
    let id = connection_id(&socket);

    for name in ClientEvent::NAMES {
        let matchmaker = matchmaker.clone();
        socket.on(name, move |socket: SocketRef, TryData(data): TryData<Value>| {
            handle_event(&socket, &matchmaker, name, data);
        });
    }

    match matchmaker.connect(id.clone(), SocketSender::new(socket.clone())) {
        ConnectOutcome::Registered => {}
        outcome => {
            // Nothing was registered for this socket, so it gets no
            // disconnect handler.
            warn!("Rejecting connection {}: {:?}", id, outcome);
            send_error(&SocketSender::new(socket.clone()), &id);
            if let Err(e) = socket.disconnect() {
                debug!("Could not disconnect rejected socket {}: {}", id, e);
            }
            return;
        }
    }

    socket.on_disconnect(move |socket: SocketRef, reason: DisconnectReason| {
        let id = connection_id(&socket);
        debug!("Connection {} closed: {:?}", id, reason);
        matchmaker.disconnect(&id);
    });
}

/// Decodes one named event and hands it to the matchmaker.
///
/// Malformed payloads are dropped with a warning and change nothing. A fault
/// while handling the event is reported to this socket only, as an opaque
/// `error`; the matchmaker state stays usable for everyone else.
fn handle_event<E: fmt::Display>(
    socket: &SocketRef,
    matchmaker: &RelayMatchmaker,
    name: &'static str,
    data: Result<Value, E>,
) {
    let id = connection_id(socket);
    let payload = data.unwrap_or_else(|e| {
        debug!("No usable payload on {} from {}: {}", name, id, e);
        Value::Null
    });

    let event = match ClientEvent::decode(name, payload) {
        Ok(event) => event,
        Err(e) => {
            warn!("Ignoring malformed event from {}: {}", id, e);
            return;
        }
    };

    dispatch_isolated(matchmaker, &id, name, event, &SocketSender::new(socket.clone()));
}

/// Runs one decoded event against the matchmaker, containing any panic.
///
/// A panic, or a `join-pool` from a connection missing from the registry, is
/// answered with the generic `error` on `reply` only. The matchmaker lock is
/// released during unwinding and does not poison, so other connections keep
/// working.
pub(crate) fn dispatch_isolated<S: ClientSender>(
    matchmaker: &SharedMatchmaker<S>,
    id: &ConnectionId,
    name: &str,
    event: ClientEvent,
    reply: &impl ClientSender,
) -> Option<DispatchOutcome> {
    match catch_unwind(AssertUnwindSafe(|| matchmaker.dispatch(id, event))) {
        Ok(outcome @ DispatchOutcome::Join(JoinOutcome::Unregistered)) => {
            error!("Connection {} sent {} but is missing from the registry", id, name);
            send_error(reply, id);
            Some(outcome)
        }
        Ok(outcome) => Some(outcome),
        Err(_) => {
            error!("Handler for {} from {} panicked", name, id);
            send_error(reply, id);
            None
        }
    }
}

fn send_error(reply: &impl ClientSender, id: &ConnectionId) {
    if let Err(e) = reply.send(&ServerMessage::generic_error()) {
        debug!("Could not deliver error to {}: {}", id, e);
    }
}
