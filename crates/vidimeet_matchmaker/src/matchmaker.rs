//! The matchmaking and session-relay state machine.
//!
//! [`Matchmaker`] owns the three pieces of shared state (connection registry,
//! waiting pool, session table) and is the only code that mutates them. Every
//! operation runs to completion synchronously; callers that share one
//! instance across tasks go through [`SharedMatchmaker`](crate::SharedMatchmaker),
//! which serializes them.
//!
//! Lookups that miss (unknown session, vanished partner) are normal during
//! disconnect races and are absorbed here: they are logged and reported in
//! the returned outcome, never raised as errors.

use crate::ids::{ConnectionId, SessionId};
use crate::pool::WaitingPool;
use crate::protocol::{ClientEvent, ServerMessage, Signal};
use crate::sender::ClientSender;
use crate::session::Session;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Result of [`Matchmaker::connect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectOutcome {
    Registered,
    /// The id was already live; the existing handle is kept.
    AlreadyRegistered,
    /// The configured connection limit is reached; nothing was registered.
    AtCapacity,
}

/// Result of [`Matchmaker::join_pool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Nobody was waiting; the caller is now in the pool.
    Queued,
    /// Paired with a waiting partner in a new session.
    Matched {
        session_id: SessionId,
        partner: ConnectionId,
    },
    AlreadyWaiting,
    AlreadyInSession(SessionId),
    Unregistered,
}

/// Result of [`Matchmaker::relay_signal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayOutcome {
    Delivered,
    /// The partner has no live handle or the send failed.
    PartnerUnreachable,
    UnknownSession,
    /// The sender is not one of the session's two members.
    NotAMember,
}

/// Result of [`Matchmaker::leave`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LeaveOutcome {
    Closed {
        partner: ConnectionId,
        partner_notified: bool,
    },
    UnknownSession,
}

/// What [`Matchmaker::disconnect`] cleaned up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisconnectOutcome {
    pub was_registered: bool,
    pub was_waiting: bool,
    pub closed_session: Option<SessionId>,
    pub partner_notified: bool,
}

impl DisconnectOutcome {
    /// True when the call found nothing to clean up.
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of [`Matchmaker::dispatch`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Join(JoinOutcome),
    Relay(RelayOutcome),
    Reported,
    Leave(LeaveOutcome),
}

/// Counts returned by the status query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStatus {
    pub waiting: usize,
    pub active_sessions: usize,
}

/// Counts returned by the stats query.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PoolStats {
    pub total_connections: usize,
    pub waiting: usize,
    pub active_sessions: usize,
    /// Connections that are currently a member of a session.
    pub paired_connections: usize,
}

/// Owner of the registry, waiting pool and session table.
///
/// Invariants maintained by every operation:
///
/// * a connection is in at most one of {waiting pool, some session};
/// * a connection is a member of at most one session;
/// * every session has exactly two members for its whole lifetime;
/// * `membership` maps each session member to its session and nothing else.
#[derive(Debug)]
pub struct Matchmaker<S> {
    registry: HashMap<ConnectionId, S>,
    waiting: WaitingPool,
    sessions: HashMap<SessionId, Session>,
    membership: HashMap<ConnectionId, SessionId>,
    capacity: Option<usize>,
}

impl<S> Default for Matchmaker<S> {
    fn default() -> Self {
        Self {
            registry: HashMap::new(),
            waiting: WaitingPool::new(),
            sessions: HashMap::new(),
            membership: HashMap::new(),
            capacity: None,
        }
    }
}

impl<S: ClientSender> Matchmaker<S> {
    /// Creates an empty matchmaker with no connection limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty matchmaker that refuses registrations beyond
    /// `max_connections` live connections.
    pub fn with_capacity(max_connections: usize) -> Self {
        Self {
            capacity: Some(max_connections),
            ..Self::default()
        }
    }

    /// Registers a new connection with its send handle.
    ///
    /// No matching is attempted; the client must ask with `join-pool`.
    pub fn connect(&mut self, id: ConnectionId, sender: S) -> ConnectOutcome {
        if self.registry.contains_key(&id) {
            warn!("Connection {} registered twice, keeping the first handle", id);
            return ConnectOutcome::AlreadyRegistered;
        }
        if let Some(max) = self.capacity {
            if self.registry.len() >= max {
                warn!("Refusing connection {}: limit of {} reached", id, max);
                return ConnectOutcome::AtCapacity;
            }
        }

        info!("🔌 Connection {} registered", id);
        self.registry.insert(id, sender);
        ConnectOutcome::Registered
    }

    /// Requests a partner for `id`.
    ///
    /// If someone is waiting, the longest-waiting connection is removed from
    /// the pool *before* any message is emitted, a session is created, and
    /// both sides receive `matched` naming each other. Otherwise `id` joins
    /// the pool silently.
    ///
    /// Requests from connections that are already waiting or already in a
    /// session are ignored.
    pub fn join_pool(&mut self, id: &ConnectionId) -> JoinOutcome {
        if !self.registry.contains_key(id) {
            debug!("Ignoring join-pool from unregistered connection {}", id);
            return JoinOutcome::Unregistered;
        }
        if self.waiting.contains(id) {
            debug!("Connection {} is already waiting", id);
            return JoinOutcome::AlreadyWaiting;
        }
        if let Some(session_id) = self.membership.get(id) {
            debug!("Connection {} asked to join while in session {}", id, session_id);
            return JoinOutcome::AlreadyInSession(*session_id);
        }

        let Some(partner) = self.waiting.pop_oldest() else {
            self.waiting.enqueue(id.clone());
            info!("⏳ Connection {} added to waiting pool", id);
            return JoinOutcome::Queued;
        };

        let session_id = SessionId::generate();
        let session = Session::new(session_id, id.clone(), partner.clone());
        self.membership.insert(id.clone(), session_id);
        self.membership.insert(partner.clone(), session_id);
        self.sessions.insert(session_id, session);

        self.deliver(
            id,
            ServerMessage::Matched {
                room_id: session_id,
                partner_id: partner.clone(),
            },
        );
        self.deliver(
            &partner,
            ServerMessage::Matched {
                room_id: session_id,
                partner_id: id.clone(),
            },
        );

        info!("🤝 Matched {} and {} in session {}", id, partner, session_id);
        JoinOutcome::Matched { session_id, partner }
    }

    /// Forwards an offer, answer, ICE candidate or chat message to the other
    /// member of the named session.
    ///
    /// Dropped silently unless the session exists and `from` is one of its
    /// members. Never mutates state.
    pub fn relay_signal(&self, from: &ConnectionId, signal: Signal) -> RelayOutcome {
        let Some(session) = self.sessions.get(&signal.room_id) else {
            debug!(
                "Dropping {} from {}: unknown session {}",
                signal.kind.event(),
                from,
                signal.room_id
            );
            return RelayOutcome::UnknownSession;
        };
        let Some(partner) = session.partner_of(from) else {
            warn!(
                "Dropping {} from {}: not a member of session {}",
                signal.kind.event(),
                from,
                signal.room_id
            );
            return RelayOutcome::NotAMember;
        };

        let kind = signal.kind;
        if self.deliver(partner, ServerMessage::relayed(signal, from)) {
            debug!("📨 Relayed {} from {} to {}", kind.event(), from, partner);
            RelayOutcome::Delivered
        } else {
            RelayOutcome::PartnerUnreachable
        }
    }

    /// Ends the named session.
    ///
    /// Any connection that names a live session closes it. The member other
    /// than `id` (the first member when `id` is not in the session) is told
    /// `user-disconnected` if reachable, and the session is destroyed either
    /// way. The caller is not put back in the pool; a "next stranger" flow is
    /// `leave` followed by `join_pool`.
    pub fn leave(&mut self, id: &ConnectionId, session_id: &SessionId) -> LeaveOutcome {
        let Some(session) = self.sessions.get(session_id) else {
            debug!("Connection {} left unknown session {}", id, session_id);
            return LeaveOutcome::UnknownSession;
        };
        if !session.contains(id) {
            warn!("Connection {} closed session {} it is not part of", id, session_id);
        }
        let partner = session.other_than(id).clone();

        let partner_notified = self.deliver(&partner, ServerMessage::UserDisconnected);
        self.close_session(session_id);

        info!("🚪 Connection {} left session {}", id, session_id);
        LeaveOutcome::Closed {
            partner,
            partner_notified,
        }
    }

    /// Records that `id` reported `target`.
    ///
    /// Telemetry only: the waiting pool and session table are untouched.
    pub fn report(&self, id: &ConnectionId, target: &ConnectionId) {
        info!(reporter = %id, reported = %target, "🚩 User report received");
    }

    /// Purges every trace of a connection that ended.
    ///
    /// Removes it from the waiting pool, destroys its session (notifying the
    /// partner if reachable), and drops its registry entry. Each step runs
    /// regardless of whether the previous ones found anything, so a second
    /// call for the same id is a no-op.
    pub fn disconnect(&mut self, id: &ConnectionId) -> DisconnectOutcome {
        let mut outcome = DisconnectOutcome {
            was_waiting: self.waiting.remove(id),
            ..DisconnectOutcome::default()
        };

        if let Some(session_id) = self.membership.get(id).copied() {
            let partner = self
                .sessions
                .get(&session_id)
                .and_then(|session| session.partner_of(id))
                .cloned();
            if let Some(partner) = partner {
                outcome.partner_notified = self.deliver(&partner, ServerMessage::UserDisconnected);
            }
            self.close_session(&session_id);
            outcome.closed_session = Some(session_id);
        }

        outcome.was_registered = self.registry.remove(id).is_some();

        if outcome.is_noop() {
            debug!("Disconnect for unknown connection {}", id);
        } else {
            info!("👋 Connection {} disconnected", id);
        }
        outcome
    }

    /// Routes one decoded client event to the matching operation.
    pub fn dispatch(&mut self, from: &ConnectionId, event: ClientEvent) -> DispatchOutcome {
        match event {
            ClientEvent::JoinPool => DispatchOutcome::Join(self.join_pool(from)),
            ClientEvent::Signal(signal) => DispatchOutcome::Relay(self.relay_signal(from, signal)),
            ClientEvent::Report { user_id } => {
                self.report(from, &user_id);
                DispatchOutcome::Reported
            }
            ClientEvent::LeaveRoom { room_id } => DispatchOutcome::Leave(self.leave(from, &room_id)),
        }
    }

    /// Sends `message` to one connection, if it still has a live handle.
    ///
    /// Returns whether the message was handed to the transport.
    pub fn deliver(&self, to: &ConnectionId, message: ServerMessage) -> bool {
        let Some(sender) = self.registry.get(to) else {
            debug!("Skipping {} to {}: no live connection", message.event(), to);
            return false;
        };
        match sender.send(&message) {
            Ok(()) => true,
            Err(e) => {
                warn!("Failed to send {} to {}: {}", message.event(), to, e);
                false
            }
        }
    }

    fn close_session(&mut self, session_id: &SessionId) -> Option<Session> {
        let session = self.sessions.remove(session_id)?;
        for member in session.members() {
            self.membership.remove(member);
        }
        Some(session)
    }
}

impl<S> Matchmaker<S> {
    pub fn status(&self) -> PoolStatus {
        PoolStatus {
            waiting: self.waiting.len(),
            active_sessions: self.sessions.len(),
        }
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            total_connections: self.registry.len(),
            waiting: self.waiting.len(),
            active_sessions: self.sessions.len(),
            paired_connections: self.membership.len(),
        }
    }

    pub fn is_registered(&self, id: &ConnectionId) -> bool {
        self.registry.contains_key(id)
    }

    pub fn is_waiting(&self, id: &ConnectionId) -> bool {
        self.waiting.contains(id)
    }

    /// The session `id` currently belongs to, if any.
    pub fn session_of(&self, id: &ConnectionId) -> Option<&Session> {
        self.membership
            .get(id)
            .and_then(|session_id| self.sessions.get(session_id))
    }

    pub fn session(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Waiting connections, longest-waiting first.
    pub fn waiting(&self) -> impl Iterator<Item = &ConnectionId> {
        self.waiting.iter()
    }
}
