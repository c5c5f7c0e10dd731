//! Thread-safe handle to one [`Matchmaker`].
//!
//! Event handlers run concurrently on the async runtime, but every state
//! transition must appear atomic to every other: a match pops the waiting
//! partner and creates the session in one step, and a disconnect can never
//! interleave with it. A single mutex around the whole state gives exactly
//! that. It is held only for the synchronous body of one operation (sends are
//! non-blocking), never across an `.await`.

use crate::ids::{ConnectionId, SessionId};
use crate::matchmaker::{
    ConnectOutcome, DisconnectOutcome, DispatchOutcome, JoinOutcome, LeaveOutcome, Matchmaker,
    PoolStats, PoolStatus, RelayOutcome,
};
use crate::protocol::{ClientEvent, Signal};
use crate::sender::ClientSender;
use parking_lot::Mutex;
use std::sync::Arc;

/// Cloneable, lock-protected [`Matchmaker`].
pub struct SharedMatchmaker<S> {
    inner: Arc<Mutex<Matchmaker<S>>>,
}

impl<S> Clone for SharedMatchmaker<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: ClientSender> Default for SharedMatchmaker<S> {
    fn default() -> Self {
        Self::new(Matchmaker::new())
    }
}

impl<S: ClientSender> SharedMatchmaker<S> {
    pub fn new(matchmaker: Matchmaker<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(matchmaker)),
        }
    }

    /// Runs `f` with exclusive access to the state.
    ///
    /// `f` must not block; it runs while every other handler waits.
    pub fn with<R>(&self, f: impl FnOnce(&mut Matchmaker<S>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    pub fn connect(&self, id: ConnectionId, sender: S) -> ConnectOutcome {
        self.inner.lock().connect(id, sender)
    }

    pub fn join_pool(&self, id: &ConnectionId) -> JoinOutcome {
        self.inner.lock().join_pool(id)
    }

    pub fn relay_signal(&self, from: &ConnectionId, signal: Signal) -> RelayOutcome {
        self.inner.lock().relay_signal(from, signal)
    }

    pub fn leave(&self, id: &ConnectionId, session_id: &SessionId) -> LeaveOutcome {
        self.inner.lock().leave(id, session_id)
    }

    pub fn report(&self, id: &ConnectionId, target: &ConnectionId) {
        self.inner.lock().report(id, target)
    }

    pub fn disconnect(&self, id: &ConnectionId) -> DisconnectOutcome {
        self.inner.lock().disconnect(id)
    }

    pub fn dispatch(&self, from: &ConnectionId, event: ClientEvent) -> DispatchOutcome {
        self.inner.lock().dispatch(from, event)
    }

    pub fn status(&self) -> PoolStatus {
        self.inner.lock().status()
    }

    pub fn stats(&self) -> PoolStats {
        self.inner.lock().stats()
    }
}
