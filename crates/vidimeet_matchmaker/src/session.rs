//! Matched two-party sessions.

use crate::ids::{ConnectionId, SessionId};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// A pairing of exactly two connections.
///
/// Membership never changes after creation: a session is destroyed, not
/// shrunk, when either member leaves.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: SessionId,
    members: [ConnectionId; 2],
    /// Informational only; no logic depends on it.
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(id: SessionId, first: ConnectionId, second: ConnectionId) -> Self {
        Self {
            id,
            members: [first, second],
            created_at: Utc::now(),
        }
    }

    pub fn members(&self) -> &[ConnectionId; 2] {
        &self.members
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.members.contains(id)
    }

    /// The member that is not `id`, or `None` if `id` is not a member.
    pub fn partner_of(&self, id: &ConnectionId) -> Option<&ConnectionId> {
        match &self.members {
            [a, b] if a == id => Some(b),
            [a, b] if b == id => Some(a),
            _ => None,
        }
    }

    /// The first member that is not `id`.
    ///
    /// Same as [`partner_of`](Self::partner_of) for members; for anyone else
    /// it is the first member.
    pub fn other_than(&self, id: &ConnectionId) -> &ConnectionId {
        let [a, b] = &self.members;
        if a == id {
            b
        } else {
            a
        }
    }
}
