//! The waiting pool: connections looking for a partner.
//!
//! Membership is a set, but entries remember their arrival order so the
//! matcher can always hand out the connection that has waited longest.

use crate::ids::ConnectionId;
use std::collections::{BTreeMap, HashMap};

/// Insertion-ordered set of waiting connections.
#[derive(Debug, Default)]
pub struct WaitingPool {
    /// Arrival ticket -> connection, oldest first.
    order: BTreeMap<u64, ConnectionId>,
    tickets: HashMap<ConnectionId, u64>,
    next_ticket: u64,
}

impl WaitingPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `id` to the pool.
    ///
    /// Returns `false` (and leaves its position untouched) if it was already
    /// waiting.
    pub fn enqueue(&mut self, id: ConnectionId) -> bool {
        if self.tickets.contains_key(&id) {
            return false;
        }
        let ticket = self.next_ticket;
        self.next_ticket += 1;
        self.order.insert(ticket, id.clone());
        self.tickets.insert(id, ticket);
        true
    }

    /// Removes `id` if present. Returns whether it was waiting.
    pub fn remove(&mut self, id: &ConnectionId) -> bool {
        match self.tickets.remove(id) {
            Some(ticket) => {
                self.order.remove(&ticket);
                true
            }
            None => false,
        }
    }

    /// Removes and returns the connection that has waited longest.
    pub fn pop_oldest(&mut self) -> Option<ConnectionId> {
        let (_, id) = self.order.pop_first()?;
        self.tickets.remove(&id);
        Some(id)
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.tickets.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// Waiting connections, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &ConnectionId> {
        self.order.values()
    }
}
