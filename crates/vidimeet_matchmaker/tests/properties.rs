//! Property tests: random operation sequences never break the pairing invariants.

use proptest::prelude::*;
use serde_json::json;
use std::collections::HashSet;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use vidimeet_matchmaker::{
    ConnectionId, JoinOutcome, LeaveOutcome, Matchmaker, ServerMessage, Signal, SignalKind,
};

const CLIENTS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Connect(usize),
    Join(usize),
    LeaveOwn(usize),
    LeaveOther(usize, usize),
    Relay(usize, usize),
    Report(usize, usize),
    Disconnect(usize),
}

fn op() -> impl Strategy<Value = Op> {
    let client = 0..CLIENTS;
    prop_oneof![
        1 => client.clone().prop_map(Op::Connect),
        3 => client.clone().prop_map(Op::Join),
        1 => client.clone().prop_map(Op::LeaveOwn),
        1 => (client.clone(), client.clone()).prop_map(|(a, b)| Op::LeaveOther(a, b)),
        2 => (client.clone(), client.clone()).prop_map(|(a, b)| Op::Relay(a, b)),
        1 => (client.clone(), client.clone()).prop_map(|(a, b)| Op::Report(a, b)),
        1 => client.prop_map(Op::Disconnect),
    ]
}

fn id(i: usize) -> ConnectionId {
    ConnectionId::new(format!("client-{i}"))
}

struct World {
    matchmaker: Matchmaker<UnboundedSender<ServerMessage>>,
    inboxes: Vec<Option<UnboundedReceiver<ServerMessage>>>,
}

impl World {
    fn new() -> Self {
        Self {
            matchmaker: Matchmaker::new(),
            inboxes: (0..CLIENTS).map(|_| None).collect(),
        }
    }

    fn apply(&mut self, op: &Op) {
        let mm = &mut self.matchmaker;
        match *op {
            Op::Connect(i) => {
                if !mm.is_registered(&id(i)) {
                    let (tx, rx) = mpsc::unbounded_channel();
                    mm.connect(id(i), tx);
                    self.inboxes[i] = Some(rx);
                }
            }
            Op::Join(i) => {
                let was_in_session = mm.session_of(&id(i)).is_some();
                let outcome = mm.join_pool(&id(i));
                if was_in_session {
                    assert!(matches!(outcome, JoinOutcome::AlreadyInSession(_)));
                }
            }
            Op::LeaveOwn(i) => {
                if let Some(session_id) = mm.session_of(&id(i)).map(|s| s.id) {
                    let outcome = mm.leave(&id(i), &session_id);
                    assert!(matches!(outcome, LeaveOutcome::Closed { .. }));
                    assert!(mm.session(&session_id).is_none());
                }
            }
            Op::LeaveOther(i, j) => {
                if let Some(session_id) = mm.session_of(&id(j)).map(|s| s.id) {
                    let before = mm.stats();
                    let outcome = mm.leave(&id(i), &session_id);
                    assert!(matches!(outcome, LeaveOutcome::Closed { .. }));
                    assert!(mm.session(&session_id).is_none());
                    assert!(mm.session_of(&id(j)).is_none());
                    assert_eq!(mm.stats().active_sessions, before.active_sessions - 1);
                    assert_eq!(mm.stats().waiting, before.waiting);
                }
            }
            Op::Relay(i, j) => {
                if let Some(session_id) = mm.session_of(&id(j)).map(|s| s.id) {
                    let signal = Signal {
                        kind: SignalKind::Message,
                        room_id: session_id,
                        payload: json!(format!("from {i}")),
                    };
                    let before = mm.stats();
                    mm.relay_signal(&id(i), signal);
                    assert_eq!(mm.stats(), before);
                }
            }
            Op::Report(i, j) => {
                let before = mm.stats();
                mm.report(&id(i), &id(j));
                assert_eq!(mm.stats(), before);
            }
            Op::Disconnect(i) => {
                mm.disconnect(&id(i));
                self.inboxes[i] = None;
                assert!(!mm.is_registered(&id(i)));
                assert!(mm.session_of(&id(i)).is_none());
                assert!(!mm.is_waiting(&id(i)));
            }
        }
    }

    fn check_invariants(&self) {
        let mm = &self.matchmaker;
        let waiting: HashSet<_> = mm.waiting().cloned().collect();
        assert!(waiting.len() <= 1, "two waiting connections should have been paired");

        let mut paired = HashSet::new();
        for session in mm.sessions() {
            let [a, b] = session.members();
            assert_ne!(a, b);
            for member in [a, b] {
                assert!(paired.insert(member.clone()), "{member} is in two sessions");
                assert!(!waiting.contains(member), "{member} is waiting and paired");
                assert!(mm.is_registered(member));
                assert_eq!(mm.session_of(member).map(|s| s.id), Some(session.id));
            }
        }
        for member in &waiting {
            assert!(mm.is_registered(member));
        }

        let stats = mm.stats();
        assert_eq!(stats.paired_connections, paired.len());
        assert_eq!(stats.active_sessions * 2, paired.len());
        assert_eq!(stats.waiting, waiting.len());
    }

    /// Drains every inbox and checks that nobody received a message that
    /// could only have come from outside their own session.
    fn check_deliveries(&mut self) {
        for (i, inbox) in self.inboxes.iter_mut().enumerate() {
            let Some(inbox) = inbox else { continue };
            while let Ok(message) = inbox.try_recv() {
                if let ServerMessage::Message { message } = message {
                    let sender: usize = message
                        .as_str()
                        .and_then(|s| s.strip_prefix("from "))
                        .and_then(|s| s.parse().ok())
                        .expect("relayed payload");
                    assert_ne!(sender, i, "client {i} received its own message");
                }
            }
        }
    }
}

proptest! {
    #[test]
    fn random_operation_sequences_preserve_invariants(ops in prop::collection::vec(op(), 1..120)) {
        let mut world = World::new();
        for op in &ops {
            world.apply(op);
            world.check_invariants();
            world.check_deliveries();
        }
    }

    #[test]
    fn everyone_who_joins_is_eventually_paired_or_waiting(joiners in prop::collection::vec(0..CLIENTS, 1..40)) {
        let mut world = World::new();
        for i in 0..CLIENTS {
            world.apply(&Op::Connect(i));
        }
        let mut joined = HashSet::new();
        for i in joiners {
            world.apply(&Op::Join(i));
            joined.insert(i);
            world.check_invariants();
        }
        let mm = &world.matchmaker;
        for i in joined {
            prop_assert!(mm.is_waiting(&id(i)) || mm.session_of(&id(i)).is_some());
        }
    }
}
