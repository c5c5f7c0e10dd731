//! # Vidimeet Matchmaker - Random Pairing and Signaling Relay Core
//!
//! Transport-independent core of the Vidimeet relay. It pairs anonymous
//! clients two at a time and relays WebRTC signaling and text chat between
//! the members of each pair. Media never passes through here.
//!
//! ## Components
//!
//! * **Connection registry** - Live connections and their send handles
//! * **Waiting pool** - Connections that asked for a partner, oldest first
//! * **Session table** - Two-member sessions keyed by [`SessionId`]
//!
//! All three are owned by [`Matchmaker`] and mutated only through its
//! operations. [`SharedMatchmaker`] wraps one instance behind a mutex so that
//! concurrent event handlers observe each operation atomically.
//!
//! ## Message Flow
//!
//! 1. The transport registers a connection with [`Matchmaker::connect`]
//! 2. Named client events are decoded with [`ClientEvent::decode`]
//! 3. [`Matchmaker::dispatch`] routes each event to its operation
//! 4. Outbound [`ServerMessage`]s go out through the connection's
//!    [`ClientSender`]
//! 5. [`Matchmaker::disconnect`] purges the connection when the transport
//!    reports it gone
//!
//! ## Example
//!
//! ```rust
//! use tokio::sync::mpsc;
//! use vidimeet_matchmaker::{ConnectionId, JoinOutcome, Matchmaker};
//!
//! let mut matchmaker = Matchmaker::new();
//! let (alice_tx, _alice_rx) = mpsc::unbounded_channel();
//! let (bob_tx, mut bob_rx) = mpsc::unbounded_channel();
//!
//! let alice = ConnectionId::new("alice");
//! let bob = ConnectionId::new("bob");
//! matchmaker.connect(alice.clone(), alice_tx);
//! matchmaker.connect(bob.clone(), bob_tx);
//!
//! assert_eq!(matchmaker.join_pool(&alice), JoinOutcome::Queued);
//! assert!(matches!(matchmaker.join_pool(&bob), JoinOutcome::Matched { .. }));
//! assert_eq!(bob_rx.try_recv().unwrap().event(), "matched");
//! ```

pub use ids::{ConnectionId, SessionId};
pub use matchmaker::{
    ConnectOutcome, DisconnectOutcome, DispatchOutcome, JoinOutcome, LeaveOutcome, Matchmaker,
    PoolStats, PoolStatus, RelayOutcome,
};
pub use pool::WaitingPool;
pub use protocol::{
    ClientEvent, ProtocolError, ServerMessage, Signal, SignalKind, GENERIC_ERROR_MESSAGE,
};
pub use sender::{ClientSender, SendError};
pub use session::Session;
pub use shared::SharedMatchmaker;

pub mod ids;
pub mod matchmaker;
pub mod pool;
pub mod protocol;
pub mod sender;
pub mod session;
pub mod shared;
