//! Per-connection protocol core for a STOMP 1.0/1.1/1.2 message broker.
//!
//! Each accepted socket is driven by two tasks: a reader that assembles
//! and deadline-checks frames, and a session engine that owns all session
//! state and multiplexes command handling with outbound delivery. The
//! broker upper layer talks to a session through its [`Conn`] handle and
//! receives [`Request`]s on a shared channel.

pub mod codec;
pub mod config;
pub mod connection;
pub mod error;
pub mod frame;
pub mod parser;
pub mod request;
pub mod server;
pub mod subscription;
pub mod transaction;

pub use codec::{StompCodec, StompItem};
pub use config::{BrokerConfig, Config};
pub use connection::{ClosedError, Conn};
pub use error::StompError;
pub use frame::{command, header, Frame, Headers, Version, MAX_CONTENT_LENGTH, MAX_HEART_BEAT};
pub use request::Request;
pub use server::serve;
pub use subscription::{AckMode, Subscription, SubscriptionList};
pub use transaction::TxStore;
