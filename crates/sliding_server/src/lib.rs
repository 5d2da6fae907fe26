//! Sliding Games server library.
//!
//! Pairs participants into rooms and relays three-mark tic-tac-toe moves
//! between them over WebSocket.
//!
//! # Architecture
//!
//! - **Registry**: room membership, created on first join, dropped when empty
//! - **Gateway**: dispatches inbound events and fans out outbound ones
//! - **HTTP**: axum router serving socket upgrades and a liveness probe
//! - **Client**: participant-side controller with a local game mirror
//!
//! # Example
//!
//! ```no_run
//! use sliding_server::{RelayMode, RoomRegistry, SessionGateway};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let gateway = SessionGateway::new(RoomRegistry::new(), RelayMode::Relay);
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! sliding_server::serve(listener, gateway, "/api/socket").await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod config;
mod gateway;
mod http;
mod play;
mod protocol;
mod registry;

pub use client::{ClientController, IntentError};
pub use config::{ConfigError, RelayMode, ServerConfig};
pub use gateway::{Outbox, ROOM_CAPACITY, SessionGateway};
pub use http::{Liveness, router, serve};
pub use play::{Input, run as play};
pub use protocol::{
    ClientEvent, MoveRejection, MoveRequest, ProtocolError, ServerEvent, decode, encode,
};
pub use registry::{ConnectionId, Room, RoomId, RoomRegistry};
