//! Session gateway: binds connections to rooms and fans events out.
//!
//! The gateway is transport-agnostic. A transport calls [`SessionGateway::connect`]
//! to obtain a connection id plus a receiver of outbound [`ServerEvent`]s, feeds
//! inbound events through [`SessionGateway::dispatch`], and reports the end of
//! the connection with [`SessionGateway::disconnect`].

use crate::config::RelayMode;
use crate::protocol::{ClientEvent, MoveRejection, MoveRequest, ServerEvent};
use crate::registry::{ConnectionId, RoomRegistry};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

/// Players per room. Later joiners are refused with `room-full`.
pub const ROOM_CAPACITY: usize = 2;

/// Receiving half of a connection's outbound queue.
pub type Outbox = mpsc::UnboundedReceiver<ServerEvent>;

#[derive(Debug)]
struct GatewayState {
    registry: RoomRegistry,
    connections: HashMap<ConnectionId, mpsc::UnboundedSender<ServerEvent>>,
}

impl GatewayState {
    fn send_to(&self, conn: &str, event: ServerEvent) {
        match self.connections.get(conn) {
            Some(tx) => {
                if tx.send(event).is_err() {
                    debug!(conn, "Outbox closed, dropping event");
                }
            }
            None => debug!(conn, "Unknown connection, dropping event"),
        }
    }

    fn broadcast(&self, room: &str, event: &ServerEvent) {
        for member in self.registry.members(room) {
            self.send_to(&member, event.clone());
        }
    }

    fn broadcast_except(&self, room: &str, sender: &str, event: &ServerEvent) {
        for member in self.registry.members(room) {
            if member != sender {
                self.send_to(&member, event.clone());
            }
        }
    }
}

/// Connection and room coordinator.
///
/// Cloning is cheap; clones share the same registry. All state sits behind a
/// single mutex held for the length of one dispatch, so events are applied
/// one at a time in the order they reach the lock.
#[derive(Debug, Clone)]
pub struct SessionGateway {
    state: Arc<Mutex<GatewayState>>,
    next_id: Arc<AtomicU64>,
    mode: RelayMode,
}

impl SessionGateway {
    /// Creates a gateway around the given registry.
    #[instrument(skip(registry))]
    pub fn new(registry: RoomRegistry, mode: RelayMode) -> Self {
        info!(%mode, "Creating session gateway");
        Self {
            state: Arc::new(Mutex::new(GatewayState {
                registry,
                connections: HashMap::new(),
            })),
            next_id: Arc::new(AtomicU64::new(1)),
            mode,
        }
    }

    /// Move handling mode.
    pub fn mode(&self) -> RelayMode {
        self.mode
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new connection.
    #[instrument(skip(self))]
    pub fn connect(&self) -> (ConnectionId, Outbox) {
        let id = format!("conn-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = mpsc::unbounded_channel();
        self.lock().connections.insert(id.clone(), tx);
        info!(conn = %id, "Client connected");
        (id, rx)
    }

    /// Handles one inbound event from `conn`.
    #[instrument(skip(self, event), fields(room = event.room()))]
    pub fn dispatch(&self, conn: &str, event: ClientEvent) {
        let mut state = self.lock();
        if !state.connections.contains_key(conn) {
            warn!(conn, "Event from unregistered connection ignored");
            return;
        }

        match event {
            ClientEvent::JoinRoom(room) => Self::join(&mut state, conn, &room),
            ClientEvent::StartGame(room) => {
                if !self.admits(&state, conn, &room) {
                    return;
                }
                if self.mode == RelayMode::Authoritative
                    && let Some(game) = state.registry.game_mut(&room)
                {
                    game.start();
                }
                state.broadcast(&room, &ServerEvent::GameStart);
                info!(room, "Game started");
            }
            ClientEvent::MakeMove(req) => {
                if !self.admits(&state, conn, &req.room) {
                    return;
                }
                self.relay_move(&mut state, conn, req);
            }
            ClientEvent::ResetGame(room) => {
                if !self.admits(&state, conn, &room) {
                    return;
                }
                if self.mode == RelayMode::Authoritative
                    && let Some(game) = state.registry.game_mut(&room)
                {
                    game.reset();
                }
                state.broadcast(&room, &ServerEvent::GameReset);
                info!(room, "Game reset");
            }
        }
    }

    /// Removes `conn` from the gateway and every room it was in.
    #[instrument(skip(self))]
    pub fn disconnect(&self, conn: &str) {
        let mut state = self.lock();
        state.connections.remove(conn);
        for (room, count) in state.registry.leave(conn) {
            // Deleted rooms have nobody left to tell.
            state.broadcast(&room, &ServerEvent::RoomUpdate(count));
            debug!(room, count, "Room shrank");
        }
        info!(conn, "Client disconnected");
    }

    /// Number of live rooms.
    pub fn room_count(&self) -> usize {
        self.lock().registry.room_count()
    }

    /// Member count of `room`.
    pub fn member_count(&self, room: &str) -> usize {
        self.lock().registry.member_count(room)
    }

    /// Number of registered connections.
    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }

    fn join(state: &mut GatewayState, conn: &str, room: &str) {
        let rejoin = state.registry.contains(room, conn);
        if !rejoin && state.registry.member_count(room) >= ROOM_CAPACITY {
            warn!(conn, room, "Room is full");
            state.send_to(conn, ServerEvent::RoomFull(room.to_string()));
            return;
        }

        let count = state.registry.join(room, conn);
        state.broadcast(room, &ServerEvent::RoomUpdate(count));

        let side = state.registry.assign_side(room, conn);
        state.send_to(conn, ServerEvent::PlayerNumber(side));
        info!(conn, room, count, %side, "Client joined room");
    }

    /// Relay mode forwards room events from anyone; authoritative mode only
    /// from members.
    fn admits(&self, state: &GatewayState, conn: &str, room: &str) -> bool {
        if self.mode == RelayMode::Relay {
            return true;
        }
        let member = state.registry.contains(room, conn);
        if !member {
            warn!(conn, room, "Event for a room the connection has not joined");
        }
        member
    }

    fn relay_move(&self, state: &mut GatewayState, conn: &str, req: MoveRequest) {
        if self.mode == RelayMode::Authoritative
            && let Some(game) = state.registry.game_mut(&req.room)
            && let Err(e) = game.apply_move(req.position, req.side)
        {
            warn!(conn, room = %req.room, position = %req.position, error = %e, "Move rejected");
            let rejection = MoveRejection::new(req.position, e.to_string());
            state.send_to(conn, ServerEvent::MoveRejected(rejection));
            return;
        }

        let mv = req.as_move();
        state.broadcast_except(&req.room, conn, &ServerEvent::OpponentMove(mv));
        info!(room = %req.room, %mv, "Move relayed");
    }
}
