//! Tests for gateway dispatch and fan-out.

use sliding_server::{
    ClientController, ClientEvent, MoveRequest, Outbox, RelayMode, RoomRegistry, ServerEvent,
    SessionGateway,
};
use sliding_tictactoe::{Move, Position, Side};

fn drain(rx: &mut Outbox) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn relay_gateway() -> SessionGateway {
    SessionGateway::new(RoomRegistry::new(), RelayMode::Relay)
}

fn make_move(room: &str, side: Side, position: Position) -> ClientEvent {
    ClientEvent::MakeMove(MoveRequest {
        room: room.to_string(),
        side,
        position,
    })
}

#[test]
fn test_join_start_move_scenario() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();

    gateway.dispatch(&a, ClientEvent::JoinRoom("room1".into()));
    assert_eq!(
        drain(&mut rx_a),
        vec![ServerEvent::RoomUpdate(1), ServerEvent::PlayerNumber(Side::X)]
    );

    gateway.dispatch(&b, ClientEvent::JoinRoom("room1".into()));
    assert_eq!(drain(&mut rx_a), vec![ServerEvent::RoomUpdate(2)]);
    assert_eq!(
        drain(&mut rx_b),
        vec![ServerEvent::RoomUpdate(2), ServerEvent::PlayerNumber(Side::O)]
    );

    gateway.dispatch(&a, ClientEvent::StartGame("room1".into()));
    assert_eq!(drain(&mut rx_a), vec![ServerEvent::GameStart]);
    assert_eq!(drain(&mut rx_b), vec![ServerEvent::GameStart]);

    gateway.dispatch(&a, make_move("room1", Side::X, Position::Center));
    assert!(drain(&mut rx_a).is_empty());
    assert_eq!(
        drain(&mut rx_b),
        vec![ServerEvent::OpponentMove(Move::new(Side::X, Position::Center))]
    );
}

#[test]
fn test_move_is_not_relayed_to_other_rooms() {
    let gateway = relay_gateway();
    let (a, _rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    let (c, mut rx_c) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r1".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r1".into()));
    gateway.dispatch(&c, ClientEvent::JoinRoom("r2".into()));
    drain(&mut rx_b);
    drain(&mut rx_c);

    gateway.dispatch(&a, make_move("r1", Side::X, Position::TopLeft));
    assert_eq!(drain(&mut rx_b).len(), 1);
    assert!(drain(&mut rx_c).is_empty());
}

#[test]
fn test_relay_mode_forwards_without_validation() {
    let gateway = relay_gateway();
    let (a, _rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));
    drain(&mut rx_b);

    // Not started and the same cell twice: the relay does not care.
    gateway.dispatch(&a, make_move("r", Side::X, Position::Center));
    gateway.dispatch(&a, make_move("r", Side::X, Position::Center));
    assert_eq!(drain(&mut rx_b).len(), 2);
}

#[test]
fn test_reset_twice_broadcasts_twice() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));
    drain(&mut rx_a);
    drain(&mut rx_b);

    gateway.dispatch(&a, ClientEvent::ResetGame("r".into()));
    gateway.dispatch(&a, ClientEvent::ResetGame("r".into()));
    let expected = vec![ServerEvent::GameReset, ServerEvent::GameReset];
    assert_eq!(drain(&mut rx_a), expected);
    assert_eq!(drain(&mut rx_b), expected);
    assert_eq!(gateway.member_count("r"), 2);
}

#[test]
fn test_disconnect_updates_remaining_member_and_drops_empty_room() {
    let gateway = relay_gateway();
    let (a, _rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r1".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r1".into()));
    drain(&mut rx_b);

    gateway.disconnect(&a);
    assert_eq!(drain(&mut rx_b), vec![ServerEvent::RoomUpdate(1)]);

    gateway.disconnect(&b);
    assert_eq!(gateway.room_count(), 0);

    let (c, mut rx_c) = gateway.connect();
    gateway.dispatch(&c, ClientEvent::JoinRoom("r1".into()));
    assert_eq!(
        drain(&mut rx_c),
        vec![ServerEvent::RoomUpdate(1), ServerEvent::PlayerNumber(Side::X)]
    );
}

#[test]
fn test_rejoin_does_not_grow_room() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    assert_eq!(gateway.member_count("r"), 1);
    assert_eq!(
        drain(&mut rx_a),
        vec![
            ServerEvent::RoomUpdate(1),
            ServerEvent::PlayerNumber(Side::X),
            ServerEvent::RoomUpdate(1),
            ServerEvent::PlayerNumber(Side::X),
        ]
    );
}

#[test]
fn test_authoritative_mode_relays_only_accepted_moves() {
    let gateway = SessionGateway::new(RoomRegistry::new(), RelayMode::Authoritative);
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));

    // Before start every move bounces.
    gateway.dispatch(&a, make_move("r", Side::X, Position::Center));
    drain(&mut rx_b);
    assert!(matches!(
        drain(&mut rx_a).last(),
        Some(ServerEvent::MoveRejected(_))
    ));

    gateway.dispatch(&a, ClientEvent::StartGame("r".into()));
    drain(&mut rx_a);
    drain(&mut rx_b);

    gateway.dispatch(&a, make_move("r", Side::X, Position::Center));
    assert_eq!(
        drain(&mut rx_b),
        vec![ServerEvent::OpponentMove(Move::new(Side::X, Position::Center))]
    );

    gateway.dispatch(&b, make_move("r", Side::O, Position::Center));
    assert!(drain(&mut rx_a).is_empty());
    assert!(matches!(
        drain(&mut rx_b).as_slice(),
        [ServerEvent::MoveRejected(r)] if r.position == Position::Center
    ));

    // Reset clears the server-side board too.
    gateway.dispatch(&b, ClientEvent::ResetGame("r".into()));
    gateway.dispatch(&b, ClientEvent::StartGame("r".into()));
    drain(&mut rx_a);
    gateway.dispatch(&a, make_move("r", Side::X, Position::Center));
    drain(&mut rx_b);
    assert!(drain(&mut rx_a).is_empty());
}

#[test]
fn test_two_controllers_stay_in_sync_through_gateway() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    let mut alice = ClientController::new();
    let mut bob = ClientController::new();

    let pump = |client: &mut ClientController, rx: &mut Outbox| {
        for event in drain(rx) {
            client.handle(event);
        }
    };

    gateway.dispatch(&a, alice.join("room").unwrap());
    gateway.dispatch(&b, bob.join("room").unwrap());
    pump(&mut alice, &mut rx_a);
    pump(&mut bob, &mut rx_b);
    assert_eq!(alice.side(), &Some(Side::X));
    assert_eq!(bob.side(), &Some(Side::O));
    assert_eq!(alice.players_in_room(), &2);

    gateway.dispatch(&a, alice.start().unwrap());
    pump(&mut alice, &mut rx_a);
    pump(&mut bob, &mut rx_b);

    let moves = [
        (true, Position::TopLeft),
        (false, Position::Center),
        (true, Position::TopRight),
        (false, Position::BottomLeft),
        (true, Position::TopLeft),
    ];
    for (alice_moves, pos) in moves {
        if alice_moves {
            gateway.dispatch(&a, alice.play(pos).unwrap());
        } else {
            gateway.dispatch(&b, bob.play(pos).unwrap());
        }
        pump(&mut alice, &mut rx_a);
        pump(&mut bob, &mut rx_b);
        assert_eq!(alice.game(), bob.game());
    }

    assert_eq!(
        alice.game().history(),
        vec![Position::TopRight, Position::BottomLeft, Position::TopLeft]
    );
}

#[test]
fn test_non_member_move_reaches_every_member_in_relay_mode() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    let (outsider, mut rx_out) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));
    drain(&mut rx_a);
    drain(&mut rx_b);

    gateway.dispatch(&outsider, ClientEvent::StartGame("r".into()));
    gateway.dispatch(&outsider, make_move("r", Side::X, Position::Center));
    let expected = vec![
        ServerEvent::GameStart,
        ServerEvent::OpponentMove(Move::new(Side::X, Position::Center)),
    ];
    assert_eq!(drain(&mut rx_a), expected);
    assert_eq!(drain(&mut rx_b), expected);
    assert!(drain(&mut rx_out).is_empty());
    assert_eq!(gateway.member_count("r"), 2);
}

#[test]
fn test_rejoin_into_full_room_keeps_sides() {
    let gateway = relay_gateway();
    let (a, mut rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    let mut alice = ClientController::new();
    let mut bob = ClientController::new();

    gateway.dispatch(&a, alice.join("r").unwrap());
    gateway.dispatch(&b, bob.join("r").unwrap());
    gateway.dispatch(&a, alice.join("r").unwrap());
    for event in drain(&mut rx_a) {
        alice.handle(event);
    }
    for event in drain(&mut rx_b) {
        bob.handle(event);
    }

    assert_eq!(alice.side(), &Some(Side::X));
    assert_eq!(bob.side(), &Some(Side::O));
    assert_eq!(gateway.member_count("r"), 2);
}

#[test]
fn test_refill_after_x_leaves_assigns_x() {
    let gateway = relay_gateway();
    let (a, _rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));
    gateway.disconnect(&a);
    drain(&mut rx_b);

    let (c, mut rx_c) = gateway.connect();
    gateway.dispatch(&c, ClientEvent::JoinRoom("r".into()));
    assert_eq!(
        drain(&mut rx_c),
        vec![ServerEvent::RoomUpdate(2), ServerEvent::PlayerNumber(Side::X)]
    );
    assert_eq!(drain(&mut rx_b), vec![ServerEvent::RoomUpdate(2)]);

    // O still belongs to b.
    gateway.dispatch(&b, ClientEvent::JoinRoom("r".into()));
    assert_eq!(
        drain(&mut rx_b),
        vec![ServerEvent::RoomUpdate(2), ServerEvent::PlayerNumber(Side::O)]
    );
}

#[test]
fn test_disconnect_updates_every_room_the_connection_joined() {
    let gateway = relay_gateway();
    let (a, _rx_a) = gateway.connect();
    let (b, mut rx_b) = gateway.connect();
    let (c, mut rx_c) = gateway.connect();
    gateway.dispatch(&a, ClientEvent::JoinRoom("r1".into()));
    gateway.dispatch(&a, ClientEvent::JoinRoom("r2".into()));
    gateway.dispatch(&a, ClientEvent::JoinRoom("r3".into()));
    gateway.dispatch(&b, ClientEvent::JoinRoom("r1".into()));
    gateway.dispatch(&c, ClientEvent::JoinRoom("r2".into()));
    drain(&mut rx_b);
    drain(&mut rx_c);
    assert_eq!(gateway.room_count(), 3);

    gateway.disconnect(&a);
    assert_eq!(drain(&mut rx_b), vec![ServerEvent::RoomUpdate(1)]);
    assert_eq!(drain(&mut rx_c), vec![ServerEvent::RoomUpdate(1)]);
    assert_eq!(gateway.member_count("r1"), 1);
    assert_eq!(gateway.member_count("r2"), 1);
    assert_eq!(gateway.room_count(), 2);
}
