//! Coordinator behavior tests
//!
//! Lobby lifecycle, match start and completion, disconnects, expiry and
//! shutdown, observed through the events each session receives.

use std::time::Duration;

use termplay_core::{GameId, InputFlags, JoinCode, MatchId, PlayerSlot, SessionId};
use termplay_harness::{
    FixedCodes, SimEnv, SimServer, decode_snapshot, duel_registry, failing_factory, next_event,
    next_lifecycle_event, wait_until,
};
use termplay_proto::{EndReason, Event, Message};
use termplay_server::{
    ChaoticResultSink, CoordinatorConfig, CoordinatorError, CoordinatorHandle, MemoryResultSink,
    ResultSink, SessionHandle,
};

fn server(target: u32, codes: &[&str]) -> SimServer {
    SimServer::start(
        CoordinatorConfig::default(),
        SimEnv::new(),
        duel_registry(target),
        FixedCodes::new(codes.iter().copied()),
    )
}

fn lobby_error(message: &str) -> Event {
    Event::lobby_error(message)
}

async fn create(server: &SimServer<impl ResultSink>, host: &SessionHandle) -> JoinCode {
    server
        .apply(Message::CreateLobby {
            session_id: host.id().clone(),
            game_id: GameId::from("pong"),
        })
        .await;
    match next_event(host).await {
        Event::LobbyCreated { code, .. } => code,
        other => panic!("expected LobbyCreated, got {other:?}"),
    }
}

async fn join(server: &SimServer<impl ResultSink>, guest: &SessionHandle, code: &str) {
    server
        .apply(Message::JoinLobby { session_id: guest.id().clone(), code: JoinCode::new(code) })
        .await;
}

async fn wait_for_counts(coordinator: &CoordinatorHandle<SimEnv>, lobbies: usize, matches: usize) {
    wait_until(|| {
        let coordinator = coordinator.clone();
        async move {
            coordinator.lobby_count().await == lobbies && coordinator.match_count().await == matches
        }
    })
    .await;
}

/// Pair `host` and `guest` and return the match id both were told about.
async fn pair(
    server: &SimServer<impl ResultSink>,
    host: &SessionHandle,
    guest: &SessionHandle,
) -> MatchId {
    let code = create(server, host).await;
    join(server, guest, code.as_str()).await;

    let mut ids = Vec::new();
    for session in [host, guest] {
        assert!(matches!(next_event(session).await, Event::LobbyJoined { .. }));
        match next_event(session).await {
            Event::MatchStarted { match_id, .. } => ids.push(match_id),
            other => panic!("expected MatchStarted, got {other:?}"),
        }
    }
    assert_eq!(ids[0], ids[1]);
    ids.remove(0)
}

#[tokio::test]
async fn create_lobby_reports_code_and_registers_host() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");

    let code = create(&server, &alice).await;

    assert_eq!(code, JoinCode::new("ABC123"));
    let info = server.coordinator.lobby(&code).await.unwrap();
    assert_eq!(info.host, SessionId::from("alice"));
    assert_eq!(info.game_id, GameId::from("pong"));
    assert_eq!(info.joiner, None);
    assert_eq!(server.coordinator.lobby_of(alice.id()).await, Some(code));
}

#[tokio::test]
async fn second_create_is_rejected() {
    let server = server(0, &["ABC123", "DEF456"]);
    let alice = server.connect("alice");
    create(&server, &alice).await;

    server
        .apply(Message::CreateLobby {
            session_id: alice.id().clone(),
            game_id: GameId::from("pong"),
        })
        .await;

    assert_eq!(next_event(&alice).await, lobby_error("Already in a lobby"));
    assert_eq!(server.coordinator.lobby_codes().await, vec![JoinCode::new("ABC123")]);
}

#[tokio::test]
async fn host_cannot_join_own_lobby() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let code = create(&server, &alice).await;

    join(&server, &alice, "abc123").await;

    assert_eq!(next_event(&alice).await, lobby_error("Cannot join your own lobby"));
    let info = server.coordinator.lobby(&code).await.unwrap();
    assert_eq!(info.joiner, None);
    assert_eq!(server.coordinator.match_count().await, 0);
}

#[tokio::test]
async fn joining_unknown_code_is_rejected() {
    let server = server(0, &["ABC123"]);
    let bob = server.connect("bob");

    join(&server, &bob, "ZZZZZZ").await;

    assert_eq!(next_event(&bob).await, lobby_error("Lobby not found"));
    assert_eq!(server.coordinator.lobby_of(bob.id()).await, None);
}

#[tokio::test(start_paused = true)]
async fn lowercase_join_starts_match_and_streams_identical_ticks() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");

    let code = create(&server, &alice).await;
    assert_eq!(code.as_str(), "ABC123");
    join(&server, &bob, "abc123").await;

    assert_eq!(
        next_event(&alice).await,
        Event::LobbyJoined { code: code.clone(), side: PlayerSlot::One, opponent_id: "bob".into() }
    );
    assert_eq!(
        next_event(&bob).await,
        Event::LobbyJoined {
            code: code.clone(),
            side: PlayerSlot::Two,
            opponent_id: "alice".into()
        }
    );

    let Event::MatchStarted { match_id, side: host_side, .. } = next_event(&alice).await else {
        panic!("expected MatchStarted")
    };
    let Event::MatchStarted { match_id: guest_match, side: guest_side, .. } =
        next_event(&bob).await
    else {
        panic!("expected MatchStarted")
    };
    assert_eq!(match_id, guest_match);
    assert_eq!((host_side, guest_side), (PlayerSlot::One, PlayerSlot::Two));
    assert!(match_id.as_str().starts_with("match-ABC123-"));

    assert!(server.coordinator.lobby(&code).await.is_none());
    assert_eq!(server.coordinator.match_count().await, 1);
    assert_eq!(server.coordinator.match_of(alice.id()).await, Some(match_id.clone()));
    assert_eq!(server.coordinator.match_of(bob.id()).await, Some(match_id.clone()));
    assert_eq!(server.coordinator.lobby_of(alice.id()).await, None);

    let mut host_stream = Vec::new();
    let mut guest_stream = Vec::new();
    for _ in 0..10 {
        host_stream.push(next_event(&alice).await);
        guest_stream.push(next_event(&bob).await);
    }
    assert_eq!(host_stream, guest_stream);

    let ticks: Vec<u64> = host_stream
        .iter()
        .map(|e| match e {
            Event::Snapshot { tick, .. } => *tick,
            other => panic!("expected snapshot, got {other:?}"),
        })
        .collect();
    assert_eq!(ticks, (1..=10).collect::<Vec<u64>>());

    let Event::Snapshot { payload, .. } = &host_stream[9] else { unreachable!() };
    assert!(!decode_snapshot(payload).unwrap().game_over);
}

#[tokio::test(start_paused = true)]
async fn session_in_a_match_cannot_join_another_lobby() {
    let server = server(0, &["ABC123", "DEF456"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let carol = server.connect("carol");
    pair(&server, &alice, &bob).await;

    let code = create(&server, &carol).await;
    join(&server, &bob, code.as_str()).await;

    assert_eq!(next_lifecycle_event(&bob).await, lobby_error("Already in a lobby"));
    assert_eq!(server.coordinator.lobby(&code).await.unwrap().joiner, None);
}

#[tokio::test]
async fn cancel_by_non_host_is_ignored() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let code = create(&server, &alice).await;

    server.apply(Message::CancelLobby { session_id: bob.id().clone(), code: code.clone() }).await;
    assert!(server.coordinator.lobby(&code).await.is_some());

    server.apply(Message::CancelLobby { session_id: alice.id().clone(), code: code.clone() }).await;
    assert!(server.coordinator.lobby(&code).await.is_none());
    assert_eq!(server.coordinator.lobby_of(alice.id()).await, None);
    assert_eq!(bob.try_recv(), None);
}

#[tokio::test]
async fn host_can_create_again_after_leaving() {
    let server = server(0, &["ABC123", "DEF456"]);
    let alice = server.connect("alice");
    let code = create(&server, &alice).await;

    server.apply(Message::LeaveLobby { session_id: alice.id().clone(), code }).await;
    assert_eq!(server.coordinator.lobby_count().await, 0);

    assert_eq!(create(&server, &alice).await, JoinCode::new("DEF456"));
}

#[tokio::test]
async fn disconnect_of_a_lobby_host_removes_the_lobby() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    create(&server, &alice).await;

    server.hang_up(&alice);
    server.coordinator.barrier().await.unwrap();

    assert_eq!(server.coordinator.lobby_count().await, 0);
    assert_eq!(server.coordinator.lobby_of(alice.id()).await, None);
}

#[tokio::test]
async fn disconnect_of_an_idle_session_is_a_no_op() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let code = create(&server, &alice).await;

    server.apply(Message::SessionDisconnected { session_id: bob.id().clone() }).await;
    server.apply(Message::SessionDisconnected { session_id: bob.id().clone() }).await;

    assert!(server.coordinator.lobby(&code).await.is_some());
    assert_eq!(alice.try_recv(), None);
}

#[tokio::test(start_paused = true)]
async fn leaving_a_match_awards_the_opponent_and_persists() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let match_id = pair(&server, &alice, &bob).await;

    server
        .apply(Message::LeaveMatch { session_id: alice.id().clone(), match_id: match_id.clone() })
        .await;

    let expected = Event::MatchEnded {
        match_id: Some(match_id.clone()),
        reason: EndReason::Disconnect,
        winner: Some(PlayerSlot::Two),
        score1: 0,
        score2: 0,
    };
    assert_eq!(next_lifecycle_event(&alice).await, expected);
    assert_eq!(next_lifecycle_event(&bob).await, expected);

    assert_eq!(server.coordinator.match_count().await, 0);
    assert_eq!(server.coordinator.match_of(alice.id()).await, None);
    assert_eq!(server.coordinator.match_of(bob.id()).await, None);

    let sink = server.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.len() == 1 }
    })
    .await;
    let record = server.sink.find(match_id.as_str()).unwrap();
    assert_eq!(record.reason, "disconnect");
    assert_eq!(record.winner, 2);
    assert_eq!((record.player1.as_str(), record.player2.as_str()), ("alice", "bob"));
    assert_eq!(record.code, "ABC123");
}

#[tokio::test(start_paused = true)]
async fn leaves_from_strangers_do_not_swallow_a_real_leave() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let match_id = pair(&server, &alice, &bob).await;

    for session_id in ["mallory", "trudy", "alice"] {
        server
            .apply(Message::LeaveMatch {
                session_id: SessionId::from(session_id),
                match_id: match_id.clone(),
            })
            .await;
    }

    assert_eq!(
        next_lifecycle_event(&bob).await,
        Event::MatchEnded {
            match_id: Some(match_id),
            reason: EndReason::Disconnect,
            winner: Some(PlayerSlot::Two),
            score1: 0,
            score2: 0,
        }
    );
    wait_for_counts(&server.coordinator, 0, 0).await;
    assert_eq!(server.coordinator.match_of(alice.id()).await, None);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_completions_each_end_once() {
    const MATCHES: usize = 4;
    let server = server(1, &["AAAAA2", "BBBBB3", "CCCCC4", "DDDDD5"]);

    let mut players = Vec::new();
    let mut match_ids = Vec::new();
    for i in 0..MATCHES {
        let host = server.connect(&format!("host-{i}"));
        let guest = server.connect(&format!("guest-{i}"));
        match_ids.push(pair(&server, &host, &guest).await);
        players.push((host, guest));
    }
    assert_eq!(server.coordinator.match_count().await, MATCHES);

    for match_id in &match_ids {
        server
            .coordinator
            .submit(Message::PlayerInput {
                match_id: match_id.clone(),
                player: PlayerSlot::One,
                input: InputFlags::PRIMARY,
            })
            .unwrap();
    }
    server.coordinator.barrier().await.unwrap();

    for ((host, guest), match_id) in players.iter().zip(&match_ids) {
        for session in [host, guest] {
            match next_lifecycle_event(session).await {
                Event::MatchEnded { match_id: ended, reason, winner, .. } => {
                    assert_eq!(ended.as_ref(), Some(match_id));
                    assert_eq!(reason, EndReason::Completed);
                    assert_eq!(winner, Some(PlayerSlot::One));
                },
                other => panic!("expected MatchEnded, got {other:?}"),
            }
        }
    }

    wait_for_counts(&server.coordinator, 0, 0).await;
    let sink = server.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.len() == MATCHES }
    })
    .await;

    for (host, guest) in &players {
        for session in [host, guest] {
            assert_eq!(server.coordinator.match_of(session.id()).await, None);
            while let Some(event) = session.try_recv() {
                assert!(
                    !matches!(event, Event::MatchEnded { .. }),
                    "second MatchEnded for {}",
                    session.id()
                );
            }
        }
    }
    for match_id in &match_ids {
        assert!(server.sink.find(match_id.as_str()).is_some());
    }
}

#[tokio::test(start_paused = true)]
async fn hangup_during_a_match_ends_it_for_the_survivor() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let match_id = pair(&server, &alice, &bob).await;

    server.hang_up(&bob);

    assert_eq!(
        next_lifecycle_event(&alice).await,
        Event::MatchEnded {
            match_id: Some(match_id),
            reason: EndReason::Disconnect,
            winner: Some(PlayerSlot::One),
            score1: 0,
            score2: 0,
        }
    );
    wait_for_counts(&server.coordinator, 0, 0).await;
}

#[tokio::test(start_paused = true)]
async fn completed_match_frees_both_players() {
    let server = server(1, &["ABC123", "DEF456"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let match_id = pair(&server, &alice, &bob).await;

    server
        .apply(Message::PlayerInput {
            match_id: match_id.clone(),
            player: PlayerSlot::One,
            input: InputFlags::PRIMARY,
        })
        .await;

    let expected = Event::MatchEnded {
        match_id: Some(match_id.clone()),
        reason: EndReason::Completed,
        winner: Some(PlayerSlot::One),
        score1: 1,
        score2: 0,
    };
    assert_eq!(next_lifecycle_event(&alice).await, expected);
    assert_eq!(next_lifecycle_event(&bob).await, expected);

    let sink = server.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.len() == 1 }
    })
    .await;
    let record = server.sink.find(match_id.as_str()).unwrap();
    assert_eq!((record.reason.as_str(), record.winner, record.score1), ("completed", 1, 1));
    assert_eq!(record.duration_ms, record.ticks * 1000 / 60);

    assert_eq!(create(&server, &alice).await, JoinCode::new("DEF456"));
}

#[tokio::test(start_paused = true)]
async fn factory_failure_notifies_both_and_discards_lobby() {
    let server = SimServer::start(
        CoordinatorConfig::default(),
        SimEnv::new(),
        failing_factory(),
        FixedCodes::new(["ABC123"]),
    );
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let code = create(&server, &alice).await;

    join(&server, &bob, code.as_str()).await;

    let expected =
        lobby_error("Failed to start match: failed to construct game pong: assets missing");
    for session in [&alice, &bob] {
        assert!(matches!(next_event(session).await, Event::LobbyJoined { .. }));
        assert_eq!(next_event(session).await, expected);
        assert_eq!(server.coordinator.lobby_of(session.id()).await, None);
        assert_eq!(server.coordinator.match_of(session.id()).await, None);
    }
    assert!(server.coordinator.lobby(&code).await.is_none());
    assert_eq!(server.coordinator.match_count().await, 0);
}

#[tokio::test]
async fn lobby_expires_only_after_timeout_is_exceeded() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    let code = create(&server, &alice).await;
    let timeout = CoordinatorConfig::default().lobby_timeout;

    server.env.advance(timeout);
    server.coordinator.sweep_expired().unwrap();
    server.coordinator.barrier().await.unwrap();
    assert!(server.coordinator.lobby(&code).await.is_some());

    server.env.advance(Duration::from_millis(1));
    server.coordinator.sweep_expired().unwrap();
    server.coordinator.barrier().await.unwrap();

    assert!(server.coordinator.lobby(&code).await.is_none());
    assert_eq!(server.coordinator.lobby_of(alice.id()).await, None);
    assert_eq!(next_event(&alice).await, lobby_error("Lobby expired"));
}

#[tokio::test(start_paused = true)]
async fn periodic_sweep_removes_stale_lobbies() {
    let server = server(0, &["ABC123"]);
    let alice = server.connect("alice");
    create(&server, &alice).await;

    server.env.advance(Duration::from_secs(121));
    tokio::time::sleep(Duration::from_secs(31)).await;

    wait_for_counts(&server.coordinator, 0, 0).await;
    assert_eq!(next_event(&alice).await, lobby_error("Lobby expired"));
}

#[tokio::test]
async fn input_for_unknown_match_is_dropped() {
    let server = server(0, &["ABC123"]);

    server
        .apply(Message::PlayerInput {
            match_id: MatchId::new("match-NOPE00-1"),
            player: PlayerSlot::One,
            input: InputFlags::UP,
        })
        .await;
    server
        .apply(Message::LeaveMatch {
            session_id: SessionId::from("alice"),
            match_id: MatchId::new("match-NOPE00-1"),
        })
        .await;
    server
        .apply(Message::ReadyForRematch {
            session_id: SessionId::from("alice"),
            match_id: MatchId::new("match-NOPE00-1"),
        })
        .await;

    assert!(server.coordinator.is_running());
}

#[tokio::test(start_paused = true)]
async fn shutdown_ends_matches_and_lobbies() {
    let server = server(0, &["ABC123", "DEF456"]);
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let carol = server.connect("carol");
    let match_id = pair(&server, &alice, &bob).await;
    create(&server, &carol).await;

    server.coordinator.shutdown().await;

    let ended = Event::MatchEnded {
        match_id: Some(match_id),
        reason: EndReason::Shutdown,
        winner: None,
        score1: 0,
        score2: 0,
    };
    assert_eq!(next_lifecycle_event(&alice).await, ended);
    assert_eq!(next_lifecycle_event(&bob).await, ended);
    assert_eq!(
        next_event(&carol).await,
        Event::MatchEnded {
            match_id: None,
            reason: EndReason::Shutdown,
            winner: None,
            score1: 0,
            score2: 0,
        }
    );

    assert_eq!(server.coordinator.match_count().await, 0);
    assert_eq!(server.coordinator.lobby_count().await, 0);
    assert_eq!(
        server.coordinator.submit(Message::SessionDisconnected { session_id: "alice".into() }),
        Err(CoordinatorError::Stopped)
    );
}

#[tokio::test]
async fn full_inbound_queue_rejects_without_blocking() {
    let config = CoordinatorConfig { inbound_queue_depth: 2, ..Default::default() };
    let server =
        SimServer::start(config, SimEnv::new(), duel_registry(0), FixedCodes::new(["ABC123"]));

    let message = || Message::SessionDisconnected { session_id: SessionId::from("alice") };

    // The actor cannot run until this test yields.
    assert_eq!(server.coordinator.submit(message()), Ok(()));
    assert_eq!(server.coordinator.submit(message()), Ok(()));
    assert_eq!(server.coordinator.submit(message()), Err(CoordinatorError::QueueFull));

    server.coordinator.barrier().await.unwrap();
    assert_eq!(server.coordinator.submit(message()), Ok(()));
}

#[tokio::test(start_paused = true)]
async fn failing_sink_never_delays_match_ended() {
    let sink = ChaoticResultSink::new(MemoryResultSink::new(), 1.0);
    let server = SimServer::with_sink(
        CoordinatorConfig::default(),
        SimEnv::new(),
        duel_registry(0),
        FixedCodes::new(["ABC123"]),
        sink,
    );
    let alice = server.connect("alice");
    let bob = server.connect("bob");
    let match_id = pair(&server, &alice, &bob).await;

    server.apply(Message::LeaveMatch { session_id: bob.id().clone(), match_id }).await;

    assert!(matches!(
        next_lifecycle_event(&alice).await,
        Event::MatchEnded { reason: EndReason::Disconnect, winner: Some(PlayerSlot::One), .. }
    ));

    let sink = server.sink.clone();
    wait_until(|| {
        let sink = sink.clone();
        async move { sink.attempts() == 1 }
    })
    .await;
    assert_eq!(server.sink.injected_failures(), 1);
    assert!(server.sink.inner().is_empty());
}
