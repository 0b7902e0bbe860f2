//! Lobby and match coordinator.
//!
//! The coordinator is a single actor: one task reads [`Command`]s from a
//! bounded queue and applies every lobby and match transition in order. The
//! maps it owns sit behind a [`tokio::sync::RwLock`] so that diagnostics can
//! read them and so that match completion, which fires from each match's own
//! task, can take them without going through the queue.
//!
//! # Tasks
//!
//! - The actor loop (this module)
//! - One [`OnlineMatch`] loop per running match, plus its liveness watcher
//! - A sweeper that enqueues an expiry pass every `cleanup_interval`
//!
//! # Invariants
//!
//! - A session is in at most one lobby or match at a time
//! - Active join codes are pairwise distinct
//! - `session_lobby` and `session_match` only point at entries that exist
//! - `MatchEnded` is sent at most once per match

use std::{collections::HashMap, fmt, ops::Sub, sync::Arc, time::Duration};

use termplay_core::{
    Environment, GameFactory, GameId, InputFlags, JoinCode, MatchId, PlayerSlot, RuntimeConfig,
    SessionId,
};
use termplay_proto::{EndReason, Event, Message};
use tokio::{
    sync::{RwLock, mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    config::CoordinatorConfig,
    error::{ConfigError, CoordinatorError, LobbyError},
    lobby::{CodeSource, EntropyCodes, Lobby, generate_unique_code},
    online_match::{MatchHandle, MatchResult, MatchSetup, OnlineMatch},
    registry::SessionRegistry,
    session::SessionHandle,
    storage::{MatchRecord, ResultSink},
};

/// Message shown to a host whose lobby timed out.
pub const LOBBY_EXPIRED: &str = "Lobby expired";

/// Work item for the actor loop.
enum Command {
    Client(Message),
    Sweep,
    Barrier(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

/// A running match as the coordinator tracks it.
struct ActiveMatch {
    handle: MatchHandle,
    code: JoinCode,
    game_id: GameId,
    player1: SessionHandle,
    player2: SessionHandle,
}

struct State<I> {
    lobbies: HashMap<JoinCode, Lobby<I>>,
    matches: HashMap<MatchId, ActiveMatch>,
    /// Session → lobby it hosts or joined
    session_lobby: HashMap<SessionId, JoinCode>,
    /// Session → match it plays in
    session_match: HashMap<SessionId, MatchId>,
}

impl<I> Default for State<I> {
    fn default() -> Self {
        Self {
            lobbies: HashMap::new(),
            matches: HashMap::new(),
            session_lobby: HashMap::new(),
            session_match: HashMap::new(),
        }
    }
}

impl<I> State<I> {
    fn is_busy(&self, session_id: &SessionId) -> bool {
        self.session_lobby.contains_key(session_id) || self.session_match.contains_key(session_id)
    }
}

/// State reachable from the actor, the match tasks and every handle.
struct Shared<E: Environment> {
    state: RwLock<State<E::Instant>>,
    registry: Arc<SessionRegistry>,
}

/// Read-only view of one lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LobbyInfo {
    /// Join code
    pub code: JoinCode,
    /// Game the match will run
    pub game_id: GameId,
    /// Hosting session
    pub host: SessionId,
    /// Joined session, if any
    pub joiner: Option<SessionId>,
}

/// Builder for the coordinator actor.
pub struct Coordinator<E: Environment, S: ResultSink> {
    config: CoordinatorConfig,
    env: E,
    registry: Arc<SessionRegistry>,
    factory: Arc<dyn GameFactory>,
    codes: Box<dyn CodeSource>,
    sink: S,
}

impl<E: Environment, S: ResultSink> Coordinator<E, S> {
    /// Create a coordinator drawing join codes from `env`'s entropy.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] if `config` fails validation.
    pub fn new(
        config: CoordinatorConfig,
        env: E,
        registry: Arc<SessionRegistry>,
        factory: impl GameFactory,
        sink: S,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            codes: Box::new(EntropyCodes::new(env.clone())),
            env,
            registry,
            factory: Arc::new(factory),
            sink,
        })
    }

    /// Replace the join-code source.
    #[must_use]
    pub fn with_code_source(mut self, codes: impl CodeSource) -> Self {
        self.codes = Box::new(codes);
        self
    }

    /// Start the actor loop and the expiry sweeper.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(self) -> CoordinatorHandle<E> {
        let (tx, rx) = mpsc::channel(self.config.inbound_queue_depth);
        let shared = Arc::new(Shared {
            state: RwLock::new(State::default()),
            registry: Arc::clone(&self.registry),
        });

        let sweeper = tokio::spawn(sweep_periodically(
            tx.downgrade(),
            self.env.clone(),
            self.config.cleanup_interval,
        ));

        let actor = Actor {
            shared: Arc::clone(&shared),
            config: self.config,
            env: self.env,
            factory: self.factory,
            codes: self.codes,
            sink: self.sink,
        };

        tracing::info!(
            tick_rate_hz = actor.config.tick_rate_hz,
            lobby_timeout_secs = actor.config.lobby_timeout.as_secs(),
            "coordinator started"
        );
        tokio::spawn(actor.run(rx, sweeper));

        CoordinatorHandle { tx, shared }
    }
}

impl<E: Environment, S: ResultSink> fmt::Debug for Coordinator<E, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Coordinator").field("config", &self.config).finish_non_exhaustive()
    }
}

/// Cheaply clonable entry point to a running coordinator.
pub struct CoordinatorHandle<E: Environment> {
    tx: mpsc::Sender<Command>,
    shared: Arc<Shared<E>>,
}

impl<E: Environment> Clone for CoordinatorHandle<E> {
    fn clone(&self) -> Self {
        Self { tx: self.tx.clone(), shared: Arc::clone(&self.shared) }
    }
}

impl<E: Environment> CoordinatorHandle<E> {
    /// Enqueue a client message without blocking.
    ///
    /// # Errors
    ///
    /// - [`CoordinatorError::QueueFull`] if the inbound queue is full
    /// - [`CoordinatorError::Stopped`] if the coordinator has shut down
    pub fn submit(&self, message: Message) -> Result<(), CoordinatorError> {
        self.tx.try_send(Command::Client(message)).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CoordinatorError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => CoordinatorError::Stopped,
        })
    }

    /// Wait until every command enqueued before this call has been applied.
    ///
    /// # Errors
    ///
    /// [`CoordinatorError::Stopped`] if the coordinator has shut down.
    pub async fn barrier(&self) -> Result<(), CoordinatorError> {
        let (ack, done) = oneshot::channel();
        self.tx.send(Command::Barrier(ack)).await.map_err(|_| CoordinatorError::Stopped)?;
        done.await.map_err(|_| CoordinatorError::Stopped)
    }

    /// Enqueue an expiry pass now instead of waiting for the sweeper.
    ///
    /// # Errors
    ///
    /// Same as [`Self::submit`].
    pub fn sweep_expired(&self) -> Result<(), CoordinatorError> {
        self.tx.try_send(Command::Sweep).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => CoordinatorError::QueueFull,
            mpsc::error::TrySendError::Closed(_) => CoordinatorError::Stopped,
        })
    }

    /// Stop every match, end every lobby, and stop the actor loop.
    ///
    /// Waits for the actor to finish. No-op if it already has.
    pub async fn shutdown(&self) {
        let (ack, done) = oneshot::channel();
        if self.tx.send(Command::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
    }

    /// Whether the actor loop is still accepting commands.
    pub fn is_running(&self) -> bool {
        !self.tx.is_closed()
    }

    /// Session registry the coordinator resolves ids against.
    pub fn registry(&self) -> &Arc<SessionRegistry> {
        &self.shared.registry
    }

    /// Snapshot of the lobby with `code`.
    pub async fn lobby(&self, code: &JoinCode) -> Option<LobbyInfo> {
        self.shared.state.read().await.lobbies.get(code).map(|lobby| LobbyInfo {
            code: lobby.code.clone(),
            game_id: lobby.game_id.clone(),
            host: lobby.host.id().clone(),
            joiner: lobby.joiner.as_ref().map(|j| j.id().clone()),
        })
    }

    /// Codes of every active lobby, sorted.
    pub async fn lobby_codes(&self) -> Vec<JoinCode> {
        let mut codes: Vec<JoinCode> =
            self.shared.state.read().await.lobbies.keys().cloned().collect();
        codes.sort();
        codes
    }

    /// Number of active lobbies.
    pub async fn lobby_count(&self) -> usize {
        self.shared.state.read().await.lobbies.len()
    }

    /// Number of running matches.
    pub async fn match_count(&self) -> usize {
        self.shared.state.read().await.matches.len()
    }

    /// Match `session_id` plays in.
    pub async fn match_of(&self, session_id: &SessionId) -> Option<MatchId> {
        self.shared.state.read().await.session_match.get(session_id).cloned()
    }

    /// Lobby `session_id` hosts or joined.
    pub async fn lobby_of(&self, session_id: &SessionId) -> Option<JoinCode> {
        self.shared.state.read().await.session_lobby.get(session_id).cloned()
    }

    /// Ticks simulated so far by `match_id`.
    pub async fn match_tick(&self, match_id: &MatchId) -> Option<u64> {
        self.shared.state.read().await.matches.get(match_id).map(|m| m.handle.tick())
    }
}

impl<E: Environment> fmt::Debug for CoordinatorHandle<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CoordinatorHandle").field("running", &self.is_running()).finish()
    }
}

struct Actor<E: Environment, S: ResultSink> {
    shared: Arc<Shared<E>>,
    config: CoordinatorConfig,
    env: E,
    factory: Arc<dyn GameFactory>,
    codes: Box<dyn CodeSource>,
    sink: S,
}

impl<E: Environment, S: ResultSink> Actor<E, S> {
    async fn run(self, mut rx: mpsc::Receiver<Command>, sweeper: JoinHandle<()>) {
        let ack = loop {
            let Some(command) = rx.recv().await else {
                tracing::info!("all coordinator handles dropped");
                break None;
            };

            match command {
                Command::Client(message) => self.handle_message(message).await,
                Command::Sweep => self.sweep().await,
                Command::Barrier(ack) => {
                    let _ = ack.send(());
                },
                Command::Shutdown(ack) => break Some(ack),
            }
        };

        sweeper.abort();
        rx.close();
        self.shutdown().await;

        if let Some(ack) = ack {
            let _ = ack.send(());
        }
        tracing::info!("coordinator stopped");
    }

    async fn handle_message(&self, message: Message) {
        tracing::debug!(kind = message.kind(), session_id = ?message.session_id(), "message");

        match message {
            Message::CreateLobby { session_id, game_id } => {
                self.create_lobby(session_id, game_id).await;
            },
            Message::JoinLobby { session_id, code } => self.join_lobby(session_id, code).await,
            Message::CancelLobby { session_id, code } => {
                self.cancel_lobby(&session_id, &code).await;
            },
            Message::LeaveLobby { session_id, code } => {
                let mut guard = self.shared.state.write().await;
                leave_lobby(&mut *guard, &session_id, &code);
            },
            Message::LeaveMatch { session_id, match_id } => {
                self.leave_match(&session_id, &match_id).await;
            },
            Message::PlayerInput { match_id, player, input } => {
                self.player_input(&match_id, player, input).await;
            },
            Message::ReadyForRematch { session_id, match_id } => {
                tracing::debug!(%session_id, %match_id, "rematch requested, not supported");
            },
            Message::SessionDisconnected { session_id } => {
                self.session_disconnected(&session_id).await;
            },
        }
    }

    /// Resolve a session id to its handle. Messages from unregistered
    /// sessions cannot be answered and are dropped.
    fn session(&self, session_id: &SessionId) -> Option<SessionHandle> {
        let handle = self.shared.registry.get(session_id);
        if handle.is_none() {
            tracing::warn!(%session_id, "message from unregistered session, dropping");
        }
        handle
    }

    async fn create_lobby(&self, session_id: SessionId, game_id: GameId) {
        let Some(host) = self.session(&session_id) else {
            return;
        };

        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        if state.is_busy(&session_id) {
            host.send(Event::lobby_error(LobbyError::AlreadyInLobby.to_string()));
            return;
        }

        let candidate =
            generate_unique_code(self.codes.as_ref(), |c| state.lobbies.contains_key(c));
        let code = match candidate {
            Ok(code) => code,
            Err(e) => {
                tracing::warn!(%session_id, "no free join code");
                host.send(Event::lobby_error(e.to_string()));
                return;
            },
        };

        tracing::info!(%code, %game_id, host = %session_id, "lobby created");

        let lobby = Lobby::new(code.clone(), game_id.clone(), host.clone(), self.env.now());
        state.lobbies.insert(code.clone(), lobby);
        state.session_lobby.insert(session_id, code.clone());

        host.send(Event::LobbyCreated { code, game_id });
    }

    async fn join_lobby(&self, session_id: SessionId, code: JoinCode) {
        let Some(joiner) = self.session(&session_id) else {
            return;
        };

        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        if state.session_lobby.get(&session_id) == Some(&code) {
            joiner.send(Event::lobby_error(LobbyError::OwnLobby.to_string()));
            return;
        }
        if state.is_busy(&session_id) {
            joiner.send(Event::lobby_error(LobbyError::AlreadyInLobby.to_string()));
            return;
        }

        let Some(lobby) = state.lobbies.get_mut(&code) else {
            joiner.send(Event::lobby_error(LobbyError::NotFound.to_string()));
            return;
        };

        if let Err(e) = lobby.admit(joiner.clone()) {
            joiner.send(Event::lobby_error(e.to_string()));
            return;
        }

        tracing::info!(%code, host = %lobby.host.id(), joiner = %session_id, "lobby joined");

        lobby.host.send(Event::LobbyJoined {
            code: code.clone(),
            side: PlayerSlot::One,
            opponent_id: session_id.clone(),
        });
        joiner.send(Event::LobbyJoined {
            code: code.clone(),
            side: PlayerSlot::Two,
            opponent_id: lobby.host.id().clone(),
        });

        self.start_match(state, &code);
    }

    /// Turn a full lobby into a running match. The lobby is consumed even if
    /// the game cannot be built.
    fn start_match(&self, state: &mut State<E::Instant>, code: &JoinCode) {
        let Some(lobby) = state.lobbies.remove(code) else {
            return;
        };
        state.session_lobby.remove(lobby.host.id());
        let host = lobby.host;
        let Some(joiner) = lobby.joiner else {
            tracing::warn!(%code, "start requested for lobby without joiner");
            return;
        };
        state.session_lobby.remove(joiner.id());

        let mut game = match self.factory.create(&lobby.game_id) {
            Ok(game) => game,
            Err(e) => {
                tracing::warn!(%code, game_id = %lobby.game_id, error = %e, "match start failed");
                let message = format!("Failed to start match: {e}");
                host.send(Event::lobby_error(message.clone()));
                joiner.send(Event::lobby_error(message));
                return;
            },
        };

        let nanos = self.env.wall_clock_nanos();
        game.reset(&RuntimeConfig {
            width: self.config.screen_width,
            height: self.config.screen_height,
            tick_rate_hz: self.config.tick_rate_hz,
            seed: nanos as u64,
        });

        let match_id = MatchId::new(format!("match-{code}-{nanos}"));
        let (online, handle) = OnlineMatch::new(
            MatchSetup {
                id: match_id.clone(),
                code: code.clone(),
                game_id: lobby.game_id.clone(),
                player1: host.clone(),
                player2: joiner.clone(),
                tick_interval: self.config.tick_interval(),
                input_queue_depth: self.config.input_queue_depth,
                max_ticks: self.config.max_match_ticks,
            },
            game,
        );

        state.session_match.insert(host.id().clone(), match_id.clone());
        state.session_match.insert(joiner.id().clone(), match_id.clone());
        state.matches.insert(
            match_id.clone(),
            ActiveMatch {
                handle,
                code: code.clone(),
                game_id: lobby.game_id,
                player1: host.clone(),
                player2: joiner.clone(),
            },
        );

        tracing::info!(%match_id, player1 = %host.id(), player2 = %joiner.id(), "match started");

        host.send(Event::MatchStarted {
            match_id: match_id.clone(),
            side: PlayerSlot::One,
            code: code.clone(),
        });
        joiner.send(Event::MatchStarted {
            match_id,
            side: PlayerSlot::Two,
            code: code.clone(),
        });

        let shared = Arc::clone(&self.shared);
        let sink = self.sink.clone();
        let tick_rate_hz = self.config.tick_rate_hz;
        tokio::spawn(async move {
            if let Some(result) = online.run().await {
                complete_match(&shared, &sink, tick_rate_hz, result).await;
            }
        });
    }

    async fn cancel_lobby(&self, session_id: &SessionId, code: &JoinCode) {
        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        match state.lobbies.get(code) {
            Some(lobby) if lobby.host.id() == session_id => {
                remove_lobby(state, code, EndReason::HostLeft);
                tracing::info!(%code, host = %session_id, "lobby cancelled");
            },
            Some(_) => tracing::debug!(%code, %session_id, "cancel from non-host ignored"),
            None => tracing::debug!(%code, %session_id, "cancel for unknown lobby ignored"),
        }
    }

    async fn leave_match(&self, session_id: &SessionId, match_id: &MatchId) {
        let state = self.shared.state.read().await;
        match state.matches.get(match_id) {
            Some(active) if active.handle.seat_of(session_id).is_some() => {
                tracing::info!(%match_id, %session_id, "player left match");
                active.handle.player_disconnected(session_id);
            },
            Some(_) => {
                tracing::debug!(%match_id, %session_id, "leave from non-participant ignored");
            },
            None => tracing::debug!(%match_id, %session_id, "leave for unknown match ignored"),
        }
    }

    async fn player_input(&self, match_id: &MatchId, player: PlayerSlot, input: InputFlags) {
        let state = self.shared.state.read().await;
        if let Some(active) = state.matches.get(match_id) {
            active.handle.send_input(player, input);
        }
    }

    async fn session_disconnected(&self, session_id: &SessionId) {
        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        let mut tracked = false;

        if let Some(active) =
            state.session_match.get(session_id).and_then(|id| state.matches.get(id))
        {
            tracked = true;
            active.handle.player_disconnected(session_id);
        }

        if let Some(code) = state.session_lobby.get(session_id).cloned() {
            tracked = true;
            leave_lobby(state, session_id, &code);
        }

        if tracked {
            tracing::info!(%session_id, "session disconnected");
        } else {
            tracing::debug!(%session_id, "disconnect for idle session");
        }
    }

    async fn sweep(&self) {
        let now = self.env.now();
        let timeout = self.config.lobby_timeout;

        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        let expired: Vec<JoinCode> = state
            .lobbies
            .values()
            .filter(|lobby| lobby.is_expired(now, timeout))
            .map(|lobby| lobby.code.clone())
            .collect();

        for code in expired {
            if let Some(lobby) = state.lobbies.remove(&code) {
                state.session_lobby.remove(lobby.host.id());
                tracing::info!(%code, host = %lobby.host.id(), "lobby expired");
                lobby.host.send(Event::lobby_error(LOBBY_EXPIRED));
            }
        }
    }

    async fn shutdown(&self) {
        let mut guard = self.shared.state.write().await;
        let state = &mut *guard;

        let matches = state.matches.len();
        let lobbies = state.lobbies.len();

        for (match_id, active) in state.matches.drain() {
            active.handle.stop();
            let event = Event::MatchEnded {
                match_id: Some(match_id),
                reason: EndReason::Shutdown,
                winner: None,
                score1: 0,
                score2: 0,
            };
            active.player1.send(event.clone());
            active.player2.send(event);
        }

        let codes: Vec<JoinCode> = state.lobbies.keys().cloned().collect();
        for code in codes {
            if let Some(lobby) = state.lobbies.remove(&code) {
                lobby.host.send(lobby_ended(EndReason::Shutdown));
                if let Some(joiner) = lobby.joiner {
                    joiner.send(lobby_ended(EndReason::Shutdown));
                }
            }
        }

        state.session_lobby.clear();
        state.session_match.clear();

        tracing::info!(matches, lobbies, "coordinator state cleared");
    }
}

/// `MatchEnded` for a lobby that never became a match.
fn lobby_ended(reason: EndReason) -> Event {
    Event::MatchEnded { match_id: None, reason, winner: None, score1: 0, score2: 0 }
}

/// Remove a lobby and notify its joiner (the host asked for this).
fn remove_lobby<I>(state: &mut State<I>, code: &JoinCode, reason: EndReason) {
    let Some(lobby) = state.lobbies.remove(code) else {
        return;
    };
    state.session_lobby.remove(lobby.host.id());
    if let Some(joiner) = lobby.joiner {
        state.session_lobby.remove(joiner.id());
        joiner.send(lobby_ended(reason));
    }
}

fn leave_lobby<I>(state: &mut State<I>, session_id: &SessionId, code: &JoinCode)
where
    I: Copy + Sub<Output = Duration>,
{
    let Some(lobby) = state.lobbies.get_mut(code) else {
        tracing::debug!(%code, %session_id, "leave for unknown lobby ignored");
        return;
    };

    match lobby.seat_of(session_id) {
        Some(PlayerSlot::One) => {
            tracing::info!(%code, host = %session_id, "host left lobby");
            remove_lobby(state, code, EndReason::HostLeft);
        },
        Some(PlayerSlot::Two) => {
            tracing::info!(%code, joiner = %session_id, "joiner left lobby");
            lobby.joiner = None;
            lobby.host.send(Event::LobbyPlayerLeft { code: code.clone() });
            state.session_lobby.remove(session_id);
        },
        None => tracing::debug!(%code, %session_id, "leave from non-member ignored"),
    }
}

/// Completion path for a match that ended on its own. Runs on the match's
/// task under the state lock.
async fn complete_match<E: Environment, S: ResultSink>(
    shared: &Shared<E>,
    sink: &S,
    tick_rate_hz: u32,
    result: MatchResult,
) {
    let mut guard = shared.state.write().await;
    let state = &mut *guard;

    let Some(active) = state.matches.remove(&result.match_id) else {
        tracing::debug!(match_id = %result.match_id, "match already removed");
        return;
    };

    for player in [&active.player1, &active.player2] {
        if state.session_match.get(player.id()) == Some(&result.match_id) {
            state.session_match.remove(player.id());
        }
    }

    tracing::info!(
        match_id = %result.match_id,
        reason = %result.reason,
        winner = ?result.winner,
        score1 = result.score1,
        score2 = result.score2,
        ticks = result.ticks,
        "match ended"
    );

    let record = MatchRecord::from_result(
        &result,
        &active.game_id,
        &active.code,
        active.player1.id(),
        active.player2.id(),
        tick_rate_hz,
    );
    let sink = sink.clone();
    tokio::task::spawn_blocking(move || {
        if let Err(e) = sink.save_match_result(&record) {
            tracing::warn!(
                match_id = %record.match_id,
                error = %e,
                "failed to persist match result"
            );
        }
    });

    let event = Event::MatchEnded {
        match_id: Some(result.match_id),
        reason: result.reason,
        winner: result.winner,
        score1: result.score1,
        score2: result.score2,
    };
    active.player1.send(event.clone());
    active.player2.send(event);
}

/// Enqueue a sweep every `period` until the coordinator goes away.
async fn sweep_periodically<E: Environment>(
    tx: mpsc::WeakSender<Command>,
    env: E,
    period: Duration,
) {
    loop {
        env.sleep(period).await;

        let Some(tx) = tx.upgrade() else {
            return;
        };
        match tx.try_send(Command::Sweep) {
            Ok(()) => {},
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!("coordinator busy, skipping expiry sweep");
            },
            Err(mpsc::error::TrySendError::Closed(_)) => return,
        }
    }
}
