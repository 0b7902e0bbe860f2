//! Scripted players.
//!
//! A bot owns one session. The host bot creates a lobby and hands the code
//! to the guest bot over a oneshot, the way a human would read it out loud.
//! Once the match runs, each bot presses PRIMARY on a random fraction of
//! snapshots.

use rand::{Rng, SeedableRng, rngs::StdRng};
use termplay_core::{Environment, GameId, InputFlags, JoinCode, MatchId, PlayerSlot};
use termplay_games::decode_snapshot;
use termplay_proto::{Event, Message};
use termplay_server::{CoordinatorError, CoordinatorHandle, SessionHandle};
use tokio::sync::oneshot;

/// Why a bot stopped before its match ended.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The coordinator refused a message.
    #[error("coordinator rejected message: {0}")]
    Coordinator(#[from] CoordinatorError),

    /// A lobby request failed.
    #[error("lobby error: {0}")]
    Rejected(String),

    /// The host bot never produced a code.
    #[error("no join code received")]
    NoCode,

    /// The session closed before the match ended.
    #[error("session closed")]
    Disconnected,
}

/// How a bot enters a match.
pub enum Role {
    /// Create a lobby and publish its code.
    Host {
        /// Game to host
        game_id: GameId,
        /// Where the code goes
        code_tx: oneshot::Sender<JoinCode>,
    },
    /// Join whatever code arrives.
    Guest {
        /// Where the code comes from
        code_rx: oneshot::Receiver<JoinCode>,
    },
}

/// One scripted player.
pub struct Bot<E: Environment> {
    coordinator: CoordinatorHandle<E>,
    session: SessionHandle,
    rng: StdRng,
    press_chance: f64,
}

impl<E: Environment> Bot<E> {
    /// Bot playing through `session`, pressing on `press_chance` of ticks.
    pub fn new(
        coordinator: CoordinatorHandle<E>,
        session: SessionHandle,
        seed: u64,
        press_chance: f64,
    ) -> Self {
        Self {
            coordinator,
            session,
            rng: StdRng::seed_from_u64(seed),
            press_chance: press_chance.clamp(0.0, 1.0),
        }
    }

    /// Play until the match ends. Returns the `MatchEnded` event.
    pub async fn play(mut self, role: Role) -> Result<Event, BotError> {
        let session_id = self.session.id().clone();

        let mut code_tx = match role {
            Role::Host { game_id, code_tx } => {
                self.coordinator.submit(Message::CreateLobby { session_id, game_id })?;
                Some(code_tx)
            },
            Role::Guest { code_rx } => {
                let code = code_rx.await.map_err(|_| BotError::NoCode)?;
                self.coordinator.submit(Message::JoinLobby { session_id, code })?;
                None
            },
        };

        let mut seat: Option<(MatchId, PlayerSlot)> = None;

        while let Some(event) = self.session.recv().await {
            match event {
                Event::LobbyCreated { code, .. } => {
                    tracing::info!(bot = %self.session.id(), %code, "lobby created");
                    if let Some(tx) = code_tx.take() {
                        let _ = tx.send(code);
                    }
                },
                Event::LobbyJoined { opponent_id, side, .. } => {
                    tracing::info!(
                        bot = %self.session.id(),
                        %side,
                        opponent = %opponent_id,
                        "paired"
                    );
                },
                Event::MatchStarted { match_id, side, .. } => {
                    tracing::info!(bot = %self.session.id(), %match_id, "match started");
                    seat = Some((match_id, side));
                },
                Event::Snapshot { tick, payload, .. } => {
                    if tick % 60 == 0 {
                        if let Some(state) = decode_snapshot(&payload) {
                            tracing::debug!(
                                bot = %self.session.id(),
                                tick,
                                score1 = state.score1,
                                score2 = state.score2,
                                "score"
                            );
                        }
                    }
                    if let Some((match_id, side)) = &seat {
                        self.maybe_press(match_id, *side);
                    }
                },
                ended @ Event::MatchEnded { .. } => return Ok(ended),
                Event::LobbyError { message } => return Err(BotError::Rejected(message)),
                Event::LobbyPlayerLeft { code } => {
                    tracing::info!(bot = %self.session.id(), %code, "opponent left lobby");
                },
            }
        }

        Err(BotError::Disconnected)
    }

    fn maybe_press(&mut self, match_id: &MatchId, side: PlayerSlot) {
        if !self.rng.gen_bool(self.press_chance) {
            return;
        }

        let input = Message::PlayerInput {
            match_id: match_id.clone(),
            player: side,
            input: InputFlags::PRIMARY,
        };
        if let Err(e) = self.coordinator.submit(input) {
            tracing::debug!(bot = %self.session.id(), error = %e, "input dropped");
        }
    }
}
