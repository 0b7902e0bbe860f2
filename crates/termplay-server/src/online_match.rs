//! Authoritative tick loop for one paired match.
//!
//! [`OnlineMatch`] owns the game instance and is consumed by
//! [`OnlineMatch::run`], which drives it on a fixed-rate ticker until the
//! game ends, a participant disconnects, or [`MatchHandle::stop`] is called.
//! Everything else talks to the running match through a [`MatchHandle`],
//! whose entry points never block.
//!
//! # Per-tick algorithm
//!
//! 1. Drain queued inputs, OR-merging each into its player's pending set
//! 2. Step the game once with both pending sets, then clear them
//! 3. Bump the tick counter and push one snapshot event to both sessions
//! 4. End with [`EndReason::Completed`] if the game reports game-over
//!
//! # Invariants
//!
//! - Ticks are numbered from 1 and never skipped or reordered
//! - Both participants receive the identical snapshot event for every tick
//! - The loop terminates exactly once; `stop` after termination is a no-op

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use termplay_core::{
    Game, GameId, InputFlags, JoinCode, MatchId, MultiInput, PlayerSlot, SessionId, StepResult,
};
use termplay_proto::{EndReason, Event};
use tokio::{
    sync::{mpsc, watch},
    time::{Instant, MissedTickBehavior},
};

use crate::session::SessionHandle;

/// Terminal outcome of a match. Produced at most once per match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchResult {
    /// Match that ended
    pub match_id: MatchId,
    /// Why it ended
    pub reason: EndReason,
    /// Winning seat, `None` for no winner
    pub winner: Option<PlayerSlot>,
    /// Host's final score
    pub score1: i32,
    /// Joiner's final score
    pub score2: i32,
    /// Ticks simulated before termination
    pub ticks: u64,
}

/// Everything needed to construct a match except the game itself.
#[derive(Debug, Clone)]
pub struct MatchSetup {
    /// Match identity
    pub id: MatchId,
    /// Lobby code, for display
    pub code: JoinCode,
    /// Game kind being played
    pub game_id: GameId,
    /// Host session, seat one
    pub player1: SessionHandle,
    /// Joiner session, seat two
    pub player2: SessionHandle,
    /// Wall-clock period between ticks
    pub tick_interval: Duration,
    /// Inputs buffered between ticks before new ones are dropped
    pub input_queue_depth: usize,
    /// Force-end after this many ticks (`None` = never)
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Copy)]
struct QueuedInput {
    player: PlayerSlot,
    input: InputFlags,
}

/// Concurrency-safe entry points into a running match.
#[derive(Clone)]
pub struct MatchHandle {
    id: MatchId,
    player1: SessionId,
    player2: SessionId,
    input_tx: mpsc::Sender<QueuedInput>,
    disconnect_tx: mpsc::Sender<SessionId>,
    stop_tx: Arc<watch::Sender<bool>>,
    tick: Arc<AtomicU64>,
}

impl MatchHandle {
    /// Match identity.
    pub fn id(&self) -> &MatchId {
        &self.id
    }

    /// Seat of `session_id`, if it plays in this match.
    pub fn seat_of(&self, session_id: &SessionId) -> Option<PlayerSlot> {
        if &self.player1 == session_id {
            Some(PlayerSlot::One)
        } else if &self.player2 == session_id {
            Some(PlayerSlot::Two)
        } else {
            None
        }
    }

    /// Queue input for the next tick without blocking.
    ///
    /// Returns `false` if the input was dropped because the queue is full or
    /// the match has ended.
    pub fn send_input(&self, player: PlayerSlot, input: InputFlags) -> bool {
        match self.input_tx.try_send(QueuedInput { player, input }) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(_)) => {
                tracing::debug!(match_id = %self.id, %player, "input queue full, dropping input");
                false
            },
            Err(mpsc::error::TrySendError::Closed(_)) => false,
        }
    }

    /// Tell the match a participant is gone. Non-blocking.
    ///
    /// Returns `false` if `session_id` is not seated in this match, or if the
    /// notice could not be queued (match ended, or an earlier notice is
    /// already pending). Only participants reach the queue, so its two slots
    /// always have room for both seats.
    pub fn player_disconnected(&self, session_id: &SessionId) -> bool {
        if self.seat_of(session_id).is_none() {
            tracing::debug!(match_id = %self.id, %session_id, "disconnect from non-participant");
            return false;
        }
        self.disconnect_tx.try_send(session_id.clone()).is_ok()
    }

    /// Ask the loop to return without producing a result. Idempotent.
    ///
    /// Returns `true` only for the call that requested the stop.
    pub fn stop(&self) -> bool {
        self.stop_tx.send_if_modified(|stopped| {
            if *stopped {
                false
            } else {
                *stopped = true;
                true
            }
        })
    }

    /// Ticks simulated so far.
    pub fn tick(&self) -> u64 {
        self.tick.load(Ordering::Acquire)
    }
}

impl fmt::Debug for MatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MatchHandle")
            .field("id", &self.id)
            .field("player1", &self.player1)
            .field("player2", &self.player2)
            .field("tick", &self.tick())
            .finish_non_exhaustive()
    }
}

/// One authoritative simulation, consumed by [`OnlineMatch::run`].
pub struct OnlineMatch {
    state: MatchState,
    disconnect_rx: mpsc::Receiver<SessionId>,
    disconnect_tx: mpsc::Sender<SessionId>,
    stop_rx: watch::Receiver<bool>,
}

/// Mutable simulation state, borrowed by the tick step while the select loop
/// holds the control channels.
struct MatchState {
    id: MatchId,
    code: JoinCode,
    game: Box<dyn Game>,
    player1: SessionHandle,
    player2: SessionHandle,
    input_rx: mpsc::Receiver<QueuedInput>,
    pending: MultiInput,
    tick: u64,
    shared_tick: Arc<AtomicU64>,
    tick_interval: Duration,
    max_ticks: Option<u64>,
}

impl OnlineMatch {
    /// Build a match around an already reset game.
    pub fn new(setup: MatchSetup, game: Box<dyn Game>) -> (Self, MatchHandle) {
        let (input_tx, input_rx) = mpsc::channel(setup.input_queue_depth.max(1));
        // One notice per participant is all that can matter.
        let (disconnect_tx, disconnect_rx) = mpsc::channel(2);
        let (stop_tx, stop_rx) = watch::channel(false);
        let shared_tick = Arc::new(AtomicU64::new(0));

        let handle = MatchHandle {
            id: setup.id.clone(),
            player1: setup.player1.id().clone(),
            player2: setup.player2.id().clone(),
            input_tx,
            disconnect_tx: disconnect_tx.clone(),
            stop_tx: Arc::new(stop_tx),
            tick: Arc::clone(&shared_tick),
        };

        let state = MatchState {
            id: setup.id,
            code: setup.code,
            game,
            player1: setup.player1,
            player2: setup.player2,
            input_rx,
            pending: MultiInput::default(),
            tick: 0,
            shared_tick,
            tick_interval: setup.tick_interval,
            max_ticks: setup.max_ticks,
        };

        (Self { state, disconnect_rx, disconnect_tx, stop_rx }, handle)
    }

    /// Drive the match to termination.
    ///
    /// Returns `Some(result)` when the game completes or a participant
    /// disconnects, and `None` when stopped externally.
    pub async fn run(self) -> Option<MatchResult> {
        let Self { mut state, mut disconnect_rx, disconnect_tx, mut stop_rx } = self;

        tracing::info!(
            match_id = %state.id,
            code = %state.code,
            player1 = %state.player1.id(),
            player2 = %state.player2.id(),
            "match running"
        );

        let watcher = tokio::spawn(watch_liveness(
            state.player1.clone(),
            state.player2.clone(),
            disconnect_tx,
        ));

        let mut ticker =
            tokio::time::interval_at(Instant::now() + state.tick_interval, state.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let outcome = loop {
            tokio::select! {
                biased;

                () = stopped(&mut stop_rx) => {
                    tracing::info!(match_id = %state.id, tick = state.tick, "match stopped");
                    break None;
                }

                Some(session_id) = disconnect_rx.recv() => {
                    match state.seat_of(&session_id) {
                        Some(seat) => {
                            tracing::info!(
                                match_id = %state.id,
                                %session_id,
                                tick = state.tick,
                                "participant disconnected"
                            );
                            break Some(state.result(EndReason::Disconnect, Some(seat.other())));
                        },
                        None => {
                            tracing::debug!(
                                match_id = %state.id,
                                %session_id,
                                "ignoring disconnect for non-participant"
                            );
                        },
                    }
                }

                _ = ticker.tick() => {
                    if let Some(result) = state.step() {
                        break Some(result);
                    }
                }
            }
        };

        watcher.abort();
        outcome
    }
}

impl MatchState {
    fn seat_of(&self, session_id: &SessionId) -> Option<PlayerSlot> {
        if self.player1.id() == session_id {
            Some(PlayerSlot::One)
        } else if self.player2.id() == session_id {
            Some(PlayerSlot::Two)
        } else {
            None
        }
    }

    /// Advance one tick. Returns the result if this tick ended the match.
    fn step(&mut self) -> Option<MatchResult> {
        while let Ok(queued) = self.input_rx.try_recv() {
            self.pending.merge(queued.player, queued.input);
        }

        let input = std::mem::take(&mut self.pending);
        let finished = self.game.step_multi(input) == StepResult::Finished;

        self.tick += 1;
        self.shared_tick.store(self.tick, Ordering::Release);

        let event = Event::Snapshot {
            match_id: self.id.clone(),
            tick: self.tick,
            payload: self.game.snapshot(),
        };
        self.player1.send(event.clone());
        self.player2.send(event);

        if finished || self.game.is_game_over() {
            tracing::info!(match_id = %self.id, tick = self.tick, "game over");
            return Some(self.result(EndReason::Completed, self.game.winner()));
        }

        if self.max_ticks.is_some_and(|max| self.tick >= max) {
            tracing::warn!(match_id = %self.id, tick = self.tick, "match hit tick cap, ending");
            return Some(self.result(EndReason::Stalled, None));
        }

        tracing::trace!(match_id = %self.id, tick = self.tick, "tick");
        None
    }

    fn result(&self, reason: EndReason, winner: Option<PlayerSlot>) -> MatchResult {
        MatchResult {
            match_id: self.id.clone(),
            reason,
            winner,
            score1: self.game.score1(),
            score2: self.game.score2(),
            ticks: self.tick,
        }
    }
}

/// Resolves once a stop has been requested. Pends forever if every handle
/// is gone, since then nobody can ask for a stop.
async fn stopped(rx: &mut watch::Receiver<bool>) {
    loop {
        let stop = *rx.borrow_and_update();
        if stop {
            return;
        }
        if rx.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

/// Forward a disconnect notice as soon as either participant's session
/// closes, so a hangup ends the match without an explicit leave.
async fn watch_liveness(
    player1: SessionHandle,
    player2: SessionHandle,
    disconnect_tx: mpsc::Sender<SessionId>,
) {
    let gone = tokio::select! {
        () = player1.done() => player1.id().clone(),
        () = player2.done() => player2.id().clone(),
    };

    if disconnect_tx.try_send(gone.clone()).is_err() {
        tracing::debug!(session_id = %gone, "disconnect already pending");
    }
}

#[cfg(test)]
mod tests {
    use termplay_core::{RuntimeConfig, SnapshotPayload};

    use super::*;

    /// Game that records the inputs of every step and never ends unless
    /// player one presses PRIMARY.
    struct Recorder {
        steps: Arc<std::sync::Mutex<Vec<MultiInput>>>,
        over: bool,
    }

    impl Game for Recorder {
        fn reset(&mut self, _config: &RuntimeConfig) {}

        fn step_multi(&mut self, input: MultiInput) -> StepResult {
            self.steps.lock().unwrap().push(input);
            if input.player1.contains(InputFlags::PRIMARY) {
                self.over = true;
                return StepResult::Finished;
            }
            StepResult::Continue
        }

        fn snapshot(&self) -> SnapshotPayload {
            SnapshotPayload::new(vec![self.steps.lock().unwrap().len() as u8])
        }

        fn is_game_over(&self) -> bool {
            self.over
        }

        fn winner(&self) -> Option<PlayerSlot> {
            self.over.then_some(PlayerSlot::One)
        }

        fn score1(&self) -> i32 {
            i32::from(self.over)
        }

        fn score2(&self) -> i32 {
            0
        }
    }

    fn setup(depth: usize) -> (MatchSetup, Arc<std::sync::Mutex<Vec<MultiInput>>>, Box<dyn Game>) {
        let steps = Arc::new(std::sync::Mutex::new(Vec::new()));
        let game = Box::new(Recorder { steps: Arc::clone(&steps), over: false });
        let setup = MatchSetup {
            id: MatchId::new("match-TEST00-1"),
            code: JoinCode::new("TEST00"),
            game_id: GameId::new("recorder"),
            player1: SessionHandle::new("p1", 256),
            player2: SessionHandle::new("p2", 256),
            tick_interval: Duration::from_millis(10),
            input_queue_depth: depth,
            max_ticks: None,
        };
        (setup, steps, game)
    }

    #[tokio::test(start_paused = true)]
    async fn buffered_inputs_merge_with_or() {
        let (setup, steps, game) = setup(8);
        let (online, handle) = OnlineMatch::new(setup, game);

        assert!(handle.send_input(PlayerSlot::One, InputFlags::UP));
        assert!(handle.send_input(PlayerSlot::One, InputFlags::UP | InputFlags::DOWN));
        assert!(handle.send_input(PlayerSlot::Two, InputFlags::LEFT));

        let task = tokio::spawn(online.run());
        while handle.tick() < 2 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.stop();
        assert_eq!(task.await.unwrap(), None);

        let steps = steps.lock().unwrap();
        assert_eq!(steps[0].player1, InputFlags::UP | InputFlags::DOWN);
        assert_eq!(steps[0].player2, InputFlags::LEFT);
        // Inputs are consumed, not carried into the next tick.
        assert_eq!(steps[1], MultiInput::default());
    }

    #[tokio::test(start_paused = true)]
    async fn full_input_queue_drops_newest_without_blocking() {
        let (setup, _steps, game) = setup(2);
        let (_online, handle) = OnlineMatch::new(setup, game);

        assert!(handle.send_input(PlayerSlot::One, InputFlags::UP));
        assert!(handle.send_input(PlayerSlot::One, InputFlags::DOWN));
        assert!(!handle.send_input(PlayerSlot::One, InputFlags::PRIMARY));
    }

    #[tokio::test(start_paused = true)]
    async fn completion_reports_winner_and_scores() {
        let (setup, _steps, game) = setup(8);
        let (online, handle) = OnlineMatch::new(setup, game);
        handle.send_input(PlayerSlot::One, InputFlags::PRIMARY);

        let result = online.run().await.unwrap();

        assert_eq!(result.reason, EndReason::Completed);
        assert_eq!(result.winner, Some(PlayerSlot::One));
        assert_eq!((result.score1, result.score2, result.ticks), (1, 0, 1));
    }

    #[tokio::test(start_paused = true)]
    async fn stop_is_idempotent() {
        let (setup, _steps, game) = setup(8);
        let (online, handle) = OnlineMatch::new(setup, game);

        assert!(handle.stop());
        assert!(!handle.stop());
        assert_eq!(online.run().await, None);
        assert!(!handle.stop());
    }
}
