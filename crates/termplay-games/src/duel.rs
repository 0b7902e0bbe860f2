//! First-to-N duel.
//!
//! Each PRIMARY press scores a point for the pressing player. Snapshots are
//! CBOR-encoded [`DuelSnapshot`] values so a client can render them without
//! knowing anything else about the game.

use serde::{Deserialize, Serialize};
use termplay_core::{
    Game, GameRegistry, InputFlags, MultiInput, PlayerSlot, RuntimeConfig, SnapshotPayload,
    StepResult,
};

/// State a [`DuelGame`] publishes each tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelSnapshot {
    /// Steps taken since reset
    pub tick: u64,
    /// Host's points
    pub score1: i32,
    /// Joiner's points
    pub score2: i32,
    /// Host's input on the last step
    pub last_input1: u16,
    /// Joiner's input on the last step
    pub last_input2: u16,
    /// Whether someone reached the target
    pub game_over: bool,
}

/// Each PRIMARY press scores a point; first to `target` wins.
///
/// A target of zero never ends, which makes the game a plain input echo.
#[derive(Debug, Clone)]
pub struct DuelGame {
    target: i32,
    tick: u64,
    score1: i32,
    score2: i32,
    last: MultiInput,
    seed: u64,
}

impl DuelGame {
    /// Game that ends when either player reaches `target` points.
    pub fn new(target: u32) -> Self {
        Self {
            target: i32::try_from(target).unwrap_or(i32::MAX),
            tick: 0,
            score1: 0,
            score2: 0,
            last: MultiInput::default(),
            seed: 0,
        }
    }

    /// Seed handed to the last [`Game::reset`].
    pub fn seed(&self) -> u64 {
        self.seed
    }

    fn snapshot_state(&self) -> DuelSnapshot {
        DuelSnapshot {
            tick: self.tick,
            score1: self.score1,
            score2: self.score2,
            last_input1: self.last.player1.bits(),
            last_input2: self.last.player2.bits(),
            game_over: self.is_game_over(),
        }
    }
}

impl Game for DuelGame {
    fn reset(&mut self, config: &RuntimeConfig) {
        self.tick = 0;
        self.score1 = 0;
        self.score2 = 0;
        self.last = MultiInput::default();
        self.seed = config.seed;
    }

    fn step_multi(&mut self, input: MultiInput) -> StepResult {
        if self.is_game_over() {
            return StepResult::Finished;
        }

        self.tick += 1;
        self.last = input;
        if input.player1.contains(InputFlags::PRIMARY) {
            self.score1 += 1;
        }
        if input.player2.contains(InputFlags::PRIMARY) {
            self.score2 += 1;
        }

        if self.is_game_over() { StepResult::Finished } else { StepResult::Continue }
    }

    fn snapshot(&self) -> SnapshotPayload {
        let mut bytes = Vec::new();
        if let Err(e) = ciborium::ser::into_writer(&self.snapshot_state(), &mut bytes) {
            tracing::warn!(error = %e, "failed to encode duel snapshot");
            return SnapshotPayload::default();
        }
        SnapshotPayload::new(bytes)
    }

    fn is_game_over(&self) -> bool {
        self.target > 0 && (self.score1 >= self.target || self.score2 >= self.target)
    }

    fn winner(&self) -> Option<PlayerSlot> {
        if !self.is_game_over() {
            return None;
        }
        match self.score1.cmp(&self.score2) {
            std::cmp::Ordering::Greater => Some(PlayerSlot::One),
            std::cmp::Ordering::Less => Some(PlayerSlot::Two),
            std::cmp::Ordering::Equal => None,
        }
    }

    fn score1(&self) -> i32 {
        self.score1
    }

    fn score2(&self) -> i32 {
        self.score2
    }
}

/// Decode a payload produced by [`DuelGame`].
pub fn decode_snapshot(payload: &SnapshotPayload) -> Option<DuelSnapshot> {
    ciborium::de::from_reader(payload.as_bytes()).ok()
}

/// Registry with `"pong"` and `"duel"` both mapped to [`DuelGame`].
pub fn duel_registry(target: u32) -> GameRegistry {
    let mut registry = GameRegistry::new();
    registry
        .register("pong", move || Box::new(DuelGame::new(target)))
        .register("duel", move || Box::new(DuelGame::new(target)));
    registry
}

#[cfg(test)]
mod tests {
    use termplay_core::{GameFactory, GameId};

    use super::*;

    fn press(p1: InputFlags, p2: InputFlags) -> MultiInput {
        MultiInput { player1: p1, player2: p2 }
    }

    #[test]
    fn first_to_target_wins() {
        let mut game = DuelGame::new(2);
        game.reset(&RuntimeConfig::default());

        let step = game.step_multi(press(InputFlags::PRIMARY, InputFlags::NONE));
        assert_eq!(step, StepResult::Continue);
        let step = game.step_multi(press(InputFlags::NONE, InputFlags::PRIMARY));
        assert_eq!(step, StepResult::Continue);
        let step = game.step_multi(press(InputFlags::NONE, InputFlags::PRIMARY));
        assert_eq!(step, StepResult::Finished);

        assert!(game.is_game_over());
        assert_eq!(game.winner(), Some(PlayerSlot::Two));
        assert_eq!((game.score1(), game.score2()), (1, 2));
    }

    #[test]
    fn zero_target_never_ends() {
        let mut game = DuelGame::new(0);
        game.reset(&RuntimeConfig::default());

        for _ in 0..100 {
            let step = game.step_multi(press(InputFlags::PRIMARY, InputFlags::PRIMARY));
            assert_eq!(step, StepResult::Continue);
        }
        assert!(!game.is_game_over());
        assert_eq!(game.winner(), None);
    }

    #[test]
    fn snapshot_decodes() {
        let mut game = DuelGame::new(5);
        game.reset(&RuntimeConfig { seed: 77, ..RuntimeConfig::default() });
        game.step_multi(press(InputFlags::UP | InputFlags::DOWN, InputFlags::LEFT));

        let snapshot = decode_snapshot(&game.snapshot()).unwrap();
        assert_eq!(snapshot.tick, 1);
        assert_eq!(snapshot.last_input1, (InputFlags::UP | InputFlags::DOWN).bits());
        assert_eq!(snapshot.last_input2, InputFlags::LEFT.bits());
        assert_eq!(game.seed(), 77);
    }

    #[test]
    fn registry_serves_both_names() {
        let registry = duel_registry(3);
        assert!(registry.create(&GameId::from("pong")).is_ok());
        assert!(registry.create(&GameId::from("duel")).is_ok());
        assert!(registry.create(&GameId::from("chess")).is_err());
    }
}
