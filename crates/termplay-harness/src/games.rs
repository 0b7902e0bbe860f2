//! Games for driving matches in tests.
//!
//! The duel game itself lives in `termplay-games`; this module adds the
//! factories only tests want.

use termplay_core::{Game, GameError, GameFactory, GameId};
pub use termplay_games::{DuelGame, DuelSnapshot, decode_snapshot, duel_registry};

/// Factory that fails for every game id.
pub fn failing_factory() -> impl GameFactory {
    |game_id: &GameId| -> Result<Box<dyn Game>, GameError> {
        Err(GameError::Construction { game_id: game_id.clone(), reason: "assets missing".into() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failing_factory_rejects_every_id() {
        let factory = failing_factory();
        for id in ["pong", "duel", "chess"] {
            let Err(GameError::Construction { game_id, reason }) = factory.create(&GameId::from(id))
            else {
                panic!("expected construction failure for {id}");
            };
            assert_eq!(game_id.as_str(), id);
            assert_eq!(reason, "assets missing");
        }
    }
}
