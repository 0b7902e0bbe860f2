//! Lobbies and join-code generation.
//!
//! A lobby is a short-lived pairing record: one host, at most one joiner,
//! keyed by a six-character code the host shares out of band. It exists only
//! until a joiner arrives (then it becomes a match), the host cancels, or the
//! expiry sweep removes it.
//!
//! Codes come from a [`CodeSource`] and are checked against the active set
//! by [`generate_unique_code`]. Codes are unique among active lobbies only.

use std::{ops::Sub, time::Duration};

use termplay_core::{Environment, GameId, JoinCode, PlayerSlot, SessionId};

use crate::{error::LobbyError, session::SessionHandle};

/// Base32 alphabet (RFC 4648) used for generated codes.
pub const CODE_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Candidates tried before giving up on a unique code.
pub const MAX_CODE_ATTEMPTS: u32 = 64;

/// Pairing record for one host and an eventual joiner.
///
/// Generic over `I` (Instant type) to support virtual time in tests.
#[derive(Debug, Clone)]
pub struct Lobby<I> {
    /// Join code (uppercase)
    pub code: JoinCode,
    /// Game the match will run
    pub game_id: GameId,
    /// Hosting session, always seat one
    pub host: SessionHandle,
    /// Joining session, seat two
    pub joiner: Option<SessionHandle>,
    /// When the lobby was created
    pub created_at: I,
}

impl<I> Lobby<I>
where
    I: Copy + Sub<Output = Duration>,
{
    /// Create a lobby with only its host.
    pub fn new(code: JoinCode, game_id: GameId, host: SessionHandle, created_at: I) -> Self {
        Self { code, game_id, host, joiner: None, created_at }
    }

    /// Whether a joiner is attached.
    pub fn is_full(&self) -> bool {
        self.joiner.is_some()
    }

    /// Seat of `session_id` in this lobby, if it is a participant.
    pub fn seat_of(&self, session_id: &SessionId) -> Option<PlayerSlot> {
        if self.host.id() == session_id {
            Some(PlayerSlot::One)
        } else if self.joiner.as_ref().is_some_and(|j| j.id() == session_id) {
            Some(PlayerSlot::Two)
        } else {
            None
        }
    }

    /// Attach a joiner.
    ///
    /// # Errors
    ///
    /// - [`LobbyError::OwnLobby`] if the joiner is the host
    /// - [`LobbyError::Full`] if a joiner is already attached
    pub fn admit(&mut self, joiner: SessionHandle) -> Result<(), LobbyError> {
        if joiner.id() == self.host.id() {
            return Err(LobbyError::OwnLobby);
        }
        if self.is_full() {
            return Err(LobbyError::Full);
        }

        self.joiner = Some(joiner);
        Ok(())
    }

    /// Whether the sweep should remove this lobby at `now`.
    ///
    /// Only unjoined lobbies expire, and only once strictly more than
    /// `timeout` has elapsed.
    pub fn is_expired(&self, now: I, timeout: Duration) -> bool {
        self.joiner.is_none() && now - self.created_at > timeout
    }
}

/// Produces candidate join codes.
pub trait CodeSource: Send + Sync + 'static {
    /// Next candidate. May collide with an active lobby; callers retry.
    fn candidate(&self) -> JoinCode;
}

/// Default code source: four bytes of entropy per candidate.
///
/// Falls back to a timestamp-derived code if the entropy source fails.
#[derive(Debug, Clone)]
pub struct EntropyCodes<E> {
    env: E,
}

impl<E: Environment> EntropyCodes<E> {
    /// Draw codes from `env`.
    pub fn new(env: E) -> Self {
        Self { env }
    }
}

impl<E: Environment> CodeSource for EntropyCodes<E> {
    fn candidate(&self) -> JoinCode {
        let mut bytes = [0u8; 4];
        match self.env.try_random_bytes(&mut bytes) {
            Ok(()) => encode_code(u32::from_be_bytes(bytes)),
            Err(e) => {
                tracing::warn!(error = %e, "entropy unavailable, using timestamp join code");
                let nanos = self.env.wall_clock_nanos();
                encode_code((nanos ^ (nanos >> 32)) as u32)
            },
        }
    }
}

/// Render the low 30 bits of `value` as six base32 characters.
pub fn encode_code(value: u32) -> JoinCode {
    let code: String = (0..JoinCode::LEN)
        .map(|i| CODE_ALPHABET[((value >> (5 * i)) & 0x1f) as usize] as char)
        .collect();
    JoinCode::new(code)
}

/// Draw candidates until one is not taken.
///
/// # Errors
///
/// [`LobbyError::CodeSpaceExhausted`] after [`MAX_CODE_ATTEMPTS`] collisions.
pub fn generate_unique_code(
    source: &dyn CodeSource,
    is_taken: impl Fn(&JoinCode) -> bool,
) -> Result<JoinCode, LobbyError> {
    for attempt in 0..MAX_CODE_ATTEMPTS {
        let code = source.candidate();
        if !is_taken(&code) {
            return Ok(code);
        }
        tracing::debug!(%code, attempt, "join code collision, retrying");
    }

    Err(LobbyError::CodeSpaceExhausted)
}
