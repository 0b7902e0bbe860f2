//! Opaque identifiers.
//!
//! Session, match and game ids are strings so any transport can mint them.
//! Join codes are normalized to uppercase at construction, which makes every
//! lookup case-insensitive without callers having to remember to normalize.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wrap a raw string.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the raw string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

string_id!(
    /// Identifies a connected client for the lifetime of its connection.
    SessionId
);

string_id!(
    /// Identifies one simulation run.
    MatchId
);

string_id!(
    /// Names a game kind, e.g. `"pong"`. Resolved by a [`crate::GameFactory`].
    GameId
);

/// Short human-shareable lobby code.
///
/// Always stored uppercase. Codes are unique among currently active lobbies
/// only and may be reused once a lobby is gone.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct JoinCode(String);

impl JoinCode {
    /// Number of characters in a generated code.
    pub const LEN: usize = 6;

    /// Normalize user input into a code (trimmed, uppercased).
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_ascii_uppercase())
    }

    /// Borrow the normalized code.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JoinCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for JoinCode {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for JoinCode {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

impl From<JoinCode> for String {
    fn from(code: JoinCode) -> Self {
        code.0
    }
}

/// Seat of a participant in a two-player match.
///
/// The host always plays [`PlayerSlot::One`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlayerSlot {
    /// Host seat (left / first color)
    One,
    /// Joiner seat (right / second color)
    Two,
}

impl PlayerSlot {
    /// The opposing seat.
    pub fn other(self) -> Self {
        match self {
            Self::One => Self::Two,
            Self::Two => Self::One,
        }
    }

    /// Seat number as used in persisted records (1 or 2).
    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
        }
    }

    /// Inverse of [`Self::number`].
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            _ => None,
        }
    }
}

impl fmt::Display for PlayerSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "player{}", self.number())
    }
}
