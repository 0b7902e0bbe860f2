//! Coordinator configuration.

use std::time::Duration;

use crate::error::ConfigError;

/// Default time an unjoined lobby stays open.
pub const LOBBY_TIMEOUT: Duration = Duration::from_secs(120);

/// Default simulation rate in Hz.
pub const TICK_RATE_HZ: u32 = 60;

/// Default period of the lobby expiry sweep.
pub const CLEANUP_INTERVAL: Duration = Duration::from_secs(30);

/// Default per-session event buffer.
pub const SESSION_BUFFER_SIZE: usize = 64;

/// Default per-match input queue depth.
pub const INPUT_QUEUE_DEPTH: usize = 64;

/// Default coordinator inbound queue depth.
pub const INBOUND_QUEUE_DEPTH: usize = 256;

/// Tunables for the coordinator and the matches it spawns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Unjoined lobbies older than this are swept
    pub lobby_timeout: Duration,
    /// Ticks per second for every match
    pub tick_rate_hz: u32,
    /// Period of the expiry sweep
    pub cleanup_interval: Duration,
    /// Events buffered per session before the oldest is evicted
    pub session_buffer_size: usize,
    /// Inputs buffered per match between ticks
    pub input_queue_depth: usize,
    /// Messages buffered ahead of the coordinator loop
    pub inbound_queue_depth: usize,
    /// Force-end a match after this many ticks (`None` = never)
    pub max_match_ticks: Option<u64>,
    /// Playfield width handed to games
    pub screen_width: u16,
    /// Playfield height handed to games
    pub screen_height: u16,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lobby_timeout: LOBBY_TIMEOUT,
            tick_rate_hz: TICK_RATE_HZ,
            cleanup_interval: CLEANUP_INTERVAL,
            session_buffer_size: SESSION_BUFFER_SIZE,
            input_queue_depth: INPUT_QUEUE_DEPTH,
            inbound_queue_depth: INBOUND_QUEUE_DEPTH,
            max_match_ticks: None,
            screen_width: 80,
            screen_height: 24,
        }
    }
}

impl CoordinatorConfig {
    /// Wall-clock period between two ticks.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_nanos(1_000_000_000 / u64::from(self.tick_rate_hz.max(1)))
    }

    /// Reject settings that would stall or panic the runtime.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_rate_hz == 0 {
            return Err(ConfigError("tick rate must be non-zero".into()));
        }
        if self.cleanup_interval.is_zero() {
            return Err(ConfigError("cleanup interval must be non-zero".into()));
        }
        if self.session_buffer_size == 0 {
            return Err(ConfigError("session buffer size must be non-zero".into()));
        }
        if self.input_queue_depth == 0 || self.inbound_queue_depth == 0 {
            return Err(ConfigError("queue depths must be non-zero".into()));
        }
        if self.max_match_ticks == Some(0) {
            return Err(ConfigError("max match ticks must be non-zero when set".into()));
        }
        Ok(())
    }
}
