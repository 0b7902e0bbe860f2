//! Simulated environment with a manual clock and seeded entropy.
//!
//! `now()` only moves when a test calls [`SimEnv::advance`], so lobby expiry
//! can be probed at exact instants. Entropy comes from a ChaCha8 stream, so
//! the same seed yields the same join codes. The wall clock is a fixed base
//! plus elapsed time plus a per-call counter, which keeps match ids unique.

use std::{
    ops::{Add, Sub},
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use termplay_core::{EntropyError, Environment};

/// 2024-01-01T00:00:00Z in nanoseconds.
const WALL_CLOCK_BASE: u128 = 1_704_067_200_000_000_000;

/// Virtual instant: time elapsed since the environment was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SimInstant(Duration);

impl SimInstant {
    /// Elapsed virtual time at this instant.
    pub fn elapsed(self) -> Duration {
        self.0
    }
}

impl Sub for SimInstant {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Duration {
        self.0.saturating_sub(rhs.0)
    }
}

impl Add<Duration> for SimInstant {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self {
        Self(self.0 + rhs)
    }
}

/// Deterministic [`Environment`] for tests.
///
/// Clones share the clock and RNG.
#[derive(Clone)]
pub struct SimEnv {
    inner: Arc<Mutex<SimState>>,
}

struct SimState {
    elapsed: Duration,
    rng: ChaCha8Rng,
    wall_clock_calls: u128,
    entropy_failure: bool,
}

impl SimEnv {
    /// Environment seeded with 0.
    pub fn new() -> Self {
        Self::with_seed(0)
    }

    /// Environment whose entropy stream is determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                elapsed: Duration::ZERO,
                rng: ChaCha8Rng::seed_from_u64(seed),
                wall_clock_calls: 0,
                entropy_failure: false,
            })),
        }
    }

    /// Move the virtual clock forward.
    pub fn advance(&self, duration: Duration) {
        self.lock().elapsed += duration;
    }

    /// Virtual time elapsed so far.
    pub fn elapsed(&self) -> Duration {
        self.lock().elapsed
    }

    /// Make [`Environment::try_random_bytes`] fail until switched back.
    pub fn set_entropy_failure(&self, failing: bool) {
        self.lock().entropy_failure = failing;
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for SimEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SimEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimEnv").field("elapsed", &self.elapsed()).finish_non_exhaustive()
    }
}

impl Environment for SimEnv {
    type Instant = SimInstant;

    fn now(&self) -> Self::Instant {
        SimInstant(self.lock().elapsed)
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    fn random_bytes(&self, buffer: &mut [u8]) {
        self.lock().rng.fill_bytes(buffer);
    }

    fn try_random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        let mut state = self.lock();
        if state.entropy_failure {
            return Err(EntropyError("simulated entropy failure".into()));
        }
        state.rng.fill_bytes(buffer);
        Ok(())
    }

    fn wall_clock_nanos(&self) -> u128 {
        let mut state = self.lock();
        state.wall_clock_calls += 1;
        WALL_CLOCK_BASE + state.elapsed.as_nanos() + state.wall_clock_calls
    }
}
