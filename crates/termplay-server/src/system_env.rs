//! Production Environment implementation using system time and RNG.
//!
//! `SystemEnv` backs lobby timestamps with `std::time::Instant`, join codes
//! with OS entropy (getrandom), and match ids and game seeds with the wall
//! clock. Behavior is non-deterministic; tests use a simulated environment
//! instead.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use termplay_core::{EntropyError, Environment};

/// Production environment using system time and cryptographic RNG.
///
/// # Panics
///
/// [`Environment::random_bytes`] panics if the OS RNG fails. Join-code
/// generation goes through [`Environment::try_random_bytes`] instead, which
/// reports the failure so a timestamp-derived code can be used.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl SystemEnv {
    /// Create a new system environment.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Environment for SystemEnv {
    type Instant = std::time::Instant;

    fn now(&self) -> Self::Instant {
        std::time::Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }

    #[allow(clippy::expect_used)]
    fn random_bytes(&self, buffer: &mut [u8]) {
        getrandom::fill(buffer).expect("invariant: OS RNG failure is unrecoverable");
    }

    fn try_random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        getrandom::fill(buffer).map_err(|e| EntropyError(e.to_string()))
    }

    fn wall_clock_nanos(&self) -> u128 {
        // A clock before 1970 yields 0; ids stay unique through the code part.
        SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| d.as_nanos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn time_advances() {
        let env = SystemEnv::new();

        let t1 = env.now();
        std::thread::sleep(Duration::from_millis(10));
        let t2 = env.now();

        assert!(t2 > t1);
    }

    #[test]
    fn random_bytes_differ() {
        let env = SystemEnv::new();

        let mut a = [0u8; 32];
        let mut b = [0u8; 32];
        env.try_random_bytes(&mut a).unwrap();
        env.random_bytes(&mut b);

        assert_ne!(a, b);
    }

    #[test]
    fn wall_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z in nanoseconds
        assert!(SystemEnv::new().wall_clock_nanos() > 1_577_836_800_000_000_000);
    }

    #[tokio::test]
    async fn sleep_waits() {
        let env = SystemEnv::new();

        let start = env.now();
        env.sleep(Duration::from_millis(20)).await;

        assert!(env.now() - start >= Duration::from_millis(20));
    }
}
