//! Environment abstraction for deterministic testing.
//!
//! Decouples lobby and match logic from system resources (time, randomness,
//! wall clock). Production uses real system resources; tests use a manual
//! clock and a seeded RNG so join codes, lobby expiry and match ids are
//! reproducible.

use std::time::Duration;

use crate::error::EntropyError;

/// Abstract environment providing time, randomness, and async primitives.
///
/// # Safety
///
/// Implementations MUST guarantee:
///
/// - `now()` never goes backwards
/// - `random_bytes()` uses cryptographically secure entropy in production
/// - Methods are infallible except in exceptional circumstances (e.g., OS
///   entropy exhaustion, incorrect simulation setup)
pub trait Environment: Clone + Send + Sync + 'static {
    /// The specific instant type used by this environment.
    ///
    /// Production environments use `std::time::Instant`, while simulation
    /// environments use a manually advanced virtual instant.
    type Instant: Copy + Ord + Send + Sync + std::fmt::Debug + std::ops::Sub<Output = Duration>;

    /// Current time (monotonic).
    ///
    /// # Invariants
    ///
    /// - This method MUST return values that never decrease within a single
    ///   execution context. Subsequent calls must return times >= previous
    ///   calls.
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    ///
    /// Only driver code sleeps; lobby and match logic never do.
    fn sleep(&self, duration: Duration) -> impl std::future::Future<Output = ()> + Send;

    /// Fills the provided buffer with random bytes.
    ///
    /// # Invariants
    ///
    /// - Given the same RNG seed, this produces the same sequence of bytes
    /// - Uses cryptographically secure RNG
    fn random_bytes(&self, buffer: &mut [u8]);

    /// Fills the buffer with random bytes, reporting entropy failure instead
    /// of panicking.
    ///
    /// Callers that have a sensible fallback (join codes fall back to a
    /// timestamp) use this. The default delegates to [`Self::random_bytes`].
    fn try_random_bytes(&self, buffer: &mut [u8]) -> Result<(), EntropyError> {
        self.random_bytes(buffer);
        Ok(())
    }

    /// Nanoseconds since the Unix epoch.
    ///
    /// Used for match ids and for seeding per-match game RNGs. Not monotonic.
    fn wall_clock_nanos(&self) -> u128;

    /// Generates a random `u32`.
    fn random_u32(&self) -> u32 {
        let mut bytes = [0u8; 4];
        self.random_bytes(&mut bytes);
        u32::from_be_bytes(bytes)
    }

    /// Generates a random `u64`.
    ///
    /// This is a convenience method for common use cases like generating
    /// seeds or request IDs.
    fn random_u64(&self) -> u64 {
        let mut bytes = [0u8; 8];
        self.random_bytes(&mut bytes);
        u64::from_be_bytes(bytes)
    }
}
