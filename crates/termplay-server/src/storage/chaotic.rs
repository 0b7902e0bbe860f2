//! Chaotic result sink for fault injection testing
//!
//! Wraps another sink and fails a seeded fraction of saves, so tests can show
//! that persistence failures never reach players.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicUsize, Ordering},
};

use super::{MatchRecord, ResultSink, StorageError};

/// Sink wrapper that randomly injects failures.
///
/// Deterministic for a given seed. Clones share the RNG and counters.
#[derive(Clone)]
pub struct ChaoticResultSink<S: ResultSink> {
    inner: S,
    /// Failure rate (0.0 = never fail, 1.0 = always fail)
    failure_rate: f64,
    rng: Arc<Mutex<ChaoticRng>>,
    attempts: Arc<AtomicUsize>,
    failures: Arc<AtomicUsize>,
}

/// Linear congruential generator; reproducible, not random.
struct ChaoticRng {
    state: u64,
}

impl ChaoticRng {
    /// Next value in [0.0, 1.0)
    fn next(&mut self) -> f64 {
        // Numerical Recipes constants
        const A: u64 = 1_664_525;
        const C: u64 = 1_013_904_223;
        const M: u64 = 1u64 << 32;

        self.state = (A.wrapping_mul(self.state).wrapping_add(C)) % M;
        (self.state as f64) / (M as f64)
    }
}

impl<S: ResultSink> ChaoticResultSink<S> {
    /// Wrap `inner` with a fixed default seed.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn new(inner: S, failure_rate: f64) -> Self {
        Self::with_seed(inner, failure_rate, 0x1234_5678_9ABC_DEF0)
    }

    /// Wrap `inner` with an explicit seed for reproducible chaos.
    ///
    /// # Panics
    ///
    /// Panics if `failure_rate` is not in [0.0, 1.0]
    pub fn with_seed(inner: S, failure_rate: f64, seed: u64) -> Self {
        assert!(
            (0.0..=1.0).contains(&failure_rate),
            "failure_rate must be between 0.0 and 1.0, got {failure_rate}"
        );

        Self {
            inner,
            failure_rate,
            rng: Arc::new(Mutex::new(ChaoticRng { state: seed })),
            attempts: Arc::new(AtomicUsize::new(0)),
            failures: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Underlying sink (for checking what actually got through).
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Saves attempted through this wrapper.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::Relaxed)
    }

    /// Saves that were failed on purpose.
    pub fn injected_failures(&self) -> usize {
        self.failures.load(Ordering::Relaxed)
    }

    fn should_fail(&self) -> bool {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).next() < self.failure_rate
    }
}

impl<S: ResultSink> ResultSink for ChaoticResultSink<S> {
    fn save_match_result(&self, record: &MatchRecord) -> Result<(), StorageError> {
        self.attempts.fetch_add(1, Ordering::Relaxed);
        if self.should_fail() {
            self.failures.fetch_add(1, Ordering::Relaxed);
            return Err(StorageError::Io("chaotic failure injection".to_string()));
        }
        self.inner.save_match_result(record)
    }
}
