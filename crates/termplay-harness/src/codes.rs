//! Scripted join-code sources.

use std::{
    collections::VecDeque,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicU32, Ordering},
    },
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use termplay_core::JoinCode;
use termplay_server::{CodeSource, encode_code};

/// Hands out a fixed list of codes, then counts upward from `AAAAAA`.
#[derive(Debug)]
pub struct FixedCodes {
    queue: Mutex<VecDeque<JoinCode>>,
    next: AtomicU32,
}

impl FixedCodes {
    /// Serve `codes` in order.
    pub fn new<C: Into<JoinCode>>(codes: impl IntoIterator<Item = C>) -> Self {
        Self {
            queue: Mutex::new(codes.into_iter().map(Into::into).collect()),
            next: AtomicU32::new(0),
        }
    }
}

impl CodeSource for FixedCodes {
    fn candidate(&self) -> JoinCode {
        let scripted = self.queue.lock().unwrap_or_else(PoisonError::into_inner).pop_front();
        scripted.unwrap_or_else(|| encode_code(self.next.fetch_add(1, Ordering::Relaxed)))
    }
}

/// Draws from a deliberately tiny pool so collisions are frequent.
#[derive(Debug)]
pub struct PoolCodes {
    rng: Mutex<ChaCha8Rng>,
    pool_size: u32,
}

impl PoolCodes {
    /// Codes drawn uniformly from the first `pool_size` encodings.
    pub fn new(seed: u64, pool_size: u32) -> Self {
        Self { rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)), pool_size: pool_size.max(1) }
    }

    /// Number of distinct codes this source can produce.
    pub fn pool_size(&self) -> u32 {
        self.pool_size
    }
}

impl CodeSource for PoolCodes {
    fn candidate(&self) -> JoinCode {
        let value = self
            .rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_range(0..self.pool_size);
        encode_code(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_codes_then_fallback() {
        let codes = FixedCodes::new(["abc123", "XYZ789"]);

        assert_eq!(codes.candidate().as_str(), "ABC123");
        assert_eq!(codes.candidate().as_str(), "XYZ789");
        assert_eq!(codes.candidate().as_str(), "AAAAAA");
        assert_eq!(codes.candidate().as_str(), "BAAAAA");
    }

    #[test]
    fn pool_codes_stay_in_pool() {
        let codes = PoolCodes::new(1, 3);
        let pool: Vec<JoinCode> = (0..3).map(encode_code).collect();

        for _ in 0..50 {
            assert!(pool.contains(&codes.candidate()));
        }
    }
}
