//! Round-robin GPU selection
//!
//! Selection is deliberately load-blind: the candidate for the n-th call
//! is always `pool[n % len]`, whether or not earlier candidates were
//! admitted. Load-awareness lives entirely in the admission controller,
//! which keeps the selector stateless with respect to telemetry and makes
//! denied jobs rotate to a different device on every retry.

use rendergrid_core::GpuId;

/// Cyclic selector over the configured GPU pool
pub struct RoundRobin {
    pool: Vec<GpuId>,
    cursor: u64,
}

impl RoundRobin {
    /// Create a selector over a non-empty pool.
    ///
    /// The pool is validated as non-empty at configuration load; an empty
    /// pool here is a programming error.
    pub fn new(pool: Vec<GpuId>) -> Self {
        assert!(!pool.is_empty(), "GPU pool must not be empty");
        Self { pool, cursor: 0 }
    }

    /// Propose the next candidate device. The cursor advances on every
    /// call, including calls whose candidate is later denied admission.
    pub fn next_candidate(&mut self) -> GpuId {
        let candidate = self.pool[(self.cursor % self.pool.len() as u64) as usize].clone();
        self.cursor += 1;
        candidate
    }

    /// Total number of selection attempts so far
    pub fn cursor(&self) -> u64 {
        self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(ids: &[&str]) -> Vec<GpuId> {
        ids.iter().map(|s| GpuId::from(*s)).collect()
    }

    #[test]
    fn test_round_robin_rotation() {
        let mut selector = RoundRobin::new(pool(&["0", "1", "2"]));
        let picks: Vec<String> = (0..7).map(|_| selector.next_candidate().0).collect();
        assert_eq!(picks, vec!["0", "1", "2", "0", "1", "2", "0"]);
        assert_eq!(selector.cursor(), 7);
    }

    #[test]
    fn test_cursor_law() {
        let ids = pool(&["0", "1"]);
        let mut selector = RoundRobin::new(ids.clone());
        for n in 0..20u64 {
            let expected = &ids[(n % ids.len() as u64) as usize];
            assert_eq!(&selector.next_candidate(), expected);
        }
    }

    #[test]
    fn test_single_device_pool() {
        let mut selector = RoundRobin::new(pool(&["0"]));
        assert_eq!(selector.next_candidate(), GpuId::from("0"));
        assert_eq!(selector.next_candidate(), GpuId::from("0"));
    }

    #[test]
    #[should_panic(expected = "GPU pool must not be empty")]
    fn test_empty_pool_panics() {
        RoundRobin::new(Vec::new());
    }
}
