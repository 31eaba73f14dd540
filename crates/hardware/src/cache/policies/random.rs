//! Random Victim Policy.
//!
//! Evicts a uniformly chosen way. It uses a xorshift generator rather than a
//! process-global RNG, so a run is fully reproducible from its seed.

use super::VictimPolicy;

/// Fallback state for a zero seed, which would lock xorshift at zero forever.
const ZERO_SEED_STATE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Random policy state.
#[derive(Clone, Debug)]
pub struct RandomPolicy {
    /// Internal state for the pseudo-random number generator.
    state: u64,
}

impl RandomPolicy {
    /// Creates a new random policy from a seed.
    ///
    /// Two policies built from the same seed produce the same sequence of victims.
    pub const fn new(seed: u64) -> Self {
        Self {
            state: if seed == 0 { ZERO_SEED_STATE } else { seed },
        }
    }

    fn next(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }
}

impl VictimPolicy for RandomPolicy {
    /// Generates a pseudo-random number and maps it to a candidate position.
    fn pick_victim(&mut self, candidates: usize) -> usize {
        assert!(candidates > 0, "victim selection needs at least one candidate");
        (self.next() % candidates as u64) as usize
    }
}
