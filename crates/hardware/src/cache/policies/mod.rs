//! Victim Selection Policies.
//!
//! When every eligible way of a set is dirty, the controller must evict one of them.
//! The choice is delegated to a `VictimPolicy` so that it can be seeded or mocked.
//!
//! # Policies
//!
//! - `Random`: uniform selection from a seeded xorshift generator.

/// Random victim selection.
pub mod random;

pub use random::RandomPolicy;

/// Strategy for choosing which dirty way to evict.
///
/// Implementations see only the number of candidates; the controller maps the returned
/// position back to a concrete way, skipping ways that are reserved by outstanding misses.
pub trait VictimPolicy: Send {
    /// Selects a victim among `candidates` ways.
    ///
    /// # Arguments
    ///
    /// * `candidates` - Number of eligible ways; always at least 1.
    ///
    /// # Returns
    ///
    /// A position in `0..candidates`.
    fn pick_victim(&mut self, candidates: usize) -> usize;
}
