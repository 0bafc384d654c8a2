//! The three cooperating solvers: exact branch-and-bound, constructive heuristics
//! with 2-opt polishing, and NSGA-II.

pub mod evolutionary;
pub mod exact;
pub mod heuristic;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

/// Every random draw in the engine (NSGA-II and the instance generator) comes from
/// the same deterministic stream, seeded once per run.
pub fn seeded_rng(seed: u64) -> ChaCha8Rng {
	ChaCha8Rng::seed_from_u64(seed)
}
