use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::{Snapshot, TraceSource};
use crate::Result;

/// Seed used when the configuration does not pin one.
pub const DEFAULT_FALLBACK_SEED: u64 = 0x5EED_50B7;

/// Deterministic stand-in for an external sorter: shuffles `1..=len` with a
/// seeded ChaCha8 RNG and bubble sorts it, recording the initial state and
/// the state after every swap.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    len: usize,
    seed: u64,
}

impl SyntheticSource {
    /// `len` is raised to at least one so the trace is never empty.
    pub fn new(len: usize, seed: u64) -> Self {
        Self {
            len: len.max(1),
            seed,
        }
    }

    pub fn generate(&self) -> Vec<Snapshot> {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        let mut values: Snapshot = (1..=self.len as i64).collect();
        values.shuffle(&mut rng);

        let mut steps = vec![values.clone()];
        let n = values.len();
        for pass in 0..n {
            let mut swapped = false;
            for j in 0..n - 1 - pass {
                if values[j] > values[j + 1] {
                    values.swap(j, j + 1);
                    steps.push(values.clone());
                    swapped = true;
                }
            }
            if !swapped {
                break;
            }
        }
        steps
    }
}

impl TraceSource for SyntheticSource {
    fn describe(&self) -> String {
        format!("synthetic bubble sort (n={}, seed={:#x})", self.len, self.seed)
    }

    fn snapshots(&mut self) -> Result<Vec<Snapshot>> {
        Ok(self.generate())
    }
}
