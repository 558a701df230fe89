//! Trace acquisition: snapshot sequences read from an external sorter or
//! produced by the synthetic fallback.

mod process;
mod synthetic;

use std::{collections::HashMap, time::Duration};

use serde::Serialize;

use crate::{Algorithm, Result, TraceConfig};

pub use process::ProcessSource;
pub use synthetic::{SyntheticSource, DEFAULT_FALLBACK_SEED};

/// Array state at one instant of a sort.
pub type Snapshot = Vec<i64>;

/// Provider of an ordered trace. Implementations either succeed with their
/// snapshots or report why they could not.
pub trait TraceSource {
    /// Short label used in logs.
    fn describe(&self) -> String;

    fn snapshots(&mut self) -> Result<Vec<Snapshot>>;
}

/// Ordered, immutable sequence of snapshots from unsorted to sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SnapshotSequence {
    steps: Vec<Snapshot>,
}

impl SnapshotSequence {
    pub fn new(steps: Vec<Snapshot>) -> Self {
        Self { steps }
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[i64]> {
        self.steps.get(index).map(Vec::as_slice)
    }

    pub fn first(&self) -> Option<&[i64]> {
        self.steps.first().map(Vec::as_slice)
    }

    pub fn last(&self) -> Option<&[i64]> {
        self.steps.last().map(Vec::as_slice)
    }

    /// Largest value in any snapshot, or `None` for an empty sequence.
    pub fn max_value(&self) -> Option<i64> {
        self.steps.iter().flatten().copied().max()
    }

    /// Number of values in each snapshot.
    pub fn width(&self) -> usize {
        self.first().map_or(0, <[i64]>::len)
    }

    pub fn iter(&self) -> impl Iterator<Item = &[i64]> + '_ {
        self.steps.iter().map(Vec::as_slice)
    }

    /// Returns `true` when every snapshot is a permutation of the first one.
    pub fn is_permutation_consistent(&self) -> bool {
        let Some(first) = self.steps.first() else {
            return true;
        };
        let reference = counts(first);
        self.steps[1..]
            .iter()
            .all(|step| step.len() == first.len() && counts(step) == reference)
    }
}

fn counts(values: &[i64]) -> HashMap<i64, usize> {
    let mut counts = HashMap::with_capacity(values.len());
    for value in values {
        *counts.entry(*value).or_insert(0) += 1;
    }
    counts
}

/// Returns `true` when `values` is in non-decreasing order.
pub fn is_sorted(values: &[i64]) -> bool {
    values.windows(2).all(|pair| pair[0] <= pair[1])
}

/// Parses one whitespace-separated trace line. Blank lines and lines with a
/// token that is not an integer yield `None`.
pub fn parse_trace_line(line: &str) -> Option<Snapshot> {
    let values = line
        .split_whitespace()
        .map(str::parse::<i64>)
        .collect::<std::result::Result<Snapshot, _>>()
        .ok()?;
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

/// Which provider produced a loaded trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TraceOrigin {
    Process,
    Synthetic,
}

/// A trace together with the provider it came from.
#[derive(Debug, Clone)]
pub struct LoadedTrace {
    pub algorithm: Algorithm,
    pub origin: TraceOrigin,
    pub sequence: SnapshotSequence,
}

/// Factory that picks a trace provider for an algorithm and never fails
/// outwardly: any problem with the external source falls back to the
/// synthetic generator.
#[derive(Debug, Clone)]
pub struct TraceLoader {
    config: TraceConfig,
}

impl TraceLoader {
    pub fn new(config: TraceConfig) -> Self {
        Self { config }
    }

    pub fn load(&self, algorithm: Algorithm) -> LoadedTrace {
        if let Some(command) = self.config.command_for(algorithm) {
            let mut source = ProcessSource::new(command.clone())
                .timeout(Duration::from_millis(self.config.timeout_ms))
                .max_lines(self.config.max_lines);
            match source.snapshots() {
                Ok(steps) if !steps.is_empty() => {
                    let sequence = SnapshotSequence::new(steps);
                    if !sequence.is_permutation_consistent() {
                        tracing::warn!(
                            %algorithm,
                            "trace snapshots are not permutations of the initial state"
                        );
                    }
                    tracing::info!(
                        %algorithm,
                        source = %source.describe(),
                        steps = sequence.len(),
                        "loaded trace from external source"
                    );
                    return LoadedTrace {
                        algorithm,
                        origin: TraceOrigin::Process,
                        sequence,
                    };
                }
                Ok(_) => tracing::warn!(
                    %algorithm,
                    source = %source.describe(),
                    "trace source produced no usable lines, using synthetic trace"
                ),
                Err(err) => tracing::warn!(
                    %algorithm,
                    source = %source.describe(),
                    error = %err,
                    "trace source failed, using synthetic trace"
                ),
            }
        } else {
            tracing::debug!(%algorithm, "no trace source configured, using synthetic trace");
        }

        self.synthetic(algorithm)
    }

    fn synthetic(&self, algorithm: Algorithm) -> LoadedTrace {
        let seed = self.config.fallback_seed.unwrap_or(DEFAULT_FALLBACK_SEED);
        let source = SyntheticSource::new(self.config.fallback_len, seed);
        let sequence = SnapshotSequence::new(source.generate());
        tracing::info!(
            %algorithm,
            source = %source.describe(),
            steps = sequence.len(),
            "generated fallback trace"
        );
        LoadedTrace {
            algorithm,
            origin: TraceOrigin::Synthetic,
            sequence,
        }
    }
}
