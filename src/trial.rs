//! Timed execution of one strategy over one dataset.

use crate::dataset::Dataset;
use crate::strategy::Strategy;
use std::hint::black_box;
use std::time::{Duration, Instant};

const MICROS_PER_SEC: f64 = 1_000_000.0;

/// Keeps the optimizer from discarding the trial loops.
///
/// Every failed cast and a few other measurements are folded in. The value is meaningless
/// but is printed at the end of a run.
#[derive(Copy, Clone, Default, Debug)]
pub struct Sink {
    value: f64,
}

impl Sink {
    /// Creates a new, empty [`Sink`].
    pub fn new() -> Self {
        Sink::default()
    }

    /// Records a failed cast.
    #[inline]
    pub fn miss(&mut self) {
        self.value += 1.0;
    }

    /// Folds an arbitrary measurement in.
    #[inline]
    pub fn fold(&mut self, value: f64) {
        self.value += value;
    }

    /// The accumulated value.
    pub fn value(&self) -> f64 {
        self.value
    }
}

/// The outcome of one trial.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TrialResult {
    /// The number of objects the strategy cast successfully.
    pub successes: u64,
    /// The wall-clock time of the whole pass.
    pub elapsed: Duration,
    /// The number of objects in the dataset.
    pub len: usize,
}

impl TrialResult {
    /// Creates a new [`TrialResult`].
    pub fn new(successes: u64, elapsed: Duration, len: usize) -> Self {
        TrialResult {
            successes,
            elapsed,
            len,
        }
    }

    /// The achieved casts per second.
    ///
    /// The elapsed time is truncated to whole microseconds first. A trial that finishes in
    /// under a microsecond yields an infinite rate; this is left unguarded so that the numbers
    /// stay comparable with runs at the full dataset size, where it cannot happen.
    pub fn rate(&self) -> f64 {
        let micros = self.elapsed.as_micros() as f64;
        MICROS_PER_SEC / (micros / self.len as f64)
    }
}

/// Casts every object of `dataset` once, in order, and times the whole pass.
///
/// Failures are folded into `sink`.
pub fn run_trial(dataset: &Dataset, strategy: &Strategy, sink: &mut Sink) -> TrialResult {
    let start = Instant::now();
    let successes = cast_all(dataset, strategy, sink);
    let elapsed = start.elapsed();
    TrialResult::new(successes, elapsed, dataset.len())
}

/// Runs `strategy` over `dataset` without timing it, to pull the objects into the caches.
///
/// Returns the number of successes.
pub fn warm(dataset: &Dataset, strategy: &Strategy, sink: &mut Sink) -> u64 {
    cast_all(dataset, strategy, sink)
}

#[inline]
fn cast_all(dataset: &Dataset, strategy: &Strategy, sink: &mut Sink) -> u64 {
    let mut successes = 0;
    for obj in dataset.iter() {
        match black_box(strategy.cast(obj)) {
            Some(_) => successes += 1,
            None => sink.miss(),
        }
    }
    successes
}
