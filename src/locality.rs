//! Destroys the memory locality of a dataset.
//!
//! Objects are allocated in generation order, so an unshuffled dataset walks memory
//! linearly. Shuffling the handles keeps the objects where they are and makes every trial
//! jump around the heap instead.

use crate::dataset::Dataset;
use crate::rng;
use log::trace;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Permutes datasets in place with a seeded generator that is never reseeded.
#[derive(Clone, Debug)]
pub struct Shuffler {
    rng: ChaCha8Rng,
}

impl Shuffler {
    /// Creates a new [`Shuffler`] drawing from the `shuffle` stream of `seed`.
    pub fn new(seed: u64) -> Self {
        Shuffler {
            rng: rng::stream(seed, "shuffle"),
        }
    }

    /// Applies a uniformly random permutation to the order of `dataset`.
    pub fn shuffle(&mut self, dataset: &mut Dataset) {
        trace!(
            "Shuffling {} objects of the {} hierarchy",
            dataset.len(),
            dataset.hierarchy()
        );
        dataset.items.shuffle(&mut self.rng);
    }
}
