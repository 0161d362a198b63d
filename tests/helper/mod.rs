#![allow(unused)]
//! Helper functions and types to make setting up the tests easier.

use castbench::{stream, Catalog, Dataset, Hierarchy, Skew};
use log::debug;
use simple_logger::SimpleLogger;
use std::rc::Rc;

pub mod test_classes;

/// The seed every test uses.
pub const SEED: u64 = 7;

/// Installs a logger. Only the first call in a test binary succeeds, the others are ignored.
pub fn init_logger() {
    let _ = SimpleLogger::new()
        .with_level(log::LevelFilter::Debug)
        .init();
}

/// Builds the standard catalog.
/// Panics if any issues occur.
pub fn catalog() -> Rc<Catalog> {
    Rc::new(Catalog::standard().unwrap())
}

/// Generates a dataset from the `generate` stream of [`SEED`].
/// Panics if any issues occur.
pub fn dataset(catalog: &Catalog, hierarchy: Hierarchy, skew: Skew, len: usize) -> Dataset {
    debug!("Generating {} objects of {} from {}", len, hierarchy, skew);
    let mut source = stream(SEED, "generate");
    Dataset::generate(catalog, hierarchy, skew, len, &mut source).unwrap()
}
