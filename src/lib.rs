//! # castbench
//! A micro-benchmark harness for downcasting.
//!
//! castbench compares ways of answering "is this object an instance of class X, and if so,
//! give me its X part" over millions of polymorphic objects. Classes form deep, shallow and
//! balanced hierarchies under one root, and the relations between them are kept in a
//! [`Catalog`] that the cast strategies can query.
//!
//! A run builds 7 datasets, then does 3 passes over them: one to warm up, one in allocation
//! order and one after shuffling. Every pass reports the rate of every strategy as a
//! fraction of the non-polymorphic baseline.
//!
//! ## Usage
//!
//! ```no_run
//! use castbench::{BenchConfig, Harness};
//!
//! let mut harness = Harness::new(BenchConfig::default()).unwrap();
//! harness.run(std::io::stdout()).unwrap();
//! ```

pub mod class;

mod catalog;
mod dataset;
mod error;
mod harness;
mod locality;
mod report;
mod rng;
mod strategy;
mod trial;

pub use catalog::{Catalog, CatalogBuilder, CatalogError, ClassId, Hierarchy, TypeNode, SLOTS};
pub use dataset::{Dataset, DatasetError, Preset, Skew, STANDARD_DATASETS};
pub use error::Error;
pub use harness::{BenchConfig, Harness, Pass};
pub use locality::Shuffler;
pub use report::{bar, Reporter};
pub use rng::stream;
pub use strategy::{native_cast, static_cast, CastFn, CastKind, Strategy};
pub use trial::{run_trial, warm, Sink, TrialResult};
