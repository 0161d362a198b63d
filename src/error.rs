use crate::catalog::CatalogError;
use crate::dataset::DatasetError;
use std::io;
use thiserror::Error;

/// An error that stops a benchmark run.
#[derive(Error, Debug)]
pub enum Error {
    /// The class catalog is malformed.
    #[error("Invalid class catalog: {0}")]
    Catalog(#[from] CatalogError),
    /// A dataset could not be generated.
    #[error("Invalid dataset: {0}")]
    Dataset(#[from] DatasetError),
    /// The report could not be written.
    #[error("Failed to write the report: {0}")]
    Io(#[from] io::Error),
}
