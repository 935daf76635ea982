//! Recount core library: in-memory index over a referring-expression counting
//! dataset.
//!
//! Images are paired with referring captions. This crate flattens the nested
//! annotation document into an `(image_id, caption)` keyed index, flattens the
//! split document into ordered split membership, and answers every query from
//! those structures without re-reading the sources. With the `python` feature
//! it is also compiled as a Python extension module (`_recount_core`).

pub mod catalog;
pub mod config;
pub mod errors;
pub mod index;
pub mod models;
#[cfg(feature = "python")]
pub mod python;

pub use catalog::{CatalogSummary, DatasetCatalog, SourceInfo};
pub use config::{CatalogConfig, ResolvedPaths};
pub use errors::{RecountError, RecountResult};
pub use index::{AnnotationIndex, SplitIndex};
pub use models::{FieldsRecord, PairKey, PairRef, SourceDocument};

#[cfg(feature = "python")]
use pyo3::prelude::*;

// ---------------------------------------------------------------------------
// Top-level Python module: _recount_core
// ---------------------------------------------------------------------------

#[cfg(feature = "python")]
#[pymodule]
fn _recount_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<python::DataProcessor>()?;

    // -- Configuration defaults ----------------------------------------------
    m.add("DEFAULT_IMAGE_DIR", config::DEFAULT_IMAGE_DIR)?;
    m.add("DEFAULT_ANNOTATION_FILE", config::DEFAULT_ANNOTATION_FILE)?;
    m.add("DEFAULT_SPLIT_FILE", config::DEFAULT_SPLIT_FILE)?;

    Ok(())
}
