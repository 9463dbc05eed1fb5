#![crate_name = "popfreq"]
//! Genotype contingency tables across markers.
//!
//! Per-marker sample exports are folded into [`MarkerDataset`]s, where a
//! genotype and its reverse spelling ("A|G", "G|A") share one category. The
//! datasets are joined on sample identity into an [`AggregateTable`], which
//! answers two-way and conditioned three-way count queries.

pub mod prelude;

pub mod aggregate;
pub mod categories;
pub mod config;
pub mod contingency;
pub mod error;
pub mod marker;
pub mod observable;
pub mod report;

pub use aggregate::{AggregateTable, Row};
pub use categories::CategoryReporter;
pub use contingency::{ContingencyEngine, ContingencyResult};
pub use error::{Error, Result};
pub use marker::{MarkerDataset, RawRecord};

pub type SampleId = String;
pub type Population = String;
/// A canonical genotype label.
pub type Category = String;
