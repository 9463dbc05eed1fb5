pub use crate::aggregate::{AggregateTable, Row};
pub use crate::categories::CategoryReporter;
pub use crate::contingency::{ContingencyEngine, ContingencyResult, Count};
pub use crate::error::{Error, Result};
pub use crate::marker::{MarkerDataset, RawRecord};
pub use crate::{Category, Population, SampleId};
