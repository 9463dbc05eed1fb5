use crate::aggregate::AggregateTable;
use crate::prelude::*;
use std::collections::BTreeSet;

/// Listing the genotype categories observed per marker.
pub trait CategoryReporter {
    fn list_categories(&self, marker: &str) -> Result<BTreeSet<&str>>;

    /// Every marker with its categories, in join order.
    fn all_categories(&self) -> Vec<(&str, BTreeSet<&str>)>;
}

impl CategoryReporter for AggregateTable {
    fn list_categories(&self, marker: &str) -> Result<BTreeSet<&str>> {
        Ok(self
            .marker_categories(marker)?
            .values()
            .map(String::as_str)
            .collect())
    }

    fn all_categories(&self) -> Vec<(&str, BTreeSet<&str>)> {
        self.marker_names()
            .into_iter()
            .filter_map(|m| Some((m, self.list_categories(m).ok()?)))
            .collect()
    }
}
