use crate::aggregate::{AggregateTable, Row};
use crate::prelude::*;
use log::{debug, warn};
use ndarray::Array2;
use std::collections::BTreeSet;

pub type Count = u32;

/// Predicate restricting which rows take part in a count.
pub type RowFilter<'f> = &'f dyn Fn(&Row<'_>) -> bool;

/// Dense cross-tabulation of two markers.
///
/// Rows are the categories of the first marker, columns those of the second,
/// both sorted by their text. Every combination has a cell, zero or not.
#[derive(Debug, Clone, PartialEq)]
pub struct ContingencyResult {
    rows: Vec<Category>,
    columns: Vec<Category>,
    counts: Array2<Count>,
}

fn position(axis: &[Category], category: &str) -> Option<usize> {
    axis.binary_search_by(|c| c.as_str().cmp(category)).ok()
}

impl ContingencyResult {
    fn tabulate(pairs: &[(&str, &str)]) -> Self {
        let rows: BTreeSet<&str> = pairs.iter().map(|(a, _)| *a).collect();
        let columns: BTreeSet<&str> = pairs.iter().map(|(_, b)| *b).collect();
        let rows: Vec<Category> = rows.into_iter().map(String::from).collect();
        let columns: Vec<Category> = columns.into_iter().map(String::from).collect();

        let mut counts = Array2::<Count>::zeros((rows.len(), columns.len()));
        for (a, b) in pairs {
            if let (Some(i), Some(j)) = (position(&rows, a), position(&columns, b)) {
                counts[[i, j]] += 1;
            }
        }
        Self {
            rows,
            columns,
            counts,
        }
    }

    /// Categories of the first marker, in row order.
    pub fn row_categories(&self) -> &[Category] {
        &self.rows
    }

    /// Categories of the second marker, in column order.
    pub fn column_categories(&self) -> &[Category] {
        &self.columns
    }

    pub fn counts(&self) -> &Array2<Count> {
        &self.counts
    }

    /// Number of samples with category `a` at the first marker and `b` at the second.
    ///
    /// `None` when either category isn't on its axis.
    pub fn count(&self, a: &str, b: &str) -> Option<Count> {
        let i = position(&self.rows, a)?;
        let j = position(&self.columns, b)?;
        Some(self.counts[[i, j]])
    }

    /// Number of samples counted.
    pub fn total(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = (&str, &str, Count)> + '_ {
        self.rows.iter().enumerate().flat_map(move |(i, a)| {
            self.columns
                .iter()
                .enumerate()
                .map(move |(j, b)| (a.as_str(), b.as_str(), self.counts[[i, j]]))
        })
    }
}

/// Counting genotype combinations across markers.
pub trait ContingencyEngine {
    /// Counts every combination of categories of `marker_a` and `marker_b`.
    ///
    /// Only rows accepted by `filter` are counted, and only the categories
    /// found among those rows make up the axes.
    fn two_way(
        &self,
        marker_a: &str,
        marker_b: &str,
        filter: Option<RowFilter<'_>>,
    ) -> Result<ContingencyResult>;

    /// Like `two_way`, restricted to samples whose genotype at
    /// `condition_marker` is `condition_category`.
    ///
    /// The category may be given in either allele order.
    fn three_way_conditioned(
        &self,
        condition_marker: &str,
        condition_category: &str,
        marker_a: &str,
        marker_b: &str,
    ) -> Result<ContingencyResult>;
}

impl ContingencyEngine for AggregateTable {
    fn two_way(
        &self,
        marker_a: &str,
        marker_b: &str,
        filter: Option<RowFilter<'_>>,
    ) -> Result<ContingencyResult> {
        for marker in [marker_a, marker_b] {
            if !self.has_marker(marker) {
                return Err(Error::UnknownMarker(marker.into()));
            }
        }

        let pairs: Vec<(&str, &str)> = self
            .rows()
            .filter(|row| filter.map_or(true, |f| f(row)))
            .filter_map(|row| Some((row.category(marker_a)?, row.category(marker_b)?)))
            .collect();
        if pairs.is_empty() && filter.is_some() {
            warn!("No sample passes the filter for {} x {}", marker_a, marker_b);
        }

        let result = ContingencyResult::tabulate(&pairs);
        debug!(
            "{} x {}: {} samples in {}x{} cells",
            marker_a,
            marker_b,
            pairs.len(),
            result.rows.len(),
            result.columns.len()
        );
        Ok(result)
    }

    fn three_way_conditioned(
        &self,
        condition_marker: &str,
        condition_category: &str,
        marker_a: &str,
        marker_b: &str,
    ) -> Result<ContingencyResult> {
        let category = self.canonicalize(condition_marker, condition_category)?;
        let filter = |row: &Row<'_>| row.category(condition_marker) == Some(category);
        self.two_way(marker_a, marker_b, Some(&filter))
    }
}
