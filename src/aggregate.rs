use crate::marker::{CategoryMap, MarkerDataset};
use crate::prelude::*;
use log::{debug, info};
use std::collections::HashMap;

/// One marker joined into the table: its categories in row order.
#[derive(Debug, Clone)]
struct Column {
    name: String,
    genotypes: Vec<Category>,
    categories: CategoryMap,
}

/// Several markers aligned on sample identity.
///
/// Rows follow the sample order of the first joined marker. Every marker
/// covers exactly the same set of samples.
#[derive(Debug, Clone)]
pub struct AggregateTable {
    samples: Vec<SampleId>,
    index: HashMap<SampleId, usize>,
    populations: Vec<Population>,
    columns: Vec<Column>,
}

/// A borrowed view of a single sample in an `AggregateTable`.
#[derive(Clone, Copy)]
pub struct Row<'t> {
    table: &'t AggregateTable,
    idx: usize,
}

impl<'t> Row<'t> {
    pub fn sample_id(&self) -> &'t str {
        &self.table.samples[self.idx]
    }

    pub fn population(&self) -> &'t str {
        &self.table.populations[self.idx]
    }

    /// This sample's category at `marker`, `None` if the marker isn't joined.
    pub fn category(&self, marker: &str) -> Option<&'t str> {
        self.table
            .column(marker)
            .map(|c| c.genotypes[self.idx].as_str())
    }
}

impl AggregateTable {
    /// Joins `datasets` on sample identity.
    ///
    /// The first dataset fixes the row order and the population labels.
    /// Fails without producing a table as soon as one dataset disagrees on
    /// the sample set.
    pub fn build<I>(datasets: I) -> Result<Self>
    where
        I: IntoIterator<Item = MarkerDataset>,
    {
        let mut datasets = datasets.into_iter();
        let first = datasets.next().ok_or(Error::NoMarkers)?;

        info!("Aggregating {} samples", first.len());
        let samples = first.sample_ids().to_vec();
        let index = samples
            .iter()
            .enumerate()
            .map(|(i, s)| (s.clone(), i))
            .collect();
        let mut table = Self {
            samples,
            index,
            populations: first.populations().to_vec(),
            columns: vec![],
        };
        table.append(first)?;
        for dataset in datasets {
            table.append(dataset)?;
        }
        Ok(table)
    }

    /// Adds one more marker.
    ///
    /// The table is left untouched if the marker's samples differ from the
    /// table's or the marker is already joined.
    pub fn append(&mut self, dataset: MarkerDataset) -> Result<()> {
        self.check_samples(&dataset)?;
        if self.column(dataset.name()).is_some() {
            return Err(Error::DuplicateMarker(dataset.name().into()));
        }

        let genotypes = self
            .samples
            .iter()
            .map(|s| dataset.categories_of(s).unwrap_or_default().to_string())
            .collect();
        debug!("Joined marker {}", dataset.name());
        self.columns.push(Column {
            name: dataset.name().into(),
            genotypes,
            categories: dataset.category_map().clone(),
        });
        Ok(())
    }

    fn check_samples(&self, dataset: &MarkerDataset) -> Result<()> {
        let mismatch = |reason: String| Error::IndexMismatch {
            marker: dataset.name().into(),
            reason,
        };
        if dataset.len() != self.samples.len() {
            return Err(mismatch(format!(
                "{} samples instead of {}",
                dataset.len(),
                self.samples.len()
            )));
        }
        // Equal sizes and no duplicates on either side: one-way containment is enough.
        if let Some(missing) = self.samples.iter().find(|s| !dataset.contains(s)) {
            return Err(mismatch(format!("sample '{}' is missing", missing)));
        }
        Ok(())
    }

    fn column(&self, marker: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == marker)
    }

    fn column_or_err(&self, marker: &str) -> Result<&Column> {
        self.column(marker)
            .ok_or_else(|| Error::UnknownMarker(marker.into()))
    }

    /// Names of the joined markers, in join order.
    pub fn marker_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn has_marker(&self, marker: &str) -> bool {
        self.column(marker).is_some()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All rows in table order.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> + '_ {
        (0..self.samples.len()).map(move |idx| Row { table: self, idx })
    }

    pub fn row(&self, sample_id: &str) -> Option<Row<'_>> {
        self.index
            .get(sample_id)
            .map(|&idx| Row { table: self, idx })
    }

    pub fn category_of(&self, sample_id: &str, marker: &str) -> Result<&str> {
        let column = self.column_or_err(marker)?;
        let idx = self
            .index
            .get(sample_id)
            .ok_or_else(|| Error::UnknownSample(sample_id.into()))?;
        Ok(column.genotypes[*idx].as_str())
    }

    /// Canonical category `label` stands for at `marker`.
    ///
    /// Accepts observed raw labels, canonical categories, and the reversal of
    /// a canonical category even if that spelling never occurred.
    pub fn canonicalize(&self, marker: &str, label: &str) -> Result<&str> {
        let column = self.column_or_err(marker)?;
        if let Some(category) = column.categories.get(label) {
            return Ok(category.as_str());
        }
        let reversed: String = label.chars().rev().collect();
        column
            .categories
            .get(&reversed)
            .map(String::as_str)
            .ok_or_else(|| Error::UnknownCategory {
                marker: marker.into(),
                category: label.into(),
            })
    }

    pub(crate) fn marker_categories(&self, marker: &str) -> Result<&CategoryMap> {
        Ok(&self.column_or_err(marker)?.categories)
    }
}
