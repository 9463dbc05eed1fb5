use crate::prelude::*;
use log::debug;
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Column name prefix identifying the genotype column of a marker file.
pub const GENOTYPE_PREFIX: &str = "genotype";

/// Raw genotype label -> canonical category
pub type CategoryMap = BTreeMap<String, Category>;

/// One sample's observation at a single marker, as handed over by a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub sample_id: SampleId,
    pub population: Population,
    pub genotype: String,
}

impl RawRecord {
    pub fn new(sample_id: &str, population: &str, genotype: &str) -> Self {
        Self {
            sample_id: sample_id.into(),
            population: population.into(),
            genotype: genotype.into(),
        }
    }
}

/// Position of the first header starting with `prefix`, ignoring case.
pub fn locate_prefixed_column<'a, I>(headers: I, prefix: &str) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    let prefix = prefix.to_lowercase();
    headers
        .into_iter()
        .position(|h| h.to_lowercase().starts_with(&prefix))
        .ok_or_else(|| Error::MissingColumn(format!("'{}*'", prefix)))
}

/// Position of the genotype column: the first header starting with "genotype", in any case.
pub fn locate_genotype_column<'a, I>(headers: I) -> Result<usize>
where
    I: IntoIterator<Item = &'a str>,
{
    locate_prefixed_column(headers, GENOTYPE_PREFIX)
}

fn reversed(label: &str) -> String {
    label.chars().rev().collect()
}

/// Folds genotype labels written in either allele order onto one category.
///
/// Distinct labels are visited in lexicographic order. A label whose
/// character-reversal was already visited maps onto that label's category,
/// any other label becomes its own category. Of a pair like "A|G" / "G|A"
/// the smaller one is therefore always the representative, and a palindrome
/// such as "T|T" stands for itself.
pub fn canonical_categories<'a, I>(labels: I) -> CategoryMap
where
    I: IntoIterator<Item = &'a str>,
{
    let distinct: BTreeSet<&str> = labels.into_iter().collect();
    let mut categories = CategoryMap::new();
    for label in distinct {
        let canonical = match categories.get(&reversed(label)) {
            Some(existing) => existing.clone(),
            None => label.to_string(),
        };
        categories.insert(label.to_string(), canonical);
    }
    categories
}

/// The genotype observations of a single marker, keyed by sample.
///
/// Sample order is the order of the input records. Immutable once built.
#[derive(Debug, Clone)]
pub struct MarkerDataset {
    name: String,
    samples: Vec<SampleId>,
    index: HashMap<SampleId, usize>,
    populations: Vec<Population>,
    genotypes: Vec<Category>,
    categories: CategoryMap,
}

impl MarkerDataset {
    /// Builds a dataset from the records a loader produces.
    ///
    /// Stops at the first failing record. Every sample may appear only once.
    pub fn build<I>(name: &str, records: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<RawRecord>>,
    {
        let mut samples = vec![];
        let mut index = HashMap::new();
        let mut populations = vec![];
        let mut raw = vec![];

        for record in records {
            let record = record?;
            if index.contains_key(&record.sample_id) {
                return Err(Error::DuplicateSample {
                    marker: name.into(),
                    sample: record.sample_id,
                });
            }
            index.insert(record.sample_id.clone(), samples.len());
            samples.push(record.sample_id);
            populations.push(record.population);
            raw.push(record.genotype);
        }

        let categories = canonical_categories(raw.iter().map(String::as_str));
        // Every raw label is a key of `categories`.
        let genotypes = raw.iter().map(|g| categories[g].clone()).collect();

        let dataset = Self {
            name: name.into(),
            samples,
            index,
            populations,
            genotypes,
            categories,
        };
        debug!(
            "{}: {} samples, {} raw labels in {} categories",
            dataset.name,
            dataset.len(),
            dataset.categories.len(),
            dataset.all_canonical_categories().len()
        );
        Ok(dataset)
    }

    /// Builds a dataset from already parsed records.
    pub fn from_records(name: &str, records: Vec<RawRecord>) -> Result<Self> {
        Self::build(name, records.into_iter().map(Ok))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Sample identities in input order.
    pub fn sample_ids(&self) -> &[SampleId] {
        &self.samples
    }

    pub fn contains(&self, sample_id: &str) -> bool {
        self.index.contains_key(sample_id)
    }

    /// Canonical category observed for `sample_id`.
    pub fn categories_of(&self, sample_id: &str) -> Option<&str> {
        self.index
            .get(sample_id)
            .map(|&i| self.genotypes[i].as_str())
    }

    pub fn population_of(&self, sample_id: &str) -> Option<&str> {
        self.index
            .get(sample_id)
            .map(|&i| self.populations[i].as_str())
    }

    /// Every distinct canonical category of this marker.
    pub fn all_canonical_categories(&self) -> BTreeSet<&str> {
        self.categories.values().map(String::as_str).collect()
    }

    /// Category a raw label was folded onto, if that label was observed.
    pub fn canonical(&self, raw_label: &str) -> Option<&str> {
        self.categories.get(raw_label).map(String::as_str)
    }

    pub fn category_map(&self) -> &CategoryMap {
        &self.categories
    }

    pub(crate) fn populations(&self) -> &[Population] {
        &self.populations
    }
}
