use crate::aggregate::AggregateTable;
use crate::marker::{locate_prefixed_column, MarkerDataset, RawRecord, GENOTYPE_PREFIX};
use crate::prelude::*;
use log::info;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Header of the population column in per-marker sample exports.
pub const POPULATION_FIELD: &str = "Population(s)";

#[derive(Clone, Copy, Debug)]
struct Fields {
    sample: usize,
    population: usize,
    genotype: usize,
}

/// Produces `RawRecord`s from u8 delimited marker data
///
/// `MarkerCsv` implements Iterator so it can be passed
/// directly to `MarkerDataset::build()`
pub struct MarkerCsv {
    records: csv::StringRecordsIntoIter<Box<dyn Read>>,
    fields: Fields,
}

impl Iterator for MarkerCsv {
    type Item = Result<RawRecord>;

    fn next(&mut self) -> Option<Result<RawRecord>> {
        let row = match self.records.next()? {
            Ok(row) => row,
            Err(e) => return Some(Err(e.into())),
        };
        // Rows have as many fields as the header, the reader rejects anything else.
        let field = |i: usize| row.get(i).unwrap_or_default();
        Some(Ok(RawRecord::new(
            field(self.fields.sample),
            field(self.fields.population),
            field(self.fields.genotype),
        )))
    }
}

/// Configures how a marker file's columns are found.
#[derive(Clone, Debug)]
pub struct MarkerCsvBuilder {
    delimiter: u8,
    sample_field: Option<String>,
    population_field: String,
    genotype_prefix: String,
}

impl Default for MarkerCsvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkerCsvBuilder {
    /// Construct a new marker CSV builder
    ///
    /// Samples are read from the first column unless `sample_field` names another one.
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            sample_field: None,
            population_field: POPULATION_FIELD.to_owned(),
            genotype_prefix: GENOTYPE_PREFIX.to_owned(),
        }
    }

    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.delimiter = delimiter;
        self
    }

    pub fn sample_field(&mut self, sample_field: &str) -> &mut Self {
        self.sample_field = Some(sample_field.to_owned());
        self
    }

    pub fn population_field(&mut self, population_field: &str) -> &mut Self {
        self.population_field = population_field.to_owned();
        self
    }

    pub fn genotype_prefix(&mut self, genotype_prefix: &str) -> &mut Self {
        self.genotype_prefix = genotype_prefix.to_owned();
        self
    }

    pub fn from_reader(&self, reader: Box<dyn Read>) -> Result<MarkerCsv> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .delimiter(self.delimiter)
            .from_reader(reader);

        let headers = rdr.headers()?.clone();
        let exact = |name: &str| {
            headers
                .iter()
                .position(|h| h == name)
                .ok_or_else(|| Error::MissingColumn(format!("'{}'", name)))
        };

        let sample = match &self.sample_field {
            Some(name) => exact(name)?,
            None if headers.is_empty() => return Err(Error::MissingColumn("sample".into())),
            None => 0,
        };
        let fields = Fields {
            sample,
            population: exact(&self.population_field)?,
            genotype: locate_prefixed_column(headers.iter(), &self.genotype_prefix)?,
        };

        Ok(MarkerCsv {
            records: rdr.into_records(),
            fields,
        })
    }

    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<MarkerCsv> {
        let file = File::open(path)?;
        self.from_reader(Box::new(file))
    }
}

/// Locates marker files on disk.
///
/// The file of marker `rs699` is `<prefix>rs699<extension>`.
#[derive(Clone, Debug)]
pub struct MarkerSource {
    prefix: String,
    extension: String,
    csv: MarkerCsvBuilder,
}

impl MarkerSource {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_owned(),
            extension: ".csv".to_owned(),
            csv: MarkerCsvBuilder::new(),
        }
    }

    pub fn extension(&mut self, extension: &str) -> &mut Self {
        self.extension = extension.to_owned();
        self
    }

    pub fn csv(&mut self, csv: MarkerCsvBuilder) -> &mut Self {
        self.csv = csv;
        self
    }

    pub fn path(&self, marker: &str) -> PathBuf {
        PathBuf::from(format!("{}{}{}", self.prefix, marker, self.extension))
    }

    pub fn load(&self, marker: &str) -> Result<MarkerDataset> {
        let path = self.path(marker);
        info!("Loading {} from {}", marker, path.display());
        MarkerDataset::build(marker, self.csv.from_path(&path)?)
    }

    /// Loads every marker and joins them, in the given order.
    pub fn load_all<I, S>(&self, markers: I) -> Result<AggregateTable>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let datasets = markers
            .into_iter()
            .map(|m| self.load(m.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        AggregateTable::build(datasets)
    }
}
