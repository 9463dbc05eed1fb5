//! TOML description of a run: where the marker files live, which markers
//! to join and which tables to print.
//!
//! ```toml
//! prefix = "./373507-SampleGenotypes-Homo_sapiens_Variation_Sample_"
//! markers = ["rs699", "rs4762", "rs11122576"]
//!
//! [[two_way]]
//! a = "rs4762"
//! b = "rs11122576"
//!
//! [[three_way]]
//! condition = "rs699"
//! category = "G|G"
//! a = "rs4762"
//! b = "rs11122576"
//! ```

use crate::observable::{MarkerCsvBuilder, MarkerSource};
use crate::prelude::*;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Marker files are read from `<prefix><marker><extension>`.
    pub prefix: String,
    pub markers: Vec<String>,
    #[serde(default = "default_print_categories")]
    pub print_categories: bool,
    #[serde(default)]
    pub csv: CsvConfig,
    #[serde(default)]
    pub two_way: Vec<TwoWayQuery>,
    #[serde(default)]
    pub three_way: Vec<ThreeWayQuery>,
}

fn default_print_categories() -> bool {
    true
}

/// Overrides for the marker file layout.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CsvConfig {
    pub delimiter: Option<String>,
    pub sample_field: Option<String>,
    pub population_field: Option<String>,
    pub genotype_prefix: Option<String>,
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TwoWayQuery {
    pub a: String,
    pub b: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThreeWayQuery {
    pub condition: String,
    pub category: String,
    pub a: String,
    pub b: String,
}

impl FromStr for Config {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl Config {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        fs::read_to_string(path)?.parse()
    }

    fn validate(&self) -> Result<()> {
        if self.markers.is_empty() {
            return Err(Error::InvalidConfig("no markers listed".into()));
        }
        for (i, marker) in self.markers.iter().enumerate() {
            if self.markers[..i].contains(marker) {
                return Err(Error::InvalidConfig(format!(
                    "marker '{}' is listed twice",
                    marker
                )));
            }
        }
        let queried = self
            .two_way
            .iter()
            .flat_map(|q| [&q.a, &q.b])
            .chain(self.three_way.iter().flat_map(|q| [&q.condition, &q.a, &q.b]));
        for marker in queried {
            if !self.markers.contains(marker) {
                return Err(Error::InvalidConfig(format!(
                    "query on '{}', which is not in markers",
                    marker
                )));
            }
        }
        self.delimiter().map(|_| ())
    }

    fn delimiter(&self) -> Result<Option<u8>> {
        match self.csv.delimiter.as_deref() {
            None => Ok(None),
            Some(d) if d.len() == 1 => Ok(Some(d.as_bytes()[0])),
            Some("\\t") => Ok(Some(b'\t')),
            Some(d) => Err(Error::InvalidConfig(format!(
                "delimiter '{}' is not a single byte",
                d
            ))),
        }
    }

    /// The loader described by `prefix` and the `[csv]` table.
    pub fn source(&self) -> Result<MarkerSource> {
        let mut csv = MarkerCsvBuilder::new();
        if let Some(delimiter) = self.delimiter()? {
            csv.delimiter(delimiter);
        }
        if let Some(field) = &self.csv.sample_field {
            csv.sample_field(field);
        }
        if let Some(field) = &self.csv.population_field {
            csv.population_field(field);
        }
        if let Some(prefix) = &self.csv.genotype_prefix {
            csv.genotype_prefix(prefix);
        }

        let mut source = MarkerSource::new(&self.prefix);
        source.csv(csv);
        if let Some(extension) = &self.csv.extension {
            source.extension(extension);
        }
        Ok(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::path::PathBuf;

    const RUN: &str = r#"
prefix = "./373507-SampleGenotypes-Homo_sapiens_Variation_Sample_"
markers = ["rs699", "rs4762", "rs11122576"]

[[two_way]]
a = "rs4762"
b = "rs11122576"

[[three_way]]
condition = "rs699"
category = "G|G"
a = "rs4762"
b = "rs11122576"
"#;

    #[test]
    fn test_parse_run() -> Result<(), Box<dyn Error>> {
        let config: Config = RUN.parse()?;
        assert_eq!(config.markers, vec!["rs699", "rs4762", "rs11122576"]);
        assert!(config.print_categories);
        assert_eq!(config.csv, CsvConfig::default());
        assert_eq!(
            config.two_way,
            vec![TwoWayQuery {
                a: "rs4762".into(),
                b: "rs11122576".into()
            }]
        );
        assert_eq!(config.three_way[0].category, "G|G");
        assert_eq!(
            config.source()?.path("rs699"),
            PathBuf::from("./373507-SampleGenotypes-Homo_sapiens_Variation_Sample_rs699.csv")
        );
        Ok(())
    }

    #[test]
    fn test_csv_overrides() -> Result<(), Box<dyn Error>> {
        let config: Config = r#"
prefix = "data/"
markers = ["rs1"]
print_categories = false

[csv]
delimiter = "\t"
extension = ".tsv"
"#
        .parse()?;
        assert!(!config.print_categories);
        assert_eq!(config.source()?.path("rs1"), PathBuf::from("data/rs1.tsv"));
        Ok(())
    }

    #[test]
    fn test_query_on_unlisted_marker() {
        let result = "prefix = \"\"\nmarkers = [\"rs1\"]\n[[two_way]]\na = \"rs1\"\nb = \"rs2\"\n"
            .parse::<Config>();
        assert!(matches!(result, Err(crate::Error::InvalidConfig(_))));
    }

    #[test]
    fn test_bad_delimiter_and_empty_markers() {
        let delimiter =
            "prefix = \"\"\nmarkers = [\"rs1\"]\n[csv]\ndelimiter = \";;\"\n".parse::<Config>();
        assert!(matches!(delimiter, Err(crate::Error::InvalidConfig(_))));
        let empty = "prefix = \"\"\nmarkers = []\n".parse::<Config>();
        assert!(matches!(empty, Err(crate::Error::InvalidConfig(_))));
    }

    #[test]
    fn test_repeated_marker() {
        let result = "prefix = \"\"\nmarkers = [\"rs699\", \"rs4762\", \"rs699\"]\n"
            .parse::<Config>();
        assert!(matches!(
            result,
            Err(crate::Error::InvalidConfig(ref reason)) if reason.contains("rs699")
        ));
    }

    #[test]
    fn test_malformed_toml() {
        assert!(matches!(
            "prefix = ".parse::<Config>(),
            Err(crate::Error::Config(_))
        ));
        assert!(matches!(
            "prefix = \"\"\nmarkers = [\"rs1\"]\ncolour = 1\n".parse::<Config>(),
            Err(crate::Error::Config(_))
        ));
    }

    #[test]
    fn test_from_path() -> Result<(), Box<dyn Error>> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("run.toml");
        std::fs::write(&path, RUN)?;
        assert_eq!(Config::from_path(&path)?, RUN.parse::<Config>()?);
        Ok(())
    }
}
