use thiserror::Error;

/// Everything that can go wrong while loading, joining or querying genotype data.
#[derive(Error, Debug)]
pub enum Error {
    /// Raw marker input lacks a required column.
    #[error("no {0} column found in the input")]
    MissingColumn(String),

    /// The same sample appears twice in one marker's input.
    #[error("sample '{sample}' appears more than once for marker '{marker}'")]
    DuplicateSample { marker: String, sample: String },

    /// A marker's sample set differs from the table's.
    #[error("samples of marker '{marker}' do not match the table ({reason})")]
    IndexMismatch { marker: String, reason: String },

    #[error("marker '{0}' is not part of the table")]
    UnknownMarker(String),

    #[error("'{category}' is not an observed category of marker '{marker}'")]
    UnknownCategory { marker: String, category: String },

    #[error("sample '{0}' is not part of the table")]
    UnknownSample(String),

    #[error("cannot build a table without any marker")]
    NoMarkers,

    #[error("marker '{0}' is already part of the table")]
    DuplicateMarker(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Config(#[from] toml::de::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
