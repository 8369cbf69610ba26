//! Error types for mispro-dataset organized by pipeline stage.

use crate::table::CompositeKey;
use thiserror::Error;

/// Dataset pipeline error variants organized by pipeline stage.
#[derive(Debug, Error)]
pub enum Error {
    /// Table loading stage error
    #[error(transparent)]
    Table(#[from] TableError),

    /// Phoneme map construction error
    #[error(transparent)]
    PhonemeMap(#[from] PhonemeMapError),

    /// Transcript payload parsing error
    #[error(transparent)]
    Transcript(#[from] TranscriptError),

    /// Record assembly error
    #[error(transparent)]
    Assembly(#[from] AssemblyError),

    /// Artifact read/write error
    #[error(transparent)]
    Artifact(#[from] ArtifactError),
}

/// Errors while reading the label and ASR tables.
#[derive(Debug, Error)]
pub enum TableError {
    /// Required column absent from the header row
    #[error("missing column in {table} table: {column}")]
    MissingColumn { table: &'static str, column: String },

    /// Field present but not parseable
    #[error("invalid {column} at {table} row {row}: {value:?}")]
    InvalidField {
        table: &'static str,
        row: usize,
        column: &'static str,
        value: String,
    },

    /// IO error while opening a table
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// CSV decoding error
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Errors while building the phoneme map.
#[derive(Debug, Error)]
pub enum PhonemeMapError {
    /// Dictionary uses a phone the inventory cannot translate
    #[error("unknown phone {phone:?} for word {word:?} at dictionary line {line}")]
    UnknownPhone {
        phone: String,
        word: String,
        line: usize,
    },

    /// IO error while reading the dictionary or inventory
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Inventory is not a JSON object of strings
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors while parsing an engine transcript payload.
#[derive(Debug, Error)]
pub enum TranscriptError {
    /// Payload JSON does not match the engine's format
    #[error("malformed {engine} payload for {key}: {source}")]
    Malformed {
        engine: String,
        key: CompositeKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors while joining label rows to ASR rows.
#[derive(Debug, Error)]
pub enum AssemblyError {
    /// Label row survived cleaning without a matching ASR row
    #[error("no ASR row for {0} after cleaning")]
    MissingAsrRow(CompositeKey),

    /// Engine column configured but absent from the ASR row
    #[error("ASR row {key} has no payload for engine {engine}")]
    MissingPayload { engine: String, key: CompositeKey },
}

/// Errors while saving or loading the dataset artifact.
#[derive(Debug, Error)]
pub enum ArtifactError {
    /// IO error on the artifact file
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// bincode encoding error
    #[error(transparent)]
    Encode(#[from] bincode::error::EncodeError),

    /// bincode decoding error
    #[error(transparent)]
    Decode(#[from] bincode::error::DecodeError),
}

/// Result type alias for mispro-dataset operations.
pub type Result<T> = std::result::Result<T, Error>;

// Nested From implementations for automatic error conversion chains

// csv::Error → TableError → Error
impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        Error::Table(TableError::Csv(e))
    }
}

// bincode::error::EncodeError → ArtifactError → Error
impl From<bincode::error::EncodeError> for Error {
    fn from(e: bincode::error::EncodeError) -> Self {
        Error::Artifact(ArtifactError::Encode(e))
    }
}

// bincode::error::DecodeError → ArtifactError → Error
impl From<bincode::error::DecodeError> for Error {
    fn from(e: bincode::error::DecodeError) -> Self {
        Error::Artifact(ArtifactError::Decode(e))
    }
}
