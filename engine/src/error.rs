use demandas_shared::TableKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Could not decode both sources with any of the encodings tried: {}", attempted.join(", "))]
    Decoding { attempted: Vec<String> },

    #[error("Malformed {table} source: required column '{column}' is missing")]
    MalformedSource { table: TableKind, column: String },

    #[error("CSV parsing system error: {source}")]
    CsvSystemError {
        #[from]
        source: csv::Error,
    },

    #[error("I/O error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },

    #[error("Spreadsheet error: {source}")]
    Spreadsheet {
        #[from]
        source: calamine::Error,
    },

    #[error("Spreadsheet has no worksheet")]
    EmptyWorkbook,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Configuration parse error: {source}")]
    ConfigParse {
        #[from]
        source: serde_json::Error,
    },
}

impl EngineError {
    /// True when the failure means the file could not be read at all, as
    /// opposed to a file that was read but has an unusable schema.
    pub fn is_unreadable_source(&self) -> bool {
        matches!(
            self,
            EngineError::Decoding { .. }
                | EngineError::CsvSystemError { .. }
                | EngineError::IoError { .. }
                | EngineError::Spreadsheet { .. }
                | EngineError::EmptyWorkbook
        )
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
