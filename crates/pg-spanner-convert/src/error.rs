//! Error types for the schema conversion library.

use thiserror::Error;

/// Main error type for conversion operations.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Configuration error (invalid YAML, bad field values, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A source table name could not be mapped to a target name
    #[error("Table not found: {0}")]
    TableNotFound(String),

    /// A source column name could not be mapped to a target name
    #[error("Column {column} not found in table {table}")]
    ColumnNotFound { table: String, column: String },

    /// Identifier cannot be turned into a legal target identifier
    #[error("Invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConvertError {
    /// Create a ColumnNotFound error
    pub fn column_not_found(table: impl Into<String>, column: impl Into<String>) -> Self {
        ConvertError::ColumnNotFound {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, ConvertError>;
