//! Error types for shapefile operations.

use std::path::PathBuf;
use thiserror::Error;

use crate::encoding::ShpEncoding;

/// Errors that can occur when reading or writing shapefiles.
#[derive(Debug, Error)]
pub enum ShpError {
    /// File not found.
    #[error("file not found: {path}")]
    FileNotFound { path: PathBuf },

    /// Invalid shapefile structure.
    #[error("invalid shapefile: {message}")]
    InvalidFormat { message: String },

    /// Code page label that is not supported.
    #[error("unsupported encoding: {label}")]
    UnsupportedEncoding { label: String },

    /// Attribute bytes that do not decode in the dataset encoding.
    #[error("record {record}, field {field}: text is not valid {encoding}")]
    InvalidText {
        record: usize,
        field: String,
        encoding: ShpEncoding,
    },

    /// Attribute text that has no representation in the target encoding.
    #[error("field {field}: value cannot be encoded as {encoding}")]
    UnencodableText {
        field: String,
        encoding: ShpEncoding,
    },

    /// Encoded value wider than a dBASE field can hold.
    #[error("field {field}: value of {length} bytes exceeds the {limit} byte limit")]
    FieldTooWide {
        field: String,
        length: usize,
        limit: usize,
    },

    /// Field name that is empty or not representable.
    #[error("invalid field name: {name:?}")]
    InvalidFieldName { name: String },

    /// Two field names that become identical after truncation.
    #[error("field names {first} and {second} both truncate to {truncated}")]
    FieldNameCollision {
        first: String,
        second: String,
        truncated: String,
    },

    /// Row length mismatch.
    #[error("row length mismatch: expected {expected}, got {actual}")]
    RowLengthMismatch { expected: usize, actual: usize },

    /// Geometry and attribute record counts differ.
    #[error("record count mismatch: {geometries} geometries, {rows} attribute rows")]
    RecordCountMismatch { geometries: usize, rows: usize },

    /// Geometry whose shape type differs from the dataset shape type.
    #[error("record {record}: shape type {found} does not match dataset type {expected}")]
    MixedShapeTypes {
        record: usize,
        expected: String,
        found: String,
    },

    /// Polars conversion error.
    #[cfg(feature = "polars")]
    #[error("polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for shapefile operations.
pub type Result<T> = std::result::Result<T, ShpError>;

impl ShpError {
    /// Create an InvalidFormat error.
    pub fn invalid_format(message: impl Into<String>) -> Self {
        Self::InvalidFormat {
            message: message.into(),
        }
    }

    /// Create an UnsupportedEncoding error.
    pub fn unsupported_encoding(label: impl Into<String>) -> Self {
        Self::UnsupportedEncoding {
            label: label.into(),
        }
    }

    /// Create an InvalidFieldName error.
    pub fn invalid_field_name(name: impl Into<String>) -> Self {
        Self::InvalidFieldName { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ShpError::invalid_format("bad file code 42");
        assert_eq!(format!("{err}"), "invalid shapefile: bad file code 42");

        let err = ShpError::InvalidText {
            record: 3,
            field: "name".to_string(),
            encoding: ShpEncoding::Utf8,
        };
        assert_eq!(
            format!("{err}"),
            "record 3, field name: text is not valid UTF-8"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let shp_err: ShpError = io_err.into();
        assert!(matches!(shp_err, ShpError::Io(_)));
    }
}
