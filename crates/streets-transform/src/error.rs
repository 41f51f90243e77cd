use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("missing column `{name}`")]
    MissingColumn { name: String },
    #[error("column `{column}` has type {dtype}, expected {expected}")]
    UnexpectedType {
        column: String,
        dtype: String,
        expected: &'static str,
    },
    #[error(transparent)]
    Polars(#[from] polars::prelude::PolarsError),
}

impl TransformError {
    pub fn missing_column(name: impl Into<String>) -> Self {
        Self::MissingColumn { name: name.into() }
    }
}

pub type Result<T> = std::result::Result<T, TransformError>;
