//! Reader and writer options.

use chrono::NaiveDate;

use crate::encoding::ShpEncoding;

/// Options for reading shapefiles.
#[derive(Debug, Clone, Default)]
pub struct ShpReaderOptions {
    /// Attribute encoding. When `None`, the `.cpg` sidecar decides, falling
    /// back to Latin-1 when there is none.
    pub encoding: Option<ShpEncoding>,
}

impl ShpReaderOptions {
    /// Create reader options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the attribute encoding, ignoring any `.cpg` file.
    #[must_use]
    pub fn with_encoding(mut self, encoding: ShpEncoding) -> Self {
        self.encoding = Some(encoding);
        self
    }
}

/// Options for writing shapefiles.
#[derive(Debug, Clone, Default)]
pub struct ShpWriterOptions {
    /// Attribute encoding, also written to the `.cpg` sidecar.
    pub encoding: ShpEncoding,
    /// Date stored in the `.dbf` header (default: today).
    pub last_update: Option<NaiveDate>,
}

impl ShpWriterOptions {
    /// Create writer options with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the attribute encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: ShpEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Set the `.dbf` header date.
    #[must_use]
    pub fn with_last_update(mut self, date: NaiveDate) -> Self {
        self.last_update = Some(date);
        self
    }

    /// Header date, resolving the default to the local date.
    #[must_use]
    pub fn header_date(&self) -> NaiveDate {
        self.last_update
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}
