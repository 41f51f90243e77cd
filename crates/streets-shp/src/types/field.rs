//! dBASE field descriptors and values.

use std::fmt;

/// dBASE field type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C`: fixed-width text.
    Character,
    /// `N`: ASCII decimal number.
    Numeric,
    /// `F`: ASCII floating-point number.
    Float,
    /// `L`: single-byte boolean.
    Logical,
    /// `D`: `YYYYMMDD` date.
    Date,
}

impl FieldType {
    /// Parse the type byte of a field descriptor.
    #[must_use]
    pub const fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'C' => Some(Self::Character),
            b'N' => Some(Self::Numeric),
            b'F' => Some(Self::Float),
            b'L' => Some(Self::Logical),
            b'D' => Some(Self::Date),
            _ => None,
        }
    }

    /// Type byte written to the field descriptor.
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        match self {
            Self::Character => b'C',
            Self::Numeric => b'N',
            Self::Float => b'F',
            Self::Logical => b'L',
            Self::Date => b'D',
        }
    }

    /// Whether values are stored as ASCII numbers.
    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(self, Self::Numeric | Self::Float)
    }
}

/// A `.dbf` field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbfField {
    /// Field name (at most 10 bytes on disk).
    pub name: String,
    /// Field type.
    pub field_type: FieldType,
    /// Field width in bytes.
    pub length: u8,
    /// Digits after the decimal point (numeric fields only).
    pub decimal_count: u8,
}

impl DbfField {
    /// Create a character field.
    pub fn character(name: impl Into<String>, length: u8) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Character,
            length,
            decimal_count: 0,
        }
    }

    /// Create a numeric field.
    pub fn numeric(name: impl Into<String>, length: u8, decimal_count: u8) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Numeric,
            length,
            decimal_count,
        }
    }

    /// Create a logical field.
    pub fn logical(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Logical,
            length: 1,
            decimal_count: 0,
        }
    }

    /// Create a date field.
    pub fn date(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            field_type: FieldType::Date,
            length: 8,
            decimal_count: 0,
        }
    }

    /// Whether the field holds whole numbers.
    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.field_type.is_numeric() && self.decimal_count == 0
    }
}

/// One attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Blank field.
    Null,
    /// Character value (trailing padding removed).
    Character(String),
    /// Numeric or float value.
    Numeric(f64),
    /// Logical value.
    Logical(bool),
    /// Date in `YYYYMMDD` form.
    Date(String),
}

impl FieldValue {
    /// Create a character value.
    pub fn character(value: impl Into<String>) -> Self {
        Self::Character(value.into())
    }

    /// Create a numeric value.
    #[must_use]
    pub fn numeric(value: f64) -> Self {
        Self::Numeric(value)
    }

    /// Whether the value is null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Borrow the text of a character or date value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Character(s) | Self::Date(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value, if any.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Numeric(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Character(s) | Self::Date(s) => f.write_str(s),
            Self::Numeric(v) => write!(f, "{v}"),
            Self::Logical(b) => f.write_str(if *b { "T" } else { "F" }),
        }
    }
}
