//! Shapefile reader.
//!
//! Reads the `.shp` geometries, the `.dbf` attribute table and the optional
//! `.cpg` code page of one dataset into a [`Shapefile`].

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::encoding::ShpEncoding;
use crate::error::{Result, ShpError};
use crate::header::{
    DBF_RECORD_DELETED, MAIN_HEADER_LEN, RECORD_HEADER_LEN, be_i32, parse_dbf_header,
    parse_field_descriptors, parse_main_header,
};
use crate::types::{DbfField, FieldType, FieldValue, Geometry, Shapefile, ShpReaderOptions};

/// Shapefile reader holding the raw sidecar contents.
pub struct ShpReader {
    shp: Vec<u8>,
    dbf: Vec<u8>,
    cpg: Option<String>,
    options: ShpReaderOptions,
}

impl ShpReader {
    /// Create a reader over in-memory file contents.
    pub fn from_bytes(shp: Vec<u8>, dbf: Vec<u8>, cpg: Option<String>) -> Self {
        Self {
            shp,
            dbf,
            cpg,
            options: ShpReaderOptions::default(),
        }
    }

    /// Open a dataset from the path of its `.shp` file.
    ///
    /// The `.dbf` and `.cpg` siblings are located by replacing the extension.
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_options(path, ShpReaderOptions::default())
    }

    /// Open a dataset with options.
    pub fn open_with_options(path: &Path, options: ShpReaderOptions) -> Result<Self> {
        let shp = read_required(path)?;
        let dbf = read_required(&path.with_extension("dbf"))?;
        let cpg_path = path.with_extension("cpg");
        let cpg = match fs::read_to_string(&cpg_path) {
            Ok(label) => Some(label),
            Err(e) if e.kind() == ErrorKind::NotFound => None,
            Err(e) => return Err(ShpError::Io(e)),
        };
        Ok(Self::from_bytes(shp, dbf, cpg).with_options(options))
    }

    /// Replace the reader options.
    #[must_use]
    pub fn with_options(mut self, options: ShpReaderOptions) -> Self {
        self.options = options;
        self
    }

    /// Parse the dataset.
    pub fn read_dataset(self) -> Result<Shapefile> {
        let encoding = match (self.options.encoding, self.cpg.as_deref()) {
            (Some(encoding), _) => encoding,
            (None, Some(label)) => ShpEncoding::from_label(label)?,
            (None, None) => ShpEncoding::Latin1,
        };

        let header = parse_main_header(&self.shp)?;
        let geometries = parse_geometries(&self.shp, header.file_length_words)?;
        let (fields, rows) = parse_dbf(&self.dbf, encoding)?;

        if geometries.len() != rows.len() {
            return Err(ShpError::RecordCountMismatch {
                geometries: geometries.len(),
                rows: rows.len(),
            });
        }

        debug!(
            shape_type = %header.shape_type,
            records = rows.len(),
            fields = fields.len(),
            encoding = %encoding,
            "shapefile parsed"
        );

        Ok(Shapefile {
            shape_type: header.shape_type,
            bbox: header.bbox,
            fields,
            geometries,
            rows,
            encoding,
        })
    }
}

/// Read a shapefile from the path of its `.shp` file.
pub fn read_shapefile(path: &Path) -> Result<Shapefile> {
    ShpReader::open(path)?.read_dataset()
}

/// Read a shapefile with options.
pub fn read_shapefile_with_options(path: &Path, options: ShpReaderOptions) -> Result<Shapefile> {
    ShpReader::open_with_options(path, options)?.read_dataset()
}

fn read_required(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| {
        if e.kind() == ErrorKind::NotFound {
            ShpError::FileNotFound {
                path: PathBuf::from(path),
            }
        } else {
            ShpError::Io(e)
        }
    })
}

/// Parse all geometry records following the main header.
fn parse_geometries(data: &[u8], file_length_words: i32) -> Result<Vec<Geometry>> {
    let declared = usize::try_from(file_length_words)
        .map_err(|_| ShpError::invalid_format("negative file length"))?
        * 2;
    if declared > data.len() {
        return Err(ShpError::invalid_format(format!(
            "header declares {declared} bytes but file has {}",
            data.len()
        )));
    }

    let mut geometries = Vec::new();
    let mut offset = MAIN_HEADER_LEN;
    while offset + RECORD_HEADER_LEN <= declared {
        let content_words = be_i32(data, offset + 4)?;
        let content_len = usize::try_from(content_words)
            .map_err(|_| ShpError::invalid_format("negative record length"))?
            * 2;
        let start = offset + RECORD_HEADER_LEN;
        let content = data.get(start..start + content_len).ok_or_else(|| {
            ShpError::invalid_format(format!(
                "record {} runs past end of file",
                geometries.len() + 1
            ))
        })?;
        geometries.push(Geometry::from_content(content.to_vec())?);
        offset = start + content_len;
    }
    Ok(geometries)
}

/// Parse the attribute table.
fn parse_dbf(data: &[u8], encoding: ShpEncoding) -> Result<(Vec<DbfField>, Vec<Vec<FieldValue>>)> {
    let header = parse_dbf_header(data)?;
    let fields = parse_field_descriptors(data, &header)?;

    let declared_len: usize = 1 + fields.iter().map(|f| usize::from(f.length)).sum::<usize>();
    let record_len = usize::from(header.record_length);
    if record_len < declared_len {
        return Err(ShpError::invalid_format(format!(
            "record length {record_len} smaller than field widths {declared_len}"
        )));
    }

    let mut rows = Vec::with_capacity(header.record_count as usize);
    let mut deleted = 0usize;
    let mut offset = usize::from(header.header_length);
    for record in 0..header.record_count as usize {
        let bytes = data.get(offset..offset + record_len).ok_or_else(|| {
            ShpError::invalid_format(format!("dbf record {} truncated", record + 1))
        })?;
        if bytes[0] == DBF_RECORD_DELETED {
            deleted += 1;
        }
        let mut pos = 1usize;
        let mut row = Vec::with_capacity(fields.len());
        for field in &fields {
            let width = usize::from(field.length);
            let raw = &bytes[pos..pos + width];
            row.push(decode_value(raw, field, encoding, record)?);
            pos += width;
        }
        rows.push(row);
        offset += record_len;
    }

    if deleted > 0 {
        debug!(deleted, "dbf contains records flagged as deleted");
    }
    Ok((fields, rows))
}

/// Decode one fixed-width field.
fn decode_value(
    raw: &[u8],
    field: &DbfField,
    encoding: ShpEncoding,
    record: usize,
) -> Result<FieldValue> {
    match field.field_type {
        FieldType::Character => {
            let text = encoding.decode(raw).ok_or_else(|| ShpError::InvalidText {
                record,
                field: field.name.clone(),
                encoding,
            })?;
            let trimmed = text.trim_end_matches([' ', '\0']);
            if trimmed.is_empty() {
                Ok(FieldValue::Null)
            } else {
                Ok(FieldValue::Character(trimmed.to_string()))
            }
        }
        FieldType::Numeric | FieldType::Float => {
            let text = ascii_trimmed(raw);
            if text.is_empty() || text.chars().all(|ch| ch == '*') {
                return Ok(FieldValue::Null);
            }
            text.parse::<f64>().map(FieldValue::Numeric).map_err(|_| {
                ShpError::invalid_format(format!(
                    "record {record}, field {}: invalid number {text:?}",
                    field.name
                ))
            })
        }
        FieldType::Logical => Ok(match raw.first().copied() {
            Some(b'T' | b't' | b'Y' | b'y') => FieldValue::Logical(true),
            Some(b'F' | b'f' | b'N' | b'n') => FieldValue::Logical(false),
            _ => FieldValue::Null,
        }),
        FieldType::Date => {
            let text = ascii_trimmed(raw);
            if text.is_empty() || text.chars().all(|ch| ch == '0') {
                Ok(FieldValue::Null)
            } else {
                Ok(FieldValue::Date(text))
            }
        }
    }
}

fn ascii_trimmed(raw: &[u8]) -> String {
    raw.iter()
        .map(|&b| char::from(b))
        .collect::<String>()
        .trim_matches([' ', '\0'])
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_blank_character_as_null() {
        let field = DbfField::character("name", 5);
        let value = decode_value(b"     ", &field, ShpEncoding::Utf8, 0).unwrap();
        assert_eq!(value, FieldValue::Null);
    }

    #[test]
    fn decodes_latin1_character() {
        let field = DbfField::character("name", 6);
        let value = decode_value(b"S\xE3o   ", &field, ShpEncoding::Latin1, 0).unwrap();
        assert_eq!(value, FieldValue::character("São"));
    }

    #[test]
    fn rejects_invalid_utf8() {
        let field = DbfField::character("name", 3);
        let err = decode_value(b"S\xE3o", &field, ShpEncoding::Utf8, 7).unwrap_err();
        assert!(matches!(err, ShpError::InvalidText { record: 7, .. }));
    }

    #[test]
    fn decodes_numbers_and_missing_numbers() {
        let field = DbfField::numeric("version", 6, 0);
        assert_eq!(
            decode_value(b"    12", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Numeric(12.0)
        );
        assert_eq!(
            decode_value(b"      ", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Null
        );
        assert_eq!(
            decode_value(b"******", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Null
        );
        assert!(decode_value(b"  12a ", &field, ShpEncoding::Utf8, 0).is_err());
    }

    #[test]
    fn decodes_logical_values() {
        let field = DbfField::logical("active");
        assert_eq!(
            decode_value(b"T", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Logical(true)
        );
        assert_eq!(
            decode_value(b"n", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Logical(false)
        );
        assert_eq!(
            decode_value(b"?", &field, ShpEncoding::Utf8, 0).unwrap(),
            FieldValue::Null
        );
    }
}
