//! Shapefile writer.
//!
//! Writes the `.shp`, `.shx` and `.dbf` files of one dataset, plus a `.cpg`
//! naming the attribute encoding when writing to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::encoding::ShpEncoding;
use crate::error::{Result, ShpError};
use crate::header::{
    DBF_BLOCK_LEN, DBF_EOF, DBF_HEADER_TERMINATOR, DBF_RECORD_LIVE, DbfHeader, MAIN_HEADER_LEN,
    MAX_CHARACTER_LEN, MainHeader, RECORD_HEADER_LEN, build_dbf_header, build_field_descriptor,
    build_main_header, build_record_header, truncate_field_name,
};
use crate::types::{DbfField, FieldType, FieldValue, ShapeType, Shapefile, ShpWriterOptions};

/// Widest numeric field a single descriptor byte can declare.
const MAX_NUMERIC_LEN: usize = 255;

/// Shapefile writer over the three binary sidecars.
pub struct ShpWriter<W: Write> {
    shp: BufWriter<W>,
    shx: BufWriter<W>,
    dbf: BufWriter<W>,
    options: ShpWriterOptions,
}

impl<W: Write> ShpWriter<W> {
    /// Create a writer with default options.
    pub fn new(shp: W, shx: W, dbf: W) -> Self {
        Self::with_options(shp, shx, dbf, ShpWriterOptions::default())
    }

    /// Create a writer with options.
    pub fn with_options(shp: W, shx: W, dbf: W, options: ShpWriterOptions) -> Self {
        Self {
            shp: BufWriter::new(shp),
            shx: BufWriter::new(shx),
            dbf: BufWriter::new(dbf),
            options,
        }
    }

    /// Write a dataset.
    pub fn write_dataset(self, dataset: &Shapefile) -> Result<()> {
        validate_dataset(dataset)?;
        let fields = encode_fields(dataset, self.options.encoding)?;
        self.write_encoded(dataset, &fields)
    }

    /// Write a dataset whose fields were already validated and encoded.
    fn write_encoded(mut self, dataset: &Shapefile, fields: &[EncodedField]) -> Result<()> {
        self.write_geometries(dataset)?;
        self.write_attributes(dataset.num_records(), fields)?;

        self.shp.flush()?;
        self.shx.flush()?;
        self.dbf.flush()?;
        debug!(
            records = dataset.num_records(),
            fields = fields.len(),
            encoding = %self.options.encoding,
            "shapefile written"
        );
        Ok(())
    }

    /// Write the `.shp` records and their `.shx` index entries.
    fn write_geometries(&mut self, dataset: &Shapefile) -> Result<()> {
        let mut bbox = dataset.bbox;
        bbox.recompute_xy(&dataset.geometries);

        let shp_bytes = MAIN_HEADER_LEN
            + dataset
                .geometries
                .iter()
                .map(|g| RECORD_HEADER_LEN + g.content().len())
                .sum::<usize>();
        let shx_bytes = MAIN_HEADER_LEN + RECORD_HEADER_LEN * dataset.geometries.len();

        self.shp.write_all(&build_main_header(&MainHeader {
            file_length_words: to_words(shp_bytes)?,
            shape_type: dataset.shape_type,
            bbox,
        }))?;
        self.shx.write_all(&build_main_header(&MainHeader {
            file_length_words: to_words(shx_bytes)?,
            shape_type: dataset.shape_type,
            bbox,
        }))?;

        let mut offset_words = to_words(MAIN_HEADER_LEN)?;
        for (idx, geometry) in dataset.geometries.iter().enumerate() {
            let number = i32::try_from(idx + 1)
                .map_err(|_| ShpError::invalid_format("too many records"))?;
            let content_words = geometry.content_words();
            self.shp
                .write_all(&build_record_header(number, content_words))?;
            self.shp.write_all(geometry.content())?;
            self.shx
                .write_all(&build_record_header(offset_words, content_words))?;
            offset_words += to_words(RECORD_HEADER_LEN)? + content_words;
        }
        Ok(())
    }

    /// Write the `.dbf` header, descriptors and records.
    fn write_attributes(&mut self, record_count: usize, fields: &[EncodedField]) -> Result<()> {
        let header_length = DBF_BLOCK_LEN * (fields.len() + 1) + 1;
        let record_length = 1 + fields
            .iter()
            .map(|f| usize::from(f.descriptor.length))
            .sum::<usize>();
        let header = DbfHeader {
            record_count: u32::try_from(record_count)
                .map_err(|_| ShpError::invalid_format("too many records for dbf"))?,
            header_length: u16::try_from(header_length)
                .map_err(|_| ShpError::invalid_format("too many fields for dbf"))?,
            record_length: u16::try_from(record_length)
                .map_err(|_| ShpError::invalid_format("dbf record too long"))?,
            last_update: Some(self.options.header_date()),
        };

        self.dbf.write_all(&build_dbf_header(&header))?;
        for field in fields {
            self.dbf
                .write_all(&build_field_descriptor(field.name.as_bytes(), &field.descriptor))?;
        }
        self.dbf.write_all(&[DBF_HEADER_TERMINATOR])?;

        let mut record = Vec::with_capacity(record_length);
        for row in 0..record_count {
            record.clear();
            record.push(DBF_RECORD_LIVE);
            for field in fields {
                let width = usize::from(field.descriptor.length);
                let cell = field.cells[row].as_deref().unwrap_or_default();
                let padding = width - cell.len();
                if field.descriptor.field_type.is_numeric() {
                    record.extend(std::iter::repeat_n(b' ', padding));
                    record.extend_from_slice(cell);
                } else {
                    record.extend_from_slice(cell);
                    record.extend(std::iter::repeat_n(b' ', padding));
                }
            }
            self.dbf.write_all(&record)?;
        }
        self.dbf.write_all(&[DBF_EOF])?;
        Ok(())
    }
}

impl ShpWriter<File> {
    /// Create the `.shp`, `.shx` and `.dbf` files next to `path`, and write
    /// the `.cpg` code page.
    pub fn create(path: &Path, options: ShpWriterOptions) -> Result<Self> {
        let shp = File::create(path.with_extension("shp"))?;
        let shx = File::create(path.with_extension("shx"))?;
        let dbf = File::create(path.with_extension("dbf"))?;
        fs::write(path.with_extension("cpg"), options.encoding.cpg_label())?;
        Ok(Self::with_options(shp, shx, dbf, options))
    }
}

/// Write a dataset to the shapefile at `path`.
///
/// The dataset is validated and encoded before any file is created, so a
/// rejected dataset leaves existing files untouched.
pub fn write_shapefile(path: &Path, dataset: &Shapefile, options: &ShpWriterOptions) -> Result<()> {
    validate_dataset(dataset)?;
    let fields = encode_fields(dataset, options.encoding)?;
    ShpWriter::create(path, options.clone())?.write_encoded(dataset, &fields)
}

/// Field descriptor with its on-disk name and encoded cells.
struct EncodedField {
    name: String,
    descriptor: DbfField,
    cells: Vec<Option<Vec<u8>>>,
}

/// Validate a dataset before writing.
fn validate_dataset(dataset: &Shapefile) -> Result<()> {
    if dataset.geometries.len() != dataset.rows.len() {
        return Err(ShpError::RecordCountMismatch {
            geometries: dataset.geometries.len(),
            rows: dataset.rows.len(),
        });
    }

    for row in &dataset.rows {
        if row.len() != dataset.fields.len() {
            return Err(ShpError::RowLengthMismatch {
                expected: dataset.fields.len(),
                actual: row.len(),
            });
        }
    }

    for (idx, geometry) in dataset.geometries.iter().enumerate() {
        let found = geometry.shape_type();
        if found != ShapeType::Null && found != dataset.shape_type {
            return Err(ShpError::MixedShapeTypes {
                record: idx + 1,
                expected: dataset.shape_type.to_string(),
                found: found.to_string(),
            });
        }
    }

    Ok(())
}

/// Encode every field, sizing widths to the data and truncating names.
fn encode_fields(dataset: &Shapefile, encoding: ShpEncoding) -> Result<Vec<EncodedField>> {
    let mut encoded: Vec<EncodedField> = Vec::with_capacity(dataset.fields.len());
    for (idx, field) in dataset.fields.iter().enumerate() {
        if field.name.trim().is_empty() || !field.name.is_ascii() {
            return Err(ShpError::invalid_field_name(&field.name));
        }
        let name = truncate_field_name(&field.name).to_string();
        if name != field.name {
            warn!(
                field = %field.name,
                truncated = %name,
                "field name exceeds 10 bytes and was truncated"
            );
        }
        if let Some(previous) = encoded
            .iter()
            .find(|other| other.name.eq_ignore_ascii_case(&name))
        {
            return Err(ShpError::FieldNameCollision {
                first: previous.descriptor.name.clone(),
                second: field.name.clone(),
                truncated: name,
            });
        }

        let cells = dataset
            .rows
            .iter()
            .map(|row| encode_cell(&row[idx], field, encoding))
            .collect::<Result<Vec<_>>>()?;
        let widest = cells.iter().flatten().map(Vec::len).max().unwrap_or(0);
        let length = match field.field_type {
            FieldType::Character => {
                if widest > MAX_CHARACTER_LEN {
                    return Err(ShpError::FieldTooWide {
                        field: field.name.clone(),
                        length: widest,
                        limit: MAX_CHARACTER_LEN,
                    });
                }
                widest.max(1)
            }
            FieldType::Numeric | FieldType::Float => {
                let width = widest.max(usize::from(field.length)).max(1);
                if width > MAX_NUMERIC_LEN {
                    return Err(ShpError::FieldTooWide {
                        field: field.name.clone(),
                        length: width,
                        limit: MAX_NUMERIC_LEN,
                    });
                }
                width
            }
            FieldType::Logical => 1,
            FieldType::Date => 8,
        };

        encoded.push(EncodedField {
            name,
            descriptor: DbfField {
                name: field.name.clone(),
                field_type: field.field_type,
                length: length as u8,
                decimal_count: if field.field_type.is_numeric() {
                    field.decimal_count
                } else {
                    0
                },
            },
            cells,
        });
    }
    Ok(encoded)
}

/// Encode one value for a field, `None` meaning a blank cell.
fn encode_cell(
    value: &FieldValue,
    field: &DbfField,
    encoding: ShpEncoding,
) -> Result<Option<Vec<u8>>> {
    let Some(text) = cell_text(value, field) else {
        return Ok(None);
    };
    encoding
        .encode(&text)
        .map(Some)
        .ok_or_else(|| ShpError::UnencodableText {
            field: field.name.clone(),
            encoding,
        })
}

/// Render a value as the text stored for the given field type.
fn cell_text(value: &FieldValue, field: &DbfField) -> Option<String> {
    match field.field_type {
        FieldType::Numeric | FieldType::Float => {
            let number = match value {
                FieldValue::Numeric(v) => *v,
                FieldValue::Character(s) => s.trim().parse::<f64>().ok()?,
                FieldValue::Logical(b) => f64::from(u8::from(*b)),
                FieldValue::Null | FieldValue::Date(_) => return None,
            };
            number
                .is_finite()
                .then(|| format_number(number, field.decimal_count))
        }
        FieldType::Character => match value {
            FieldValue::Null => None,
            FieldValue::Character(s) | FieldValue::Date(s) => Some(s.clone()),
            FieldValue::Numeric(v) => Some(format_plain(*v)),
            FieldValue::Logical(b) => Some(if *b { "T" } else { "F" }.to_string()),
        },
        FieldType::Logical => match value {
            FieldValue::Logical(b) => Some(if *b { "T" } else { "F" }.to_string()),
            _ => None,
        },
        FieldType::Date => {
            let digits: String = value.as_str()?.chars().filter(char::is_ascii_digit).collect();
            (digits.len() == 8).then_some(digits)
        }
    }
}

/// Format a number with a fixed count of decimals.
fn format_number(value: f64, decimals: u8) -> String {
    if decimals == 0 {
        format!("{}", value.round() as i64)
    } else {
        format!("{value:.prec$}", prec = usize::from(decimals))
    }
}

/// Format a number for a character field without a trailing `.0`.
fn format_plain(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

fn to_words(bytes: usize) -> Result<i32> {
    i32::try_from(bytes / 2).map_err(|_| ShpError::invalid_format("file exceeds 4 GB limit"))
}
