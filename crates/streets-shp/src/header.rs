//! Header layouts for the `.shp`, `.shx` and `.dbf` files.
//!
//! # Main file header (`.shp` and `.shx`, 100 bytes)
//!
//! | Offset | Length | Field       | Byte order |
//! |--------|--------|-------------|------------|
//! | 0      | 4      | File code (9994) | big    |
//! | 24     | 4      | File length in 16-bit words | big |
//! | 28     | 4      | Version (1000) | little  |
//! | 32     | 4      | Shape type  | little     |
//! | 36     | 64     | Xmin, Ymin, Xmax, Ymax, Zmin, Zmax, Mmin, Mmax | little |
//!
//! # dBASE III header (`.dbf`, 32 bytes + 32 per field + terminator)
//!
//! | Offset | Length | Field                     |
//! |--------|--------|---------------------------|
//! | 0      | 1      | Version (0x03)            |
//! | 1      | 3      | Last update (YY+1900, MM, DD) |
//! | 4      | 4      | Record count (LE)         |
//! | 8      | 2      | Header length (LE)        |
//! | 10     | 2      | Record length (LE)        |

use chrono::{Datelike, NaiveDate};

use crate::error::{Result, ShpError};
use crate::types::{BoundingBox, DbfField, FieldType, ShapeType};

/// Main file header length in bytes.
pub const MAIN_HEADER_LEN: usize = 100;

/// Record header length in bytes (record number + content length).
pub const RECORD_HEADER_LEN: usize = 8;

/// Magic number at the start of `.shp` and `.shx` files.
pub const FILE_CODE: i32 = 9994;

/// Shapefile format version.
pub const SHP_VERSION: i32 = 1000;

/// dBASE III version byte without memo.
pub const DBF_VERSION: u8 = 0x03;

/// Length of the fixed dBASE header and of each field descriptor.
pub const DBF_BLOCK_LEN: usize = 32;

/// Byte terminating the field descriptor array.
pub const DBF_HEADER_TERMINATOR: u8 = 0x0D;

/// Byte marking the end of the record area.
pub const DBF_EOF: u8 = 0x1A;

/// Deletion flag of a live record.
pub const DBF_RECORD_LIVE: u8 = b' ';

/// Deletion flag of a deleted record.
pub const DBF_RECORD_DELETED: u8 = b'*';

/// Maximum field name length in bytes.
pub const MAX_FIELD_NAME_LEN: usize = 10;

/// Maximum width of a character field in bytes.
pub const MAX_CHARACTER_LEN: usize = 254;

/// Parsed `.shp`/`.shx` header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MainHeader {
    /// Total file length in 16-bit words, header included.
    pub file_length_words: i32,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
}

/// Parse a main file header.
pub fn parse_main_header(data: &[u8]) -> Result<MainHeader> {
    if data.len() < MAIN_HEADER_LEN {
        return Err(ShpError::invalid_format("main file header too short"));
    }
    let file_code = be_i32(data, 0)?;
    if file_code != FILE_CODE {
        return Err(ShpError::invalid_format(format!(
            "bad file code {file_code}, expected {FILE_CODE}"
        )));
    }
    let version = le_i32(data, 28)?;
    if version != SHP_VERSION {
        return Err(ShpError::invalid_format(format!(
            "unsupported version {version}"
        )));
    }
    let code = le_i32(data, 32)?;
    let shape_type = ShapeType::from_code(code)
        .ok_or_else(|| ShpError::invalid_format(format!("unknown shape type code {code}")))?;
    let bbox = BoundingBox {
        x_min: le_f64(data, 36)?,
        y_min: le_f64(data, 44)?,
        x_max: le_f64(data, 52)?,
        y_max: le_f64(data, 60)?,
        z_min: le_f64(data, 68)?,
        z_max: le_f64(data, 76)?,
        m_min: le_f64(data, 84)?,
        m_max: le_f64(data, 92)?,
    };
    Ok(MainHeader {
        file_length_words: be_i32(data, 24)?,
        shape_type,
        bbox,
    })
}

/// Build a main file header.
#[must_use]
pub fn build_main_header(header: &MainHeader) -> [u8; MAIN_HEADER_LEN] {
    let mut out = [0u8; MAIN_HEADER_LEN];
    out[0..4].copy_from_slice(&FILE_CODE.to_be_bytes());
    out[24..28].copy_from_slice(&header.file_length_words.to_be_bytes());
    out[28..32].copy_from_slice(&SHP_VERSION.to_le_bytes());
    out[32..36].copy_from_slice(&header.shape_type.code().to_le_bytes());
    let bbox = &header.bbox;
    let values = [
        bbox.x_min, bbox.y_min, bbox.x_max, bbox.y_max, bbox.z_min, bbox.z_max, bbox.m_min,
        bbox.m_max,
    ];
    for (idx, value) in values.iter().enumerate() {
        let start = 36 + idx * 8;
        out[start..start + 8].copy_from_slice(&value.to_le_bytes());
    }
    out
}

/// Build a record header (1-based record number, content length in words).
#[must_use]
pub fn build_record_header(first: i32, second: i32) -> [u8; RECORD_HEADER_LEN] {
    let mut out = [0u8; RECORD_HEADER_LEN];
    out[0..4].copy_from_slice(&first.to_be_bytes());
    out[4..8].copy_from_slice(&second.to_be_bytes());
    out
}

/// Parsed fixed part of a `.dbf` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbfHeader {
    pub record_count: u32,
    pub header_length: u16,
    pub record_length: u16,
    pub last_update: Option<NaiveDate>,
}

/// Parse the fixed 32-byte `.dbf` header.
pub fn parse_dbf_header(data: &[u8]) -> Result<DbfHeader> {
    if data.len() < DBF_BLOCK_LEN {
        return Err(ShpError::invalid_format("dbf header too short"));
    }
    // Only the low bits carry the dBASE level; memo flags are ignored.
    if data[0] & 0x07 != DBF_VERSION {
        return Err(ShpError::invalid_format(format!(
            "unsupported dbf version byte 0x{:02X}",
            data[0]
        )));
    }
    let last_update = NaiveDate::from_ymd_opt(
        1900 + i32::from(data[1]),
        u32::from(data[2]),
        u32::from(data[3]),
    );
    let header = DbfHeader {
        record_count: u32::from_le_bytes([data[4], data[5], data[6], data[7]]),
        header_length: u16::from_le_bytes([data[8], data[9]]),
        record_length: u16::from_le_bytes([data[10], data[11]]),
        last_update,
    };
    if usize::from(header.header_length) < DBF_BLOCK_LEN + 1 {
        return Err(ShpError::invalid_format("dbf header length too small"));
    }
    Ok(header)
}

/// Build the fixed 32-byte `.dbf` header.
#[must_use]
pub fn build_dbf_header(header: &DbfHeader) -> [u8; DBF_BLOCK_LEN] {
    let mut out = [0u8; DBF_BLOCK_LEN];
    out[0] = DBF_VERSION;
    if let Some(date) = header.last_update {
        out[1] = (date.year() - 1900).clamp(0, 255) as u8;
        out[2] = date.month() as u8;
        out[3] = date.day() as u8;
    }
    out[4..8].copy_from_slice(&header.record_count.to_le_bytes());
    out[8..10].copy_from_slice(&header.header_length.to_le_bytes());
    out[10..12].copy_from_slice(&header.record_length.to_le_bytes());
    out
}

/// Parse the field descriptor array that follows the fixed header.
///
/// Field names are stored as NUL-padded ASCII; non-ASCII bytes are read as
/// Latin-1.
pub fn parse_field_descriptors(data: &[u8], header: &DbfHeader) -> Result<Vec<DbfField>> {
    let end = usize::from(header.header_length);
    if data.len() < end {
        return Err(ShpError::invalid_format("dbf file shorter than its header"));
    }
    let mut fields = Vec::new();
    let mut offset = DBF_BLOCK_LEN;
    while offset < end && data[offset] != DBF_HEADER_TERMINATOR {
        let block = data
            .get(offset..offset + DBF_BLOCK_LEN)
            .ok_or_else(|| ShpError::invalid_format("truncated field descriptor"))?;
        let name_bytes = &block[0..11];
        let name_len = name_bytes.iter().position(|&b| b == 0).unwrap_or(11);
        let name: String = name_bytes[..name_len]
            .iter()
            .map(|&b| char::from(b))
            .collect::<String>()
            .trim()
            .to_string();
        let field_type = FieldType::from_byte(block[11]).ok_or_else(|| {
            ShpError::invalid_format(format!(
                "field {name}: unsupported type byte 0x{:02X}",
                block[11]
            ))
        })?;
        fields.push(DbfField {
            name,
            field_type,
            length: block[16],
            decimal_count: block[17],
        });
        offset += DBF_BLOCK_LEN;
    }
    Ok(fields)
}

/// Build one field descriptor from an already truncated on-disk name.
#[must_use]
pub fn build_field_descriptor(name: &[u8], field: &DbfField) -> [u8; DBF_BLOCK_LEN] {
    let mut out = [0u8; DBF_BLOCK_LEN];
    let len = name.len().min(MAX_FIELD_NAME_LEN);
    out[..len].copy_from_slice(&name[..len]);
    out[11] = field.field_type.as_byte();
    out[16] = field.length;
    out[17] = field.decimal_count;
    out
}

/// Truncate a field name to the dBASE limit without splitting a character.
#[must_use]
pub fn truncate_field_name(name: &str) -> &str {
    if name.len() <= MAX_FIELD_NAME_LEN {
        return name;
    }
    let mut end = MAX_FIELD_NAME_LEN;
    while !name.is_char_boundary(end) {
        end -= 1;
    }
    &name[..end]
}

fn slice<const N: usize>(data: &[u8], offset: usize) -> Result<[u8; N]> {
    data.get(offset..offset + N)
        .and_then(|bytes| bytes.try_into().ok())
        .ok_or_else(|| ShpError::invalid_format(format!("unexpected end of data at {offset}")))
}

/// Read a big-endian i32.
pub fn be_i32(data: &[u8], offset: usize) -> Result<i32> {
    slice::<4>(data, offset).map(i32::from_be_bytes)
}

/// Read a little-endian i32.
pub fn le_i32(data: &[u8], offset: usize) -> Result<i32> {
    slice::<4>(data, offset).map(i32::from_le_bytes)
}

/// Read a little-endian f64.
pub fn le_f64(data: &[u8], offset: usize) -> Result<f64> {
    slice::<8>(data, offset).map(f64::from_le_bytes)
}
