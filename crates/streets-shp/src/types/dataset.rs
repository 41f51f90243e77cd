//! In-memory shapefile dataset.

use crate::encoding::ShpEncoding;
use crate::error::{Result, ShpError};

use super::{BoundingBox, DbfField, FieldValue, Geometry, ShapeType};

/// A complete shapefile: geometries plus their attribute rows.
///
/// `geometries[i]` and `rows[i]` describe the same feature.
#[derive(Debug, Clone, PartialEq)]
pub struct Shapefile {
    /// Shape type declared in the main-file header.
    pub shape_type: ShapeType,
    /// Bounding box declared in the main-file header.
    pub bbox: BoundingBox,
    /// Attribute field descriptors.
    pub fields: Vec<DbfField>,
    /// One geometry per feature.
    pub geometries: Vec<Geometry>,
    /// One attribute row per feature, in field order.
    pub rows: Vec<Vec<FieldValue>>,
    /// Encoding the attribute text was read with.
    pub encoding: ShpEncoding,
}

impl Shapefile {
    /// Create an empty dataset without fields.
    #[must_use]
    pub fn new(shape_type: ShapeType) -> Self {
        Self::with_fields(shape_type, Vec::new())
    }

    /// Create an empty dataset with the given fields.
    #[must_use]
    pub fn with_fields(shape_type: ShapeType, fields: Vec<DbfField>) -> Self {
        Self {
            shape_type,
            bbox: BoundingBox::default(),
            fields,
            geometries: Vec::new(),
            rows: Vec::new(),
            encoding: ShpEncoding::default(),
        }
    }

    /// Append one feature.
    pub fn add_record(&mut self, geometry: Geometry, row: Vec<FieldValue>) -> Result<()> {
        if row.len() != self.fields.len() {
            return Err(ShpError::RowLengthMismatch {
                expected: self.fields.len(),
                actual: row.len(),
            });
        }
        self.geometries.push(geometry);
        self.rows.push(row);
        Ok(())
    }

    /// Number of features.
    #[must_use]
    pub fn num_records(&self) -> usize {
        self.rows.len()
    }

    /// Position of a field by exact name.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Value of a field in a given row.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&FieldValue> {
        let idx = self.field_index(name)?;
        self.rows.get(row)?.get(idx)
    }
}
