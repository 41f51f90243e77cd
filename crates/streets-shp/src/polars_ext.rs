//! Polars DataFrame conversion for shapefile attribute tables.
//!
//! | dBASE field                         | Polars dtype |
//! |-------------------------------------|--------------|
//! | `C` character, `D` date             | `String`     |
//! | `N`/`F` with 0 decimals, width ≤ 18 | `Int64`      |
//! | other `N`/`F`                       | `Float64`    |
//! | `L` logical                         | `Boolean`    |

use polars::prelude::{AnyValue, Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use crate::error::Result;
use crate::types::{DbfField, FieldType, FieldValue, Shapefile};

/// Widest integer field that still fits an `i64`.
const MAX_INTEGER_WIDTH: u8 = 18;

/// Convert the attribute table of a dataset into a DataFrame.
///
/// Column order follows field order; geometries are not included.
pub fn dataset_to_dataframe(dataset: &Shapefile) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(dataset.fields.len());
    for (idx, field) in dataset.fields.iter().enumerate() {
        let values = dataset.rows.iter().map(|row| &row[idx]);
        let name = field.name.as_str().into();
        let series = match field.field_type {
            FieldType::Character | FieldType::Date => {
                let data: Vec<Option<String>> = values
                    .map(|value| (!value.is_null()).then(|| value.to_string()))
                    .collect();
                Series::new(name, data)
            }
            FieldType::Numeric | FieldType::Float
                if field.is_integer() && field.length <= MAX_INTEGER_WIDTH =>
            {
                let data: Vec<Option<i64>> = values
                    .map(|value| value.as_f64().map(|v| v as i64))
                    .collect();
                Series::new(name, data)
            }
            FieldType::Numeric | FieldType::Float => {
                let data: Vec<Option<f64>> = values.map(FieldValue::as_f64).collect();
                Series::new(name, data)
            }
            FieldType::Logical => {
                let data: Vec<Option<bool>> = values
                    .map(|value| match value {
                        FieldValue::Logical(b) => Some(*b),
                        _ => None,
                    })
                    .collect();
                Series::new(name, data)
            }
        };
        columns.push(series.into_column());
    }
    Ok(DataFrame::new(columns)?)
}

/// Convert a DataFrame back into field descriptors and attribute rows.
///
/// A column keeps the descriptor of the same-named template field when the
/// types are compatible; otherwise a descriptor is derived from its dtype.
pub fn dataframe_to_records(
    df: &DataFrame,
    templates: &[DbfField],
) -> Result<(Vec<DbfField>, Vec<Vec<FieldValue>>)> {
    let mut fields = Vec::with_capacity(df.width());
    let mut rows: Vec<Vec<FieldValue>> = vec![Vec::with_capacity(df.width()); df.height()];

    for column in df.get_columns() {
        let name = column.name().as_str();
        let dtype = column.dtype();
        let field = templates
            .iter()
            .find(|template| template.name == name && is_compatible(template.field_type, dtype))
            .cloned()
            .unwrap_or_else(|| field_for_dtype(name, dtype));

        for (idx, row) in rows.iter_mut().enumerate() {
            row.push(any_to_field_value(column.get(idx)?, &field));
        }
        fields.push(field);
    }

    Ok((fields, rows))
}

/// Derive a field descriptor for a Polars dtype.
///
/// Character widths are placeholders; the writer sizes them to the data.
#[must_use]
pub fn field_for_dtype(name: &str, dtype: &DataType) -> DbfField {
    match dtype {
        DataType::Boolean => DbfField::logical(name),
        dt if dt.is_integer() => DbfField::numeric(name, MAX_INTEGER_WIDTH, 0),
        dt if dt.is_float() => DbfField::numeric(name, 24, 15),
        _ => DbfField::character(name, 1),
    }
}

fn is_compatible(field_type: FieldType, dtype: &DataType) -> bool {
    match field_type {
        FieldType::Character | FieldType::Date => matches!(dtype, DataType::String),
        FieldType::Numeric | FieldType::Float => dtype.is_integer() || dtype.is_float(),
        FieldType::Logical => matches!(dtype, DataType::Boolean),
    }
}

fn any_to_field_value(value: AnyValue<'_>, field: &DbfField) -> FieldValue {
    let text = |s: &str| {
        if field.field_type == FieldType::Date {
            FieldValue::Date(s.to_string())
        } else {
            FieldValue::Character(s.to_string())
        }
    };
    match value {
        AnyValue::Null => FieldValue::Null,
        AnyValue::String(s) => text(s),
        AnyValue::StringOwned(s) => text(s.as_str()),
        AnyValue::Boolean(b) => FieldValue::Logical(b),
        AnyValue::Int8(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::Int16(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::Int32(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::Int64(v) => FieldValue::Numeric(v as f64),
        AnyValue::UInt8(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::UInt16(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::UInt32(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::UInt64(v) => FieldValue::Numeric(v as f64),
        AnyValue::Float32(v) => FieldValue::Numeric(f64::from(v)),
        AnyValue::Float64(v) => FieldValue::Numeric(v),
        other => FieldValue::Character(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Geometry, ShapeType};

    fn sample() -> Shapefile {
        let mut dataset = Shapefile::with_fields(
            ShapeType::PolyLine,
            vec![
                DbfField::numeric("id", 10, 0),
                DbfField::character("name", 40),
                DbfField::numeric("length", 12, 3),
            ],
        );
        dataset
            .add_record(
                Geometry::null(),
                vec![
                    FieldValue::Numeric(33.0),
                    FieldValue::character("av. paulista"),
                    FieldValue::Numeric(12.5),
                ],
            )
            .unwrap();
        dataset
            .add_record(
                Geometry::null(),
                vec![FieldValue::Numeric(34.0), FieldValue::Null, FieldValue::Null],
            )
            .unwrap();
        dataset
    }

    #[test]
    fn maps_field_types_to_dtypes() {
        let df = dataset_to_dataframe(&sample()).unwrap();
        assert_eq!(df.column("id").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("name").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("length").unwrap().dtype(), &DataType::Float64);
        let names = df.column("name").unwrap().str().unwrap();
        assert_eq!(names.get(0), Some("av. paulista"));
        assert_eq!(names.get(1), None);
    }

    #[test]
    fn keeps_template_descriptors() {
        let dataset = sample();
        let df = dataset_to_dataframe(&dataset).unwrap();
        let (fields, rows) = dataframe_to_records(&df, &dataset.fields).unwrap();
        assert_eq!(fields, dataset.fields);
        assert_eq!(rows, dataset.rows);
    }

    #[test]
    fn derives_descriptors_for_new_columns() {
        let df = DataFrame::new(vec![
            Series::new("perimeter".into(), vec![0i64, 0]).into_column(),
            Series::new("flag".into(), vec![true, false]).into_column(),
        ])
        .unwrap();
        let (fields, rows) = dataframe_to_records(&df, &[]).unwrap();
        assert_eq!(fields[0], DbfField::numeric("perimeter", 18, 0));
        assert_eq!(fields[1], DbfField::logical("flag"));
        assert_eq!(rows[1][0], FieldValue::Numeric(0.0));
        assert_eq!(rows[1][1], FieldValue::Logical(false));
    }
}
