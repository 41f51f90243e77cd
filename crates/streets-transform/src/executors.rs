//! Column executors.
//!
//! Each executor mutates a DataFrame in place and returns how many cells
//! (or columns, for schema operations) it changed. Rows are never added,
//! removed or reordered, so geometries kept alongside the frame stay aligned.

use polars::prelude::{Column, DataFrame, DataType, NamedFrom, Series};

use crate::error::{Result, TransformError};
use crate::normalization::merge_type_prefix;

fn require_column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| TransformError::missing_column(name))
}

/// String view of a column, casting non-string columns.
fn string_values(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = require_column(df, name)?;
    let column = if column.dtype() == &DataType::String {
        column.clone()
    } else {
        column.cast(&DataType::String)?
    };
    Ok(column
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Set every row of `column` to `value`, creating the column if absent.
pub fn apply_constant_i64(df: &mut DataFrame, column: &str, value: i64) -> Result<usize> {
    let height = df.height();
    let series = Series::new(column.into(), vec![value; height]);
    df.with_column(series)?;
    Ok(height)
}

/// Rename `from` to `to` when `from` exists.
///
/// An existing `to` column is replaced. Returns whether a rename happened.
pub fn rename_column(df: &mut DataFrame, from: &str, to: &str) -> Result<bool> {
    if df.column(from).is_err() {
        return Ok(false);
    }
    if from != to && df.column(to).is_ok() {
        tracing::debug!(from, to, "replacing existing column on rename");
        df.drop_in_place(to)?;
    }
    df.rename(from, to.into())?;
    Ok(true)
}

/// Replace null values of a text column with the empty string.
///
/// Non-string columns are cast to string first.
pub fn fill_null_strings(df: &mut DataFrame, column: &str) -> Result<usize> {
    let values = string_values(df, column)?;
    let filled = values.iter().filter(|value| value.is_none()).count();
    let values: Vec<String> = values.into_iter().map(Option::unwrap_or_default).collect();
    df.with_column(Series::new(column.into(), values))?;
    Ok(filled)
}

/// Prefix each non-empty name with its type unless it already starts with it.
///
/// Null names and null types are treated as empty strings.
pub fn merge_type_into_name(df: &mut DataFrame, name_column: &str, type_column: &str) -> Result<usize> {
    let names = string_values(df, name_column)?;
    let types = string_values(df, type_column)?;

    let mut merged = 0;
    let values: Vec<Option<String>> = names
        .into_iter()
        .zip(types)
        .map(|(name, street_type)| {
            let prefixed = merge_type_prefix(
                name.as_deref().unwrap_or(""),
                street_type.as_deref().unwrap_or(""),
            );
            match prefixed {
                Some(value) => {
                    merged += 1;
                    Some(value)
                }
                None => name,
            }
        })
        .collect();

    if merged > 0 {
        df.with_column(Series::new(name_column.into(), values))?;
    }
    Ok(merged)
}

/// Replace zero values of a numeric column with `replacement`.
///
/// Nulls and non-zero values are unchanged. Integer columns become `Int64`;
/// float columns keep their values as `Float64`.
pub fn replace_zero_values(df: &mut DataFrame, column: &str, replacement: i64) -> Result<usize> {
    let source = require_column(df, column)?;
    let dtype = source.dtype().clone();

    let (series, replaced) = if dtype.is_integer() {
        let cast = source.cast(&DataType::Int64)?;
        let mut replaced = 0;
        let values: Vec<Option<i64>> = cast
            .i64()?
            .into_iter()
            .map(|value| match value {
                Some(0) => {
                    replaced += 1;
                    Some(replacement)
                }
                other => other,
            })
            .collect();
        (Series::new(column.into(), values), replaced)
    } else if dtype.is_float() {
        let cast = source.cast(&DataType::Float64)?;
        let mut replaced = 0;
        let values: Vec<Option<f64>> = cast
            .f64()?
            .into_iter()
            .map(|value| match value {
                Some(v) if v == 0.0 => {
                    replaced += 1;
                    Some(replacement as f64)
                }
                other => other,
            })
            .collect();
        (Series::new(column.into(), values), replaced)
    } else {
        return Err(TransformError::UnexpectedType {
            column: column.to_string(),
            dtype: dtype.to_string(),
            expected: "numeric",
        });
    };

    if replaced > 0 {
        df.with_column(series)?;
    }
    Ok(replaced)
}

/// Rewrite every value of a text column with `f`.
///
/// `f` receives `None` for nulls; the result column has no nulls. Returns
/// the number of cells whose value changed, counting filled nulls.
pub fn map_string_column<F>(df: &mut DataFrame, column: &str, f: F) -> Result<usize>
where
    F: Fn(Option<&str>) -> String,
{
    let values = string_values(df, column)?;
    let mut changed = 0;
    let mapped: Vec<String> = values
        .iter()
        .map(|value| {
            let out = f(value.as_deref());
            if value.as_deref() != Some(out.as_str()) {
                changed += 1;
            }
            out
        })
        .collect();
    df.with_column(Series::new(column.into(), mapped))?;
    Ok(changed)
}

/// Keep exactly `columns`, in that order. Returns how many columns were
/// dropped.
pub fn project_columns(df: &mut DataFrame, columns: &[&str]) -> Result<usize> {
    for name in columns {
        require_column(df, name)?;
    }
    let before = df.width();
    *df = df.select(columns.iter().copied())?;
    Ok(before.saturating_sub(df.width()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;

    #[test]
    fn missing_column_is_reported_by_name() {
        let mut df = df!("id" => [1i64, 2]).unwrap();
        let err = fill_null_strings(&mut df, "name").unwrap_err();
        assert!(matches!(err, TransformError::MissingColumn { ref name } if name == "name"));
    }

    #[test]
    fn replace_zero_rejects_text() {
        let mut df = df!("version" => ["0", "1"]).unwrap();
        let err = replace_zero_values(&mut df, "version", 1).unwrap_err();
        assert!(matches!(err, TransformError::UnexpectedType { .. }));
    }

    #[test]
    fn rename_is_noop_without_source() {
        let mut df = df!("id" => [1i64]).unwrap();
        assert!(!rename_column(&mut df, "changeset_", "changeset_id").unwrap());
        assert_eq!(df.get_column_names_str(), vec!["id"]);
    }
}
