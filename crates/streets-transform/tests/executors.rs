//! Tests for column executors.

use polars::prelude::*;
use streets_transform::{
    apply_constant_i64, fill_null_strings, map_string_column, merge_type_into_name,
    project_columns, rename_column, replace_zero_values,
};

#[test]
fn test_apply_constant_adds_column() {
    let mut df = df!("id" => [33i64, 107, 108]).unwrap();

    let count = apply_constant_i64(&mut df, "perimeter", 0).unwrap();

    assert_eq!(count, 3);
    let col = df.column("perimeter").unwrap().i64().unwrap();
    assert_eq!(col.get(0), Some(0));
    assert_eq!(col.get(2), Some(0));
}

#[test]
fn test_apply_constant_overwrites_existing() {
    let mut df = df!("perimeter" => [12i64, 40]).unwrap();

    apply_constant_i64(&mut df, "perimeter", 0).unwrap();

    let col = df.column("perimeter").unwrap().i64().unwrap();
    assert_eq!(col.get(0), Some(0));
    assert_eq!(col.get(1), Some(0));
}

#[test]
fn test_rename_truncated_changeset() {
    let mut df = df!("id" => [1i64], "changeset_" => [0i64]).unwrap();

    assert!(rename_column(&mut df, "changeset_", "changeset_id").unwrap());

    assert_eq!(df.get_column_names_str(), vec!["id", "changeset_id"]);
}

#[test]
fn test_fill_null_strings() {
    let mut df = df!("name" => [Some("rua a"), None, Some("")]).unwrap();

    let filled = fill_null_strings(&mut df, "name").unwrap();

    assert_eq!(filled, 1);
    let col = df.column("name").unwrap().str().unwrap();
    assert_eq!(col.get(1), Some(""));
    assert_eq!(col.null_count(), 0);
}

#[test]
fn test_merge_type_into_name() {
    let mut df = df!(
        "name" => [Some("das Flores"), Some("Rua das Flores"), Some(""), Some("augusta")],
        "type" => [Some("Rua"), Some("Rua"), Some("Rua"), None]
    )
    .unwrap();

    let merged = merge_type_into_name(&mut df, "name", "type").unwrap();

    assert_eq!(merged, 1);
    let col = df.column("name").unwrap().str().unwrap();
    assert_eq!(col.get(0), Some("Rua das Flores"));
    assert_eq!(col.get(1), Some("Rua das Flores"));
    assert_eq!(col.get(2), Some(""));
    assert_eq!(col.get(3), Some("augusta"));
}

#[test]
fn test_replace_zero_values() {
    let mut df = df!("version" => [Some(0i64), Some(3), None, Some(0)]).unwrap();

    let replaced = replace_zero_values(&mut df, "version", 1).unwrap();

    assert_eq!(replaced, 2);
    let col = df.column("version").unwrap().i64().unwrap();
    assert_eq!(col.get(0), Some(1));
    assert_eq!(col.get(1), Some(3));
    assert_eq!(col.get(2), None);
    assert_eq!(col.get(3), Some(1));
}

#[test]
fn test_replace_zero_values_on_floats() {
    let mut df = df!("changeset_id" => [0.0f64, 7.0]).unwrap();

    let replaced = replace_zero_values(&mut df, "changeset_id", 2).unwrap();

    assert_eq!(replaced, 1);
    let col = df.column("changeset_id").unwrap().f64().unwrap();
    assert_eq!(col.get(0), Some(2.0));
    assert_eq!(col.get(1), Some(7.0));
}

#[test]
fn test_map_string_column_counts_changes() {
    let mut df = df!("obs" => [Some("a"), None, Some("b")]).unwrap();

    let changed = map_string_column(&mut df, "obs", |value| {
        value.unwrap_or("").to_uppercase()
    })
    .unwrap();

    // "a" -> "A", null -> "", "b" -> "B"
    assert_eq!(changed, 3);
    let col = df.column("obs").unwrap().str().unwrap();
    assert_eq!(col.get(1), Some(""));
}

#[test]
fn test_project_columns_orders_and_drops() {
    let mut df = df!(
        "fid" => [1i64],
        "name" => ["rua"],
        "id" => [33i64],
        "type" => ["Rua"]
    )
    .unwrap();

    let dropped = project_columns(&mut df, &["id", "name"]).unwrap();

    assert_eq!(dropped, 2);
    assert_eq!(df.get_column_names_str(), vec!["id", "name"]);
}

#[test]
fn test_project_columns_missing() {
    let mut df = df!("id" => [33i64]).unwrap();

    let err = project_columns(&mut df, &["id", "obs"]).unwrap_err();

    assert_eq!(err.to_string(), "missing column `obs`");
    assert_eq!(df.width(), 1);
}
