//! Tests for the ordered normalization pipeline.

use polars::prelude::*;
use streets_model::{AcronymRule, FeatureTable, NormalizerOptions};
use streets_shp::{Geometry, ShapeType};
use streets_transform::{Step, TransformError, normalize};

fn geometries(count: usize) -> Vec<Geometry> {
    (0..count)
        .map(|i| {
            let x = i as f64;
            Geometry::polyline(&[vec![(x, 0.0), (x + 1.0, 1.0)]])
        })
        .collect()
}

fn source_table() -> FeatureTable {
    let df = df!(
        "fid" => [1i64, 2, 3, 4],
        "id" => [33i64, 107, 108, 120],
        "id_street" => [10i64, 11, 12, 13],
        "type" => [Some("rua"), Some("avenida"), None, Some("rua")],
        "id_type" => [1i64, 2, 3, 1],
        "name" => [Some("r. augusta"), None, Some("sÃ£o joÃ£o"), Some("av. paulista")],
        "obs" => [None, Some("antiga estrada"), Some("praÃ§a"), None],
        "first_year" => [1900i64, 1910, 1920, 1930],
        "last_year" => [2000i64, 2010, 2020, 2030],
        "version" => [0i64, 2, 0, 5],
        "changeset_" => [0i64, 0, 9, 1]
    )
    .unwrap();
    FeatureTable::new(df, geometries(4), ShapeType::PolyLine).unwrap()
}

fn strings(table: &FeatureTable, column: &str) -> Vec<Option<String>> {
    table
        .data
        .column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect()
}

fn ints(table: &FeatureTable, column: &str) -> Vec<Option<i64>> {
    table
        .data
        .column(column)
        .unwrap()
        .i64()
        .unwrap()
        .into_iter()
        .collect()
}

#[test]
fn edit_portal_preset() {
    let mut table = source_table();
    let original_geometries = table.geometries.clone();

    let report = normalize(&mut table, &NormalizerOptions::edit_portal()).unwrap();

    assert_eq!(
        table.column_names(),
        vec![
            "id",
            "id_street",
            "name",
            "obs",
            "first_year",
            "last_year",
            "perimeter",
            "version",
            "changeset_id"
        ]
    );
    assert_eq!(
        strings(&table, "name"),
        vec![
            Some("rua augusta".to_string()),
            Some(String::new()),
            Some("são joão".to_string()),
            Some("avenida paulista".to_string()),
        ]
    );
    assert_eq!(
        strings(&table, "obs"),
        vec![
            Some(String::new()),
            Some("antiga estrada".to_string()),
            Some("praça".to_string()),
            Some(String::new()),
        ]
    );
    assert_eq!(ints(&table, "perimeter"), vec![Some(0); 4]);
    assert_eq!(ints(&table, "version"), vec![Some(1), Some(2), Some(1), Some(5)]);
    assert_eq!(
        ints(&table, "changeset_id"),
        vec![Some(2), Some(2), Some(9), Some(1)]
    );
    assert_eq!(table.geometries, original_geometries);

    assert_eq!(report.records, 4);
    assert_eq!(report.changed(Step::SchemaAdjustment), 2);
    // one name and two obs nulls
    assert_eq!(report.changed(Step::NullHandling), 3);
    assert_eq!(report.changed(Step::DefaultBackfill), 4);
    assert_eq!(report.changed(Step::AcronymExpansion), 2);
    // one name and one obs repaired
    assert_eq!(report.changed(Step::AccentRepair), 2);
    assert_eq!(report.changed(Step::Projection), 3);
    assert!(!report.outcome(Step::TypeMerge).unwrap().enabled);
}

#[test]
fn type_merge_preset() {
    let mut table = source_table();

    let report = normalize(&mut table, &NormalizerOptions::type_merge()).unwrap();

    assert_eq!(
        table.column_names(),
        vec![
            "id",
            "id_street",
            "name",
            "obs",
            "first_year",
            "last_year",
            "version",
            "changeset_id"
        ]
    );
    assert_eq!(
        strings(&table, "name"),
        vec![
            // "r. augusta" gains the prefix, then "r. " expands
            Some("rua rua augusta".to_string()),
            Some(String::new()),
            Some("sÃ£o joÃ£o".to_string()),
            Some("rua avenida paulista".to_string()),
        ]
    );
    assert_eq!(
        strings(&table, "obs"),
        vec![
            Some(String::new()),
            Some("antiga estrada".to_string()),
            Some("praÃ§a".to_string()),
            Some(String::new()),
        ]
    );
    assert_eq!(ints(&table, "version"), vec![Some(0), Some(2), Some(0), Some(5)]);
    assert_eq!(report.changed(Step::TypeMerge), 2);
    assert_eq!(report.changed(Step::DefaultBackfill), 0);
    assert_eq!(report.changed(Step::NullHandling), 4);
}

#[test]
fn custom_acronyms_replace_built_ins() {
    let mut table = source_table();
    let options = NormalizerOptions::edit_portal()
        .with_acronyms(vec![AcronymRule::new("av. ", "avenida ")]);

    normalize(&mut table, &options).unwrap();

    let names = strings(&table, "name");
    assert_eq!(names[0].as_deref(), Some("r. augusta"));
    assert_eq!(names[3].as_deref(), Some("avenida paulista"));
}

#[test]
fn geometry_in_output_columns_is_ignored() {
    let mut table = source_table();
    let options = NormalizerOptions::edit_portal().with_output_columns(["id", "geometry", "name"]);

    normalize(&mut table, &options).unwrap();

    assert_eq!(table.column_names(), vec!["id", "name"]);
    assert_eq!(table.geometries.len(), 4);
}

#[test]
fn missing_name_column_aborts() {
    let df = df!("id" => [1i64], "version" => [0i64], "changeset_" => [0i64]).unwrap();
    let mut table = FeatureTable::new(df, geometries(1), ShapeType::PolyLine).unwrap();

    let err = normalize(&mut table, &NormalizerOptions::default()).unwrap_err();

    assert!(matches!(err, TransformError::MissingColumn { ref name } if name == "name"));
}

#[test]
fn missing_output_column_aborts() {
    let mut table = source_table();
    let options = NormalizerOptions::edit_portal().with_output_columns(["id", "district"]);

    let err = normalize(&mut table, &options).unwrap_err();

    assert_eq!(err.to_string(), "missing column `district`");
}
