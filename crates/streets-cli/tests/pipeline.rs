//! End-to-end runs over shapefiles written to a temp directory.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use streets_cli::pipeline::{PipelineConfig, run_pipeline};
use streets_model::NormalizerOptions;
use streets_shp::{
    DbfField, FieldValue, Geometry, ShapeType, Shapefile, ShpEncoding, ShpWriterOptions,
    read_shapefile, write_shapefile,
};

fn row(id: f64, name: Option<&str>, obs: Option<&str>, version: f64, changeset: f64) -> Vec<FieldValue> {
    vec![
        FieldValue::Numeric(id),
        FieldValue::Numeric(id + 1000.0),
        FieldValue::Numeric(id),
        name.map_or(FieldValue::Null, FieldValue::character),
        FieldValue::character("rua"),
        obs.map_or(FieldValue::Null, FieldValue::character),
        FieldValue::Numeric(1900.0),
        FieldValue::Numeric(2000.0),
        FieldValue::Numeric(version),
        FieldValue::Numeric(changeset),
    ]
}

/// Five street segments as they arrive from upstream, Latin-1 with a
/// truncated `changeset_` field.
fn write_pilot_area(dir: &Path) -> (PathBuf, Shapefile) {
    let mut dataset = Shapefile::with_fields(
        ShapeType::PolyLine,
        vec![
            DbfField::numeric("fid", 10, 0),
            DbfField::numeric("id_street", 10, 0),
            DbfField::numeric("id", 10, 0),
            DbfField::character("name", 80),
            DbfField::character("type", 20),
            DbfField::character("obs", 80),
            DbfField::numeric("first_year", 4, 0),
            DbfField::numeric("last_year", 4, 0),
            DbfField::numeric("version", 10, 0),
            DbfField::numeric("changeset_", 10, 0),
        ],
    );
    let rows = vec![
        row(33.0, Some("av. paulista"), None, 0.0, 0.0),
        row(107.0, None, Some("antiga estrada"), 3.0, 7.0),
        row(108.0, Some("rua sÃ£o bento"), None, 1.0, 0.0),
        row(120.0, Some("r. augusta"), Some("praÃ§a"), 2.0, 4.0),
        row(999.0, Some("travessa dr. arnaldo"), None, 5.0, 5.0),
    ];
    for (idx, values) in rows.into_iter().enumerate() {
        let x = -46.6 + idx as f64 * 0.01;
        let geometry = Geometry::polyline(&[vec![(x, -23.5), (x + 0.005, -23.49), (x + 0.01, -23.5)]]);
        dataset.add_record(geometry, values).unwrap();
    }

    let path = dir.join("streets_pilot_area").join("streets_pilot_area.shp");
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let options = ShpWriterOptions::new().with_encoding(ShpEncoding::Latin1);
    write_shapefile(&path, &dataset, &options).unwrap();
    (path, dataset)
}

fn text(dataset: &Shapefile, row: usize, field: &str) -> Option<String> {
    match dataset.value(row, field) {
        Some(FieldValue::Character(value)) => Some(value.clone()),
        Some(FieldValue::Null) => None,
        other => panic!("unexpected value for {field}: {other:?}"),
    }
}

fn number(dataset: &Shapefile, row: usize, field: &str) -> Option<f64> {
    dataset.value(row, field).and_then(FieldValue::as_f64)
}

#[test]
fn edit_portal_run_writes_normalized_shapefile() {
    let dir = TempDir::new().unwrap();
    let (input, source) = write_pilot_area(dir.path());
    let output_dir = dir.path().join("streets_pilot_area_new");

    let result = run_pipeline(&PipelineConfig::new(&input, &output_dir)).unwrap();

    let output = result.output.clone().unwrap();
    assert_eq!(output, output_dir.join("streets_pilot_area.shp"));
    assert_eq!(result.input_encoding, ShpEncoding::Latin1);
    assert_eq!(
        fs::read_to_string(output_dir.join("streets_pilot_area.cpg")).unwrap(),
        "UTF-8"
    );

    let written = read_shapefile(&output).unwrap();
    let names: Vec<&str> = written.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "id",
            "id_street",
            "name",
            "obs",
            "first_year",
            "last_year",
            "perimeter",
            "version",
            "changeset_"
        ]
    );
    assert_eq!(written.num_records(), 5);
    assert_eq!(written.geometries, source.geometries);

    assert_eq!(text(&written, 0, "name").as_deref(), Some("avenida paulista"));
    // Empty strings are stored as blanks, which read back as null.
    assert_eq!(text(&written, 1, "name"), None);
    assert_eq!(text(&written, 2, "name").as_deref(), Some("rua são bento"));
    assert_eq!(text(&written, 3, "name").as_deref(), Some("rua augusta"));
    assert_eq!(text(&written, 4, "name").as_deref(), Some("travessa doutor arnaldo"));
    assert_eq!(text(&written, 3, "obs").as_deref(), Some("praça"));

    assert_eq!(number(&written, 0, "version"), Some(1.0));
    assert_eq!(number(&written, 1, "version"), Some(3.0));
    assert_eq!(number(&written, 0, "changeset_"), Some(2.0));
    assert_eq!(number(&written, 2, "changeset_"), Some(2.0));
    assert_eq!(number(&written, 1, "changeset_"), Some(7.0));
    assert_eq!(number(&written, 4, "perimeter"), Some(0.0));

    // The in-memory result still carries the full names.
    let names = result.samples.column("name").unwrap().str().unwrap();
    assert_eq!(result.samples.height(), 4);
    assert_eq!(names.get(1), Some(""));
}

#[test]
fn type_merge_run_drops_type_columns() {
    let dir = TempDir::new().unwrap();
    let (input, _) = write_pilot_area(dir.path());
    let output_dir = dir.path().join("out");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.options = NormalizerOptions::type_merge();
    config.output_name = "merged".to_string();
    config.output_encoding = ShpEncoding::Latin1;

    let result = run_pipeline(&config).unwrap();

    let written = read_shapefile(&output_dir.join("merged.shp")).unwrap();
    assert_eq!(result.output, Some(output_dir.join("merged.shp")));
    assert_eq!(written.encoding, ShpEncoding::Latin1);
    assert_eq!(written.fields.len(), 8);
    assert!(written.field_index("type").is_none());
    assert!(written.field_index("perimeter").is_none());
    assert_eq!(text(&written, 0, "name").as_deref(), Some("rua avenida paulista"));
    assert_eq!(text(&written, 2, "name").as_deref(), Some("rua sÃ£o bento"));
    assert_eq!(number(&written, 0, "version"), Some(0.0));
}

#[test]
fn dry_run_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let (input, _) = write_pilot_area(dir.path());
    let output_dir = dir.path().join("never");
    let mut config = PipelineConfig::new(&input, &output_dir);
    config.dry_run = true;
    config.sample_ids = vec![999];

    let result = run_pipeline(&config).unwrap();

    assert!(result.output.is_none());
    assert!(!output_dir.exists());
    assert_eq!(result.report.records, 5);
    assert_eq!(result.samples.height(), 1);
}

#[test]
fn missing_input_reports_path() {
    let dir = TempDir::new().unwrap();
    let config = PipelineConfig::new(dir.path().join("absent.shp"), dir.path().join("out"));

    let err = run_pipeline(&config).unwrap_err();

    assert!(format!("{err:#}").contains("absent.shp"));
}

#[test]
fn samples_carry_geometry_descriptions() {
    let dir = TempDir::new().unwrap();
    let (input, source) = write_pilot_area(dir.path());
    let mut config = PipelineConfig::new(&input, dir.path().join("out"));
    config.dry_run = true;
    config.sample_ids = vec![120];

    let result = run_pipeline(&config).unwrap();

    assert_eq!(result.samples.height(), 1);
    let columns = result.samples.get_column_names_str();
    assert_eq!(columns.last(), Some(&"geometry"));
    let geometry = result.samples.column("geometry").unwrap().str().unwrap();
    assert_eq!(geometry.get(0), Some(source.geometries[3].to_string().as_str()));
    assert_eq!(geometry.get(0), Some("PolyLine (1 parts, 3 points)"));
}
