//! Read, normalize and export one street shapefile.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::{DataFrame, DataType, IdxCa, IdxSize, NamedFrom, Series};
use streets_model::{FeatureTable, NormalizerOptions, columns};
use streets_shp::{ShpEncoding, ShpReaderOptions, ShpWriterOptions};
use streets_transform::{NormalizeReport, normalize};
use tracing::{info, info_span};

/// Ids printed after a run when no others are requested.
pub const DEFAULT_SAMPLE_IDS: [i64; 5] = [33, 107, 108, 120, 128];

/// Maximum number of rows in the console sample.
pub const SAMPLE_LIMIT: usize = 5;

/// Everything one run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub output_encoding: ShpEncoding,
    /// Overrides `.cpg` detection when set.
    pub input_encoding: Option<ShpEncoding>,
    pub options: NormalizerOptions,
    pub sample_ids: Vec<i64>,
    /// Skip the export step.
    pub dry_run: bool,
}

impl PipelineConfig {
    pub fn new(input: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            output_name: "streets_pilot_area.shp".to_string(),
            output_encoding: ShpEncoding::Utf8,
            input_encoding: None,
            options: NormalizerOptions::default(),
            sample_ids: DEFAULT_SAMPLE_IDS.to_vec(),
            dry_run: false,
        }
    }

    /// Destination `.shp` path; a missing extension is added.
    pub fn output_path(&self) -> PathBuf {
        let path = self.output_dir.join(&self.output_name);
        if path.extension().is_some() {
            path
        } else {
            path.with_extension("shp")
        }
    }
}

#[derive(Debug)]
pub struct NormalizeResult {
    pub input: PathBuf,
    /// Written file, `None` on dry runs.
    pub output: Option<PathBuf>,
    pub input_encoding: ShpEncoding,
    pub output_encoding: ShpEncoding,
    pub report: NormalizeReport,
    pub samples: DataFrame,
}

pub fn run_pipeline(config: &PipelineConfig) -> Result<NormalizeResult> {
    let run_span = info_span!("run", preset = %config.options.preset);
    let _run_guard = run_span.enter();

    // Stage 1: read
    let read_span = info_span!("read", path = %config.input.display());
    let read_start = Instant::now();
    let mut table = read_span.in_scope(|| {
        let mut reader_options = ShpReaderOptions::new();
        if let Some(encoding) = config.input_encoding {
            reader_options = reader_options.with_encoding(encoding);
        }
        FeatureTable::read(&config.input, reader_options)
            .with_context(|| format!("read {}", config.input.display()))
    })?;
    info!(
        records = table.record_count(),
        columns = table.data.width(),
        encoding = %table.encoding,
        duration_ms = read_start.elapsed().as_millis(),
        "read complete"
    );
    let input_encoding = table.encoding;

    // Stage 2: normalize
    let normalize_span = info_span!("normalize");
    let normalize_start = Instant::now();
    let report = normalize_span
        .in_scope(|| normalize(&mut table, &config.options))
        .context("normalize attributes")?;
    info!(
        records = report.records,
        changed = report.total_changed(),
        duration_ms = normalize_start.elapsed().as_millis(),
        "normalize complete"
    );

    // Stage 3: export
    let output = if config.dry_run {
        info!("dry run, skipping export");
        None
    } else {
        let path = config.output_path();
        let export_span = info_span!("export", path = %path.display());
        let export_start = Instant::now();
        export_span.in_scope(|| export(&table, &config.output_dir, &path, config.output_encoding))?;
        info!(
            records = table.record_count(),
            encoding = %config.output_encoding,
            duration_ms = export_start.elapsed().as_millis(),
            "export complete"
        );
        Some(path)
    };

    let samples = sample_rows(&table, &config.sample_ids).context("select sample rows")?;

    Ok(NormalizeResult {
        input: config.input.clone(),
        output,
        input_encoding,
        output_encoding: config.output_encoding,
        report,
        samples,
    })
}

fn export(table: &FeatureTable, dir: &Path, path: &Path, encoding: ShpEncoding) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let options = ShpWriterOptions::new().with_encoding(encoding);
    table
        .write(path, &options)
        .with_context(|| format!("write {}", path.display()))
}

/// Rows whose `id` is in `ids`, at most [`SAMPLE_LIMIT`], with a trailing
/// `geometry` column describing each row's shape.
///
/// Falls back to the first rows when nothing matches or there is no `id`
/// column.
pub fn sample_rows(table: &FeatureTable, ids: &[i64]) -> Result<DataFrame> {
    let df = &table.data;
    let mut rows = match df.column(columns::ID) {
        Ok(id_column) => {
            let id_column = id_column.cast(&DataType::Int64)?;
            id_column
                .i64()?
                .into_iter()
                .enumerate()
                .filter(|(_, id)| id.is_some_and(|id| ids.contains(&id)))
                .map(|(idx, _)| idx)
                .take(SAMPLE_LIMIT)
                .collect::<Vec<_>>()
        }
        Err(_) => Vec::new(),
    };
    if rows.is_empty() {
        rows = (0..df.height().min(SAMPLE_LIMIT)).collect();
    }

    let indices = IdxCa::from_vec(
        "row".into(),
        rows.iter().map(|&idx| idx as IdxSize).collect(),
    );
    let mut sample = df.take(&indices)?;
    let geometry: Vec<Option<String>> = rows
        .iter()
        .map(|&idx| table.geometries.get(idx).map(ToString::to_string))
        .collect();
    sample.with_column(Series::new(columns::GEOMETRY.into(), geometry))?;
    Ok(sample)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::df;
    use streets_shp::{Geometry, ShapeType};

    fn table(df: DataFrame) -> FeatureTable {
        let geometries = (0..df.height())
            .map(|i| {
                let x = i as f64;
                Geometry::polyline(&[vec![(x, 0.0), (x + 1.0, 1.0), (x + 2.0, 0.0)]])
            })
            .collect();
        FeatureTable::new(df, geometries, ShapeType::PolyLine).unwrap()
    }

    #[test]
    fn output_path_adds_extension() {
        let mut config = PipelineConfig::new("in.shp", "out");
        config.output_name = "streets".to_string();
        assert_eq!(config.output_path(), Path::new("out/streets.shp"));
        config.output_name = "streets.shp".to_string();
        assert_eq!(config.output_path(), Path::new("out/streets.shp"));
    }

    #[test]
    fn samples_prefer_requested_ids() {
        let table = table(df!("id" => [1i64, 33, 2, 120, 3]).unwrap());
        let samples = sample_rows(&table, &DEFAULT_SAMPLE_IDS).unwrap();
        let ids: Vec<Option<i64>> = samples.column("id").unwrap().i64().unwrap().into_iter().collect();
        assert_eq!(ids, vec![Some(33), Some(120)]);
    }

    #[test]
    fn samples_fall_back_to_head() {
        let rows = table(df!("id" => [1i64, 2, 3, 4, 5, 6, 7]).unwrap());
        let samples = sample_rows(&rows, &DEFAULT_SAMPLE_IDS).unwrap();
        assert_eq!(samples.height(), SAMPLE_LIMIT);

        let no_id = table(df!("name" => ["a", "b"]).unwrap());
        assert_eq!(sample_rows(&no_id, &[1]).unwrap().height(), 2);
    }

    #[test]
    fn samples_describe_geometry() {
        let table = table(df!("id" => [7i64, 33]).unwrap());
        let samples = sample_rows(&table, &[33]).unwrap();

        assert_eq!(samples.get_column_names_str(), vec!["id", "geometry"]);
        let geometry = samples.column("geometry").unwrap().str().unwrap();
        assert_eq!(geometry.get(0), Some(table.geometries[1].to_string().as_str()));
        assert_eq!(geometry.get(0), Some("PolyLine (1 parts, 3 points)"));
    }
}
