use std::path::{Path, PathBuf};

use polars::prelude::DataFrame;
use streets_shp::{
    BoundingBox, DbfField, Geometry, ShapeType, Shapefile, ShpEncoding, ShpReaderOptions,
    ShpWriterOptions, dataframe_to_records, dataset_to_dataframe, read_shapefile_with_options,
    write_shapefile,
};

use crate::error::{ModelError, Result};

/// Street features: attribute columns plus row-aligned geometries.
///
/// Row `i` of `data` and `geometries[i]` describe the same feature. Column
/// transformations never filter rows, so the alignment holds through the
/// whole pipeline.
#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub data: DataFrame,
    pub geometries: Vec<Geometry>,
    pub shape_type: ShapeType,
    pub bbox: BoundingBox,
    /// Field descriptors of the source file, reused on export when a column
    /// keeps its name and type.
    pub fields: Vec<DbfField>,
    pub encoding: ShpEncoding,
    pub source: Option<PathBuf>,
}

impl FeatureTable {
    pub fn new(data: DataFrame, geometries: Vec<Geometry>, shape_type: ShapeType) -> Result<Self> {
        if data.height() != geometries.len() {
            return Err(ModelError::GeometryMismatch {
                rows: data.height(),
                geometries: geometries.len(),
            });
        }
        let mut bbox = BoundingBox::default();
        bbox.recompute_xy(&geometries);
        Ok(Self {
            data,
            geometries,
            shape_type,
            bbox,
            fields: Vec::new(),
            encoding: ShpEncoding::default(),
            source: None,
        })
    }

    pub fn from_shapefile(dataset: Shapefile) -> Result<Self> {
        let data = dataset_to_dataframe(&dataset)?;
        Ok(Self {
            data,
            geometries: dataset.geometries,
            shape_type: dataset.shape_type,
            bbox: dataset.bbox,
            fields: dataset.fields,
            encoding: dataset.encoding,
            source: None,
        })
    }

    pub fn read(path: &Path, options: ShpReaderOptions) -> Result<Self> {
        let dataset = read_shapefile_with_options(path, options)?;
        let mut table = Self::from_shapefile(dataset)?;
        table.source = Some(path.to_path_buf());
        tracing::debug!(
            path = %path.display(),
            records = table.record_count(),
            columns = table.data.width(),
            encoding = %table.encoding,
            "loaded feature table"
        );
        Ok(table)
    }

    pub fn to_shapefile(&self) -> Result<Shapefile> {
        if self.data.height() != self.geometries.len() {
            return Err(ModelError::GeometryMismatch {
                rows: self.data.height(),
                geometries: self.geometries.len(),
            });
        }
        let (fields, rows) = dataframe_to_records(&self.data, &self.fields)?;
        Ok(Shapefile {
            shape_type: self.shape_type,
            bbox: self.bbox,
            fields,
            geometries: self.geometries.clone(),
            rows,
            encoding: self.encoding,
        })
    }

    /// Write the table with its geometries; geometry is always the last
    /// logical column on disk.
    pub fn write(&self, path: &Path, options: &ShpWriterOptions) -> Result<()> {
        let dataset = self.to_shapefile()?;
        write_shapefile(path, &dataset, options)?;
        Ok(())
    }

    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.data
            .get_column_names()
            .into_iter()
            .map(|name| name.to_string())
            .collect()
    }
}
