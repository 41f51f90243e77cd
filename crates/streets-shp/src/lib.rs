//! ESRI shapefile reader and writer.
//!
//! This crate reads and writes the four sidecar files that make up a
//! shapefile dataset:
//!
//! - `.shp`: main file with one geometry record per feature
//! - `.shx`: record index (written, never needed for sequential reads)
//! - `.dbf`: dBASE III attribute table
//! - `.cpg`: code page declaring the attribute text encoding
//!
//! Geometries are kept as opaque record payloads. They are carried from
//! input to output byte-for-byte; only their bounds are inspected so the
//! main-file bounding box can be recomputed on write.
//!
//! # Features
//!
//! - dBASE character, numeric, float, logical and date fields
//! - UTF-8 and Latin-1 attribute encodings
//! - Field name truncation to the 10-byte dBASE limit
//! - Optional Polars DataFrame integration (with `polars` feature)
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use streets_shp::{
//!     DbfField, FieldValue, Geometry, ShapeType, Shapefile, ShpWriterOptions, read_shapefile,
//!     write_shapefile,
//! };
//!
//! let dataset = read_shapefile(Path::new("streets.shp")).unwrap();
//! println!("{} features of type {}", dataset.num_records(), dataset.shape_type);
//!
//! let mut out = Shapefile::with_fields(ShapeType::PolyLine, vec![DbfField::character("name", 40)]);
//! out.add_record(
//!     Geometry::polyline(&[vec![(0.0, 0.0), (1.0, 1.0)]]),
//!     vec![FieldValue::character("rua das flores")],
//! )
//! .unwrap();
//! write_shapefile(Path::new("out.shp"), &out, &ShpWriterOptions::default()).unwrap();
//! ```

mod encoding;
mod error;
pub mod header;
mod reader;
mod types;
mod writer;

#[cfg(feature = "polars")]
mod polars_ext;

// Re-export error types
pub use error::{Result, ShpError};

pub use encoding::ShpEncoding;

// Re-export core types
pub use types::{
    BoundingBox, DbfField, FieldType, FieldValue, Geometry, ShapeType, Shapefile,
    ShpReaderOptions, ShpWriterOptions,
};

// Re-export reader functionality
pub use reader::{ShpReader, read_shapefile, read_shapefile_with_options};

// Re-export writer functionality
pub use writer::{ShpWriter, write_shapefile};

// Re-export Polars integration
#[cfg(feature = "polars")]
pub use polars_ext::{dataframe_to_records, dataset_to_dataframe, field_for_dtype};
