//! Core types for shapefile handling.
//!
//! This module provides the data structures for representing shapefile
//! datasets: geometries, dBASE fields and values, and read/write options.

mod dataset;
mod field;
mod geometry;
mod options;

pub use dataset::Shapefile;
pub use field::{DbfField, FieldType, FieldValue};
pub use geometry::{BoundingBox, Geometry, ShapeType};
pub use options::{ShpReaderOptions, ShpWriterOptions};
