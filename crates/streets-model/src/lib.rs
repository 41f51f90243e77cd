//! Street feature model.
//!
//! - **columns**: attribute names agreed with the upstream data producer
//! - **options**: normalizer toggles, presets and acronym rules
//! - **config**: TOML overrides for [`NormalizerOptions`]
//! - **table**: [`FeatureTable`], attributes as a Polars DataFrame plus
//!   row-aligned geometries

pub mod columns;
pub mod config;
pub mod error;
pub mod options;
pub mod table;

pub use config::{ConfigError, NormalizerConfig};
pub use error::{ModelError, Result};
pub use options::{AcronymRule, NormalizerOptions, Preset, default_acronyms};
pub use table::FeatureTable;
