//! Street attribute transformations.
//!
//! - **normalization**: acronym expansion, type/name merging and accent repair
//! - **executors**: in-place DataFrame column operations
//! - **pipeline**: the ordered [`normalize`] run over a [`FeatureTable`]
//!
//! [`FeatureTable`]: streets_model::FeatureTable

pub mod error;
pub mod executors;
pub mod normalization;
pub mod pipeline;

pub use error::{Result, TransformError};
pub use executors::{
    apply_constant_i64, fill_null_strings, map_string_column, merge_type_into_name,
    project_columns, rename_column, replace_zero_values,
};
pub use normalization::{
    AccentRepairError, decode_raw_unicode_escape, expand_acronyms, merge_type_prefix,
    repair_accents, try_repair_accents,
};
pub use pipeline::{NormalizeReport, Step, StepOutcome, normalize};
