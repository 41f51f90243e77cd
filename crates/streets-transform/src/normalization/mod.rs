//! Text normalization rules for street attributes.
//!
//! - **text**: acronym expansion and type/name merging
//! - **accents**: legacy encoding repair

pub mod accents;
pub mod text;

pub use accents::{AccentRepairError, decode_raw_unicode_escape, repair_accents, try_repair_accents};
pub use text::{expand_acronyms, merge_type_prefix};
