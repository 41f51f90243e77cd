//! CLI library components for the street normalizer.

pub mod logging;
pub mod pipeline;
