//! Ordered normalization of a street feature table.
//!
//! Steps run in a fixed order, each gated by [`NormalizerOptions`]:
//!
//! 1. schema adjustment (`perimeter`, `changeset_` rename)
//! 2. null handling for `name` and `obs` (and `type`)
//! 3. type/name merge
//! 4. default backfill for `version` and `changeset_id`
//! 5. acronym expansion on `name`
//! 6. accent repair on `name` and `obs`
//! 7. column projection
//!
//! Steps 2 and 3 must precede 5 so merged prefixes are expanded too.

use std::fmt;

use streets_model::{FeatureTable, NormalizerOptions, columns};
use tracing::debug;

use crate::error::Result;
use crate::executors::{
    apply_constant_i64, fill_null_strings, map_string_column, merge_type_into_name,
    project_columns, rename_column, replace_zero_values,
};
use crate::normalization::{expand_acronyms, repair_accents};

/// A pipeline step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    SchemaAdjustment,
    NullHandling,
    TypeMerge,
    DefaultBackfill,
    AcronymExpansion,
    AccentRepair,
    Projection,
}

impl Step {
    pub fn label(self) -> &'static str {
        match self {
            Self::SchemaAdjustment => "schema adjustment",
            Self::NullHandling => "null handling",
            Self::TypeMerge => "type/name merge",
            Self::DefaultBackfill => "default backfill",
            Self::AcronymExpansion => "acronym expansion",
            Self::AccentRepair => "accent repair",
            Self::Projection => "column projection",
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What one step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepOutcome {
    pub step: Step,
    /// Whether the options enabled this step.
    pub enabled: bool,
    /// Cells changed, or columns added/renamed/dropped for schema steps.
    pub changed: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizeReport {
    pub steps: Vec<StepOutcome>,
    pub records: usize,
    pub columns: Vec<String>,
}

impl NormalizeReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.steps.iter().find(|outcome| outcome.step == step)
    }

    pub fn changed(&self, step: Step) -> usize {
        self.outcome(step).map_or(0, |outcome| outcome.changed)
    }

    pub fn total_changed(&self) -> usize {
        self.steps.iter().map(|outcome| outcome.changed).sum()
    }

    fn record(&mut self, step: Step, enabled: bool, changed: usize) {
        debug!(step = %step, enabled, changed, "normalization step");
        self.steps.push(StepOutcome {
            step,
            enabled,
            changed,
        });
    }
}

/// Run every normalization step on `table` in order.
///
/// A missing column required by an enabled step aborts the run; the table
/// may be partially transformed in that case.
pub fn normalize(table: &mut FeatureTable, options: &NormalizerOptions) -> Result<NormalizeReport> {
    let df = &mut table.data;
    let mut report = NormalizeReport {
        records: df.height(),
        ..NormalizeReport::default()
    };

    // 1. Schema adjustment
    let mut schema_changes = 0;
    if options.add_perimeter {
        apply_constant_i64(df, columns::PERIMETER, options.perimeter_default)?;
        schema_changes += 1;
    }
    if rename_column(df, columns::CHANGESET_TRUNCATED, columns::CHANGESET_ID)? {
        schema_changes += 1;
    }
    report.record(Step::SchemaAdjustment, true, schema_changes);

    // 2. Null handling
    let mut filled = fill_null_strings(df, columns::NAME)? + fill_null_strings(df, columns::OBS)?;
    if options.fill_type_nulls {
        filled += fill_null_strings(df, columns::TYPE)?;
    }
    report.record(Step::NullHandling, true, filled);

    // 3. Type/name merge
    let merged = if options.merge_type_into_name {
        merge_type_into_name(df, columns::NAME, columns::TYPE)?
    } else {
        0
    };
    report.record(Step::TypeMerge, options.merge_type_into_name, merged);

    // 4. Default backfill
    let backfilled = if options.backfill_defaults {
        replace_zero_values(df, columns::VERSION, options.version_default)?
            + replace_zero_values(df, columns::CHANGESET_ID, options.changeset_default)?
    } else {
        0
    };
    report.record(Step::DefaultBackfill, options.backfill_defaults, backfilled);

    // 5. Acronym expansion
    let expanded = map_string_column(df, columns::NAME, |value| {
        expand_acronyms(value.unwrap_or(""), &options.acronyms)
    })?;
    report.record(Step::AcronymExpansion, !options.acronyms.is_empty(), expanded);

    // 6. Accent repair
    let repaired = if options.repair_accents {
        let mut repaired = 0;
        for column in [columns::NAME, columns::OBS] {
            repaired += map_string_column(df, column, |value| {
                value.map(repair_accents).unwrap_or_default()
            })?;
        }
        repaired
    } else {
        0
    };
    report.record(Step::AccentRepair, options.repair_accents, repaired);

    // 7. Projection
    let dropped = project_columns(df, &options.attribute_columns())?;
    report.record(Step::Projection, true, dropped);

    report.columns = table.column_names();
    Ok(report)
}
