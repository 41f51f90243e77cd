//! Configuration options for attribute normalization.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::columns;

/// A literal find/replace pair applied to street names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AcronymRule {
    pub pattern: String,
    pub replacement: String,
}

impl AcronymRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Built-in abbreviation expansions, applied in this order.
///
/// Patterns carry their surrounding spaces; `"dr "` also matches the tail
/// of words such as `"sdr "`.
pub fn default_acronyms() -> Vec<AcronymRule> {
    [
        (" dr. ", " doutor "),
        ("dr ", "doutor "),
        (" d. ", " dom "),
        (" cap. ", " capitão "),
        ("av. ", "avenida "),
        ("r. ", "rua "),
        ("vila villa ", "villa "),
        ("beco becco ", "becco "),
        ("viaduto viaducto ", "viaducto "),
    ]
    .into_iter()
    .map(|(pattern, replacement)| AcronymRule::new(pattern, replacement))
    .collect()
}

/// Named bundle of normalizer toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Preset {
    /// Export for the street edit portal: adds `perimeter`, backfills
    /// `version`/`changeset_id` and repairs legacy accents.
    #[default]
    EditPortal,
    /// Folds the street type into the name and drops the type columns.
    TypeMerge,
}

impl Preset {
    pub const ALL: [Preset; 2] = [Preset::EditPortal, Preset::TypeMerge];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::EditPortal => "edit-portal",
            Preset::TypeMerge => "type-merge",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown preset `{s}`"))
    }
}

/// Options controlling the normalization pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizerOptions {
    /// Preset these options were derived from.
    pub preset: Preset,

    /// Add a `perimeter` column filled with `perimeter_default`.
    pub add_perimeter: bool,
    pub perimeter_default: i64,

    /// Replace null `type` values with the empty string.
    pub fill_type_nulls: bool,

    /// Prefix `name` with its `type` when it does not already start with it.
    pub merge_type_into_name: bool,

    /// Replace zero `version`/`changeset_id` values with the defaults below.
    pub backfill_defaults: bool,
    pub version_default: i64,
    pub changeset_default: i64,

    /// Re-decode `name` and `obs` text that was mis-decoded upstream.
    pub repair_accents: bool,

    /// Ordered abbreviation expansions for `name`.
    pub acronyms: Vec<AcronymRule>,

    /// Attribute columns written to the output, in order.
    pub output_columns: Vec<String>,
}

impl Default for NormalizerOptions {
    fn default() -> Self {
        Self::edit_portal()
    }
}

impl NormalizerOptions {
    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::EditPortal => Self::edit_portal(),
            Preset::TypeMerge => Self::type_merge(),
        }
    }

    pub fn edit_portal() -> Self {
        Self {
            preset: Preset::EditPortal,
            add_perimeter: true,
            perimeter_default: 0,
            fill_type_nulls: false,
            merge_type_into_name: false,
            backfill_defaults: true,
            version_default: 1,
            changeset_default: 2,
            repair_accents: true,
            acronyms: default_acronyms(),
            output_columns: owned(&[
                columns::ID,
                columns::ID_STREET,
                columns::NAME,
                columns::OBS,
                columns::FIRST_YEAR,
                columns::LAST_YEAR,
                columns::PERIMETER,
                columns::VERSION,
                columns::CHANGESET_ID,
            ]),
        }
    }

    pub fn type_merge() -> Self {
        Self {
            preset: Preset::TypeMerge,
            add_perimeter: false,
            fill_type_nulls: true,
            merge_type_into_name: true,
            backfill_defaults: false,
            repair_accents: false,
            output_columns: owned(&[
                columns::ID,
                columns::ID_STREET,
                columns::NAME,
                columns::OBS,
                columns::FIRST_YEAR,
                columns::LAST_YEAR,
                columns::VERSION,
                columns::CHANGESET_ID,
            ]),
            ..Self::edit_portal()
        }
    }

    pub fn with_acronyms(mut self, acronyms: Vec<AcronymRule>) -> Self {
        self.acronyms = acronyms;
        self
    }

    pub fn with_output_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output_columns = columns.into_iter().map(Into::into).collect();
        self
    }

    /// Output columns without the `geometry` pseudo-column.
    pub fn attribute_columns(&self) -> Vec<&str> {
        self.output_columns
            .iter()
            .map(String::as_str)
            .filter(|name| !name.eq_ignore_ascii_case(columns::GEOMETRY))
            .collect()
    }
}

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| (*name).to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_edit_portal() {
        let options = NormalizerOptions::default();
        assert_eq!(options.preset, Preset::EditPortal);
        assert!(options.add_perimeter);
        assert!(options.backfill_defaults);
        assert!(!options.merge_type_into_name);
        assert_eq!(options.output_columns.len(), 9);
        assert_eq!(options.acronyms.len(), 9);
    }

    #[test]
    fn type_merge_drops_perimeter() {
        let options = NormalizerOptions::preset(Preset::TypeMerge);
        assert!(options.merge_type_into_name);
        assert!(options.fill_type_nulls);
        assert!(!options.repair_accents);
        assert!(!options.output_columns.iter().any(|c| c == columns::PERIMETER));
        assert_eq!(options.acronyms, default_acronyms());
    }

    #[test]
    fn attribute_columns_skip_geometry() {
        let options = NormalizerOptions::default().with_output_columns(["id", "geometry", "name"]);
        assert_eq!(options.attribute_columns(), vec!["id", "name"]);
    }

    #[test]
    fn parses_presets() {
        assert_eq!("type-merge".parse::<Preset>(), Ok(Preset::TypeMerge));
        assert_eq!(" Edit-Portal ".parse::<Preset>(), Ok(Preset::EditPortal));
        assert!("portal".parse::<Preset>().is_err());
        assert_eq!(Preset::TypeMerge.to_string(), "type-merge");
    }

    #[test]
    fn acronym_order_starts_with_doctor() {
        let rules = default_acronyms();
        assert_eq!(rules[0], AcronymRule::new(" dr. ", " doutor "));
        assert_eq!(rules[8].replacement, "viaducto ");
    }
}
