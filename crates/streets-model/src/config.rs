//! TOML overrides for [`NormalizerOptions`].
//!
//! Every key is optional; omitted keys keep the preset value.
//!
//! ```toml
//! preset = "type-merge"
//! repair_accents = true
//! output_columns = ["id", "name", "obs"]
//!
//! [[acronyms]]
//! pattern = "av. "
//! replacement = "avenida "
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::options::{AcronymRule, NormalizerOptions, Preset};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NormalizerConfig {
    pub preset: Option<Preset>,
    pub add_perimeter: Option<bool>,
    pub perimeter_default: Option<i64>,
    pub fill_type_nulls: Option<bool>,
    pub merge_type_into_name: Option<bool>,
    pub backfill_defaults: Option<bool>,
    pub version_default: Option<i64>,
    pub changeset_default: Option<i64>,
    pub repair_accents: Option<bool>,
    pub acronyms: Option<Vec<AcronymRule>>,
    pub output_columns: Option<Vec<String>>,
}

impl NormalizerConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded normalizer config");
        Ok(config)
    }

    /// Build options from the preset and apply the overrides.
    ///
    /// `preset_override` (the command line) wins over the file's `preset`.
    pub fn resolve(&self, preset_override: Option<Preset>) -> NormalizerOptions {
        let preset = preset_override.or(self.preset).unwrap_or_default();
        let mut options = NormalizerOptions::preset(preset);
        let config = self.clone();

        macro_rules! apply {
            ($($field:ident),*) => {
                $(if let Some(value) = config.$field {
                    options.$field = value;
                })*
            };
        }
        apply!(
            add_perimeter,
            perimeter_default,
            fill_type_nulls,
            merge_type_into_name,
            backfill_defaults,
            version_default,
            changeset_default,
            repair_accents,
            acronyms,
            output_columns
        );
        options
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_keeps_preset() {
        let config = NormalizerConfig::from_toml_str("").unwrap();
        assert_eq!(config.resolve(None), NormalizerOptions::edit_portal());
        assert_eq!(
            config.resolve(Some(Preset::TypeMerge)),
            NormalizerOptions::type_merge()
        );
    }

    #[test]
    fn overrides_apply_on_top_of_preset() {
        let config = NormalizerConfig::from_toml_str(
            r#"
preset = "type-merge"
repair_accents = true
version_default = 7
output_columns = ["id", "name"]

[[acronyms]]
pattern = "tv. "
replacement = "travessa "
"#,
        )
        .unwrap();

        let options = config.resolve(None);
        assert_eq!(options.preset, Preset::TypeMerge);
        assert!(options.merge_type_into_name);
        assert!(options.repair_accents);
        assert_eq!(options.version_default, 7);
        assert_eq!(options.output_columns, vec!["id", "name"]);
        assert_eq!(options.acronyms, vec![AcronymRule::new("tv. ", "travessa ")]);
    }

    #[test]
    fn cli_preset_wins_over_file() {
        let config = NormalizerConfig::from_toml_str("preset = \"type-merge\"").unwrap();
        assert_eq!(config.resolve(Some(Preset::EditPortal)).preset, Preset::EditPortal);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = NormalizerConfig::from_toml_str("add_perimiter = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = NormalizerConfig::load(Path::new("/nonexistent/normalizer.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
