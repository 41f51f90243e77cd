use anyhow::{Context, Result};
use streets_model::{NormalizerConfig, NormalizerOptions};

use streets_cli::pipeline::{DEFAULT_SAMPLE_IDS, NormalizeResult, PipelineConfig, run_pipeline};

use crate::cli::{NormalizeArgs, RulesArgs};

pub fn run_normalize(args: &NormalizeArgs) -> Result<NormalizeResult> {
    let options = resolve_options(&args.rules)?;
    let config = PipelineConfig {
        input: args.input.clone(),
        output_dir: args.output_dir.clone(),
        output_name: args.output_name.clone(),
        output_encoding: args.encoding.into(),
        input_encoding: args.input_encoding.map(Into::into),
        options,
        sample_ids: if args.sample_ids.is_empty() {
            DEFAULT_SAMPLE_IDS.to_vec()
        } else {
            args.sample_ids.clone()
        },
        dry_run: args.dry_run,
    };
    run_pipeline(&config)
}

/// Preset from the command line, then the config file, then the default.
pub fn resolve_options(args: &RulesArgs) -> Result<NormalizerOptions> {
    let preset = args.preset.map(Into::into);
    let config = match &args.config {
        Some(path) => NormalizerConfig::load(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => NormalizerConfig::default(),
    };
    Ok(config.resolve(preset))
}
