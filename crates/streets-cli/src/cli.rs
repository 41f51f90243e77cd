//! CLI argument definitions for the street normalizer.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use streets_model::Preset;
use streets_shp::ShpEncoding;

#[derive(Parser)]
#[command(
    name = "streets-normalizer",
    version,
    about = "Normalize street shapefile attributes",
    long_about = "Normalize the attributes of a street shapefile and export a new one.\n\n\
                  Expands abbreviations, repairs mis-decoded accents, fills missing\n\
                  values and reorders columns. Geometries are copied unchanged."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a shapefile and export the result.
    Normalize(NormalizeArgs),

    /// Print the effective acronym rules.
    Rules(RulesArgs),
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Source shapefile (.shp); its .dbf and .cpg siblings are read too.
    #[arg(
        value_name = "INPUT",
        default_value = "streets_pilot_area/streets_pilot_area.shp"
    )]
    pub input: PathBuf,

    /// Directory for the exported shapefile, created if missing.
    #[arg(long = "output-dir", value_name = "DIR", default_value = "streets_pilot_area_new")]
    pub output_dir: PathBuf,

    /// File name of the exported shapefile.
    #[arg(long = "output-name", value_name = "NAME", default_value = "streets_pilot_area.shp")]
    pub output_name: String,

    /// Attribute encoding of the exported shapefile.
    #[arg(long = "encoding", value_enum, default_value = "utf-8")]
    pub encoding: EncodingArg,

    /// Attribute encoding of the input (default: from .cpg, else Latin-1).
    #[arg(long = "input-encoding", value_enum)]
    pub input_encoding: Option<EncodingArg>,

    #[command(flatten)]
    pub rules: RulesArgs,

    /// Ids of rows to print after the run (repeatable).
    #[arg(long = "sample-id", value_name = "ID")]
    pub sample_ids: Vec<i64>,

    /// Normalize and report without writing output files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

#[derive(Args)]
pub struct RulesArgs {
    /// Normalizer preset (overrides the config file's preset).
    #[arg(long = "preset", value_enum)]
    pub preset: Option<PresetArg>,

    /// TOML file overriding preset options.
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum PresetArg {
    EditPortal,
    TypeMerge,
}

impl From<PresetArg> for Preset {
    fn from(value: PresetArg) -> Self {
        match value {
            PresetArg::EditPortal => Preset::EditPortal,
            PresetArg::TypeMerge => Preset::TypeMerge,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EncodingArg {
    #[value(name = "utf-8", alias = "utf8")]
    Utf8,
    #[value(name = "latin1", alias = "iso-8859-1")]
    Latin1,
}

impl From<EncodingArg> for ShpEncoding {
    fn from(value: EncodingArg) -> Self {
        match value {
            EncodingArg::Utf8 => ShpEncoding::Utf8,
            EncodingArg::Latin1 => ShpEncoding::Latin1,
        }
    }
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
