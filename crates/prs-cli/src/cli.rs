//! CLI argument definitions for the payroll register mapper.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use prs_cli::pipeline::ColumnOverride;
use prs_model::SectionKind;

#[derive(Parser)]
#[command(
    name = "prs",
    version,
    about = "Payroll register mapping - review and confirm extracted column mappings",
    long_about = "Review machine-suggested column mappings for payroll register extracts,\n\
                  confirm them section by section, and save the compiled mapping."
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

    /// Allow sample cell values in trace logs (redacted by default).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML settings file with confidence, detector and template options.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List the sections and their target fields.
    Sections,

    /// Show suggested mappings for a source document without saving.
    Review(ReviewArgs),

    /// Confirm mappings for a source document and save them.
    Map(MapArgs),
}

#[derive(Args)]
pub struct ReviewArgs {
    /// Source document identifier.
    #[arg(value_name = "SOURCE_ID")]
    pub source_id: String,

    /// Directory holding `<SOURCE_ID>.json` extract files.
    #[arg(long = "extracts-dir", value_name = "DIR")]
    pub extracts_dir: PathBuf,
}

#[derive(Args)]
pub struct MapArgs {
    /// Source document identifier.
    #[arg(value_name = "SOURCE_ID")]
    pub source_id: String,

    /// Directory holding `<SOURCE_ID>.json` extract files.
    #[arg(long = "extracts-dir", value_name = "DIR")]
    pub extracts_dir: PathBuf,

    /// Directory for saved mappings (default: the extracts directory).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Confirm every suggestion at or above the auto-accept threshold.
    #[arg(long = "auto-accept")]
    pub auto_accept: bool,

    /// Choose a field for a column: SECTION:COLUMN=FIELD (FIELD may be `skip`).
    #[arg(long = "set", value_name = "SECTION:COLUMN=FIELD")]
    pub set: Vec<ColumnOverride>,

    /// Confirm a section (repeatable).
    #[arg(long = "confirm", value_name = "SECTION")]
    pub confirm: Vec<SectionKind>,

    /// Confirm every section that has data.
    #[arg(long = "confirm-all-sections")]
    pub confirm_all_sections: bool,

    /// Company name for the header metadata.
    #[arg(long = "company")]
    pub company: Option<String>,

    /// Pay period start date.
    #[arg(long = "pay-period-start", value_name = "DATE")]
    pub pay_period_start: Option<String>,

    /// Pay period end date.
    #[arg(long = "pay-period-end", value_name = "DATE")]
    pub pay_period_end: Option<String>,

    /// Check date.
    #[arg(long = "check-date", value_name = "DATE")]
    pub check_date: Option<String>,

    /// Remember the confirmed mapping for similarly-shaped files.
    #[arg(long = "remember")]
    pub remember: bool,

    /// Do not seed choices from remembered templates.
    #[arg(long = "no-templates")]
    pub no_templates: bool,

    /// Compile and report without saving.
    #[arg(long = "dry-run")]
    pub dry_run: bool,
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
