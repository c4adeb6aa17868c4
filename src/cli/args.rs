//! CLI argument definitions.

use super::clip::ClipArgs;
use super::validators::{parse_db, parse_delta, parse_strategy};
use crate::config::OutputFormat;
use crate::onset::StrategyKind;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Onset segmentation and fixed-length clip extraction for audio recordings.
#[derive(Debug, Parser)]
#[command(name = "onsetcut")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run.
    #[command(subcommand)]
    pub command: Command,

    /// Only log warnings and errors, and hide progress bars.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Increase verbosity (-v: debug, -vv: trace).
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Detect and validate onsets, writing one segment table per recording.
    Segment(SegmentArgs),
    /// Cut fixed-length clips from segment tables or a single time range.
    Clip(ClipArgs),
    /// Manage configuration.
    Config {
        /// Configuration action to perform.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommand actions.
#[derive(Debug, Clone, Copy, Subcommand)]
pub enum ConfigAction {
    /// Create default configuration file.
    Init,
    /// Display current configuration.
    Show,
    /// Print configuration file path.
    Path,
}

/// Arguments for the segment command.
#[derive(Debug, Args)]
pub struct SegmentArgs {
    /// Input files or directories to segment.
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Onset strategy (hll, logcqt, envelope).
    #[arg(short, long, value_parser = parse_strategy, env = "ONSETCUT_STRATEGY")]
    pub strategy: Option<StrategyKind>,

    /// Minimum envelope rise in dB for an onset to be kept.
    #[arg(short = 't', long, value_parser = parse_db, allow_hyphen_values = true)]
    pub db_delta_thresh: Option<f64>,

    /// Minimum spacing between onsets, in strategy frames.
    #[arg(long)]
    pub wait: Option<usize>,

    /// Peak-picking threshold.
    #[arg(long, value_parser = parse_delta)]
    pub delta: Option<f64>,

    /// Rate recordings are resampled to before analysis.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub sample_rate: Option<u32>,

    /// Pitch trace CSV for the hll strategy (default: `<stem>.f0.csv` beside the audio).
    #[arg(long)]
    pub trace: Option<PathBuf>,

    /// Output formats (comma-separated: csv,json).
    #[arg(short, long, value_delimiter = ',', env = "ONSETCUT_FORMAT")]
    pub format: Option<Vec<OutputFormat>>,

    /// Output directory (default: same as input).
    #[arg(short, long, env = "ONSETCUT_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Reprocess files even if output exists.
    #[arg(long)]
    pub force: bool,

    /// Stop on first error.
    #[arg(long)]
    pub fail_fast: bool,
}
