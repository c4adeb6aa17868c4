//! CLI for clip extraction subcommand.

use std::path::PathBuf;

use clap::Args;

use super::validators::{parse_db, parse_duration, parse_time};

/// Arguments for the clip subcommand.
#[derive(Debug, Args)]
pub struct ClipArgs {
    /// Segment tables to process (`.segments.csv`).
    #[arg(required_unless_present = "start")]
    pub tables: Vec<PathBuf>,

    /// Output directory for extracted clips (default from config: clips).
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Fixed clip length in seconds; short clips are padded with noise.
    #[arg(short, long, value_parser = parse_duration)]
    pub duration: Option<f64>,

    /// Level of the padding noise in dBFS.
    #[arg(long, value_parser = parse_db, allow_hyphen_values = true)]
    pub noise_floor: Option<f64>,

    /// Source audio file (auto-detected from the table name if omitted).
    #[arg(short, long)]
    pub audio: Option<PathBuf>,

    /// Base directory for locating source audio.
    /// If not specified, audio is looked up beside each table.
    #[arg(long)]
    pub base_dir: Option<PathBuf>,

    /// End each clip at the next onset instead of after a fixed length.
    #[arg(long)]
    pub until_next: bool,

    /// Start time in seconds for a single clip (requires --audio and --end).
    #[arg(long, value_parser = parse_time, requires_all = ["audio", "end"], conflicts_with = "tables")]
    pub start: Option<f64>,

    /// End time in seconds for a single clip.
    #[arg(long, value_parser = parse_time, requires = "start")]
    pub end: Option<f64>,

    /// Seed for the padding noise.
    #[arg(long)]
    pub seed: Option<u64>,

    /// Overwrite clips that already exist.
    #[arg(long)]
    pub force: bool,
}
