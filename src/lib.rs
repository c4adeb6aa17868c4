//! Onsetcut - onset segmentation and clip extraction for audio recordings.
//!
//! This crate detects note or event onsets in recordings, keeps those that
//! rise clearly above the recording's background level, and cuts
//! fixed-length clips starting at them.

#![warn(missing_docs)]

pub mod audio;
pub mod cli;
pub mod clipper;
pub mod config;
pub mod constants;
pub mod dsp;
pub mod error;
pub mod onset;
pub mod output;
pub mod pipeline;
pub mod segment;

use clap::Parser;
use cli::{Cli, Command, SegmentArgs};
use config::{
    Config, config_file_path, load_default_config, resolve_segment_settings, save_default_config,
    validate_config,
};
use pipeline::{ProcessCheck, collect_input_files, output_dir_for, process_file, should_process};
use tracing::{error, info, warn};

pub use error::{Error, Result};

/// Main entry point for onsetcut CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose, cli.quiet);

    // Install Ctrl+C handler to remove half-written clips on interrupt
    if let Err(e) = ctrlc::set_handler(|| {
        clipper::cleanup_all_temp_files();
        std::process::exit(130); // 128 + SIGINT(2)
    }) {
        warn!("Failed to install Ctrl+C handler: {e}");
    }

    match cli.command {
        Command::Config { action } => handle_config_command(action),
        Command::Segment(args) => {
            let config = load_config()?;
            segment_files(&args, &config, !cli.quiet)
        }
        Command::Clip(args) => {
            let config = load_config()?;
            clipper::command::execute(&args, &config, !cli.quiet).map(|_| ())
        }
    }
}

/// Load and validate the configuration file.
fn load_config() -> Result<Config> {
    let config = load_default_config()?;
    validate_config(&config)?;
    Ok(config)
}

/// Segment input files with the given options.
fn segment_files(args: &SegmentArgs, config: &Config, progress_enabled: bool) -> Result<()> {
    use crate::output::progress;
    use std::time::Instant;

    let total_start = Instant::now();

    // Collect all input files
    let files = collect_input_files(&args.inputs)?;
    if files.is_empty() {
        return Err(Error::NoValidAudioFiles);
    }

    info!("Found {} audio file(s) to process", files.len());

    let settings = resolve_segment_settings(args, config);
    if settings.trace.is_some() && files.len() > 1 {
        warn!("--trace is used for every input file; omit it to read per-file traces");
    }
    let segmenter = settings.segmenter();

    info!(
        "Strategy: {} (keep onsets rising more than {} dB)",
        settings.strategy.kind(),
        settings.params.db_delta_thresh
    );

    let file_progress = progress::create_file_progress(files.len(), progress_enabled);

    let mut processed = 0;
    let mut skipped = 0;
    let mut errors = 0;
    let mut total_segments = 0;

    for file in &files {
        let file_output_dir = output_dir_for(file, args.output_dir.as_deref());

        if should_process(file, &file_output_dir, &settings.formats, args.force)
            == ProcessCheck::SkipExists
        {
            info!("Skipping (output exists): {}", file.display());
            skipped += 1;
            progress::inc_progress(file_progress.as_ref());
            continue;
        }

        match process_file(file, &file_output_dir, &segmenter, &settings.formats) {
            Ok(result) => {
                processed += 1;
                total_segments += result.segments;
            }
            Err(e) => {
                error!("Failed to process {}: {}", file.display(), e);
                errors += 1;
                if args.fail_fast {
                    progress::finish_progress(file_progress, "Failed");
                    return Err(e);
                }
            }
        }
        progress::inc_progress(file_progress.as_ref());
    }

    progress::finish_progress(file_progress, "Complete");

    let total_duration = total_start.elapsed().as_secs_f64();
    info!(
        "Complete: {} processed, {} skipped, {} errors, {} total segments in {:.2}s",
        processed, skipped, errors, total_segments, total_duration
    );

    if errors > 0 {
        warn!("{} file(s) had errors", errors);
    }

    Ok(())
}

fn init_logging(verbose: u8, quiet: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    // symphonia is chatty about probing at debug level
    let filter_str = if quiet {
        "warn"
    } else {
        match verbose {
            0 => "info,symphonia=warn",
            1 => "debug,symphonia=info",
            _ => "trace",
        }
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_str));

    // Logs go to stderr so stdout stays clean for clip paths
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn handle_config_command(action: cli::ConfigAction) -> Result<()> {
    use cli::ConfigAction;

    match action {
        ConfigAction::Init => {
            let path = config_file_path()?;
            if path.exists() {
                println!("Configuration file already exists: {}", path.display());
            } else {
                let config = Config::default();
                let saved_path = save_default_config(&config)?;
                println!("Created configuration file: {}", saved_path.display());
            }
            Ok(())
        }
        ConfigAction::Show => {
            let config = load_default_config()?;
            let rendered =
                toml::to_string_pretty(&config).map_err(|e| Error::ConfigSerialize { source: e })?;
            println!("{rendered}");
            Ok(())
        }
        ConfigAction::Path => {
            let path = config_file_path()?;
            println!("{}", path.display());
            Ok(())
        }
    }
}
