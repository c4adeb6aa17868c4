//! Clip command execution.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::Error;
use crate::cli::ClipArgs;
use crate::config::{ClipSettings, Config, resolve_clip_settings};
use crate::constants::{clipper, output_extensions};
use crate::output::progress;

use super::{ClipExtractor, ClipLayout, parse_segment_table, plan_windows};

/// Totals for one clip run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClipSummary {
    /// Segment tables processed without error.
    pub tables: usize,
    /// Clips written.
    pub written: usize,
    /// Clips left alone because they already exist.
    pub skipped: usize,
    /// Clips whose extraction failed.
    pub failed: usize,
}

/// Execute the clip command.
///
/// # Errors
///
/// Returns an error if direct extraction fails. Failures in batch mode are
/// logged per table and per clip.
pub fn execute(
    args: &ClipArgs,
    config: &Config,
    show_progress: bool,
) -> Result<ClipSummary, Error> {
    let settings = resolve_clip_settings(args, config);

    // Detect mode based on presence of --start/--end
    if let (Some(start), Some(end)) = (args.start, args.end) {
        let path = execute_direct_extraction(args, &settings, start, end)?;
        // Print only the clip path to stdout
        println!("{}", path.display());
        return Ok(ClipSummary {
            tables: 0,
            written: 1,
            ..ClipSummary::default()
        });
    }

    Ok(execute_table_mode(args, &settings, show_progress))
}

/// Cut one clip per onset from each segment table.
fn execute_table_mode(
    args: &ClipArgs,
    settings: &ClipSettings,
    show_progress: bool,
) -> ClipSummary {
    let extractor = ClipExtractor::new(settings.options);
    let layout = ClipLayout::new(settings.output_dir.clone());

    let mut summary = ClipSummary::default();

    for table in &args.tables {
        match process_segment_table(table, args, settings, &extractor, &layout, show_progress) {
            Ok(counts) => {
                summary.tables += 1;
                summary.written += counts.written;
                summary.skipped += counts.skipped;
                summary.failed += counts.failed;
            }
            Err(e) => {
                warn!("Failed to process {}: {e}", table.display());
            }
        }
    }

    info!(
        "Extracted {} clips from {} segment tables to {} ({} skipped, {} failed)",
        summary.written,
        summary.tables,
        layout.output_dir().display(),
        summary.skipped,
        summary.failed
    );

    summary
}

/// Extract a single clip for an explicit time range.
fn execute_direct_extraction(
    args: &ClipArgs,
    settings: &ClipSettings,
    start: f64,
    end: f64,
) -> Result<PathBuf, Error> {
    if end <= start {
        return Err(Error::invalid(
            "end",
            format!("end time ({end}) must be greater than start time ({start})"),
        ));
    }

    // audio is guaranteed by clap constraints
    let audio_path = args
        .audio
        .as_ref()
        .ok_or_else(|| Error::invalid("audio", "direct extraction needs --audio"))?;

    if !audio_path.exists() {
        return Err(Error::SourceAudioNotFound {
            table_path: PathBuf::new(),
            audio_path: audio_path.clone(),
        });
    }

    let layout = ClipLayout::new(settings.output_dir.clone());
    std::fs::create_dir_all(layout.output_dir()).map_err(|e| Error::OutputDirCreateFailed {
        path: layout.output_dir().to_path_buf(),
        source: e,
    })?;

    let clip_stop = clip_end(start, end, args.duration);
    let output_path = layout.range_clip_path(audio_path, start, clip_stop);
    let extractor = ClipExtractor::new(settings.options);
    let report = extractor.try_extract_clip(audio_path, &output_path, start, end, args.duration)?;

    info!(
        "Wrote {} samples ({} padded) to {}",
        report.total_samples(),
        report.padded_samples,
        output_path.display()
    );

    Ok(output_path)
}

/// End time of the clip actually written for `[start, end)`.
///
/// With a duration the clip is cut or padded to exactly that length.
fn clip_end(start: f64, end: f64, duration: Option<f64>) -> f64 {
    duration.map_or(end, |d| start + d)
}

fn process_segment_table(
    table: &Path,
    args: &ClipArgs,
    settings: &ClipSettings,
    extractor: &ClipExtractor,
    layout: &ClipLayout,
    show_progress: bool,
) -> Result<ClipSummary, Error> {
    info!("Processing {}", table.display());

    let records = parse_segment_table(table)?;
    if records.is_empty() {
        info!("No segments in {}", table.display());
        return Ok(ClipSummary::default());
    }

    let audio_path = find_source_audio(table, args.audio.as_ref(), args.base_dir.as_ref())?;
    info!("Using source audio: {}", audio_path.display());

    layout.prepare_source_dir(&audio_path)?;

    let times: Vec<f64> = records.iter().map(|r| r.time).collect();
    let windows = plan_windows(&times, settings.duration, settings.until_next);

    let file_name = audio_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let pb = progress::create_clip_progress(windows.len(), &file_name, show_progress);

    let mut counts = ClipSummary::default();

    for window in &windows {
        let clip_path = layout.segment_clip_path(&audio_path, window.index, window.start);

        if clip_path.exists() && !args.force {
            counts.skipped += 1;
            progress::inc_progress(pb.as_ref());
            continue;
        }

        if extractor.extract_clip(
            &audio_path,
            &clip_path,
            window.start,
            window.end,
            Some(settings.duration),
        ) {
            counts.written += 1;
        } else {
            warn!(
                "Failed to extract clip {} at {:.3}s-{:.3}s",
                window.index, window.start, window.end
            );
            counts.failed += 1;
        }

        progress::inc_progress(pb.as_ref());
    }

    progress::finish_progress(pb, "done");

    Ok(counts)
}

/// Find the source audio file for a segment table.
///
/// Resolution order:
/// 1. Explicit --audio path if provided
/// 2. Infer from the table filename in --base-dir (if provided)
/// 3. Infer from the table filename in the table's directory
fn find_source_audio(
    table: &Path,
    explicit_audio: Option<&PathBuf>,
    base_dir: Option<&PathBuf>,
) -> Result<PathBuf, Error> {
    if let Some(audio_path) = explicit_audio {
        if audio_path.exists() {
            return Ok(audio_path.clone());
        }
        return Err(Error::SourceAudioNotFound {
            table_path: table.to_path_buf(),
            audio_path: audio_path.clone(),
        });
    }

    // Tables are named: recording.segments.csv
    let file_name = table.file_name().and_then(|n| n.to_str()).unwrap_or("");
    let base_stem = file_name
        .strip_suffix(output_extensions::CSV)
        .or_else(|| table.file_stem().and_then(|s| s.to_str()))
        .unwrap_or("");

    // Determine search directory: --base-dir if provided, otherwise the table's parent
    let search_dir = base_dir.map_or_else(
        || match table.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        },
        PathBuf::as_path,
    );

    // Prevent path traversal: reject stems containing ".." or path separators
    if base_stem.is_empty()
        || base_stem.contains("..")
        || base_stem.contains('/')
        || base_stem.contains('\\')
    {
        return Err(Error::SourceAudioNotFound {
            table_path: table.to_path_buf(),
            audio_path: search_dir.join(base_stem),
        });
    }

    for ext in clipper::AUDIO_EXTENSIONS {
        let audio_path = search_dir.join(format!("{base_stem}.{ext}"));
        if audio_path.exists() {
            return Ok(audio_path);
        }
    }

    Err(Error::SourceAudioNotFound {
        table_path: table.to_path_buf(),
        audio_path: search_dir.join(base_stem),
    })
}
