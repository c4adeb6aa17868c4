//! Single file processing pipeline.

use crate::config::OutputFormat;
use crate::error::{Error, Result};
use crate::output::{CsvWriter, JsonWriter, OutputWriter, TableInfo};
use crate::pipeline::output_path_for;
use crate::segment::{SegmentTable, Segmenter};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Segment a single audio file and write its segment tables.
///
/// # Arguments
///
/// * `input_path` - Path to input audio file
/// * `output_dir` - Directory for output files
/// * `segmenter` - Configured segmenter
/// * `formats` - Output formats to generate
pub fn process_file(
    input_path: &Path,
    output_dir: &Path,
    segmenter: &Segmenter,
    formats: &[OutputFormat],
) -> Result<ProcessResult> {
    let start_time = Instant::now();

    info!("Processing: {}", input_path.display());

    let table = segmenter.segment(input_path)?;

    std::fs::create_dir_all(output_dir).map_err(|e| Error::OutputDirCreateFailed {
        path: output_dir.to_path_buf(),
        source: e,
    })?;

    let mut outputs = Vec::with_capacity(formats.len());
    for format in formats {
        outputs.push(write_output(input_path, output_dir, *format, &table)?);
    }

    let duration_secs = start_time.elapsed().as_secs_f64();
    let realtime_factor = if duration_secs > 0.0 {
        table.duration_secs / duration_secs
    } else {
        0.0
    };
    info!(
        "Found {} segments in {:.1}s of audio ({:.2}s, {:.1}x realtime)",
        table.len(),
        table.duration_secs,
        duration_secs,
        realtime_factor
    );

    Ok(ProcessResult {
        segments: table.len(),
        duration_secs,
        audio_duration_secs: table.duration_secs,
        outputs,
    })
}

/// Write a segment table to an output file.
fn write_output(
    input_path: &Path,
    output_dir: &Path,
    format: OutputFormat,
    table: &SegmentTable,
) -> Result<PathBuf> {
    let output_path = output_path_for(input_path, output_dir, format);
    debug!("Writing {} output: {}", format, output_path.display());

    let mut writer: Box<dyn OutputWriter> = match format {
        OutputFormat::Csv => Box::new(CsvWriter::new(&output_path)?),
        OutputFormat::Json => Box::new(JsonWriter::new(
            &output_path,
            TableInfo::from_table(table),
        )),
    };

    writer.write_header()?;
    for record in &table.records {
        writer.write_record(record)?;
    }
    writer.finalize()?;

    Ok(output_path)
}

/// Result of processing a single file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Number of segments kept.
    pub segments: usize,
    /// Processing duration in seconds.
    pub duration_secs: f64,
    /// Audio duration in seconds.
    pub audio_duration_secs: f64,
    /// Files written, in format order.
    pub outputs: Vec<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::audio::write_wav;
    use crate::onset::OnsetStrategy;
    use crate::segment::SegmentParams;
    use tempfile::TempDir;

    #[test]
    fn test_silent_file_writes_empty_tables() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("quiet.wav");
        write_wav(&input, &vec![0.0; 22050 * 2], 22050).unwrap();
        let out = dir.path().join("out");

        let segmenter = Segmenter::new(OnsetStrategy::default(), SegmentParams::default());
        let result = process_file(
            &input,
            &out,
            &segmenter,
            &[OutputFormat::Csv, OutputFormat::Json],
        )
        .unwrap();

        assert_eq!(result.segments, 0);
        assert_eq!(result.outputs.len(), 2);
        assert!((result.audio_duration_secs - 2.0).abs() < 1e-3);

        let csv = std::fs::read_to_string(out.join("quiet.segments.csv")).unwrap();
        assert_eq!(csv.trim_end(), "time,env_max,env_mean,env_std,env_delta");
        assert!(out.join("quiet.segments.json").exists());
    }

    #[test]
    fn test_missing_input_is_error() {
        let dir = TempDir::new().unwrap();
        let segmenter = Segmenter::new(OnsetStrategy::default(), SegmentParams::default());
        let result = process_file(
            &dir.path().join("missing.wav"),
            dir.path(),
            &segmenter,
            &[OutputFormat::Csv],
        );
        assert!(result.is_err());
        assert!(!dir.path().join("missing.segments.csv").exists());
    }
}
