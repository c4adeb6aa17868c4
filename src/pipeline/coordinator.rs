//! Pipeline coordination for file processing.

use crate::config::OutputFormat;
use crate::constants::{clipper, output_extensions};
use crate::error::Result;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Result of checking whether a file should be processed.
#[derive(Debug, PartialEq, Eq)]
pub enum ProcessCheck {
    /// File should be processed.
    Process,
    /// Skip - output already exists.
    SkipExists,
}

/// Determine the output directory for a file.
pub fn output_dir_for(input: &Path, explicit_output_dir: Option<&Path>) -> PathBuf {
    explicit_output_dir.map_or_else(
        || {
            input
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        },
        Path::to_path_buf,
    )
}

/// Get output file path for a given format.
pub fn output_path_for(input: &Path, output_dir: &Path, format: OutputFormat) -> PathBuf {
    let stem = input.file_stem().map_or_else(
        || std::borrow::Cow::Borrowed("output"),
        |s| s.to_string_lossy(),
    );

    let extension = match format {
        OutputFormat::Csv => output_extensions::CSV,
        OutputFormat::Json => output_extensions::JSON,
    };

    output_dir.join(format!("{stem}{extension}"))
}

/// Check if a file should be processed.
pub fn should_process(
    input: &Path,
    output_dir: &Path,
    formats: &[OutputFormat],
    force: bool,
) -> ProcessCheck {
    // Check if all outputs exist (unless force)
    if !force {
        let all_exist = formats
            .iter()
            .all(|fmt| output_path_for(input, output_dir, *fmt).exists());
        if all_exist {
            return ProcessCheck::SkipExists;
        }
    }

    ProcessCheck::Process
}

/// Collect input files from paths (files and directories).
pub fn collect_input_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_audio_file(path) {
                files.push(path.clone());
            }
        } else if path.is_dir() {
            collect_audio_files_recursive(path, &mut files)?;
        } else {
            warn!("Skipping non-existent path: {}", path.display());
        }
    }

    Ok(files)
}

/// Recursively collect audio files from a directory.
fn collect_audio_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_audio_files_recursive(&path, files)?;
        } else if is_audio_file(&path) {
            files.push(path);
        }
    }

    Ok(())
}

/// Check if a file is a supported audio format.
fn is_audio_file(path: &Path) -> bool {
    use std::ffi::OsStr;

    path.extension().is_some_and(|ext| {
        clipper::AUDIO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(OsStr::new(known)))
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_output_dir_for_with_explicit() {
        let input = Path::new("/data/audio.wav");
        let output = output_dir_for(input, Some(Path::new("/results")));
        assert_eq!(output, PathBuf::from("/results"));
    }

    #[test]
    fn test_output_dir_for_without_explicit() {
        let input = Path::new("/data/audio.wav");
        let output = output_dir_for(input, None);
        assert_eq!(output, PathBuf::from("/data"));
    }

    #[test]
    fn test_output_path_for_csv() {
        let path = output_path_for(
            Path::new("test.wav"),
            Path::new("/output"),
            OutputFormat::Csv,
        );
        assert_eq!(path, PathBuf::from("/output/test.segments.csv"));
    }

    #[test]
    fn test_output_path_for_json() {
        let path = output_path_for(
            Path::new("/data/dawn.flac"),
            Path::new("/output"),
            OutputFormat::Json,
        );
        assert_eq!(path, PathBuf::from("/output/dawn.segments.json"));
    }

    #[test]
    fn test_should_process_skips_existing_outputs() {
        let dir = tempfile::TempDir::new().unwrap();
        let input = dir.path().join("dawn.wav");
        let formats = [OutputFormat::Csv, OutputFormat::Json];

        assert_eq!(
            should_process(&input, dir.path(), &formats, false),
            ProcessCheck::Process
        );

        std::fs::write(dir.path().join("dawn.segments.csv"), "").unwrap();
        assert_eq!(
            should_process(&input, dir.path(), &formats, false),
            ProcessCheck::Process
        );

        std::fs::write(dir.path().join("dawn.segments.json"), "").unwrap();
        assert_eq!(
            should_process(&input, dir.path(), &formats, false),
            ProcessCheck::SkipExists
        );
        assert_eq!(
            should_process(&input, dir.path(), &formats, true),
            ProcessCheck::Process
        );
    }

    #[test]
    fn test_collect_input_files_recurses_and_filters() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("day1");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join("a.wav"), b"").unwrap();
        std::fs::write(nested.join("b.flac"), b"").unwrap();
        std::fs::write(nested.join("notes.txt"), b"").unwrap();

        let mut files = collect_input_files(&[dir.path().to_path_buf()]).unwrap();
        files.sort();
        assert_eq!(files, vec![dir.path().join("a.wav"), nested.join("b.flac")]);
    }

    #[test]
    fn test_is_audio_file() {
        assert!(is_audio_file(Path::new("test.wav")));
        assert!(is_audio_file(Path::new("test.FLAC")));
        assert!(is_audio_file(Path::new("test.mp3")));
        assert!(!is_audio_file(Path::new("test.txt")));
    }

    #[test]
    fn test_non_ascii_names_keep_their_stem() {
        assert!(is_audio_file(Path::new("kirkkonummi_aamu.wav")));
        assert!(is_audio_file(Path::new("öljysatama.Mp3")));
        let path = output_path_for(
            Path::new("/data/öljysatama.flac"),
            Path::new("/out"),
            OutputFormat::Json,
        );
        assert_eq!(path, PathBuf::from("/out/öljysatama.segments.json"));
    }
}
