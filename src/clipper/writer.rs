//! Clip output layout.
//!
//! Decides where clips are written: one subdirectory per source recording.

use std::fs;
use std::path::{Path, PathBuf};

use crate::Error;

/// Places clips under an output directory.
#[derive(Debug, Clone)]
pub struct ClipLayout {
    /// Output directory for clips.
    output_dir: PathBuf,
}

impl ClipLayout {
    /// Create a layout rooted at `output_dir`.
    #[must_use]
    pub const fn new(output_dir: PathBuf) -> Self {
        Self { output_dir }
    }

    /// Root output directory.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Create the subdirectory for clips cut from `source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn prepare_source_dir(&self, source: &Path) -> Result<PathBuf, Error> {
        let dir = self.output_dir.join(sanitize_filename(&source_stem(source)));
        fs::create_dir_all(&dir).map_err(|e| Error::OutputDirCreateFailed {
            path: dir.clone(),
            source: e,
        })?;
        Ok(dir)
    }

    /// Path of the `index`-th clip cut from `source` at `start`.
    ///
    /// Format: `<output>/<stem>/<stem>_<index>_<start>s.wav`
    pub fn segment_clip_path(&self, source: &Path, index: usize, start: f64) -> PathBuf {
        let stem = sanitize_filename(&source_stem(source));
        self.output_dir
            .join(&stem)
            .join(generate_filename(&stem, index, start))
    }

    /// Path of a single clip cut from `source` over `[start, end)`.
    ///
    /// Format: `<output>/<stem>_<start>-<end>.wav`
    pub fn range_clip_path(&self, source: &Path, start: f64, end: f64) -> PathBuf {
        let stem = sanitize_filename(&source_stem(source));
        self.output_dir.join(format!("{stem}_{start:.3}-{end:.3}.wav"))
    }
}

fn source_stem(source: &Path) -> String {
    source
        .file_stem()
        .map_or_else(|| "audio".to_string(), |s| s.to_string_lossy().into_owned())
}

/// Sanitize a string for use as a filename/directory name.
///
/// Replaces characters that are invalid in filenames across platforms
/// and prevents path traversal attacks.
fn sanitize_filename(name: &str) -> String {
    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect();

    // Prevent path traversal: replace ".." with "__"
    sanitized.replace("..", "__")
}

/// Generate a filename for a segment clip.
///
/// Example: `dawn_0003_12.480s.wav`
fn generate_filename(stem: &str, index: usize, start: f64) -> String {
    format!("{stem}_{index:04}_{start:.3}s.wav")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("dawn chorus"), "dawn chorus");
        assert_eq!(sanitize_filename("a/b:c*d"), "a_b_c_d");
        assert_eq!(sanitize_filename("file?name"), "file_name");
    }

    #[test]
    fn test_sanitize_filename_prevents_path_traversal() {
        assert_eq!(sanitize_filename(".."), "__");
        assert_eq!(sanitize_filename("../etc"), "___etc");
        assert_eq!(sanitize_filename("site.a"), "site.a");
    }

    #[test]
    fn test_generate_filename() {
        assert_eq!(generate_filename("dawn", 3, 12.48), "dawn_0003_12.480s.wav");
    }

    #[test]
    fn test_segment_clip_path() {
        let layout = ClipLayout::new(PathBuf::from("clips"));
        let path = layout.segment_clip_path(Path::new("/data/dawn.flac"), 0, 1.5);
        assert_eq!(path, PathBuf::from("clips/dawn/dawn_0000_1.500s.wav"));
    }

    #[test]
    fn test_range_clip_path() {
        let layout = ClipLayout::new(PathBuf::from("clips"));
        let path = layout.range_clip_path(Path::new("dawn.wav"), 1.0, 1.2);
        assert_eq!(path, PathBuf::from("clips/dawn_1.000-1.200.wav"));
    }

    #[test]
    fn test_prepare_source_dir_creates_directory() {
        let dir = tempfile::TempDir::new().unwrap();
        let layout = ClipLayout::new(dir.path().join("out"));
        let created = layout.prepare_source_dir(Path::new("dawn.wav")).unwrap();
        assert!(created.is_dir());
        assert_eq!(created, dir.path().join("out").join("dawn"));
    }
}
