//! Fixed-duration clip extraction.
//!
//! A clip is the `[start, end)` span of a source recording. When a target
//! duration is requested, longer spans are shortened to it and shorter ones
//! are padded at the end with low-level Gaussian noise, so every clip comes
//! out at exactly the requested length.
//!
//! All intermediate audio goes to temporary files next to the output, and
//! the output path is only replaced, by rename, once the clip is complete.

use std::path::{Path, PathBuf};

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};

use super::temp::{TempWav, is_temp_file};
use crate::audio::{concatenate, probe_sample_rate, seconds_to_index, trim, write_wav};
use crate::constants::clipper::DEFAULT_NOISE_FLOOR;
use crate::error::{Error, Result};

/// Level at which extraction outcomes are logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level.
    Error,
    /// Warning level.
    Warn,
    /// Info level.
    Info,
    /// Debug level.
    #[default]
    Debug,
    /// Trace level.
    Trace,
}

impl LogLevel {
    fn emit(self, message: &str) {
        match self {
            Self::Error => tracing::error!("{message}"),
            Self::Warn => tracing::warn!("{message}"),
            Self::Info => tracing::info!("{message}"),
            Self::Debug => tracing::debug!("{message}"),
            Self::Trace => tracing::trace!("{message}"),
        }
    }
}

/// Clip extraction settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipOptions {
    /// Level of the padding noise in dBFS.
    pub noise_floor: f64,
    /// Level at which trim and cleanup outcomes are logged.
    pub log_level: LogLevel,
    /// Seed for the padding noise; fresh entropy when unset.
    ///
    /// Each clip's noise is seeded from this and the clip's file name, so
    /// reruns reproduce every clip without clips sharing a padding tail.
    pub seed: Option<u64>,
}

impl Default for ClipOptions {
    fn default() -> Self {
        Self {
            noise_floor: DEFAULT_NOISE_FLOOR,
            log_level: LogLevel::default(),
            seed: None,
        }
    }
}

/// What an extraction produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipReport {
    /// Samples taken from the source.
    pub trimmed_samples: usize,
    /// Noise samples appended.
    pub padded_samples: usize,
    /// Sample rate of the clip.
    pub sample_rate: u32,
}

impl ClipReport {
    /// Total clip length in samples.
    pub const fn total_samples(&self) -> usize {
        self.trimmed_samples + self.padded_samples
    }
}

/// Extracts clips from source recordings.
#[derive(Debug, Clone, Default)]
pub struct ClipExtractor {
    options: ClipOptions,
}

impl ClipExtractor {
    /// Create an extractor with the given options.
    pub const fn new(options: ClipOptions) -> Self {
        Self { options }
    }

    /// The extractor's options.
    pub const fn options(&self) -> &ClipOptions {
        &self.options
    }

    /// Extract `[start_time, end_time)` of `input` into `output`.
    ///
    /// With a `duration`, the clip is cut or noise-padded to exactly that
    /// length. Returns `true` only if `output` exists afterwards and no
    /// temporary file from this extraction remains; failures are logged.
    pub fn extract_clip(
        &self,
        input: &Path,
        output: &Path,
        start_time: f64,
        end_time: f64,
        duration: Option<f64>,
    ) -> bool {
        let outcome = self.try_extract_clip(input, output, start_time, end_time, duration);
        let leftovers = leftover_temp_files(output);

        match outcome {
            Ok(report) => {
                self.options.log_level.emit(&format!(
                    "Cleanup {}: {} temporary files left beside {}",
                    if leftovers.is_empty() { "ok" } else { "incomplete" },
                    leftovers.len(),
                    output.display()
                ));
                tracing::trace!("{report:?}");
                output.exists() && leftovers.is_empty()
            }
            Err(e) => {
                tracing::warn!(
                    "Clip extraction failed for {}[{start_time}:{end_time}] -> {}: {e}",
                    input.display(),
                    output.display()
                );
                false
            }
        }
    }

    /// Fallible core of [`extract_clip`](Self::extract_clip).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for a malformed window or
    /// duration, and the underlying I/O error if any step fails. Temporary
    /// files are removed on every path and `output` is left untouched on
    /// failure.
    pub fn try_extract_clip(
        &self,
        input: &Path,
        output: &Path,
        start_time: f64,
        end_time: f64,
        duration: Option<f64>,
    ) -> Result<ClipReport> {
        validate_window(start_time, end_time, duration)?;

        let natural = end_time - start_time;
        let end_time = match duration {
            Some(d) if natural >= d => start_time + d,
            _ => end_time,
        };

        let trimmed = TempWav::beside(output)?;
        let trim_result = trim(input, trimmed.path(), start_time, end_time);
        self.options.log_level.emit(&format!(
            "Trim {}: {}[{start_time}:{end_time}] -> {}",
            if trim_result.is_ok() { "ok" } else { "failed" },
            input.display(),
            output.display()
        ));
        let trimmed_samples = trim_result.map_err(|e| Error::Trim {
            path: input.to_path_buf(),
            start: start_time,
            end: end_time,
            source: Box::new(e),
        })?;

        let sample_rate = probe_sample_rate(input)?;
        let target = duration.map_or(0, |d| seconds_to_index(d, sample_rate));
        let missing = target.saturating_sub(trimmed_samples);

        if missing == 0 {
            trimmed.persist(output)?;
        } else {
            let noise = TempWav::beside(output)?;
            write_wav(noise.path(), &self.noise(missing, output)?, sample_rate)?;

            let joined = TempWav::beside(output)?;
            concatenate(&[trimmed.path(), noise.path()], joined.path()).map_err(|e| {
                Error::Concatenate {
                    path: output.to_path_buf(),
                    source: Box::new(e),
                }
            })?;
            joined.persist(output)?;
        }

        Ok(ClipReport {
            trimmed_samples,
            padded_samples: missing,
            sample_rate,
        })
    }

    /// Gaussian padding noise at `noise_floor` dBFS for the clip at `output`.
    #[allow(clippy::cast_possible_truncation)]
    fn noise(&self, len: usize, output: &Path) -> Result<Vec<f32>> {
        let scale = 10f64.powf(self.options.noise_floor / 20.0) / 2.0;
        let normal = Normal::new(0.0, scale).map_err(|e| {
            Error::invalid(
                "noise_floor",
                format!("{e} (got {} dB)", self.options.noise_floor),
            )
        })?;
        let mut rng = self
            .options
            .seed
            .map_or_else(StdRng::from_entropy, |seed| {
                StdRng::seed_from_u64(clip_seed(seed, output))
            });

        Ok((0..len).map(|_| normal.sample(&mut rng) as f32).collect())
    }
}

fn validate_window(start: f64, end: f64, duration: Option<f64>) -> Result<()> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end <= start {
        return Err(Error::invalid(
            "window",
            format!("[{start}, {end}) is not a valid clip window"),
        ));
    }
    if let Some(d) = duration
        && (!d.is_finite() || d <= 0.0)
    {
        return Err(Error::invalid(
            "duration",
            format!("clip duration must be positive, got {d}"),
        ));
    }
    Ok(())
}

/// Mix the clip's file name into `seed` (FNV-1a), independent of its directory.
fn clip_seed(seed: u64, output: &Path) -> u64 {
    const FNV_PRIME: u64 = 0x0100_0000_01b3;

    let name = output.file_name().map(|n| n.to_string_lossy()).unwrap_or_default();
    name.bytes().fold(seed ^ 0xcbf2_9ce4_8422_2325, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

/// Temporary files created for `output` by this process that still exist.
fn leftover_temp_files(output: &Path) -> Vec<PathBuf> {
    let dir = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let stem = output
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("clip");
    let prefix = format!(".{stem}.{}.", std::process::id());

    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            is_temp_file(path)
                && path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with(&prefix))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::audio::read_wav;
    use tempfile::TempDir;

    const SR: u32 = 22050;

    /// Two seconds of a 16-bit-exact ramp.
    fn source(dir: &TempDir) -> PathBuf {
        #[allow(clippy::cast_precision_loss)]
        let samples: Vec<f32> = (0..2 * SR as usize)
            .map(|i| ((i % 128) as f32 - 64.0) / 256.0)
            .collect();
        let path = dir.path().join("source.wav");
        write_wav(&path, &samples, SR).unwrap();
        path
    }

    fn temp_files_in(dir: &Path) -> Vec<PathBuf> {
        std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().path())
            .filter(|p| is_temp_file(p))
            .collect()
    }

    #[test]
    fn test_short_span_is_padded_to_duration() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("clip.wav");

        let ok = ClipExtractor::default().extract_clip(&input, &output, 1.0, 1.2, Some(1.0));

        assert!(ok);
        let clip = read_wav(&output).unwrap();
        assert!(clip.len().abs_diff(SR as usize) <= 1, "len {}", clip.len());
        assert!(temp_files_in(dir.path()).is_empty());
    }

    #[test]
    fn test_padding_is_quiet_noise() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("clip.wav");
        let extractor = ClipExtractor::new(ClipOptions {
            seed: Some(11),
            ..ClipOptions::default()
        });

        let report = extractor
            .try_extract_clip(&input, &output, 1.0, 1.2, Some(1.0))
            .unwrap();
        assert_eq!(report.trimmed_samples, 4410);
        assert_eq!(report.padded_samples, SR as usize - 4410);
        assert_eq!(report.total_samples(), SR as usize);

        let clip = read_wav(&output).unwrap();
        let pad = &clip.samples[4410..];
        assert!(pad.iter().any(|&s| s != 0.0));
        assert!(pad.iter().all(|&s| s.abs() < 0.01));
    }

    #[test]
    fn test_without_duration_trim_is_exact_and_repeatable() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("clip.wav");
        let extractor = ClipExtractor::default();

        assert!(extractor.extract_clip(&input, &output, 0.5, 0.75, None));
        let first = std::fs::read(&output).unwrap();
        assert!(extractor.extract_clip(&input, &output, 0.5, 0.75, None));
        let second = std::fs::read(&output).unwrap();
        assert_eq!(first, second);

        let src = read_wav(&input).unwrap();
        let clip = read_wav(&output).unwrap();
        let (a, b) = (seconds_to_index(0.5, SR), seconds_to_index(0.75, SR));
        assert_eq!(clip.samples, src.samples[a..b]);
    }

    #[test]
    fn test_long_span_is_shortened() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("clip.wav");

        let report = ClipExtractor::default()
            .try_extract_clip(&input, &output, 0.25, 1.75, Some(0.5))
            .unwrap();
        assert_eq!(report.padded_samples, 0);
        assert_eq!(read_wav(&output).unwrap().len(), SR as usize / 2);
    }

    #[test]
    fn test_span_past_source_end_is_padded() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("tail.wav");

        let report = ClipExtractor::default()
            .try_extract_clip(&input, &output, 1.9, 2.5, Some(1.0))
            .unwrap();
        assert_eq!(report.trimmed_samples, 2205);
        assert_eq!(read_wav(&output).unwrap().len(), SR as usize);
    }

    #[test]
    fn test_seeded_padding_is_reproducible_per_clip() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let extractor = ClipExtractor::new(ClipOptions {
            seed: Some(5),
            ..ClipOptions::default()
        });
        let a = dir.path().join("take_0000.wav");
        let b = dir.path().join("take_0001.wav");

        assert!(extractor.extract_clip(&input, &a, 1.0, 1.1, Some(0.5)));
        let first = std::fs::read(&a).unwrap();
        assert!(extractor.extract_clip(&input, &a, 1.0, 1.1, Some(0.5)));
        assert_eq!(std::fs::read(&a).unwrap(), first);

        // Same span and seed, different clip: the noise tails differ
        assert!(extractor.extract_clip(&input, &b, 1.0, 1.1, Some(0.5)));
        let tail_a = read_wav(&a).unwrap().samples[2205..].to_vec();
        let tail_b = read_wav(&b).unwrap().samples[2205..].to_vec();
        assert_eq!(tail_a.len(), tail_b.len());
        assert_ne!(tail_a, tail_b);
    }

    #[test]
    fn test_clip_seed_ignores_directory() {
        let seed = clip_seed(5, Path::new("/out/a/take_0000.wav"));
        assert_eq!(seed, clip_seed(5, Path::new("other/take_0000.wav")));
        assert_ne!(seed, clip_seed(5, Path::new("/out/a/take_0001.wav")));
        assert_ne!(seed, clip_seed(6, Path::new("/out/a/take_0000.wav")));
    }

    #[test]
    fn test_missing_input_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clip.wav");

        let ok = ClipExtractor::default().extract_clip(
            &dir.path().join("missing.wav"),
            &output,
            0.0,
            1.0,
            Some(1.0),
        );

        assert!(!ok);
        assert!(!output.exists());
        assert!(temp_files_in(dir.path()).is_empty());
    }

    #[test]
    fn test_failure_leaves_existing_output_untouched() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("clip.wav");
        std::fs::write(&output, b"previous").unwrap();

        let result = ClipExtractor::default().try_extract_clip(
            &dir.path().join("missing.wav"),
            &output,
            0.0,
            1.0,
            None,
        );

        assert!(matches!(result, Err(Error::Trim { .. })));
        assert_eq!(std::fs::read(&output).unwrap(), b"previous");
    }

    #[test]
    fn test_invalid_windows_rejected() {
        let dir = TempDir::new().unwrap();
        let input = source(&dir);
        let output = dir.path().join("clip.wav");
        let extractor = ClipExtractor::default();

        for (start, end, duration) in [
            (1.0, 1.0, None),
            (1.0, 0.5, None),
            (-0.1, 0.5, None),
            (0.0, f64::NAN, None),
            (0.0, 0.5, Some(0.0)),
        ] {
            let result = extractor.try_extract_clip(&input, &output, start, end, duration);
            assert!(
                matches!(result, Err(Error::InvalidParameter { .. })),
                "[{start}, {end}) {duration:?}"
            );
        }
        assert!(!output.exists());
    }
}
