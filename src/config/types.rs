//! Configuration type definitions.

use crate::clipper::{ClipOptions, LogLevel};
use crate::constants::{
    DEFAULT_DB_DELTA_THRESH, DEFAULT_SAMPLE_RATE, DEFAULT_WINDOW_SECS, clipper, envelope,
};
use crate::onset::{EnvelopeParams, HllParams, LogCqtParams, OnsetStrategy, StrategyKind};
use crate::segment::SegmentParams;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Segmentation settings.
    pub segment: SegmentConfig,

    /// Envelope strategy tuning.
    pub envelope: EnvelopeParams,

    /// Log-spectral strategy tuning.
    pub logcqt: LogCqtParams,

    /// Voicing strategy tuning.
    pub hll: HllParams,

    /// Clip extraction settings.
    pub clip: ClipConfig,

    /// Output settings.
    pub output: OutputConfig,
}

impl Config {
    /// Onset strategy of the given kind, tuned from this configuration.
    pub const fn strategy(&self, kind: StrategyKind) -> OnsetStrategy {
        match kind {
            StrategyKind::Hll => OnsetStrategy::Hll(self.hll),
            StrategyKind::LogCqt => OnsetStrategy::LogCqt(self.logcqt),
            StrategyKind::Envelope => OnsetStrategy::Envelope(self.envelope),
        }
    }
}

/// Segmentation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentConfig {
    /// Default onset strategy.
    pub strategy: StrategyKind,

    /// Minimum envelope rise (dB) for an onset to be kept.
    pub db_delta_thresh: f64,

    /// Rate recordings are resampled to before analysis.
    pub sample_rate: u32,

    /// Envelope window analysed after each onset, in seconds.
    pub window_secs: f64,

    /// Hann smoothing length of the validation envelope.
    pub envelope_smoothing: usize,
}

impl Default for SegmentConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::default(),
            db_delta_thresh: DEFAULT_DB_DELTA_THRESH,
            sample_rate: DEFAULT_SAMPLE_RATE,
            window_secs: DEFAULT_WINDOW_SECS,
            envelope_smoothing: envelope::DEFAULT_SMOOTHING,
        }
    }
}

impl SegmentConfig {
    /// Segmenter parameters described by this section.
    pub const fn params(&self) -> SegmentParams {
        SegmentParams {
            db_delta_thresh: self.db_delta_thresh,
            sample_rate: self.sample_rate,
            envelope_smoothing: self.envelope_smoothing,
            window_secs: self.window_secs,
        }
    }
}

/// Clip extraction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipConfig {
    /// Target clip length in seconds.
    pub duration: f64,

    /// Level of the padding noise in dBFS.
    pub noise_floor: f64,

    /// Directory clips are written to.
    pub output_dir: PathBuf,

    /// Level at which extraction outcomes are logged.
    pub log_level: LogLevel,

    /// End each clip at the following onset.
    pub until_next: bool,
}

impl Default for ClipConfig {
    fn default() -> Self {
        Self {
            duration: clipper::DEFAULT_DURATION,
            noise_floor: clipper::DEFAULT_NOISE_FLOOR,
            output_dir: PathBuf::from(clipper::DEFAULT_OUTPUT_DIR),
            log_level: LogLevel::default(),
            until_next: false,
        }
    }
}

impl ClipConfig {
    /// Extractor options described by this section.
    pub const fn options(&self) -> ClipOptions {
        ClipOptions {
            noise_floor: self.noise_floor,
            log_level: self.log_level,
            seed: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Segment table formats to write.
    pub formats: Vec<OutputFormat>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: vec![OutputFormat::Csv],
        }
    }
}

/// Supported segment table formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One row per segment.
    Csv,
    /// Table with run metadata.
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}
