//! Application-wide constants.
//!
//! All magic numbers and strings are defined here to ensure consistency
//! and make changes easy to track.

/// Application name used for config directories and user-facing messages.
pub const APP_NAME: &str = "onsetcut";

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "ONSETCUT_CONFIG";

/// Sample rate every recording is resampled to before segmentation.
pub const DEFAULT_SAMPLE_RATE: u32 = 22050;

/// Default minimum envelope rise (dB) for a segment to be kept.
pub const DEFAULT_DB_DELTA_THRESH: f64 = 2.5;

/// Default length of the envelope window analysed after each onset.
pub const DEFAULT_WINDOW_SECS: f64 = 1.0;

/// Log envelope constants.
pub mod envelope {
    /// Power floor added before taking the log (10^-4.5).
    pub const POWER_FLOOR: f64 = 3.162_277_660_168_379_5e-5;

    /// Default Hann smoothing length in samples.
    pub const DEFAULT_SMOOTHING: usize = 100;
}

/// Envelope-novelty strategy defaults.
pub mod envelope_onsets {
    /// Decimation hop applied to the smoothed envelope.
    pub const HOP: usize = 100;
    /// Edge kernel length.
    pub const KERNEL_LENGTH: usize = 100;
    /// Edge kernel spread.
    pub const KERNEL_SPREAD: f64 = 3.5;
    /// Peak must be the maximum over this many frames before it.
    pub const PRE_MAX: usize = 500;
    /// Peak must be the maximum over this many frames after it.
    pub const POST_MAX: usize = 500;
    /// Averaging window before the peak.
    pub const PRE_AVG: usize = 10;
    /// Averaging window after the peak.
    pub const POST_AVG: usize = 10;
    /// Minimum height above the local average.
    pub const DELTA: f64 = 0.025;
    /// Minimum spacing between peaks in frames.
    pub const WAIT: usize = 100;
}

/// Log-spectral novelty strategy defaults.
pub mod logcqt {
    /// Hop between analysis frames in samples.
    pub const HOP_LENGTH: usize = 1024;
    /// Lowest bin centre frequency (A0).
    pub const FMIN: f64 = 27.5;
    /// Bins per octave.
    pub const BINS_PER_OCTAVE: usize = 24;
    /// Number of octaves covered.
    pub const OCTAVES: usize = 8;
    /// Gain applied before log compression.
    pub const LOG_GAIN: f64 = 5000.0;
    /// Standard deviation of the dither noise.
    pub const DITHER: f64 = 1e-3;
    /// Edge kernel length.
    pub const KERNEL_LENGTH: usize = 51;
    /// Edge kernel spread.
    pub const KERNEL_SPREAD: f64 = 3.5;
    /// Minimum normalized peak height.
    pub const DELTA: f64 = 0.05;
    /// Minimum spacing between peaks in frames.
    pub const WAIT: usize = 50;
}

/// Voicing strategy defaults.
pub mod hll {
    /// Median filter length applied to the pitch and amplitude traces.
    pub const MEDIAN_LEN: usize = 51;
    /// Voicing threshold on `frequency * amplitude`.
    pub const THRESHOLD: f64 = 0.5;
    /// Edge kernel length.
    pub const KERNEL_LENGTH: usize = 25;
    /// Edge kernel spread.
    pub const KERNEL_SPREAD: f64 = 3.5;
    /// Minimum spacing between peaks in frames.
    pub const WAIT: usize = 100;
    /// Suffix of the sidecar trace file next to an audio file.
    pub const TRACE_SUFFIX: &str = ".f0.csv";
}

/// Window defaults used by `onset_detect`.
///
/// These are the values the detector derives for a 22050 Hz signal analysed
/// with a 512-sample hop.
pub mod onset_detect {
    /// Frames before a peak that it must dominate.
    pub const PRE_MAX: usize = 1;
    /// Frames after a peak that it must dominate.
    pub const POST_MAX: usize = 1;
    /// Averaging window before the peak.
    pub const PRE_AVG: usize = 4;
    /// Averaging window after the peak.
    pub const POST_AVG: usize = 5;
    /// Minimum height above the local average.
    pub const DELTA: f64 = 0.07;
    /// Minimum spacing between peaks in frames.
    pub const WAIT: usize = 1;
}

/// Clipper constants for clip extraction.
pub mod clipper {
    /// Default noise floor for padding, in dBFS.
    pub const DEFAULT_NOISE_FLOOR: f64 = -65.0;

    /// Default clip duration in seconds.
    pub const DEFAULT_DURATION: f64 = 1.0;

    /// Default output directory for clips.
    pub const DEFAULT_OUTPUT_DIR: &str = "clips";

    /// Marker embedded in temporary file names.
    pub const TEMP_MARKER: &str = ".tmp";

    /// Supported audio file extensions for source audio resolution.
    pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "flac", "mp3", "m4a", "aac"];
}

/// Output file extensions by format.
pub mod output_extensions {
    /// Segment table CSV extension.
    pub const CSV: &str = ".segments.csv";
    /// Segment table JSON extension.
    pub const JSON: &str = ".segments.json";
}
