//! Error types for onsetcut.

/// Result type alias for onsetcut operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for onsetcut.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A tuning value or call argument is malformed.
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParameter {
        /// Name of the offending parameter.
        name: &'static str,
        /// Why the value was rejected.
        reason: String,
    },

    /// Configuration directory could not be determined.
    #[error("could not determine configuration directory for this platform")]
    ConfigDirNotFound,

    /// Failed to read configuration file.
    #[error("failed to read config file '{path}'")]
    ConfigRead {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}'")]
    ConfigParse {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying parse error.
        #[source]
        source: toml::de::Error,
    },

    /// Configuration validation failed.
    #[error("configuration validation failed: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}'")]
    ConfigWrite {
        /// Path to the config file.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize configuration.
    #[error("failed to serialize config")]
    ConfigSerialize {
        /// Underlying serialization error.
        #[source]
        source: toml::ser::Error,
    },

    /// No valid audio files found.
    #[error("no valid audio files found in the provided paths")]
    NoValidAudioFiles,

    /// Failed to open audio file.
    #[error("failed to open audio file '{path}'")]
    AudioOpen {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to decode audio.
    #[error("failed to decode audio from '{path}'")]
    AudioDecode {
        /// Path to the audio file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// No audio tracks found.
    #[error("no audio tracks found in '{path}'")]
    NoAudioTracks {
        /// Path to the audio file.
        path: std::path::PathBuf,
    },

    /// Failed to resample audio.
    #[error("failed to resample audio: {reason}")]
    Resample {
        /// Description of the resampling failure.
        reason: String,
    },

    /// Failed to read a pitch/amplitude trace.
    #[error("failed to read pitch trace '{path}'")]
    PitchTraceRead {
        /// Path to the trace file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Pitch trace content is unusable.
    #[error("invalid pitch trace '{path}': {message}")]
    InvalidPitchTrace {
        /// Path to the trace file.
        path: std::path::PathBuf,
        /// Description of the problem.
        message: String,
    },

    /// Trimming the source audio failed.
    #[error("failed to trim '{path}' to [{start:.3}s, {end:.3}s)")]
    Trim {
        /// Source audio path.
        path: std::path::PathBuf,
        /// Window start in seconds.
        start: f64,
        /// Window end in seconds.
        end: f64,
        /// Underlying error.
        #[source]
        source: Box<Self>,
    },

    /// Concatenating clip parts failed.
    #[error("failed to concatenate into '{path}'")]
    Concatenate {
        /// Destination path.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<Self>,
    },

    /// Inputs to a concatenation disagree on sample rate.
    #[error("sample rate mismatch in '{path}': expected {expected} Hz, found {found} Hz")]
    SampleRateMismatch {
        /// Offending file.
        path: std::path::PathBuf,
        /// Rate of the first input.
        expected: u32,
        /// Rate of this input.
        found: u32,
    },

    /// Creating a temporary file failed.
    #[error("failed to create temporary file in '{dir}'")]
    TempFile {
        /// Directory the file was created in.
        dir: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Renaming a temporary file over its destination failed.
    #[error("failed to move temporary file into place at '{path}'")]
    Persist {
        /// Destination path.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failed to write WAV file.
    #[error("failed to write WAV file '{path}'")]
    WavWriteFailed {
        /// Path to the WAV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: hound::Error,
    },

    /// Failed to parse a segment table.
    #[error("failed to parse segment table '{path}'")]
    SegmentTableParse {
        /// Path to the table.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Invalid segment table content.
    #[error("invalid segment table: {message}")]
    InvalidSegmentTable {
        /// Description of the format error.
        message: String,
    },

    /// Failed to create output directory.
    #[error("failed to create output directory '{path}'")]
    OutputDirCreateFailed {
        /// Path to the output directory.
        path: std::path::PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Source audio file not found for a segment table.
    #[error("source audio file not found for segment table '{table_path}', expected '{audio_path}'")]
    SourceAudioNotFound {
        /// Path to the segment table.
        table_path: std::path::PathBuf,
        /// Expected path to the audio file.
        audio_path: std::path::PathBuf,
    },

    /// Failed to write JSON output file.
    #[error("failed to write JSON output file '{path}'")]
    JsonWrite {
        /// Path to the JSON file.
        path: std::path::PathBuf,
        /// Underlying serialization error.
        #[source]
        source: serde_json::Error,
    },

    /// Failed to write CSV output file.
    #[error("failed to write CSV output file '{path}'")]
    CsvWrite {
        /// Path to the CSV file.
        path: std::path::PathBuf,
        /// Underlying error.
        #[source]
        source: csv::Error,
    },
}

impl Error {
    /// Shorthand for an [`Error::InvalidParameter`].
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name,
            reason: reason.into(),
        }
    }
}
