//! Onset detection strategies.
//!
//! Three interchangeable detectors map a recording to onset times:
//!
//! - `hll`: rises of a voicing indicator built from a pitch/amplitude trace
//! - `logcqt`: rises of a log-compressed constant-Q spectrum
//! - `envelope`: rises of the smoothed log-power envelope
//!
//! [`OnsetStrategy`] carries the chosen variant together with its tuning,
//! and [`OnsetStrategy::detect`] dispatches over it.

mod envelope;
mod hll;
mod logcqt;
mod tracker;

pub use envelope::{EnvelopeParams, envelope_onsets};
pub use hll::{HllParams, hll_onsets};
pub use logcqt::{LogCqtParams, logcqt_onsets};
pub use tracker::{CsvPitchTrack, PitchTrace, PitchTracker};

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::audio::Waveform;
use crate::dsp::{ConstantQ, SpectralTransform};
use crate::error::{Error, Result};

/// Strategy identifier, as used on the command line and in config files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Voicing indicator from a pitch/amplitude trace.
    Hll,
    /// Log constant-Q spectral novelty.
    LogCqt,
    /// Log envelope novelty.
    #[default]
    Envelope,
}

impl StrategyKind {
    /// All strategy identifiers.
    pub const ALL: [Self; 3] = [Self::Hll, Self::LogCqt, Self::Envelope];
}

impl std::fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hll => write!(f, "hll"),
            Self::LogCqt => write!(f, "logcqt"),
            Self::Envelope => write!(f, "envelope"),
        }
    }
}

impl std::str::FromStr for StrategyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "hll" => Ok(Self::Hll),
            "logcqt" => Ok(Self::LogCqt),
            "envelope" => Ok(Self::Envelope),
            other => Err(Error::invalid(
                "strategy",
                format!("unknown onset strategy '{other}' (expected hll, logcqt or envelope)"),
            )),
        }
    }
}

/// A configured onset detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OnsetStrategy {
    /// Voicing-based detection.
    Hll(HllParams),
    /// Spectral-novelty detection.
    LogCqt(LogCqtParams),
    /// Envelope-novelty detection.
    Envelope(EnvelopeParams),
}

impl Default for OnsetStrategy {
    fn default() -> Self {
        Self::Envelope(EnvelopeParams::default())
    }
}

impl From<StrategyKind> for OnsetStrategy {
    fn from(kind: StrategyKind) -> Self {
        match kind {
            StrategyKind::Hll => Self::Hll(HllParams::default()),
            StrategyKind::LogCqt => Self::LogCqt(LogCqtParams::default()),
            StrategyKind::Envelope => Self::Envelope(EnvelopeParams::default()),
        }
    }
}

/// What a strategy gets to look at.
#[derive(Debug, Clone, Copy)]
pub struct OnsetInput<'a> {
    /// Path of the recording.
    pub path: &'a Path,
    /// The decoded mono recording.
    pub waveform: &'a Waveform,
}

/// External collaborators used by the strategies.
pub struct Backends {
    /// Source of pitch/amplitude traces.
    pub tracker: Box<dyn PitchTracker>,
    /// Log-frequency spectral transform.
    pub transform: Box<dyn SpectralTransform>,
}

impl Default for Backends {
    fn default() -> Self {
        Self {
            tracker: Box::new(CsvPitchTrack::sidecar()),
            transform: Box::new(ConstantQ),
        }
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends").finish_non_exhaustive()
    }
}

impl OnsetStrategy {
    /// Identifier of this strategy.
    pub const fn kind(&self) -> StrategyKind {
        match self {
            Self::Hll(_) => StrategyKind::Hll,
            Self::LogCqt(_) => StrategyKind::LogCqt,
            Self::Envelope(_) => StrategyKind::Envelope,
        }
    }

    /// Override the minimum onset spacing, in the strategy's own frames.
    #[must_use]
    pub fn with_wait(mut self, wait: usize) -> Self {
        match &mut self {
            Self::Hll(p) => p.wait = wait,
            Self::LogCqt(p) => p.wait = wait,
            Self::Envelope(p) => p.wait = wait,
        }
        self
    }

    /// Override the peak-picking threshold.
    #[must_use]
    pub fn with_delta(mut self, delta: f64) -> Self {
        match &mut self {
            Self::Hll(p) => p.delta = delta,
            Self::LogCqt(p) => p.delta = delta,
            Self::Envelope(p) => p.delta = delta,
        }
        self
    }

    /// Detect onsets, in seconds.
    ///
    /// The result is strictly increasing and lies within the recording.
    /// An empty result is a valid outcome, not an error.
    pub fn detect(&self, input: &OnsetInput<'_>, backends: &Backends) -> Result<Vec<f64>> {
        let raw = match self {
            Self::Hll(params) => hll_onsets(input.path, backends.tracker.as_ref(), params)?,
            Self::LogCqt(params) => {
                logcqt_onsets(input.waveform, backends.transform.as_ref(), params)?
            }
            Self::Envelope(params) => envelope_onsets(input.waveform, params)?,
        };

        let onsets = within_recording(raw, input.waveform.duration_secs());
        tracing::debug!(
            "{}: {} onsets in {}",
            self.kind(),
            onsets.len(),
            input.path.display()
        );
        Ok(onsets)
    }
}

/// Keep times inside `[0, duration]`, dropping any that fail to increase.
fn within_recording(times: Vec<f64>, duration: f64) -> Vec<f64> {
    let mut kept: Vec<f64> = Vec::with_capacity(times.len());
    for t in times {
        if !(0.0..=duration).contains(&t) {
            continue;
        }
        if kept.last().is_some_and(|&prev| t <= prev) {
            continue;
        }
        kept.push(t);
    }
    kept
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_strategy_kind_round_trip() {
        for kind in StrategyKind::ALL {
            assert_eq!(kind.to_string().parse::<StrategyKind>().unwrap(), kind);
        }
        assert_eq!("LogCQT".parse::<StrategyKind>().unwrap(), StrategyKind::LogCqt);
    }

    #[test]
    fn test_unknown_strategy_is_invalid_parameter() {
        let err = "spectral".parse::<StrategyKind>().unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidParameter {
                name: "strategy",
                ..
            }
        ));
    }

    #[test]
    fn test_from_kind_uses_defaults() {
        assert_eq!(
            OnsetStrategy::from(StrategyKind::Hll),
            OnsetStrategy::Hll(HllParams::default())
        );
        assert_eq!(OnsetStrategy::default().kind(), StrategyKind::Envelope);
    }

    #[test]
    fn test_with_wait_applies_to_every_variant() {
        for kind in StrategyKind::ALL {
            let strategy = OnsetStrategy::from(kind).with_wait(7);
            let wait = match strategy {
                OnsetStrategy::Hll(p) => p.wait,
                OnsetStrategy::LogCqt(p) => p.wait,
                OnsetStrategy::Envelope(p) => p.wait,
            };
            assert_eq!(wait, 7);
        }
    }

    #[test]
    fn test_with_delta_keeps_kind() {
        let strategy = OnsetStrategy::from(StrategyKind::LogCqt).with_delta(0.2);
        assert_eq!(strategy.kind(), StrategyKind::LogCqt);
        let OnsetStrategy::LogCqt(params) = strategy else {
            panic!("kind changed");
        };
        assert!((params.delta - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn test_within_recording_filters_and_orders() {
        let kept = within_recording(vec![-0.1, 0.0, 0.5, 0.5, 0.4, 1.0, 1.5], 1.0);
        assert_eq!(kept, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn test_five_seconds_of_silence_has_no_onsets() {
        let waveform = Waveform::new(vec![0.0; 5 * 22050], 22050);
        let path = PathBuf::from("silence.wav");
        let input = OnsetInput {
            path: &path,
            waveform: &waveform,
        };

        let onsets = OnsetStrategy::default()
            .detect(&input, &Backends::default())
            .unwrap();
        assert!(onsets.is_empty());
    }
}
