//! Settings resolution from CLI args and config file.
//!
//! Every flag left unset on the command line falls back to the config value.

use crate::cli::{ClipArgs, SegmentArgs};
use crate::clipper::ClipOptions;
use crate::config::types::{Config, OutputFormat};
use crate::onset::{Backends, CsvPitchTrack, OnsetStrategy};
use crate::segment::{SegmentParams, Segmenter};
use std::path::PathBuf;

/// Resolved settings for the segment command.
#[derive(Debug, Clone)]
pub struct SegmentSettings {
    /// Onset strategy with overrides applied.
    pub strategy: OnsetStrategy,
    /// Validation settings.
    pub params: SegmentParams,
    /// Explicit pitch trace for the hll strategy.
    pub trace: Option<PathBuf>,
    /// Segment table formats to write.
    pub formats: Vec<OutputFormat>,
}

impl SegmentSettings {
    /// Build a segmenter for these settings.
    pub fn segmenter(&self) -> Segmenter {
        let tracker = self
            .trace
            .clone()
            .map_or_else(CsvPitchTrack::sidecar, CsvPitchTrack::at);
        Segmenter::new(self.strategy, self.params).with_backends(Backends {
            tracker: Box::new(tracker),
            ..Backends::default()
        })
    }
}

/// Build segment settings (CLI overrides config).
pub fn resolve_segment_settings(args: &SegmentArgs, config: &Config) -> SegmentSettings {
    let kind = args.strategy.unwrap_or(config.segment.strategy);

    let mut strategy = config.strategy(kind);
    if let Some(wait) = args.wait {
        strategy = strategy.with_wait(wait);
    }
    if let Some(delta) = args.delta {
        strategy = strategy.with_delta(delta);
    }

    let mut params = config.segment.params();
    if let Some(thresh) = args.db_delta_thresh {
        params.db_delta_thresh = thresh;
    }
    if let Some(sample_rate) = args.sample_rate {
        params.sample_rate = sample_rate;
    }

    let formats = args
        .format
        .clone()
        .unwrap_or_else(|| config.output.formats.clone());

    SegmentSettings {
        strategy,
        params,
        trace: args.trace.clone(),
        formats,
    }
}

/// Resolved settings for the clip command.
#[derive(Debug, Clone)]
pub struct ClipSettings {
    /// Directory clips are written under.
    pub output_dir: PathBuf,
    /// Fixed clip length in seconds.
    pub duration: f64,
    /// End each clip at the following onset.
    pub until_next: bool,
    /// Extractor options.
    pub options: ClipOptions,
}

/// Build clip settings (CLI overrides config).
pub fn resolve_clip_settings(args: &ClipArgs, config: &Config) -> ClipSettings {
    let mut options = config.clip.options();
    if let Some(noise_floor) = args.noise_floor {
        options.noise_floor = noise_floor;
    }
    options.seed = args.seed;

    ClipSettings {
        output_dir: args
            .output
            .clone()
            .unwrap_or_else(|| config.clip.output_dir.clone()),
        duration: args.duration.unwrap_or(config.clip.duration),
        until_next: args.until_next || config.clip.until_next,
        options,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp, clippy::panic)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use crate::onset::StrategyKind;
    use clap::Parser;

    fn segment_args(argv: &[&str]) -> SegmentArgs {
        let mut full = vec!["onsetcut", "segment", "in.wav"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Segment(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    fn clip_args(argv: &[&str]) -> ClipArgs {
        let mut full = vec!["onsetcut", "clip", "in.segments.csv"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Command::Clip(args) => args,
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_segment_defaults_come_from_config() {
        let mut config = Config::default();
        config.segment.strategy = StrategyKind::LogCqt;
        config.segment.db_delta_thresh = 7.0;
        config.output.formats = vec![OutputFormat::Json];

        let settings = resolve_segment_settings(&segment_args(&[]), &config);
        assert_eq!(settings.strategy.kind(), StrategyKind::LogCqt);
        assert_eq!(settings.params.db_delta_thresh, 7.0);
        assert_eq!(settings.formats, vec![OutputFormat::Json]);
        assert!(settings.trace.is_none());
    }

    #[test]
    fn test_segment_cli_overrides_config() {
        let config = Config::default();
        let args = segment_args(&[
            "--strategy",
            "hll",
            "--wait",
            "12",
            "--delta",
            "0.3",
            "-t",
            "1.5",
            "--trace",
            "in.f0.csv",
        ]);

        let settings = resolve_segment_settings(&args, &config);
        let OnsetStrategy::Hll(params) = settings.strategy else {
            panic!("expected hll strategy");
        };
        assert_eq!(params.wait, 12);
        assert_eq!(params.delta, 0.3);
        assert_eq!(settings.params.db_delta_thresh, 1.5);
        assert_eq!(settings.trace, Some(PathBuf::from("in.f0.csv")));
    }

    #[test]
    fn test_clip_defaults_come_from_config() {
        let mut config = Config::default();
        config.clip.duration = 2.0;
        config.clip.output_dir = PathBuf::from("cuts");

        let settings = resolve_clip_settings(&clip_args(&[]), &config);
        assert_eq!(settings.duration, 2.0);
        assert_eq!(settings.output_dir, PathBuf::from("cuts"));
        assert_eq!(settings.options.noise_floor, -65.0);
        assert!(!settings.until_next);
    }

    #[test]
    fn test_clip_cli_overrides_config() {
        let args = clip_args(&[
            "-o",
            "out",
            "-d",
            "0.5",
            "--noise-floor",
            "-90",
            "--seed",
            "3",
            "--until-next",
        ]);
        let settings = resolve_clip_settings(&args, &Config::default());
        assert_eq!(settings.output_dir, PathBuf::from("out"));
        assert_eq!(settings.duration, 0.5);
        assert_eq!(settings.options.noise_floor, -90.0);
        assert_eq!(settings.options.seed, Some(3));
        assert!(settings.until_next);
    }
}
