//! Configuration validation.

use crate::config::Config;
use crate::error::{Error, Result};

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_segment(config)?;
    validate_strategies(config)?;
    validate_clip(config)?;
    Ok(())
}

fn invalid(message: String) -> Error {
    Error::ConfigValidation { message }
}

/// Validate segmentation settings.
fn validate_segment(config: &Config) -> Result<()> {
    let segment = &config.segment;

    if !segment.db_delta_thresh.is_finite() {
        return Err(invalid(format!(
            "db_delta_thresh must be finite, got {}",
            segment.db_delta_thresh
        )));
    }

    if segment.sample_rate == 0 {
        return Err(invalid("sample_rate must be positive".to_string()));
    }

    if !segment.window_secs.is_finite() || segment.window_secs <= 0.0 {
        return Err(invalid(format!(
            "window_secs must be positive, got {}",
            segment.window_secs
        )));
    }

    Ok(())
}

/// Validate per-strategy tuning.
fn validate_strategies(config: &Config) -> Result<()> {
    if config.envelope.hop == 0 {
        return Err(invalid("envelope.hop must be at least 1".to_string()));
    }

    if config.envelope.kernel_length == 0 {
        return Err(invalid("envelope.kernel_length must be at least 1".to_string()));
    }

    if config.logcqt.hop_length == 0 {
        return Err(invalid("logcqt.hop_length must be at least 1".to_string()));
    }

    if config.logcqt.dither.is_nan() || config.logcqt.dither < 0.0 {
        return Err(invalid(format!(
            "logcqt.dither must be non-negative, got {}",
            config.logcqt.dither
        )));
    }

    // Median filtering needs a centred window
    if config.hll.median_len % 2 == 0 {
        return Err(invalid(format!(
            "hll.median_len must be odd, got {}",
            config.hll.median_len
        )));
    }

    Ok(())
}

/// Validate clip extraction settings.
fn validate_clip(config: &Config) -> Result<()> {
    let clip = &config.clip;

    if !clip.duration.is_finite() || clip.duration <= 0.0 {
        return Err(invalid(format!(
            "clip duration must be positive, got {}",
            clip.duration
        )));
    }

    if !clip.noise_floor.is_finite() {
        return Err(invalid(format!(
            "noise_floor must be finite, got {}",
            clip.noise_floor
        )));
    }

    Ok(())
}
