//! CLI argument validators.
//!
//! Shared validation functions for CLI argument parsing.

use crate::onset::StrategyKind;

/// Parse an onset strategy name.
pub fn parse_strategy(s: &str) -> Result<StrategyKind, String> {
    s.parse::<StrategyKind>().map_err(|e| e.to_string())
}

/// Parse a finite number.
fn parse_finite(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{s}' is not a valid number"))?;

    if !value.is_finite() {
        return Err(format!("'{s}' is not a finite number"));
    }

    Ok(value)
}

/// Parse and validate a clip duration in seconds.
pub fn parse_duration(s: &str) -> Result<f64, String> {
    let value = parse_finite(s)?;

    if value <= 0.0 {
        return Err(format!("duration must be positive, got {value}"));
    }

    if value > 3600.0 {
        return Err(format!("duration cannot exceed 3600 seconds, got {value}"));
    }

    Ok(value)
}

/// Parse and validate a time offset in seconds.
pub fn parse_time(s: &str) -> Result<f64, String> {
    let value = parse_finite(s)?;

    if value < 0.0 {
        return Err(format!("time cannot be negative, got {value}"));
    }

    Ok(value)
}

/// Parse a decibel value (threshold or noise floor).
pub fn parse_db(s: &str) -> Result<f64, String> {
    parse_finite(s)
}

/// Parse and validate a non-negative peak-picking threshold.
pub fn parse_delta(s: &str) -> Result<f64, String> {
    let value = parse_finite(s)?;

    if value < 0.0 {
        return Err(format!("delta cannot be negative, got {value}"));
    }

    Ok(value)
}
