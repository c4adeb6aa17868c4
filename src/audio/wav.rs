//! WAV writing and the file-level edit operations built on it.
//!
//! Everything written here is mono 16-bit PCM. Samples are scaled by
//! 32768 so that 16-bit sources survive a decode/write cycle bit-exactly.

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};

use super::{Waveform, decode_audio_file};
use crate::error::{Error, Result};

const I16_SCALE: f32 = 32768.0;

/// Write mono samples to a 16-bit WAV file.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let wav_err = |e| Error::WavWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    let mut writer = WavWriter::create(path, spec).map_err(wav_err)?;
    for &sample in samples {
        writer.write_sample(to_i16(sample)).map_err(wav_err)?;
    }
    writer.finalize().map_err(wav_err)?;

    Ok(())
}

/// Copy `[start, end)` seconds of `input` into `output`.
///
/// The window is clamped to the source; returns the number of samples
/// written, which is zero when the window lies past the end.
pub fn trim(input: &Path, output: &Path, start: f64, end: f64) -> Result<usize> {
    if !start.is_finite() || !end.is_finite() || start < 0.0 || end < start {
        return Err(Error::invalid(
            "window",
            format!("[{start}, {end}) is not a valid time range"),
        ));
    }

    let source = decode_audio_file(input)?;
    let first = seconds_to_index(start, source.sample_rate).min(source.len());
    let last = seconds_to_index(end, source.sample_rate).clamp(first, source.len());

    write_wav(output, &source.samples[first..last], source.sample_rate)?;
    Ok(last - first)
}

/// Join WAV `inputs` end to end into `output`.
///
/// All inputs must share one sample rate. Returns the total sample count.
pub fn concatenate<P: AsRef<Path>>(inputs: &[P], output: &Path) -> Result<usize> {
    let mut joined = Vec::new();
    let mut rate = None;

    for input in inputs {
        let input = input.as_ref();
        let part = read_wav(input)?;
        match rate {
            None => rate = Some(part.sample_rate),
            Some(expected) if expected != part.sample_rate => {
                return Err(Error::SampleRateMismatch {
                    path: input.to_path_buf(),
                    expected,
                    found: part.sample_rate,
                });
            }
            Some(_) => {}
        }
        joined.extend_from_slice(&part.samples);
    }

    let rate = rate.ok_or_else(|| Error::invalid("inputs", "nothing to concatenate"))?;
    write_wav(output, &joined, rate)?;
    Ok(joined.len())
}

/// Read a mono WAV file written by [`write_wav`] (or any PCM/float WAV).
///
/// Multi-channel files are averaged to mono.
#[allow(clippy::cast_precision_loss)]
pub fn read_wav(path: &Path) -> Result<Waveform> {
    let read_err = |e: hound::Error| Error::AudioDecode {
        path: path.to_path_buf(),
        source: Box::new(e),
    };

    let mut reader = hound::WavReader::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;
    let spec = reader.spec();

    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .samples::<f32>()
            .collect::<std::result::Result<_, _>>()
            .map_err(read_err)?,
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<_, _>>()
                .map_err(read_err)?
        }
    };

    let channels = usize::from(spec.channels.max(1));
    let samples = if channels == 1 {
        interleaved
    } else {
        let norm = channels as f32;
        interleaved
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / norm)
            .collect()
    };

    Ok(Waveform::new(samples, spec.sample_rate))
}

/// Map a time in seconds to the nearest sample index.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn seconds_to_index(seconds: f64, sample_rate: u32) -> usize {
    (seconds * f64::from(sample_rate)).round().max(0.0) as usize
}

#[allow(clippy::cast_possible_truncation)]
fn to_i16(sample: f32) -> i16 {
    (sample * I16_SCALE)
        .round()
        .clamp(f32::from(i16::MIN), f32::from(i16::MAX)) as i16
}
