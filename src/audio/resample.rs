//! Audio resampling using rubato.

use crate::error::{Error, Result};
use audioadapter_buffers::direct::SequentialSlice;
use rubato::{Fft, FixedSync, Resampler};

/// Frames fed to the resampler per call.
const CHUNK_SIZE: usize = 1024;

/// Resample mono audio to the target sample rate.
///
/// Returns the input unchanged if already at the target rate. The output
/// length is `ceil(len * to / from)` so time-to-index mapping stays exact.
pub fn resample(samples: Vec<f32>, from_rate: u32, to_rate: u32) -> Result<Vec<f32>> {
    if from_rate == to_rate || samples.is_empty() {
        return Ok(samples);
    }
    if from_rate == 0 || to_rate == 0 {
        return Err(Error::Resample {
            reason: format!("cannot resample between {from_rate} Hz and {to_rate} Hz"),
        });
    }

    let mut resampler = Fft::<f32>::new(
        from_rate as usize,
        to_rate as usize,
        CHUNK_SIZE,
        1,
        1,
        FixedSync::Both,
    )
    .map_err(|e| Error::Resample {
        reason: e.to_string(),
    })?;

    let frames_in = resampler.input_frames_next();
    let expected = expected_output_len(samples.len(), from_rate, to_rate);
    let mut output = Vec::with_capacity(expected + CHUNK_SIZE);

    let mut chunks = samples.chunks(frames_in);
    for chunk in chunks.by_ref() {
        if chunk.len() == frames_in {
            process_chunk(&mut resampler, chunk, frames_in, &mut output)?;
        } else {
            // Zero-pad the tail to a full chunk
            let mut padded = chunk.to_vec();
            padded.resize(frames_in, 0.0);
            process_chunk(&mut resampler, &padded, frames_in, &mut output)?;
        }
    }

    // Flush the resampler delay so the tail of the signal is not lost
    let delay = resampler.output_delay();
    while output.len() < expected + delay {
        let silence = vec![0.0; frames_in];
        process_chunk(&mut resampler, &silence, frames_in, &mut output)?;
    }

    let end = (delay + expected).min(output.len());
    Ok(output[delay.min(end)..end].to_vec())
}

fn process_chunk(
    resampler: &mut Fft<f32>,
    chunk: &[f32],
    frames_in: usize,
    output: &mut Vec<f32>,
) -> Result<()> {
    let input = SequentialSlice::new(chunk, 1, frames_in).map_err(|e| Error::Resample {
        reason: format!("failed to create input adapter: {e}"),
    })?;

    let resampled = resampler
        .process(&input, 0, None)
        .map_err(|e| Error::Resample {
            reason: e.to_string(),
        })?;

    output.extend_from_slice(&resampled.take_data());
    Ok(())
}

/// Number of output samples that covers the input duration.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn expected_output_len(input_len: usize, from_rate: u32, to_rate: u32) -> usize {
    ((input_len as f64) * f64::from(to_rate) / f64::from(from_rate)).ceil() as usize
}
