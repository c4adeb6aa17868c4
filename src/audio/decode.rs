//! Audio decoding using symphonia.

use crate::error::{Error, Result};
use std::fs::File;
use std::path::Path;
use symphonia::core::audio::{AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::IntoSample;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, MediaSourceStreamOptions};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

/// A single-channel, fully buffered recording.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    /// Mono samples in range [-1.0, 1.0].
    pub samples: Vec<f32>,
    /// Sample rate in Hz.
    pub sample_rate: u32,
}

impl Waveform {
    /// Wrap already-decoded samples.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    /// Duration in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.samples.len() as f64 / f64::from(self.sample_rate)
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the recording holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Decode an audio file to mono f32 samples at its native rate.
///
/// Supports WAV, FLAC, MP3, and AAC formats.
pub fn decode_audio_file(path: &Path) -> Result<Waveform> {
    let (mut format, track_id, sample_rate, channels) = open_track(path)?;

    let codec_params = format
        .tracks()
        .iter()
        .find(|t| t.id == track_id)
        .map(|t| t.codec_params.clone())
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&codec_params, &DecoderOptions::default())
        .map_err(|e| Error::AudioDecode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut samples = Vec::new();

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        };

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => append_mono(&decoded, channels, &mut samples),
            // A corrupt packet is dropped, the rest of the stream is still usable
            Err(symphonia::core::errors::Error::DecodeError(msg)) => {
                tracing::warn!("Skipping undecodable packet in {}: {msg}", path.display());
            }
            Err(e) => {
                return Err(Error::AudioDecode {
                    path: path.to_path_buf(),
                    source: Box::new(e),
                });
            }
        }
    }

    Ok(Waveform {
        samples,
        sample_rate,
    })
}

/// Read the sample rate of an audio file without decoding it.
pub fn probe_sample_rate(path: &Path) -> Result<u32> {
    let (_, _, sample_rate, _) = open_track(path)?;
    Ok(sample_rate)
}

/// Decode a file and resample it to `sample_rate`.
pub fn load_waveform(path: &Path, sample_rate: u32) -> Result<Waveform> {
    let decoded = decode_audio_file(path)?;
    if decoded.sample_rate == sample_rate {
        return Ok(decoded);
    }

    tracing::debug!(
        "Resampling {} from {} Hz to {} Hz",
        path.display(),
        decoded.sample_rate,
        sample_rate
    );
    let samples = super::resample(decoded.samples, decoded.sample_rate, sample_rate)?;
    Ok(Waveform {
        samples,
        sample_rate,
    })
}

/// Probe a file and locate its first audio track.
fn open_track(path: &Path) -> Result<(Box<dyn FormatReader>, u32, u32, usize)> {
    let file = File::open(path).map_err(|e| Error::AudioOpen {
        path: path.to_path_buf(),
        source: Box::new(e),
    })?;

    let mss = MediaSourceStream::new(Box::new(file), MediaSourceStreamOptions::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| Error::AudioOpen {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| Error::NoAudioTracks {
            path: path.to_path_buf(),
        })?;

    let track_id = track.id;
    let sample_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| Error::AudioDecode {
            path: path.to_path_buf(),
            source: "missing sample rate".into(),
        })?;
    let channels = track
        .codec_params
        .channels
        .map_or(1, symphonia::core::audio::Channels::count);

    Ok((format, track_id, sample_rate, channels))
}

/// Append decoded samples to the output buffer, averaging channels to mono.
fn append_mono(buffer: &AudioBufferRef, channels: usize, output: &mut Vec<f32>) {
    match buffer {
        AudioBufferRef::F32(buf) => mix_down(buf.as_ref(), channels, output),
        AudioBufferRef::F64(buf) => mix_down(buf.as_ref(), channels, output),
        AudioBufferRef::S16(buf) => mix_down(buf.as_ref(), channels, output),
        AudioBufferRef::S24(buf) => mix_down(buf.as_ref(), channels, output),
        AudioBufferRef::S32(buf) => mix_down(buf.as_ref(), channels, output),
        AudioBufferRef::U8(buf) => mix_down(buf.as_ref(), channels, output),
        _ => {
            tracing::warn!("Unsupported sample format, skipping buffer");
        }
    }
}

fn mix_down<S>(
    buf: &symphonia::core::audio::AudioBuffer<S>,
    channels: usize,
    output: &mut Vec<f32>,
) where
    S: Sample + IntoSample<f32>,
{
    let channels = channels.clamp(1, buf.spec().channels.count().max(1));
    if channels == 1 {
        output.extend(buf.chan(0).iter().map(|&s| s.into_sample()));
        return;
    }

    #[allow(clippy::cast_precision_loss)]
    let scale = 1.0 / channels as f32;
    for i in 0..buf.frames() {
        let sum: f32 = (0..channels)
            .map(|ch| -> f32 { buf.chan(ch)[i].into_sample() })
            .sum();
        output.push(sum * scale);
    }
}
