//! Audio input/output: decoding, resampling and WAV editing.

mod decode;
mod resample;
mod wav;

pub use decode::{Waveform, decode_audio_file, load_waveform, probe_sample_rate};
pub use resample::resample;
pub use wav::{concatenate, read_wav, seconds_to_index, trim, write_wav};
