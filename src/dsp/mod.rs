//! Signal-processing building blocks shared by the onset strategies.

mod cqt;
mod envelope;
mod filter;
mod kernel;
mod peak_pick;

pub use cqt::{ConstantQ, CqtParams, SpectralTransform};
pub use envelope::{hann_window, log_envelope};
pub use filter::{filtfilt, lfilter, medfilt};
pub use kernel::{Kernel, edge_kernel, normalize_l1};
pub use peak_pick::{PeakPickParams, onset_detect, peak_pick};
