//! Fixed-duration clip extraction.
//!
//! This module cuts clips out of source recordings, either one per onset
//! listed in a segment table or for a single explicit time range, padding
//! short clips with noise up to the requested length.

pub mod command;
mod extractor;
mod parser;
mod temp;
mod windows;
mod writer;

pub use extractor::{ClipExtractor, ClipOptions, ClipReport, LogLevel};
pub use parser::parse_segment_table;
pub use temp::{TempWav, cleanup_all_temp_files, is_temp_file};
pub use windows::{ClipWindow, plan_windows};
pub use writer::ClipLayout;
