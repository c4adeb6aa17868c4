//! Segment table writers.

mod csv;
mod json;
pub mod progress;
mod types;
mod writer;

pub use csv::CsvWriter;
pub use json::{JsonSummary, JsonTableFile, JsonWriter};
pub use types::TableInfo;
pub use writer::OutputWriter;
