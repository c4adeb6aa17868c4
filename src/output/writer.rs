//! Output writer trait definition.

use crate::error::Result;
use crate::segment::SegmentRecord;

/// Trait for writing segment tables.
pub trait OutputWriter {
    /// Write the file header (if applicable).
    fn write_header(&mut self) -> Result<()>;

    /// Write a single segment record.
    fn write_record(&mut self, record: &SegmentRecord) -> Result<()>;

    /// Finalize the output (flush, close, etc.).
    fn finalize(&mut self) -> Result<()>;
}
