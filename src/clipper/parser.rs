//! Segment table parsing.
//!
//! Reads the CSV segment tables written by the segment command back into
//! records for clip extraction. Uses the `csv` crate for robust parsing.

use std::path::Path;

use crate::Error;
use crate::segment::SegmentRecord;

/// Parse a segment table and return its records in file order.
///
/// Expects the columns `time,env_max,env_mean,env_std,env_delta`. A UTF-8
/// BOM and surrounding whitespace are tolerated.
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - Required columns are missing
/// - Values cannot be parsed
/// - A time is negative, non-finite or not strictly after the previous one
///
/// Returns `Ok(vec![])` if the table has no records (empty or header-only).
pub fn parse_segment_table(path: &Path) -> Result<Vec<SegmentRecord>, Error> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| Error::SegmentTableParse {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    let mut records: Vec<SegmentRecord> = Vec::new();

    for (line_num, result) in reader.deserialize::<SegmentRecord>().enumerate() {
        let line = line_num + 2;
        let record = result.map_err(|e| Error::InvalidSegmentTable {
            message: format!("{}: line {line}: {e}", path.display()),
        })?;

        if !record.time.is_finite() || record.time < 0.0 {
            return Err(Error::InvalidSegmentTable {
                message: format!(
                    "{}: line {line}: onset time must be a non-negative number, got {}",
                    path.display(),
                    record.time
                ),
            });
        }

        if let Some(prev) = records.last()
            && record.time <= prev.time
        {
            return Err(Error::InvalidSegmentTable {
                message: format!(
                    "{}: line {line}: onset time ({}) must be greater than the previous one ({})",
                    path.display(),
                    record.time,
                    prev.time
                ),
            });
        }

        records.push(record);
    }

    Ok(records)
}
