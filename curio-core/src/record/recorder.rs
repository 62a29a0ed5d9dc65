//! Interfaces for writing records.
use super::Record;

/// Writes a [`Record`] to some destination.
pub trait Recorder {
    /// Writes a record.
    fn write(&mut self, record: Record);
}

/// Buffers records and writes their aggregation.
///
/// Scalar entries stored between two calls of [`AggregateRecorder::flush`]
/// are aggregated into their mean.
pub trait AggregateRecorder: Recorder {
    /// Stores a record for later aggregation.
    fn store(&mut self, record: Record);

    /// Aggregates the stored records and writes the result at `step`.
    fn flush(&mut self, step: i64);
}
