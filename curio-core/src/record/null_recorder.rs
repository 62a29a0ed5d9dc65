//! A recorder that discards everything.
use super::{AggregateRecorder, Record, Recorder};

/// Discards any record it receives.
///
/// Useful for tests and for runs where no telemetry is wanted.
#[derive(Default)]
pub struct NullRecorder {}

impl Recorder for NullRecorder {
    fn write(&mut self, _record: Record) {}
}

impl AggregateRecorder for NullRecorder {
    fn store(&mut self, _record: Record) {}

    fn flush(&mut self, _step: i64) {}
}
