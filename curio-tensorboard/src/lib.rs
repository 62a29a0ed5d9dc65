//! Tensorboard recorder.
//!
//! [`TensorboardRecorder`] writes records as TFRecord event files under a
//! log directory. Scalar values become Tensorboard scalars; other record
//! values are ignored.
#![warn(missing_docs)]
use curio_core::record::{AggregateRecorder, Record, RecordStorage, RecordValue, Recorder};
use std::path::Path;
use tensorboard_rs::summary_writer::SummaryWriter;

/// Writes records to TFRecord event files.
///
/// The recorder buffers stored records and writes their aggregation when
/// [`AggregateRecorder::flush`] is called. Records written directly with
/// [`Recorder::write`] use the step of the most recent flush.
pub struct TensorboardRecorder {
    writer: SummaryWriter,
    storage: RecordStorage,
    latest_step: usize,
}

impl TensorboardRecorder {
    /// Creates a recorder writing under `logdir`.
    pub fn new<P: AsRef<Path>>(logdir: P) -> Self {
        Self {
            writer: SummaryWriter::new(logdir),
            storage: RecordStorage::new(),
            latest_step: 0,
        }
    }
}

impl Recorder for TensorboardRecorder {
    fn write(&mut self, record: Record) {
        for (k, v) in record.iter() {
            match v {
                RecordValue::Scalar(v) => self.writer.add_scalar(k, *v, self.latest_step),
                _ => {}
            }
        }
    }
}

impl AggregateRecorder for TensorboardRecorder {
    fn store(&mut self, record: Record) {
        self.storage.store(record);
    }

    fn flush(&mut self, step: i64) {
        self.latest_step = step as usize;
        let record = self.storage.aggregate();
        self.write(record);
        self.writer.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn flush_creates_event_files() {
        let logdir = TempDir::new("tensorboard_recorder").unwrap();
        let mut recorder = TensorboardRecorder::new(logdir.path());

        recorder.store(Record::from_scalar("loss", 0.5));
        recorder.store(Record::from_scalar("loss", 1.5));
        recorder.flush(1);

        let n_files = std::fs::read_dir(logdir.path()).unwrap().count();
        assert!(n_files > 0);
    }
}
