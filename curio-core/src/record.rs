//! Types for recording values obtained during training and evaluation.
mod base;
mod null_recorder;
mod recorder;
mod storage;

pub use base::{Record, RecordValue};
pub use null_recorder::NullRecorder;
pub use recorder::{AggregateRecorder, Recorder};
pub use storage::RecordStorage;
