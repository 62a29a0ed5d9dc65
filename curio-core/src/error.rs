//! Errors raised by the library.
use thiserror::Error;

/// Errors raised while building, training or evaluating agents.
#[derive(Debug, Error)]
pub enum CurioError {
    /// The replay buffer holds fewer transitions than one batch requires.
    #[error("replay buffer has {len} transitions, but a batch of {requested} was requested")]
    InsufficientData {
        /// Number of transitions currently stored.
        len: usize,
        /// Requested batch size.
        requested: usize,
    },

    /// The key set of a checkpoint disagrees with the constructed networks.
    #[error("checkpoint key mismatch (missing: {missing:?}, unexpected: {unexpected:?})")]
    CheckpointKeyMismatch {
        /// Keys the networks expect but the checkpoint lacks.
        missing: Vec<String>,
        /// Keys the checkpoint carries but no network expects.
        unexpected: Vec<String>,
    },

    /// An input has a shape other than the configured one.
    #[error("shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Where the mismatch was detected.
        context: String,
        /// Expected shape.
        expected: Vec<usize>,
        /// Actual shape.
        got: Vec<usize>,
    },

    /// A loss evaluated to NaN or infinity during an optimization step.
    #[error("non-finite loss in {context}: {value}")]
    NonFiniteLoss {
        /// Which loss went non-finite.
        context: String,
        /// The offending value.
        value: f32,
    },

    /// A key was not found in a [`Record`](crate::record::Record).
    #[error("record has no entry for key \"{0}\"")]
    RecordKey(String),

    /// A record entry had a different variant than requested.
    #[error("record entry \"{0}\" has an unexpected value type")]
    RecordValueType(String),
}
