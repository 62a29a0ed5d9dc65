//! Replay buffer interfaces.
use anyhow::Result;

/// A buffer into which experiences are pushed.
pub trait ExperienceBufferBase {
    /// Item pushed into the buffer.
    type Item;

    /// Pushes a transition into the buffer.
    fn push(&mut self, tr: Self::Item) -> Result<()>;

    /// The number of transitions currently stored.
    fn len(&self) -> usize;

    /// True when the buffer stores no transitions.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A replay buffer from which agents sample batches.
pub trait ReplayBufferBase: ExperienceBufferBase {
    /// Configuration of the buffer.
    type Config: Clone;

    /// Batch sampled from the buffer.
    type Batch;

    /// Builds the buffer.
    fn build(config: &Self::Config) -> Self;

    /// Samples a batch of the given size.
    ///
    /// Fails with [`CurioError::InsufficientData`] when the buffer stores
    /// fewer transitions than `size`.
    ///
    /// [`CurioError::InsufficientData`]: crate::error::CurioError::InsufficientData
    fn batch(&mut self, size: usize) -> Result<Self::Batch>;
}
