//! Batch of transitions.

/// A batch of transitions sampled from a replay buffer.
pub trait TransitionBatch {
    /// Batch of observations.
    type ObsBatch;

    /// Batch of actions.
    type ActBatch;

    /// Unpacks the batch into
    /// `(obs, act, next_obs, reward, is_terminated, is_truncated)`.
    #[allow(clippy::type_complexity)]
    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    );

    /// The number of transitions in the batch.
    fn len(&self) -> usize;

    /// True when the batch is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
