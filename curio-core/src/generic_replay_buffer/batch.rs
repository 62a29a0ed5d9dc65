//! Batch types of the generic replay buffer.
use crate::TransitionBatch;

/// Fixed-capacity storage of homogeneous items, addressable by index.
///
/// Implementations back either observations or actions of
/// [`SimpleReplayBuffer`](super::SimpleReplayBuffer). An instance created by
/// a conversion from a single observation or action has capacity 1 and is
/// pushed into the buffer's storage.
pub trait BatchBase {
    /// Creates storage for `capacity` items.
    fn new(capacity: usize) -> Self;

    /// Writes the items of `data` starting at `index`.
    fn push(&mut self, index: usize, data: Self);

    /// Gathers the items at the given indices into a new instance.
    fn sample(&self, ixs: &[usize]) -> Self;
}

/// A batch of transitions over generic observation and action batches.
///
/// This type serves two roles: single transitions produced by
/// [`SimpleStepProcessor`](super::SimpleStepProcessor) are represented as
/// batches of length 1 and pushed into the buffer, and sampling the buffer
/// yields a batch of the requested size.
pub struct GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// Observations before the transitions.
    pub obs: O,

    /// Actions applied.
    pub act: A,

    /// Observations after the transitions.
    pub next_obs: O,

    /// Rewards.
    pub reward: Vec<f32>,

    /// Termination flags, 1 when the episode reached a terminal state.
    pub is_terminated: Vec<i8>,

    /// Truncation flags, 1 when the episode was cut off.
    pub is_truncated: Vec<i8>,
}

impl<O, A> TransitionBatch for GenericTransitionBatch<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type ObsBatch = O;
    type ActBatch = A;

    fn unpack(
        self,
    ) -> (
        Self::ObsBatch,
        Self::ActBatch,
        Self::ObsBatch,
        Vec<f32>,
        Vec<i8>,
        Vec<i8>,
    ) {
        (
            self.obs,
            self.act,
            self.next_obs,
            self.reward,
            self.is_terminated,
            self.is_truncated,
        )
    }

    fn len(&self) -> usize {
        self.reward.len()
    }
}
