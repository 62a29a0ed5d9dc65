//! A FIFO replay buffer with uniform sampling.
use super::{BatchBase, GenericTransitionBatch, SimpleReplayBufferConfig};
use crate::{error::CurioError, ExperienceBufferBase, ReplayBufferBase, TransitionBatch};
use anyhow::Result;
use rand::{rngs::SmallRng, seq::index, SeedableRng};

/// A uniformly sampled replay buffer of a fixed capacity.
///
/// Transitions are stored in insertion order; once the buffer is full, the
/// oldest transition is overwritten (strict FIFO). Sampling draws indices
/// uniformly without replacement within one call and is independent across
/// calls. No ordering of the sampled transitions is guaranteed.
pub struct SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    capacity: usize,
    i: usize,
    size: usize,
    obs: O,
    act: A,
    next_obs: O,
    reward: Vec<f32>,
    is_terminated: Vec<i8>,
    is_truncated: Vec<i8>,
    rng: SmallRng,
}

impl<O, A> SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    /// The capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The reward stored at a raw slot index, for inspection in tests.
    pub fn reward_at(&self, ix: usize) -> f32 {
        self.reward[ix]
    }
}

impl<O, A> ExperienceBufferBase for SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Item = GenericTransitionBatch<O, A>;

    fn push(&mut self, tr: Self::Item) -> Result<()> {
        let len = tr.len();
        let (obs, act, next_obs, reward, is_terminated, is_truncated) = tr.unpack();

        for j in 0..len {
            let i = self.i;
            self.obs.push(i, obs.sample(&[j]));
            self.act.push(i, act.sample(&[j]));
            self.next_obs.push(i, next_obs.sample(&[j]));
            self.reward[i] = reward[j];
            self.is_terminated[i] = is_terminated[j];
            self.is_truncated[i] = is_truncated[j];

            self.i = (self.i + 1) % self.capacity;
            if self.size < self.capacity {
                self.size += 1;
            }
        }

        Ok(())
    }

    fn len(&self) -> usize {
        self.size
    }
}

impl<O, A> ReplayBufferBase for SimpleReplayBuffer<O, A>
where
    O: BatchBase,
    A: BatchBase,
{
    type Config = SimpleReplayBufferConfig;
    type Batch = GenericTransitionBatch<O, A>;

    fn build(config: &Self::Config) -> Self {
        let capacity = config.capacity;
        Self {
            capacity,
            i: 0,
            size: 0,
            obs: O::new(capacity),
            act: A::new(capacity),
            next_obs: O::new(capacity),
            reward: vec![0.0; capacity],
            is_terminated: vec![0; capacity],
            is_truncated: vec![0; capacity],
            rng: SmallRng::seed_from_u64(config.seed),
        }
    }

    fn batch(&mut self, size: usize) -> Result<Self::Batch> {
        if self.size < size {
            return Err(CurioError::InsufficientData {
                len: self.size,
                requested: size,
            }
            .into());
        }

        let ixs = index::sample(&mut self.rng, self.size, size).into_vec();

        Ok(GenericTransitionBatch {
            obs: self.obs.sample(&ixs),
            act: self.act.sample(&ixs),
            next_obs: self.next_obs.sample(&ixs),
            reward: ixs.iter().map(|&i| self.reward[i]).collect(),
            is_terminated: ixs.iter().map(|&i| self.is_terminated[i]).collect(),
            is_truncated: ixs.iter().map(|&i| self.is_truncated[i]).collect(),
        })
    }
}
