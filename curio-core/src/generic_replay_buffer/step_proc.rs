//! Converts environment steps into replay buffer items.
use super::{BatchBase, GenericTransitionBatch};
use crate::{Env, Step, StepProcessor};
use std::marker::PhantomData;

/// Configuration of [`SimpleStepProcessor`].
#[derive(Clone, Debug, Default)]
pub struct SimpleStepProcessorConfig {}

/// Converts a [`Step`] into a [`GenericTransitionBatch`] of length 1.
///
/// The processor keeps the observation of the previous step to complete the
/// transition. When an episode ends, the next stored observation is taken
/// from [`Step::init_obs`].
pub struct SimpleStepProcessor<E, O, A> {
    prev_obs: Option<O>,
    phantom: PhantomData<(E, A)>,
}

impl<E, O, A> StepProcessor<E> for SimpleStepProcessor<E, O, A>
where
    E: Env,
    O: BatchBase + From<E::Obs>,
    A: BatchBase + From<E::Act>,
{
    type Config = SimpleStepProcessorConfig;
    type Output = GenericTransitionBatch<O, A>;

    fn build(_config: &Self::Config) -> Self {
        Self {
            prev_obs: None,
            phantom: PhantomData,
        }
    }

    fn reset(&mut self, init_obs: E::Obs) {
        self.prev_obs = Some(init_obs.into());
    }

    fn process(&mut self, step: Step<E>) -> Self::Output {
        let obs = self
            .prev_obs
            .take()
            .expect("reset() must be called before process()");
        let act = step.act.into();
        let next_obs: O = step.obs.clone().into();

        let transition = GenericTransitionBatch {
            obs,
            act,
            next_obs,
            reward: vec![step.reward],
            is_terminated: vec![step.is_terminated as i8],
            is_truncated: vec![step.is_truncated as i8],
        };

        self.prev_obs = if step.is_terminated || step.is_truncated {
            let init_obs = step
                .init_obs
                .expect("step_with_reset() must set init_obs at the end of an episode");
            Some(init_obs.into())
        } else {
            Some(step.obs.into())
        };

        transition
    }
}
