//! Samples transitions from an environment.
use crate::{
    record::{Record, RecordValue},
    Env, ExperienceBufferBase, Policy, StepProcessor,
};
use anyhow::Result;

/// Steps an environment with a policy and pushes transitions into a replay
/// buffer.
///
/// The sampler tracks the return and the length of the running episode and
/// reports them in the record of the step that ends the episode.
pub struct Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    env: E,
    step_processor: P,
    prev_obs: Option<E::Obs>,
    episode_return: f32,
    episode_len: usize,
    n_episodes: usize,
    last_episode_return: f32,
}

impl<E, P> Sampler<E, P>
where
    E: Env,
    P: StepProcessor<E>,
{
    /// Creates a sampler.
    pub fn new(env: E, step_processor: P) -> Self {
        Self {
            env,
            step_processor,
            prev_obs: None,
            episode_return: 0.0,
            episode_len: 0,
            n_episodes: 0,
            last_episode_return: 0.0,
        }
    }

    /// The number of episodes completed so far.
    pub fn n_episodes(&self) -> usize {
        self.n_episodes
    }

    /// The return of the most recently completed episode.
    pub fn last_episode_return(&self) -> f32 {
        self.last_episode_return
    }

    /// Samples one step and pushes the resulting transition into `buffer`.
    ///
    /// The returned record contains environment information of the step and,
    /// when the step ended an episode, `episode_return` and `episode_len`.
    pub fn sample_and_push<A, R>(&mut self, policy: &mut A, buffer: &mut R) -> Result<Record>
    where
        A: Policy<E>,
        R: ExperienceBufferBase<Item = P::Output>,
    {
        if self.prev_obs.is_none() {
            let obs = self.env.reset()?;
            self.step_processor.reset(obs.clone());
            self.prev_obs = Some(obs);
        }

        let act = policy.sample(self.prev_obs.as_ref().unwrap());
        let (step, mut record) = self.env.step_with_reset(&act);

        self.episode_return += step.reward;
        self.episode_len += 1;

        if step.is_done() {
            self.prev_obs = step.init_obs.clone();
            record.insert(
                "episode_return",
                RecordValue::Scalar(self.episode_return),
            );
            record.insert(
                "episode_len",
                RecordValue::Scalar(self.episode_len as f32),
            );
            self.n_episodes += 1;
            self.last_episode_return = self.episode_return;
            self.episode_return = 0.0;
            self.episode_len = 0;
        } else {
            self.prev_obs = Some(step.obs.clone());
        }

        let transition = self.step_processor.process(step);
        buffer.push(transition)?;

        Ok(record)
    }
}
