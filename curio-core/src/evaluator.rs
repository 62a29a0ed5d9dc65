//! Evaluation of policies.
use crate::{Env, Policy};
use anyhow::Result;

/// Evaluates a policy.
pub trait Evaluator<E: Env, P: Policy<E>> {
    /// Runs evaluation episodes and returns the mean episode return.
    ///
    /// Callers switch agents into evaluation mode before calling this
    /// method.
    fn evaluate(&mut self, policy: &mut P) -> Result<f32>;
}

/// Runs a fixed number of episodes and averages the episode returns.
pub struct DefaultEvaluator<E: Env> {
    n_episodes: usize,
    env: E,
}

impl<E: Env> DefaultEvaluator<E> {
    /// Builds the evaluator with its own environment instance.
    pub fn new(config: &E::Config, seed: i64, n_episodes: usize) -> Result<Self> {
        Ok(Self {
            n_episodes,
            env: E::build(config, seed)?,
        })
    }
}

impl<E, P> Evaluator<E, P> for DefaultEvaluator<E>
where
    E: Env,
    P: Policy<E>,
{
    fn evaluate(&mut self, policy: &mut P) -> Result<f32> {
        let mut total = 0f32;

        for _ in 0..self.n_episodes {
            let mut obs = self.env.reset()?;
            loop {
                let act = policy.sample(&obs);
                let (step, _) = self.env.step(&act);
                total += step.reward;
                if step.is_done() {
                    break;
                }
                obs = step.obs;
            }
        }

        Ok(total / self.n_episodes as f32)
    }
}
