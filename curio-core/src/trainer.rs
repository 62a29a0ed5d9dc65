//! The training loop.
mod config;
mod sampler;

pub use config::TrainerConfig;
pub use sampler::Sampler;

use crate::{
    record::{AggregateRecorder, RecordValue},
    Agent, Env, Evaluator, ReplayBufferBase, StepProcessor,
};
use anyhow::Result;
use log::info;
use std::path::PathBuf;

/// Runs the interaction loop of a single-threaded training run.
///
/// Each iteration performs one environment step, pushes the transition into
/// the replay buffer, and, after the warmup period, performs one agent
/// optimization step every `opt_interval` environment steps. Evaluation,
/// model saving and record flushing happen at their configured intervals.
pub struct Trainer {
    config: TrainerConfig,
}

impl Trainer {
    /// Builds the trainer.
    pub fn build(config: TrainerConfig) -> Self {
        Self { config }
    }

    fn model_path(&self, name: &str) -> Option<PathBuf> {
        self.config
            .model_dir
            .as_ref()
            .map(|dir| PathBuf::from(dir).join(name))
    }

    /// Runs a training loop.
    pub fn train<E, P, A, R, D>(
        &mut self,
        env: E,
        step_processor: P,
        agent: &mut A,
        buffer: &mut R,
        recorder: &mut Box<dyn AggregateRecorder>,
        evaluator: &mut D,
    ) -> Result<()>
    where
        E: Env,
        P: StepProcessor<E>,
        A: Agent<E, R>,
        R: ReplayBufferBase<Item = P::Output>,
        D: Evaluator<E, A>,
    {
        let mut sampler = Sampler::new(env, step_processor);
        let mut best_eval_return = f32::NEG_INFINITY;
        let mut last_flushed_episode = 0;
        let mut last_logged_episode = 0;

        agent.train();

        for env_step in 1..=self.config.max_env_steps {
            let record = sampler.sample_and_push(agent, buffer)?;
            if !record.is_empty() {
                recorder.store(record);
            }

            if env_step >= self.config.warmup_period
                && env_step % self.config.opt_interval == 0
            {
                let opt_record = agent.opt(buffer)?;
                recorder.store(opt_record);
            }

            if env_step % self.config.eval_interval == 0 {
                agent.eval();
                let eval_return = evaluator.evaluate(agent)?;
                agent.train();
                info!("env step {env_step}: evaluation return {eval_return}");

                let mut record = crate::record::Record::empty();
                record.insert("eval_return", RecordValue::Scalar(eval_return));
                recorder.store(record);

                if eval_return > best_eval_return {
                    best_eval_return = eval_return;
                    if let Some(path) = self.model_path("best.safetensors") {
                        if let Some(dir) = path.parent() {
                            std::fs::create_dir_all(dir)?;
                        }
                        agent.save_params(&path)?;
                    }
                }
            }

            if env_step % self.config.save_interval == 0 {
                if let Some(path) = self.model_path("latest.safetensors") {
                    if let Some(dir) = path.parent() {
                        std::fs::create_dir_all(dir)?;
                    }
                    agent.save_params(&path)?;
                }
            }

            let n_episodes = sampler.n_episodes();
            if n_episodes > last_flushed_episode
                && n_episodes % self.config.flush_interval == 0
            {
                recorder.flush(n_episodes as i64);
                last_flushed_episode = n_episodes;
            }
            if n_episodes > last_logged_episode
                && n_episodes % self.config.log_episode_interval == 0
            {
                info!(
                    "episode {n_episodes} at env step {env_step}, return {}",
                    sampler.last_episode_return()
                );
                last_logged_episode = n_episodes;
            }
        }

        recorder.flush(sampler.n_episodes() as i64);

        Ok(())
    }
}
