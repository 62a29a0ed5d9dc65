//! Configuration of [`Trainer`](super::Trainer).
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Trainer`](super::Trainer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Total number of environment steps of a training run.
    pub max_env_steps: usize,

    /// Number of environment steps collected before the first optimization
    /// step.
    pub warmup_period: usize,

    /// Number of environment steps between two optimization steps.
    pub opt_interval: usize,

    /// Number of environment steps between two model saves.
    pub save_interval: usize,

    /// Number of environment steps between two evaluations.
    pub eval_interval: usize,

    /// Number of evaluation episodes per evaluation.
    pub eval_episodes: usize,

    /// Number of completed episodes between two record flushes.
    pub flush_interval: usize,

    /// Number of completed episodes between two console reports.
    pub log_episode_interval: usize,

    /// Directory where models are saved.
    pub model_dir: Option<String>,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            max_env_steps: 1_000_000,
            warmup_period: 25_000,
            opt_interval: 1,
            save_interval: 10_000,
            eval_interval: 50_000,
            eval_episodes: 5,
            flush_interval: 5,
            log_episode_interval: 5,
            model_dir: None,
        }
    }
}

impl TrainerConfig {
    /// Sets the total number of environment steps.
    pub fn max_env_steps(mut self, v: usize) -> Self {
        self.max_env_steps = v;
        self
    }

    /// Sets the warmup period in environment steps.
    pub fn warmup_period(mut self, v: usize) -> Self {
        self.warmup_period = v;
        self
    }

    /// Sets the optimization interval in environment steps.
    pub fn opt_interval(mut self, v: usize) -> Self {
        self.opt_interval = v;
        self
    }

    /// Sets the save interval in environment steps.
    pub fn save_interval(mut self, v: usize) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the evaluation interval in environment steps.
    pub fn eval_interval(mut self, v: usize) -> Self {
        self.eval_interval = v;
        self
    }

    /// Sets the number of evaluation episodes.
    pub fn eval_episodes(mut self, v: usize) -> Self {
        self.eval_episodes = v;
        self
    }

    /// Sets the record flush interval in episodes.
    pub fn flush_interval(mut self, v: usize) -> Self {
        self.flush_interval = v;
        self
    }

    /// Sets the console report interval in episodes.
    pub fn log_episode_interval(mut self, v: usize) -> Self {
        self.log_episode_interval = v;
        self
    }

    /// Sets the directory where models are saved.
    pub fn model_dir(mut self, v: impl Into<String>) -> Self {
        self.model_dir = Some(v.into());
        self
    }

    /// Constructs [`TrainerConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
