//! Configuration of [`Dqn`](super::Dqn).
use super::{EpsilonGreedy, QNetworkConfig};
use crate::{
    curiosity::CuriosityConfig,
    opt::OptimizerConfig,
    util::{CriticLoss, OutDim},
    Device,
};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Dqn`](super::Dqn).
///
/// `Q` is the configuration type of the action value network.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DqnConfig<Q>
where
    Q: OutDim + Clone,
{
    /// Configuration of the action value network.
    pub model_config: QNetworkConfig<Q>,

    /// Configuration of the shared optimizer.
    pub opt_config: OptimizerConfig,

    /// Discount factor.
    pub gamma: f64,

    /// Batch size of an optimization step.
    pub batch_size: usize,

    /// Number of optimization steps between two hard target updates.
    pub sync_interval: usize,

    /// Uses double Q-learning targets when true.
    pub double_dqn: bool,

    /// The loss applied to the TD error.
    pub critic_loss: CriticLoss,

    /// Exploration schedule.
    pub explorer: EpsilonGreedy,

    /// Curiosity module; plain DQN when `None`.
    pub curiosity_config: Option<CuriosityConfig<Q>>,

    /// Seed of the exploration random number generator.
    pub seed: u64,

    /// Device on which the networks are built.
    pub device: Option<Device>,
}

impl<Q> Default for DqnConfig<Q>
where
    Q: OutDim + Clone,
{
    fn default() -> Self {
        Self {
            model_config: QNetworkConfig::default(),
            opt_config: OptimizerConfig::default(),
            gamma: 0.99,
            batch_size: 128,
            sync_interval: 10_000,
            double_dqn: false,
            critic_loss: CriticLoss::SmoothL1,
            explorer: EpsilonGreedy::default(),
            curiosity_config: None,
            seed: 42,
            device: None,
        }
    }
}

impl<Q> DqnConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Sets the configuration of the action value network.
    pub fn model_config(mut self, v: QNetworkConfig<Q>) -> Self {
        self.model_config = v;
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the target update interval in optimization steps.
    pub fn sync_interval(mut self, v: usize) -> Self {
        self.sync_interval = v;
        self
    }

    /// Enables or disables double Q-learning.
    pub fn double_dqn(mut self, v: bool) -> Self {
        self.double_dqn = v;
        self
    }

    /// Sets the loss applied to the TD error.
    pub fn critic_loss(mut self, v: CriticLoss) -> Self {
        self.critic_loss = v;
        self
    }

    /// Sets the exploration schedule.
    pub fn explorer(mut self, v: EpsilonGreedy) -> Self {
        self.explorer = v;
        self
    }

    /// Attaches a curiosity module.
    pub fn curiosity_config(mut self, v: CuriosityConfig<Q>) -> Self {
        self.curiosity_config = Some(v);
        self
    }

    /// Sets the exploration seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`DqnConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DqnConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curiosity::CuriosityKind;
    use crate::mlp::MlpConfig;
    use tempdir::TempDir;

    #[test]
    fn yaml_round_trip_with_curiosity() {
        let dir = TempDir::new("dqn_config").unwrap();
        let path = dir.path().join("dqn.yaml");

        let config = DqnConfig::default()
            .model_config(
                QNetworkConfig::default().q_config(MlpConfig::new(16, vec![32], 4)),
            )
            .double_dqn(true)
            .curiosity_config(
                CuriosityConfig::default()
                    .kind(CuriosityKind::Rnd)
                    .encoder_config(MlpConfig::new(16, vec![32], 0))
                    .feat_dim(8),
            )
            .device(Device::Cpu);
        config.save(&path).unwrap();

        assert_eq!(DqnConfig::<MlpConfig>::load(&path).unwrap(), config);
    }
}
