//! Configuration of [`Ddpg`](super::Ddpg).
use super::{ActorConfig, OuNoiseConfig};
use crate::{sac::CriticConfig, util::OutDim, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// How the target networks follow the online networks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum SyncMode {
    /// Copies the parameters every `interval` optimization steps.
    Hard {
        /// Interval in optimization steps.
        interval: usize,
    },

    /// Polyak averaging with rate `tau` after every optimization step.
    Soft {
        /// Soft update coefficient.
        tau: f64,
    },
}

/// Configuration of [`Ddpg`](super::Ddpg).
///
/// `P` and `Q` are the configuration types of the policy and action value
/// networks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct DdpgConfig<P, Q>
where
    P: OutDim + Clone,
    Q: Clone,
{
    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the critic.
    pub critic_config: CriticConfig<Q>,

    /// Discount factor.
    pub gamma: f64,

    /// Target network update rule.
    pub sync_mode: SyncMode,

    /// Batch size of an optimization step.
    pub batch_size: usize,

    /// Exploration noise process.
    pub noise_config: OuNoiseConfig,

    /// Device on which the networks are built.
    pub device: Option<Device>,
}

impl<P, Q> Default for DdpgConfig<P, Q>
where
    P: OutDim + Clone,
    Q: Clone,
{
    fn default() -> Self {
        Self {
            actor_config: ActorConfig::default(),
            critic_config: CriticConfig::default(),
            gamma: 0.99,
            sync_mode: SyncMode::Soft { tau: 5e-4 },
            batch_size: 128,
            noise_config: OuNoiseConfig::default(),
            device: None,
        }
    }
}

impl<P, Q> DdpgConfig<P, Q>
where
    P: DeserializeOwned + Serialize + OutDim + Clone,
    Q: DeserializeOwned + Serialize + Clone,
{
    /// Sets the actor configuration.
    pub fn actor_config(mut self, v: ActorConfig<P>) -> Self {
        self.actor_config = v;
        self
    }

    /// Sets the critic configuration.
    pub fn critic_config(mut self, v: CriticConfig<Q>) -> Self {
        self.critic_config = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the target network update rule.
    pub fn sync_mode(mut self, v: SyncMode) -> Self {
        self.sync_mode = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the exploration noise configuration.
    pub fn noise_config(mut self, v: OuNoiseConfig) -> Self {
        self.noise_config = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`DdpgConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`DdpgConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
