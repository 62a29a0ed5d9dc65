//! Configuration of [`Sac`](super::Sac).
use super::{ActorConfig, CriticConfig, EntCoefMode};
use crate::{util::OutDim, Device};
use anyhow::Result;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Sac`](super::Sac).
///
/// `P` and `Q` are the configuration types of the policy and action value
/// networks.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct SacConfig<P, Q>
where
    P: OutDim + Clone,
    Q: Clone,
{
    /// Configuration of the actor.
    pub actor_config: ActorConfig<P>,

    /// Configuration of the twin critics.
    pub critic_config: CriticConfig<Q>,

    /// Entropy coefficient handling.
    pub ent_coef_mode: EntCoefMode,

    /// Discount factor.
    pub gamma: f64,

    /// Soft update coefficient of the target critics.
    pub tau: f64,

    /// Batch size of an optimization step.
    pub batch_size: usize,

    /// Numerical floor inside the squashing correction logarithm.
    pub epsilon: f64,

    /// Device on which the networks are built.
    pub device: Option<Device>,
}

impl<P, Q> Default for SacConfig<P, Q>
where
    P: OutDim + Clone,
    Q: Clone,
{
    fn default() -> Self {
        Self {
            actor_config: ActorConfig::default(),
            critic_config: CriticConfig::default(),
            ent_coef_mode: EntCoefMode::Fix(1.0),
            gamma: 0.99,
            tau: 5e-4,
            batch_size: 128,
            epsilon: 1e-6,
            device: None,
        }
    }
}

impl<P, Q> SacConfig<P, Q>
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

    /// Sets the entropy coefficient mode.
    pub fn ent_coef_mode(mut self, v: EntCoefMode) -> Self {
        self.ent_coef_mode = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the soft update coefficient.
    pub fn tau(mut self, v: f64) -> Self {
        self.tau = v;
        self
    }

    /// Sets the batch size.
    pub fn batch_size(mut self, v: usize) -> Self {
        self.batch_size = v;
        self
    }

    /// Sets the device.
    pub fn device(mut self, v: Device) -> Self {
        self.device = Some(v);
        self
    }

    /// Constructs [`SacConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SacConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
