//! Deterministic policy of DDPG.
use crate::{
    model::SubModel1,
    opt::{Optimizer, OptimizerConfig},
    util::{copy_params, OutDim},
};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`Actor`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct ActorConfig<P: OutDim> {
    /// Configuration of the policy network.
    pub pi_config: Option<P>,

    /// Configuration of the actor's optimizer.
    pub opt_config: OptimizerConfig,
}

impl<P: OutDim> Default for ActorConfig<P> {
    fn default() -> Self {
        Self {
            pi_config: None,
            opt_config: OptimizerConfig::default(),
        }
    }
}

impl<P> ActorConfig<P>
where
    P: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the policy network.
    pub fn pi_config(mut self, v: P) -> Self {
        self.pi_config = Some(v);
        self
    }

    /// Sets the output dimension, i.e. the action dimension.
    pub fn out_dim(mut self, v: i64) -> Self {
        if let Some(pi_config) = &mut self.pi_config {
            pi_config.set_out_dim(v);
        }
        self
    }

    /// Sets the optimizer configuration.
    pub fn opt_config(mut self, v: OptimizerConfig) -> Self {
        self.opt_config = v;
        self
    }

    /// Constructs [`ActorConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`ActorConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Deterministic policy network.
///
/// The underlying [`SubModel1`] maps an observation to a pre-activation
/// action; the output is squashed with `tanh` so actions stay in `(-1, 1)`.
pub struct Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    varmap: VarMap,
    out_dim: i64,
    pi: P,
    pi_config: P::Config,
    opt_config: OptimizerConfig,
    opt: Optimizer,
}

impl<P> Actor<P>
where
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Builds the actor.
    pub fn build(config: ActorConfig<P::Config>, device: Device) -> Result<Actor<P>> {
        let pi_config = config.pi_config.context("pi_config is not set.")?;
        let opt_config = config.opt_config;
        let out_dim = pi_config.get_out_dim();
        let varmap = VarMap::new();
        let pi = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            P::build(vb, pi_config.clone())
        };
        let opt = opt_config.build(varmap.all_vars())?;

        Ok(Self {
            device,
            varmap,
            out_dim,
            pi,
            pi_config,
            opt_config,
            opt,
        })
    }

    /// Computes the action of observations, bounded to `(-1, 1)`.
    pub fn forward(&self, obs: &Tensor) -> Tensor {
        let act = self.pi.forward(obs).tanh().unwrap();
        debug_assert_eq!(act.dims()[1], self.out_dim as usize);
        act
    }

    /// The action dimension.
    pub fn out_dim(&self) -> i64 {
        self.out_dim
    }

    /// Backpropagates a loss and applies one update.
    pub fn backward_step(&mut self, loss: &Tensor) -> Result<()> {
        self.opt.backward_step(loss)
    }

    /// The variable map holding the actor's parameters.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// Creates a copy with its own freshly allocated parameters.
    pub fn detached_copy(&self) -> Result<Self> {
        let copy = Self::build(
            ActorConfig {
                pi_config: Some(self.pi_config.clone()),
                opt_config: self.opt_config.clone(),
            },
            self.device.clone(),
        )?;
        copy_params(copy.varmap(), self.varmap())?;
        Ok(copy)
    }
}
