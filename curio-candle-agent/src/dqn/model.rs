//! Action value network of DQN.
use crate::{model::SubModel1, util::copy_params, util::OutDim};
use anyhow::{Context, Result};
use candle_core::{DType, Device, Tensor};
use candle_nn::{VarBuilder, VarMap};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};

/// Configuration of [`QNetwork`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QNetworkConfig<Q> {
    /// Configuration of the underlying network.
    pub q_config: Option<Q>,
}

impl<Q> Default for QNetworkConfig<Q> {
    fn default() -> Self {
        Self { q_config: None }
    }
}

impl<Q> QNetworkConfig<Q>
where
    Q: DeserializeOwned + Serialize + OutDim,
{
    /// Sets the configuration of the underlying network.
    pub fn q_config(mut self, v: Q) -> Self {
        self.q_config = Some(v);
        self
    }

    /// Sets the output dimension, i.e. the number of actions.
    pub fn out_dim(mut self, v: i64) -> Self {
        if let Some(q_config) = &mut self.q_config {
            q_config.set_out_dim(v);
        }
        self
    }

    /// Constructs [`QNetworkConfig`] from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QNetworkConfig`] as a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// Action value network.
///
/// Owns the variables of an opaque [`SubModel1`] mapping observations to
/// one value per action. The network carries no optimizer; the agent owns a
/// single optimizer over all of its trainable variables.
pub struct QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    device: Device,
    varmap: VarMap,
    q: Q,
    q_config: Q::Config,
}

impl<Q> QNetwork<Q>
where
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
{
    /// Builds the network.
    pub fn build(config: QNetworkConfig<Q::Config>, device: Device) -> Result<Self> {
        let q_config = config.q_config.context("q_config is not set.")?;
        let varmap = VarMap::new();
        let q = {
            let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);
            Q::build(vb, q_config.clone())
        };

        Ok(Self {
            device,
            varmap,
            q,
            q_config,
        })
    }

    /// Computes action values.
    pub fn forward(&self, x: &Tensor) -> Tensor {
        self.q.forward(x)
    }

    /// The variable map holding the network's parameters.
    pub fn varmap(&self) -> &VarMap {
        &self.varmap
    }

    /// The device the network lives on.
    pub fn device(&self) -> &Device {
        &self.device
    }

    /// Creates a copy with its own freshly allocated parameters.
    ///
    /// Used to build the target network; the copy shares no storage with
    /// the original.
    pub fn detached_copy(&self) -> Result<Self> {
        let copy = Self::build(
            QNetworkConfig {
                q_config: Some(self.q_config.clone()),
            },
            self.device.clone(),
        )?;
        copy_params(copy.varmap(), self.varmap())?;
        Ok(copy)
    }
}
