//! DDPG agent.
use super::{Actor, DdpgConfig, OuNoise, SyncMode};
use crate::{
    checkpoint,
    model::{SubModel1, SubModel2},
    sac::Critic,
    util::{copy_params, track, OutDim},
};
use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::loss::mse;
use curio_core::{
    error::CurioError,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, ReplayBufferBase, TransitionBatch,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, path::Path};

/// DDPG agent with a deterministic actor and a single critic.
///
/// Exploration adds Ornstein-Uhlenbeck noise to the actor's output; the
/// noisy action is clamped back into `(-1, 1)`. Target networks follow the
/// online networks according to [`SyncMode`].
pub struct Ddpg<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    pi: Actor<P>,
    pi_tgt: Actor<P>,
    q: Critic<Q>,
    q_tgt: Critic<Q>,
    noise: OuNoise,
    device: Device,

    gamma: f64,
    sync_mode: SyncMode,
    batch_size: usize,

    n_opt_steps: usize,
    train: bool,
    phantom: PhantomData<(E, R)>,
}

impl<E, P, Q, R> Ddpg<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    /// Resets the exploration noise, typically at episode boundaries.
    pub fn reset_noise(&mut self) -> Result<()> {
        self.noise.reset()
    }

    fn named_varmaps(&self) -> Vec<(&'static str, &candle_nn::VarMap)> {
        vec![("actor", self.pi.varmap()), ("critic", self.q.varmap())]
    }

    fn sync(&mut self) -> Result<()> {
        match self.sync_mode {
            SyncMode::Hard { interval } => {
                if self.n_opt_steps % interval == 0 {
                    copy_params(self.pi_tgt.varmap(), self.pi.varmap())?;
                    copy_params(self.q_tgt.varmap(), self.q.varmap())?;
                }
            }
            SyncMode::Soft { tau } => {
                track(self.pi_tgt.varmap(), self.pi.varmap(), tau)?;
                track(self.q_tgt.varmap(), self.q.varmap(), tau)?;
            }
        }
        Ok(())
    }

    fn opt_(&mut self, buffer: &mut R) -> Result<Record>
    where
        R::Batch: TransitionBatch,
        <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
        <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
    {
        let batch = buffer.batch(self.batch_size)?;
        let (obs, act, next_obs, reward, is_terminated, _is_truncated) = batch.unpack();
        let obs: Tensor = obs.into();
        let act: Tensor = act.into();
        let act = act.to_device(&self.device)?;
        let next_obs: Tensor = next_obs.into();
        let batch_size = reward.len();
        let reward = Tensor::from_slice(&reward[..], (batch_size,), &self.device)?;
        let not_terminated = {
            let v: Vec<f32> = is_terminated.iter().map(|&e| 1.0 - e as f32).collect();
            Tensor::from_slice(&v[..], (batch_size,), &self.device)?
        };

        // critic update
        let tgt = {
            let next_act = self.pi_tgt.forward(&next_obs);
            let q_next = self.q_tgt.forward(&next_obs, &next_act).squeeze(1)?;
            ((&reward + (&not_terminated * (q_next * self.gamma)?)?)?).detach()
        };
        let pred = self.q.forward(&obs, &act).squeeze(1)?;
        let loss_critic = mse(&pred, &tgt)?;
        let loss_critic_value = loss_critic.to_scalar::<f32>()?;
        self.check_finite(loss_critic_value)?;
        self.q.backward_step(&loss_critic)?;

        // actor update
        let loss_actor = {
            let act = self.pi.forward(&obs);
            self.q.forward(&obs, &act).squeeze(1)?.mean_all()?.neg()?
        };
        let loss_actor_value = loss_actor.to_scalar::<f32>()?;
        self.check_finite(loss_actor_value)?;
        self.pi.backward_step(&loss_actor)?;

        self.n_opt_steps += 1;
        self.sync()?;

        let mut record = Record::empty();
        record.insert("loss_critic", RecordValue::Scalar(loss_critic_value));
        record.insert("loss_actor", RecordValue::Scalar(loss_actor_value));

        Ok(record)
    }

    fn check_finite(&self, loss: f32) -> Result<()> {
        if !loss.is_finite() {
            return Err(CurioError::NonFiniteLoss {
                context: "ddpg".to_string(),
                value: loss,
            }
            .into());
        }
        Ok(())
    }
}

impl<E, P, Q, R> Configurable for Ddpg<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    type Config = DdpgConfig<P::Config, Q::Config>;

    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("device is not set in DdpgConfig")
            .into();
        let pi = Actor::build(config.actor_config, device.clone()).unwrap();
        let q = Critic::build(config.critic_config, device.clone()).unwrap();
        let pi_tgt = pi.detached_copy().unwrap();
        let q_tgt = q.detached_copy().unwrap();
        let noise = OuNoise::build(config.noise_config, pi.out_dim() as usize, &device).unwrap();

        Self {
            pi,
            pi_tgt,
            q,
            q_tgt,
            noise,
            device,
            gamma: config.gamma,
            sync_mode: config.sync_mode,
            batch_size: config.batch_size,
            n_opt_steps: 0,
            train: true,
            phantom: PhantomData,
        }
    }
}

impl<E, P, Q, R> Policy<E> for Ddpg<E, P, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let obs: Tensor = obs.clone().into();
        let act = self.pi.forward(&obs);
        let act = if self.train {
            let noise = self.noise.sample().unwrap();
            act.broadcast_add(&noise)
                .unwrap()
                .clamp(-1.0, 1.0)
                .unwrap()
        } else {
            act
        };
        act.detach().into()
    }
}

impl<E, P, Q, R> Agent<E, R> for Ddpg<E, P, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    P: SubModel1<Input = Tensor, Output = Tensor>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
    R::Batch: TransitionBatch,
    <R::Batch as TransitionBatch>::ObsBatch: Into<Tensor>,
    <R::Batch as TransitionBatch>::ActBatch: Into<Tensor>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn opt(&mut self, buffer: &mut R) -> Result<Record> {
        self.opt_(buffer)
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        checkpoint::save(&self.named_varmaps(), path)
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        checkpoint::load(&self.named_varmaps(), path, &self.device)?;
        copy_params(self.pi_tgt.varmap(), self.pi.varmap())?;
        copy_params(self.q_tgt.varmap(), self.q.varmap())?;
        Ok(())
    }
}
