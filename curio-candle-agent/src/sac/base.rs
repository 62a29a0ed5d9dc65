//! SAC agent.
use super::{Actor, Critic, EntCoef, SacConfig};
use crate::{
    checkpoint,
    model::{SubModel1, SubModel2},
    util::{copy_params, track, OutDim},
};
use anyhow::Result;
use candle_core::{Device, Tensor, D};
use candle_nn::loss::mse;
use curio_core::{
    error::CurioError,
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, ReplayBufferBase, TransitionBatch,
};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, path::Path};

/// SAC agent with twin critics and a learned entropy coefficient.
///
/// Actions are sampled with the reparameterization trick and squashed with
/// `tanh`; log probabilities carry the squashing correction. The two
/// critics are trained against the same target built from the minimum of
/// their target copies.
pub struct Sac<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    pi: Actor<P>,
    q1: Critic<Q>,
    q2: Critic<Q>,
    q1_tgt: Critic<Q>,
    q2_tgt: Critic<Q>,
    ent_coef: EntCoef,
    device: Device,

    gamma: f64,
    tau: f64,
    batch_size: usize,
    epsilon: f64,

    train: bool,
    phantom: PhantomData<(E, R)>,
}

impl<E, P, Q, R> Sac<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    /// Samples a squashed action and its log probability.
    fn action_logp(&self, obs: &Tensor) -> Result<(Tensor, Tensor)> {
        let (mean, std) = self.pi.forward(obs);
        let z = mean.randn_like(0.0, 1.0)?;
        let u = (&mean + (&std * &z)?)?;
        let act = u.tanh()?;

        let log_2pi = (2.0 * std::f64::consts::PI).ln();
        let logp_gauss = ((z.sqr()? * 0.5)?.neg()? - std.log()?)?
            .affine(1.0, -0.5 * log_2pi)?
            .sum(D::Minus1)?;
        // tanh squashing correction: sum(log(1 - a^2 + eps))
        let correction = ((act.sqr()?.affine(-1.0, 1.0)? + self.epsilon)?)
            .log()?
            .sum(D::Minus1)?;
        let logp = (logp_gauss - correction)?;

        Ok((act, logp))
    }

    fn named_varmaps(&self) -> Vec<(&'static str, &candle_nn::VarMap)> {
        vec![
            ("actor", self.pi.varmap()),
            ("critic_1", self.q1.varmap()),
            ("critic_2", self.q2.varmap()),
            ("ent_coef", self.ent_coef.varmap()),
        ]
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
            let (next_act, next_logp) = self.action_logp(&next_obs)?;
            let q1 = self.q1_tgt.forward(&next_obs, &next_act).squeeze(1)?;
            let q2 = self.q2_tgt.forward(&next_obs, &next_act).squeeze(1)?;
            let q_min = q1.minimum(&q2)?;
            let alpha = self.ent_coef.alpha()?;
            let v = (q_min - alpha.broadcast_mul(&next_logp)?)?;
            ((&reward + (&not_terminated * (v * self.gamma)?)?)?).detach()
        };

        let pred1 = self.q1.forward(&obs, &act).squeeze(1)?;
        let pred2 = self.q2.forward(&obs, &act).squeeze(1)?;
        let loss_critic1 = mse(&pred1, &tgt)?;
        let loss_critic2 = mse(&pred2, &tgt)?;
        let loss_critic_value =
            (loss_critic1.to_scalar::<f32>()? + loss_critic2.to_scalar::<f32>()?) / 2.0;
        self.check_finite(loss_critic_value)?;
        self.q1.backward_step(&loss_critic1)?;
        self.q2.backward_step(&loss_critic2)?;

        // actor update
        let (act_new, logp) = self.action_logp(&obs)?;
        let q1 = self.q1.forward(&obs, &act_new).squeeze(1)?;
        let q2 = self.q2.forward(&obs, &act_new).squeeze(1)?;
        let q_min = q1.minimum(&q2)?;
        let alpha = self.ent_coef.alpha()?;
        let loss_actor = (alpha.broadcast_mul(&logp)? - q_min)?.mean_all()?;
        let loss_actor_value = loss_actor.to_scalar::<f32>()?;
        self.check_finite(loss_actor_value)?;
        self.pi.backward_step(&loss_actor)?;

        self.ent_coef.update(&logp)?;

        track(self.q1_tgt.varmap(), self.q1.varmap(), self.tau)?;
        track(self.q2_tgt.varmap(), self.q2.varmap(), self.tau)?;

        let mut record = Record::empty();
        record.insert("loss_critic", RecordValue::Scalar(loss_critic_value));
        record.insert("loss_actor", RecordValue::Scalar(loss_actor_value));
        record.insert(
            "alpha",
            RecordValue::Scalar(self.ent_coef.alpha()?.to_vec1::<f32>()?[0]),
        );

        Ok(record)
    }

    fn check_finite(&self, loss: f32) -> Result<()> {
        if !loss.is_finite() {
            return Err(CurioError::NonFiniteLoss {
                context: "sac".to_string(),
                value: loss,
            }
            .into());
        }
        Ok(())
    }
}

impl<E, P, Q, R> Configurable for Sac<E, P, Q, R>
where
    E: Env,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    type Config = SacConfig<P::Config, Q::Config>;

    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("device is not set in SacConfig")
            .into();
        let pi = Actor::build(config.actor_config, device.clone()).unwrap();
        let q1 = Critic::build(config.critic_config.clone(), device.clone()).unwrap();
        let q2 = Critic::build(config.critic_config, device.clone()).unwrap();
        let q1_tgt = q1.detached_copy().unwrap();
        let q2_tgt = q2.detached_copy().unwrap();
        let ent_coef = EntCoef::build(config.ent_coef_mode, &device).unwrap();

        Self {
            pi,
            q1,
            q2,
            q1_tgt,
            q2_tgt,
            ent_coef,
            device,
            gamma: config.gamma,
            tau: config.tau,
            batch_size: config.batch_size,
            epsilon: config.epsilon,
            train: true,
            phantom: PhantomData,
        }
    }
}

impl<E, P, Q, R> Policy<E> for Sac<E, P, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
    P::Config: DeserializeOwned + Serialize + OutDim + Clone,
    Q: SubModel2<Input1 = Tensor, Input2 = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + Clone,
    R: ReplayBufferBase,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let obs: Tensor = obs.clone().into();
        let (mean, std) = self.pi.forward(&obs);
        let act = if self.train {
            let z = mean.randn_like(0.0, 1.0).unwrap();
            (mean + (std * z).unwrap()).unwrap().tanh().unwrap()
        } else {
            // the mean action in evaluation mode
            mean.tanh().unwrap()
        };
        act.detach().into()
    }
}

impl<E, P, Q, R> Agent<E, R> for Sac<E, P, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    P: SubModel1<Input = Tensor, Output = (Tensor, Tensor)>,
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
        copy_params(self.q1_tgt.varmap(), self.q1.varmap())?;
        copy_params(self.q2_tgt.varmap(), self.q2.varmap())?;
        Ok(())
    }
}
