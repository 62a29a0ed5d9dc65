//! DQN agent.
use super::{DqnConfig, EpsilonGreedy, QNetwork};
use crate::{
    checkpoint,
    curiosity::Curiosity,
    model::SubModel1,
    opt::Optimizer,
    util::{accumulate_grads, copy_params, smooth_l1_loss, CriticLoss, OutDim},
};
use anyhow::Result;
use candle_core::{backprop::GradStore, DType, Device, Tensor, Var, D};
use candle_nn::loss::mse;
use curio_core::{
    record::{Record, RecordValue},
    Agent, Configurable, Env, Policy, ReplayBufferBase, TransitionBatch,
};
use curio_core::error::CurioError;
use rand::{rngs::SmallRng, SeedableRng};
use serde::{de::DeserializeOwned, Serialize};
use std::{marker::PhantomData, path::Path};

/// DQN agent with optional double Q-learning and curiosity.
///
/// The agent owns the action value network, its target copy, and, when
/// configured, a curiosity module. One optimizer is built over the union of
/// the value network's and the curiosity module's trainable variables; per
/// optimization step the gradients of all component losses are accumulated
/// and applied in a single update.
pub struct Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ReplayBufferBase,
{
    qnet: QNetwork<Q>,
    qnet_tgt: QNetwork<Q>,
    opt: Optimizer,
    trainable_vars: Vec<Var>,
    curiosity: Option<Curiosity<Q>>,
    explorer: EpsilonGreedy,
    rng: SmallRng,
    device: Device,

    gamma: f64,
    batch_size: usize,
    sync_interval: usize,
    double_dqn: bool,
    critic_loss: CriticLoss,
    lamb: f64,
    beta: f64,
    extrinsic_coeff: f64,
    intrinsic_coeff: f64,

    n_opt_steps: usize,
    train: bool,

    phantom: PhantomData<(E, R)>,
}

impl<E, Q, R> Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ReplayBufferBase,
{
    /// Gives access to the exploration schedule, e.g. to pin epsilon.
    pub fn explorer_mut(&mut self) -> &mut EpsilonGreedy {
        &mut self.explorer
    }

    /// The number of optimization steps performed so far.
    pub fn n_opt_steps(&self) -> usize {
        self.n_opt_steps
    }

    fn named_varmaps(&self) -> Vec<(&'static str, &candle_nn::VarMap)> {
        let mut nets = vec![("model", self.qnet.varmap())];
        if let Some(curiosity) = &self.curiosity {
            nets.extend(curiosity.named_varmaps());
        }
        nets
    }

    fn q_next(&self, next_obs: &Tensor) -> Result<Tensor> {
        let q = if self.double_dqn {
            // action chosen by the online network, value by the target
            let act = self.qnet.forward(next_obs).argmax_keepdim(D::Minus1)?;
            self.qnet_tgt
                .forward(next_obs)
                .gather(&act, 1)?
                .squeeze(1)?
        } else {
            self.qnet_tgt.forward(next_obs).max(D::Minus1)?
        };
        Ok(q)
    }

    /// TD targets; the bootstrap term is zeroed for terminal transitions.
    fn td_target(
        &self,
        reward: &Tensor,
        not_terminated: &Tensor,
        next_obs: &Tensor,
    ) -> Result<Tensor> {
        let q_next = self.q_next(next_obs)?;
        Ok(((reward + (not_terminated * (q_next * self.gamma)?)?)?).detach())
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

        let mut record = Record::empty();

        // curiosity pass and transient reward shaping; the shaped reward is
        // never written back into the replay buffer
        let (reward, curiosity_out) = match &self.curiosity {
            Some(curiosity) => {
                let out = curiosity.forward(&obs, &next_obs, &act)?;
                let shaped = ((self.extrinsic_coeff * &reward)?
                    + (self.intrinsic_coeff * &out.intrinsic_reward)?)?;
                record.insert(
                    "intrinsic_reward",
                    RecordValue::Scalar(out.intrinsic_reward.mean_all()?.to_scalar::<f32>()?),
                );
                (shaped, Some(out))
            }
            None => (reward, None),
        };

        let pred = self.qnet.forward(&obs).gather(&act, 1)?.squeeze(1)?;
        let tgt = self.td_target(&reward, &not_terminated, &next_obs)?;
        record.insert(
            "max_q",
            RecordValue::Scalar(tgt.max(0)?.to_scalar::<f32>()?),
        );

        let loss_rl = match self.critic_loss {
            CriticLoss::Mse => mse(&pred, &tgt)?,
            CriticLoss::SmoothL1 => smooth_l1_loss(&pred, &tgt)?,
        };

        match curiosity_out {
            None => {
                let loss_value = loss_rl.to_scalar::<f32>()?;
                self.check_finite(loss_value)?;
                self.opt.backward_step(&loss_rl)?;
                record.insert("loss", RecordValue::Scalar(loss_value));
            }
            Some(out) => {
                // each loss is scaled and backpropagated individually; the
                // gradients are accumulated and applied in a single update
                let losses = match out.loss_inverse {
                    Some(loss_inverse) => vec![
                        ("loss_rl", (self.lamb * loss_rl)?),
                        ("loss_forward", (self.beta * out.loss_forward)?),
                        ("loss_inverse", ((1.0 - self.beta) * loss_inverse)?),
                    ],
                    None => vec![("loss_rl", loss_rl), ("loss_forward", out.loss_forward)],
                };

                let mut total = 0f32;
                let mut grads: Option<GradStore> = None;
                for (name, loss) in &losses {
                    let loss_value = loss.to_scalar::<f32>()?;
                    total += loss_value;
                    record.insert(*name, RecordValue::Scalar(loss_value));

                    let gs = loss.backward()?;
                    match &mut grads {
                        None => grads = Some(gs),
                        Some(acc) => accumulate_grads(acc, &gs, &self.trainable_vars)?,
                    }
                }

                self.check_finite(total)?;
                self.opt.step(&grads.expect("at least one loss"))?;
                record.insert("loss", RecordValue::Scalar(total));
            }
        }

        self.n_opt_steps += 1;
        if self.n_opt_steps % self.sync_interval == 0 {
            copy_params(self.qnet_tgt.varmap(), self.qnet.varmap())?;
        }

        Ok(record)
    }

    fn check_finite(&self, loss: f32) -> Result<()> {
        if !loss.is_finite() {
            return Err(CurioError::NonFiniteLoss {
                context: "dqn".to_string(),
                value: loss,
            }
            .into());
        }
        Ok(())
    }
}

impl<E, Q, R> Configurable for Dqn<E, Q, R>
where
    E: Env,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ReplayBufferBase,
{
    type Config = DqnConfig<Q::Config>;

    fn build(config: Self::Config) -> Self {
        let device: Device = config
            .device
            .expect("device is not set in DqnConfig")
            .into();
        let qnet = QNetwork::build(config.model_config, device.clone()).unwrap();
        let qnet_tgt = qnet.detached_copy().unwrap();

        let (curiosity, lamb, beta, extrinsic_coeff, intrinsic_coeff) =
            match config.curiosity_config {
                Some(c) => {
                    let (lamb, beta) = (c.lamb, c.beta);
                    let (ext, int) = (c.extrinsic_coeff, c.intrinsic_coeff);
                    let curiosity = Curiosity::build(c, device.clone()).unwrap();
                    (Some(curiosity), lamb, beta, ext, int)
                }
                None => (None, 1.0, 0.0, 1.0, 0.0),
            };

        let mut trainable_vars = qnet.varmap().all_vars();
        if let Some(curiosity) = &curiosity {
            trainable_vars.extend(curiosity.trainable_vars());
        }
        let opt = config.opt_config.build(trainable_vars.clone()).unwrap();

        Self {
            qnet,
            qnet_tgt,
            opt,
            trainable_vars,
            curiosity,
            explorer: config.explorer,
            rng: SmallRng::seed_from_u64(config.seed),
            device,
            gamma: config.gamma,
            batch_size: config.batch_size,
            sync_interval: config.sync_interval,
            double_dqn: config.double_dqn,
            critic_loss: config.critic_loss,
            lamb,
            beta,
            extrinsic_coeff,
            intrinsic_coeff,
            n_opt_steps: 0,
            train: true,
            phantom: PhantomData,
        }
    }
}

impl<E, Q, R> Policy<E> for Dqn<E, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
    R: ReplayBufferBase,
{
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let obs: Tensor = obs.clone().into();
        let q = self.qnet.forward(&obs);
        let act = if self.train {
            self.explorer.action(&q, &mut self.rng)
        } else {
            q.argmax(D::Minus1)
                .unwrap()
                .to_dtype(DType::I64)
                .unwrap()
                .unsqueeze(1)
                .unwrap()
        };
        act.into()
    }
}

impl<E, Q, R> Agent<E, R> for Dqn<E, Q, R>
where
    E: Env,
    E::Obs: Into<Tensor>,
    E::Act: From<Tensor>,
    Q: SubModel1<Input = Tensor, Output = Tensor>,
    Q::Config: DeserializeOwned + Serialize + OutDim + Clone,
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
        // the target copy is not part of the checkpoint
        copy_params(self.qnet_tgt.varmap(), self.qnet.varmap())?;
        Ok(())
    }
}
