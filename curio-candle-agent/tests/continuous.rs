//! End-to-end training of the continuous-control agents on a tiny
//! regulation task.
use anyhow::Result;
use candle_core::Tensor;
use curio_candle_agent::{
    ddpg::{ActorConfig as DdpgActorConfig, Ddpg, DdpgConfig, SyncMode},
    mlp::{Mlp, Mlp2, MlpConfig},
    sac::{ActorConfig, CriticConfig, EntCoefMode, Sac, SacConfig},
    tensor_batch::TensorBatch,
    Device,
};
use curio_core::{
    generic_replay_buffer::{
        GenericTransitionBatch, SimpleReplayBuffer, SimpleReplayBufferConfig,
        SimpleStepProcessor, SimpleStepProcessorConfig,
    },
    record::{AggregateRecorder, NullRecorder, Record},
    Act, Agent, Configurable, DefaultEvaluator, Env, ExperienceBufferBase, Obs, ReplayBufferBase,
    Step, StepProcessor, Trainer, TrainerConfig,
};
use tempdir::TempDir;

const MAX_EPISODE_STEPS: usize = 20;

#[derive(Clone, Debug)]
struct PointObs(Tensor);

impl Obs for PointObs {}

impl From<PointObs> for Tensor {
    fn from(obs: PointObs) -> Tensor {
        obs.0
    }
}

impl From<PointObs> for TensorBatch {
    fn from(obs: PointObs) -> TensorBatch {
        TensorBatch::from_tensor(obs.0)
    }
}

#[derive(Clone, Debug)]
struct PointAct(Tensor);

impl Act for PointAct {}

impl From<Tensor> for PointAct {
    fn from(t: Tensor) -> Self {
        Self(t)
    }
}

impl From<PointAct> for TensorBatch {
    fn from(act: PointAct) -> TensorBatch {
        TensorBatch::from_tensor(act.0)
    }
}

/// A point on a line; the reward favors moving it to the origin.
struct PointEnv {
    x: f32,
    n_steps: usize,
}

impl PointEnv {
    fn observe(&self) -> PointObs {
        let t = Tensor::from_slice(&[self.x], (1, 1), &candle_core::Device::Cpu).unwrap();
        PointObs(t)
    }
}

impl Env for PointEnv {
    type Config = ();
    type Obs = PointObs;
    type Act = PointAct;
    type Info = ();

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        Ok(Self { x: 0.9, n_steps: 0 })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.x = 0.9;
        self.n_steps = 0;
        Ok(self.observe())
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let a = act.0.to_vec2::<f32>().unwrap()[0][0];
        self.x = (self.x + 0.2 * a).clamp(-1.0, 1.0);
        self.n_steps += 1;

        let reward = -self.x * self.x;
        let is_truncated = self.n_steps >= MAX_EPISODE_STEPS;
        let step = Step::new(
            act.clone(),
            self.observe(),
            reward,
            false,
            is_truncated,
            (),
            None,
        );
        (step, Record::empty())
    }

    fn step_with_reset(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let (mut step, record) = self.step(act);
        if step.is_done() {
            step.init_obs = Some(self.reset().unwrap());
        }
        (step, record)
    }
}

type Buffer = SimpleReplayBuffer<TensorBatch, TensorBatch>;

fn sac_config() -> SacConfig<MlpConfig, MlpConfig> {
    SacConfig::default()
        .actor_config(ActorConfig::default().pi_config(MlpConfig::new(1, vec![16], 1)))
        .critic_config(CriticConfig::default().q_config(MlpConfig::new(2, vec![16], 1)))
        .ent_coef_mode(EntCoefMode::Auto {
            target: -1.0,
            lr: 3e-4,
        })
        .batch_size(8)
        .device(Device::Cpu)
}

fn ddpg_config() -> DdpgConfig<MlpConfig, MlpConfig> {
    DdpgConfig::default()
        .actor_config(DdpgActorConfig::default().pi_config(MlpConfig::new(1, vec![16], 1)))
        .critic_config(CriticConfig::default().q_config(MlpConfig::new(2, vec![16], 1)))
        .sync_mode(SyncMode::Hard { interval: 10 })
        .batch_size(8)
        .device(Device::Cpu)
}

/// A transition whose reward corrupts any TD target built from it.
fn nan_reward_transition() -> GenericTransitionBatch<TensorBatch, TensorBatch> {
    let item = || {
        let t = Tensor::from_slice(&[0.5f32], (1, 1), &candle_core::Device::Cpu).unwrap();
        TensorBatch::from_tensor(t)
    };
    GenericTransitionBatch {
        obs: item(),
        act: item(),
        next_obs: item(),
        reward: vec![f32::NAN],
        is_terminated: vec![0],
        is_truncated: vec![0],
    }
}

fn nan_reward_buffer() -> Buffer {
    let mut buffer = Buffer::build(&SimpleReplayBufferConfig::default().capacity(16));
    for _ in 0..8 {
        buffer.push(nan_reward_transition()).unwrap();
    }
    buffer
}

fn trainer_config(model_dir: &str) -> TrainerConfig {
    TrainerConfig::default()
        .max_env_steps(60)
        .warmup_period(20)
        .opt_interval(1)
        .eval_interval(30)
        .save_interval(60)
        .eval_episodes(1)
        .flush_interval(1)
        .model_dir(model_dir)
}

fn run<A>(agent: &mut A, model_dir: &str) -> Result<usize>
where
    A: Agent<PointEnv, Buffer>,
{
    let env = PointEnv::build(&(), 0)?;
    let step_processor = SimpleStepProcessor::<PointEnv, TensorBatch, TensorBatch>::build(
        &SimpleStepProcessorConfig::default(),
    );
    let mut buffer = Buffer::build(&SimpleReplayBufferConfig::default().capacity(100));
    let mut recorder: Box<dyn AggregateRecorder> = Box::new(NullRecorder::default());
    let mut evaluator = DefaultEvaluator::<PointEnv>::new(&(), 1, 1)?;

    Trainer::build(trainer_config(model_dir)).train(
        env,
        step_processor,
        agent,
        &mut buffer,
        &mut recorder,
        &mut evaluator,
    )?;

    Ok(buffer.len())
}

#[test]
fn sac_training_loop_runs() -> Result<()> {
    let model_dir = TempDir::new("sac_point")?;
    let mut agent: Sac<PointEnv, Mlp2, Mlp, Buffer> = Sac::build(sac_config());

    let n = run(&mut agent, model_dir.path().to_str().unwrap())?;
    assert_eq!(n, 60);
    assert!(model_dir.path().join("latest.safetensors").exists());

    // checkpoint round trip through a fresh agent
    let path = model_dir.path().join("latest.safetensors");
    let mut fresh: Sac<PointEnv, Mlp2, Mlp, Buffer> = Sac::build(sac_config());
    fresh.load_params(&path)?;
    Ok(())
}

#[test]
fn ddpg_training_loop_runs() -> Result<()> {
    let model_dir = TempDir::new("ddpg_point")?;
    let mut agent: Ddpg<PointEnv, Mlp, Mlp, Buffer> = Ddpg::build(ddpg_config());

    let n = run(&mut agent, model_dir.path().to_str().unwrap())?;
    assert_eq!(n, 60);
    assert!(model_dir.path().join("latest.safetensors").exists());
    Ok(())
}

#[test]
fn sac_fails_on_non_finite_loss() {
    let mut agent: Sac<PointEnv, Mlp2, Mlp, Buffer> = Sac::build(sac_config());
    let mut buffer = nan_reward_buffer();

    let err = agent.opt(&mut buffer).unwrap_err();
    assert!(err.to_string().contains("non-finite loss"));
}

#[test]
fn ddpg_fails_on_non_finite_loss() {
    let mut agent: Ddpg<PointEnv, Mlp, Mlp, Buffer> = Ddpg::build(ddpg_config());
    let mut buffer = nan_reward_buffer();

    let err = agent.opt(&mut buffer).unwrap_err();
    assert!(err.to_string().contains("non-finite loss"));
}
