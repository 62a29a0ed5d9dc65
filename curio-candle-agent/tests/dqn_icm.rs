//! End-to-end training of DQN with a curiosity module on a tiny visual
//! environment.
use anyhow::Result;
use candle_core::Tensor;
use curio_candle_agent::{
    curiosity::{CuriosityConfig, CuriosityKind},
    dqn::{Dqn, DqnConfig, EpsilonGreedy, QNetworkConfig},
    mlp::{Mlp, MlpConfig},
    tensor_batch::TensorBatch,
    Device,
};
use curio_core::{
    frame_stack::{FrameStackConfig, FrameStacker},
    generic_replay_buffer::{
        SimpleReplayBuffer, SimpleReplayBufferConfig, SimpleStepProcessor,
        SimpleStepProcessorConfig,
    },
    record::{AggregateRecorder, NullRecorder, Record},
    Act, Agent, Configurable, DefaultEvaluator, Env, ExperienceBufferBase, Obs, ReplayBufferBase,
    Step, StepProcessor, Trainer, TrainerConfig,
};
use tempdir::TempDir;

const SIZE: usize = 5;
const STACK: usize = 2;
const MAX_EPISODE_STEPS: usize = 30;
const N_ACTIONS: i64 = 4;
const IN_DIM: i64 = (STACK * SIZE * SIZE) as i64;

#[derive(Clone, Debug)]
struct GridObs(Tensor);

impl Obs for GridObs {}

impl From<GridObs> for Tensor {
    fn from(obs: GridObs) -> Tensor {
        obs.0
    }
}

impl From<GridObs> for TensorBatch {
    fn from(obs: GridObs) -> TensorBatch {
        TensorBatch::from_tensor(obs.0)
    }
}

#[derive(Clone, Debug)]
struct GridAct(Tensor);

impl Act for GridAct {}

impl From<Tensor> for GridAct {
    fn from(t: Tensor) -> Self {
        Self(t)
    }
}

impl From<GridAct> for TensorBatch {
    fn from(act: GridAct) -> TensorBatch {
        TensorBatch::from_tensor(act.0)
    }
}

/// A gridworld rendered as a stacked grayscale image.
///
/// The agent starts in the top-left corner; reaching the bottom-right
/// corner yields reward 1 and terminates the episode.
struct GridEnv {
    pos: (usize, usize),
    n_steps: usize,
    stacker: FrameStacker,
}

impl GridEnv {
    fn frame(&self) -> Vec<u8> {
        let mut frame = vec![0u8; SIZE * SIZE];
        frame[self.pos.0 * SIZE + self.pos.1] = 255;
        frame
    }

    fn observe(&self, stacked: Vec<u8>) -> GridObs {
        let shape = self.stacker.shape();
        let t = Tensor::from_vec(stacked, (1, shape[0], shape[1], shape[2]), &candle_core::Device::Cpu)
            .unwrap();
        GridObs(t)
    }
}

impl Env for GridEnv {
    type Config = ();
    type Obs = GridObs;
    type Act = GridAct;
    type Info = ();

    fn build(_config: &Self::Config, _seed: i64) -> Result<Self> {
        let config = FrameStackConfig::default()
            .skip_frame(1)
            .stack_frame(STACK)
            .frame_shape(1, SIZE, SIZE);
        Ok(Self {
            pos: (0, 0),
            n_steps: 0,
            stacker: FrameStacker::new(config),
        })
    }

    fn reset(&mut self) -> Result<Self::Obs> {
        self.pos = (0, 0);
        self.n_steps = 0;
        let stacked = self.stacker.reset(&self.frame())?;
        Ok(self.observe(stacked))
    }

    fn step(&mut self, act: &Self::Act) -> (Step<Self>, Record) {
        let a = act.0.to_vec2::<i64>().unwrap()[0][0];
        let (row, col) = self.pos;
        self.pos = match a {
            0 => (row, col.saturating_sub(1)),
            1 => (row, (col + 1).min(SIZE - 1)),
            2 => (row.saturating_sub(1), col),
            _ => ((row + 1).min(SIZE - 1), col),
        };
        self.n_steps += 1;

        let at_goal = self.pos == (SIZE - 1, SIZE - 1);
        let reward = if at_goal { 1.0 } else { 0.0 };
        let is_truncated = !at_goal && self.n_steps >= MAX_EPISODE_STEPS;
        let stacked = self.stacker.push_and_stack(&self.frame()).unwrap();
        let obs = self.observe(stacked);

        let step = Step::new(act.clone(), obs, reward, at_goal, is_truncated, (), None);
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
type GridDqn = Dqn<GridEnv, Mlp, Buffer>;

fn dqn_config(kind: Option<CuriosityKind>, seed: u64) -> DqnConfig<MlpConfig> {
    let mut config = DqnConfig::default()
        .model_config(QNetworkConfig::default().q_config(MlpConfig::new(
            IN_DIM,
            vec![32],
            N_ACTIONS,
        )))
        .batch_size(16)
        .sync_interval(10)
        .explorer(EpsilonGreedy::new(1.0, 0.1, 100))
        .seed(seed)
        .device(Device::Cpu);
    if let Some(kind) = kind {
        config = config.curiosity_config(
            CuriosityConfig::default()
                .kind(kind)
                .encoder_config(MlpConfig::new(IN_DIM, vec![32], 0))
                .feat_dim(8)
                .hidden_units(vec![16])
                .n_actions(N_ACTIONS),
        );
    }
    config
}

#[test]
fn training_loop_runs_and_optimizes() -> Result<()> {
    let model_dir = TempDir::new("dqn_icm")?;
    let trainer_config = TrainerConfig::default()
        .max_env_steps(120)
        .warmup_period(40)
        .opt_interval(1)
        .eval_interval(60)
        .save_interval(60)
        .eval_episodes(1)
        .flush_interval(2)
        .log_episode_interval(2)
        .model_dir(model_dir.path().to_str().unwrap());

    let env = GridEnv::build(&(), 0)?;
    let step_processor = SimpleStepProcessor::<GridEnv, TensorBatch, TensorBatch>::build(
        &SimpleStepProcessorConfig::default(),
    );
    let mut agent = GridDqn::build(dqn_config(Some(CuriosityKind::Icm), 0));
    let mut buffer = Buffer::build(&SimpleReplayBufferConfig::default().capacity(200));
    let mut recorder: Box<dyn AggregateRecorder> = Box::new(NullRecorder::default());
    let mut evaluator = DefaultEvaluator::<GridEnv>::new(&(), 1, 1)?;

    Trainer::build(trainer_config).train(
        env,
        step_processor,
        &mut agent,
        &mut buffer,
        &mut recorder,
        &mut evaluator,
    )?;

    assert_eq!(buffer.len(), 120);
    // one optimization step per environment step from the end of warmup
    assert_eq!(agent.n_opt_steps(), 81);
    assert!(model_dir.path().join("latest.safetensors").exists());
    assert!(model_dir.path().join("best.safetensors").exists());
    Ok(())
}

#[test]
fn checkpoint_round_trip_preserves_parameters() -> Result<()> {
    let dir = TempDir::new("dqn_icm_checkpoint")?;
    let path_a = dir.path().join("a.safetensors");
    let path_b = dir.path().join("b.safetensors");

    let agent_a = GridDqn::build(dqn_config(Some(CuriosityKind::Icm), 0));
    agent_a.save_params(&path_a)?;

    // a differently seeded agent converges to the same parameters on load
    let mut agent_b = GridDqn::build(dqn_config(Some(CuriosityKind::Icm), 1));
    agent_b.load_params(&path_a)?;
    agent_b.save_params(&path_b)?;

    let cpu = candle_core::Device::Cpu;
    let a = candle_core::safetensors::load(&path_a, &cpu)?;
    let b = candle_core::safetensors::load(&path_b, &cpu)?;
    assert_eq!(a.len(), b.len());
    for (key, ta) in a.iter() {
        let tb = b.get(key).expect("missing key after round trip");
        assert_eq!(
            ta.flatten_all()?.to_vec1::<f32>()?,
            tb.flatten_all()?.to_vec1::<f32>()?,
            "parameter {key} changed",
        );
    }
    Ok(())
}

#[test]
fn loading_a_checkpoint_with_different_modules_fails() -> Result<()> {
    let dir = TempDir::new("dqn_checkpoint_mismatch")?;
    let path = dir.path().join("plain.safetensors");

    let plain = GridDqn::build(dqn_config(None, 0));
    plain.save_params(&path)?;

    let mut with_icm = GridDqn::build(dqn_config(Some(CuriosityKind::Icm), 0));
    let err = with_icm.load_params(&path).unwrap_err();
    assert!(err.to_string().contains("checkpoint key mismatch"));
    Ok(())
}

#[test]
fn rnd_agent_checkpoints_the_frozen_target() -> Result<()> {
    let dir = TempDir::new("dqn_rnd_checkpoint")?;
    let path = dir.path().join("rnd.safetensors");

    let agent = GridDqn::build(dqn_config(Some(CuriosityKind::Rnd), 0));
    agent.save_params(&path)?;

    let cpu = candle_core::Device::Cpu;
    let tensors = candle_core::safetensors::load(&path, &cpu)?;
    assert!(tensors.keys().any(|k| k.starts_with("model_a_tgt.")));
    Ok(())
}
