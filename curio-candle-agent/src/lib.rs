//! RL agents implemented with [candle](https://github.com/huggingface/candle).
pub mod checkpoint;
pub mod cnn;
pub mod curiosity;
pub mod ddpg;
pub mod dqn;
pub mod mlp;
pub mod model;
pub mod opt;
pub mod sac;
pub mod tensor_batch;
pub mod util;

use serde::{Deserialize, Serialize};

/// Device on which tensors are placed.
///
/// A serializable stand-in for [`candle_core::Device`] used in agent
/// configurations.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum Device {
    /// The CPU.
    Cpu,

    /// The n-th CUDA device.
    Cuda(usize),
}

impl From<Device> for candle_core::Device {
    fn from(device: Device) -> Self {
        match device {
            Device::Cpu => candle_core::Device::Cpu,
            Device::Cuda(n) => {
                candle_core::Device::new_cuda(n).expect("failed to create CUDA device")
            }
        }
    }
}
