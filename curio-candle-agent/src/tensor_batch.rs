//! Tensor-backed storage for the generic replay buffer.
use candle_core::{error::Result, DType, Device, Tensor};
use curio_core::generic_replay_buffer::BatchBase;

/// Constructs a zero [`Tensor`] of the dtype matching the implementing type.
pub trait ZeroTensor {
    /// Constructs a zero tensor.
    fn zeros(shape: &[usize]) -> Result<Tensor>;
}

impl ZeroTensor for u8 {
    fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::zeros(shape, DType::U8, &Device::Cpu)
    }
}

impl ZeroTensor for f32 {
    fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::zeros(shape, DType::F32, &Device::Cpu)
    }
}

impl ZeroTensor for i64 {
    fn zeros(shape: &[usize]) -> Result<Tensor> {
        Tensor::zeros(shape, DType::I64, &Device::Cpu)
    }
}

/// A [`BatchBase`] backed by a single [`Tensor`].
///
/// The first dimension of the internal tensor is the item index; the
/// remaining dimensions are the per-item shape. The internal tensor is
/// allocated lazily from the shape and dtype of the first pushed data.
#[derive(Clone, Debug)]
pub struct TensorBatch {
    buf: Option<Tensor>,
    capacity: usize,
}

impl TensorBatch {
    /// Creates a batch holding the given tensor.
    ///
    /// The first dimension of `t` is the number of items.
    pub fn from_tensor(t: Tensor) -> Self {
        let capacity = t.dims()[0];
        Self {
            buf: Some(t),
            capacity,
        }
    }

    /// Moves the internal tensor to the given device.
    pub fn to(&mut self, device: &Device) -> Result<()> {
        if let Some(buf) = &self.buf {
            self.buf = Some(buf.to_device(device)?);
        }
        Ok(())
    }
}

impl BatchBase for TensorBatch {
    fn new(capacity: usize) -> Self {
        Self {
            buf: None,
            capacity,
        }
    }

    fn push(&mut self, index: usize, data: Self) {
        let data = match data.buf {
            Some(data) => data,
            None => return,
        };

        if self.buf.is_none() {
            let mut shape = data.dims().to_vec();
            shape[0] = self.capacity;
            let buf = Tensor::zeros(shape, data.dtype(), data.device()).unwrap();
            self.buf = Some(buf);
        }

        self.buf.as_ref().unwrap().slice_set(&data, 0, index).unwrap();
    }

    fn sample(&self, ixs: &[usize]) -> Self {
        let buf = self.buf.as_ref().expect("sampling an empty TensorBatch");
        let ixs: Vec<u32> = ixs.iter().map(|&i| i as u32).collect();
        let capacity = ixs.len();
        let ixs = Tensor::from_vec(ixs, (capacity,), buf.device()).unwrap();
        Self {
            buf: Some(buf.index_select(&ixs, 0).unwrap()),
            capacity,
        }
    }
}

impl From<TensorBatch> for Tensor {
    fn from(b: TensorBatch) -> Self {
        b.buf.expect("converting an empty TensorBatch")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(values: &[i64]) -> TensorBatch {
        let t = Tensor::from_slice(values, (1, values.len()), &Device::Cpu).unwrap();
        TensorBatch::from_tensor(t)
    }

    #[test]
    fn push_then_sample_returns_items_at_indices() {
        let mut batch = TensorBatch::new(3);
        batch.push(0, item(&[10, 11]));
        batch.push(1, item(&[20, 21]));
        batch.push(2, item(&[30, 31]));
        batch.push(1, item(&[40, 41]));

        let sampled: Tensor = batch.sample(&[1, 0]).into();
        assert_eq!(
            sampled.to_vec2::<i64>().unwrap(),
            vec![vec![40, 41], vec![10, 11]]
        );
    }
}
