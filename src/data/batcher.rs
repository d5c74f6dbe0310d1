// ============================================================
// Layer 4 — Note Batcher
// ============================================================
// Converts plain-Rust WindowBatch data into Burn tensors.
//
// Layout change:
//   WindowBatch stores  [examples, features, steps]
//   Burn's Lstm expects [examples, steps, features]
//
// so the batcher writes values in time-major-within-example
// order and builds the tensor with that shape directly.
//
// Values are cast from f64 to f32 on the way in.
//
// Reference: Burn Book §4 (Batcher)

use burn::{prelude::*, tensor::TensorData};

use crate::domain::batch::WindowBatch;
use crate::domain::series::Row;

/// Input and target tensors for one minibatch.
/// Both have shape [examples, steps, features].
#[derive(Debug, Clone)]
pub struct NoteTensors<B: Backend> {
    pub input:  Tensor<B, 3>,
    pub target: Tensor<B, 3>,
}

/// Holds the target device so tensors are created on the right GPU/CPU.
#[derive(Clone, Debug)]
pub struct NoteBatcher<B: Backend> {
    pub device: B::Device,
}

impl<B: Backend> NoteBatcher<B> {
    pub fn new(device: B::Device) -> Self {
        Self { device }
    }

    /// Materialize a WindowBatch as [examples, steps, features] tensors.
    pub fn batch(&self, batch: &WindowBatch) -> NoteTensors<B> {
        let [size, features, steps] = batch.shape();
        let capacity = size * steps * features;

        let mut input  = Vec::with_capacity(capacity);
        let mut target = Vec::with_capacity(capacity);
        for i in 0..size {
            for c in 0..steps {
                for f in 0..features {
                    input.push(batch.input_at(i, f, c) as f32);
                    target.push(batch.target_at(i, f, c) as f32);
                }
            }
        }

        NoteTensors {
            input:  self.tensor(input,  [size, steps, features]),
            target: self.tensor(target, [size, steps, features]),
        }
    }

    /// A run of rows as a single sequence: [1, rows, features].
    pub fn sequence(&self, rows: &[Row], features: usize) -> Tensor<B, 3> {
        let flat: Vec<f32> = rows
            .iter()
            .flat_map(|r| (0..features).map(move |f| r.get(f).copied().unwrap_or(0.0) as f32))
            .collect();
        self.tensor(flat, [1, rows.len(), features])
    }

    fn tensor(&self, values: Vec<f32>, shape: [usize; 3]) -> Tensor<B, 3> {
        Tensor::<B, 3>::from_data(TensorData::new(values, shape), &self.device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    #[test]
    fn test_batch_layout_is_step_major() {
        let mut wb = WindowBatch::zeros(1, 2, 2);
        wb.set_step(0, 0, &vec![1.0, 2.0], &vec![3.0, 4.0]);
        wb.set_step(0, 1, &vec![3.0, 4.0], &vec![5.0, 6.0]);

        let batcher = NoteBatcher::<TestBackend>::new(Default::default());
        let t = batcher.batch(&wb);

        assert_eq!(t.input.dims(), [1, 2, 2]);
        let input: Vec<f32>  = t.input.into_data().to_vec().unwrap();
        let target: Vec<f32> = t.target.into_data().to_vec().unwrap();
        assert_eq!(input,  vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(target, vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_sequence_shape() {
        let batcher = NoteBatcher::<TestBackend>::new(Default::default());
        let rows = vec![vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]];
        let t = batcher.sequence(&rows, 3);
        assert_eq!(t.dims(), [1, 2, 3]);
        let values: Vec<f32> = t.into_data().to_vec().unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
