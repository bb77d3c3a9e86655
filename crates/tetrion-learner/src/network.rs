use std::{fmt, path::Path};

use candle_core::{DType, Device, Tensor};
use candle_nn::{Linear, Module as _, VarBuilder, VarMap, linear};

use crate::LearnerError;

/// Hidden layer widths of the value MLP.
const HIDDEN_SIZES: [usize; 2] = [64, 64];

/// Afterstate value approximator.
///
/// A small fully connected network mapping one feature vector to one scalar
/// value estimate: `input -> 64 -> 64 -> 1` with ReLU activations, running on
/// the CPU. Parameters live in a [`VarMap`] so they can be snapshotted to and
/// restored from safetensors checkpoints.
pub struct ValueNetwork {
    layers: Vec<Linear>,
    varmap: VarMap,
    device: Device,
    input_len: usize,
}

impl fmt::Debug for ValueNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValueNetwork")
            .field("input_len", &self.input_len)
            .field("hidden_sizes", &HIDDEN_SIZES)
            .finish_non_exhaustive()
    }
}

impl ValueNetwork {
    /// Builds a freshly initialized network for feature vectors of
    /// `input_len` entries.
    ///
    /// # Panics
    ///
    /// Panics if `input_len` is zero.
    pub fn new(input_len: usize) -> Result<Self, LearnerError> {
        assert!(input_len > 0, "value network needs a non-empty input");

        let device = Device::Cpu;
        let varmap = VarMap::new();
        let vb = VarBuilder::from_varmap(&varmap, DType::F32, &device);

        let mut layers = Vec::with_capacity(HIDDEN_SIZES.len() + 1);
        let mut in_dim = input_len;
        for (i, &out_dim) in HIDDEN_SIZES.iter().enumerate() {
            layers.push(linear(in_dim, out_dim, vb.pp(format!("layer_{i}")))?);
            in_dim = out_dim;
        }
        layers.push(linear(in_dim, 1, vb.pp("value_head"))?);

        Ok(Self {
            layers,
            varmap,
            device,
            input_len,
        })
    }

    /// Declared input size; encoders must produce vectors of exactly this
    /// length.
    #[must_use]
    pub fn input_len(&self) -> usize {
        self.input_len
    }

    #[must_use]
    pub(crate) fn device(&self) -> &Device {
        &self.device
    }

    /// Trainable parameters, for wiring up an optimizer.
    #[must_use]
    pub(crate) fn trainable_vars(&self) -> Vec<candle_core::Var> {
        self.varmap.all_vars()
    }

    /// Forward pass: `[batch, input_len]` in, `[batch, 1]` out.
    pub(crate) fn forward(&self, features: &Tensor) -> candle_core::Result<Tensor> {
        let mut output = features.clone();
        for (i, layer) in self.layers.iter().enumerate() {
            output = layer.forward(&output)?;
            if i < self.layers.len() - 1 {
                output = output.relu()?;
            }
        }
        Ok(output)
    }

    /// Stacks feature rows into a `[batch, input_len]` tensor.
    pub(crate) fn batch_tensor(&self, rows: &[&[f32]]) -> Result<Tensor, LearnerError> {
        let mut flat = Vec::with_capacity(rows.len() * self.input_len);
        for row in rows {
            debug_assert_eq!(row.len(), self.input_len);
            flat.extend_from_slice(row);
        }
        Ok(Tensor::from_vec(
            flat,
            (rows.len(), self.input_len),
            &self.device,
        )?)
    }

    /// Value estimates for a batch of feature vectors.
    ///
    /// Evaluated in inference mode: the results are detached from the
    /// computation graph, so no gradients flow through them.
    pub fn values(&self, rows: &[&[f32]]) -> Result<Vec<f32>, LearnerError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let batch = self.batch_tensor(rows)?;
        let output = self.forward(&batch)?.detach();
        Ok(output.squeeze(1)?.to_vec1::<f32>()?)
    }

    /// Snapshots all parameters to a safetensors file.
    pub fn save(&self, path: &Path) -> Result<(), LearnerError> {
        Ok(self.varmap.save(path)?)
    }

    /// Restores parameters from a safetensors file.
    ///
    /// Fails if the file is missing, unreadable, or holds tensors of a
    /// different shape than this network declares.
    pub fn load(&mut self, path: &Path) -> Result<(), LearnerError> {
        Ok(self.varmap.load(path)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        std::env::temp_dir().join(format!("tetrion-network-{}-{name}", std::process::id()))
    }

    #[test]
    fn values_match_the_input_batch_size() {
        let network = ValueNetwork::new(4).unwrap();
        let rows: Vec<&[f32]> = vec![&[0.0, 0.0, 0.0, 0.0], &[1.0, 2.0, 3.0, 4.0]];

        let values = network.values(&rows).unwrap();
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn empty_batch_yields_empty_values() {
        let network = ValueNetwork::new(4).unwrap();
        assert!(network.values(&[]).unwrap().is_empty());
    }

    #[test]
    fn inference_is_deterministic() {
        let network = ValueNetwork::new(3).unwrap();
        let rows: Vec<&[f32]> = vec![&[1.0, 2.0, 3.0]];

        let first = network.values(&rows).unwrap();
        let second = network.values(&rows).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn save_and_load_restore_predictions() {
        let path = temp_path("roundtrip.safetensors");
        let source = ValueNetwork::new(4).unwrap();
        source.save(&path).unwrap();

        let mut restored = ValueNetwork::new(4).unwrap();
        restored.load(&path).unwrap();

        let rows: Vec<&[f32]> = vec![&[0.5, 1.5, 2.5, 3.5]];
        assert_eq!(
            source.values(&rows).unwrap(),
            restored.values(&rows).unwrap()
        );

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn loading_a_differently_shaped_checkpoint_fails() {
        let path = temp_path("mismatch.safetensors");
        let source = ValueNetwork::new(4).unwrap();
        source.save(&path).unwrap();

        let mut other = ValueNetwork::new(5).unwrap();
        assert!(other.load(&path).is_err());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn loading_a_missing_checkpoint_fails() {
        let mut network = ValueNetwork::new(4).unwrap();
        assert!(
            network
                .load(Path::new("/nonexistent/tetrion/latest.safetensors"))
                .is_err()
        );
    }
}
