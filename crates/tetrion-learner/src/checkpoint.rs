use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{LearnerError, ValueNetwork};

/// Metadata stored next to the `latest` parameter snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMeta {
    pub name: String,
    pub trained_at: DateTime<Utc>,
    pub episodes: usize,
    pub encoder: String,
    pub feature_len: usize,
}

/// Writes and restores value network checkpoints.
///
/// Layout under the checkpoint directory:
///
/// ```text
/// progress/episode-<n>.safetensors   periodic snapshots, keyed by episode
/// latest.safetensors                 parameters of the last completed run
/// latest.json                        metadata for the latest slot
/// ```
///
/// The replay buffer is deliberately not persisted; only approximator
/// parameters survive across runs.
#[derive(Debug, Clone)]
pub struct Checkpointer {
    dir: PathBuf,
    interval: usize,
}

impl Checkpointer {
    /// Creates a checkpointer rooted at `dir`, snapshotting every
    /// `interval` episodes.
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    #[must_use]
    pub fn new(dir: PathBuf, interval: usize) -> Self {
        assert!(interval > 0, "checkpoint interval must be positive");
        Self { dir, interval }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Saves an episode-keyed snapshot when `episode` is a multiple of the
    /// interval; returns the written path, or `None` when the episode is off
    /// the cadence.
    pub fn save_progress(
        &self,
        episode: usize,
        network: &ValueNetwork,
    ) -> Result<Option<PathBuf>, LearnerError> {
        if episode == 0 || episode % self.interval != 0 {
            return Ok(None);
        }
        let progress_dir = self.dir.join("progress");
        fs::create_dir_all(&progress_dir)?;
        let path = progress_dir.join(format!("episode-{episode}.safetensors"));
        network.save(&path)?;
        Ok(Some(path))
    }

    /// Updates the `latest` slot with the network's parameters and run
    /// metadata.
    pub fn save_latest(
        &self,
        network: &ValueNetwork,
        meta: &CheckpointMeta,
    ) -> Result<PathBuf, LearnerError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join("latest.safetensors");
        network.save(&path)?;
        let meta_json = serde_json::to_string_pretty(meta)?;
        fs::write(self.dir.join("latest.json"), meta_json)?;
        Ok(path)
    }

    /// Restores the `latest` slot into `network` and returns its metadata.
    ///
    /// A missing or corrupt checkpoint is an error for the caller to handle;
    /// the network is only modified after the metadata's recorded feature
    /// length has been validated against the network's declared input, so a
    /// mismatching checkpoint can never be half-loaded.
    pub fn load_latest(&self, network: &mut ValueNetwork) -> Result<CheckpointMeta, LearnerError> {
        let meta_json = fs::read_to_string(self.dir.join("latest.json"))?;
        let meta: CheckpointMeta = serde_json::from_str(&meta_json)?;
        if meta.feature_len != network.input_len() {
            return Err(LearnerError::FeatureShapeMismatch {
                encoder: meta.feature_len,
                network: network.input_len(),
            });
        }
        network.load(&self.dir.join("latest.safetensors"))?;
        Ok(meta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "tetrion-checkpoint-{}-{name}",
            std::process::id()
        ));
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn meta(feature_len: usize) -> CheckpointMeta {
        CheckpointMeta {
            name: "test".to_owned(),
            trained_at: Utc::now(),
            episodes: 42,
            encoder: "compact".to_owned(),
            feature_len,
        }
    }

    #[test]
    fn latest_roundtrip() {
        let dir = temp_dir("latest-roundtrip");
        let checkpointer = Checkpointer::new(dir.clone(), 200);
        let network = ValueNetwork::new(4).unwrap();

        checkpointer.save_latest(&network, &meta(4)).unwrap();

        let mut restored = ValueNetwork::new(4).unwrap();
        let loaded = checkpointer.load_latest(&mut restored).unwrap();
        assert_eq!(loaded.episodes, 42);
        assert_eq!(loaded.encoder, "compact");

        let rows: Vec<&[f32]> = vec![&[1.0, 0.0, 2.0, 0.0]];
        assert_eq!(
            network.values(&rows).unwrap(),
            restored.values(&rows).unwrap()
        );

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn loading_without_a_checkpoint_is_an_error() {
        let dir = temp_dir("empty");
        let checkpointer = Checkpointer::new(dir.clone(), 200);
        let mut network = ValueNetwork::new(4).unwrap();

        assert!(checkpointer.load_latest(&mut network).is_err());

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn mismatched_feature_len_is_rejected_before_loading_tensors() {
        let dir = temp_dir("mismatch");
        let checkpointer = Checkpointer::new(dir.clone(), 200);
        let network = ValueNetwork::new(4).unwrap();
        checkpointer.save_latest(&network, &meta(4)).unwrap();

        let mut other = ValueNetwork::new(30).unwrap();
        let err = checkpointer.load_latest(&mut other).unwrap_err();
        assert!(matches!(
            err,
            LearnerError::FeatureShapeMismatch {
                encoder: 4,
                network: 30
            }
        ));

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn progress_snapshots_follow_the_interval() {
        let dir = temp_dir("progress");
        let checkpointer = Checkpointer::new(dir.clone(), 200);
        let network = ValueNetwork::new(4).unwrap();

        assert!(checkpointer.save_progress(0, &network).unwrap().is_none());
        assert!(checkpointer.save_progress(199, &network).unwrap().is_none());

        let path = checkpointer
            .save_progress(200, &network)
            .unwrap()
            .expect("multiple of the interval");
        assert!(path.ends_with("progress/episode-200.safetensors"));
        assert!(path.exists());

        fs::remove_dir_all(&dir).ok();
    }
}
