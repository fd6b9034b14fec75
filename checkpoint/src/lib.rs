mod record;

pub use record::CheckpointRecord;

use file_io::{files_by_mtime_desc, open_file_buf_read, remove_file_if_exists, write_atomically};
use model::traits::Persistable;
use model::ModelError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum CheckpointError {
    #[error("checkpoint i/o failed on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("checkpoint {path} is unusable: {reason}")]
    Corrupt { path: PathBuf, reason: String },
    #[error("could not export model state: {0}")]
    Model(#[from] ModelError),
    #[error("checkpoint {0} must be positive")]
    InvalidPolicy(&'static str),
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> CheckpointError + '_ {
    move |source| CheckpointError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Frame-indexed snapshots of a model and its optimizer, one file per saved
/// frame. Only the `retain` newest files survive a save.
#[derive(Debug)]
pub struct CheckpointStore {
    dir: PathBuf,
    model_name: String,
    frequency: u64,
    retain: u64,
}

impl CheckpointStore {
    /// Creates `<output_root>/<experiment>/checkpoints/` if it does not exist yet.
    ///
    /// Both `frequency` and `retain` must be positive.
    pub fn new<P: AsRef<Path>>(
        output_root: P,
        experiment: &str,
        model_name: &str,
        frequency: u64,
        retain: u64,
    ) -> Result<Self, CheckpointError> {
        if frequency == 0 {
            return Err(CheckpointError::InvalidPolicy("frequency"));
        }
        if retain == 0 {
            return Err(CheckpointError::InvalidPolicy("retain"));
        }
        let dir = output_root.as_ref().join(experiment).join("checkpoints");
        fs::create_dir_all(&dir).map_err(io_error(&dir))?;
        Ok(Self {
            dir,
            model_name: model_name.to_string(),
            frequency,
            retain,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, frame: u64) -> PathBuf {
        self.dir
            .join(format!("{}_frame_{frame}.ckpt", self.model_name))
    }

    fn frame_of(&self, name: &str) -> Option<u64> {
        name.strip_prefix(&self.model_name)?
            .strip_prefix("_frame_")?
            .strip_suffix(".ckpt")?
            .parse()
            .ok()
    }

    // newest modification time first, the higher frame winning ties
    fn newest_first(&self) -> Result<Vec<PathBuf>, CheckpointError> {
        let files = files_by_mtime_desc(&self.dir, |name| self.frame_of(name).is_some())
            .map_err(io_error(&self.dir))?;
        let mut files: Vec<_> = files
            .into_iter()
            .filter_map(|(modified, path)| {
                let frame = self.frame_of(path.file_name()?.to_str()?)?;
                Some((modified, frame, path))
            })
            .collect();
        files.sort_by(|a, b| (b.0, b.1).cmp(&(a.0, a.1)));
        Ok(files.into_iter().map(|(_, _, path)| path).collect())
    }

    fn latest(&self) -> Result<Option<PathBuf>, CheckpointError> {
        Ok(self.newest_first()?.into_iter().next())
    }

    // only the `retain` checkpoints `restore` would prefer survive,
    // off-grid ones and those from earlier runs included
    fn prune(&self) -> Result<(), CheckpointError> {
        for stale in self.newest_first()?.into_iter().skip(self.retain as usize) {
            if remove_file_if_exists(&stale).map_err(io_error(&stale))? {
                debug!("pruned checkpoint {}", stale.display());
            }
        }
        Ok(())
    }

    /// Saves when `frame` is a multiple of the frequency. Returns whether a
    /// checkpoint was written.
    pub fn save<M: Persistable + ?Sized>(
        &self,
        frame: u64,
        epsilon: f64,
        model: &M,
    ) -> Result<bool, CheckpointError> {
        if frame % self.frequency != 0 {
            return Ok(false);
        }
        self.force_save(frame, epsilon, model)?;
        Ok(true)
    }

    /// Saves regardless of the frequency, then prunes down to the `retain`
    /// newest checkpoints.
    pub fn force_save<M: Persistable + ?Sized>(
        &self,
        frame: u64,
        epsilon: f64,
        model: &M,
    ) -> Result<PathBuf, CheckpointError> {
        let record = CheckpointRecord {
            frame,
            epsilon,
            model: model.params()?,
            optimizer: model.optimizer_state()?,
        };
        let path = self.path_for(frame);
        write_atomically(&path, |file| record::serialize_into(file, &record))
            .map_err(io_error(&path))?;
        info!("saved checkpoint at frame {frame} to {}", path.display());
        self.prune()?;
        Ok(path)
    }

    /// Loads the most recently modified checkpoint into `model` and returns
    /// its `(frame, epsilon)`, or `None` when there is nothing to resume from.
    pub fn restore<M: Persistable + ?Sized>(
        &self,
        model: &mut M,
    ) -> Result<Option<(u64, f64)>, CheckpointError> {
        let Some(path) = self.latest()? else {
            return Ok(None);
        };
        let corrupt = |reason: String| CheckpointError::Corrupt {
            path: path.clone(),
            reason,
        };
        let reader = open_file_buf_read(&path).map_err(io_error(&path))?;
        let record = record::deserialize_from(reader).map_err(|e| corrupt(e.to_string()))?;
        model
            .set_params(&record.model)
            .map_err(|e| corrupt(e.to_string()))?;
        model
            .set_optimizer_state(&record.optimizer)
            .map_err(|e| corrupt(e.to_string()))?;
        info!(
            "restored checkpoint {} (frame {}, epsilon {})",
            path.display(),
            record.frame,
            record.epsilon
        );
        Ok(Some((record.frame, record.epsilon)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use model::{NamedTensor, OptimizerState, Params};
    use std::fs::File;
    use std::time::{Duration, SystemTime};

    #[derive(Default)]
    struct FakeModel {
        params: Params,
        optimizer: OptimizerState,
    }

    impl FakeModel {
        fn with_values(values: Vec<f32>) -> Self {
            let len = values.len();
            Self {
                params: Params(vec![NamedTensor {
                    name: "fc.weight".to_string(),
                    shape: vec![len],
                    values,
                }]),
                optimizer: OptimizerState {
                    step: 7,
                    buffers: Params::default(),
                },
            }
        }
    }

    impl Persistable for FakeModel {
        fn params(&self) -> Result<Params, ModelError> {
            Ok(self.params.clone())
        }
        fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
            if !self.params.is_empty() && params.len() != self.params.len() {
                return Err(ModelError::ParamMismatch("tensor count".to_string()));
            }
            self.params = params.clone();
            Ok(())
        }
        fn optimizer_state(&self) -> Result<OptimizerState, ModelError> {
            Ok(self.optimizer.clone())
        }
        fn set_optimizer_state(&mut self, state: &OptimizerState) -> Result<(), ModelError> {
            self.optimizer = state.clone();
            Ok(())
        }
    }

    fn touch_at(path: &Path, secs: u64) {
        File::options()
            .write(true)
            .open(path)
            .unwrap()
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    #[test]
    fn round_trip_is_bit_identical() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        let saved = FakeModel::with_values(vec![-0.0, 1.5, f32::MIN_POSITIVE, 3.25e-7]);
        assert!(store.save(100, 0.37, &saved).unwrap());

        let mut restored = FakeModel::default();
        assert_eq!(store.restore(&mut restored).unwrap(), Some((100, 0.37)));
        assert!(restored.params.bit_eq(&saved.params));
        assert_eq!(restored.optimizer, saved.optimizer);
    }

    #[test]
    fn layout_and_naming() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        assert_eq!(store.dir(), root.path().join("exp").join("checkpoints"));
        store.save(20, 0.5, &FakeModel::default()).unwrap();
        assert!(root
            .path()
            .join("exp/checkpoints/net_frame_20.ckpt")
            .is_file());
        assert!(!root
            .path()
            .join("exp/checkpoints/net_frame_20.ckpt.tmp")
            .exists());
    }

    #[test]
    fn save_is_frequency_gated() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        assert!(!store.save(15, 0.5, &FakeModel::default()).unwrap());
        assert!(!store.path_for(15).exists());
        assert_eq!(store.restore(&mut FakeModel::default()).unwrap(), None);
    }

    #[test]
    fn retention_prunes_checkpoint_retain_times_frequency_older() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        let model = FakeModel::default();
        for frame in (0..=50).step_by(10) {
            store.save(frame, 0.1, &model).unwrap();
        }
        assert!(!store.path_for(0).exists());
        for frame in (10..=50).step_by(10) {
            assert!(store.path_for(frame).exists(), "frame {frame} missing");
        }
        store.save(60, 0.1, &model).unwrap();
        assert!(!store.path_for(10).exists());
        assert!(store.path_for(20).exists());
    }

    #[test]
    fn pruning_a_missing_checkpoint_is_silent() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 2).unwrap();
        assert!(store.save(1000, 0.1, &FakeModel::default()).unwrap());
    }

    #[test]
    fn force_save_ignores_frequency_but_not_retention() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 2).unwrap();
        let model = FakeModel::default();
        store.save(10, 0.1, &model).unwrap();
        store.save(20, 0.1, &model).unwrap();
        store.force_save(27, 0.1, &model).unwrap();
        assert!(!store.path_for(10).exists());
        assert!(store.path_for(20).exists());
        assert!(store.path_for(27).exists());
    }

    #[test]
    fn off_grid_checkpoints_are_pruned_by_later_saves() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 2).unwrap();
        let model = FakeModel::default();
        store.force_save(23, 0.1, &model).unwrap();
        store.force_save(47, 0.1, &model).unwrap();
        store.save(50, 0.1, &model).unwrap();
        store.save(60, 0.1, &model).unwrap();
        let mut left: Vec<_> = fs::read_dir(store.dir())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        left.sort();
        assert_eq!(left, ["net_frame_50.ckpt", "net_frame_60.ckpt"]);
    }

    #[test]
    fn retention_leaves_other_files_alone() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 1).unwrap();
        fs::write(store.dir().join("other_frame_10.ckpt"), b"junk").unwrap();
        fs::write(store.dir().join("notes.txt"), b"junk").unwrap();
        store.save(10, 0.1, &FakeModel::default()).unwrap();
        store.save(20, 0.1, &FakeModel::default()).unwrap();
        assert!(store.dir().join("other_frame_10.ckpt").exists());
        assert!(store.dir().join("notes.txt").exists());
        assert!(!store.path_for(10).exists());
    }

    #[test]
    fn zero_frequency_or_retain_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        assert!(matches!(
            CheckpointStore::new(root.path(), "exp", "net", 0, 5),
            Err(CheckpointError::InvalidPolicy("frequency"))
        ));
        assert!(matches!(
            CheckpointStore::new(root.path(), "exp", "net", 10, 0),
            Err(CheckpointError::InvalidPolicy("retain"))
        ));
    }

    #[test]
    fn restore_picks_most_recently_modified() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        store.save(30, 0.3, &FakeModel::with_values(vec![3.0])).unwrap();
        store.save(10, 0.1, &FakeModel::with_values(vec![1.0])).unwrap();
        touch_at(&store.path_for(30), 2_000_000_000);
        touch_at(&store.path_for(10), 1_000_000_000);

        let mut model = FakeModel::default();
        assert_eq!(store.restore(&mut model).unwrap(), Some((30, 0.3)));
        assert_eq!(model.params.0[0].values, vec![3.0]);
    }

    #[test]
    fn equal_modification_times_favour_the_later_frame() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        store.save(90, 0.9, &FakeModel::with_values(vec![9.0])).unwrap();
        store.save(100, 0.1, &FakeModel::with_values(vec![10.0])).unwrap();
        touch_at(&store.path_for(90), 1_500_000_000);
        touch_at(&store.path_for(100), 1_500_000_000);
        assert_eq!(
            store.restore(&mut FakeModel::default()).unwrap(),
            Some((100, 0.1))
        );
    }

    #[test]
    fn other_models_and_stray_files_are_ignored() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        fs::write(store.dir().join("other_frame_10.ckpt"), b"junk").unwrap();
        fs::write(store.dir().join("net_frame_10.ckpt.tmp"), b"junk").unwrap();
        fs::write(store.dir().join("notes.txt"), b"junk").unwrap();
        assert_eq!(store.restore(&mut FakeModel::default()).unwrap(), None);
    }

    #[test]
    fn corrupt_latest_checkpoint_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        fs::write(store.path_for(40), b"definitely not zstd").unwrap();
        let err = store.restore(&mut FakeModel::default()).unwrap_err();
        assert!(matches!(err, CheckpointError::Corrupt { path, .. } if path == store.path_for(40)));
    }

    #[test]
    fn checkpoint_that_does_not_fit_the_model_is_fatal() {
        let root = tempfile::tempdir().unwrap();
        let store = CheckpointStore::new(root.path(), "exp", "net", 10, 5).unwrap();
        store.save(10, 0.1, &FakeModel::default()).unwrap();
        let mut model = FakeModel::with_values(vec![1.0]);
        assert!(matches!(
            store.restore(&mut model),
            Err(CheckpointError::Corrupt { .. })
        ));
    }
}
