use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Plain hyperparameters consumed by [`crate::Solver`] at construction.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct SolverSettings {
    pub experiment_name: String,
    pub output_dir: PathBuf,
    pub model_name: String,
    pub batch_size: usize,
    pub initial_epsilon: f64,
    pub final_epsilon: f64,
    pub frames_per_action: u64,
    pub max_replay: usize,
    pub observe_for: u64,
    pub explore: u64,
    pub gamma: f32,
    pub checkpoint_frequency: u64,
    pub checkpoint_retain: u64,
    pub log_freq: u64,
    pub summary_freq: u64,
    /// Stop once this many frames have been played in total (resumed frames
    /// included).
    pub max_frames: Option<u64>,
    pub seed: Option<u64>,
}

impl Default for SolverSettings {
    fn default() -> Self {
        Self {
            experiment_name: "flappy".to_string(),
            output_dir: PathBuf::from("output"),
            model_name: "dqn".to_string(),
            batch_size: 32,
            initial_epsilon: 0.1,
            final_epsilon: 0.0001,
            frames_per_action: 1,
            max_replay: 50_000,
            observe_for: 10_000,
            explore: 3_000_000,
            gamma: 0.99,
            checkpoint_frequency: 10_000,
            checkpoint_retain: 5,
            log_freq: 100,
            summary_freq: 100,
            max_frames: None,
            seed: None,
        }
    }
}

fn invalid(message: String) -> Result<(), ConfigError> {
    Err(ConfigError::Invalid(message))
}

impl SolverSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch_size == 0 {
            return invalid("batch size must be positive".to_string());
        }
        if self.batch_size > self.max_replay {
            return invalid(format!(
                "batch size {} exceeds replay capacity {}",
                self.batch_size, self.max_replay
            ));
        }
        // the first training step samples from observe_for + 2 stored transitions
        if self.observe_for + 2 < self.batch_size as u64 {
            return invalid(format!(
                "observing for {} frames cannot fill a batch of {}",
                self.observe_for, self.batch_size
            ));
        }
        for (name, value) in [
            ("frames per action", self.frames_per_action),
            ("explore", self.explore),
            ("checkpoint frequency", self.checkpoint_frequency),
            ("checkpoint retain", self.checkpoint_retain),
            ("log frequency", self.log_freq),
            ("summary frequency", self.summary_freq),
        ] {
            if value == 0 {
                return invalid(format!("{name} must be positive"));
            }
        }
        let epsilons_ordered = (0.0..=1.0).contains(&self.final_epsilon)
            && (0.0..=1.0).contains(&self.initial_epsilon)
            && self.final_epsilon <= self.initial_epsilon;
        if !epsilons_ordered {
            return invalid(format!(
                "epsilon must satisfy 0 <= final ({}) <= initial ({}) <= 1",
                self.final_epsilon, self.initial_epsilon
            ));
        }
        if !(0.0..=1.0).contains(&self.gamma) {
            return invalid(format!("gamma {} is outside [0, 1]", self.gamma));
        }
        if self.experiment_name.is_empty() || self.model_name.is_empty() {
            return invalid("experiment and model names must not be empty".to_string());
        }
        Ok(())
    }

    pub fn experiment_dir(&self) -> PathBuf {
        self.output_dir.join(&self.experiment_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rejects(settings: SolverSettings) {
        assert!(
            matches!(settings.validate(), Err(ConfigError::Invalid(_))),
            "{settings:?} should be rejected"
        );
    }

    #[test]
    fn defaults_are_valid() {
        SolverSettings::default().validate().unwrap();
    }

    #[test]
    fn rejects_bad_combinations() {
        let base = SolverSettings::default();
        rejects(SolverSettings {
            batch_size: 0,
            ..base.clone()
        });
        rejects(SolverSettings {
            batch_size: 64,
            max_replay: 32,
            ..base.clone()
        });
        rejects(SolverSettings {
            batch_size: 32,
            observe_for: 29,
            ..base.clone()
        });
        rejects(SolverSettings {
            frames_per_action: 0,
            ..base.clone()
        });
        rejects(SolverSettings {
            explore: 0,
            ..base.clone()
        });
        rejects(SolverSettings {
            checkpoint_retain: 0,
            ..base.clone()
        });
        rejects(SolverSettings {
            final_epsilon: 0.5,
            initial_epsilon: 0.1,
            ..base.clone()
        });
        rejects(SolverSettings {
            initial_epsilon: 1.5,
            ..base.clone()
        });
        rejects(SolverSettings {
            gamma: 1.01,
            ..base.clone()
        });
        rejects(SolverSettings {
            gamma: f32::NAN,
            ..base
        });
    }

    #[test]
    fn smallest_observation_window_that_fills_a_batch() {
        SolverSettings {
            batch_size: 32,
            observe_for: 30,
            ..SolverSettings::default()
        }
        .validate()
        .unwrap();
    }
}
