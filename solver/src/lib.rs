mod action_selector;
mod environment;
mod exploration;
mod settings;
mod solver;
mod targets;
mod telemetry;

pub use action_selector::{argmax, ActionSelector};
pub use environment::{Environment, EnvironmentError, StepOutcome};
pub use exploration::ExplorationSchedule;
pub use settings::SolverSettings;
pub use solver::{Phase, Solver, StepReport};
pub use targets::{compute_targets, td_target};
pub use telemetry::{NoTelemetry, ScalarKind, Telemetry};

use checkpoint::CheckpointError;
use image::ImageError;
use model::ModelError;
use replay_memories::SampleError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0}")]
    Invalid(String),
    #[error("environment produced a malformed frame: {0}")]
    MalformedFrame(#[from] ImageError),
}

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// The replay memory could not supply a full minibatch.
    #[error("resource error: {0}")]
    Resource(#[from] SampleError),
    #[error("checkpoint error: {0}")]
    Io(#[from] CheckpointError),
    #[error("environment error: {0}")]
    Environment(#[from] EnvironmentError),
    #[error("model error: {0}")]
    Model(#[from] ModelError),
}
