mod basic_model;
mod params;
pub mod traits;

pub use basic_model::{BasicModel, ModelDevice};
pub use params::{NamedTensor, OptimizerState, Params};

use replay_data::{Action, State};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LearningStepInfo {
    pub loss: f32,
    pub average_q_val: f32,
}

/// A minibatch ready for one optimization step: for every sampled transition,
/// the state it started from, the action taken there and its TD target.
pub struct TrainingBatch<'a> {
    pub states: Vec<&'a State>,
    pub actions: Vec<Action>,
    pub targets: Vec<f32>,
}

impl TrainingBatch<'_> {
    pub fn len(&self) -> usize {
        self.states.len()
    }
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error(transparent)]
    Candle(#[from] candle_core::Error),
    #[error("parameter mismatch: {0}")]
    ParamMismatch(String),
    #[error("malformed training batch: {states} states, {actions} actions, {targets} targets")]
    MalformedBatch {
        states: usize,
        actions: usize,
        targets: usize,
    },
    #[error("unknown device '{0}' (expected 'cpu' or 'cuda[:N]')")]
    UnknownDevice(String),
}
