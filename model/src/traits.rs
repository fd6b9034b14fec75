use super::{LearningStepInfo, ModelError, OptimizerState, Params, TrainingBatch};
use replay_data::State;

/// Maps a state to one value estimate per action.
///
/// Evaluation has no side effects and is deterministic for fixed parameters.
pub trait ValueModel {
    fn n_actions(&self) -> u8;
    fn evaluate(&self, state: &State) -> Result<Vec<f32>, ModelError>;
    fn evaluate_batch(&self, states: &[&State]) -> Result<Vec<Vec<f32>>, ModelError> {
        states.iter().map(|state| self.evaluate(state)).collect()
    }
}

/// Takes one gradient step on the mean squared error between the values
/// predicted for the taken actions and the supplied targets.
pub trait Learner {
    fn train_batch(&mut self, batch: &TrainingBatch) -> Result<LearningStepInfo, ModelError>;
}

/// Exposes the trainable state in a backend-independent form.
pub trait Persistable {
    fn params(&self) -> Result<Params, ModelError>;
    fn set_params(&mut self, params: &Params) -> Result<(), ModelError>;
    fn optimizer_state(&self) -> Result<OptimizerState, ModelError>;
    fn set_optimizer_state(&mut self, state: &OptimizerState) -> Result<(), ModelError>;
}
