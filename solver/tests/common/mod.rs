#![allow(dead_code)]

use checkpoint::CheckpointStore;
use image::{Color3, ImageOwned3};
use model::traits::{Learner, Persistable, ValueModel};
use model::{LearningStepInfo, ModelError, NamedTensor, OptimizerState, Params, TrainingBatch};
use replay_data::State;
use solver::{
    Environment, EnvironmentError, ScalarKind, Solver, SolverSettings, StepOutcome, Telemetry,
};
use std::path::Path;

pub const N_ACTIONS: u8 = 2;

/// Constant value estimates; counts training steps and remembers the last
/// batch of targets it was given.
pub struct FixedModel {
    pub q_values: Vec<f32>,
    pub train_steps: u64,
    pub last_targets: Vec<f32>,
}

impl FixedModel {
    pub fn new(q_values: Vec<f32>) -> Self {
        Self {
            q_values,
            train_steps: 0,
            last_targets: vec![],
        }
    }
}

impl ValueModel for FixedModel {
    fn n_actions(&self) -> u8 {
        self.q_values.len() as u8
    }
    fn evaluate(&self, _state: &State) -> Result<Vec<f32>, ModelError> {
        Ok(self.q_values.clone())
    }
}

impl Learner for FixedModel {
    fn train_batch(&mut self, batch: &TrainingBatch) -> Result<LearningStepInfo, ModelError> {
        self.train_steps += 1;
        self.last_targets = batch.targets.clone();
        Ok(LearningStepInfo {
            loss: 0.5,
            average_q_val: 0.75,
        })
    }
}

impl Persistable for FixedModel {
    fn params(&self) -> Result<Params, ModelError> {
        Ok(Params(vec![NamedTensor {
            name: "q".to_string(),
            shape: vec![self.q_values.len()],
            values: self.q_values.clone(),
        }]))
    }
    fn set_params(&mut self, params: &Params) -> Result<(), ModelError> {
        let q = params
            .get("q")
            .ok_or_else(|| ModelError::ParamMismatch("missing 'q'".to_string()))?;
        self.q_values = q.values.clone();
        Ok(())
    }
    fn optimizer_state(&self) -> Result<OptimizerState, ModelError> {
        Ok(OptimizerState {
            step: self.train_steps,
            buffers: Params::default(),
        })
    }
    fn set_optimizer_state(&mut self, state: &OptimizerState) -> Result<(), ModelError> {
        self.train_steps = state.step;
        Ok(())
    }
}

/// Plays fixed-length episodes of uniformly coloured 8x8 frames whose shade
/// encodes the step count.
pub struct ScriptedEnv {
    pub episode_len: u32,
    pub fail_at: Option<usize>,
    pub empty_from: Option<usize>,
    pub actions: Vec<Vec<f32>>,
    score: u32,
}

impl ScriptedEnv {
    pub fn new(episode_len: u32) -> Self {
        Self {
            episode_len,
            fail_at: None,
            empty_from: None,
            actions: vec![],
            score: 0,
        }
    }
    pub fn failing_at(mut self, step: usize) -> Self {
        self.fail_at = Some(step);
        self
    }
    /// Returns `0 x 0` frames from the given environment call onwards.
    pub fn empty_frames_from(mut self, step: usize) -> Self {
        self.empty_from = Some(step);
        self
    }
    /// Action indices received after the priming step.
    pub fn chosen_indices(&self) -> Vec<usize> {
        self.actions[1..]
            .iter()
            .map(|one_hot| one_hot.iter().position(|&v| v == 1.0).unwrap())
            .collect()
    }
}

impl Environment for ScriptedEnv {
    fn n_actions(&self) -> u8 {
        N_ACTIONS
    }
    fn step(&mut self, action: &[f32]) -> Result<StepOutcome, EnvironmentError> {
        if self.fail_at == Some(self.actions.len()) {
            return Err(EnvironmentError::Failed("scripted failure".to_string()));
        }
        self.actions.push(action.to_vec());
        let shade = (self.actions.len() * 10 % 256) as u8;
        let side = match self.empty_from {
            Some(step) if self.actions.len() > step => 0,
            _ => 8,
        };
        self.score += 1;
        let terminal = self.score == self.episode_len;
        let score = self.score;
        if terminal {
            self.score = 0;
        }
        Ok(StepOutcome {
            frame: ImageOwned3::filled(side, side, Color3::new(shade, shade, shade)),
            reward: if terminal { -1.0 } else { 0.1 },
            terminal,
            score,
        })
    }
}

#[derive(Default)]
pub struct RecordingTelemetry {
    pub scalars: Vec<(ScalarKind, u64, f64)>,
}

impl RecordingTelemetry {
    pub fn of_kind(&self, kind: ScalarKind) -> Vec<(u64, f64)> {
        self.scalars
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|&(_, frame, value)| (frame, value))
            .collect()
    }
}

impl Telemetry for RecordingTelemetry {
    fn scalar(&mut self, kind: ScalarKind, frame: u64, value: f64) {
        self.scalars.push((kind, frame, value));
    }
}

pub fn settings(output_dir: &Path) -> SolverSettings {
    SolverSettings {
        experiment_name: "exp".to_string(),
        output_dir: output_dir.to_path_buf(),
        model_name: "fixed".to_string(),
        batch_size: 2,
        initial_epsilon: 1.0,
        final_epsilon: 0.1,
        frames_per_action: 1,
        max_replay: 8,
        observe_for: 3,
        explore: 10,
        gamma: 0.9,
        checkpoint_frequency: 5,
        checkpoint_retain: 2,
        log_freq: 1,
        summary_freq: 1,
        max_frames: None,
        seed: Some(7),
    }
}

pub fn store(settings: &SolverSettings) -> CheckpointStore {
    CheckpointStore::new(
        &settings.output_dir,
        &settings.experiment_name,
        &settings.model_name,
        settings.checkpoint_frequency,
        settings.checkpoint_retain,
    )
    .unwrap()
}

pub type TestSolver = Solver<ScriptedEnv, FixedModel, RecordingTelemetry>;

pub fn solver_with(settings: SolverSettings, env: ScriptedEnv) -> TestSolver {
    let store = store(&settings);
    Solver::new(
        settings,
        env,
        FixedModel::new(vec![0.25, 0.75]),
        store,
        RecordingTelemetry::default(),
    )
    .unwrap()
}
