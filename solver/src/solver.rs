use super::{
    compute_targets, ActionSelector, ConfigError, Environment, ExplorationSchedule, ScalarKind,
    SolverError, SolverSettings, Telemetry,
};
use checkpoint::CheckpointStore;
use image::{preprocess, ImageOwned};
use model::traits::{Learner, Persistable, ValueModel};
use model::{LearningStepInfo, TrainingBatch};
use rand::rngs::StdRng;
use rand::SeedableRng;
use replay_data::{Action, State, Transition};
use replay_memories::ReplayQueue;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::info;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Observe,
    Train,
}

/// What happened during one call to [`Solver::step`].
#[derive(Clone, Debug)]
pub struct StepReport {
    /// Frame index the step was taken on.
    pub frame: u64,
    pub phase: Phase,
    pub action: Action,
    pub epsilon: f64,
    pub reward: f32,
    pub terminal: bool,
    pub score: u32,
    pub max_q: f32,
    pub learning: Option<LearningStepInfo>,
    pub checkpoint_saved: bool,
}

/// Single-threaded DQN training loop. Owns every piece of mutable training
/// state: the environment, the model, the replay memory, the schedule and the
/// random generator.
pub struct Solver<E, M, T> {
    settings: SolverSettings,
    env: E,
    model: M,
    telemetry: T,
    replay: ReplayQueue<Transition>,
    schedule: ExplorationSchedule,
    selector: ActionSelector,
    checkpoints: CheckpointStore,
    rng: StdRng,
    state: Option<State>,
    prev_action: Action,
}

impl<E, M, T> Solver<E, M, T>
where
    E: Environment,
    M: ValueModel + Learner + Persistable,
    T: Telemetry,
{
    /// Validates the settings and resumes from the latest checkpoint in
    /// `checkpoints`, if there is one.
    pub fn new(
        settings: SolverSettings,
        env: E,
        mut model: M,
        checkpoints: CheckpointStore,
        telemetry: T,
    ) -> Result<Self, SolverError> {
        settings.validate()?;
        let n_actions = env.n_actions();
        if n_actions == 0 || model.n_actions() != n_actions {
            return Err(ConfigError::Invalid(format!(
                "model predicts {} actions but the environment accepts {n_actions}",
                model.n_actions()
            ))
            .into());
        }
        let mut schedule = ExplorationSchedule::from_settings(&settings);
        match checkpoints.restore(&mut model)? {
            Some((frame, epsilon)) => {
                schedule.resume(frame, epsilon);
                info!(
                    "resuming at frame {frame} with epsilon {}",
                    schedule.epsilon()
                );
            }
            None => info!(
                "no checkpoint found, starting fresh with epsilon {}",
                schedule.epsilon()
            ),
        }
        let rng = match settings.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            replay: ReplayQueue::with_max_size(settings.max_replay),
            selector: ActionSelector::new(settings.frames_per_action, n_actions),
            prev_action: Action::noop(n_actions),
            settings,
            env,
            model,
            telemetry,
            schedule,
            checkpoints,
            rng,
            state: None,
        })
    }

    // The first observation comes from doing nothing once; it is stacked
    // four times and never stored.
    fn prime(&mut self) -> Result<State, SolverError> {
        let noop = Action::noop(self.env.n_actions());
        let outcome = self.env.step(&noop.one_hot())?;
        let frame = preprocess(&outcome.frame.as_ref()).map_err(ConfigError::from)?;
        Ok(State::repeat(frame))
    }

    /// Plays one frame, stores the transition and, once observation is
    /// over, takes one optimization step.
    pub fn step(&mut self) -> Result<StepReport, SolverError> {
        let state = match self.state.take() {
            Some(state) => state,
            None => self.prime()?,
        };
        let frame = self.schedule.num_frames();
        let q_values = self.model.evaluate(&state)?;
        let max_q = q_values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let action = self.selector.select(
            frame,
            self.prev_action,
            self.schedule.epsilon(),
            &q_values,
            &mut self.rng,
        );

        let outcome = self.env.step(&action.one_hot())?;
        let observation = preprocess(&outcome.frame.as_ref()).map_err(ConfigError::from)?;
        let next_state = state.push(observation);
        self.replay.add_transition(Transition {
            state,
            action,
            reward: outcome.reward,
            next_state: next_state.clone(),
            terminal: outcome.terminal,
        });

        let phase = if self.schedule.is_observing() {
            Phase::Observe
        } else {
            Phase::Train
        };
        let mut learning = None;
        let mut batch_reward = 0.0;
        if phase == Phase::Train {
            self.schedule.decay_epsilon();
            let batch = self
                .replay
                .sample_batch(&mut self.rng, self.settings.batch_size)?;
            let targets = compute_targets(&self.model, &batch, self.settings.gamma)?;
            batch_reward =
                batch.iter().map(|t| f64::from(t.reward)).sum::<f64>() / batch.len() as f64;
            let training_batch = TrainingBatch {
                states: batch.iter().map(|t| &t.state).collect(),
                actions: batch.iter().map(|t| t.action).collect(),
                targets,
            };
            learning = Some(self.model.train_batch(&training_batch)?);
        }

        self.schedule.step();
        self.prev_action = action;
        self.state = Some(next_state);

        if outcome.terminal {
            info!("episode finished at frame {frame} with score {}", outcome.score);
            self.telemetry
                .scalar(ScalarKind::EpisodeScore, frame, f64::from(outcome.score));
        }

        let mut checkpoint_saved = false;
        if let Some(step_info) = learning {
            let saved_frame = self.schedule.num_frames();
            checkpoint_saved =
                self.checkpoints
                    .save(saved_frame, self.schedule.epsilon(), &self.model)?;
            if frame % self.settings.log_freq == 0 {
                info!(
                    "frame {frame} | epsilon {:.6} | action {action} | reward {} | max q {max_q:.6}",
                    self.schedule.epsilon(),
                    outcome.reward
                );
            }
            if frame % self.settings.summary_freq == 0 {
                self.telemetry
                    .scalar(ScalarKind::Loss, frame, f64::from(step_info.loss));
                self.telemetry
                    .scalar(ScalarKind::QValue, frame, f64::from(step_info.average_q_val));
                self.telemetry
                    .scalar(ScalarKind::BatchReward, frame, batch_reward);
                self.telemetry
                    .scalar(ScalarKind::Score, frame, f64::from(outcome.score));
            }
        }

        Ok(StepReport {
            frame,
            phase,
            action,
            epsilon: self.schedule.epsilon(),
            reward: outcome.reward,
            terminal: outcome.terminal,
            score: outcome.score,
            max_q,
            learning,
            checkpoint_saved,
        })
    }

    fn reached_max_frames(&self) -> bool {
        self.settings
            .max_frames
            .is_some_and(|max_frames| self.schedule.num_frames() >= max_frames)
    }

    /// Steps until `stop` is raised or the frame limit is reached, then
    /// writes a final checkpoint. Errors abort the loop without one.
    pub fn run(&mut self, stop: &AtomicBool) -> Result<(), SolverError> {
        info!(
            "training from frame {} (observing until frame {})",
            self.schedule.num_frames(),
            self.schedule.num_frames() + self.settings.observe_for
        );
        let mut announced_training = false;
        while !stop.load(Ordering::SeqCst) && !self.reached_max_frames() {
            let report = self.step()?;
            if report.phase == Phase::Train && !announced_training {
                info!("observation over, training from frame {}", report.frame);
                announced_training = true;
            }
        }
        if stop.load(Ordering::SeqCst) {
            info!("stop requested");
        }
        let path = self.checkpoints.force_save(
            self.schedule.num_frames(),
            self.schedule.epsilon(),
            &self.model,
        )?;
        info!("final checkpoint written to {}", path.display());
        Ok(())
    }

    pub fn num_frames(&self) -> u64 {
        self.schedule.num_frames()
    }
    pub fn epsilon(&self) -> f64 {
        self.schedule.epsilon()
    }
    pub fn is_observing(&self) -> bool {
        self.schedule.is_observing()
    }
    pub fn replay(&self) -> &ReplayQueue<Transition> {
        &self.replay
    }
    pub fn model(&self) -> &M {
        &self.model
    }
    pub fn env(&self) -> &E {
        &self.env
    }
    pub fn telemetry(&self) -> &T {
        &self.telemetry
    }
    pub fn settings(&self) -> &SolverSettings {
        &self.settings
    }
}
