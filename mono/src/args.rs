use clap::Parser;
use game::RewardScheme;
use model::ModelDevice;
use solver::SolverSettings;
use std::path::PathBuf;

/// Trains a DQN agent to play a side-scrolling obstacle game from pixels.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Name of the run; outputs go to <output-dir>/<experiment-name>/.
    #[arg(long, default_value = "flappy")]
    pub experiment_name: String,
    #[arg(long, default_value = "output")]
    pub output_dir: PathBuf,
    /// Prefix of the checkpoint file names.
    #[arg(long, default_value = "dqn")]
    pub model_name: String,
    #[arg(long, default_value_t = 32)]
    pub batch_size: usize,
    #[arg(long, default_value_t = 1e-4)]
    pub lr: f64,
    #[arg(long, default_value_t = 0.1)]
    pub initial_epsilon: f64,
    #[arg(long, default_value_t = 0.0001)]
    pub final_epsilon: f64,
    /// Number of frames every chosen action is held for.
    #[arg(long, default_value_t = 1)]
    pub frames_per_action: u64,
    #[arg(long, default_value_t = 50_000)]
    pub max_replay: usize,
    /// Frames played before training starts.
    #[arg(long, default_value_t = 10_000)]
    pub observe_for: u64,
    /// Training frames over which epsilon decays to its final value.
    #[arg(long, default_value_t = 3_000_000)]
    pub explore: u64,
    #[arg(long, default_value_t = 0.99)]
    pub gamma: f32,
    #[arg(long, default_value_t = 10_000)]
    pub checkpoint_frequency: u64,
    /// Number of checkpoints kept on disk.
    #[arg(long, default_value_t = 5)]
    pub checkpoint_retain: u64,
    #[arg(long, default_value_t = 100)]
    pub log_freq: u64,
    #[arg(long, default_value_t = 100)]
    pub summary_freq: u64,
    /// Summaries averaged into each exported plot point.
    #[arg(long, default_value_t = 10)]
    pub plot_data_per_point: usize,
    /// `cpu`, `cuda` or `cuda:N`.
    #[arg(long, default_value = "cpu")]
    pub device: ModelDevice,
    /// Stop after this many frames in total.
    #[arg(long)]
    pub max_frames: Option<u64>,
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value_t = 0.1, allow_negative_numbers = true)]
    pub step_reward: f32,
    #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
    pub pass_reward: f32,
    #[arg(long, default_value_t = -1.0, allow_negative_numbers = true)]
    pub crash_reward: f32,
    /// Increase log verbosity (-v = DEBUG, -vv = TRACE).
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    pub fn solver_settings(&self) -> SolverSettings {
        SolverSettings {
            experiment_name: self.experiment_name.clone(),
            output_dir: self.output_dir.clone(),
            model_name: self.model_name.clone(),
            batch_size: self.batch_size,
            initial_epsilon: self.initial_epsilon,
            final_epsilon: self.final_epsilon,
            frames_per_action: self.frames_per_action,
            max_replay: self.max_replay,
            observe_for: self.observe_for,
            explore: self.explore,
            gamma: self.gamma,
            checkpoint_frequency: self.checkpoint_frequency,
            checkpoint_retain: self.checkpoint_retain,
            log_freq: self.log_freq,
            summary_freq: self.summary_freq,
            max_frames: self.max_frames,
            seed: self.seed,
        }
    }
    pub fn reward_scheme(&self) -> RewardScheme {
        RewardScheme {
            step: self.step_reward,
            pass: self.pass_reward,
            crash: self.crash_reward,
        }
    }
}
