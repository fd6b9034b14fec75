use image::ImageOwned3;

/// What the environment reports after one step. When `terminal` is set the
/// environment has already reset itself and `score` is the final score of the
/// episode that just ended.
#[derive(Clone, Debug)]
pub struct StepOutcome {
    pub frame: ImageOwned3,
    pub reward: f32,
    pub terminal: bool,
    pub score: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum EnvironmentError {
    #[error("action {action:?} is not a one-hot vector over {n_actions} actions")]
    InvalidAction { action: Vec<f32>, n_actions: u8 },
    #[error("environment failed: {0}")]
    Failed(String),
}

/// A game driven one frame at a time by one-hot action vectors.
pub trait Environment {
    fn n_actions(&self) -> u8;
    fn step(&mut self, action: &[f32]) -> Result<StepOutcome, EnvironmentError>;
}
