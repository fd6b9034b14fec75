mod config;
mod flappy;

pub use config::{GameConfig, RewardScheme};
pub use flappy::FlappyGame;
