use serde::{Deserialize, Serialize};

/// Rewards handed out per frame. A pass or a crash replaces the step reward
/// of the frame it happens on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RewardScheme {
    pub step: f32,
    pub pass: f32,
    pub crash: f32,
}

impl Default for RewardScheme {
    fn default() -> Self {
        Self {
            step: 0.1,
            pass: 1.0,
            crash: -1.0,
        }
    }
}

/// Geometry and physics of the game, in pixels and pixels per frame.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GameConfig {
    pub width: u32,
    pub height: u32,
    pub player_x: f32,
    pub player_start_y: f32,
    pub player_size: f32,
    pub gravity: f32,
    pub jump_speed: f32,
    pub pipe_width: f32,
    pub pipe_speed: f32,
    /// Horizontal distance between consecutive pipe pairs.
    pub pipe_spacing: f32,
    /// Height of the opening between the upper and the lower pipe.
    pub gap_height: f32,
    /// Range the top edge of each opening is drawn from.
    pub gap_top_min: f32,
    pub gap_top_max: f32,
    pub n_pipes: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: 480,
            height: 640,
            player_x: 200.0,
            player_start_y: 280.0,
            player_size: 64.0,
            gravity: 0.5,
            jump_speed: 8.0,
            pipe_width: 100.0,
            pipe_speed: 4.0,
            pipe_spacing: 300.0,
            gap_height: 200.0,
            gap_top_min: 50.0,
            gap_top_max: 350.0,
            n_pipes: 5,
        }
    }
}
