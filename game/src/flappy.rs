use super::{GameConfig, RewardScheme};
use image::{Color3, ImageOwned3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use solver::{Environment, EnvironmentError, StepOutcome};
use std::collections::VecDeque;

const N_ACTIONS: u8 = 2;
const BACKGROUND: Color3 = Color3::new(0, 0, 0);
const PLAYER_COLOR: Color3 = Color3::new(255, 0, 0);
const PIPE_COLOR: Color3 = Color3::new(0, 255, 0);

#[derive(Clone, Copy, Debug, PartialEq)]
struct Rect {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
}

impl Rect {
    fn intersects(&self, other: &Rect) -> bool {
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PipePair {
    x: f32,
    gap_top: f32,
}

/// Headless side-scroller: a box falls under gravity, jumps on action 1 and
/// has to fly through the openings of pipe pairs scrolling in from the right.
///
/// The game resets itself on a crash; the step reporting the crash carries
/// the final score and the last frame of the finished episode.
pub struct FlappyGame {
    config: GameConfig,
    rewards: RewardScheme,
    rng: StdRng,
    player_y: f32,
    player_velocity: f32,
    pipes: VecDeque<PipePair>,
    score: u32,
}

impl FlappyGame {
    pub fn new(config: GameConfig, rewards: RewardScheme, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let mut game = Self {
            config,
            rewards,
            rng,
            player_y: 0.0,
            player_velocity: 0.0,
            pipes: VecDeque::new(),
            score: 0,
        };
        game.reset();
        game
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn reset(&mut self) {
        self.player_y = self.config.player_start_y;
        self.player_velocity = 0.0;
        self.score = 0;
        self.pipes.clear();
        let mut x = self.config.width as f32;
        for _ in 0..self.config.n_pipes {
            let pipe = self.new_pipe(x);
            self.pipes.push_back(pipe);
            x += self.config.pipe_spacing;
        }
    }

    fn new_pipe(&mut self, x: f32) -> PipePair {
        PipePair {
            x,
            gap_top: self
                .rng
                .gen_range(self.config.gap_top_min..=self.config.gap_top_max),
        }
    }

    fn player_rect(&self) -> Rect {
        Rect {
            x0: self.config.player_x,
            y0: self.player_y,
            x1: self.config.player_x + self.config.player_size,
            y1: self.player_y + self.config.player_size,
        }
    }

    fn pipe_rects(&self, pipe: &PipePair) -> [Rect; 2] {
        let x0 = pipe.x;
        let x1 = pipe.x + self.config.pipe_width;
        [
            Rect {
                x0,
                y0: f32::NEG_INFINITY,
                x1,
                y1: pipe.gap_top,
            },
            Rect {
                x0,
                y0: pipe.gap_top + self.config.gap_height,
                x1,
                y1: f32::INFINITY,
            },
        ]
    }

    fn has_crashed(&self) -> bool {
        let player = self.player_rect();
        let out_of_screen = player.y0 < 0.0 || player.y1 > self.config.height as f32;
        out_of_screen
            || self
                .pipes
                .iter()
                .flat_map(|pipe| self.pipe_rects(pipe))
                .any(|pipe| pipe.intersects(&player))
    }

    fn fill(&self, image: &mut ImageOwned3, rect: Rect, color: Color3) {
        let clip_x = |v: f32| v.clamp(0.0, self.config.width as f32) as u32;
        let clip_y = |v: f32| v.clamp(0.0, self.config.height as f32) as u32;
        image.fill_rect(
            clip_x(rect.x0),
            clip_y(rect.y0),
            clip_x(rect.x1),
            clip_y(rect.y1),
            color,
        );
    }

    pub fn render(&self) -> ImageOwned3 {
        let mut image = ImageOwned3::filled(self.config.width, self.config.height, BACKGROUND);
        for pipe in &self.pipes {
            for rect in self.pipe_rects(pipe) {
                self.fill(&mut image, rect, PIPE_COLOR);
            }
        }
        self.fill(&mut image, self.player_rect(), PLAYER_COLOR);
        image
    }

    fn advance(&mut self, jump: bool) -> f32 {
        if jump {
            self.player_velocity = -self.config.jump_speed;
        }
        self.player_velocity += self.config.gravity;
        self.player_y += self.player_velocity;

        let mut reward = self.rewards.step;
        let player_centre = self.config.player_x + self.config.player_size / 2.0;
        let half_pipe = self.config.pipe_width / 2.0;
        for pipe in self.pipes.iter_mut() {
            let centre_before = pipe.x + half_pipe;
            pipe.x -= self.config.pipe_speed;
            if centre_before > player_centre && pipe.x + half_pipe <= player_centre {
                self.score += 1;
                reward = self.rewards.pass;
            }
        }
        while self
            .pipes
            .front()
            .is_some_and(|pipe| pipe.x + self.config.pipe_width < 0.0)
        {
            self.pipes.pop_front();
            let x = self
                .pipes
                .back()
                .map_or(self.config.width as f32, |last| last.x + self.config.pipe_spacing);
            let pipe = self.new_pipe(x);
            self.pipes.push_back(pipe);
        }
        reward
    }
}

fn decode_action(action: &[f32]) -> Result<bool, EnvironmentError> {
    let is_one_hot = action.len() == usize::from(N_ACTIONS)
        && action.iter().all(|&v| v == 0.0 || v == 1.0)
        && action.iter().filter(|&&v| v == 1.0).count() == 1;
    if !is_one_hot {
        return Err(EnvironmentError::InvalidAction {
            action: action.to_vec(),
            n_actions: N_ACTIONS,
        });
    }
    Ok(action[1] == 1.0)
}

impl Environment for FlappyGame {
    fn n_actions(&self) -> u8 {
        N_ACTIONS
    }
    fn step(&mut self, action: &[f32]) -> Result<StepOutcome, EnvironmentError> {
        let jump = decode_action(action)?;
        let mut reward = self.advance(jump);
        let terminal = self.has_crashed();
        let frame = self.render();
        let score = self.score;
        if terminal {
            reward = self.rewards.crash;
            self.reset();
        }
        Ok(StepOutcome {
            frame,
            reward,
            terminal,
            score,
        })
    }
}
