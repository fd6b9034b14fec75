use super::{Action, State};

/// One recorded step of experience.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub state: State,
    pub action: Action,
    pub reward: f32,
    pub next_state: State,
    pub terminal: bool,
}
