use std::fmt;

/// A discrete action, carried together with the size of the action set so it
/// can always be expanded to its one-hot vector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Action {
    index: u8,
    n_actions: u8,
}

impl Action {
    pub fn new(index: u8, n_actions: u8) -> Self {
        assert!(
            index < n_actions,
            "action index {index} out of range for {n_actions} actions"
        );
        Self { index, n_actions }
    }
    /// The "do nothing" action, which is always index 0.
    pub fn noop(n_actions: u8) -> Self {
        Self::new(0, n_actions)
    }
    pub fn index(self) -> u8 {
        self.index
    }
    pub fn n_actions(self) -> u8 {
        self.n_actions
    }
    pub fn one_hot(self) -> Vec<f32> {
        let mut one_hot = vec![0.0; usize::from(self.n_actions)];
        one_hot[usize::from(self.index)] = 1.0;
        one_hot
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.index {
            0 => write!(f, "no-op"),
            1 if self.n_actions == 2 => write!(f, "act"),
            index => write!(f, "action {index}"),
        }
    }
}
