mod replay_queue;

pub use replay_queue::ReplayQueue;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum SampleError {
    #[error("cannot sample {requested} transitions from a replay memory holding {available}")]
    NotEnoughTransitions { requested: usize, available: usize },
}
