use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Loss,
    QValue,
    /// Mean reward of the sampled minibatch.
    BatchReward,
    /// Score of the running episode at summary time.
    Score,
    /// Final score of every finished episode.
    EpisodeScore,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 5] = [
        ScalarKind::Loss,
        ScalarKind::QValue,
        ScalarKind::BatchReward,
        ScalarKind::Score,
        ScalarKind::EpisodeScore,
    ];
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Loss => "loss",
            ScalarKind::QValue => "q_val",
            ScalarKind::BatchReward => "reward",
            ScalarKind::Score => "score",
            ScalarKind::EpisodeScore => "episode_score",
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Sink for scalars keyed by frame index. Training never depends on what the
/// sink does with them.
pub trait Telemetry {
    fn scalar(&mut self, kind: ScalarKind, frame: u64, value: f64);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoTelemetry;

impl Telemetry for NoTelemetry {
    fn scalar(&mut self, _kind: ScalarKind, _frame: u64, _value: f64) {}
}
