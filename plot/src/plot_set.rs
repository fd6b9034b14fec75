use super::Plot;
use solver::ScalarKind;
use std::fs;
use std::io;
use std::path::Path;

/// One plot per telemetry scalar, exported as `<dir>/<scalar>.json`.
pub struct PlotSet {
    loss: Plot,
    q_val: Plot,
    reward: Plot,
    score: Plot,
    episode_score: Plot,
}

impl PlotSet {
    pub fn open<P: AsRef<Path>>(dir: P, data_per_point: usize) -> io::Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let open = |kind: ScalarKind| {
            Plot::open(
                dir.join(kind.name()).with_extension("json"),
                data_per_point,
            )
        };
        Ok(Self {
            loss: open(ScalarKind::Loss)?,
            q_val: open(ScalarKind::QValue)?,
            reward: open(ScalarKind::BatchReward)?,
            score: open(ScalarKind::Score)?,
            episode_score: open(ScalarKind::EpisodeScore)?,
        })
    }
    /// Adds a datum and re-exports its plot whenever a point completes.
    pub fn add_datum(&mut self, kind: ScalarKind, datum: (f64, f64)) -> io::Result<()> {
        let plot = self.plot_mut(kind);
        if plot.add_datum(datum) {
            plot.export_json()?;
        }
        Ok(())
    }
    pub fn export_all(&self) -> io::Result<()> {
        for kind in ScalarKind::ALL {
            self.plot(kind).export_json()?;
        }
        Ok(())
    }
    pub fn plot(&self, kind: ScalarKind) -> &Plot {
        match kind {
            ScalarKind::Loss => &self.loss,
            ScalarKind::QValue => &self.q_val,
            ScalarKind::BatchReward => &self.reward,
            ScalarKind::Score => &self.score,
            ScalarKind::EpisodeScore => &self.episode_score,
        }
    }
    fn plot_mut(&mut self, kind: ScalarKind) -> &mut Plot {
        match kind {
            ScalarKind::Loss => &mut self.loss,
            ScalarKind::QValue => &mut self.q_val,
            ScalarKind::BatchReward => &mut self.reward,
            ScalarKind::Score => &mut self.score,
            ScalarKind::EpisodeScore => &mut self.episode_score,
        }
    }
}
