use super::PlotSet;
use crossbeam_channel::{Receiver, Sender};
use solver::{ScalarKind, Telemetry};
use std::path::PathBuf;
use tracing::{info, warn};

pub enum PlotThreadMessage {
    Datum(ScalarKind, (f64, f64)),
    Close,
}

struct Loop {
    receiver: Receiver<PlotThreadMessage>,
    plots: PlotSet,
}

impl Loop {
    fn run(&mut self) {
        // a dropped sender ends the loop just like an explicit close
        while let Ok(message) = self.receiver.recv() {
            match message {
                PlotThreadMessage::Datum(kind, datum) => {
                    if let Err(e) = self.plots.add_datum(kind, datum) {
                        warn!("plot thread: could not export {kind}: {e}");
                    }
                }
                PlotThreadMessage::Close => break,
            }
        }
        if let Err(e) = self.plots.export_all() {
            warn!("plot thread: final export failed: {e}");
        }
        info!("plot thread: closed");
    }
}

pub fn spawn_plot_thread(
    receiver: Receiver<PlotThreadMessage>,
    plots_dir: PathBuf,
    data_per_point: usize,
) -> std::io::Result<std::thread::JoinHandle<()>> {
    let plots = PlotSet::open(&plots_dir, data_per_point)?;
    std::thread::Builder::new()
        .name("plot".to_string())
        .spawn(move || Loop { receiver, plots }.run())
}

/// Forwards telemetry scalars to the plot thread.
pub struct PlotSender {
    sender: Sender<PlotThreadMessage>,
    disconnected: bool,
}

impl PlotSender {
    pub fn new(sender: Sender<PlotThreadMessage>) -> Self {
        Self {
            sender,
            disconnected: false,
        }
    }
    pub fn close(&self) {
        let _ = self.sender.send(PlotThreadMessage::Close);
    }
}

impl Telemetry for PlotSender {
    fn scalar(&mut self, kind: ScalarKind, frame: u64, value: f64) {
        let message = PlotThreadMessage::Datum(kind, (frame as f64, value));
        if self.sender.send(message).is_err() && !self.disconnected {
            warn!("plot thread is gone, dropping telemetry");
            self.disconnected = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam_channel::unbounded;

    #[test]
    fn scalars_reach_the_exported_plots() {
        let dir = tempfile::tempdir().unwrap();
        let (sender, receiver) = unbounded();
        let handle = spawn_plot_thread(receiver, dir.path().to_path_buf(), 2).unwrap();
        let mut telemetry = PlotSender::new(sender);
        telemetry.scalar(ScalarKind::EpisodeScore, 3, 4.0);
        telemetry.scalar(ScalarKind::EpisodeScore, 9, 6.0);
        telemetry.close();
        handle.join().unwrap();

        let file = std::fs::File::open(dir.path().join("episode_score.json")).unwrap();
        let json: serde_json::Value = serde_json::from_reader(file).unwrap();
        assert_eq!(json["points"], serde_json::json!([[9.0, 5.0]]));
    }

    #[test]
    fn sending_after_the_thread_ended_is_harmless() {
        let (sender, receiver) = unbounded();
        drop(receiver);
        let mut telemetry = PlotSender::new(sender);
        telemetry.scalar(ScalarKind::Loss, 1, 0.5);
        telemetry.scalar(ScalarKind::Loss, 2, 0.5);
        assert!(telemetry.disconnected);
    }
}
