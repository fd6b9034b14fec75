use file_io::{open_file_buf_read, write_atomically};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::{Path, PathBuf};

/// A series of `(frame, value)` points, each the average of
/// `data_per_point` consecutive data.
#[derive(Serialize, Deserialize, Debug)]
pub struct Plot {
    points: Vec<(f64, f64)>,
    current_n: usize,
    current_sum: f64,
    data_per_point: usize,
    #[serde(skip)]
    path: PathBuf,
}

impl Plot {
    pub fn new(path: PathBuf, data_per_point: usize) -> Self {
        assert!(data_per_point > 0);
        Self {
            points: vec![],
            current_n: 0,
            current_sum: 0.0,
            data_per_point,
            path,
        }
    }
    /// Picks up a series exported by an earlier run, so a resumed run
    /// extends it instead of overwriting it.
    pub fn open(path: PathBuf, data_per_point: usize) -> io::Result<Self> {
        if !path.is_file() {
            return Ok(Self::new(path, data_per_point));
        }
        let file = open_file_buf_read(&path)?;
        let mut plot: Self = serde_json::from_reader(file)?;
        plot.path = path;
        plot.data_per_point = data_per_point;
        Ok(plot)
    }
    /// Returns whether a new point was completed.
    pub fn add_datum(&mut self, (x, y): (f64, f64)) -> bool {
        self.current_n += 1;
        self.current_sum += y;
        if self.current_n < self.data_per_point {
            return false;
        }
        let y_average = self.current_sum / (self.data_per_point as f64);
        self.points.push((x, y_average));
        self.current_n = 0;
        self.current_sum = 0.0;
        true
    }
    // json keeps the series easy to analyse with external tools; a reader
    // sees either the previous export or this one, never a torn file
    pub fn export_json(&self) -> io::Result<()> {
        write_atomically(&self.path, |file| {
            serde_json::to_writer(file, self).map_err(io::Error::from)
        })
    }
    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn averages_data_per_point() {
        let dir = tempfile::tempdir().unwrap();
        let mut plot = Plot::new(dir.path().join("loss.json"), 2);
        assert!(!plot.add_datum((1.0, 1.0)));
        assert!(plot.add_datum((2.0, 3.0)));
        assert!(!plot.add_datum((3.0, 10.0)));
        assert_eq!(plot.points(), [(2.0, 2.0)]);
    }

    #[test]
    fn reopened_series_continues() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("score.json");
        let mut plot = Plot::new(path.clone(), 1);
        plot.add_datum((5.0, 7.0));
        plot.export_json().unwrap();

        let mut reopened = Plot::open(path, 1).unwrap();
        reopened.add_datum((6.0, 8.0));
        assert_eq!(reopened.points(), [(5.0, 7.0), (6.0, 8.0)]);
    }

    #[test]
    fn export_replaces_the_previous_file_in_one_piece() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("loss.json");
        let mut plot = Plot::new(path.clone(), 1);
        plot.add_datum((1.0, 1.0));
        plot.export_json().unwrap();
        plot.add_datum((2.0, 4.0));
        plot.export_json().unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, ["loss.json"]);
        let reopened = Plot::open(path, 1).unwrap();
        assert_eq!(reopened.points(), [(1.0, 1.0), (2.0, 4.0)]);
    }
}
