use crate::error::{Result, SnakeError};

use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Per-episode scores and their running mean.
#[derive(Debug, Default, Clone)]
pub struct ScoreHistory {
    scores: Vec<u32>,
    mean_scores: Vec<f64>,
    total: u64,
    record: u32,
}

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a finished episode and returns the updated mean score.
    pub fn push(&mut self, score: u32) -> f64 {
        self.scores.push(score);
        self.total += score as u64;
        self.record = self.record.max(score);

        let mean = self.total as f64 / self.scores.len() as f64;
        self.mean_scores.push(mean);
        mean
    }

    pub fn scores(&self) -> &[u32] {
        &self.scores
    }

    pub fn mean_scores(&self) -> &[f64] {
        &self.mean_scores
    }

    pub fn games(&self) -> usize {
        self.scores.len()
    }

    pub fn record(&self) -> u32 {
        self.record
    }

    pub fn last_score(&self) -> Option<u32> {
        self.scores.last().copied()
    }

    pub fn last_mean(&self) -> Option<f64> {
        self.mean_scores.last().copied()
    }
}

/// Told about every finished episode, after the history was updated.
pub trait ScoreObserver {
    fn on_episode(&mut self, history: &ScoreHistory) -> Result<()>;
}

#[derive(Serialize)]
struct ScoreRow {
    game: usize,
    score: u32,
    mean_score: f64,
    record: u32,
}

/// Appends one csv row per episode and flushes right away, so the file can
/// be plotted while training runs.
pub struct CsvScoreLog {
    writer: csv::Writer<File>,
    path: PathBuf,
}

impl CsvScoreLog {
    /// Truncates `path`; the header is written with the first row.
    pub fn create(path: &Path) -> Result<Self> {
        let writer = csv::Writer::from_path(path)?;
        Ok(Self {
            writer,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreObserver for CsvScoreLog {
    fn on_episode(&mut self, history: &ScoreHistory) -> Result<()> {
        let (Some(score), Some(mean_score)) = (history.last_score(), history.last_mean()) else {
            return Ok(());
        };

        self.writer.serialize(ScoreRow {
            game: history.games(),
            score,
            mean_score,
            record: history.record(),
        })?;
        self.writer.flush().map_err(|e| SnakeError::io(&self.path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_mean() {
        let mut history = ScoreHistory::new();
        assert_eq!(history.push(2), 2.0);
        assert_eq!(history.push(0), 1.0);
        assert_eq!(history.push(7), 3.0);

        assert_eq!(history.scores(), &[2, 0, 7]);
        assert_eq!(history.mean_scores(), &[2.0, 1.0, 3.0]);
        assert_eq!(history.record(), 7);
        assert_eq!(history.games(), 3);
    }

    #[test]
    fn test_csv_log_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.csv");
        let mut log = CsvScoreLog::create(&path).unwrap();
        let mut history = ScoreHistory::new();

        log.on_episode(&history).unwrap();
        for score in [1, 3] {
            history.push(score);
            log.on_episode(&history).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "game,score,mean_score,record\n1,1,1.0,1\n2,3,2.0,3\n");
    }
}
