use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

/// One run-log line: a single output file written by a stage.
#[derive(Debug, Serialize)]
pub struct RunRecord<'a> {
    pub stage: &'a str,
    pub file: &'a str,
    pub rows_in: usize,
    pub rows_out: usize,
    pub written_at: DateTime<Utc>,
}

/// Append-only run log backed by one JSON-lines file per stage.
///
/// Observability only: stages write records after each successful output
/// and nothing ever reads them back. A failed log append is reported to the
/// caller like any other write failure.
pub struct RunLog {
    dir: PathBuf,
}

impl RunLog {
    /// Construct a run log at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating history directory {:?}", &dir))?;
        Ok(Self { dir })
    }

    /// Record that `stage` wrote `file`, sized `rows_out`, derived from
    /// `rows_in` input rows.
    pub fn record(&self, stage: &str, file: &str, rows_in: usize, rows_out: usize) -> Result<()> {
        let record = RunRecord {
            stage,
            file,
            rows_in,
            rows_out,
            written_at: Utc::now(),
        };
        let line = serde_json::to_string(&record).context("serializing run record")?;

        let path = self.dir.join(format!("{}.jsonl", stage));
        let mut out = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening run log {:?}", path))?;
        writeln!(out, "{}", line).with_context(|| format!("appending to run log {:?}", path))?;
        Ok(())
    }
}
