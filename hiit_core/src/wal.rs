//! Result persistence gateway.
//!
//! A finished session is handed to a [`ResultSink`] exactly once. The bundled
//! [`JsonlSink`] appends one JSON object per line under an exclusive `fs2`
//! lock; [`read_results`] backs `hiit history`.

use crate::{Result, SessionResult};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

/// Where finished sessions go
///
/// `Ok(())` means the result is durable. An `Err` carries the failure
/// reason; the caller reports it and does not call `save` again for the
/// same result.
pub trait ResultSink {
    fn save(&mut self, result: &SessionResult) -> Result<()>;
}

/// Appends results to a JSON Lines file, creating parent directories
pub struct JsonlSink {
    path: PathBuf,
}

impl JsonlSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ResultSink for JsonlSink {
    fn save(&mut self, result: &SessionResult) -> Result<()> {
        let mut record = serde_json::to_vec(result)?;
        record.push(b'\n');

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        // One write_all per record keeps concurrent appenders line-atomic
        file.lock_exclusive()?;
        let written = file.write_all(&record).and_then(|_| file.sync_data());
        file.unlock()?;
        written?;

        tracing::debug!("Saved result {} to {:?}", result.id, self.path);
        Ok(())
    }
}

/// All results recorded at `path`, in file order
///
/// A missing file is an empty history. Unparseable lines are logged and
/// skipped so one bad record does not hide the rest.
pub fn read_results(path: &Path) -> Result<Vec<SessionResult>> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };
    file.lock_shared()?;

    let mut results = Vec::new();
    for (index, line) in BufReader::new(&file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<SessionResult>(&line) {
            Ok(result) => results.push(result),
            Err(e) => tracing::warn!("Skipping result on line {}: {}", index + 1, e),
        }
    }

    file.unlock()?;
    tracing::debug!("Loaded {} results from {:?}", results.len(), path);
    Ok(results)
}
