//! Run artifact persistence.
//!
//! Each loop run can write its analysis outcome, per-round evaluation
//! snapshots, and final result into a timestamped directory. Recording is
//! best-effort: IO failures are logged and never interrupt the run.

use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::types::analysis::AnalysisOutcome;
use crate::types::workflow::{IterationRecord, WorkflowResult};

/// Best-effort writer for one run's artifacts.
#[derive(Debug)]
pub struct RunRecorder {
    run_dir: Option<PathBuf>,
}

impl RunRecorder {
    /// Open a timestamped run directory under `root`.
    ///
    /// `None` — or a root where the directory cannot be created —
    /// disables recording for the run.
    pub fn begin(root: Option<&Path>) -> Self {
        let run_dir = root.and_then(|root| {
            let dir = root.join(format!("research_{}", Local::now().format("%Y%m%d_%H%M%S")));
            match fs::create_dir_all(&dir) {
                Ok(()) => Some(dir),
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "could not create run directory");
                    None
                }
            }
        });
        Self { run_dir }
    }

    /// Whether artifacts are being written.
    pub fn enabled(&self) -> bool {
        self.run_dir.is_some()
    }

    /// The run directory, when recording is enabled.
    pub fn run_dir(&self) -> Option<&Path> {
        self.run_dir.as_deref()
    }

    pub(crate) fn record_analysis(&self, outcome: &AnalysisOutcome) {
        self.write("image_analysis.json", outcome);
    }

    pub(crate) fn record_round(&self, record: &IterationRecord) {
        self.write(&format!("evaluation_{}.json", record.round), record);
    }

    pub(crate) fn record_final(&self, result: &WorkflowResult) {
        self.write("final_result.json", result);
    }

    fn write<T: Serialize>(&self, name: &str, value: &T) {
        let Some(dir) = &self.run_dir else {
            return;
        };
        let path = dir.join(name);
        let json = match serde_json::to_string_pretty(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not serialize artifact");
                return;
            }
        };
        if let Err(e) = fs::write(&path, json) {
            warn!(file = %path.display(), error = %e, "could not write artifact");
        }
    }
}
