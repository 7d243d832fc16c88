use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::process::ProcessOutput;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The seed benchmark exited non-zero; nothing was timed.
    #[error("failed to capture seed output ({label}, exit {})", .output.display_code())]
    SeedFailed { label: String, output: ProcessOutput },

    /// A timed invocation exited non-zero; the remaining suite is abandoned.
    #[error("{label} FAILED (exit {})", .output.display_code())]
    BenchmarkFailed { label: String, output: ProcessOutput },

    #[error("benchmark directory not found: {}", .path.display())]
    MissingBenchmarkDir { path: PathBuf },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl HarnessError {
    /// Captured output of the offending process, if the error came from one.
    pub fn process_output(&self) -> Option<(&str, &ProcessOutput)> {
        match self {
            HarnessError::SeedFailed { label, output }
            | HarnessError::BenchmarkFailed { label, output } => Some((label, output)),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, HarnessError>;
