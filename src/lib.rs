use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod harness;
pub mod process;
pub mod registry;
pub mod schema;
pub mod seed;
pub mod suite;

/// How the interpreter is invoked for a timed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ExecutionMode {
    /// No profiler.
    #[serde(rename = "base")]
    Base,
    /// Profiler restricted to CPU sampling.
    #[serde(rename = "cpu")]
    ProfileCpu,
    /// Profiler with everything enabled.
    #[serde(rename = "full")]
    ProfileFull,
}

impl ExecutionMode {
    pub const ALL: [ExecutionMode; 3] = [
        ExecutionMode::Base,
        ExecutionMode::ProfileCpu,
        ExecutionMode::ProfileFull,
    ];

    /// Key used in the JSON report.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExecutionMode::Base => "base",
            ExecutionMode::ProfileCpu => "cpu",
            ExecutionMode::ProfileFull => "full",
        }
    }

    pub fn is_profiled(&self) -> bool {
        !matches!(self, ExecutionMode::Base)
    }

    /// Human-readable run label, e.g. `profile-cpu-nbody`.
    pub fn label(&self, variant: &str) -> String {
        match self {
            ExecutionMode::Base => format!("base-{variant}"),
            ExecutionMode::ProfileCpu => format!("profile-cpu-{variant}"),
            ExecutionMode::ProfileFull => format!("profile-full-{variant}"),
        }
    }
}

impl std::fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
