//! Harness configuration.
//!
//! Settings come from built-in defaults, optionally replaced field-by-field by
//! a TOML file (`bench.toml` in the current directory, or `--config`), and
//! finally by command-line overrides.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::registry::{self, Registry};
use crate::ExecutionMode;

pub const DEFAULT_CONFIG_FILE: &str = "bench.toml";

/// The benchmark whose output becomes the seed payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeedConfig {
    pub program: String,
    pub script: String,
    pub args: Vec<String>,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            program: "fasta".to_string(),
            script: "fasta.php-3.php".to_string(),
            args: vec!["400000".to_string()],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    /// Interpreter executable, resolved relative to `work_dir`.
    pub interpreter: String,
    /// Profiler entry script passed to the interpreter in profiled modes.
    pub profiler: String,
    /// Extra profiler token for [`ExecutionMode::ProfileCpu`].
    pub cpu_only_flag: String,
    /// Working directory of every spawned process.
    pub work_dir: PathBuf,
    /// Unprofiled benchmark tree, relative to `work_dir`.
    pub base_root: PathBuf,
    /// Benchmark tree used under the profiler, relative to `work_dir`.
    pub profiled_root: PathBuf,
    /// Timed executions per (variant, mode).
    pub runs: usize,
    /// Removed from script filenames to form variant identifiers.
    pub script_extension: String,
    /// Directory the `<epoch>.json` report is written to.
    pub output_dir: PathBuf,
    pub seed: SeedConfig,
    pub benchmarks: Registry,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            interpreter: "./php".to_string(),
            profiler: "scalene.php".to_string(),
            cpu_only_flag: "--cpu-only".to_string(),
            work_dir: PathBuf::from(".."),
            base_root: PathBuf::from("benchmarks/benchmarksgame"),
            profiled_root: PathBuf::from("benchmarks/benchmarksgame-scalene"),
            runs: 5,
            script_extension: ".php".to_string(),
            output_dir: PathBuf::from("."),
            seed: SeedConfig::default(),
            benchmarks: registry::default_registry(),
        }
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub runs: Option<usize>,
    pub work_dir: Option<PathBuf>,
    pub interpreter: Option<String>,
    pub profiler: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub only: Vec<String>,
}

impl HarnessConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| HarnessError::Config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| HarnessError::Config(e.to_string()))
    }

    /// Explicit file if given, else `bench.toml` in the current directory, else defaults.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }
        let local = Path::new(DEFAULT_CONFIG_FILE);
        if local.is_file() {
            tracing::debug!(path = %local.display(), "loading config");
            return Self::load(local);
        }
        Ok(Self::default())
    }

    pub fn apply(&mut self, overrides: Overrides) -> Result<()> {
        if let Some(runs) = overrides.runs {
            self.runs = runs;
        }
        if let Some(dir) = overrides.work_dir {
            self.work_dir = dir;
        }
        if let Some(interpreter) = overrides.interpreter {
            self.interpreter = interpreter;
        }
        if let Some(profiler) = overrides.profiler {
            self.profiler = profiler;
        }
        if let Some(dir) = overrides.output_dir {
            self.output_dir = dir;
        }
        if !overrides.only.is_empty() {
            for name in &overrides.only {
                if !self.benchmarks.contains_key(name) {
                    return Err(HarnessError::Config(format!("unknown benchmark: {name}")));
                }
            }
            self.benchmarks.retain(|name, _| overrides.only.contains(name));
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<()> {
        if self.runs == 0 {
            return Err(HarnessError::Config("runs must be at least 1".to_string()));
        }
        let tokens = [
            ("interpreter", &self.interpreter),
            ("profiler", &self.profiler),
            ("cpu_only_flag", &self.cpu_only_flag),
            ("seed.program", &self.seed.program),
            ("seed.script", &self.seed.script),
        ];
        for (name, value) in tokens {
            if value.trim().is_empty() {
                return Err(HarnessError::Config(format!("{name} must not be empty")));
            }
        }
        if self.seed.args.iter().any(|a| a.trim().is_empty()) {
            return Err(HarnessError::Config(
                "seed.args contains an empty argument".to_string(),
            ));
        }
        for (program, bench) in &self.benchmarks {
            if bench.args.iter().any(|a| a.trim().is_empty()) {
                return Err(HarnessError::Config(format!(
                    "benchmarks.{program}.args contains an empty argument"
                )));
            }
        }
        Ok(())
    }

    pub fn target_root(&self, mode: ExecutionMode) -> &Path {
        if mode.is_profiled() {
            &self.profiled_root
        } else {
            &self.base_root
        }
    }

    /// Tokens inserted between the interpreter and the script path.
    pub fn profiler_fragment(&self, mode: ExecutionMode) -> Vec<String> {
        match mode {
            ExecutionMode::Base => Vec::new(),
            ExecutionMode::ProfileCpu => vec![self.profiler.clone(), self.cpu_only_flag.clone()],
            ExecutionMode::ProfileFull => vec![self.profiler.clone()],
        }
    }

    /// Directory whose files are the script variants of `program`.
    pub fn variant_dir(&self, program: &str) -> PathBuf {
        self.work_dir.join(&self.base_root).join(program)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::InputPolicy;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let cfg = HarnessConfig::default();
        assert_eq!(cfg.runs, 5);
        assert_eq!(cfg.benchmarks.len(), 10);
        assert_eq!(cfg.seed.program, "fasta");
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_mode_prefixes() {
        let cfg = HarnessConfig::default();
        assert!(cfg.profiler_fragment(ExecutionMode::Base).is_empty());
        assert_eq!(
            cfg.profiler_fragment(ExecutionMode::ProfileCpu),
            vec!["scalene.php", "--cpu-only"]
        );
        assert_eq!(
            cfg.profiler_fragment(ExecutionMode::ProfileFull),
            vec!["scalene.php"]
        );

        assert_eq!(
            cfg.target_root(ExecutionMode::Base),
            Path::new("benchmarks/benchmarksgame")
        );
        assert_eq!(
            cfg.target_root(ExecutionMode::ProfileCpu),
            Path::new("benchmarks/benchmarksgame-scalene")
        );
        assert_eq!(
            cfg.target_root(ExecutionMode::ProfileFull),
            cfg.target_root(ExecutionMode::ProfileCpu)
        );
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let cfg = HarnessConfig::from_toml(
            r#"
            runs = 3
            interpreter = "/usr/bin/php"

            [benchmarks.nbody]
            args = ["1000"]

            [benchmarks.revcomp]
            input = "seed"
            "#,
        )
        .unwrap();

        assert_eq!(cfg.runs, 3);
        assert_eq!(cfg.interpreter, "/usr/bin/php");
        assert_eq!(cfg.profiler, "scalene.php");
        assert_eq!(cfg.seed, SeedConfig::default());
        assert_eq!(cfg.benchmarks.len(), 2);
        assert_eq!(cfg.benchmarks["nbody"].input, InputPolicy::None);
        assert_eq!(cfg.benchmarks["revcomp"].input, InputPolicy::Seed);
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = HarnessConfig::from_toml("runs = \"many\"").unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn test_discover_explicit_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("custom.toml");
        fs::write(&path, "runs = 2\n").unwrap();

        let cfg = HarnessConfig::discover(Some(&path)).unwrap();
        assert_eq!(cfg.runs, 2);
    }

    #[test]
    fn test_overrides_and_filter() {
        let mut cfg = HarnessConfig::default();
        cfg.apply(Overrides {
            runs: Some(1),
            profiler: Some("prof.php".to_string()),
            only: vec!["nbody".to_string(), "revcomp".to_string()],
            ..Default::default()
        })
        .unwrap();

        assert_eq!(cfg.runs, 1);
        assert_eq!(cfg.profiler, "prof.php");
        let names: Vec<&str> = cfg.benchmarks.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["nbody", "revcomp"]);
    }

    #[test]
    fn test_unknown_filter_rejected() {
        let mut cfg = HarnessConfig::default();
        let err = cfg
            .apply(Overrides {
                only: vec!["nope".to_string()],
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }

    #[test]
    fn test_empty_tokens_rejected() {
        for content in [
            "profiler = \"\"",
            "cpu_only_flag = \" \"",
            "[seed]\nargs = [\"\"]",
            "[benchmarks.nbody]\nargs = [\"1000\", \"\"]",
        ] {
            let cfg = HarnessConfig::from_toml(content).unwrap();
            let err = cfg.validate().unwrap_err();
            assert!(matches!(err, HarnessError::Config(_)), "{content}");
        }
    }

    #[test]
    fn test_empty_profiler_override_rejected() {
        let mut cfg = HarnessConfig::default();
        let err = cfg
            .apply(Overrides {
                profiler: Some(String::new()),
                ..Default::default()
            })
            .unwrap_err();
        assert!(err.to_string().contains("profiler must not be empty"));
    }

    #[test]
    fn test_zero_runs_rejected() {
        let mut cfg = HarnessConfig::default();
        let err = cfg
            .apply(Overrides {
                runs: Some(0),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }
}
