//! Suite orchestration: variant discovery, the (variant, mode) loop, and
//! result accumulation.

use std::collections::BTreeMap;
use std::io;

use walkdir::WalkDir;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::harness::Bencher;
use crate::process::ProcessRunner;
use crate::registry::{self, InputPolicy};
use crate::schema::{ResultSet, RunSample};
use crate::seed::{SeedDataProvider, SeedPayload};
use crate::ExecutionMode;

/// One implementation file of a benchmark program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptVariant {
    pub program: String,
    /// Filename inside the program directory.
    pub script: String,
    /// Report key: the filename with the source extension removed.
    pub id: String,
}

/// A single (variant, mode) step of the suite, fully resolved.
#[derive(Clone, Debug)]
pub struct PlannedRun {
    pub variant: ScriptVariant,
    pub mode: ExecutionMode,
    pub label: String,
    pub args: Vec<String>,
    pub input: InputPolicy,
}

/// `fasta.php-3.php` -> `fasta-3` for extension `.php`.
pub fn variant_id(script: &str, extension: &str) -> String {
    if extension.is_empty() {
        script.to_string()
    } else {
        script.replace(extension, "")
    }
}

/// Regular files directly under the program's directory, sorted by name.
pub fn discover_variants(cfg: &HarnessConfig, program: &str) -> Result<Vec<ScriptVariant>> {
    let dir = cfg.variant_dir(program);
    if !dir.is_dir() {
        return Err(HarnessError::MissingBenchmarkDir { path: dir });
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(&dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let script = entry.file_name().to_string_lossy().into_owned();
        out.push(ScriptVariant {
            program: program.to_string(),
            id: variant_id(&script, &cfg.script_extension),
            script,
        });
    }
    Ok(out)
}

pub struct Orchestrator<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    cfg: &'a HarnessConfig,
}

impl<'a, R: ProcessRunner + ?Sized> Orchestrator<'a, R> {
    pub fn new(runner: &'a R, cfg: &'a HarnessConfig) -> Self {
        Self { runner, cfg }
    }

    /// Every step the suite will execute, in execution order.
    pub fn plan(&self) -> Result<Vec<PlannedRun>> {
        let mut plan = Vec::new();
        for (program, bench) in &self.cfg.benchmarks {
            for variant in discover_variants(self.cfg, program)? {
                for mode in ExecutionMode::ALL {
                    plan.push(PlannedRun {
                        label: mode.label(&variant.id),
                        variant: variant.clone(),
                        mode,
                        args: bench.args.clone(),
                        input: bench.input,
                    });
                }
            }
        }
        Ok(plan)
    }

    pub fn bencher(&self) -> Bencher<'a, R> {
        Bencher::new(self.runner, self.cfg)
    }

    /// Run the whole suite. The first failure aborts and discards everything
    /// measured so far.
    pub fn run(&self) -> Result<ResultSet> {
        let plan = self.plan()?;
        tracing::info!(
            programs = self.cfg.benchmarks.len(),
            steps = plan.len(),
            runs = self.cfg.runs,
            "starting suite"
        );

        let seed = if registry::needs_seed(self.cfg.benchmarks.values()) {
            Some(SeedDataProvider::new(self.runner, self.cfg).capture()?)
        } else {
            None
        };

        let bencher = self.bencher();
        let mut results = ResultSet::new();
        let mut owners: BTreeMap<String, String> = BTreeMap::new();

        for step in &plan {
            let sample = self.run_step(&bencher, step, seed.as_ref())?;

            let previous = owners.insert(step.variant.id.clone(), step.variant.program.clone());
            if let Some(prev) = previous {
                if prev != step.variant.program {
                    tracing::warn!(
                        variant = %step.variant.id,
                        previous = %prev,
                        program = %step.variant.program,
                        "variant identifier reused; earlier results are overwritten"
                    );
                }
            }
            results
                .entry(step.variant.id.clone())
                .or_default()
                .insert(step.mode, sample);
        }

        Ok(results)
    }

    fn run_step(
        &self,
        bencher: &Bencher<'a, R>,
        step: &PlannedRun,
        seed: Option<&SeedPayload>,
    ) -> Result<RunSample> {
        let stdin = match step.input {
            InputPolicy::None => None,
            InputPolicy::Seed => seed.map(SeedPayload::as_bytes),
        };
        bencher.run(
            &step.label,
            step.mode,
            &step.variant.program,
            &step.variant.script,
            &step.args,
            stdin,
        )
    }
}
