use std::path::Path;
use std::time::Instant;

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::process::ProcessRunner;
use crate::schema::RunSample;
use crate::ExecutionMode;

/// Build the argument vector for one timed invocation:
/// `interpreter [profiler tokens] <target_root>/<program>/<script> [args]`.
pub fn build_argv(
    cfg: &HarnessConfig,
    mode: ExecutionMode,
    target_root: &Path,
    program: &str,
    script: &str,
    args: &[String],
) -> Vec<String> {
    let script_path = target_root.join(program).join(script);

    let mut argv = Vec::with_capacity(3 + args.len());
    argv.push(cfg.interpreter.clone());
    argv.extend(cfg.profiler_fragment(mode));
    argv.push(script_path.to_string_lossy().into_owned());
    argv.extend(args.iter().cloned());
    argv
}

/// Render an argument vector with every token quoted, so tokens containing
/// whitespace stay distinguishable.
pub fn display_argv(argv: &[String]) -> String {
    argv.iter()
        .map(|token| format!("{token:?}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute `argv` `runs` times and collect wall-clock seconds per run.
///
/// The first non-zero exit aborts with [`HarnessError::BenchmarkFailed`]; no
/// partial sample is returned.
pub fn measure_process<R: ProcessRunner + ?Sized>(
    runner: &R,
    label: &str,
    argv: &[String],
    stdin: Option<&[u8]>,
    work_dir: &Path,
    runs: usize,
) -> Result<RunSample> {
    let mut times = Vec::with_capacity(runs);

    for i in 0..runs {
        let start = Instant::now();
        let output = runner.run(argv, stdin, work_dir)?;
        let elapsed = start.elapsed().as_secs_f64();

        if !output.success() {
            return Err(HarnessError::BenchmarkFailed {
                label: label.to_string(),
                output,
            });
        }

        tracing::debug!(label, run = i + 1, elapsed_s = elapsed, "run finished");
        times.push(elapsed);
    }

    tracing::info!(label, "{label} DONE");
    Ok(RunSample { times })
}

/// Times one (program, script, mode) combination under a fixed configuration.
pub struct Bencher<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    cfg: &'a HarnessConfig,
}

impl<'a, R: ProcessRunner + ?Sized> Bencher<'a, R> {
    pub fn new(runner: &'a R, cfg: &'a HarnessConfig) -> Self {
        Self { runner, cfg }
    }

    pub fn argv(
        &self,
        mode: ExecutionMode,
        program: &str,
        script: &str,
        args: &[String],
    ) -> Vec<String> {
        build_argv(self.cfg, mode, self.cfg.target_root(mode), program, script, args)
    }

    pub fn run(
        &self,
        label: &str,
        mode: ExecutionMode,
        program: &str,
        script: &str,
        args: &[String],
        stdin: Option<&[u8]>,
    ) -> Result<RunSample> {
        let argv = self.argv(mode, program, script, args);
        tracing::debug!(label, argv = ?argv, "benchmarking");
        measure_process(
            self.runner,
            label,
            &argv,
            stdin,
            &self.cfg.work_dir,
            self.cfg.runs,
        )
    }
}
