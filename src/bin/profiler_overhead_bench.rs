use clap::{Parser, Subcommand};
use profiler_overhead_bench::config::{HarnessConfig, Overrides};
use profiler_overhead_bench::error::{HarnessError, Result};
use profiler_overhead_bench::harness::display_argv;
use profiler_overhead_bench::process::SystemRunner;
use profiler_overhead_bench::schema;
use profiler_overhead_bench::seed::SeedDataProvider;
use profiler_overhead_bench::suite::Orchestrator;
use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Subcommand, Debug, Clone)]
enum Command {
    /// Time every (variant, mode) pair and write `<unix-epoch>.json`.
    Run,

    /// Print the planned runs and their exact command lines without executing them.
    List,

    /// Capture only the seed payload (baseline fasta output).
    Seed {
        /// Write the payload here instead of stdout.
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

#[derive(Parser, Debug)]
#[command(name = "profiler-overhead-bench")]
#[command(about = "Profiler overhead benchmark runner (JSON output)")]
struct Args {
    /// TOML configuration file. Defaults to ./bench.toml when present.
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Timed executions per (variant, mode).
    #[arg(long, global = true)]
    runs: Option<usize>,

    /// Working directory for the interpreter (default: ..).
    #[arg(long, value_name = "DIR", global = true)]
    work_dir: Option<PathBuf>,

    #[arg(long, global = true)]
    interpreter: Option<String>,

    #[arg(long, global = true)]
    profiler: Option<String>,

    /// Where to write the JSON report (default: current directory).
    #[arg(long, value_name = "DIR", global = true)]
    out_dir: Option<PathBuf>,

    /// Restrict the suite to these programs. Can be provided multiple times.
    #[arg(long, value_name = "PROGRAM", action = clap::ArgAction::Append, global = true)]
    only: Vec<String>,

    /// Debug-level logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Option<Command>,
}

fn init_logging(verbose: bool) {
    let default = if verbose {
        "profiler_overhead_bench=debug"
    } else {
        "profiler_overhead_bench=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(io::stderr().is_terminal())
        .init();
}

fn load_config(args: &Args) -> Result<HarnessConfig> {
    let mut cfg = HarnessConfig::discover(args.config.as_deref())?;
    cfg.apply(Overrides {
        runs: args.runs,
        work_dir: args.work_dir.clone(),
        interpreter: args.interpreter.clone(),
        profiler: args.profiler.clone(),
        output_dir: args.out_dir.clone(),
        only: args.only.clone(),
    })?;
    Ok(cfg)
}

fn run(args: Args) -> Result<()> {
    let cfg = load_config(&args)?;
    let runner = SystemRunner;

    match args.cmd.unwrap_or(Command::Run) {
        Command::Run => {
            let results = Orchestrator::new(&runner, &cfg).run()?;
            let path = schema::write_report(&results, &cfg.output_dir, schema::unix_timestamp())?;
            tracing::info!(path = %path.display(), variants = results.len(), "report written");
        }
        Command::List => {
            let orchestrator = Orchestrator::new(&runner, &cfg);
            let bencher = orchestrator.bencher();
            let mut stdout = io::stdout().lock();
            for step in orchestrator.plan()? {
                let argv = bencher.argv(
                    step.mode,
                    &step.variant.program,
                    &step.variant.script,
                    &step.args,
                );
                writeln!(stdout, "{}\t{}", step.label, display_argv(&argv))?;
            }
        }
        Command::Seed { out } => {
            let payload = SeedDataProvider::new(&runner, &cfg).capture()?;
            match out {
                Some(path) => fs::write(path, payload.as_bytes())?,
                None => io::stdout().lock().write_all(payload.as_bytes())?,
            }
        }
    }

    Ok(())
}

fn report_failure(err: &HarnessError) {
    eprintln!("{err}");
    if let Some((_, output)) = err.process_output() {
        eprintln!("stdout:");
        eprintln!("{}", output.stdout_lossy());
        eprintln!("stderr:");
        eprintln!("{}", output.stderr_lossy());
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_failure(&err);
            ExitCode::FAILURE
        }
    }
}
