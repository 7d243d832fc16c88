//! Seed payload acquisition.
//!
//! Benchmarks that consume a large text corpus (knucleotide, regexredux,
//! revcomp) read the output of one baseline `fasta` run on standard input.
//! The run happens once per harness execution and the captured bytes are
//! shared read-only by every consumer.

use sha2::{Digest, Sha256};

use crate::config::HarnessConfig;
use crate::error::{HarnessError, Result};
use crate::harness::build_argv;
use crate::process::ProcessRunner;
use crate::ExecutionMode;

/// Captured standard output of the seed benchmark.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeedPayload {
    bytes: Vec<u8>,
}

impl SeedPayload {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Lowercase hex SHA-256 of the payload.
    pub fn digest_hex(&self) -> String {
        hex32(Sha256::digest(&self.bytes).into())
    }
}

fn hex32(d: [u8; 32]) -> String {
    let mut s = String::with_capacity(64);
    for b in d {
        s.push_str(&format!("{:02x}", b));
    }
    s
}

pub struct SeedDataProvider<'a, R: ProcessRunner + ?Sized> {
    runner: &'a R,
    cfg: &'a HarnessConfig,
}

impl<'a, R: ProcessRunner + ?Sized> SeedDataProvider<'a, R> {
    pub fn new(runner: &'a R, cfg: &'a HarnessConfig) -> Self {
        Self { runner, cfg }
    }

    pub fn label(&self) -> String {
        format!("seed-{}", self.cfg.seed.program)
    }

    pub fn argv(&self) -> Vec<String> {
        let seed = &self.cfg.seed;
        build_argv(
            self.cfg,
            ExecutionMode::Base,
            &self.cfg.base_root,
            &seed.program,
            &seed.script,
            &seed.args,
        )
    }

    /// Run the seed benchmark once in baseline mode and keep its stdout.
    pub fn capture(&self) -> Result<SeedPayload> {
        let label = self.label();
        let argv = self.argv();
        tracing::debug!(label = %label, argv = ?argv, "capturing seed payload");

        let output = self.runner.run(&argv, None, &self.cfg.work_dir)?;
        if !output.success() {
            return Err(HarnessError::SeedFailed { label, output });
        }

        let payload = SeedPayload::new(output.stdout);
        tracing::info!(
            label = %label,
            bytes = payload.len(),
            sha256 = %payload.digest_hex(),
            "seed payload captured"
        );
        Ok(payload)
    }
}
