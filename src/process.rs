//! Synchronous external process invocation.
//!
//! Every call spawns exactly one OS process, pipes the optional input payload
//! into its standard input, and blocks until it exits. There is no timeout: a
//! child that never terminates hangs the caller.

use std::borrow::Cow;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use crate::error::{HarnessError, Result};

/// Exit status and captured streams of one finished process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// `None` when the process was terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    pub fn display_code(&self) -> String {
        match self.code {
            Some(code) => code.to_string(),
            None => "signal".to_string(),
        }
    }

    pub fn stdout_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stdout)
    }

    pub fn stderr_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.stderr)
    }
}

/// Seam between the harness and the operating system.
pub trait ProcessRunner {
    /// Run `argv[0]` with the remaining tokens as arguments, inside `work_dir`.
    fn run(&self, argv: &[String], stdin: Option<&[u8]>, work_dir: &Path)
        -> Result<ProcessOutput>;
}

/// [`ProcessRunner`] backed by `std::process::Command`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        argv: &[String],
        stdin: Option<&[u8]>,
        work_dir: &Path,
    ) -> Result<ProcessOutput> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| HarnessError::Config("empty argument vector".to_string()))?;

        let mut child = Command::new(program)
            .args(args)
            .current_dir(work_dir)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| HarnessError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Feed stdin from a scoped writer so a child filling its stdout pipe
        // before draining stdin cannot deadlock us.
        let output = thread::scope(|s| -> io::Result<std::process::Output> {
            let writer = match (child.stdin.take(), stdin) {
                (Some(mut pipe), Some(payload)) => Some(s.spawn(move || {
                    match pipe.write_all(payload) {
                        // The child may legitimately exit without reading its input.
                        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
                        other => other,
                    }
                })),
                _ => None,
            };

            let output = child.wait_with_output()?;
            if let Some(handle) = writer {
                handle
                    .join()
                    .map_err(|_| io::Error::other("stdin writer panicked"))??;
            }
            Ok(output)
        })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sh(script: &str) -> Vec<String> {
        vec!["/bin/sh".to_string(), "-c".to_string(), script.to_string()]
    }

    #[test]
    fn test_captures_streams_and_code() {
        let dir = tempdir().unwrap();
        let out = SystemRunner
            .run(&sh("echo out; echo err >&2; exit 3"), None, dir.path())
            .unwrap();

        assert_eq!(out.code, Some(3));
        assert!(!out.success());
        assert_eq!(out.stdout_lossy(), "out\n");
        assert_eq!(out.stderr_lossy(), "err\n");
    }

    #[test]
    fn test_pipes_large_stdin() {
        let dir = tempdir().unwrap();
        let payload = vec![b'x'; 1 << 20];
        let out = SystemRunner
            .run(&sh("cat"), Some(&payload), dir.path())
            .unwrap();

        assert!(out.success());
        assert_eq!(out.stdout, payload);
    }

    #[test]
    fn test_child_ignoring_stdin_is_not_an_error() {
        let dir = tempdir().unwrap();
        let payload = vec![b'y'; 1 << 20];
        let out = SystemRunner
            .run(&sh("exit 0"), Some(&payload), dir.path())
            .unwrap();
        assert!(out.success());
    }

    #[test]
    fn test_runs_in_work_dir() {
        let dir = tempdir().unwrap();
        let out = SystemRunner.run(&sh("pwd"), None, dir.path()).unwrap();
        let reported = std::path::PathBuf::from(out.stdout_lossy().trim());
        assert_eq!(
            reported.canonicalize().unwrap(),
            dir.path().canonicalize().unwrap()
        );
    }

    #[test]
    fn test_missing_program_is_spawn_error() {
        let dir = tempdir().unwrap();
        let argv = vec!["/definitely/not/here".to_string()];
        let err = SystemRunner.run(&argv, None, dir.path()).unwrap_err();
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[test]
    fn test_empty_argv_is_rejected() {
        let dir = tempdir().unwrap();
        let err = SystemRunner.run(&[], None, dir.path()).unwrap_err();
        assert!(matches!(err, HarnessError::Config(_)));
    }
}
