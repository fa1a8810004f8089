//! Runner collaborators: the seam to the external surrogate evaluations.
//!
//! [`ProcessRunner`] maps every request onto one invocation of an external runner program.
//! Each deferred worker is its own OS process, so a crash or abort in the evaluation never
//! reaches the harness. [`InProcessRunner`] wraps a closure and backs deferred workers with
//! OS threads; it is meant for embedding and tests.

use crate::errors::{DispatchError, RunnerError};
use crate::model::{RunRequest, RunnerCall};
use crate::worker::WorkerHandle;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use tracing::debug;

/// Environment variable naming the runner program.
pub const RUNNER_ENV: &str = "UQSWEEP_RUNNER";

/// Program looked up on `PATH` when nothing else names a runner.
pub const DEFAULT_RUNNER_PROGRAM: &str = "run_atan";

/// Invokes the surrogate evaluation for one request, either now or as a deferred worker.
pub trait Runner {
    /// Run synchronously and block until the evaluation returns.
    fn invoke(&self, request: &RunRequest) -> Result<(), RunnerError>;

    /// Bind a not-yet-started worker to `request`. Must not start any work.
    fn prepare(&self, request: RunRequest) -> Result<WorkerHandle, DispatchError>;
}

/// Runs each request as a child process of an external runner program.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    args: Vec<String>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// Leading arguments placed before the subcommand on every invocation.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Resolve the runner program: explicit value, then `UQSWEEP_RUNNER`, then the sweep
    /// file's `runner.program`, then `run_atan` on `PATH`.
    pub fn resolve_program(explicit: Option<&Path>, from_file: Option<&Path>) -> PathBuf {
        if let Some(p) = explicit {
            return p.to_path_buf();
        }
        if let Ok(bin) = std::env::var(RUNNER_ENV) {
            if !bin.trim().is_empty() {
                return PathBuf::from(bin);
            }
        }
        if let Some(p) = from_file {
            return p.to_path_buf();
        }
        PathBuf::from(DEFAULT_RUNNER_PROGRAM)
    }

    /// Full argument vector for one request (excluding the program itself).
    pub fn argv(&self, request: &RunRequest) -> Vec<String> {
        let mut argv = self.args.clone();
        let options = request.options();
        match request.call() {
            RunnerCall::SparseGrid {
                distribution,
                grid_type,
                max_grid_points,
                level,
                is_full,
                refinement,
                write_out,
            } => {
                argv.extend([
                    "sg".to_string(),
                    "--distribution".to_string(),
                    distribution.clone(),
                    "--grid-type".to_string(),
                    grid_type.clone(),
                    "--max-grid-points".to_string(),
                    max_grid_points.to_string(),
                    "--level".to_string(),
                    level.to_string(),
                    "--refinement".to_string(),
                    refinement.label().to_string(),
                ]);
                push_flag(&mut argv, "--full", *is_full);
                push_flag(&mut argv, "--reduced", options.reduced);
                push_flag(&mut argv, "--out", *write_out);
            }
            RunnerCall::PolynomialChaos {
                distribution,
                sampler,
                expansion,
                max_num_samples,
                write_out,
            } => {
                argv.extend([
                    "pce".to_string(),
                    "--distribution".to_string(),
                    distribution.clone(),
                    "--sampler".to_string(),
                    sampler.clone(),
                    "--expansion".to_string(),
                    expansion.clone(),
                    "--max-num-samples".to_string(),
                    max_num_samples.to_string(),
                ]);
                push_flag(&mut argv, "--out", *write_out);
            }
        }
        push_flag(&mut argv, "--plot", options.plot);
        argv
    }

    pub fn command(&self, request: &RunRequest) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.argv(request));
        cmd
    }
}

fn push_flag(argv: &mut Vec<String>, flag: &str, on: bool) {
    if on {
        argv.push(flag.to_string());
    }
}

impl Runner for ProcessRunner {
    fn invoke(&self, request: &RunRequest) -> Result<(), RunnerError> {
        let mut cmd = self.command(request);
        debug!(program = %self.program.display(), index = request.index(), "invoking runner");
        let status = cmd.status().map_err(|source| RunnerError::Launch {
            program: self.program.display().to_string(),
            source,
        })?;
        if status.success() {
            Ok(())
        } else {
            Err(RunnerError::ExitStatus {
                code: status.code(),
            })
        }
    }

    fn prepare(&self, request: RunRequest) -> Result<WorkerHandle, DispatchError> {
        let cmd = self.command(&request);
        Ok(WorkerHandle::process(request, cmd))
    }
}

type RunFn = dyn Fn(&RunRequest) -> Result<(), RunnerError> + Send + Sync;

/// Runs requests through a closure; deferred workers run it on their own thread.
///
/// Each worker thread owns its request and a shared handle to the closure, nothing else.
#[derive(Clone)]
pub struct InProcessRunner {
    run: Arc<RunFn>,
}

impl InProcessRunner {
    pub fn new<F>(run: F) -> Self
    where
        F: Fn(&RunRequest) -> Result<(), RunnerError> + Send + Sync + 'static,
    {
        Self { run: Arc::new(run) }
    }
}

impl std::fmt::Debug for InProcessRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessRunner").finish_non_exhaustive()
    }
}

impl Runner for InProcessRunner {
    fn invoke(&self, request: &RunRequest) -> Result<(), RunnerError> {
        (self.run)(request)
    }

    fn prepare(&self, request: RunRequest) -> Result<WorkerHandle, DispatchError> {
        let run = Arc::clone(&self.run);
        Ok(WorkerHandle::thread(request, move |req| run(req)))
    }
}
