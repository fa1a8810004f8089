//! Deferred workers and the pool that starts them.
//!
//! A [`WorkerHandle`] is built during enumeration and does nothing until started. The
//! [`DeferredWorkerPool`] owns every pending handle; the only way to start one is
//! [`DeferredWorkerPool::start_all`], which consumes the pool, so no worker can begin while
//! enumeration is still pushing handles.

use crate::errors::{DispatchError, RunnerError};
use crate::model::RunRequest;
use std::process::{Child, Command};
use std::thread::JoinHandle;
use tracing::{debug, error, info};

type Task = Box<dyn FnOnce(&RunRequest) -> Result<(), RunnerError> + Send + 'static>;

enum Launch {
    Process(Command),
    Thread(Task),
}

/// A unit of work bound to exactly one [`RunRequest`], not yet running.
pub struct WorkerHandle {
    request: RunRequest,
    launch: Launch,
}

impl WorkerHandle {
    /// Worker that spawns `command` as a detached child process.
    pub fn process(request: RunRequest, command: Command) -> Self {
        Self {
            request,
            launch: Launch::Process(command),
        }
    }

    /// Worker that runs `task` on a dedicated thread. The thread owns the request.
    pub fn thread<F>(request: RunRequest, task: F) -> Self
    where
        F: FnOnce(&RunRequest) -> Result<(), RunnerError> + Send + 'static,
    {
        Self {
            request,
            launch: Launch::Thread(Box::new(task)),
        }
    }

    pub fn request(&self) -> &RunRequest {
        &self.request
    }

    /// Start the worker and return without waiting for it.
    pub fn start(self) -> Result<StartedWorker, DispatchError> {
        let index = self.request.index();
        match self.launch {
            Launch::Process(mut command) => {
                let child = command.spawn().map_err(|source| DispatchError::Spawn {
                    index,
                    program: command.get_program().to_string_lossy().into_owned(),
                    source,
                })?;
                debug!(index, pid = child.id(), "worker process started");
                Ok(StartedWorker::Process { index, child })
            }
            Launch::Thread(task) => {
                let request = self.request;
                let handle = std::thread::Builder::new()
                    .name(format!("uqsweep-worker-{}", index))
                    .spawn(move || {
                        let result = task(&request);
                        if let Err(e) = &result {
                            error!(index, label = %request.label(), "worker failed: {}", e);
                        }
                        result
                    })
                    .map_err(|source| DispatchError::Thread { index, source })?;
                debug!(index, "worker thread started");
                Ok(StartedWorker::Thread { index, handle })
            }
        }
    }
}

impl std::fmt::Debug for WorkerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let launch = match &self.launch {
            Launch::Process(cmd) => format!("process({:?})", cmd.get_program()),
            Launch::Thread(_) => "thread".to_string(),
        };
        f.debug_struct("WorkerHandle")
            .field("index", &self.request.index())
            .field("label", &self.request.label())
            .field("launch", &launch)
            .finish()
    }
}

/// A worker that has been started. The harness never waits on it; callers may.
#[derive(Debug)]
pub enum StartedWorker {
    Process { index: usize, child: Child },
    Thread {
        index: usize,
        handle: JoinHandle<Result<(), RunnerError>>,
    },
}

impl StartedWorker {
    pub fn index(&self) -> usize {
        match self {
            StartedWorker::Process { index, .. } | StartedWorker::Thread { index, .. } => *index,
        }
    }

    /// OS process id for process workers.
    pub fn pid(&self) -> Option<u32> {
        match self {
            StartedWorker::Process { child, .. } => Some(child.id()),
            StartedWorker::Thread { .. } => None,
        }
    }

    /// Block until the worker finishes.
    pub fn wait(self) -> Result<(), RunnerError> {
        match self {
            StartedWorker::Process { mut child, .. } => {
                let status = child
                    .wait()
                    .map_err(|e| RunnerError::Failed(format!("waiting for worker: {}", e)))?;
                if status.success() {
                    Ok(())
                } else {
                    Err(RunnerError::ExitStatus {
                        code: status.code(),
                    })
                }
            }
            StartedWorker::Thread { handle, .. } => handle
                .join()
                .unwrap_or_else(|_| Err(RunnerError::Failed("worker thread panicked".into()))),
        }
    }
}

/// Ordered list of constructed-but-not-started workers. No size bound.
#[derive(Debug, Default)]
pub struct DeferredWorkerPool {
    pending: Vec<WorkerHandle>,
}

impl DeferredWorkerPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, handle: WorkerHandle) {
        self.pending.push(handle);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &RunRequest> {
        self.pending.iter().map(WorkerHandle::request)
    }

    /// Start every pending worker in construction order.
    ///
    /// A worker that fails to start is logged and reported in its slot; it is not retried
    /// and the remaining workers still start. Already-started workers are left running.
    pub fn start_all(self) -> Vec<Result<StartedWorker, DispatchError>> {
        let total = self.pending.len();
        info!(workers = total, "starting deferred workers");
        let outcomes: Vec<_> = self
            .pending
            .into_iter()
            .map(|handle| {
                let outcome = handle.start();
                if let Err(e) = &outcome {
                    error!("{}", e);
                }
                outcome
            })
            .collect();
        let failed = outcomes.iter().filter(|o| o.is_err()).count();
        info!(started = total - failed, failed, "deferred workers dispatched");
        outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{axis, RunOptions, Scenario, SurrogateKind};
    use std::sync::mpsc;

    fn request(index: usize) -> RunRequest {
        let scenario = Scenario {
            kind: SurrogateKind::PolynomialChaosExpansion,
            distribution: "uniform".into(),
            params: vec![
                (axis::SAMPLER.into(), "leja".into()),
                (axis::EXPANSION.into(), "total_degree".into()),
            ],
        };
        RunRequest::new(index, scenario, 100, RunOptions::default()).unwrap()
    }

    #[test]
    fn handles_do_not_run_until_started() {
        let (tx, rx) = mpsc::channel();
        let mut pool = DeferredWorkerPool::new();
        for i in 0..3 {
            let tx = tx.clone();
            pool.push(WorkerHandle::thread(request(i), move |req| {
                tx.send(req.index()).unwrap();
                Ok(())
            }));
        }
        drop(tx);
        assert_eq!(pool.len(), 3);
        assert!(rx.try_recv().is_err(), "no worker may run before start_all");

        let started = pool.start_all();
        assert_eq!(
            started.iter().map(|s| s.as_ref().unwrap().index()).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        for worker in started {
            worker.unwrap().wait().unwrap();
        }
        let mut seen: Vec<_> = rx.iter().collect();
        seen.sort_unstable();
        assert_eq!(seen, vec![0, 1, 2]);
    }

    #[test]
    fn failed_start_does_not_skip_later_workers() {
        let mut pool = DeferredWorkerPool::new();
        pool.push(WorkerHandle::process(
            request(0),
            Command::new("/nonexistent/uqsweep-worker-for-tests"),
        ));
        pool.push(WorkerHandle::thread(request(1), |_| Ok(())));

        let outcomes = pool.start_all();
        assert_eq!(outcomes.len(), 2);
        assert!(matches!(
            outcomes[0],
            Err(DispatchError::Spawn { index: 0, .. })
        ));
        let second = outcomes.into_iter().nth(1).unwrap().unwrap();
        assert_eq!(second.index(), 1);
        second.wait().unwrap();
    }

    #[test]
    fn thread_worker_reports_runner_failure_on_wait() {
        let handle = WorkerHandle::thread(request(7), |_| {
            Err(RunnerError::Failed("boom".into()))
        });
        let started = handle.start().unwrap();
        assert_eq!(started.pid(), None);
        assert!(matches!(started.wait(), Err(RunnerError::Failed(_))));
    }

    #[cfg(unix)]
    #[test]
    fn process_worker_exposes_pid() {
        let handle = WorkerHandle::process(request(2), Command::new("true"));
        let started = handle.start().unwrap();
        assert!(started.pid().is_some());
        started.wait().unwrap();
    }
}
