use crate::errors::{DispatchError, SweepError};
use crate::model::RunRequest;
use crate::runner::Runner;
use crate::worker::{DeferredWorkerPool, StartedWorker};
use serde::{Deserialize, Serialize};
use tracing::info;

/// How a sweep executes its requests. Chosen once per sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Invoke each runner in turn; the first failure aborts the sweep.
    #[default]
    Synchronous,
    /// Build one deferred worker per request, start them all after enumeration.
    Parallel,
    /// Enumerate and log requests without invoking or spawning anything.
    DryRun,
}

/// What the dispatcher did with one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatched {
    Completed,
    Queued,
    Planned,
}

/// Routes each request to its runner according to the sweep's [`ExecutionMode`].
pub struct Dispatcher<'r, R: Runner + ?Sized> {
    runner: &'r R,
    mode: ExecutionMode,
    pool: DeferredWorkerPool,
}

impl<'r, R: Runner + ?Sized> Dispatcher<'r, R> {
    pub fn new(runner: &'r R, mode: ExecutionMode) -> Self {
        Self {
            runner,
            mode,
            pool: DeferredWorkerPool::new(),
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    /// Requests waiting for the start phase.
    pub fn pending(&self) -> usize {
        self.pool.len()
    }

    pub fn dispatch(&mut self, request: RunRequest) -> Result<Dispatched, SweepError> {
        info!("{}", "-".repeat(80));
        info!(
            index = request.index(),
            kind = %request.kind(),
            "scenario: {}",
            request.label()
        );

        match self.mode {
            ExecutionMode::Synchronous => {
                self.runner
                    .invoke(&request)
                    .map_err(|source| SweepError::Runner {
                        index: request.index(),
                        label: request.label(),
                        source,
                    })?;
                Ok(Dispatched::Completed)
            }
            ExecutionMode::Parallel => {
                let handle = self.runner.prepare(request)?;
                self.pool.push(handle);
                Ok(Dispatched::Queued)
            }
            ExecutionMode::DryRun => Ok(Dispatched::Planned),
        }
    }

    /// End of enumeration: start every queued worker in construction order.
    pub fn finish(self) -> Vec<Result<StartedWorker, DispatchError>> {
        if self.pool.is_empty() {
            return Vec::new();
        }
        self.pool.start_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::RunnerError;
    use crate::model::{axis, RunOptions, Scenario, SurrogateKind};
    use crate::runner::InProcessRunner;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn request(index: usize) -> RunRequest {
        let scenario = Scenario {
            kind: SurrogateKind::PolynomialChaosExpansion,
            distribution: "normal".into(),
            params: vec![
                (axis::SAMPLER.into(), "gauss".into()),
                (axis::EXPANSION.into(), "full_tensor".into()),
            ],
        };
        RunRequest::new(index, scenario, 3000, RunOptions::default()).unwrap()
    }

    fn counting_runner() -> (InProcessRunner, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let runner = InProcessRunner::new(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        (runner, calls)
    }

    #[test]
    fn synchronous_dispatch_invokes_immediately() {
        let (runner, calls) = counting_runner();
        let mut dispatcher = Dispatcher::new(&runner, ExecutionMode::Synchronous);
        assert_eq!(dispatcher.dispatch(request(0)).unwrap(), Dispatched::Completed);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(dispatcher.finish().is_empty());
    }

    #[test]
    fn parallel_dispatch_defers_until_finish() {
        let (runner, calls) = counting_runner();
        let mut dispatcher = Dispatcher::new(&runner, ExecutionMode::Parallel);
        for i in 0..3 {
            assert_eq!(dispatcher.dispatch(request(i)).unwrap(), Dispatched::Queued);
        }
        assert_eq!(dispatcher.pending(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        for started in dispatcher.finish() {
            started.unwrap().wait().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn dry_run_touches_nothing() {
        let (runner, calls) = counting_runner();
        let mut dispatcher = Dispatcher::new(&runner, ExecutionMode::DryRun);
        assert_eq!(dispatcher.dispatch(request(0)).unwrap(), Dispatched::Planned);
        assert!(dispatcher.finish().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn synchronous_failure_carries_request_identity() {
        let runner = InProcessRunner::new(|_| Err(RunnerError::Failed("diverged".into())));
        let mut dispatcher = Dispatcher::new(&runner, ExecutionMode::Synchronous);
        let err = dispatcher.dispatch(request(5)).unwrap_err();
        match err {
            SweepError::Runner { index, label, .. } => {
                assert_eq!(index, 5);
                assert_eq!(label, "(normal, gauss, full_tensor, 3000)");
            }
            other => panic!("expected runner error, got {other:?}"),
        }
    }
}
