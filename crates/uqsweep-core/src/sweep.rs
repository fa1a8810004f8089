use crate::budget::budgets_for;
use crate::config::SweepConfig;
use crate::dispatch::{Dispatcher, ExecutionMode};
use crate::errors::SweepError;
use crate::model::{RunOptions, RunRequest, SurrogateKind};
use crate::report::{DispatchEntry, SweepReport};
use crate::runner::Runner;
use crate::worker::StartedWorker;
use tracing::{debug, info};

/// Sweep-wide settings chosen on the command line.
#[derive(Debug, Clone)]
pub struct SweepSettings {
    /// Kinds to enumerate, in order. Each kind's space is enumerated on its own.
    pub surrogates: Vec<SurrogateKind>,
    pub mode: ExecutionMode,
    pub options: RunOptions,
}

/// Result of a completed enumeration.
#[derive(Debug)]
pub struct SweepOutcome {
    pub report: SweepReport,
    /// Workers started in parallel mode, in construction order. Dropping them detaches.
    pub workers: Vec<StartedWorker>,
}

/// Enumerate every requested scenario space and dispatch one request per
/// (scenario, budget) pair.
///
/// Synchronous mode stops at the first runner failure. Parallel mode starts workers only
/// after the last request of the last kind has been enumerated.
pub fn run_sweep<R: Runner + ?Sized>(
    config: &SweepConfig,
    settings: &SweepSettings,
    runner: &R,
) -> Result<SweepOutcome, SweepError> {
    let mut report = SweepReport::new(settings.mode, &settings.surrogates, settings.options);
    let mut dispatcher = Dispatcher::new(runner, settings.mode);
    let mut index = 0usize;

    for &kind in &settings.surrogates {
        let space = config.space(kind);
        if space.is_empty() {
            debug!(%kind, "no scenario tables declared, skipping");
            continue;
        }
        info!(%kind, scenarios = space.scenario_count(), "enumerating scenario space");

        for (scenario, budgets) in space.scenarios() {
            for budget in budgets_for(&scenario, budgets)? {
                let request = RunRequest::new(index, scenario.clone(), budget, settings.options)?;
                index += 1;
                let entry = DispatchEntry::pending(&request);
                let dispatched = dispatcher.dispatch(request)?;
                report.add_dispatch(entry, dispatched);
            }
        }
    }

    info!(requests = index, mode = ?settings.mode, "enumeration complete");

    let mut workers = Vec::new();
    for outcome in dispatcher.finish() {
        report.record_start(&outcome);
        if let Ok(worker) = outcome {
            workers.push(worker);
        }
    }

    Ok(SweepOutcome { report, workers })
}
