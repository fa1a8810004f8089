//! Scenario enumeration and dispatch for surrogate-model benchmark sweeps.
//!
//! A sweep walks the Cartesian product of each surrogate kind's parameter tables, resolves
//! the budgets of every scenario and hands one [`RunRequest`] per (scenario, budget) pair to
//! a [`Runner`], either synchronously or as deferred workers started in one batch.

pub mod budget;
pub mod config;
pub mod dispatch;
pub mod errors;
pub mod model;
pub mod report;
pub mod runner;
pub mod space;
pub mod sweep;
pub mod worker;

pub use budget::{budgets_for, BudgetList};
pub use config::{RunnerSection, SweepConfig};
pub use dispatch::{Dispatched, Dispatcher, ExecutionMode};
pub use errors::{ConfigurationError, DispatchError, RunnerError, SweepError};
pub use model::{
    ParamValue, RefinementSetting, RunOptions, RunRequest, RunnerCall, Scenario, SurrogateKind,
};
pub use report::{DispatchStatus, SweepReport, SweepSummary};
pub use runner::{InProcessRunner, ProcessRunner, Runner};
pub use space::{ConfigSpace, ParameterSchema, SchemaBuilder};
pub use sweep::{run_sweep, SweepOutcome, SweepSettings};
pub use worker::{DeferredWorkerPool, StartedWorker, WorkerHandle};
