//! Error taxonomy for the sweep harness.
//!
//! - [`ConfigurationError`]: a scenario table or flag combination that cannot be enumerated.
//! - [`DispatchError`]: a deferred worker could not be constructed or started.
//! - [`RunnerError`]: a runner collaborator failed during synchronous invocation.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown parameter '{name}' for {kind} scenarios")]
    UnknownParameter { kind: String, name: String },

    #[error("missing parameter '{name}' for {kind} scenarios (distribution '{distribution}')")]
    MissingParameter {
        kind: String,
        distribution: String,
        name: String,
    },

    #[error("parameter '{name}' declared more than once")]
    DuplicateParameter { name: String },

    #[error("parameter '{name}' has no candidate values")]
    EmptyCandidates { name: String },

    #[error("budget list '{name}' is empty")]
    EmptyBudget { name: String },

    #[error("budget list '{name}' contains non-positive value {value}")]
    NonPositiveBudget { name: String, value: u64 },

    #[error("parameter '{name}' expects {expected}, got {found}")]
    InvalidValue {
        name: String,
        expected: &'static str,
        found: String,
    },

    #[error("invalid sweep file: {0}")]
    Parse(String),
}

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to spawn worker process for request #{index} ({program}): {source}")]
    Spawn {
        index: usize,
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to start worker thread for request #{index}: {source}")]
    Thread {
        index: usize,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("failed to launch runner '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("runner exited with {}", exit_label(.code))]
    ExitStatus { code: Option<i32> },

    #[error("runner failed: {0}")]
    Failed(String),
}

fn exit_label(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("status {}", c),
        None => "no status (terminated by signal)".to_string(),
    }
}

#[derive(Debug, Error)]
pub enum SweepError {
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error("dispatch failed: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("request #{index} {label} failed: {source}")]
    Runner {
        index: usize,
        label: String,
        #[source]
        source: RunnerError,
    },
}
