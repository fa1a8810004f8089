use crate::dispatch::{Dispatched, ExecutionMode};
use crate::errors::DispatchError;
use crate::model::{ParamValue, RunOptions, RunRequest, SurrogateKind};
use crate::worker::StartedWorker;
use serde::Serialize;

pub const SCHEMA_VERSION: &str = "uqsweep-dispatch-v1";

/// Manifest of what a sweep dispatched. Runner results are never collected here.
#[derive(Debug, Serialize, Clone)]
pub struct SweepReport {
    pub schema_version: String,
    pub generated_at: String,
    pub mode: ExecutionMode,
    pub surrogates: Vec<SurrogateKind>,
    pub options: RunOptions,
    pub summary: SweepSummary,
    pub entries: Vec<DispatchEntry>,
}

#[derive(Debug, Serialize, Clone, Default, PartialEq, Eq)]
pub struct SweepSummary {
    pub total: usize,
    pub completed: usize,
    pub planned: usize,
    pub queued: usize,
    pub started: usize,
    pub start_failed: usize,
}

#[derive(Debug, Serialize, Clone)]
pub struct DispatchEntry {
    pub index: usize,
    pub kind: SurrogateKind,
    pub distribution: String,
    pub params: Vec<ParamEntry>,
    pub budget: u64,
    pub status: DispatchStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct ParamEntry {
    pub name: String,
    pub value: ParamValue,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DispatchStatus {
    Completed, // sync runner returned
    Planned,   // dry run
    Queued,    // worker built, start phase pending
    Started,
    StartFailed,
}

impl DispatchEntry {
    pub fn pending(request: &RunRequest) -> Self {
        Self {
            index: request.index(),
            kind: request.kind(),
            distribution: request.distribution().to_string(),
            params: request
                .scenario()
                .params
                .iter()
                .map(|(name, value)| ParamEntry {
                    name: name.clone(),
                    value: value.clone(),
                })
                .collect(),
            budget: request.budget(),
            status: DispatchStatus::Queued,
            pid: None,
            message: None,
        }
    }
}

impl SweepReport {
    pub fn new(mode: ExecutionMode, surrogates: &[SurrogateKind], options: RunOptions) -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            mode,
            surrogates: surrogates.to_vec(),
            options,
            summary: SweepSummary::default(),
            entries: Vec::new(),
        }
    }

    pub fn add_dispatch(&mut self, mut entry: DispatchEntry, dispatched: Dispatched) {
        self.summary.total += 1;
        entry.status = match dispatched {
            Dispatched::Completed => {
                self.summary.completed += 1;
                DispatchStatus::Completed
            }
            Dispatched::Planned => {
                self.summary.planned += 1;
                DispatchStatus::Planned
            }
            Dispatched::Queued => {
                self.summary.queued += 1;
                DispatchStatus::Queued
            }
        };
        self.entries.push(entry);
    }

    /// Record the start-phase outcome of a queued worker.
    pub fn record_start(&mut self, outcome: &Result<StartedWorker, DispatchError>) {
        let (index, status, pid, message) = match outcome {
            Ok(worker) => (worker.index(), DispatchStatus::Started, worker.pid(), None),
            Err(e) => (
                dispatch_index(e),
                DispatchStatus::StartFailed,
                None,
                Some(e.to_string()),
            ),
        };
        match status {
            DispatchStatus::Started => self.summary.started += 1,
            _ => self.summary.start_failed += 1,
        }
        if let Some(entry) = self.entries.iter_mut().find(|e| e.index == index) {
            entry.status = status;
            entry.pid = pid;
            entry.message = message;
        }
    }
}

fn dispatch_index(err: &DispatchError) -> usize {
    match err {
        DispatchError::Spawn { index, .. } | DispatchError::Thread { index, .. } => *index,
    }
}
