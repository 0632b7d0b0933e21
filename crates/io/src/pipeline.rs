//! End-to-end merge run over files.
//!
//! `run_merge` is the whole job on the calling thread. `spawn_merge` runs
//! it on a named worker thread and turns progress lines and duplicate
//! questions into [`PipelineEvent`]s for a front end to drain. A duplicate
//! question carries its own reply channel; the worker blocks until it is
//! answered or dropped.

use std::path::PathBuf;
use std::sync::mpsc;
use std::thread::JoinHandle;

use gamelist_recon::engine::{run, MergeOutput, ReconInput};
use gamelist_recon::resolve::target_version;
use gamelist_recon::{
    AttributeSelection, Decision, DuplicateDecider, FieldRecord, MergeOptions, ProcessingResult,
    ReconError, ReferenceDataset,
};

use crate::catalog::read_catalog;
use crate::output::{write_atomic, write_unmatched_log, OutputPaths};
use crate::reference::read_reference;
use crate::text::read_file_as_utf8;

// =============================================================================
// Request + events
// =============================================================================

#[derive(Debug, Clone)]
pub struct MergeRequest {
    pub catalog: PathBuf,
    pub reference: Option<PathBuf>,
    pub data: PathBuf,
    pub selection: AttributeSelection,
    pub modify_driver: bool,
}

pub enum PipelineEvent {
    Log(String),
    Duplicate(DuplicateRequest),
    /// Last event of a spawned run.
    Finished(Result<ProcessingResult, ReconError>),
}

/// A duplicate group waiting for an operator choice.
///
/// Dropping the request without answering cancels the run.
pub struct DuplicateRequest {
    pub identifier: String,
    pub candidates: Vec<FieldRecord>,
    reply: mpsc::Sender<Decision>,
}

impl DuplicateRequest {
    pub fn respond(self, decision: Decision) {
        let _ = self.reply.send(decision);
    }
}

/// Where progress lines go: the event channel, or the `log` facade at
/// info level when there is none.
#[derive(Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::Sender<PipelineEvent>>,
}

impl EventSink {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self { tx: Some(tx) }
    }

    /// A sink that only forwards to the `log` facade.
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn log(&self, line: impl Into<String>) {
        let line = line.into();
        match &self.tx {
            Some(tx) => {
                let _ = tx.send(PipelineEvent::Log(line));
            }
            None => log::info!("{line}"),
        }
    }
}

/// Asks the front end through the event channel.
pub struct ChannelDecider {
    events: mpsc::Sender<PipelineEvent>,
}

impl ChannelDecider {
    pub fn new(events: mpsc::Sender<PipelineEvent>) -> Self {
        Self { events }
    }
}

impl DuplicateDecider for ChannelDecider {
    fn decide(&mut self, identifier: &str, candidates: &[FieldRecord]) -> Decision {
        let (reply, answer) = mpsc::channel();
        let request = DuplicateRequest {
            identifier: identifier.to_string(),
            candidates: candidates.to_vec(),
            reply,
        };
        if self.events.send(PipelineEvent::Duplicate(request)).is_err() {
            return Decision::Cancel;
        }
        answer.recv().unwrap_or(Decision::Cancel)
    }
}

// =============================================================================
// Run
// =============================================================================

/// Run one merge and write its output files.
///
/// Nothing is written unless every stage before output succeeds.
pub fn run_merge(
    request: &MergeRequest,
    sink: &EventSink,
    decider: &mut dyn DuplicateDecider,
) -> Result<ProcessingResult, ReconError> {
    sink.log("=== Reading catalog ===");
    let file = read_catalog(&request.catalog)?;
    sink.log(format!(
        "{}: {} entities",
        request.catalog.display(),
        file.catalog.entities.len()
    ));
    if file.skipped_children > 0 {
        sink.log(format!(
            "Warning: {} unsupported child element(s) will not be written back",
            file.skipped_children
        ));
    }

    let reference = match &request.reference {
        Some(path) => {
            sink.log("=== Loading reference catalog ===");
            let data = read_reference(path, &file.catalog.universe())?;
            sink.log(format!("Reference records loaded: {}", data.len()));
            data
        }
        None => ReferenceDataset::new(),
    };

    let supplemental = read_file_as_utf8(&request.data)?;
    let stem = request
        .catalog
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let input = ReconInput {
        catalog: file.catalog,
        target_version: target_version(&stem).map(str::to_string),
        reference,
        supplemental,
        options: MergeOptions {
            selection: request.selection.clone(),
            modify_driver: request.modify_driver,
        },
    };
    let MergeOutput { document, mut result } = run(input, decider, &mut |line: String| sink.log(line))?;

    sink.log("=== Writing output ===");
    let paths = OutputPaths::for_catalog(&request.catalog);
    write_atomic(&paths.catalog, &document)?;
    result.output_file = Some(paths.catalog.display().to_string());
    sink.log(format!("Updated catalog: {}", paths.catalog.display()));

    if result.unmatched.is_empty() {
        sink.log("Every entity matched; no unmatched log written");
    } else {
        write_unmatched_log(&paths.unmatched_log, &result.unmatched)?;
        result.unmatched_log = Some(paths.unmatched_log.display().to_string());
        sink.log(format!(
            "Unmatched entities ({}): {}",
            result.unmatched.len(),
            paths.unmatched_log.display()
        ));
    }

    Ok(result)
}

// =============================================================================
// Worker thread
// =============================================================================

/// Handle to a merge running on a worker thread.
pub struct MergeHandle {
    pub events: mpsc::Receiver<PipelineEvent>,
    thread: JoinHandle<()>,
}

impl MergeHandle {
    /// Wait for the worker to exit. Call after `Finished` was received.
    pub fn join(self) {
        if self.thread.join().is_err() {
            log::error!("merge worker panicked");
        }
    }
}

pub fn spawn_merge(request: MergeRequest) -> Result<MergeHandle, ReconError> {
    let (tx, events) = mpsc::channel::<PipelineEvent>();

    let thread = std::thread::Builder::new()
        .name("gamelist-merge".to_string())
        .spawn(move || {
            let sink = EventSink::new(tx.clone());
            let mut decider = ChannelDecider::new(tx.clone());
            let result = run_merge(&request, &sink, &mut decider);
            let _ = tx.send(PipelineEvent::Finished(result));
        })
        .map_err(|e| ReconError::Io(format!("cannot start merge worker: {e}")))?;

    Ok(MergeHandle { events, thread })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_request_reads_as_cancel() {
        let (tx, rx) = mpsc::channel();
        let mut decider = ChannelDecider::new(tx);
        let front = std::thread::spawn(move || {
            if let Ok(PipelineEvent::Duplicate(req)) = rx.recv() {
                assert_eq!(req.identifier, "pacman");
                drop(req);
            }
        });
        let decision = decider.decide("pacman", &[FieldRecord::new(), FieldRecord::new()]);
        front.join().unwrap();
        assert_eq!(decision, Decision::Cancel);
    }

    #[test]
    fn answered_request_reaches_worker() {
        let (tx, rx) = mpsc::channel();
        let mut decider = ChannelDecider::new(tx);
        let front = std::thread::spawn(move || {
            if let Ok(PipelineEvent::Duplicate(req)) = rx.recv() {
                assert_eq!(req.candidates.len(), 3);
                req.respond(Decision::Select(2));
            }
        });
        let candidates = vec![FieldRecord::new(); 3];
        assert_eq!(decider.decide("x", &candidates), Decision::Select(2));
        front.join().unwrap();
    }

    #[test]
    fn closed_channel_cancels() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let mut decider = ChannelDecider::new(tx);
        assert_eq!(decider.decide("x", &[]), Decision::Cancel);
    }
}
