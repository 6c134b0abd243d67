//! Bounded fan-out of copy units and fan-in of their outcomes.
//!
//! The producer (the caller's thread) takes a permit from the admission gate
//! before handing a path to the worker pool, so at most `max_concurrency`
//! units are ever between admission and completion, and traversal pauses
//! while the pool is saturated. The rayon scope is the completion barrier.

use std::any::Any;
use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use rayon::ThreadPoolBuilder;
use tracing::{debug, error, info, warn};

use super::gate::{AdmissionGate, Permit};
use super::report::{CopyOutcome, FailureReason, RunReport, RunReportBuilder, Stage};
use super::traverse::Traverser;
use super::unit::copy_tracking_stage;
use crate::errors::SorterError;
use crate::shutdown::StopHandle;

/// Default number of parallel copy units.
pub const DEFAULT_MAX_TASKS: usize = 5;

/// How often a producer blocked on the gate re-checks for a stop request.
const STOP_POLL: Duration = Duration::from_millis(50);

/// Knobs for a single run.
#[derive(Debug, Clone)]
pub struct CopyOptions {
    pub destination_root: PathBuf,
    pub max_concurrency: usize,
    pub dry_run: bool,
    pub stop: StopHandle,
}

impl CopyOptions {
    pub fn new(destination_root: impl Into<PathBuf>, max_concurrency: usize) -> Self {
        Self {
            destination_root: destination_root.into(),
            max_concurrency,
            dry_run: false,
            stop: StopHandle::new(),
        }
    }
}

/// Copy every path into its bucket under `destination_root`, with at most
/// `max_concurrency` copies in flight. Returns once every admitted unit has
/// reported.
pub fn process_all<I>(
    paths: I,
    destination_root: &Path,
    max_concurrency: usize,
) -> Result<RunReport, SorterError>
where
    I: IntoIterator<Item = PathBuf>,
{
    process_all_with(paths, &CopyOptions::new(destination_root, max_concurrency))
}

/// [`process_all`] with explicit options (dry-run, stop handle).
pub fn process_all_with<I>(paths: I, opts: &CopyOptions) -> Result<RunReport, SorterError>
where
    I: IntoIterator<Item = PathBuf>,
{
    if opts.max_concurrency == 0 {
        return Err(SorterError::InvalidConcurrency(0));
    }

    let gate = AdmissionGate::new(opts.max_concurrency);
    let builder = Mutex::new(RunReportBuilder::default());
    let mut interrupted = false;

    match ThreadPoolBuilder::new()
        .num_threads(opts.max_concurrency)
        .thread_name(|i| format!("ext-sorter-copy-{i}"))
        .build()
    {
        Ok(pool) => pool.in_place_scope(|scope| {
            for path in paths {
                let Some(permit) = admit(&gate, &opts.stop) else {
                    interrupted = true;
                    break;
                };
                let builder = &builder;
                scope.spawn(move |_| run_unit(permit, path, opts, builder));
            }
        }),
        Err(e) => {
            warn!(
                error = %e,
                workers = opts.max_concurrency,
                "Failed to start copy workers; copying on the calling thread"
            );
            for path in paths {
                let Some(permit) = admit(&gate, &opts.stop) else {
                    interrupted = true;
                    break;
                };
                run_unit(permit, path, opts, &builder);
            }
        }
    }

    if interrupted {
        info!("Stop requested; no further files admitted");
    }

    let builder = builder.into_inner().unwrap_or_else(PoisonError::into_inner);
    let report = builder.build(gate.peak(), interrupted, opts.dry_run);
    debug!(in_flight = gate.in_flight(), "All copy units finished");
    Ok(report)
}

/// Walk `source_root` and copy everything it yields.
pub fn sort_tree(source_root: &Path, opts: &CopyOptions) -> Result<RunReport, SorterError> {
    let traverser = Traverser::new(source_root)?;
    info!(
        source = %source_root.display(),
        dest = %opts.destination_root.display(),
        max_tasks = opts.max_concurrency,
        "Sorting files by extension"
    );
    let mut report = process_all_with(traverser.files(), opts)?;
    report.walk_errors += traverser.skipped();

    if report.all_failed() {
        error!(failed = report.failed(), "Every file failed to copy");
    } else if report.failed() > 0 {
        warn!(summary = %report, "Run finished with failures");
    } else {
        info!(summary = %report, "Run finished");
    }
    Ok(report)
}

fn admit<'g>(gate: &'g AdmissionGate, stop: &StopHandle) -> Option<Permit<'g>> {
    if stop.should_stop() {
        return None;
    }
    gate.acquire_unless(STOP_POLL, || stop.should_stop())
}

fn run_unit(permit: Permit<'_>, path: PathBuf, opts: &CopyOptions, builder: &Mutex<RunReportBuilder>) {
    let outcome = guarded(&path, |reached| {
        copy_tracking_stage(&path, &opts.destination_root, opts.dry_run, reached)
    });
    drop(permit);

    builder
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .record(path, outcome);
}

/// Run one unit, turning a panic into a failure at the stage the unit reached.
fn guarded(path: &Path, unit: impl FnOnce(&Cell<Stage>) -> CopyOutcome) -> CopyOutcome {
    let reached = Cell::new(Stage::CreateBucket);
    panic::catch_unwind(AssertUnwindSafe(|| unit(&reached))).unwrap_or_else(|payload| {
        let msg = panic_message(payload.as_ref());
        let stage = reached.get();
        error!(code = 49, kind = "unit_panicked", %stage, path = %path.display(), reason = %msg, "Copy unit panicked");
        CopyOutcome::Failure {
            reason: FailureReason::Other(format!("unit panicked: {msg}")),
            stage,
        }
    })
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
