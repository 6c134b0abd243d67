//! Sorting pipeline: traverse a source tree and copy each file into a
//! per-extension bucket with a bounded number of parallel copies.

pub mod bucket;
pub mod gate;
mod hints;
pub mod report;
mod runner;
pub mod traverse;
mod unit;

pub use bucket::{NO_EXTENSION_BUCKET, bucket_dir, bucket_name, extension_of};
pub use gate::{AdmissionGate, Permit};
pub use report::{CopyOutcome, FailureReason, RunReport, Stage, UnitRecord};
pub use runner::{CopyOptions, DEFAULT_MAX_TASKS, process_all, process_all_with, sort_tree};
pub use traverse::Traverser;
pub use unit::copy_into_bucket;
