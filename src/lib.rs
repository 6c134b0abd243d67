//! Core library for `ext_sorter`.
//!
//! Walks a source tree and copies every regular file into
//! `<output>/<extension>/`, never running more than a configured number of
//! copies at once. One failing file never stops the others; every file ends
//! up either in a bucket or in the failures of the [`RunReport`].
//!
//! ```no_run
//! use std::path::Path;
//! use ext_sorter::{CopyOptions, sort_tree};
//!
//! let report = sort_tree(Path::new("incoming"), &CopyOptions::new("sorted", 4))?;
//! println!("{report}");
//! # Ok::<(), ext_sorter::SorterError>(())
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod output;
pub mod shutdown;
pub mod sort;

pub use config::{Config, LogLevel, default_config_path};
pub use errors::SorterError;
pub use shutdown::StopHandle;
pub use sort::{
    AdmissionGate, CopyOptions, CopyOutcome, DEFAULT_MAX_TASKS, FailureReason,
    NO_EXTENSION_BUCKET, RunReport, Stage, Traverser, UnitRecord, process_all, process_all_with,
    sort_tree,
};
