//! Application orchestrator.
//! Merges config sources, initializes logging, installs the interrupt handler,
//! validates the roots and runs the sort.

use std::path::Path;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

use ext_sorter::cli::Args;
use ext_sorter::config::{self, Config};
use ext_sorter::logging::init_tracing;
use ext_sorter::output as out;
use ext_sorter::{CopyOutcome, RunReport, SorterError, StopHandle, shutdown, sort_tree};

const EXIT_FATAL: u8 = 1;
const EXIT_PARTIAL: u8 = 2;
const EXIT_INTERRUPTED: u8 = 130;

/// Run the CLI application.
pub fn run(args: Args) -> ExitCode {
    if args.print_config {
        print_config_location();
        return ExitCode::SUCCESS;
    }

    let mut cfg = Config::default();
    let loaded_from = match config::load_config() {
        Ok(Some((path, settings))) => {
            settings.apply_to(&mut cfg);
            Some(path)
        }
        Ok(None) => None,
        Err(e) => {
            out::print_error(&format!("{e:#}"));
            return ExitCode::from(EXIT_FATAL);
        }
    };
    args.apply_overrides(&mut cfg);

    // Held until return so the file writer flushes.
    let _guard = match init_tracing(cfg.log_level, cfg.log_file.as_deref(), args.json) {
        Ok(g) => g,
        Err(e) => {
            out::print_error(&format!("Failed to initialize logging: {e}"));
            return ExitCode::from(EXIT_FATAL);
        }
    };
    if let Some(path) = &loaded_from {
        debug!(path = %path.display(), "Loaded config file");
    }

    if let Err(e) = ctrlc::set_handler(|| {
        shutdown::request();
        out::print_warn("Received interrupt; waiting for in-flight copies to finish...");
    }) {
        warn!(error = %e, "Could not install interrupt handler");
    }

    debug!(?args, "Starting ext_sorter");

    if let Err(e) = cfg.validate() {
        report_fatal(&e);
        return ExitCode::from(EXIT_FATAL);
    }

    let report = match sort_tree(&cfg.source_root, &cfg.copy_options(StopHandle::new())) {
        Ok(r) => r,
        Err(e) => {
            report_fatal(&e);
            return ExitCode::from(EXIT_FATAL);
        }
    };

    finish(&report)
}

fn print_config_location() {
    if let Some(p) = std::env::var_os(config::CONFIG_ENV) {
        out::print_info(&format!(
            "Using {} (explicit):\n  {}",
            config::CONFIG_ENV,
            Path::new(&p).display()
        ));
        return;
    }
    match config::default_config_path() {
        Some(p) => {
            out::print_info(&format!("Default ext_sorter config path:\n  {}", p.display()));
            if p.exists() {
                out::print_info("A config file exists at that location.");
            } else {
                out::print_info("No config file there; built-in defaults are used.");
            }
        }
        None => out::print_error("Could not determine a default config path"),
    }
}

fn report_fatal(e: &SorterError) {
    match e {
        SorterError::SourceRootMissing(path) => {
            error!(code = e.code(), kind = e.kind(), path = %path.display(), "Source folder does not exist")
        }
        SorterError::OutputRootInvalid { path, reason } => {
            error!(code = e.code(), kind = e.kind(), path = %path.display(), %reason, "Output folder unusable")
        }
        _ => error!(code = e.code(), kind = e.kind(), error = %e, "Cannot start sorting"),
    }
    out::print_error(&e.to_string());
}

fn finish(report: &RunReport) -> ExitCode {
    if report.interrupted {
        let e = SorterError::Interrupted;
        info!(code = e.code(), kind = e.kind(), summary = %report, "Process interrupted by user.");
        out::print_warn(&format!("{e}: {report}"));
        return ExitCode::from(EXIT_INTERRUPTED);
    }
    if report.all_failed() {
        out::print_error(&format!("No file could be copied: {report}"));
        return ExitCode::from(EXIT_FATAL);
    }
    if report.failed() > 0 {
        for rec in report.failures() {
            if let CopyOutcome::Failure { reason, stage } = &rec.outcome {
                out::print_warn(&format!("{} ({stage}): {reason}", rec.source.display()));
            }
        }
        out::print_warn(&format!("Finished with failures: {report}"));
        return ExitCode::from(EXIT_PARTIAL);
    }
    out::print_success(&format!("Done: {report}"));
    ExitCode::SUCCESS
}
