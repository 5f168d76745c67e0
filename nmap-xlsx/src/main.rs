//! nmap XLSX CLI Application
//!
//! Command-line front end for the nmap-report library. It loads one or more
//! nmap XML reports and writes a triage workbook with three sheets:
//! - Summary (one row per report)
//! - Hosts (one row per host)
//! - Results (one row per service, with Flagged/Notes columns to fill in)

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use nmap_report::{ReportError, ReportLoader, ScanReport};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

mod config;
mod report;

use config::AppConfig;
use report::ReportWorkbook;

/// nmap XLSX - Turn nmap XML reports into a triage spreadsheet
#[derive(Parser, Debug)]
#[command(name = "nmap-xlsx")]
#[command(about = "Convert nmap XML reports into an XLSX workbook", long_about = None)]
#[command(version)]
struct Args {
    /// Path(s) to nmap XML reports or directories containing them
    #[arg(short, long, value_name = "PATH", num_args = 1.., required_unless_present = "config")]
    reports: Vec<PathBuf>,

    /// Path to the xlsx output (default: Report_<timestamp>.xlsx)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to configuration file (TOML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbosity level (can be repeated: -v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<ExitCode> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging
    init_logging(args.verbose, args.quiet);

    log::info!("nmap-xlsx v{}", env!("CARGO_PKG_VERSION"));
    log::info!("Using report library v{}", nmap_report::VERSION);

    run(args)
}

/// Load every report and write the workbook
///
/// Usage errors return exit code 2. Nothing is written unless every report loads.
fn run(args: Args) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => {
            log::info!("Loading configuration from: {:?}", path);
            config::load_config(path)?
        }
        None => AppConfig::default(),
    };

    let report_paths = if args.reports.is_empty() {
        config.input.reports.clone()
    } else {
        args.reports.clone()
    };

    if report_paths.is_empty() {
        return Ok(usage_error(
            "no reports given on the command line or in the config file",
        ));
    }

    let loader = ReportLoader::with_config(config.loader_config());

    // Resolve every path before parsing anything
    let files = match loader.resolve_paths(&report_paths) {
        Ok(files) => files,
        Err(e @ ReportError::InvalidInput(_)) => return Ok(usage_error(&e.to_string())),
        Err(e) => return Err(e).context("Failed to read report directory"),
    };

    if files.is_empty() {
        log::warn!(
            "No .{} reports found; the workbook will be empty",
            loader.config().extension
        );
    }

    let reports = load_reports(&loader, &files)?;

    let output = report::resolve_output_path(
        args.output.as_deref().or(config.output.path.as_deref()),
        &config.output.prefix,
        chrono::Local::now(),
    );
    let mut workbook = ReportWorkbook::new(output);
    log::info!("Writing workbook: {:?}", workbook.path());
    report::write_sheets(&mut workbook, &reports, &config.results)?;

    let path = workbook.close().context("Failed to save workbook")?;
    println!("[+] Report saved to {}", path.display());

    Ok(ExitCode::SUCCESS)
}

/// Parse every resolved file, in order; any failure aborts the run
fn load_reports(loader: &ReportLoader, files: &[PathBuf]) -> Result<Vec<ScanReport>> {
    files
        .iter()
        .map(|file| -> Result<ScanReport> {
            let report = loader
                .load_file(file)
                .with_context(|| format!("Failed to load report {:?}", file))?;
            if report.incomplete {
                println!(
                    "[!] {} is incomplete; loaded {} hosts",
                    display_name(file),
                    report.hosts.len()
                );
            }
            Ok(report)
        })
        .collect()
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Print help plus a diagnostic and return the usage exit code
fn usage_error(message: &str) -> ExitCode {
    // Printing help only fails if stdout is gone
    let _ = Args::command().print_help();
    println!("\n[!] {}", message);
    ExitCode::from(2)
}

/// Initialize logging based on verbosity level
fn init_logging(verbose: u8, quiet: bool) {
    use env_logger::Builder;
    use log::LevelFilter;
    use std::io::Write;

    let level = if quiet {
        LevelFilter::Error
    } else {
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    };

    Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {}] {}",
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
