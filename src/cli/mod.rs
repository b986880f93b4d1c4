//! # CLI Module
//!
//! Command-line interface for the file organizer.
//!
//! ## Usage
//! ```bash
//! # Sort a folder with the configured default strategy
//! file-organizer organize ~/Downloads ~/Sorted
//!
//! # Force a strategy and keep the originals
//! file-organizer organize ~/Downloads ~/Sorted --strategy type --copy
//!
//! # Flatten a sorted tree and drop the emptied folders
//! file-organizer unorganize ~/Sorted ~/Flat --remove-empty
//!
//! # JSON output
//! file-organizer organize ~/Downloads ~/Sorted --output json
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use console::{style, Term};
use file_organizer::config::{keys, ConfigProvider, JsonConfig};
use file_organizer::core::orchestrator::{BatchOrchestrator, BatchReport, BatchState, TransferMode};
use file_organizer::core::redact::PathRedactor;
use file_organizer::core::resolver::Strategy;
use file_organizer::error::{Result, ScanError};
use file_organizer::events::{BatchEvent, Event, EventChannel, WalkEvent};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::thread;

/// File Organizer - sort folders by date and type, and flatten them back
#[derive(Parser, Debug)]
#[command(name = "file-organizer")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Move the files in SOURCE into an organized tree under DESTINATION
    Organize {
        /// Directory whose top-level files are organized
        source: PathBuf,

        /// Root of the organized tree
        destination: PathBuf,

        /// Organization strategy (date, type, smart)
        #[arg(short, long)]
        strategy: Option<String>,

        /// Copy instead of move
        #[arg(long)]
        copy: bool,

        #[command(flatten)]
        common: CommonArgs,
    },

    /// Move every file below SOURCE into the single directory OUTPUT
    Unorganize {
        /// Organized tree to flatten
        source: PathBuf,

        /// Directory that receives every file
        output: PathBuf,

        /// Remove directories left empty in SOURCE
        #[arg(long)]
        remove_empty: bool,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        #[command(flatten)]
        common: CommonArgs,
    },
}

#[derive(Args, Debug)]
struct CommonArgs {
    /// Preview without touching files (not supported yet)
    #[arg(long)]
    dry_run: bool,

    /// Output format
    #[arg(short = 'o', long = "output", default_value = "pretty")]
    format: OutputFormat,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Human-readable output with colors
    Pretty,
    /// JSON output for scripting
    Json,
}

/// Settings shared by both subcommands once flags and config are merged
struct Session {
    term: Term,
    output: OutputFormat,
    verbose: bool,
    redactor: Option<PathRedactor>,
    config: Arc<JsonConfig>,
}

impl Session {
    fn open(common: &CommonArgs) -> Result<Self> {
        file_organizer::init_tracing_with_level(if common.verbose { "info" } else { "warn" });

        let config = match &common.config {
            Some(path) => JsonConfig::load(path)?,
            None => JsonConfig::load_default()?,
        };
        let redactor = config
            .get_bool(keys::SANITIZE_ERROR_MESSAGES, true)
            .then(PathRedactor::new);

        Ok(Self {
            term: Term::stderr(),
            output: common.format,
            verbose: common.verbose,
            redactor,
            config: Arc::new(config),
        })
    }

    fn pretty(&self) -> bool {
        self.output == OutputFormat::Pretty
    }

    fn redact(&self, message: &str) -> String {
        match &self.redactor {
            Some(redactor) => redactor.redact(message),
            None => message.to_string(),
        }
    }

    fn show_path(&self, path: &Path) -> String {
        self.redact(&path.display().to_string())
    }
}

/// Run the CLI
pub fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Organize {
            source,
            destination,
            strategy,
            copy,
            common,
        } => {
            let session = Session::open(&common)?;
            if common.dry_run {
                return Ok(report_dry_run(&session));
            }
            run_organize(&session, &source, &destination, strategy, copy)
        }
        Commands::Unorganize {
            source,
            output,
            remove_empty,
            yes,
            common,
        } => {
            let session = Session::open(&common)?;
            if common.dry_run {
                return Ok(report_dry_run(&session));
            }
            if !yes && !confirm_unorganize(&session, &source, &output) {
                session.term.write_line("Aborted.").ok();
                return Ok(ExitCode::SUCCESS);
            }
            run_unorganize(&session, &source, &output, remove_empty)
        }
    }
}

fn report_dry_run(session: &Session) -> ExitCode {
    let message = "Dry run is not supported yet; no files were touched.";
    if session.pretty() {
        session
            .term
            .write_line(&format!("{} {}", style("!").yellow().bold(), message))
            .ok();
    } else {
        println!("{}", serde_json::json!({ "dry_run": true, "supported": false, "message": message }));
    }
    ExitCode::SUCCESS
}

/// Ask before flattening; non-interactive sessions proceed
fn confirm_unorganize(session: &Session, source: &Path, output: &Path) -> bool {
    let term = &session.term;
    if !term.is_term() {
        return true;
    }

    term.write_line(&format!(
        "This will move every file under {} into {}.",
        style(session.show_path(source)).cyan(),
        style(session.show_path(output)).cyan()
    ))
    .ok();
    term.write_str("Continue? (y/N) ").ok();

    match term.read_line() {
        Ok(answer) => matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"),
        Err(_) => false,
    }
}

fn run_organize(
    session: &Session,
    source: &Path,
    destination: &Path,
    strategy: Option<String>,
    copy: bool,
) -> Result<ExitCode> {
    let mut builder = BatchOrchestrator::builder()
        .config(session.config.clone())
        .transfer_mode(if copy { TransferMode::Copy } else { TransferMode::Move });
    if let Some(name) = strategy {
        builder = builder.strategy(Strategy::from_name(&name));
    }
    let orchestrator = builder.build()?;

    print_header(session, &format!("Organizing ({} strategy)", orchestrator.strategy()));
    let result = with_progress(session, |sender| {
        orchestrator.organize_with_events(source, destination, sender)
    });
    finish(session, result)
}

fn run_unorganize(
    session: &Session,
    source: &Path,
    output: &Path,
    remove_empty: bool,
) -> Result<ExitCode> {
    let mut builder = BatchOrchestrator::builder().config(session.config.clone());
    if remove_empty {
        builder = builder.remove_empty_source(true);
    }
    let orchestrator = builder.build()?;

    print_header(session, "Unorganizing");
    let result = with_progress(session, |sender| {
        orchestrator.unorganize_with_events(source, output, sender)
    });
    finish(session, result)
}

fn print_header(session: &Session, action: &str) {
    if !session.pretty() {
        return;
    }
    session
        .term
        .write_line(&format!(
            "{} {}",
            style("File Organizer").bold().cyan(),
            style(format!("v{}", env!("CARGO_PKG_VERSION"))).dim()
        ))
        .ok();
    session.term.write_line(&format!("{}", style(action).dim())).ok();
    session.term.write_line("").ok();
}

/// Run a batch while a separate thread drives the progress bar
fn with_progress<F>(session: &Session, run: F) -> std::result::Result<BatchReport, ScanError>
where
    F: FnOnce(&file_organizer::events::EventSender) -> std::result::Result<BatchReport, ScanError>,
{
    let (sender, receiver) = EventChannel::new();

    let progress = session.pretty().then(|| {
        let pb = ProgressBar::new(0);
        if let Ok(bar_style) =
            ProgressStyle::default_bar().template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(bar_style.progress_chars("█▓░"));
        }
        pb
    });

    let progress_clone = progress.clone();
    let verbose = session.verbose;
    let redactor = session.redactor.clone();

    let event_thread = thread::spawn(move || {
        let redact = |message: &str| match &redactor {
            Some(redactor) => redactor.redact(message),
            None => message.to_string(),
        };

        for event in receiver.iter() {
            let Some(pb) = progress_clone.as_ref() else {
                continue;
            };
            match event {
                Event::Batch(BatchEvent::Started { total_files, .. }) => {
                    pb.set_length(total_files as u64);
                }
                Event::Batch(BatchEvent::Progress(p)) => {
                    pb.set_position(p.processed as u64);
                    pb.set_message(p.current_file);
                }
                Event::Batch(BatchEvent::FileError { file_name, error, category }) if verbose => {
                    pb.println(format!(
                        "  {} {} [{}] {}",
                        style("✗").red(),
                        file_name,
                        category,
                        style(redact(&error)).dim()
                    ));
                }
                Event::Walk(WalkEvent::SubtreeSkipped(issue)) => {
                    pb.println(format!(
                        "  {} skipped {}",
                        style("!").yellow(),
                        redact(&issue.path.display().to_string())
                    ));
                }
                Event::Batch(BatchEvent::Completed(_))
                | Event::Batch(BatchEvent::Cancelled { .. })
                | Event::Batch(BatchEvent::Failed { .. }) => {
                    pb.finish_and_clear();
                }
                _ => {}
            }
        }
    });

    let result = run(&sender);

    // Drop sender to signal event thread to finish
    drop(sender);
    event_thread.join().ok();
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    result
}

fn finish(session: &Session, result: std::result::Result<BatchReport, ScanError>) -> Result<ExitCode> {
    let mut report = match result {
        Ok(report) => report,
        Err(e) => {
            let message = session.redact(&e.to_string());
            match session.output {
                OutputFormat::Pretty => {
                    session
                        .term
                        .write_line(&format!("{} {}", style("✗").red().bold(), message))
                        .ok();
                }
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "state": "failed", "error": message }));
                }
            }
            return Ok(ExitCode::from(2));
        }
    };

    if let Some(redactor) = &session.redactor {
        redact_report(&mut report, redactor);
    }

    match session.output {
        OutputFormat::Pretty => print_pretty_report(session, &report),
        OutputFormat::Json => print_json_report(&report),
    }

    if report.progress.failed_files > 0 || report.state != BatchState::Completed {
        Ok(ExitCode::FAILURE)
    } else {
        Ok(ExitCode::SUCCESS)
    }
}

fn redact_report(report: &mut BatchReport, redactor: &PathRedactor) {
    for result in &mut report.progress.results {
        if let Some(error) = result.error.take() {
            result.error = Some(redactor.redact(&error));
        }
    }
    if let Some(cleanup) = report.cleanup.as_mut() {
        for path in &mut cleanup.removed {
            *path = PathBuf::from(redactor.redact_path(path));
        }
        for failure in &mut cleanup.failures {
            failure.path = PathBuf::from(redactor.redact_path(&failure.path));
            failure.error = redactor.redact(&failure.error);
        }
    }
}

fn print_pretty_report(session: &Session, report: &BatchReport) {
    let term = &session.term;
    let progress = &report.progress;

    term.write_line("").ok();
    let headline = match report.state {
        BatchState::Completed => format!("{} {} complete", style("✓").green().bold(), report.operation),
        BatchState::Cancelled => format!("{} {} cancelled", style("!").yellow().bold(), report.operation),
        _ => format!("{} {} failed", style("✗").red().bold(), report.operation),
    };
    term.write_line(&headline).ok();
    term.write_line("").ok();

    term.write_line(&format!(
        "  {} of {} files processed in {:.1}s",
        style(progress.processed_files).cyan(),
        style(progress.total_files).cyan(),
        progress.elapsed.as_secs_f64()
    ))
    .ok();
    term.write_line(&format!(
        "  {} succeeded ({})",
        style(progress.successful_files).green(),
        format_bytes(progress.bytes_processed())
    ))
    .ok();
    if progress.failed_files > 0 {
        term.write_line(&format!("  {} failed", style(progress.failed_files).red()))
            .ok();
    }

    if session.verbose {
        term.write_line(&format!("  {}", style(format!("operation id {}", report.operation_id)).dim()))
            .ok();
    }

    let failed = report.failed_operations();
    if !failed.is_empty() {
        term.write_line("").ok();
        term.write_line(&format!("{}", style("Failures:").bold().underlined()))
            .ok();
        for result in failed {
            term.write_line(&format!(
                "  {} {} {}",
                style("✗").red(),
                result.source_file,
                style(result.error.as_deref().unwrap_or("unknown error")).dim()
            ))
            .ok();
        }
    }

    if let Some(cleanup) = &report.cleanup {
        term.write_line("").ok();
        term.write_line(&format!(
            "  {} empty directories removed",
            style(cleanup.removed.len()).cyan()
        ))
        .ok();
        for failure in &cleanup.failures {
            term.write_line(&format!(
                "  {} could not remove {} after {} attempts: {}",
                style("!").yellow(),
                failure.path.display(),
                failure.attempts,
                style(&failure.error).dim()
            ))
            .ok();
        }
    }
}

fn print_json_report(report: &BatchReport) {
    match serde_json::to_string_pretty(report) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("failed to serialize report: {}", e),
    }
}

fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.1} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_organize_flags() {
        let cli = Cli::try_parse_from([
            "file-organizer",
            "organize",
            "/in",
            "/out",
            "--strategy",
            "type",
            "--copy",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Organize { strategy, copy, common, .. } => {
                assert_eq!(strategy.as_deref(), Some("type"));
                assert!(copy);
                assert_eq!(common.format, OutputFormat::Json);
                assert!(!common.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn parses_unorganize_flags() {
        let cli = Cli::try_parse_from([
            "file-organizer",
            "unorganize",
            "/sorted",
            "/flat",
            "--remove-empty",
            "--yes",
            "--dry-run",
            "--output",
            "json",
        ])
        .unwrap();

        match cli.command {
            Commands::Unorganize { output, remove_empty, yes, common, .. } => {
                assert_eq!(output, PathBuf::from("/flat"));
                assert!(remove_empty);
                assert!(yes);
                assert!(common.dry_run);
                assert_eq!(common.format, OutputFormat::Json);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn formats_bytes() {
        assert_eq!(format_bytes(512), "512 bytes");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn redacts_report_errors() {
        use file_organizer::core::progress::{OperationKind, OperationProgress, OperationResult};
        use file_organizer::error::{OrganizerError, TransferError};
        use std::time::Duration;

        let error = OrganizerError::Transfer(TransferError::MoveFailed {
            from: PathBuf::from("/home/zoe/in/a.txt"),
            to: PathBuf::from("/home/zoe/out/a.txt"),
        });
        let failed = OperationResult::failed(
            OperationKind::Organize,
            Path::new("/home/zoe/in/a.txt"),
            &error,
            1,
            Duration::ZERO,
        );
        let mut report = BatchReport {
            operation_id: "organize_00000000".to_string(),
            operation: OperationKind::Organize,
            strategy: "smart".to_string(),
            state: BatchState::Completed,
            progress: OperationProgress {
                operation_id: "organize_00000000".to_string(),
                total_files: 1,
                processed_files: 1,
                successful_files: 0,
                failed_files: 1,
                started_at: chrono::Local::now(),
                current_file: None,
                completion_percentage: 100.0,
                elapsed: Duration::ZERO,
                files_per_second: 0.0,
                average_processing_time: Duration::ZERO,
                estimated_remaining: Duration::ZERO,
                results: vec![failed],
            },
            cleanup: None,
        };

        redact_report(&mut report, &PathRedactor::with_home("/home/zoe"));

        let message = report.progress.results[0].error.as_deref().unwrap();
        assert!(!message.contains("zoe"));
        assert!(message.contains("<USER_HOME>"));
    }
}
