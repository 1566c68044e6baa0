use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use pzip_core::{
    CompressionPipeline, FileOutcome, PipelineOptions, PzipError, RunFormat, RunReport, RunStatus,
};
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_USAGE: u8 = 2;
const LOG_ENV: &str = "PZIP_LOG";

#[derive(Parser)]
#[command(
    name = "pzip",
    version,
    about = "Parallel run-length compressor",
    long_about = "Run-length encodes every input file on its own thread into one shared output.\n\
                  Runs from different files are interleaved in the output."
)]
struct Cli {
    /// Input files, one worker thread each.
    files: Vec<PathBuf>,

    /// Output file, created or truncated on every run.
    #[arg(short, long, default_value = "file.z")]
    output: PathBuf,

    /// Encoding of each run in the output: `binary` (4-byte LE count, then
    /// the byte) or `text` (the byte, then its decimal count; debug only).
    #[arg(short, long, default_value_t = RunFormat::Binary)]
    format: RunFormat,

    /// Do not print the run summary.
    #[arg(short, long, default_value_t = false)]
    quiet: bool,

    /// Increase log verbosity (-v debug, -vv trace). PZIP_LOG overrides.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(report) => {
            print_diagnostics(&report);
            if !cli.quiet {
                print_summary(&cli.output, &report);
            }
            match report.status() {
                RunStatus::Success => ExitCode::SUCCESS,
                RunStatus::Partial | RunStatus::Failed => ExitCode::from(EXIT_FAILURE),
            }
        }
        Err(error @ PzipError::Usage(_)) => {
            eprintln!("error: {error}");
            eprintln!("usage: pzip [OPTIONS] <FILE>...");
            ExitCode::from(EXIT_USAGE)
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<RunReport, PzipError> {
    tracing::debug!(
        files = cli.files.len(),
        output = %cli.output.display(),
        "parsed arguments"
    );
    let pipeline = CompressionPipeline::new(PipelineOptions::with_format(cli.format));
    pipeline.run_to_path(&cli.files, &cli.output)
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "pzip_core=debug,pzip=debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn print_diagnostics(report: &RunReport) {
    for file in report.failures() {
        let reason = match &file.outcome {
            FileOutcome::OpenFailed(error) => format!("not compressed: {error}"),
            FileOutcome::WorkerFailed { runs, error, .. } => {
                format!("stopped after {runs} runs: {error}")
            }
            FileOutcome::Encoded { .. } => continue,
        };
        eprintln!("pzip: {}: {reason}", file.path().display());
    }

    if let Some(error) = &report.finish_error {
        eprintln!("pzip: output: {error}");
    }
}

fn print_summary(output: &Path, report: &RunReport) {
    let summary = report.summary();
    let status = match summary.status {
        RunStatus::Success => "complete",
        RunStatus::Partial => "partial",
        RunStatus::Failed => "failed",
    };

    eprintln!("compression {status}");
    eprintln!("  output: {} ({})", output.display(), summary.format);
    eprintln!(
        "  files: {} ok / {} failed / {} total",
        summary.files_succeeded, summary.files_failed, summary.files_total
    );
    eprintln!("  elapsed: {}", format_duration(summary.elapsed));
    eprintln!("  input bytes: {}", format_bytes(summary.input_bytes));
    eprintln!("  output bytes: {}", format_bytes(summary.output_bytes));
    eprintln!("  runs: {}", summary.runs_emitted);
    eprintln!("  output/input ratio: {:.3}x", summary.output_input_ratio);

    for file in &report.files {
        if let FileOutcome::Encoded {
            input_bytes,
            runs,
            elapsed,
        } = &file.outcome
        {
            eprintln!(
                "    #{:<3} {} | {} | {} runs | {}",
                file.index,
                file.path().display(),
                format_bytes(*input_bytes),
                runs,
                format_duration(*elapsed),
            );
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0usize;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} {}", UNITS[unit])
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

fn format_duration(duration: Duration) -> String {
    let total_seconds = duration.as_secs();
    let millis = duration.subsec_millis();
    let minutes = total_seconds / 60;
    let seconds = total_seconds % 60;

    if minutes > 0 {
        format!("{minutes:02}:{seconds:02}")
    } else {
        format!("{seconds}.{millis:03}s")
    }
}
