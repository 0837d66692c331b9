// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, error, info, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::PathBuf;

use subrip::app_config::{self, Config, LineEnding};
use subrip::app_controller::{CheckReport, Controller, ProcessSummary};
use subrip::{Encoding, TimeShift, Timecode};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for LineEnding to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLineEnding {
    Lf,
    Crlf,
}

impl From<CliLineEnding> for LineEnding {
    fn from(cli_ending: CliLineEnding) -> Self {
        match cli_ending {
            CliLineEnding::Lf => LineEnding::Lf,
            CliLineEnding::Crlf => LineEnding::Crlf,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse and validate subtitle files
    Check(CheckArgs),

    /// Repair overlapping subtitles and renumber entries
    Fix(FixArgs),

    /// Move or rescale all timings
    Shift(ShiftArgs),

    /// Re-encode subtitle files
    Convert(ConvertArgs),

    /// Generate shell completions for subrip
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct CheckArgs {
    /// Subtitle file or directory to process
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Print the diagnostics as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct FixArgs {
    /// Subtitle file or directory to process
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Output file (or directory when PATH is a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Required gap between consecutive subtitles in milliseconds
    #[arg(long)]
    buffer_ms: Option<i64>,
}

#[derive(Args, Debug)]
struct ShiftArgs {
    /// Subtitle file or directory to process
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Offset to add, e.g. 00:00:02,500 or -00:00:01,000
    #[arg(long, value_parser = parse_offset, allow_hyphen_values = true)]
    offset: Option<Timecode>,

    /// Ratio to scale timings by, applied before the offset (e.g. 25/23.976)
    #[arg(long, value_parser = parse_ratio)]
    ratio: Option<f64>,

    /// Output file (or directory when PATH is a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Subtitle file or directory to process
    #[arg(value_name = "PATH")]
    input_path: PathBuf,

    /// Target encoding (e.g. utf-8, utf-16le, windows-1252)
    #[arg(short, long)]
    encoding: Option<String>,

    /// Target line ending
    #[arg(long, value_enum)]
    line_ending: Option<CliLineEnding>,

    /// Write a byte-order mark
    #[arg(long)]
    bom: bool,

    /// Output file (or directory when PATH is a directory)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

/// subrip - SubRip subtitle toolkit
///
/// Validates, repairs, shifts and re-encodes .srt files.
#[derive(Parser, Debug)]
#[command(name = "subrip")]
#[command(version)]
#[command(about = "SubRip subtitle toolkit")]
#[command(long_about = "subrip validates, repairs, shifts and re-encodes SubRip (.srt) subtitle files.

EXAMPLES:
    subrip check movie.srt                      # Validate a single file
    subrip check --json /movies/                # Validate a directory, JSON report
    subrip fix movie.srt                        # Repair overlaps into movie.fixed.srt
    subrip fix --buffer-ms 40 -o out.srt in.srt # Custom gap and output
    subrip shift --offset -00:00:01,500 in.srt  # Move everything 1.5s earlier
    subrip shift --ratio 25/23.976 in.srt       # Framerate conversion
    subrip convert -e utf-8 --bom in.srt        # Re-encode as UTF-8 with BOM
    subrip completions bash > subrip.bash       # Generate bash completions

CONFIGURATION:
    Configuration is read from subrip.json by default. You can specify a
    different file with --config. Missing files fall back to defaults.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "subrip.json")]
    config: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @parses: Signed offset such as -00:00:01,500
fn parse_offset(value: &str) -> Result<Timecode, String> {
    let value = value.trim();
    let (negative, rest) = match value.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, value.strip_prefix('+').unwrap_or(value)),
    };
    let time = Timecode::parse(rest).map_err(|e| e.to_string())?;
    Ok(if negative { -time } else { time })
}

// @parses: Ratio as a number or a fraction like 25/23.976
fn parse_ratio(value: &str) -> Result<f64, String> {
    let ratio = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().map_err(|_| format!("invalid ratio: {}", value))?;
            let den: f64 = den.trim().parse().map_err(|_| format!("invalid ratio: {}", value))?;
            num / den
        }
        None => value.trim().parse().map_err(|_| format!("invalid ratio: {}", value))?,
    };

    if ratio.is_finite() && ratio > 0.0 {
        Ok(ratio)
    } else {
        Err(format!("ratio must be a positive number: {}", value))
    }
}

// @struct: Custom logger implementation
struct CustomLogger;

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color, now, emoji, record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialize the logger with info level; the config may change it later
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "subrip", &mut std::io::stdout());
        return Ok(());
    }

    if let Some(level) = cli.log_level {
        log::set_max_level(app_config::LogLevel::from(level).into());
    }

    let mut config = Config::load_or_default(&cli.config)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    } else {
        log::set_max_level(config.log_level.into());
    }
    debug!("Using configuration from {:?}", cli.config);

    match cli.command {
        Commands::Check(args) => run_check(config, args),
        Commands::Fix(args) => run_fix(config, args),
        Commands::Shift(args) => run_shift(config, args),
        Commands::Convert(args) => run_convert(config, args),
        Commands::Completions { .. } => Ok(()),
    }
}

fn run_check(config: Config, args: CheckArgs) -> Result<()> {
    let controller = Controller::with_config(config)?;
    let report = controller.run_check(&args.input_path)?;

    if args.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialize report")?;
        println!("{}", json);
    } else {
        print_report(&report);
    }

    if report.has_errors() {
        std::process::exit(1);
    }
    Ok(())
}

fn print_report(report: &CheckReport) {
    for file in &report.files {
        if file.is_valid() {
            println!("{}: OK", file.path.display());
            continue;
        }

        println!("{}:", file.path.display());
        if let Some(parse_error) = &file.parse_error {
            println!("  {}", parse_error);
        }
        for error in &file.errors {
            println!("  {}", error);
        }
    }
    info!(
        "Checked {} file(s), {} problem(s)",
        report.files.len(),
        report.error_count()
    );
}

// Folder runs keep going past bad files; report them through the exit code.
fn finish(summary: &ProcessSummary, verb: &str) {
    info!("{} {} file(s)", verb, summary.outputs.len());
    if summary.has_failures() {
        error!("{} file(s) failed", summary.failed.len());
        std::process::exit(1);
    }
}

fn run_fix(mut config: Config, args: FixArgs) -> Result<()> {
    if let Some(buffer_ms) = args.buffer_ms {
        config.overlap.buffer_ms = buffer_ms;
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run_fix(&args.input_path, args.output.as_deref())?;
    finish(&summary, "Fixed");
    Ok(())
}

fn run_shift(config: Config, args: ShiftArgs) -> Result<()> {
    let shift = match (args.offset, args.ratio) {
        (None, None) => return Err(anyhow!("Nothing to do: pass --offset and/or --ratio")),
        (offset, ratio) => TimeShift {
            offset: offset.unwrap_or_default(),
            ratio,
        },
    };

    let controller = Controller::with_config(config)?;
    let summary = controller.run_shift(&args.input_path, &shift, args.output.as_deref())?;
    finish(&summary, "Shifted");
    Ok(())
}

fn run_convert(mut config: Config, args: ConvertArgs) -> Result<()> {
    if let Some(encoding) = &args.encoding {
        // Fail early on names the library does not know
        encoding.parse::<Encoding>()?;
        config.output.encoding = Some(encoding.clone());
    }
    if let Some(line_ending) = args.line_ending {
        config.output.line_ending = line_ending.into();
    }
    if args.bom {
        config.output.write_bom = true;
    }

    let controller = Controller::with_config(config)?;
    let save_options = controller.config().save_options()?;
    let summary = controller.run_convert(&args.input_path, &save_options, args.output.as_deref())?;
    finish(&summary, "Converted");
    Ok(())
}
