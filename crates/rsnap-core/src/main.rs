//! Report snapshot CLI.
//!
//! - Export a captured report view as one standalone HTML document
//! - Preview export file names
//! - Inspect resolved themes and the module list of a view

use chrono::{DateTime, FixedOffset};
use clap::{Args, Parser, Subcommand};
use rsnap_common::GENERATOR_NAME;
use rsnap_config::PreferenceStore;
use rsnap_core::config::{load_config, ConfigError, ConfigOptions, ResolvedConfig};
use rsnap_core::exit_codes::ExitCode;
use rsnap_core::logging::{init_logging, LogConfig, LogFormat, LogLevel};
use rsnap_report::namer::{name, timestamp};
use rsnap_report::{
    discover_modules, ChartImages, ExportError, Exporter, FileDelivery, StaticView, ThemeResolver,
};
use std::path::PathBuf;

/// Capture report views as standalone HTML documents
#[derive(Parser)]
#[command(name = "rsnap")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    global: GlobalOpts,
}

/// Global options available to all commands
#[derive(Args, Debug)]
struct GlobalOpts {
    /// Report configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Viewer preference file (flat JSON object)
    #[arg(long, global = true)]
    prefs: Option<PathBuf>,

    /// Log format on stderr (human, jsonl)
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Export a view to a standalone HTML document
    Export(ExportArgs),

    /// Print the file name an export would get
    Name(NameArgs),

    /// Print the resolved theme as JSON
    Theme(ThemeArgs),

    /// Print the modules of a view as JSON
    Modules(ModulesArgs),

    /// Print version information
    Version,
}

// ============================================================================
// Command argument structs
// ============================================================================

#[derive(Args, Debug)]
struct ExportArgs {
    /// Captured view (JSON)
    #[arg(long)]
    view: PathBuf,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,

    /// Minify the document
    #[arg(long)]
    minify: bool,

    /// Document title
    #[arg(long)]
    title: Option<String>,
}

#[derive(Args, Debug)]
struct NameArgs {
    /// Database name
    #[arg(long)]
    db_name: String,

    /// Database connection
    #[arg(long)]
    connection: String,

    /// Export time (RFC 3339); defaults to now
    #[arg(long)]
    at: Option<String>,
}

#[derive(Args, Debug)]
struct ThemeArgs {
    /// Palette name; defaults to the persisted choice
    #[arg(long)]
    style: Option<String>,

    /// Compact layout (`--compact`, `--compact=false`); defaults to the persisted flag
    #[arg(long, num_args = 0..=1, require_equals = true, default_missing_value = "true")]
    compact: Option<bool>,
}

#[derive(Args, Debug)]
struct ModulesArgs {
    /// Captured view (JSON)
    #[arg(long)]
    view: PathBuf,
}

// ============================================================================
// Main entry point
// ============================================================================

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ExitCode::ArgsError
            } else {
                ExitCode::Clean
            };
            let _ = e.print();
            std::process::exit(code.as_i32());
        }
    };

    let log_config = LogConfig::from_env(
        LogLevel::from_verbosity(cli.global.verbose, cli.global.quiet),
        cli.global.log_format,
    );
    init_logging(&log_config);

    let exit_code = match &cli.command {
        Commands::Export(args) => run_export(&cli.global, args),
        Commands::Name(args) => run_name(args),
        Commands::Theme(args) => run_theme(&cli.global, args),
        Commands::Modules(args) => run_modules(args),
        Commands::Version => {
            print_version();
            ExitCode::Clean
        }
    };

    std::process::exit(exit_code.as_i32());
}

// ============================================================================
// Command implementations
// ============================================================================

fn run_export(global: &GlobalOpts, args: &ExportArgs) -> ExitCode {
    let resolved = match load(global) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let mut view = match StaticView::from_file(&args.view) {
        Ok(view) => view,
        Err(e) => return output_view_error(&args.view, &e),
    };

    let mut config = resolved.report;
    if args.minify {
        config = config.with_minify(true);
    }
    if let Some(title) = &args.title {
        config = config.with_title(title.clone());
    }

    let runtime = ChartImages::from(view.charts.clone());
    let exporter = match Exporter::new(config, runtime, FileDelivery::new(&args.out)) {
        Ok(exporter) => exporter,
        Err(e) => return output_export_error(&e),
    };

    match exporter.export_report(&mut view, &resolved.preferences, now()) {
        Ok(outcome) => {
            print_json(&outcome);
            ExitCode::Clean
        }
        Err(e) => output_export_error(&e),
    }
}

fn run_name(args: &NameArgs) -> ExitCode {
    let at = match &args.at {
        Some(raw) => match DateTime::parse_from_rfc3339(raw) {
            Ok(at) => at,
            Err(e) => {
                eprintln!("error: invalid --at value '{}': {}", raw, e);
                return ExitCode::ArgsError;
            }
        },
        None => now(),
    };
    println!("{}", name(&args.db_name, &args.connection, &timestamp(&at)));
    ExitCode::Clean
}

fn run_theme(global: &GlobalOpts, args: &ThemeArgs) -> ExitCode {
    let resolved = match load(global) {
        Ok(resolved) => resolved,
        Err(code) => return code,
    };
    let resolver = ThemeResolver::new().with_overrides(resolved.report.theme_overrides.clone());

    let style = args
        .style
        .clone()
        .or_else(|| resolved.preferences.report_style());
    let compact = args
        .compact
        .unwrap_or_else(|| resolved.preferences.compact_mode());
    let theme = resolver.resolve(style.as_deref(), compact);

    print_json(&theme);
    ExitCode::Clean
}

fn run_modules(args: &ModulesArgs) -> ExitCode {
    match StaticView::from_file(&args.view) {
        Ok(view) => {
            print_json(&discover_modules(&view));
            ExitCode::Clean
        }
        Err(e) => output_view_error(&args.view, &e),
    }
}

fn print_version() {
    println!("rsnap {}", env!("CARGO_PKG_VERSION"));
    println!("generator: {}", GENERATOR_NAME);
    println!("config schema: {}", rsnap_config::CONFIG_SCHEMA_VERSION);
}

// ============================================================================
// Helpers
// ============================================================================

fn now() -> DateTime<FixedOffset> {
    chrono::Local::now().fixed_offset()
}

fn load(global: &GlobalOpts) -> Result<ResolvedConfig, ExitCode> {
    let options = ConfigOptions {
        report_path: global.config.clone(),
        prefs_path: global.prefs.clone(),
    };
    load_config(&options).map_err(|e| output_config_error(&e))
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("error: failed to serialize output: {}", e),
    }
}

/// Output a config error.
fn output_config_error(error: &ConfigError) -> ExitCode {
    let exit_code = match error {
        ConfigError::IoError { .. } => ExitCode::IoError,
        _ => ExitCode::ConfigError,
    };
    tracing::error!(error = %error, "configuration error");
    eprintln!("error: {}", error);
    exit_code
}

fn output_view_error(path: &std::path::Path, error: &ExportError) -> ExitCode {
    tracing::error!(path = %path.display(), error = %error, "view could not be loaded");
    eprintln!("error: cannot load view {}: {}", path.display(), error);
    ExitCode::ConfigError
}

fn output_export_error(error: &ExportError) -> ExitCode {
    let exit_code = ExitCode::from(error);
    tracing::error!(error = %error, code = %exit_code, "export failed");
    eprintln!("error: {}", error);
    exit_code
}

