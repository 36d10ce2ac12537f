/// BFA command-line tool: annotate, validate, and summarise binary
/// buffers against a schema.
///
/// # Command overview
///
/// ```text
/// bfa <COMMAND> [OPTIONS]
///
/// Commands:
///   annotate   Print every byte range of a buffer with its type and meaning
///   validate   Check that a buffer annotates cleanly and completely
///   stats      Print byte and section counts per section kind
///   help       Print help information
///
/// Global options:
///   -v, --verbose    Log decode progress to stderr
///   --no-color       Disable coloured output
///   -h, --help       Print help
///   -V, --version    Print version
/// ```
///
/// # Exit codes
///
/// | Code | Meaning                                          |
/// |------|--------------------------------------------------|
/// | 0    | Success                                          |
/// | 1    | Error (I/O failure, bad schema, fatal decode...) |
///
/// All error details and logs are written to stderr so stdout can be piped
/// cleanly.
use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

mod cmd_annotate;
mod cmd_stats;
mod cmd_validate;
mod input;

// ── CLI root ──────────────────────────────────────────────────────────────────

/// The BFA (binary flat annotator) command-line tool.
#[derive(Parser)]
#[command(name = "bfa", version, about = "Schema-driven binary annotator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log decode progress (sections, downgraded errors) to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable coloured output (ANSI escape codes are suppressed).
    #[arg(long, global = true)]
    no_color: bool,
}

// ── Sub-commands ──────────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum Commands {
    /// Print every byte range of a buffer with its type and meaning.
    Annotate(AnnotateArgs),
    /// Check that a buffer annotates without diagnostics and is fully covered.
    Validate(ValidateArgs),
    /// Print byte and section counts per section kind.
    Stats(StatsArgs),
}

// ── Argument structs ──────────────────────────────────────────────────────────

/// Inputs shared by every sub-command.
#[derive(clap::Args)]
pub struct InputArgs {
    /// Path to the binary buffer to annotate.
    pub binary: PathBuf,

    /// Path to the JSON schema describing the buffer.
    #[arg(short, long)]
    pub schema: PathBuf,

    /// Nesting ceiling for tables, vectors, unions, and structs.
    #[arg(long, default_value_t = 64)]
    pub max_depth: usize,

    /// Treat bytes 4..8 as data even when they look like a file identifier.
    #[arg(long)]
    pub no_file_identifier: bool,
}

/// Arguments for `bfa annotate`.
///
/// ```text
/// ┌───────────────┬──────────────────────────────────────────────────┐
/// │ Flag          │ Values / default                                 │
/// ├───────────────┼──────────────────────────────────────────────────┤
/// │ --format      │ text (default) | json                            │
/// │ --no-padding  │ omit padding sections                            │
/// │ --hex-bytes   │ raw bytes shown per region (default 8)           │
/// │ -o / --output │ write to file instead of stdout                  │
/// └───────────────┴──────────────────────────────────────────────────┘
/// ```
#[derive(clap::Args)]
pub struct AnnotateArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Output format: `text` or `json`.
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Omit padding sections from the output.
    #[arg(long)]
    pub no_padding: bool,

    /// Raw bytes shown per region before eliding the rest.
    #[arg(long, default_value_t = 8)]
    pub hex_bytes: usize,

    /// Write the annotation to this file instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for `bfa validate`.
///
/// Annotates the buffer and reports success checkmarks, or the first fatal
/// error, or every diagnostic collected on the way. Exits with code 1 on
/// any problem.
#[derive(clap::Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

/// Arguments for `bfa stats`.
#[derive(clap::Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.no_color);

    let result = match cli.command {
        Commands::Annotate(args) => cmd_annotate::run(&args),
        Commands::Validate(args) => cmd_validate::run(&args, !cli.no_color),
        Commands::Stats(args) => cmd_stats::run(&args),
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr at `WARN`, or `DEBUG` with `--verbose`. `RUST_LOG`
/// directives still apply on top.
fn init_tracing(verbose: bool, no_color: bool) {
    let level = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}
