//! gateflat: flattens synthesized gate-level netlists into scalar
//! `assign` statements.
//!
//! `gateflat clean` rewrites one netlist; `gateflat batch` rewrites many in
//! parallel, one worker per file.

#![warn(missing_docs)]

mod batch;
mod clean;
mod pipeline;

use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// gateflat: gate-level netlist flattener.
#[derive(Parser, Debug)]
#[command(name = "gateflat", version, about = "Gate-level netlist flattener")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `gateflat.toml` configuration file.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Flatten a single netlist.
    Clean(CleanArgs),
    /// Flatten several netlists in parallel.
    Batch(BatchArgs),
}

/// Flattening parameters that override `gateflat.toml`.
#[derive(Args, Debug, Default, Clone)]
pub struct ConfigArgs {
    /// Name of the module to flatten.
    #[arg(short, long)]
    pub module: Option<String>,

    /// Base name of the input port bus.
    #[arg(long)]
    pub input_bus: Option<String>,

    /// Base name of the output port bus.
    #[arg(long)]
    pub output_bus: Option<String>,

    /// Bit width shared by both port buses.
    #[arg(short, long)]
    pub width: Option<u32>,
}

/// Arguments for the `gateflat clean` subcommand.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Netlist to flatten.
    pub input: String,

    /// Where to write the flattened module (stdout if omitted).
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub overrides: ConfigArgs,
}

/// Arguments for the `gateflat batch` subcommand.
#[derive(Parser, Debug)]
pub struct BatchArgs {
    /// Netlists to flatten.
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<String>,

    /// Directory receiving one flattened file per input, same file name.
    #[arg(long)]
    pub out_dir: String,

    /// Output format for diagnostics.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,

    #[command(flatten)]
    pub overrides: ConfigArgs,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Diagnostic output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::env::var("TERM").is_ok_and(|t| t != "dumb"),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };
    pipeline::init_logging(&global);

    let result = match cli.command {
        Command::Clean(ref args) => clean::run(args, &global),
        Command::Batch(ref args) => batch::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}
