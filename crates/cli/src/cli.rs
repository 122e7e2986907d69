//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};

/// Sim Bridge - host variable and data definition synchronization
#[derive(Parser, Debug)]
#[command(
    name = "sim-bridge",
    author,
    version,
    about = "Host variable and data definition synchronization",
    long_about = "Runs the per-frame data manager loop with the bundled modules.\n\n\
                  Variables and records are refreshed before the modules run, \n\
                  dirty handles are flushed afterwards and record responses are \n\
                  routed back by request id."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "SIM_BRIDGE_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "SIM_BRIDGE_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the frame loop against the in-memory host
    Run(RunArgs),

    /// Translate a host exception code to its name
    Exception(ExceptionArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Number of frames to run (0 = until Ctrl+C)
    #[arg(long, default_value = "600", env = "SIM_BRIDGE_FRAMES")]
    pub frames: u64,

    /// Frames per second
    #[arg(long, default_value = "60", env = "SIM_BRIDGE_FRAME_RATE")]
    pub frame_rate: f64,

    /// Client name passed to the host
    #[arg(long, default_value = "sim-bridge", env = "SIM_BRIDGE_CLIENT_NAME")]
    pub client_name: String,

    /// Upper bound on host messages drained per frame
    #[arg(long, default_value = "1024", env = "SIM_BRIDGE_MAX_MESSAGES")]
    pub max_messages: usize,

    /// Disable the pushback module
    #[arg(long)]
    pub no_pushback: bool,

    /// Disable the ARINC 429 bridge module
    #[arg(long)]
    pub no_bridge: bool,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "SIM_BRIDGE_METRICS_PORT")]
    pub metrics_port: u16,

    /// Output run statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `exception` command
#[derive(Parser, Debug)]
pub struct ExceptionArgs {
    /// Host exception code
    #[arg(required_unless_present = "all")]
    pub code: Option<u32>,

    /// List every known code
    #[arg(long)]
    pub all: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
