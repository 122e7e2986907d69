//! # Sim Bridge CLI
//!
//! 命令行接口入口点。
//!
//! 提供：
//! - 帧循环运行与统计
//! - 宿主异常码查询
//! - 优雅关闭处理

mod cli;
mod commands;
mod error;
mod pipeline;

use anyhow::Result;
use clap::Parser;
use tracing::info;

use cli::{Cli, Commands};
use commands::{run_exception, run_frames};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize logging based on CLI options
    init_logging(&cli)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Sim Bridge CLI starting");

    // Execute command
    let result = match &cli.command {
        Commands::Run(args) => run_frames(args).await,
        Commands::Exception(args) => run_exception(args),
    };

    if let Err(ref e) = result {
        tracing::error!(error = %e, "Command failed");
    }

    result
}

/// Initialize logging based on CLI options
fn init_logging(cli: &Cli) -> Result<()> {
    let log_level = match (cli.quiet, cli.verbose) {
        (true, _) => "warn",
        (false, 0) => "info",
        (false, 1) => "debug",
        _ => "trace",
    };
    let log_format = match cli.log_format {
        cli::LogFormat::Json => observability::LogFormat::Json,
        cli::LogFormat::Pretty => observability::LogFormat::Pretty,
        cli::LogFormat::Compact => observability::LogFormat::Compact,
    };

    // Metrics are enabled per command
    observability::init_with_config(observability::ObservabilityConfig {
        log_format,
        log_level: log_level.to_string(),
        force_level: cli.quiet,
        metrics_port: None,
    })
}
