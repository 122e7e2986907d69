//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use contracts::DataManagerConfig;

use crate::cli::RunArgs;
use crate::error::CliError;
use crate::pipeline::{Runner, RunnerConfig};

/// Execute the `run` command
pub async fn run_frames(args: &RunArgs) -> Result<()> {
    if !args.frame_rate.is_finite() || args.frame_rate <= 0.0 {
        return Err(CliError::invalid_argument(
            "frame-rate",
            format!("expected a positive number, got {}", args.frame_rate),
        )
        .into());
    }
    if args.max_messages == 0 {
        return Err(CliError::invalid_argument("max-messages", "must be at least 1").into());
    }

    if args.metrics_port != 0 {
        observability::init_metrics_only(args.metrics_port)?;
    }

    let config = RunnerConfig {
        frames: if args.frames == 0 {
            None
        } else {
            Some(args.frames)
        },
        frame_interval: Duration::from_secs_f64(1.0 / args.frame_rate),
        manager: DataManagerConfig {
            client_name: args.client_name.clone(),
            max_messages_per_frame: args.max_messages,
            ..Default::default()
        },
        pushback: !args.no_pushback,
        bridge: !args.no_bridge,
    };

    info!(
        frames = ?config.frames,
        frame_rate = args.frame_rate,
        pushback = config.pushback,
        bridge = config.bridge,
        "Starting frame loop..."
    );

    let stats = Runner::new(config)
        .run(setup_shutdown_signal())
        .await
        .context("Frame loop execution failed")?;

    info!(
        frames = stats.frames,
        duration_secs = stats.duration.as_secs_f64(),
        fps = format!("{:.2}", stats.fps()),
        "Frame loop completed"
    );

    if args.json {
        println!("{}", stats.to_json()?);
    } else {
        stats.print_summary();
    }

    info!("Sim Bridge finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
