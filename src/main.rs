// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use depthview::config::Config;
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "depthview")]
#[command(about = "Depth-mask visualization viewer for depth-sensing cameras")]
#[command(version)]
#[command(subcommand_required = false)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the composite stream in the terminal (default)
    View,

    /// Run without a display, reporting throughput
    Headless {
        /// Run duration in seconds
        #[arg(short, long, default_value = "10")]
        duration: u64,
    },

    /// Capture a single composite frame to disk
    Snapshot {
        /// Output file path (default: ~/Pictures/depthview/DEPTH_TIMESTAMP.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=depthview=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let cli = Cli::parse();
    let config = Config::load();

    match cli.command {
        Some(Commands::Headless { duration }) => cli::run_headless(duration, &config),
        Some(Commands::Snapshot { output }) => cli::snapshot(output, &config),
        Some(Commands::View) | None => depthview::viewer::run(&config),
    }
}
