// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! vigil - process supervision pairs

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{cleanup, demo, inspect};
use vigil_watchdog::WatchdogConfig;

#[derive(Parser)]
#[command(name = "vigil", version, about = "vigil - mutual process supervision")]
struct Cli {
    /// Semaphore namespace of the pair (overrides VIGIL_NAMESPACE)
    #[arg(long, global = true)]
    namespace: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a no-op workload under supervision
    Demo(demo::DemoArgs),
    /// Report whether the pair's semaphores exist
    Inspect,
    /// Remove semaphores left behind by a crashed pair
    Cleanup,
}

fn main() -> Result<()> {
    setup_logging();
    let cli = Cli::parse();

    let mut config = WatchdogConfig::load()?;
    if let Some(namespace) = cli.namespace {
        config = config.with_namespace(namespace);
        config.validate()?;
    }

    match cli.command {
        Commands::Demo(args) => demo::handle(args, config),
        Commands::Inspect => inspect::handle(&config),
        Commands::Cleanup => cleanup::handle(&config),
    }
}

fn setup_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}
