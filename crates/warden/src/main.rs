// SPDX-FileCopyrightText: 2026 Warden Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Warden - a webhook-driven Telegram relay with editor security
//! automation.
//!
//! This is the binary entry point for the Warden relay.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use clap::{Parser, Subcommand};

mod serve;

/// Warden - a webhook-driven Telegram relay.
#[derive(Parser, Debug)]
#[command(name = "warden", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the webhook server.
    Serve,
    /// Re-read chat administrators and rewrite the editors roster.
    SyncRoster,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match warden_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            warden_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Some(Commands::Serve) | None => serve::run_serve(config).await,
        Some(Commands::SyncRoster) => serve::run_sync_roster(config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
