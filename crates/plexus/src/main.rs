// SPDX-FileCopyrightText: 2026 Plexus Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Plexus - plugin composition and lifecycle host.
//!
//! This is the binary entry point. It composes the demo plugins (or the
//! subset selected by a manifest directory) into one application.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod commands;
mod demo;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Plexus - plugin composition and lifecycle host.
#[derive(Parser, Debug)]
#[command(name = "plexus", version, about, long_about = None)]
struct Cli {
    /// Directory of `*.plugin.toml` manifests selecting which plugins load.
    #[arg(long, global = true, value_name = "DIR")]
    manifests: Option<PathBuf>,

    /// Load configuration from this file instead of the XDG hierarchy.
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the application and print its composite log.
    Inspect {
        /// Pretty-print the JSON.
        #[arg(long)]
        pretty: bool,
    },
    /// Discover and validate plugin manifests.
    Validate,
    /// Build and start the application until Ctrl+C.
    Run,
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` wins over the configured level. With `trace_composite_log`
/// the container's composite log trace is enabled as well.
fn init_tracing(level: &str, trace_composite_log: bool) {
    let mut directives = format!("plexus={level},plexus_container={level},plexus_plugin={level},warn");
    if trace_composite_log {
        directives.push_str(",plexus_container::container=trace");
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => plexus_config::load_and_validate_path(path),
        None => plexus_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            plexus_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config.logging.level, config.logging.trace_composite_log);

    let manifests = cli.manifests.as_deref();
    let result = match cli.command {
        Some(Commands::Inspect { pretty }) => {
            commands::inspect(&config, manifests, pretty).map(|json| println!("{json}"))
        }
        Some(Commands::Validate) => {
            commands::validate(&config, manifests).map(|report| print!("{report}"))
        }
        Some(Commands::Run) => commands::run(&config, manifests).await,
        None => {
            println!("plexus: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("plexus: {e}");
        std::process::exit(1);
    }
}
