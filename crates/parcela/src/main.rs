// SPDX-FileCopyrightText: 2026 Parcela Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Parcela - support assistant for Parcela Saúde.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod app;
mod commands;
mod serve;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use parcela_config::ParcelaConfig;

/// Parcela - support assistant for Parcela Saúde.
#[derive(Parser, Debug)]
#[command(name = "parcela", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the default search path.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the Telegram bot until interrupted.
    Serve,
    /// Answer one question and print the result.
    Ask {
        /// The question to answer.
        question: String,
    },
    /// Show which model a question would be routed to, without calling it.
    Route {
        /// The question to classify.
        question: String,
    },
    /// Load every bulk source into the knowledge base.
    Ingest {
        /// Directory of plain-text exchanges (defaults to `ingest.context_dir`).
        #[arg(long)]
        dir: Option<PathBuf>,
    },
    /// Index the bootstrap exchanges.
    Seed,
}

fn load_config(path: Option<&PathBuf>) -> ParcelaConfig {
    let loaded = match path {
        Some(path) => parcela_config::load_and_validate_path(path),
        None => parcela_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            parcela_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("parcela: use --help for available commands");
        return;
    };

    let config = load_config(cli.config.as_ref());
    app::init_tracing(&config.agent.log_level);

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Ask { question } => commands::run_ask(&config, &question).await,
        Commands::Route { question } => commands::run_route(&config, &question),
        Commands::Ingest { dir } => commands::run_ingest(&config, dir).await,
        Commands::Seed => commands::run_seed(&config).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
