// TaskForge - C2 Tasking Translation Engine
//
// Translates operator-issued, schema-described commands into the canonical
// job representation a deployed agent executes: parameter-group validation,
// argument extraction, file-content resolution, and wire encoding.

mod args;
mod cli;
mod commands;
mod config;
mod error;
mod job;
mod logger;
mod runner;
mod schema;
mod storage;
mod task;

use clap::Parser;
use cli::{Cli, Commands};
use log::{error, info};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    logger::init_logger(cli.debug);

    info!(
        "Starting TaskForge v{} - Tasking Translation Engine",
        env!("CARGO_PKG_VERSION")
    );

    // Command definitions are immutable schema data; check them once here.
    if let Err(e) = commands::validate_registry() {
        error!("Command registry is invalid: {e}");
        process::exit(1);
    }

    match run_command(cli).await {
        Ok(_) => {
            info!("TaskForge completed successfully");
            process::exit(0);
        }
        Err(e) => {
            error!("TaskForge failed: {e}");
            process::exit(1);
        }
    }
}

async fn run_command(cli: Cli) -> Result<(), String> {
    match cli.command {
        Commands::List => runner::list_commands(),
        Commands::Describe { command } => runner::describe_command(&command),
        Commands::Task {
            command,
            group,
            args,
            line,
            store,
            config,
        } => runner::run_task(&command, &group, args, line, store, config).await,
        Commands::Files {
            command,
            store,
            config,
        } => runner::manage_files(command, store, config),
    }
}
