// TaskForge - C2 Tasking Translation Engine
// CLI command interface

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "taskforge",
    about = "TaskForge - translates operator commands into agent jobs",
    version,
    long_about = "Tasking translation engine for the TaskForge C2 framework. Validates operator \
                  arguments against each command's parameter-group schema, resolves registered \
                  file content, and encodes wire-ready agent jobs."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging
    #[arg(long, global = true, default_value_t = false)]
    pub debug: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List all registered commands
    List,

    /// Show a command's parameter groups and parameters
    Describe {
        /// The command name (e.g., run or load-assembly)
        command: String,
    },

    /// Translate a command invocation into an encoded agent job
    Task {
        /// The command name (e.g., run or load-assembly)
        command: String,

        /// Parameter group to task with
        #[arg(short, long, default_value = "Default")]
        group: String,

        /// Named argument as name=value; repeatable
        #[arg(short = 'a', long = "arg", value_name = "NAME=VALUE")]
        args: Vec<String>,

        /// Raw argument line, split against the group's schema
        #[arg(short, long, conflicts_with = "args")]
        line: Option<String>,

        /// Path to the file store directory
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Optional path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Manage the local file store
    Files {
        #[command(subcommand)]
        command: FilesCommand,

        /// Path to the file store directory
        #[arg(short, long)]
        store: Option<PathBuf>,

        /// Optional path to a config file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
pub enum FilesCommand {
    /// Register a file with the store and print its identifier
    Add {
        /// Path of the file to register
        path: PathBuf,

        /// Name to register the content under (defaults to the file name)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// List registered files
    List,
}

// Helper function to split a NAME=VALUE argument pair
pub fn split_key_value(pair: &str) -> Option<(&str, &str)> {
    let (name, value) = pair.split_once('=')?;
    if name.is_empty() {
        return None;
    }
    Some((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_key_value() {
        assert_eq!(
            split_key_value("executable=ping"),
            Some(("executable", "ping"))
        );
        assert_eq!(split_key_value("args=-c 4"), Some(("args", "-c 4")));
        assert_eq!(split_key_value("novalue"), None);
        assert_eq!(split_key_value("=x"), None);
    }
}
