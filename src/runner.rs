use crate::args::TaskArgs;
use crate::cli::{split_key_value, FilesCommand};
use crate::commands::{all_commands, require_command};
use crate::config::{load_config, store_root};
use crate::error::TaskError;
use crate::logger;
use crate::storage::LocalFileStore;
use crate::task::{TaskInstance, TaskResult};
use colored::*;
use log::debug;
use std::fs;
use std::path::PathBuf;

/// List every command registered with the translation engine
pub fn list_commands() -> Result<(), String> {
    println!(
        "\n{}",
        format!("TASKFORGE v{} - Tasking Translation Engine", env!("CARGO_PKG_VERSION"))
            .bold()
            .green()
    );
    println!("\n{}", "Registered Commands".bold().underline());

    for command in all_commands() {
        let definition = command.definition();
        println!(
            "  {} | {} | OS: {}",
            definition.name.yellow(),
            definition.description,
            definition.attributes.supported_os.join(", ")
        );
    }

    println!("\n{}", "Usage:".bold());
    println!("  taskforge task <command> [--group <group>] [--arg NAME=VALUE ...]");
    println!("  taskforge describe <command>");

    Ok(())
}

/// Show one command's parameter groups and their parameters
pub fn describe_command(name: &str) -> Result<(), String> {
    let command = require_command(name).map_err(|e| e.to_string())?;
    let definition = command.definition();

    println!("\n{}: {}", "Command".bold(), definition.name.yellow());
    println!("{}: {}", "Description".bold(), definition.description);
    if !definition.help.is_empty() {
        println!("{}: {}", "Help".bold(), definition.help);
    }
    println!("{}: {}", "Version".bold(), definition.version);
    println!(
        "{}: {}",
        "Supported OS".bold(),
        definition.attributes.supported_os.join(", ")
    );
    if definition.attributes.needs_admin {
        println!("{}: yes", "Requires Admin".bold());
    }
    if !definition.attributes.mitre_attack.is_empty() {
        println!(
            "{}: {}",
            "MITRE ATT&CK".bold(),
            definition.attributes.mitre_attack.join(", ")
        );
    }

    for group in definition.known_groups() {
        let parameters = definition
            .group_parameters(&group)
            .map_err(|e| e.to_string())?;
        if parameters.is_empty() && group != crate::schema::DEFAULT_GROUP {
            continue;
        }
        println!("\n{}", format!("Parameter Group: {group}").bold().cyan());
        if parameters.is_empty() {
            println!("  (no parameters)");
        }
        for parameter in parameters {
            let membership = parameter.membership(&group).unwrap();
            println!(
                "  {} (--{}) | {:?} | {} | {}",
                parameter.name.yellow(),
                parameter.cli_name,
                parameter.parameter_type,
                if membership.required {
                    "required".red().to_string()
                } else {
                    "optional".normal().to_string()
                },
                parameter.description
            );
            if let Some(default) = &parameter.default_value {
                println!("      default: \"{default}\"");
            }
            if let Some(source) = parameter.choice_source {
                println!("      choices from: {source:?}");
            }
        }
    }

    Ok(())
}

fn build_args(named: Vec<String>, line: Option<String>) -> Result<TaskArgs, String> {
    if let Some(line) = line {
        return Ok(TaskArgs::line(&line));
    }
    let mut pairs = Vec::new();
    for pair in named {
        match split_key_value(&pair) {
            Some((name, value)) => pairs.push((name.to_string(), value.to_string())),
            None => {
                return Err(TaskError::InvalidArgument {
                    parameter: pair.clone(),
                    reason: "expected NAME=VALUE".to_string(),
                }
                .to_string())
            }
        }
    }
    Ok(TaskArgs::from_pairs(pairs))
}

fn print_result(result: &TaskResult) -> Result<(), String> {
    if result.success {
        println!("\n{}", "Tasking Successful".bold().green());
        if let Some(display) = &result.display_params {
            println!("{}: {}", "Display Params".bold(), display);
        }
        if let Some(job) = &result.job {
            println!("{}: {}", "Encoded Job".bold(), job);
        }
        Ok(())
    } else {
        println!("\n{}", "Tasking Failed".bold().red());
        Err(result
            .error
            .clone()
            .unwrap_or_else(|| "unknown tasking failure".to_string()))
    }
}

/// Translate one command invocation into an encoded agent job
pub async fn run_task(
    name: &str,
    group: &str,
    named_args: Vec<String>,
    line: Option<String>,
    store_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config_path.as_deref())?;
    if config_path.is_some() {
        if let Some(level) = &config.log_level {
            logger::set_log_level(level);
        }
    }

    let store = LocalFileStore::open(store_root(store_path, &config))
        .map_err(|e| format!("Failed to open file store: {e}"))?;

    let command = require_command(name).map_err(|e| e.to_string())?;
    let definition = command.definition();

    println!("\n{}", "Tasking Command".bold().underline());
    println!("{}: {}", "Command".bold(), definition.name.yellow());
    println!("{}: {}", "Group".bold(), group);

    let args = build_args(named_args, line)?;
    let task = TaskInstance::new(name, group, args);
    debug!("created task instance for command \"{}\"", task.command);
    let result = command.create_tasking(&task, &store).await;

    print_result(&result)
}

/// Register or list content in the local file store
pub fn manage_files(
    command: FilesCommand,
    store_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<(), String> {
    let config = load_config(config_path.as_deref())?;
    let store = LocalFileStore::open(store_root(store_path, &config))
        .map_err(|e| format!("Failed to open file store: {e}"))?;

    match command {
        FilesCommand::Add { path, name } => {
            let content =
                fs::read(&path).map_err(|e| format!("Failed to read {path:?}: {e}"))?;
            let name = match name {
                Some(name) => name,
                None => path
                    .file_name()
                    .map(|n| n.to_string_lossy().to_string())
                    .ok_or_else(|| format!("Cannot derive a file name from {path:?}"))?,
            };
            let id = store
                .register(&name, &content)
                .map_err(|e| format!("Failed to register file: {e}"))?;
            println!("{}: {} -> {}", "Registered".bold().green(), name, id.yellow());
            Ok(())
        }
        FilesCommand::List => {
            let records = store
                .records()
                .map_err(|e| format!("Failed to read the store index: {e}"))?;
            if records.is_empty() {
                println!("No files registered in {:?}", store.root());
                return Ok(());
            }
            println!("\n{}", "Registered Files".bold().underline());
            for record in records {
                println!("  {} | {}", record.id.yellow(), record.name);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_args_from_pairs() {
        let args = build_args(vec!["executable=ping".to_string()], None).unwrap();
        assert_eq!(args.get("executable"), Some("ping"));
    }

    #[test]
    fn test_build_args_rejects_malformed_pair() {
        assert!(build_args(vec!["executable".to_string()], None).is_err());
    }

    #[test]
    fn test_build_args_prefers_line() {
        let args = build_args(Vec::new(), Some("ping -c 4".to_string())).unwrap();
        assert!(matches!(args, TaskArgs::Line(_)));
    }
}
