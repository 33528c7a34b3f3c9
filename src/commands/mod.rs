// TASKFORGE - Command Modules
// Operator-facing commands and their tasking functions
//
// Each module defines one command: its parameter schema and the translation
// of a task into the agent's job representation.

pub mod invoke_assembly;
pub mod list_assemblies;
pub mod load_assembly;
pub mod run;

use crate::error::TaskError;
use crate::schema::CommandDefinition;
use crate::storage::FileStore;
use crate::task::{TaskInstance, TaskResult};
use async_trait::async_trait;

#[async_trait]
pub trait Tasking: Send + Sync + std::fmt::Debug {
    /// Returns the command schema registered with the host platform.
    fn definition(&self) -> CommandDefinition;

    /// Translates one task into an encoded agent job. Every failure comes
    /// back as a result with `success` unset; nothing panics and nothing
    /// produces a partial job.
    async fn create_tasking(&self, task: &TaskInstance, store: &dyn FileStore) -> TaskResult;
}

// Register all commands available to operators
pub fn all_commands() -> Vec<Box<dyn Tasking>> {
    vec![
        Box::new(run::Run {}),
        Box::new(load_assembly::LoadAssembly {}),
        Box::new(invoke_assembly::InvokeAssembly {}),
        Box::new(list_assemblies::ListAssemblies {}),
    ]
}

pub fn command_by_name(name: &str) -> Option<Box<dyn Tasking>> {
    all_commands()
        .into_iter()
        .find(|c| c.definition().name.eq_ignore_ascii_case(name))
}

pub fn require_command(name: &str) -> Result<Box<dyn Tasking>, TaskError> {
    command_by_name(name).ok_or_else(|| TaskError::UnknownCommand(name.to_string()))
}

/// Startup check that every registered definition is internally consistent
/// and that command names are unique. Definitions are immutable afterwards,
/// so this runs once.
pub fn validate_registry() -> Result<(), TaskError> {
    let mut names: Vec<String> = Vec::new();
    for command in all_commands() {
        let definition = command.definition();
        definition.validate()?;
        if names.iter().any(|n| n.eq_ignore_ascii_case(&definition.name)) {
            return Err(TaskError::Definition {
                command: definition.name.clone(),
                reason: "command name is already registered".to_string(),
            });
        }
        names.push(definition.name);
    }
    Ok(())
}
