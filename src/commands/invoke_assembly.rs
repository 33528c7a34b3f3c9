use crate::args;
use crate::commands::Tasking;
use crate::error::TaskError;
use crate::job::{Job, CLR};
use crate::schema::{ChoiceSource, CommandDefinition, CommandParameter, DEFAULT_GROUP, OS_WINDOWS};
use crate::storage::FileStore;
use crate::task::{TaskInstance, TaskResult};
use async_trait::async_trait;
use log::error;

/// Execute an assembly previously loaded with load-assembly. The assembly is
/// referenced by name only; no content crosses the wire again.
#[derive(Debug)]
pub struct InvokeAssembly {}

struct InvokeArgs {
    assembly: String,
    arguments: String,
}

impl InvokeAssembly {
    fn resolve(&self, task: &TaskInstance) -> Result<InvokeArgs, TaskError> {
        let named = task.args.for_group(&self.definition(), task.group())?;
        Ok(InvokeArgs {
            assembly: named.require_string("assembly")?,
            arguments: named.string_or("arguments", ""),
        })
    }
}

#[async_trait]
impl Tasking for InvokeAssembly {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("invoke-assembly")
            .description("Execute a .NET assembly that was previously loaded into the agent")
            .help("invoke-assembly <assembly name> <arg1> <arg2>...")
            .supported_os(&[OS_WINDOWS])
            .parameter(
                CommandParameter::choose_one("assembly")
                    .display_name("Assembly")
                    .description("The previously loaded assembly to execute")
                    .choices_from(ChoiceSource::LoadedAssemblies)
                    .required_in(DEFAULT_GROUP, 0),
            )
            .parameter(
                CommandParameter::string("arguments")
                    .display_name("Arguments")
                    .cli_name("args")
                    .description("Arguments to execute the assembly with")
                    .default_value("")
                    .optional_in(DEFAULT_GROUP, 1),
            )
    }

    async fn create_tasking(&self, task: &TaskInstance, _store: &dyn FileStore) -> TaskResult {
        let resolved = match self.resolve(task) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("invoke-assembly: {e}");
                return TaskResult::failed(e);
            }
        };

        let job = Job::new(CLR)
            .arg("invoke-assembly")
            .arg(&resolved.assembly)
            .args(args::tokenize(&resolved.arguments));
        match job.encode() {
            Ok(encoded) => {
                let display = format!("{} {}", resolved.assembly, resolved.arguments);
                TaskResult::completed(encoded, Some(display))
            }
            Err(e) => {
                error!("invoke-assembly: {e}");
                TaskResult::failed(e)
            }
        }
    }
}
