use crate::args;
use crate::commands::Tasking;
use crate::error::TaskError;
use crate::job::{Job, CMD};
use crate::schema::{
    CommandDefinition, CommandParameter, DEFAULT_GROUP, OS_LINUX, OS_MACOS, OS_WINDOWS,
};
use crate::storage::FileStore;
use crate::task::{TaskInstance, TaskResult};
use async_trait::async_trait;
use log::error;

/// Run an arbitrary executable on the agent host and return its output.
#[derive(Debug)]
pub struct Run {}

struct RunArgs {
    executable: String,
    arguments: String,
}

impl Run {
    fn resolve(&self, task: &TaskInstance) -> Result<RunArgs, TaskError> {
        let named = task.args.for_group(&self.definition(), task.group())?;
        Ok(RunArgs {
            executable: named.require_string("executable")?,
            arguments: named.string_or("arguments", ""),
        })
    }

    fn encode(&self, resolved: &RunArgs) -> Result<(String, String), TaskError> {
        let job = Job::new(CMD)
            .arg(&resolved.executable)
            .args(args::tokenize(&resolved.arguments));
        let display = format!("{} {}", resolved.executable, resolved.arguments);
        Ok((job.encode()?, display))
    }
}

#[async_trait]
impl Tasking for Run {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("run")
            .description("Run the executable with the provided arguments and return the results")
            .help("run <executable> <arg1> <arg2>...")
            .supported_os(&[OS_WINDOWS, OS_LINUX, OS_MACOS, "freebsd", "openbsd", "solaris"])
            .mitre_attack(&["T1106"])
            .parameter(
                CommandParameter::string("executable")
                    .display_name("Executable")
                    .description("The executable, or program, to run")
                    .required_in(DEFAULT_GROUP, 0),
            )
            .parameter(
                CommandParameter::string("arguments")
                    .display_name("Arguments")
                    .cli_name("args")
                    .description("Arguments to start the executable with")
                    .default_value("")
                    .optional_in(DEFAULT_GROUP, 1),
            )
    }

    async fn create_tasking(&self, task: &TaskInstance, _store: &dyn FileStore) -> TaskResult {
        let resolved = match self.resolve(task) {
            Ok(resolved) => resolved,
            Err(e) => {
                error!("run: {e}");
                return TaskResult::failed(e);
            }
        };
        match self.encode(&resolved) {
            Ok((job, display)) => TaskResult::completed(job, Some(display)),
            Err(e) => {
                error!("run: {e}");
                TaskResult::failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args::TaskArgs;
    use crate::storage::MemoryFileStore;

    #[tokio::test]
    async fn test_run_with_named_arguments() {
        let task = TaskInstance::new(
            "run",
            "",
            TaskArgs::from_pairs([
                ("executable".to_string(), "ping".to_string()),
                ("arguments".to_string(), "-c 4 8.8.8.8".to_string()),
            ]),
        );

        let result = Run {}.create_tasking(&task, &MemoryFileStore::new()).await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.display_params.as_deref(), Some("ping -c 4 8.8.8.8"));

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.command, CMD);
        assert_eq!(job.args, vec!["ping", "-c", "4", "8.8.8.8"]);
    }

    #[tokio::test]
    async fn test_run_from_command_line() {
        let task = TaskInstance::new("run", "", TaskArgs::line("ping -c 4 8.8.8.8"));

        let result = Run {}.create_tasking(&task, &MemoryFileStore::new()).await;
        assert!(result.success, "{:?}", result.error);

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.args, vec!["ping", "-c", "4", "8.8.8.8"]);
    }

    #[tokio::test]
    async fn test_run_without_arguments_value() {
        let task = TaskInstance::new(
            "run",
            "",
            TaskArgs::from_pairs([("executable".to_string(), "whoami".to_string())]),
        );

        let result = Run {}.create_tasking(&task, &MemoryFileStore::new()).await;
        assert!(result.success);

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.args, vec!["whoami"]);
    }

    #[tokio::test]
    async fn test_run_missing_executable_fails() {
        let task = TaskInstance::new(
            "run",
            "",
            TaskArgs::from_pairs([("arguments".to_string(), "-c 4".to_string())]),
        );

        let result = Run {}.create_tasking(&task, &MemoryFileStore::new()).await;
        assert!(!result.success);
        assert!(result.job.is_none());
        assert!(result.error.unwrap().contains("\"executable\""));
    }
}
