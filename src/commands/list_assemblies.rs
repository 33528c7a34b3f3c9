use crate::commands::Tasking;
use crate::job::{Job, CLR};
use crate::schema::{CommandDefinition, OS_WINDOWS};
use crate::storage::FileStore;
use crate::task::{TaskInstance, TaskResult};
use async_trait::async_trait;
use log::error;

/// Enumerate the .NET assemblies currently loaded into the agent process.
/// Takes no arguments; the default group is always valid.
#[derive(Debug)]
pub struct ListAssemblies {}

#[async_trait]
impl Tasking for ListAssemblies {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("list-assemblies")
            .description("List the .NET assemblies loaded into the agent's process")
            .help("list-assemblies")
            .supported_os(&[OS_WINDOWS])
    }

    async fn create_tasking(&self, task: &TaskInstance, _store: &dyn FileStore) -> TaskResult {
        // Group validation still applies even with no parameters to extract.
        if let Err(e) = task.args.for_group(&self.definition(), task.group()) {
            error!("list-assemblies: {e}");
            return TaskResult::failed(e);
        }

        let job = Job::new(CLR).arg("list-assemblies");
        match job.encode() {
            Ok(encoded) => TaskResult::completed(encoded, None),
            Err(e) => {
                error!("list-assemblies: {e}");
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
    async fn test_list_assemblies_default_group() {
        let task = TaskInstance::new("list-assemblies", "", TaskArgs::from_pairs([]));

        let result = ListAssemblies {}
            .create_tasking(&task, &MemoryFileStore::new())
            .await;
        assert!(result.success, "{:?}", result.error);
        assert!(result.display_params.is_none());

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.command, CLR);
        assert_eq!(job.args, vec!["list-assemblies"]);
    }

    #[tokio::test]
    async fn test_list_assemblies_rejects_unknown_group() {
        let task = TaskInstance::new("list-assemblies", "bogus", TaskArgs::from_pairs([]));

        let result = ListAssemblies {}
            .create_tasking(&task, &MemoryFileStore::new())
            .await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("unknown parameter group"));
    }
}
