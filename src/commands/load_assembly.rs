use crate::commands::Tasking;
use crate::error::TaskError;
use crate::job::{Job, CLR};
use crate::schema::{
    ChoiceSource, CommandDefinition, CommandParameter, DEFAULT_GROUP, OS_WINDOWS,
};
use crate::storage::FileStore;
use crate::task::{TaskInstance, TaskResult};
use async_trait::async_trait;
use log::error;

const NEW_FILE_GROUP: &str = "New File";

/// Load a .NET assembly into the agent's process so it can be executed
/// repeatedly without re-sending it over the network.
#[derive(Debug)]
pub struct LoadAssembly {}

/// Where the assembly bytes come from, decided by the active parameter
/// group. Each variant carries only the field that group supplies.
enum AssemblySource {
    /// Content already registered with the file store, referenced by name.
    Registered { filename: String },
    /// A freshly uploaded file, referenced by its opaque identifier.
    Upload { file_id: String },
}

/// The resolved assembly: concrete bytes plus the name echoed back to the
/// operator and sent along to the agent.
struct LoadedAssembly {
    content: Vec<u8>,
    filename: String,
}

impl LoadAssembly {
    fn classify(&self, task: &TaskInstance) -> Result<AssemblySource, TaskError> {
        let named = task.args.for_group(&self.definition(), task.group())?;
        match task.group().to_lowercase().as_str() {
            "default" => Ok(AssemblySource::Registered {
                filename: named.require_string("filename")?,
            }),
            "new file" => Ok(AssemblySource::Upload {
                file_id: named.require_string("file")?,
            }),
            _ => Err(TaskError::UnknownParameterGroup(task.group().to_string())),
        }
    }

    async fn resolve(
        &self,
        source: AssemblySource,
        store: &dyn FileStore,
    ) -> Result<LoadedAssembly, TaskError> {
        match source {
            AssemblySource::Registered { filename } => {
                let content = store.content_by_name(&filename).await.map_err(|e| {
                    TaskError::Resolution {
                        parameter: "filename".to_string(),
                        source: e,
                    }
                })?;
                Ok(LoadedAssembly { content, filename })
            }
            AssemblySource::Upload { file_id } => {
                let content =
                    store
                        .content_by_id(&file_id)
                        .await
                        .map_err(|e| TaskError::Resolution {
                            parameter: "file".to_string(),
                            source: e,
                        })?;
                let filename =
                    store
                        .filename_by_id(&file_id)
                        .await
                        .map_err(|e| TaskError::Resolution {
                            parameter: "file".to_string(),
                            source: e,
                        })?;
                Ok(LoadedAssembly { content, filename })
            }
        }
    }
}

#[async_trait]
impl Tasking for LoadAssembly {
    fn definition(&self) -> CommandDefinition {
        CommandDefinition::new("load-assembly")
            .description("Load a .NET assembly into the agent's default AppDomain")
            .help(
                "Load a .NET assembly into the agent's process that can be executed multiple \
                 times without having to transfer the assembly over the network each time. Use \
                 the \"Default\" group for a previously registered file and \"New File\" to \
                 register and use a new file from your host OS.",
            )
            .supported_os(&[OS_WINDOWS])
            .parameter(
                CommandParameter::choose_one("filename")
                    .display_name(".NET Assembly File")
                    .description("The .NET assembly to load into the default AppDomain")
                    .choices_from(ChoiceSource::RegisteredFiles)
                    .required_in(DEFAULT_GROUP, 0),
            )
            .parameter(
                CommandParameter::file("file")
                    .display_name(".NET Assembly File")
                    .description("The .NET assembly to load into the default AppDomain")
                    .required_in(NEW_FILE_GROUP, 0),
            )
    }

    async fn create_tasking(&self, task: &TaskInstance, store: &dyn FileStore) -> TaskResult {
        let source = match self.classify(task) {
            Ok(source) => source,
            Err(e) => {
                error!("load-assembly: {e}");
                return TaskResult::failed(e);
            }
        };
        let assembly = match self.resolve(source, store).await {
            Ok(assembly) => assembly,
            Err(e) => {
                error!("load-assembly: {e}");
                return TaskResult::failed(e);
            }
        };

        let job = Job::new(CLR)
            .arg("load-assembly")
            .binary_arg(&assembly.content)
            .arg(&assembly.filename);
        match job.encode() {
            Ok(encoded) => TaskResult::completed(encoded, Some(assembly.filename)),
            Err(e) => {
                error!("load-assembly: {e}");
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
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

    const ASSEMBLY: [u8; 4] = [0x4d, 0x5a, 0x90, 0x00];

    fn store_with_assembly() -> MemoryFileStore {
        let mut store = MemoryFileStore::new();
        store.insert("file-id-1", "evil.dll", &ASSEMBLY);
        store
    }

    #[tokio::test]
    async fn test_load_registered_assembly_by_name() {
        let store = store_with_assembly();
        let task = TaskInstance::new(
            "load-assembly",
            DEFAULT_GROUP,
            TaskArgs::from_pairs([("filename".to_string(), "evil.dll".to_string())]),
        );

        let result = LoadAssembly {}.create_tasking(&task, &store).await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.display_params.as_deref(), Some("evil.dll"));

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.command, CLR);
        assert_eq!(job.args[0], "load-assembly");
        assert_eq!(BASE64.decode(&job.args[1]).unwrap(), ASSEMBLY);
        assert_eq!(job.args[2], "evil.dll");
    }

    #[tokio::test]
    async fn test_load_uploaded_assembly_by_id() {
        let store = store_with_assembly();
        let task = TaskInstance::new(
            "load-assembly",
            NEW_FILE_GROUP,
            TaskArgs::from_pairs([("file".to_string(), "file-id-1".to_string())]),
        );

        let result = LoadAssembly {}.create_tasking(&task, &store).await;
        assert!(result.success, "{:?}", result.error);
        assert_eq!(result.display_params.as_deref(), Some("evil.dll"));

        let job: Job = serde_json::from_str(result.job.as_deref().unwrap()).unwrap();
        assert_eq!(job.args, vec![
            "load-assembly".to_string(),
            BASE64.encode(ASSEMBLY),
            "evil.dll".to_string(),
        ]);
    }

    #[tokio::test]
    async fn test_unknown_group_fails() {
        let store = store_with_assembly();
        let task = TaskInstance::new(
            "load-assembly",
            "bogus",
            TaskArgs::from_pairs([("filename".to_string(), "evil.dll".to_string())]),
        );

        let result = LoadAssembly {}.create_tasking(&task, &store).await;
        assert!(!result.success);
        assert!(result
            .error
            .unwrap()
            .contains("unknown parameter group: bogus"));
    }

    #[tokio::test]
    async fn test_missing_filename_names_parameter() {
        let store = store_with_assembly();
        let task = TaskInstance::new("load-assembly", DEFAULT_GROUP, TaskArgs::from_pairs([]));

        let result = LoadAssembly {}.create_tasking(&task, &store).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("\"filename\""));
    }

    #[tokio::test]
    async fn test_unregistered_name_surfaces_cause() {
        let store = MemoryFileStore::new();
        let task = TaskInstance::new(
            "load-assembly",
            DEFAULT_GROUP,
            TaskArgs::from_pairs([("filename".to_string(), "missing.dll".to_string())]),
        );

        let result = LoadAssembly {}.create_tasking(&task, &store).await;
        assert!(!result.success);
        let error = result.error.unwrap();
        assert!(error.contains("\"filename\""));
        assert!(error.contains("file not found: missing.dll"));
    }
}
