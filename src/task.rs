use crate::args::TaskArgs;
use crate::schema::DEFAULT_GROUP;
use serde::Serialize;

/// One operator invocation handed over by the host platform: which command,
/// which parameter group, and the raw argument values. Consumed exactly once
/// by the command's tasking function and never persisted here.
#[derive(Debug, Clone)]
pub struct TaskInstance {
    pub command: String,
    pub parameter_group: String,
    pub args: TaskArgs,
}

impl TaskInstance {
    pub fn new(command: &str, parameter_group: &str, args: TaskArgs) -> Self {
        TaskInstance {
            command: command.to_string(),
            parameter_group: parameter_group.to_string(),
            args,
        }
    }

    /// The active group, falling back to the default group when the operator
    /// did not pick one.
    pub fn group(&self) -> &str {
        if self.parameter_group.is_empty() {
            DEFAULT_GROUP
        } else {
            &self.parameter_group
        }
    }
}

/// Terminal outcome of one task: either an encoded job ready for the wire
/// plus an operator-facing echo of what was tasked, or an error description.
/// Never both, and never mutated after being returned.
#[derive(Debug, Clone, Serialize)]
pub struct TaskResult {
    pub success: bool,
    pub error: Option<String>,
    pub display_params: Option<String>,
    pub job: Option<String>,
}

impl TaskResult {
    pub fn completed(job: String, display_params: Option<String>) -> Self {
        TaskResult {
            success: true,
            error: None,
            display_params,
            job: Some(job),
        }
    }

    pub fn failed<E: std::fmt::Display>(error: E) -> Self {
        TaskResult {
            success: false,
            error: Some(error.to_string()),
            display_params: None,
            job: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_group_selects_default() {
        let task = TaskInstance::new("run", "", TaskArgs::line("whoami"));
        assert_eq!(task.group(), DEFAULT_GROUP);

        let task = TaskInstance::new("load-assembly", "New File", TaskArgs::line("x"));
        assert_eq!(task.group(), "New File");
    }

    #[test]
    fn test_failed_result_carries_no_job() {
        let result = TaskResult::failed("unknown parameter group: bogus");
        assert!(!result.success);
        assert!(result.job.is_none());
        assert_eq!(
            result.error.as_deref(),
            Some("unknown parameter group: bogus")
        );
    }
}
