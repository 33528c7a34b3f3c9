use crate::storage::StoreError;

/// Failure modes for translating one task into an agent job.
///
/// Every variant maps to exactly one class from the tasking contract:
/// configuration defects (unknown command or group), operator argument
/// errors, file-store resolution errors, and internal encoding defects.
/// The dispatcher converts all of them into a failed task result; none of
/// them escapes as a panic.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("unknown parameter group: {0}")]
    UnknownParameterGroup(String),

    /// A command definition that cannot be tasked at all. Caught at
    /// registry validation, not per task.
    #[error("invalid definition for command \"{command}\": {reason}")]
    Definition { command: String, reason: String },

    #[error("there was an error getting the \"{0}\" command argument: the argument was not provided")]
    MissingArgument(String),

    #[error("the \"{parameter}\" command argument is invalid: {reason}")]
    InvalidArgument { parameter: String, reason: String },

    /// A file-store lookup failed while materializing an argument.
    #[error("there was an error resolving the \"{parameter}\" command argument: {source}")]
    Resolution {
        parameter: String,
        #[source]
        source: StoreError,
    },

    /// Serializing a fully resolved job failed. Upstream validation makes
    /// this unreachable for well-formed input, so it surfaces generically.
    #[error("there was an error encoding the job: {0}")]
    Encoding(#[from] serde_json::Error),
}
