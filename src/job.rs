// TASKFORGE - Job Encoding
// Wire representation of the work handed to the agent

use crate::error::TaskError;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

/// Agent verb for running a program through the command executor.
pub const CMD: &str = "cmd";
/// Agent verb for the CLR module; several operator commands funnel into it.
pub const CLR: &str = "clr";

/// The canonical unit of work sent to an agent: a low-level verb plus an
/// ordered argument list. The verb may differ from the operator-facing
/// command name. Argument order and encoding are a stability contract with
/// deployed agents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub command: String,
    pub args: Vec<String>,
}

impl Job {
    pub fn new(command: &str) -> Self {
        Job {
            command: command.to_string(),
            args: Vec::new(),
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I>(mut self, args: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Binary content never travels raw inside a textual argument slot; it
    /// is carried as standard base64.
    pub fn binary_arg(mut self, content: &[u8]) -> Self {
        self.args.push(BASE64.encode(content));
        self
    }

    /// Serializes the job into the JSON envelope the host platform ships to
    /// the agent. All fallible work happens before a Job exists, so a
    /// failure here is an internal defect and surfaces as a generic
    /// encoding error.
    pub fn encode(&self) -> Result<String, TaskError> {
        Ok(serde_json::to_string(self)?)
    }
}
