// TASKFORGE - Argument Handling
// Extraction and validation of raw operator argument values

use crate::error::TaskError;
use crate::schema::{CommandDefinition, CommandParameter};
use std::collections::HashMap;

/// Raw argument values as supplied by the host platform: either one unsplit
/// command line, or values already keyed by parameter name.
#[derive(Debug, Clone)]
pub enum TaskArgs {
    Line(String),
    Named(HashMap<String, String>),
}

impl TaskArgs {
    pub fn line(line: &str) -> Self {
        TaskArgs::Line(line.to_string())
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        TaskArgs::Named(pairs.into_iter().collect())
    }

    /// Normalizes the raw values against the active group's schema. Named
    /// values pass through; a command line is split so that each leading
    /// group parameter takes one token and the final parameter takes the
    /// remainder of the line verbatim. Fails only for an unknown group.
    pub fn for_group(
        &self,
        definition: &CommandDefinition,
        group: &str,
    ) -> Result<TaskArgs, TaskError> {
        let parameters = definition.group_parameters(group)?;
        match self {
            TaskArgs::Named(values) => Ok(TaskArgs::Named(values.clone())),
            TaskArgs::Line(line) => Ok(TaskArgs::Named(split_line(&parameters, line))),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        match self {
            TaskArgs::Named(values) => values.get(name).map(String::as_str),
            TaskArgs::Line(_) => None,
        }
    }

    /// A required argument; missing values are a hard error naming the
    /// parameter.
    pub fn require_string(&self, name: &str) -> Result<String, TaskError> {
        self.get(name)
            .map(str::to_string)
            .ok_or_else(|| TaskError::MissingArgument(name.to_string()))
    }

    /// An optional argument with a schema default.
    pub fn string_or(&self, name: &str, default: &str) -> String {
        self.get(name).unwrap_or(default).to_string()
    }
}

/// Assigns a raw command line to the group's parameters in position order.
/// All but the last parameter consume a single space-delimited token; the
/// last parameter receives whatever is left, spaces included.
fn split_line(parameters: &[&CommandParameter], line: &str) -> HashMap<String, String> {
    let mut values = HashMap::new();
    let mut rest = line;
    for (i, parameter) in parameters.iter().enumerate() {
        if rest.is_empty() {
            break;
        }
        if i + 1 == parameters.len() {
            values.insert(parameter.name.clone(), rest.to_string());
            rest = "";
        } else {
            match rest.find(' ') {
                Some(split) => {
                    values.insert(parameter.name.clone(), rest[..split].to_string());
                    rest = &rest[split + 1..];
                }
                None => {
                    values.insert(parameter.name.clone(), rest.to_string());
                    rest = "";
                }
            }
        }
    }
    values
}

/// Splits an arguments value on single spaces, the way the agent's command
/// executor expects them today. There is no quoting or escape handling, and
/// adjacent spaces produce empty tokens; do not change this without changing
/// the agent side in lockstep.
pub fn tokenize(arguments: &str) -> Vec<String> {
    if arguments.is_empty() {
        return Vec::new();
    }
    arguments.split(' ').map(str::to_string).collect()
}
