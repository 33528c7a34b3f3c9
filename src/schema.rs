// TASKFORGE - Command Schema
// Declarative parameter schemas for operator-facing commands

use crate::error::TaskError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The parameter group used when the operator does not pick one.
pub const DEFAULT_GROUP: &str = "Default";

pub const OS_WINDOWS: &str = "Windows";
pub const OS_LINUX: &str = "Linux";
pub const OS_MACOS: &str = "macOS";

/// How an argument value is collected from the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterType {
    /// Free-form text.
    String,
    /// A single selection from a static or dynamically fetched list.
    ChooseOne,
    /// An opaque reference to content uploaded through the host platform.
    File,
}

/// Where a ChooseOne parameter's options come from at display time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChoiceSource {
    /// Names previously registered with the file store.
    RegisteredFiles,
    /// Assemblies already loaded into the agent process.
    LoadedAssemblies,
}

/// A parameter's role within one named group. The same parameter can be
/// required in one group and optional (or absent) in another.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupMembership {
    pub group: String,
    pub required: bool,
    pub position: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandParameter {
    pub name: String,
    pub display_name: String,
    pub cli_name: String,
    pub description: String,
    pub parameter_type: ParameterType,
    pub default_value: Option<String>,
    pub choice_source: Option<ChoiceSource>,
    pub groups: Vec<GroupMembership>,
}

impl CommandParameter {
    pub fn new(name: &str, parameter_type: ParameterType) -> Self {
        CommandParameter {
            name: name.to_string(),
            display_name: name.to_string(),
            cli_name: name.to_string(),
            description: String::new(),
            parameter_type,
            default_value: None,
            choice_source: None,
            groups: Vec::new(),
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParameterType::String)
    }

    pub fn choose_one(name: &str) -> Self {
        Self::new(name, ParameterType::ChooseOne)
    }

    pub fn file(name: &str) -> Self {
        Self::new(name, ParameterType::File)
    }

    pub fn display_name(mut self, display_name: &str) -> Self {
        self.display_name = display_name.to_string();
        self
    }

    pub fn cli_name(mut self, cli_name: &str) -> Self {
        self.cli_name = cli_name.to_string();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn default_value(mut self, default_value: &str) -> Self {
        self.default_value = Some(default_value.to_string());
        self
    }

    pub fn choices_from(mut self, source: ChoiceSource) -> Self {
        self.choice_source = Some(source);
        self
    }

    pub fn required_in(mut self, group: &str, position: u32) -> Self {
        self.groups.push(GroupMembership {
            group: group.to_string(),
            required: true,
            position,
        });
        self
    }

    pub fn optional_in(mut self, group: &str, position: u32) -> Self {
        self.groups.push(GroupMembership {
            group: group.to_string(),
            required: false,
            position,
        });
        self
    }

    /// This parameter's membership in the named group, if any.
    pub fn membership(&self, group: &str) -> Option<&GroupMembership> {
        self.groups.iter().find(|m| m.group.eq_ignore_ascii_case(group))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandAttributes {
    pub supported_os: Vec<String>,
    pub needs_admin: bool,
    pub mitre_attack: Vec<String>,
}

/// The full operator-facing schema for one command, registered once with
/// the host platform and immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    pub help: String,
    pub version: u32,
    pub attributes: CommandAttributes,
    pub parameters: Vec<CommandParameter>,
}

impl CommandDefinition {
    pub fn new(name: &str) -> Self {
        CommandDefinition {
            name: name.to_string(),
            description: String::new(),
            help: String::new(),
            version: 0,
            attributes: CommandAttributes::default(),
            parameters: Vec::new(),
        }
    }

    pub fn description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    #[allow(dead_code)]
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    pub fn supported_os(mut self, os: &[&str]) -> Self {
        self.attributes.supported_os = os.iter().map(|s| s.to_string()).collect();
        self
    }

    #[allow(dead_code)]
    pub fn needs_admin(mut self, needs_admin: bool) -> Self {
        self.attributes.needs_admin = needs_admin;
        self
    }

    pub fn mitre_attack(mut self, mappings: &[&str]) -> Self {
        self.attributes.mitre_attack = mappings.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn parameter(mut self, parameter: CommandParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// All group names this command's parameters mention. The default group
    /// is always present so parameterless commands stay taskable.
    pub fn known_groups(&self) -> Vec<String> {
        let mut groups = vec![DEFAULT_GROUP.to_string()];
        for parameter in &self.parameters {
            for membership in &parameter.groups {
                if !groups.iter().any(|g| g.eq_ignore_ascii_case(&membership.group)) {
                    groups.push(membership.group.clone());
                }
            }
        }
        groups
    }

    pub fn has_group(&self, group: &str) -> bool {
        self.known_groups().iter().any(|g| g.eq_ignore_ascii_case(group))
    }

    /// The parameters belonging to a group, ordered by their in-group
    /// position. A group no parameter claims (other than the default group)
    /// is a configuration defect, not a fallback.
    pub fn group_parameters(&self, group: &str) -> Result<Vec<&CommandParameter>, TaskError> {
        if !self.has_group(group) {
            return Err(TaskError::UnknownParameterGroup(group.to_string()));
        }
        let mut members: Vec<(&CommandParameter, u32)> = self
            .parameters
            .iter()
            .filter_map(|p| p.membership(group).map(|m| (p, m.position)))
            .collect();
        members.sort_by_key(|(_, position)| *position);
        Ok(members.into_iter().map(|(p, _)| p).collect())
    }

    /// Registry-time sanity check: parameter names must be unique and every
    /// parameter must be reachable through at least one group.
    pub fn validate(&self) -> Result<(), TaskError> {
        for (i, parameter) in self.parameters.iter().enumerate() {
            if self.parameters[..i].iter().any(|p| p.name == parameter.name) {
                return Err(TaskError::Definition {
                    command: self.name.clone(),
                    reason: format!("duplicate parameter \"{}\"", parameter.name),
                });
            }
            if parameter.groups.is_empty() {
                return Err(TaskError::Definition {
                    command: self.name.clone(),
                    reason: format!("parameter \"{}\" belongs to no group", parameter.name),
                });
            }
        }
        Ok(())
    }
}

impl fmt::Display for CommandDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {}", self.name, self.description)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_group_definition() -> CommandDefinition {
        CommandDefinition::new("load-assembly")
            .parameter(
                CommandParameter::choose_one("filename")
                    .choices_from(ChoiceSource::RegisteredFiles)
                    .required_in(DEFAULT_GROUP, 0),
            )
            .parameter(CommandParameter::file("file").required_in("New File", 0))
    }

    #[test]
    fn test_group_parameters_ordered_by_position() {
        let definition = CommandDefinition::new("run")
            .parameter(CommandParameter::string("arguments").optional_in(DEFAULT_GROUP, 1))
            .parameter(CommandParameter::string("executable").required_in(DEFAULT_GROUP, 0));

        let parameters = definition.group_parameters(DEFAULT_GROUP).unwrap();
        let names: Vec<&str> = parameters.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["executable", "arguments"]);
    }

    #[test]
    fn test_groups_are_case_insensitive() {
        let definition = two_group_definition();
        assert!(definition.has_group("new file"));
        assert_eq!(definition.group_parameters("NEW FILE").unwrap().len(), 1);
    }

    #[test]
    fn test_unknown_group_is_an_error() {
        let definition = two_group_definition();
        let err = definition.group_parameters("bogus").unwrap_err();
        assert!(err.to_string().contains("unknown parameter group"));
    }

    #[test]
    fn test_default_group_always_known() {
        let definition = CommandDefinition::new("list-assemblies");
        assert!(definition.has_group(DEFAULT_GROUP));
        assert!(definition.group_parameters(DEFAULT_GROUP).unwrap().is_empty());
    }

    #[test]
    fn test_parameter_in_multiple_groups() {
        let parameter = CommandParameter::string("timeout")
            .required_in("Default", 2)
            .optional_in("New File", 2);
        assert!(parameter.membership("default").unwrap().required);
        assert!(!parameter.membership("new file").unwrap().required);
    }

    #[test]
    fn test_validate_rejects_duplicate_parameters() {
        let definition = CommandDefinition::new("run")
            .parameter(CommandParameter::string("executable").required_in(DEFAULT_GROUP, 0))
            .parameter(CommandParameter::string("executable").optional_in(DEFAULT_GROUP, 1));
        assert!(definition.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_groupless_parameter() {
        let definition =
            CommandDefinition::new("run").parameter(CommandParameter::string("executable"));
        assert!(definition.validate().is_err());
    }
}
