//! Serializable description of a command tree.
//!
//! Useful for tooling that needs the tree's shape without running it, such
//! as shell completion generators or documentation builders.

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::option::{CmdOption, OptionKind, OptionValue};

/// Description of one option.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionDescriptor {
    pub kind: OptionKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub long: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionValue>,
}

impl From<&CmdOption> for OptionDescriptor {
    fn from(option: &CmdOption) -> Self {
        Self {
            kind: option.kind(),
            long: option.long().map(String::from),
            short: option.short(),
            env: option.env().map(String::from),
            description: option.description().map(String::from),
            required: option.is_required(),
            default: option.value().cloned(),
        }
    }
}

/// Description of a command and everything below it.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CmdOption, Command};
///
/// let root = Command::new("server")
///     .with_subcommand(
///         Command::new("start")
///             .with_option(CmdOption::int(Some("port"), Some('p')).with_default(88))?,
///     )?;
///
/// let desc = root.describe();
/// assert_eq!(desc.subcommands[0].name, "start");
/// assert!(!desc.subcommands[0].options[0].required);
///
/// let json = desc.to_json_pretty().unwrap();
/// assert!(json.contains("\"port\""));
/// # Ok::<(), cmdtree_core::DefinitionError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandDescriptor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether an action is bound; commands without one print usage.
    pub runnable: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<OptionDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<CommandDescriptor>,
    /// Subcommands visible from this command and everything below it.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub public_subcommands: Vec<CommandDescriptor>,
}

impl CommandDescriptor {
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Command {
    /// Describes this command and its subtree.
    pub fn describe(&self) -> CommandDescriptor {
        CommandDescriptor {
            name: self.name().to_string(),
            description: self.description().map(String::from),
            runnable: self.has_action(),
            options: self.options().iter().map(OptionDescriptor::from).collect(),
            subcommands: self.subcommands().map(Command::describe).collect(),
            public_subcommands: self.public_subcommands().map(Command::describe).collect(),
        }
    }
}
