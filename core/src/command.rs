//! Command tree nodes and the construction API.
//!
//! A [`Command`] owns its options, its ordinary subcommands and its public
//! subcommands. Ownership is strictly top-down, so a tree can never contain
//! a cycle. Parent links are not stored: while resolving arguments the
//! resolver keeps the chain of commands it walked through, and that chain is
//! the parent chain for the invocation. This is what lets one public
//! subcommand appear under many parents at once.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Mutex, PoisonError};

use tracing::warn;

use crate::error::{CommandError, DefinitionError};
use crate::option::CmdOption;
use crate::resolve::Invocation;
use crate::token::is_command_segment;
use crate::usage::HelpConfig;

/// Behavior bound to a command, run once its options are resolved.
///
/// A non-zero result is reported as [`CommandError::HandlerFailed`].
/// Closures of the shape `Fn(&Invocation<'_>) -> i32` implement this trait.
pub trait Action: Send + Sync {
    fn execute(&self, invocation: &Invocation<'_>) -> i32;
}

impl<F> Action for F
where
    F: Fn(&Invocation<'_>) -> i32 + Send + Sync,
{
    fn execute(&self, invocation: &Invocation<'_>) -> i32 {
        self(invocation)
    }
}

/// Observer notified with the error of every failed run on a root command.
pub trait FaultHandler: Send + Sync {
    fn on_fault(&self, error: &CommandError);
}

impl<F> FaultHandler for F
where
    F: Fn(&CommandError) + Send + Sync,
{
    fn on_fault(&self, error: &CommandError) {
        self(error)
    }
}

/// A node of the command tree.
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CmdOption, Command};
///
/// let start = Command::new("start")
///     .with_description("Start the server")
///     .with_option(CmdOption::int(Some("port"), Some('p')).with_default(88))?;
///
/// let root = Command::new("server")
///     .with_subcommand(start)?
///     .with_public_subcommand(Command::new("help"))?;
///
/// assert!(root.subcommand("start").is_some());
/// assert!(root.public_subcommand("help").is_some());
/// assert!(root.subcommand("start").unwrap().option("p").is_some());
/// # Ok::<(), cmdtree_core::DefinitionError>(())
/// ```
#[derive(Default)]
pub struct Command {
    name: String,
    description: Option<String>,
    action: Option<Box<dyn Action>>,
    subcommands: BTreeMap<String, Command>,
    public_subcommands: BTreeMap<String, Command>,
    options: Vec<CmdOption>,
    help_config: HelpConfig,
    fault_handler: Option<Box<dyn FaultHandler>>,
    last_error: Mutex<Option<String>>,
}

impl Command {
    /// Creates a command with the given name.
    ///
    /// A root command may be left unnamed (`""`); the program name taken
    /// from the first argument is then shown in usage text.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Binds a closure as this command's action.
    pub fn with_action<F>(mut self, action: F) -> Self
    where
        F: Fn(&Invocation<'_>) -> i32 + Send + Sync + 'static,
    {
        self.action = Some(Box::new(action));
        self
    }

    /// Binds any [`Action`] implementation as this command's action.
    pub fn with_action_handler(mut self, action: impl Action + 'static) -> Self {
        self.action = Some(Box::new(action));
        self
    }

    /// Sets the usage layout. Only the root's configuration is consulted.
    pub fn with_help_config(mut self, config: HelpConfig) -> Self {
        self.help_config = config;
        self
    }

    /// Registers an observer for failed runs. Only consulted on the root.
    pub fn with_fault_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&CommandError) + Send + Sync + 'static,
    {
        self.fault_handler = Some(Box::new(handler));
        self
    }

    /// Adds an ordinary subcommand, replacing one of the same name.
    ///
    /// # Errors
    ///
    /// Returns [`DefinitionError::InvalidCommandName`] if the name is not
    /// made of ASCII letters only, since such a name could never be matched.
    pub fn add_subcommand(&mut self, sub: Command) -> Result<(), DefinitionError> {
        insert_command(&mut self.subcommands, &self.name, sub, "subcommand")
    }

    /// Adds a public subcommand, visible from this command and every command
    /// reached below it unless shadowed by an ordinary subcommand.
    ///
    /// # Errors
    ///
    /// Same as [`add_subcommand`](Self::add_subcommand).
    pub fn add_public_subcommand(&mut self, sub: Command) -> Result<(), DefinitionError> {
        insert_command(&mut self.public_subcommands, &self.name, sub, "public subcommand")
    }

    pub fn with_subcommand(mut self, sub: Command) -> Result<Self, DefinitionError> {
        self.add_subcommand(sub)?;
        Ok(self)
    }

    pub fn with_public_subcommand(mut self, sub: Command) -> Result<Self, DefinitionError> {
        self.add_public_subcommand(sub)?;
        Ok(self)
    }

    /// Registers an option.
    ///
    /// An existing option sharing the long or the short name is discarded.
    ///
    /// # Errors
    ///
    /// Returns a [`DefinitionError`] if the option has no name, an unusable
    /// name, or a default of the wrong type.
    pub fn add_option(&mut self, mut option: CmdOption) -> Result<(), DefinitionError> {
        option.validate()?;

        let before = self.options.len();
        self.options.retain(|existing| !existing.collides_with(&option));
        if self.options.len() != before {
            warn!(
                command = %self.name,
                option = %option.display_name(),
                "replacing previously declared option"
            );
        }

        self.options.push(option);
        Ok(())
    }

    pub fn with_option(mut self, option: CmdOption) -> Result<Self, DefinitionError> {
        self.add_option(option)?;
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_action(&self) -> bool {
        self.action.is_some()
    }

    pub(crate) fn action(&self) -> Option<&dyn Action> {
        self.action.as_deref()
    }

    pub fn help_config(&self) -> &HelpConfig {
        &self.help_config
    }

    /// Options in declaration order.
    pub fn options(&self) -> &[CmdOption] {
        &self.options
    }

    /// Finds an option by long or short name (without dashes).
    pub fn option(&self, name: &str) -> Option<&CmdOption> {
        self.options.iter().find(|opt| opt.matches(name))
    }

    pub fn subcommand(&self, name: &str) -> Option<&Command> {
        self.subcommands.get(name)
    }

    pub fn public_subcommand(&self, name: &str) -> Option<&Command> {
        self.public_subcommands.get(name)
    }

    /// Ordinary subcommands, sorted by name.
    pub fn subcommands(&self) -> impl Iterator<Item = &Command> {
        self.subcommands.values()
    }

    /// Public subcommands registered on this command, sorted by name.
    pub fn public_subcommands(&self) -> impl Iterator<Item = &Command> {
        self.public_subcommands.values()
    }

    /// Message of the most recent failed run, cleared by a successful one.
    pub fn last_error(&self) -> Option<String> {
        self.last_error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub(crate) fn record_outcome(&self, outcome: Result<(), &CommandError>) {
        let message = outcome.err().map(ToString::to_string);
        *self.last_error.lock().unwrap_or_else(PoisonError::into_inner) = message;

        if let (Err(err), Some(handler)) = (outcome, &self.fault_handler) {
            handler.on_fault(err);
        }
    }
}

fn insert_command(
    map: &mut BTreeMap<String, Command>,
    parent: &str,
    sub: Command,
    what: &str,
) -> Result<(), DefinitionError> {
    if !is_command_segment(&sub.name) {
        return Err(DefinitionError::InvalidCommandName(sub.name));
    }
    if let Some(previous) = map.insert(sub.name.clone(), sub) {
        warn!(parent = %parent, name = %previous.name, "replacing previously registered {what}");
    }
    Ok(())
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("has_action", &self.action.is_some())
            .field("options", &self.options)
            .field("subcommands", &self.subcommands)
            .field("public_subcommands", &self.public_subcommands)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::option::OptionValue;

    #[test]
    fn test_subcommand_replaced_on_collision() {
        let mut root = Command::new("app");
        root.add_subcommand(Command::new("start").with_description("old"))
            .unwrap();
        root.add_subcommand(Command::new("start").with_description("new"))
            .unwrap();

        assert_eq!(root.subcommands().count(), 1);
        assert_eq!(root.subcommand("start").unwrap().description(), Some("new"));
    }

    #[test]
    fn test_rejects_unreachable_subcommand_names() {
        let mut root = Command::new("app");
        assert_eq!(
            root.add_subcommand(Command::new("v2")),
            Err(DefinitionError::InvalidCommandName("v2".to_string()))
        );
        assert_eq!(
            root.add_public_subcommand(Command::new("")),
            Err(DefinitionError::InvalidCommandName(String::new()))
        );
    }

    #[test]
    fn test_option_collision_discards_previous() {
        let cmd = Command::new("start")
            .with_option(CmdOption::int(Some("port"), Some('p')).with_default(1))
            .unwrap()
            .with_option(CmdOption::boolean(Some("enable"), Some('e')))
            .unwrap()
            .with_option(CmdOption::int(Some("listen"), Some('p')).with_default(2))
            .unwrap();

        let names: Vec<_> = cmd.options().iter().map(CmdOption::display_name).collect();
        assert_eq!(names, vec!["--enable", "--listen"]);
        assert_eq!(cmd.option("p").unwrap().value(), Some(&OptionValue::Int(2)));
        assert!(cmd.option("port").is_none());
    }

    #[test]
    fn test_add_option_propagates_definition_errors() {
        let mut cmd = Command::new("start");
        assert_eq!(
            cmd.add_option(CmdOption::string(None, None)),
            Err(DefinitionError::MissingOptionName)
        );
        assert!(cmd.options().is_empty());
    }

    #[test]
    fn test_record_outcome_sets_and_clears_last_error() {
        let root = Command::new("app");
        root.record_outcome(Err(&CommandError::CommandNotFound("x".into())));
        assert_eq!(root.last_error().as_deref(), Some("command not found: x"));

        root.record_outcome(Ok(()));
        assert_eq!(root.last_error(), None);
    }
}
