//! Error types for command tree construction and argument resolution.
//!
//! [`DefinitionError`] covers mistakes made while building a tree;
//! [`CommandError`] covers everything that can go wrong while resolving an
//! argument vector against a built tree. Resolution stops at the first
//! failure, so a failed `run` yields exactly one [`CommandError`].

use thiserror::Error;

use crate::option::OptionKind;

/// Where a malformed option value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// An environment variable with the given name.
    Environment(String),
    /// A command-line argument.
    Argument,
}

/// Failures detected while resolving an argument vector.
///
/// The `Display` impl produces the message shown to users.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The argument vector was empty (not even a program name).
    #[error("no arguments supplied")]
    NoArguments,
    /// A command-path segment matched no subcommand or visible public subcommand.
    #[error("command not found: {0}")]
    CommandNotFound(String),
    /// A token in option position is not a well-formed option.
    #[error("invalid option: {0}")]
    InvalidOption(String),
    /// A well-formed option names no option of the resolved command.
    #[error("unknown option: {0}")]
    UnknownOption(String),
    /// A value failed type coercion for its option.
    #[error("{}", malformed_message(.option, .kind, .value, .origin))]
    MalformedOptionValue {
        /// Display name of the option (`--long` or `-s`).
        option: String,
        /// Declared kind of the option.
        kind: OptionKind,
        /// The rejected value.
        value: String,
        /// Whether the value came from the environment or the arguments.
        origin: ValueSource,
    },
    /// A required option received no value from defaults, environment or arguments.
    #[error("required option: {0}")]
    MissingRequiredOption(String),
    /// The bound action returned a non-zero result.
    #[error("command '{command}' failed with code {code}")]
    HandlerFailed {
        /// Path of the command whose action failed.
        command: String,
        /// The action's result code.
        code: i32,
    },
    /// Usage text could not be written.
    #[error("failed to write usage: {0}")]
    Output(String),
}

fn malformed_message(option: &str, kind: &OptionKind, value: &str, origin: &ValueSource) -> String {
    match origin {
        ValueSource::Argument => {
            format!("invalid {kind} value for option {option}: '{value}'")
        }
        ValueSource::Environment(var) => {
            format!("invalid {kind} value for option {option} from environment variable {var}: '{value}'")
        }
    }
}

impl CommandError {
    /// Process exit code for this error.
    ///
    /// Always non-zero. A failed action reports its own code.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::CommandError;
    ///
    /// assert_eq!(CommandError::CommandNotFound("x".into()).exit_code(), 2);
    /// let failed = CommandError::HandlerFailed { command: "app".into(), code: 7 };
    /// assert_eq!(failed.exit_code(), 7);
    /// ```
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HandlerFailed { code, .. } if *code != 0 => *code,
            Self::HandlerFailed { .. } => 1,
            _ => 2,
        }
    }
}

/// Errors raised while building a command tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// An option was declared with neither a long nor a short name.
    #[error("option must define a long or short name")]
    MissingOptionName,
    /// A long option name cannot be matched by `--name` syntax.
    #[error("invalid long option name: {0}")]
    InvalidLongName(String),
    /// A short option name is not an ASCII letter.
    #[error("invalid short option name: {0}")]
    InvalidShortName(char),
    /// The default value's type does not match the option kind.
    #[error("default for option {option} must be {expected}, got {actual}")]
    DefaultTypeMismatch {
        /// Display name of the option.
        option: String,
        /// Declared kind of the option.
        expected: OptionKind,
        /// Kind of the supplied default.
        actual: OptionKind,
    },
    /// A subcommand name is not a valid command-path segment.
    #[error("invalid subcommand name: '{0}' (letters only)")]
    InvalidCommandName(String),
}

/// Convenience alias for results with [`CommandError`].
pub type Result<T> = std::result::Result<T, CommandError>;
