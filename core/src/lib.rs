//! Command tree argument resolution.
//!
//! This crate turns a raw argument vector into a selected command and a
//! validated set of typed option values, then runs the command's action:
//!
//! - [`Command`] — a tree node owning options, ordinary subcommands and
//!   public subcommands (visible from every command below the one that
//!   registers them).
//! - [`CmdOption`] — a typed option (`bool`, `int`, `float`, `string`) with
//!   long/short names, an optional environment variable and an optional
//!   default.
//! - [`Invocation`] — the resolved command, the chain of commands that led
//!   to it, and the resolved option values; passed to each [`Action`].
//! - [`CommandError`] — the single error a failed run produces.
//!
//! Option values are layered: defaults, then environment variables, then
//! arguments. Short options cluster (`-ep 88`), long options take values
//! inline (`--port=88`) or from the next token (`--port 88`).
//!
//! # Example
//!
//! ```
//! use cmdtree_core::{CmdOption, Command, DefinitionError};
//!
//! let start = Command::new("start")
//!     .with_description("Start the server")
//!     .with_option(CmdOption::int(Some("port"), Some('p')).with_default(88))?
//!     .with_option(CmdOption::boolean(Some("enable"), Some('e')).with_default(false))?;
//!
//! let root = Command::new("server")
//!     .with_subcommand(start)?
//!     .with_public_subcommand(Command::new("help").with_description("Show help"))?;
//!
//! let inv = root.resolve(["server", "start", "-e"]).unwrap();
//! assert_eq!(inv.get_int("port"), Some(88));
//! assert_eq!(inv.get_bool("enable"), Some(true));
//!
//! // `help` is public, so it is reachable below `start` as well.
//! let inv = root.resolve(["server", "start", "help"]).unwrap();
//! assert_eq!(inv.path(), "server start help");
//! # Ok::<(), DefinitionError>(())
//! ```

mod command;
mod describe;
mod error;
mod option;
mod resolve;
mod setup;
pub mod token;
pub mod usage;

pub use command::{Action, Command, FaultHandler};
pub use describe::{CommandDescriptor, OptionDescriptor};
pub use error::{CommandError, DefinitionError, Result, ValueSource};
pub use option::{CmdOption, OptionKind, OptionValue};
pub use resolve::Invocation;
pub use setup::{Environment, ProcessEnv};
pub use usage::HelpConfig;
