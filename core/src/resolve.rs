//! Argument resolution and dispatch.
//!
//! Resolution walks the command tree one command-path segment at a time.
//! The first token that is not a segment ends the walk; it and every token
//! after it are handed to option setup for the command reached. A failure
//! at any depth is returned straight up to the caller of `run`.

use std::io::{self, Write};

use tracing::{debug, trace};

use crate::command::Command;
use crate::error::{CommandError, Result};
use crate::option::{CmdOption, OptionValue};
use crate::setup::{Environment, ProcessEnv, apply_arguments, apply_environment, check_required};
use crate::token::is_command_segment;
use crate::usage::{command_path, program_name, render_usage};

/// A resolved command together with its validated option values.
///
/// Handed to [`Action`](crate::Action)s. The chain runs from the root to the
/// resolved command and acts as its parent chain: a public subcommand's
/// parent is whichever command it was reached from in this invocation.
#[derive(Debug)]
pub struct Invocation<'a> {
    program: String,
    chain: Vec<&'a Command>,
    options: Vec<CmdOption>,
}

impl<'a> Invocation<'a> {
    /// The resolved command.
    pub fn command(&self) -> &'a Command {
        self.chain[self.chain.len() - 1]
    }

    /// The command this one was reached from, if any.
    pub fn parent(&self) -> Option<&'a Command> {
        self.chain.len().checked_sub(2).map(|idx| self.chain[idx])
    }

    /// Commands from the root to the resolved command.
    pub fn chain(&self) -> &[&'a Command] {
        &self.chain
    }

    /// Display name of the root command.
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Space-separated path such as `server start`.
    pub fn path(&self) -> String {
        command_path(&self.program, &self.chain)
    }

    /// Resolved options in declaration order.
    pub fn options(&self) -> &[CmdOption] {
        &self.options
    }

    /// Finds a resolved option by long or short name.
    pub fn option(&self, name: &str) -> Option<&CmdOption> {
        self.options.iter().find(|opt| opt.matches(name))
    }

    pub fn value(&self, name: &str) -> Option<&OptionValue> {
        self.option(name).and_then(CmdOption::value)
    }

    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.value(name).and_then(OptionValue::as_bool)
    }

    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.value(name).and_then(OptionValue::as_int)
    }

    pub fn get_float(&self, name: &str) -> Option<f64> {
        self.value(name).and_then(OptionValue::as_float)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.value(name).and_then(OptionValue::as_str)
    }

    /// Usage text of the resolved command, rendered along this invocation's chain.
    pub fn usage(&self) -> String {
        render_usage(&self.program, &self.chain)
    }

    /// Usage text of the command this one was reached from.
    ///
    /// Handy for a public `help` subcommand that describes its caller.
    pub fn parent_usage(&self) -> Option<String> {
        let len = self.chain.len().checked_sub(1).filter(|len| *len > 0)?;
        Some(render_usage(&self.program, &self.chain[..len]))
    }

    /// Runs the bound action, or writes usage text if there is none.
    fn dispatch(&self, out: &mut dyn Write) -> Result<()> {
        let command = self.command();
        match command.action() {
            Some(action) => {
                debug!(command = %self.path(), "dispatching action");
                let code = action.execute(self);
                if code != 0 {
                    return Err(CommandError::HandlerFailed {
                        command: self.path(),
                        code,
                    });
                }
                Ok(())
            }
            None => {
                debug!(command = %self.path(), "no action bound, printing usage");
                out.write_all(self.usage().as_bytes())
                    .and_then(|()| out.flush())
                    .map_err(|err| CommandError::Output(err.to_string()))
            }
        }
    }
}

impl Command {
    /// Resolves `args` and runs the selected command.
    ///
    /// `args[0]` is the program path. When no action is bound to the
    /// selected command its usage text is printed to stdout. The error of a
    /// failed run is also kept in [`last_error`](Command::last_error) and
    /// passed to the fault handler, if one is registered.
    ///
    /// Option values are resolved into a per-run copy, so the tree is not
    /// modified and may be shared between threads.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use std::sync::atomic::{AtomicI64, Ordering};
    ///
    /// use cmdtree_core::{CmdOption, Command, CommandError};
    ///
    /// let seen = Arc::new(AtomicI64::new(0));
    /// let sink = Arc::clone(&seen);
    /// let start = Command::new("start")
    ///     .with_option(CmdOption::int(Some("port"), Some('p')).with_default(88))?
    ///     .with_action(move |inv| {
    ///         sink.store(inv.get_int("port").unwrap_or_default(), Ordering::SeqCst);
    ///         0
    ///     });
    /// let root = Command::new("server").with_subcommand(start)?;
    ///
    /// root.run(["server", "start", "--port=8080"]).unwrap();
    /// assert_eq!(seen.load(Ordering::SeqCst), 8080);
    ///
    /// let err = root.run(["server", "stop"]).unwrap_err();
    /// assert_eq!(err, CommandError::CommandNotFound("stop".into()));
    /// assert_eq!(root.last_error().as_deref(), Some("command not found: stop"));
    /// # Ok::<(), cmdtree_core::DefinitionError>(())
    /// ```
    pub fn run<I, S>(&self, args: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        self.run_with_output(args, &mut out)
    }

    /// Like [`run`](Self::run), writing usage text to `out`.
    pub fn run_with_output<I, S>(&self, args: I, out: &mut dyn Write) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.run_with_env(args, &ProcessEnv, out)
    }

    /// Like [`run_with_output`](Self::run_with_output), reading variables
    /// from `env` instead of the process environment.
    pub fn run_with_env<I, S>(&self, args: I, env: &dyn Environment, out: &mut dyn Write) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let outcome = self
            .resolve_with_env(args, env)
            .and_then(|invocation| invocation.dispatch(out));
        if let Err(err) = &outcome {
            debug!(error = %err, "run failed");
        }
        self.record_outcome(outcome.as_ref().map(|_| ()));
        outcome
    }

    /// Resolves `args` without running any action.
    ///
    /// # Errors
    ///
    /// Returns the first [`CommandError`] met while walking the tree,
    /// setting up options, or checking required options.
    pub fn resolve<I, S>(&self, args: I) -> Result<Invocation<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_with_env(args, &ProcessEnv)
    }

    /// Like [`resolve`](Self::resolve), reading variables from `env`.
    pub fn resolve_with_env<I, S>(&self, args: I, env: &dyn Environment) -> Result<Invocation<'_>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|arg| arg.as_ref().to_string()).collect();
        let Some(first) = args.first() else {
            return Err(CommandError::NoArguments);
        };

        let program = if self.name().is_empty() {
            program_name(first).to_string()
        } else {
            self.name().to_string()
        };

        let mut chain = vec![self];
        let start = descend(&mut chain, &args, 1)?;

        let current = chain[chain.len() - 1];
        let mut options = current.options().to_vec();
        apply_environment(&mut options, env)?;
        apply_arguments(&mut options, &args[start..])?;
        check_required(&options)?;

        Ok(Invocation {
            program,
            chain,
            options,
        })
    }
}

/// Follows command-path segments from `idx`, pushing each command reached.
///
/// Returns the index of the first option token (or `args.len()`).
fn descend<'a>(chain: &mut Vec<&'a Command>, args: &[String], idx: usize) -> Result<usize> {
    let Some(token) = args.get(idx) else {
        return Ok(idx);
    };
    if !is_command_segment(token) {
        trace!(index = idx, token = %token, "switching to option parsing");
        return Ok(idx);
    }

    let next = find_visible(chain, token).ok_or_else(|| CommandError::CommandNotFound(token.clone()))?;
    debug!(command = %token, depth = chain.len(), "descending");
    chain.push(next);
    descend(chain, args, idx + 1)
}

/// Looks `name` up among the current command's subcommands, then among the
/// public subcommands of the current command and each ancestor, nearest first.
fn find_visible<'a>(chain: &[&'a Command], name: &str) -> Option<&'a Command> {
    let current = chain.last()?;
    current.subcommand(name).or_else(|| {
        chain
            .iter()
            .rev()
            .find_map(|ancestor| ancestor.public_subcommand(name))
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn tree() -> Command {
        let inner = Command::new("inner")
            .with_subcommand(Command::new("leaf").with_description("leaf"))
            .unwrap();
        let start = Command::new("start")
            .with_subcommand(inner)
            .unwrap()
            .with_subcommand(Command::new("help").with_description("own help"))
            .unwrap();
        Command::new("")
            .with_subcommand(start)
            .unwrap()
            .with_subcommand(Command::new("stop"))
            .unwrap()
            .with_public_subcommand(Command::new("help").with_description("public help"))
            .unwrap()
    }

    fn names(invocation: &Invocation<'_>) -> Vec<String> {
        invocation.chain().iter().map(|c| c.name().to_string()).collect()
    }

    #[test]
    fn test_descends_own_subcommands() {
        let root = tree();
        let inv = root.resolve(["/bin/app", "start", "inner", "leaf"]).unwrap();
        assert_eq!(names(&inv), vec!["", "start", "inner", "leaf"]);
        assert_eq!(inv.path(), "app start inner leaf");
        assert_eq!(inv.parent().map(Command::name), Some("inner"));
    }

    #[test]
    fn test_public_subcommand_found_from_descendant() {
        let root = tree();
        let inv = root.resolve(["app", "stop", "help"]).unwrap();
        assert_eq!(inv.command().description(), Some("public help"));
        assert_eq!(inv.parent().map(Command::name), Some("stop"));
        assert_eq!(inv.path(), "app stop help");
    }

    #[test]
    fn test_own_subcommand_shadows_public() {
        let root = tree();
        let inv = root.resolve(["app", "start", "help"]).unwrap();
        assert_eq!(inv.command().description(), Some("own help"));
    }

    #[test]
    fn test_public_subcommand_inherits_lookup_chain() {
        let root = tree();
        let inv = root.resolve(["app", "stop", "help", "help"]).unwrap();
        assert_eq!(names(&inv), vec!["", "stop", "help", "help"]);
    }

    #[test]
    fn test_nearest_public_subcommand_wins() {
        let mid = Command::new("mid")
            .with_subcommand(Command::new("leaf"))
            .unwrap()
            .with_public_subcommand(Command::new("x").with_description("near"))
            .unwrap();
        let root = Command::new("r")
            .with_subcommand(mid)
            .unwrap()
            .with_public_subcommand(Command::new("x").with_description("far"))
            .unwrap();

        let inv = root.resolve(["r", "mid", "leaf", "x"]).unwrap();
        assert_eq!(inv.command().description(), Some("near"));
        assert_eq!(names(&inv), vec!["r", "mid", "leaf", "x"]);

        let inv = root.resolve(["r", "x"]).unwrap();
        assert_eq!(inv.command().description(), Some("far"));
    }

    #[test]
    fn test_program_path_with_trailing_separator() {
        let root = tree();
        let inv = root.resolve(["bin/app/"]).unwrap();
        assert_eq!(inv.program(), "app");
        assert!(inv.usage().contains("Usage: app [COMMAND]"));
    }

    #[test]
    fn test_unknown_segment() {
        let root = tree();
        let err = root.resolve(["app", "start", "bogus"]).unwrap_err();
        assert_eq!(err, CommandError::CommandNotFound("bogus".into()));
    }

    #[test]
    fn test_ordinary_subcommands_are_not_inherited() {
        let root = tree();
        let err = root.resolve(["app", "start", "stop"]).unwrap_err();
        assert_eq!(err, CommandError::CommandNotFound("stop".into()));
    }

    #[test]
    fn test_empty_arguments() {
        let root = tree();
        let err = root.resolve(Vec::<String>::new()).unwrap_err();
        assert_eq!(err, CommandError::NoArguments);
    }

    #[test]
    fn test_explicit_root_name_wins_over_program_path() {
        let root = Command::new("server");
        let inv = root.resolve(["/opt/bin/srv"]).unwrap();
        assert_eq!(inv.program(), "server");
        assert_eq!(inv.path(), "server");
    }

    #[test]
    fn test_non_segment_token_starts_options() {
        let root = tree();
        let err = root.resolve(["app", "start", "8080"]).unwrap_err();
        assert_eq!(err, CommandError::InvalidOption("8080".into()));
    }

    #[test]
    fn test_bool_option_consumes_following_segment() {
        let root = Command::new("app")
            .with_option(CmdOption::boolean(Some("verbose"), Some('v')).with_default(false))
            .unwrap()
            .with_subcommand(Command::new("start"))
            .unwrap();
        // `-v` takes `start` as its value, leaving nothing behind.
        let inv = root.resolve(["app", "-v", "start"]).unwrap();
        assert_eq!(inv.command().name(), "app");
        assert_eq!(inv.get_bool("verbose"), Some(false));
    }

    #[test]
    fn test_environment_is_read_for_resolved_command_only() {
        let root = Command::new("app")
            .with_subcommand(
                Command::new("start")
                    .with_option(CmdOption::int(Some("port"), None).with_env("APP_PORT"))
                    .unwrap(),
            )
            .unwrap();
        let env: HashMap<String, String> =
            [("APP_PORT".to_string(), "9000".to_string())].into_iter().collect();

        let inv = root.resolve_with_env(["app", "start"], &env).unwrap();
        assert_eq!(inv.get_int("port"), Some(9000));
        assert!(root.subcommand("start").unwrap().option("port").unwrap().value().is_none());
    }

    #[test]
    fn test_parent_usage_describes_caller() {
        let root = tree();
        let inv = root.resolve(["app", "stop", "help"]).unwrap();
        let usage = inv.parent_usage().unwrap();
        assert!(usage.starts_with("Usage: app stop [COMMAND]\n"));

        let inv = root.resolve(["app"]).unwrap();
        assert_eq!(inv.parent_usage(), None);
    }

    #[test]
    fn test_usage_printed_without_action() {
        let root = tree();
        let mut out = Vec::new();
        root.run_with_output(["app", "stop"], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Usage: app stop [COMMAND]\n"));
        assert!(text.contains("help"));
    }
}
