//! Option value setup for a resolved command.
//!
//! Values are layered: declared defaults first, then environment variables,
//! then command-line arguments. Each later layer overrides the earlier ones.
//! The first bad token or value aborts setup; values already applied stay
//! applied.

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::error::{CommandError, Result, ValueSource};
use crate::option::CmdOption;
use crate::token::{TokenKind, classify, is_option_token, split_option_name_value};

/// Source of environment variables.
///
/// [`ProcessEnv`] reads the real process environment; a `HashMap` can stand
/// in for it when the environment should be controlled.
pub trait Environment {
    /// Returns the variable's value, or `None` if it is unset.
    fn var(&self, name: &str) -> Option<String>;
}

/// The environment of the current process.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl Environment for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl Environment for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).cloned()
    }
}

/// Applies environment variables to every option that names one.
///
/// Unset and empty variables are ignored.
pub(crate) fn apply_environment(options: &mut [CmdOption], env: &dyn Environment) -> Result<()> {
    for option in options.iter_mut() {
        let Some(var) = option.env().map(str::to_string) else {
            continue;
        };
        let Some(raw) = env.var(&var).filter(|raw| !raw.is_empty()) else {
            continue;
        };

        if !option.assign(&raw) {
            return Err(CommandError::MalformedOptionValue {
                option: option.display_name(),
                kind: option.kind(),
                value: raw,
                origin: ValueSource::Environment(var),
            });
        }
        debug!(option = %option.display_name(), env = %var, "applied option from environment");
    }
    Ok(())
}

/// Applies option tokens left to right.
///
/// `--name=value` uses the inline value. Otherwise the following token is
/// taken as the value unless it looks like an option. In a short cluster
/// such as `-abc` only the last letter may take the following token.
pub(crate) fn apply_arguments(options: &mut [CmdOption], args: &[String]) -> Result<()> {
    let mut idx = 0;
    while idx < args.len() {
        let token = args[idx].as_str();
        trace!(token, kind = ?classify(token), "option token");

        let is_short = match classify(token) {
            TokenKind::ShortOption => true,
            TokenKind::LongOption => false,
            _ => return Err(CommandError::InvalidOption(token.to_string())),
        };
        let (name, inline) = split_option_name_value(is_short, token)
            .ok_or_else(|| CommandError::InvalidOption(token.to_string()))?;
        let next = args
            .get(idx + 1)
            .map(String::as_str)
            .filter(|next| !is_option_token(next));

        let mut consumed = false;
        if is_short {
            let mut letters = name.chars().peekable();
            while let Some(letter) = letters.next() {
                let value = if letters.peek().is_none() { next } else { None };
                let mut buf = [0; 4];
                apply_one(options, letter.encode_utf8(&mut buf), "-", value.unwrap_or(""))?;
                consumed = value.is_some();
            }
        } else {
            let value = match inline {
                Some(value) => value,
                None => {
                    consumed = next.is_some();
                    next.unwrap_or("")
                }
            };
            apply_one(options, name, "--", value)?;
        }

        idx += if consumed { 2 } else { 1 };
    }
    Ok(())
}

fn apply_one(options: &mut [CmdOption], name: &str, dashes: &str, raw: &str) -> Result<()> {
    let option = options
        .iter_mut()
        .find(|opt| opt.matches(name))
        .ok_or_else(|| CommandError::UnknownOption(format!("{dashes}{name}")))?;

    if !option.assign(raw) {
        return Err(CommandError::MalformedOptionValue {
            option: option.display_name(),
            kind: option.kind(),
            value: raw.to_string(),
            origin: ValueSource::Argument,
        });
    }
    debug!(option = %option.display_name(), value = raw, "applied option from arguments");
    Ok(())
}

/// Fails on the first required option (in declaration order) without a value.
pub(crate) fn check_required(options: &[CmdOption]) -> Result<()> {
    match options
        .iter()
        .find(|opt| opt.is_required() && !opt.has_value())
    {
        Some(missing) => Err(CommandError::MissingRequiredOption(missing.display_name())),
        None => Ok(()),
    }
}
