//! Usage text rendering.
//!
//! Usage is rendered for a command in the context of the chain of commands
//! that led to it, so public subcommands show the path they were actually
//! reached through and list the public subcommands inherited along it.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::command::Command;
use crate::option::CmdOption;

/// Layout settings for usage text.
///
/// # Examples
///
/// ```
/// use cmdtree_core::HelpConfig;
///
/// let config = HelpConfig::default();
/// assert_eq!(config.column_width, 24);
/// assert!(config.show_env);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelpConfig {
    /// Width of the name column in the `COMMANDS:` and `OPTIONS:` blocks.
    pub column_width: usize,
    /// Spaces before section headers; entries get twice as many.
    pub indent: usize,
    /// Append `[env: VAR]` to options bound to an environment variable.
    pub show_env: bool,
    /// Append `(default: value)` to options with a default.
    pub show_defaults: bool,
}

impl Default for HelpConfig {
    fn default() -> Self {
        Self {
            column_width: 24,
            indent: 2,
            show_env: true,
            show_defaults: true,
        }
    }
}

/// Returns the last non-empty segment of a program path.
///
/// A path with no non-empty segment (such as `/`) is returned unchanged.
///
/// # Examples
///
/// ```
/// use cmdtree_core::usage::program_name;
///
/// assert_eq!(program_name("/usr/local/bin/server"), "server");
/// assert_eq!(program_name("server"), "server");
/// assert_eq!(program_name("bin/server/"), "server");
/// ```
pub fn program_name(path: &str) -> &str {
    let separators: &[char] = if cfg!(windows) { &['/', '\\'] } else { &['/'] };
    path.rsplit(separators)
        .find(|segment| !segment.is_empty())
        .unwrap_or(path)
}

/// Space-separated path from the program name to the last command of `chain`.
pub(crate) fn command_path(program: &str, chain: &[&Command]) -> String {
    let mut path = program.to_string();
    for command in chain.iter().skip(1) {
        path.push(' ');
        path.push_str(command.name());
    }
    path
}

/// Subcommands reachable from the last command of `chain`, by name.
///
/// Own subcommands come first, then public subcommands walking outward to
/// the root; a name already seen is never overwritten. The command itself
/// is excluded.
pub(crate) fn visible_subcommands<'a>(chain: &[&'a Command]) -> BTreeMap<&'a str, &'a Command> {
    let mut visible = BTreeMap::new();
    let Some(&current) = chain.last() else {
        return visible;
    };

    for sub in current.subcommands() {
        visible.insert(sub.name(), sub);
    }
    for ancestor in chain.iter().rev() {
        for sub in ancestor.public_subcommands() {
            visible.entry(sub.name()).or_insert(sub);
        }
    }

    visible.retain(|_, sub| !std::ptr::eq(*sub, current));
    visible
}

/// Renders usage text for the last command of `chain`.
///
/// The layout is taken from the root of the chain.
pub(crate) fn render_usage(program: &str, chain: &[&Command]) -> String {
    let Some((&current, _)) = chain.split_last() else {
        return String::new();
    };
    let config = chain[0].help_config();
    let header_pad = " ".repeat(config.indent);
    let entry_pad = " ".repeat(config.indent * 2);
    let subcommands = visible_subcommands(chain);

    let mut out = String::new();
    if let Some(desc) = current.description() {
        let _ = writeln!(out, "{desc}\n");
    }

    let _ = write!(out, "Usage: {}", command_path(program, chain));
    if !subcommands.is_empty() {
        out.push_str(" [COMMAND]");
    }
    if !current.options().is_empty() {
        out.push_str(" [OPTIONS]");
    }
    out.push('\n');

    if !subcommands.is_empty() {
        let _ = writeln!(out, "\n{header_pad}COMMANDS:");
        for (name, sub) in &subcommands {
            let line = column(name, sub.description().unwrap_or_default(), config.column_width);
            let _ = writeln!(out, "{entry_pad}{line}");
        }
    }

    if !current.options().is_empty() {
        let _ = writeln!(out, "\n{header_pad}OPTIONS:");
        for option in current.options() {
            let line = column(&option_label(option), &option_details(option, config), config.column_width);
            let _ = writeln!(out, "{entry_pad}{line}");
        }
    }

    out
}

fn column(label: &str, text: &str, width: usize) -> String {
    if text.is_empty() {
        return label.to_string();
    }
    if label.len() + 2 > width {
        format!("{label}  {text}")
    } else {
        format!("{label:<width$}{text}")
    }
}

fn option_label(option: &CmdOption) -> String {
    match (option.short(), option.long()) {
        (Some(short), Some(long)) => format!("-{short}, --{long}"),
        (Some(short), None) => format!("-{short}"),
        (None, Some(long)) => format!("    --{long}"),
        (None, None) => String::new(),
    }
}

fn option_details(option: &CmdOption, config: &HelpConfig) -> String {
    let mut parts = Vec::new();
    if let Some(desc) = option.description() {
        parts.push(desc.to_string());
    }
    parts.push(if option.is_required() { "[Required]" } else { "[Optional]" }.to_string());
    if config.show_defaults && !option.is_required() {
        if let Some(value) = option.value() {
            parts.push(format!("(default: {value})"));
        }
    }
    if config.show_env {
        if let Some(env) = option.env() {
            parts.push(format!("[env: {env}]"));
        }
    }
    parts.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree() -> Command {
        let start = Command::new("start")
            .with_description("Start the server")
            .with_option(
                CmdOption::int(Some("port"), Some('p'))
                    .with_description("Port to listen on")
                    .with_env("PORT")
                    .with_default(88),
            )
            .unwrap()
            .with_option(CmdOption::string(Some("name"), None))
            .unwrap();

        Command::new("")
            .with_description("Demo server")
            .with_subcommand(start)
            .unwrap()
            .with_public_subcommand(Command::new("help").with_description("Show help"))
            .unwrap()
    }

    #[test]
    fn test_program_name_strips_directories() {
        assert_eq!(program_name("./target/debug/app"), "app");
        assert_eq!(program_name("app/"), "app");
        assert_eq!(program_name("/"), "/");
    }

    #[test]
    fn test_root_usage_lists_commands() {
        let root = tree();
        let usage = render_usage("server", &[&root]);
        let expected = "Demo server\n\
                        \n\
                        Usage: server [COMMAND]\n\
                        \n  COMMANDS:\n    \
                        help                    Show help\n    \
                        start                   Start the server\n";
        assert_eq!(usage, expected);
    }

    #[test]
    fn test_subcommand_usage_lists_options_and_inherited_public() {
        let root = tree();
        let start = root.subcommand("start").unwrap();
        let usage = render_usage("server", &[&root, start]);

        assert!(usage.starts_with("Start the server\n\nUsage: server start [COMMAND] [OPTIONS]\n"));
        assert!(usage.contains("    help                    Show help\n"));
        assert!(usage.contains(
            "    -p, --port              Port to listen on [Optional] (default: 88) [env: PORT]\n"
        ));
        assert!(usage.contains("        --name              [Required]\n"));
    }

    #[test]
    fn test_public_subcommand_excludes_itself() {
        let root = tree();
        let start = root.subcommand("start").unwrap();
        let help = root.public_subcommand("help").unwrap();
        let usage = render_usage("server", &[&root, start, help]);

        assert!(usage.starts_with("Show help\n\nUsage: server start help\n"));
        assert!(!usage.contains("COMMANDS:"));
    }

    #[test]
    fn test_visible_subcommands_prefers_own_and_nearest() {
        let inner = Command::new("inner")
            .with_subcommand(Command::new("status").with_description("own"))
            .unwrap()
            .with_public_subcommand(Command::new("version").with_description("near"))
            .unwrap();
        let root = Command::new("app")
            .with_subcommand(inner)
            .unwrap()
            .with_public_subcommand(Command::new("status").with_description("root"))
            .unwrap()
            .with_public_subcommand(Command::new("version").with_description("far"))
            .unwrap();
        let inner = root.subcommand("inner").unwrap();

        let visible = visible_subcommands(&[&root, inner]);
        let described: Vec<_> = visible
            .iter()
            .map(|(name, sub)| (*name, sub.description().unwrap_or_default()))
            .collect();
        assert_eq!(described, vec![("status", "own"), ("version", "near")]);
    }

    #[test]
    fn test_hidden_env_and_defaults() {
        let config = HelpConfig {
            show_env: false,
            show_defaults: false,
            ..HelpConfig::default()
        };
        let option = CmdOption::boolean(Some("verbose"), Some('v'))
            .with_env("VERBOSE")
            .with_default(false);
        assert_eq!(option_details(&option, &config), "[Optional]");
    }
}
