//! Typed option definitions and value coercion.
//!
//! A [`CmdOption`] describes one named, typed value of a command. It starts
//! out required; supplying a default makes it optional and gives it a value
//! before any parsing happens.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::DefinitionError;
use crate::token::{is_float_literal, is_integer_literal};

/// Declared type of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionKind {
    /// `true`/`false` switch; a bare flag means `true`.
    Bool,
    /// Decimal integer (`i64`).
    Int,
    /// Decimal floating point (`f64`).
    Float,
    /// Non-empty text.
    String,
}

impl OptionKind {
    /// Coerces a raw string into a value of this kind.
    ///
    /// Returns `None` when the string is not acceptable. Bool coercion never
    /// fails: the empty string, `true` and `TRUE` are true, anything else is
    /// false.
    ///
    /// # Examples
    ///
    /// ```
    /// use cmdtree_core::{OptionKind, OptionValue};
    ///
    /// assert_eq!(OptionKind::Bool.coerce(""), Some(OptionValue::Bool(true)));
    /// assert_eq!(OptionKind::Bool.coerce("TRUE"), Some(OptionValue::Bool(true)));
    /// assert_eq!(OptionKind::Bool.coerce("no"), Some(OptionValue::Bool(false)));
    /// assert_eq!(OptionKind::Int.coerce("88"), Some(OptionValue::Int(88)));
    /// assert_eq!(OptionKind::Int.coerce("abc"), None);
    /// assert_eq!(OptionKind::String.coerce(""), None);
    /// ```
    pub fn coerce(self, raw: &str) -> Option<OptionValue> {
        match self {
            Self::Bool => Some(OptionValue::Bool(matches!(raw, "" | "true" | "TRUE"))),
            Self::Int => {
                if !is_integer_literal(raw) {
                    return None;
                }
                raw.parse().ok().map(OptionValue::Int)
            }
            Self::Float => {
                if !is_float_literal(raw) {
                    return None;
                }
                raw.parse()
                    .ok()
                    .filter(|v: &f64| v.is_finite())
                    .map(OptionValue::Float)
            }
            Self::String => {
                if raw.is_empty() {
                    None
                } else {
                    Some(OptionValue::Text(raw.to_string()))
                }
            }
        }
    }
}

impl fmt::Display for OptionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::String => "string",
        };
        f.write_str(name)
    }
}

/// A resolved option value, tagged by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    /// Value of a [`OptionKind::Bool`] option.
    Bool(bool),
    /// Value of a [`OptionKind::Int`] option.
    Int(i64),
    /// Value of a [`OptionKind::Float`] option; always finite.
    Float(f64),
    /// Value of a [`OptionKind::String`] option; never empty.
    Text(String),
}

impl OptionValue {
    /// The option kind this value belongs to.
    pub fn kind(&self) -> OptionKind {
        match self {
            Self::Bool(_) => OptionKind::Bool,
            Self::Int(_) => OptionKind::Int,
            Self::Float(_) => OptionKind::Float,
            Self::Text(_) => OptionKind::String,
        }
    }

    /// The value if this is a bool.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// The value if this is an int.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// The value if this is a float.
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// The text if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Text(v) => f.write_str(v),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for OptionValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// A typed, named option of a command.
///
/// Create one with [`boolean`](CmdOption::boolean), [`int`](CmdOption::int),
/// [`float`](CmdOption::float) or [`string`](CmdOption::string), chain the
/// builder methods, then register it with
/// [`Command::add_option`](crate::Command::add_option).
///
/// # Examples
///
/// ```
/// use cmdtree_core::{CmdOption, OptionKind};
///
/// let port = CmdOption::int(Some("port"), Some('p'))
///     .with_env("APP_PORT")
///     .with_description("Port to listen on")
///     .with_default(88);
///
/// assert_eq!(port.kind(), OptionKind::Int);
/// assert!(port.has_value());
/// assert!(!port.is_required());
/// assert_eq!(port.display_name(), "--port");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CmdOption {
    kind: OptionKind,
    long: Option<String>,
    short: Option<char>,
    env: Option<String>,
    description: Option<String>,
    required: bool,
    value: Option<OptionValue>,
}

impl CmdOption {
    /// Creates a required option of the given kind.
    ///
    /// Empty long names are treated as absent. Names are validated when the
    /// option is registered on a command.
    pub fn new(kind: OptionKind, long: Option<&str>, short: Option<char>) -> Self {
        Self {
            kind,
            long: long.filter(|name| !name.is_empty()).map(String::from),
            short,
            env: None,
            description: None,
            required: true,
            value: None,
        }
    }

    pub fn boolean(long: Option<&str>, short: Option<char>) -> Self {
        Self::new(OptionKind::Bool, long, short)
    }

    pub fn int(long: Option<&str>, short: Option<char>) -> Self {
        Self::new(OptionKind::Int, long, short)
    }

    pub fn float(long: Option<&str>, short: Option<char>) -> Self {
        Self::new(OptionKind::Float, long, short)
    }

    pub fn string(long: Option<&str>, short: Option<char>) -> Self {
        Self::new(OptionKind::String, long, short)
    }

    /// Binds an environment variable consulted before the arguments.
    pub fn with_env(mut self, var: &str) -> Self {
        self.env = Some(var.to_string()).filter(|var| !var.is_empty());
        self
    }

    /// Adds a description shown in usage text.
    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Sets a default value; the option is no longer required.
    ///
    /// The value's type is checked against the option kind on registration.
    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.value = Some(value.into());
        self.required = false;
        self
    }

    pub fn kind(&self) -> OptionKind {
        self.kind
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn short(&self) -> Option<char> {
        self.short
    }

    pub fn env(&self) -> Option<&str> {
        self.env.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// `true` until a default is supplied.
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// `true` once a default or parsed value has been assigned.
    pub fn has_value(&self) -> bool {
        self.value.is_some()
    }

    pub fn value(&self) -> Option<&OptionValue> {
        self.value.as_ref()
    }

    /// `--long` if a long name exists, `-s` otherwise.
    pub fn display_name(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => format!("--{long}"),
            (None, Some(short)) => format!("-{short}"),
            (None, None) => "<unnamed>".to_string(),
        }
    }

    /// Returns `true` if `name` equals the long name or the short name.
    pub fn matches(&self, name: &str) -> bool {
        if self.long.as_deref() == Some(name) {
            return true;
        }
        let mut chars = name.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.short == Some(ch),
            _ => false,
        }
    }

    /// Returns `true` if both options claim the same long or short name.
    pub(crate) fn collides_with(&self, other: &CmdOption) -> bool {
        (self.long.is_some() && self.long == other.long)
            || (self.short.is_some() && self.short == other.short)
    }

    /// Coerces `raw` and stores it. Returns `false` if coercion fails.
    pub(crate) fn assign(&mut self, raw: &str) -> bool {
        match self.kind.coerce(raw) {
            Some(value) => {
                self.value = Some(value);
                true
            }
            None => false,
        }
    }

    /// Checks names and the default's type before registration.
    pub(crate) fn validate(&mut self) -> Result<(), DefinitionError> {
        if self.long.is_none() && self.short.is_none() {
            return Err(DefinitionError::MissingOptionName);
        }

        if let Some(long) = &self.long {
            let starts_with_letter = long.chars().next().is_some_and(|ch| ch.is_ascii_alphabetic());
            if !starts_with_letter || long.contains('=') {
                return Err(DefinitionError::InvalidLongName(long.clone()));
            }
        }

        if let Some(short) = self.short {
            if !short.is_ascii_alphabetic() {
                return Err(DefinitionError::InvalidShortName(short));
            }
        }

        if let Some(OptionValue::Int(v)) = self.value {
            if self.kind == OptionKind::Float {
                self.value = Some(OptionValue::Float(v as f64));
            }
        }

        if let Some(actual) = self.value.as_ref().map(OptionValue::kind) {
            if actual != self.kind {
                return Err(DefinitionError::DefaultTypeMismatch {
                    option: self.display_name(),
                    expected: self.kind,
                    actual,
                });
            }
        }

        Ok(())
    }
}
