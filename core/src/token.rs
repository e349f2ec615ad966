//! Raw argument classification.
//!
//! Stateless predicates that decide whether a token names a subcommand or an
//! option, plus the literal checks used during value coercion. Only ASCII
//! letters count as alphabetic; everything else is treated as punctuation.

/// Classification of a single raw argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Letters only, e.g. `start`.
    CommandSegment,
    /// `-` followed by a letter, e.g. `-p` or `-abc`.
    ShortOption,
    /// `--` followed by a letter, e.g. `--port=80`.
    LongOption,
    /// Anything else (values, numbers, `-`, `--`, empty strings).
    Other,
}

/// Classifies a raw argument.
///
/// # Examples
///
/// ```
/// use cmdtree_core::token::{TokenKind, classify};
///
/// assert_eq!(classify("start"), TokenKind::CommandSegment);
/// assert_eq!(classify("-ep"), TokenKind::ShortOption);
/// assert_eq!(classify("--port=80"), TokenKind::LongOption);
/// assert_eq!(classify("80"), TokenKind::Other);
/// ```
pub fn classify(token: &str) -> TokenKind {
    if is_command_segment(token) {
        TokenKind::CommandSegment
    } else if is_long_option(token) {
        TokenKind::LongOption
    } else if is_short_option(token) {
        TokenKind::ShortOption
    } else {
        TokenKind::Other
    }
}

/// Returns `true` if `token` is non-empty and made of ASCII letters only.
///
/// Every character is checked; `a1b2` is not a command segment.
pub fn is_command_segment(token: &str) -> bool {
    !token.is_empty() && token.chars().all(|ch| ch.is_ascii_alphabetic())
}

/// Returns `true` if `token` starts with `-`.
///
/// Used to decide whether the token after an option may be taken as its value.
pub fn is_option_token(token: &str) -> bool {
    token.starts_with('-')
}

/// Returns `true` for `--` followed by an ASCII letter.
pub fn is_long_option(token: &str) -> bool {
    token
        .strip_prefix("--")
        .and_then(|rest| rest.chars().next())
        .is_some_and(|ch| ch.is_ascii_alphabetic())
}

/// Returns `true` for a single `-` followed by an ASCII letter.
pub fn is_short_option(token: &str) -> bool {
    !is_long_option(token)
        && token
            .strip_prefix('-')
            .and_then(|rest| rest.chars().next())
            .is_some_and(|ch| ch.is_ascii_alphabetic())
}

/// Returns `true` if `value` is non-empty and all ASCII digits.
pub fn is_integer_literal(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

/// Returns `true` for digits with at most one interior decimal point.
///
/// # Examples
///
/// ```
/// use cmdtree_core::token::is_float_literal;
///
/// assert!(is_float_literal("3.14"));
/// assert!(is_float_literal("42"));
/// assert!(!is_float_literal(".5"));
/// assert!(!is_float_literal("5."));
/// assert!(!is_float_literal("1.2.3"));
/// ```
pub fn is_float_literal(value: &str) -> bool {
    let bytes = value.as_bytes();
    if bytes.is_empty() || bytes[0] == b'.' || bytes[bytes.len() - 1] == b'.' {
        return false;
    }

    let mut points = 0;
    for &b in bytes {
        if b == b'.' {
            points += 1;
            if points > 1 {
                return false;
            }
        } else if !b.is_ascii_digit() {
            return false;
        }
    }
    true
}

/// Splits an option token into its name and optional inline value.
///
/// Long options (`is_short == false`) accept `--name=value`; the value must
/// be non-empty. Short options never carry inline values, so any `=` in a
/// short token is rejected; the returned name of a short token is the whole
/// cluster (`-abc` yields `abc`). Returns `None` if the token is malformed
/// or carries no name.
///
/// # Examples
///
/// ```
/// use cmdtree_core::token::split_option_name_value;
///
/// assert_eq!(split_option_name_value(false, "--port=80"), Some(("port", Some("80"))));
/// assert_eq!(split_option_name_value(false, "--port"), Some(("port", None)));
/// assert_eq!(split_option_name_value(false, "--port="), None);
/// assert_eq!(split_option_name_value(true, "-ep"), Some(("ep", None)));
/// assert_eq!(split_option_name_value(true, "-p=80"), None);
/// ```
pub fn split_option_name_value(is_short: bool, token: &str) -> Option<(&str, Option<&str>)> {
    let prefix = if is_short { "-" } else { "--" };
    let body = token.strip_prefix(prefix)?;

    match body.find('=') {
        Some(_) if is_short => None,
        Some(0) => None,
        Some(idx) => {
            let value = &body[idx + 1..];
            if value.is_empty() {
                None
            } else {
                Some((&body[..idx], Some(value)))
            }
        }
        None if body.is_empty() => None,
        None => Some((body, None)),
    }
}
