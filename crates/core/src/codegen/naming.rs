//! Identifier grammar and the name transformations used in generated files.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

use super::error::ValidationError;

// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_-]*$").expect("constant regex pattern is valid"));

/// Which identifier is being validated. Only changes the error wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameKind {
    Agent,
    Domain,
}

impl fmt::Display for NameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameKind::Agent => f.write_str("Agent"),
            NameKind::Domain => f.write_str("Domain"),
        }
    }
}

/// Check `name` against `^[a-z][a-z0-9_-]*$`.
///
/// # Example
/// ```
/// use ak_core::codegen::naming::{validate_name, NameKind};
///
/// assert!(validate_name("joke_agent", NameKind::Agent).is_ok());
/// assert!(validate_name("JokeAgent", NameKind::Agent).is_err());
/// ```
pub fn validate_name(name: &str, kind: NameKind) -> Result<(), ValidationError> {
    if name.is_empty() {
        return Err(ValidationError::EmptyName(kind));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(ValidationError::InvalidName {
            kind,
            name: name.to_string(),
        });
    }
    Ok(())
}

pub fn validate_agent_name(name: &str) -> Result<(), ValidationError> {
    validate_name(name, NameKind::Agent)
}

pub fn validate_domain_name(name: &str) -> Result<(), ValidationError> {
    validate_name(name, NameKind::Domain)
}

/// Human-readable agent name: `"joke_agent"` becomes `"Joke Agent"`.
pub fn display_name(agent_name: &str) -> String {
    agent_name
        .replace('_', "-")
        .split('-')
        .map(capitalize)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Hyphenated form used in file names: `"joke_agent"` becomes `"joke-agent"`.
pub fn file_stem(agent_name: &str) -> String {
    agent_name.replace('_', "-")
}

/// Title case where every letter following a non-letter is uppercased and
/// every other letter lowercased (`"sample-agent2x"` becomes `"Sample-Agent2X"`).
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_cased = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_cased = true;
        } else {
            out.push(ch);
            previous_cased = false;
        }
    }
    out
}

/// Whether `name` can be used as a Python function name.
pub fn is_python_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first == '_' || first.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
