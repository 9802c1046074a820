//! Path pattern matching.
//!
//! # Responsibilities
//! - Compile route patterns into anchored regular expressions
//! - Match a request path in full, never as a substring
//! - Expose positional capture groups as route parameters
//!
//! # Design Decisions
//! - Patterns are wrapped in `^(?:...)$` so alternations stay anchored
//! - Group 0 (the whole match) is never exposed
//! - An unmatched optional group yields an empty string, so positions never shift

use regex::Regex;

use super::RouteError;

/// Positional values captured from a matched path.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<String>);

impl Params {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Value of the capture group at `index` (0 is the first sub-group).
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

/// A compiled, fully anchored path pattern.
#[derive(Debug, Clone)]
pub struct PathPattern {
    source: String,
    regex: Regex,
}

impl PathPattern {
    /// Compile `pattern` so that it must match the entire path.
    pub fn new(pattern: &str) -> Result<Self, RouteError> {
        let regex = Regex::new(&format!("^(?:{})$", pattern)).map_err(|source| {
            RouteError::Pattern {
                pattern: pattern.to_string(),
                source,
            }
        })?;
        Ok(Self {
            source: pattern.to_string(),
            regex,
        })
    }

    /// Pattern text as registered.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Number of exposed capture groups.
    pub fn param_count(&self) -> usize {
        self.regex.captures_len() - 1
    }

    /// Whether `path` matches the pattern in full.
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Captured sub-groups, left to right, or `None` when the path does not match.
    pub fn captures(&self, path: &str) -> Option<Params> {
        let captures = self.regex.captures(path)?;
        let values = captures
            .iter()
            .skip(1)
            .map(|group| group.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();
        Some(Params::new(values))
    }
}
