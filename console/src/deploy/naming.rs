//! App name derivation and validation

use std::fmt;

use serde::{Serialize, Serializer};

use crate::errors::ConsoleError;

/// Derive a candidate app name from a bundle file name
///
/// Never fails; the result may be empty and must still go through
/// [`AppName::parse`].
pub fn suggest(file_name: &str) -> String {
    let stem = strip_zip_suffix(file_name).unwrap_or(file_name);

    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        let c = if c.is_ascii_alphanumeric() || c == '-' {
            c.to_ascii_lowercase()
        } else {
            '-'
        };
        if c == '-' && out.ends_with('-') {
            continue;
        }
        out.push(c);
    }

    out.trim_matches('-').to_string()
}

/// The name without its `.zip` suffix, if it has one (any case)
pub(crate) fn strip_zip_suffix(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(4)?;
    if !file_name.is_char_boundary(split) {
        return None;
    }
    let (stem, ext) = file_name.split_at(split);
    ext.eq_ignore_ascii_case(".zip").then_some(stem)
}

/// A validated application identifier
///
/// One lowercase alphanumeric character, or a run of lowercase alphanumerics
/// and hyphens that neither starts nor ends with a hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AppName(String);

impl AppName {
    /// Validate operator input; surrounding whitespace is ignored
    pub fn parse(input: &str) -> Result<Self, ConsoleError> {
        let name = input.trim();
        if name.is_empty() {
            return Err(ConsoleError::InvalidName("app name is required".to_string()));
        }

        let allowed = |c: char| c.is_ascii_lowercase() || c.is_ascii_digit();
        let valid = name.chars().all(|c| allowed(c) || c == '-')
            && !name.starts_with('-')
            && !name.ends_with('-');

        if !valid {
            return Err(ConsoleError::InvalidName(format!(
                "'{}': only lowercase letters, digits and hyphens; must not start or end with a hyphen",
                name
            )));
        }

        Ok(Self(name.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AppName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for AppName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for AppName {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}
