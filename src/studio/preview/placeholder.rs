//! `#{key}` placeholder substitution for the live preview.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::studio::core::errors::StudioResult;

/// Matches one placeholder token and captures its key.
const TOKEN_PATTERN: &str = r"#\{([^{}]+)\}";

/// Substitutes variable values into a template body.
///
/// Tokens are located once and looked up by their literal key, so keys never
/// act as patterns and substituted values are not scanned again.
#[derive(Clone, Debug)]
pub struct PlaceholderRenderer {
    pattern: Regex,
}

impl PlaceholderRenderer {
    /// Compile the token pattern.
    ///
    /// # Errors
    /// Returns an error if the pattern fails to compile.
    pub fn new() -> StudioResult<Self> {
        Ok(Self {
            pattern: Regex::new(TOKEN_PATTERN)?,
        })
    }

    /// Replace every `#{key}` whose value is non-empty. Other tokens stay as-is.
    #[must_use]
    pub fn render(&self, body: &str, values: &HashMap<String, String>) -> String {
        self.pattern
            .replace_all(body, |caps: &Captures<'_>| {
                values
                    .get(&caps[1])
                    .filter(|value| !value.is_empty())
                    .map_or_else(|| caps[0].to_string(), Clone::clone)
            })
            .into_owned()
    }

}
