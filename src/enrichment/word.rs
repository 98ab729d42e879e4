/*!
 * Word identity and raw input parsing.
 *
 * A [`Word`] is the key shared by every store. Normalization happens exactly
 * here: surrounding whitespace is trimmed, inner whitespace runs collapse to a
 * single space and the text is lowercased. Store loading, input parsing and
 * card lookups all go through [`Word::normalize`].
 */

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Serialize, Serializer};
use std::borrow::Borrow;
use std::fmt;

/// Delimiters accepted between words in a raw batch
static INPUT_DELIMITERS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\n\r,;\t]+").expect("input delimiter pattern is valid")
});

/// A normalized, non-empty vocabulary term
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Word(String);

impl Word {
    /// Normalize raw text into a word, `None` if nothing is left
    pub fn normalize(raw: &str) -> Option<Self> {
        let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.is_empty() {
            return None;
        }
        Some(Self(collapsed.to_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Word {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Word {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl Serialize for Word {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Split a raw batch into normalized words, keeping order and duplicates
pub fn parse_input(text: &str) -> Vec<Word> {
    INPUT_DELIMITERS
        .split(text)
        .filter_map(Word::normalize)
        .collect()
}
