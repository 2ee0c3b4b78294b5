//! Author formatting policies and the first-author identity check.

use crate::types::Author;
use serde::{Deserialize, Serialize};

/// How author names are rendered; chosen by the ingestion pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthorStyle {
    /// "First Last" (JSON records).
    #[default]
    Full,
    /// "F. Last" (BibTeX entries).
    Abbreviated,
}

/// Format each author according to `style`, preserving order.
pub fn format_authors(authors: &[Author], style: AuthorStyle) -> Vec<String> {
    authors
        .iter()
        .map(|a| match style {
            AuthorStyle::Full => a.display_name(),
            AuthorStyle::Abbreviated => a.abbreviated_name(),
        })
        .collect()
}

/// Join formatted names into one comma-separated line.
pub fn join_authors(names: &[String]) -> String {
    names.join(", ")
}

/// The site owner, as they appear in author lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Identity {
    pub given: String,
    /// Accepted family-name spellings, including footnote-marked variants.
    pub family_variants: Vec<String>,
}

impl Default for Identity {
    fn default() -> Self {
        Self {
            given: "Brian".to_string(),
            family_variants: vec!["Lester".to_string(), "Lester*".to_string()],
        }
    }
}

impl Identity {
    /// Exact match on the given name and one of the family-name variants.
    pub fn matches(&self, author: &Author) -> bool {
        author.first == self.given && self.family_variants.iter().any(|f| *f == author.last)
    }
}

/// True iff the first listed author is `identity`.
pub fn is_first_author(authors: &[Author], identity: &Identity) -> bool {
    authors.first().is_some_and(|a| identity.matches(a))
}
