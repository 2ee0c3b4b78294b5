//! Public types for the publication model.
//!
//! Every field that may be missing from a source record is an `Option`;
//! `None` is the only absent representation.

use serde::{Deserialize, Serialize};

/// A normalized publication, identical in shape for both ingestion pipelines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    /// Record key (`refkey` or BibTeX citation key).
    pub id: String,
    /// Handle used by the presentation layer to open the detail view.
    pub detail_id: String,
    /// Title as written, possibly containing inline markup.
    pub title: String,
    /// Title with `<samp>` tags removed.
    pub raw_title: String,
    /// Formatted author names, in publication order. Never empty.
    pub authors: Vec<String>,
    /// Conference or journal name.
    pub venue: String,
    /// Whether `venue` is on the top-tier allowlist.
    pub is_top_tier: bool,
    pub year: i32,
    /// Landing page link with the trailing slash stripped.
    pub link: String,
    /// Best-effort direct (PDF) link.
    pub direct_link: String,
    /// Number of citations; `None` means unknown and ranks last.
    pub citation_count: Option<u64>,
    /// Whether the first author is the site owner.
    pub is_first_author: bool,
    /// Raw BibTeX text, shown verbatim and copied to the clipboard.
    pub bibtex_source: Option<String>,
    pub workshop: Option<String>,
    pub location: Option<String>,
    pub code: Option<String>,
    pub video: Option<String>,
    pub poster: Option<String>,
    pub slides: Option<String>,
    /// Where the raw BibTeX text is loaded from.
    pub bibtex_location: Option<String>,
    /// Date of the bundled citation count; cleared once a live count arrives.
    pub fallback_citation_count_date: Option<String>,
    /// Semantic Scholar paper id used for live citation lookups.
    pub semantic_scholar_id: Option<String>,
}

impl Publication {
    /// Authors joined into a single display line.
    pub fn author_line(&self) -> String {
        crate::authors::join_authors(&self.authors)
    }
}

/// An author as given in a citation record (`{"first": ..., "last": ...}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Given name(s).
    #[serde(default)]
    pub first: String,
    /// Family name, possibly carrying a footnote marker such as `*`.
    pub last: String,
}

impl Author {
    pub fn new(first: impl Into<String>, last: impl Into<String>) -> Self {
        Self {
            first: first.into(),
            last: last.into(),
        }
    }

    /// Format as "First Last".
    pub fn display_name(&self) -> String {
        if self.first.is_empty() {
            self.last.clone()
        } else {
            format!("{} {}", self.first, self.last)
        }
    }

    /// Format as "F. Last".
    pub fn abbreviated_name(&self) -> String {
        match self.first.chars().next() {
            Some(initial) => format!("{}. {}", initial, self.last),
            None => self.last.clone(),
        }
    }
}

/// Everything the presentation layer needs for one render.
#[derive(Debug, Clone, Serialize)]
pub struct PublicationView {
    /// Publications in rank order.
    pub publications: Vec<Publication>,
    pub total_citations: u64,
    pub h_index: usize,
    pub publication_count: usize,
    /// False once any live citation lookup has failed.
    pub is_live: bool,
}
