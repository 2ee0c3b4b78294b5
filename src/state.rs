//! Application state: the canonical publication list plus live-data status.
//!
//! The canonical list keeps its original order for its whole lifetime. Ranked
//! views and statistics are recomputed from it on every read.

use crate::enrich::Update;
use crate::error::{PublistError, Result};
use crate::metrics::Stats;
use crate::rank::ranked;
use crate::types::{Publication, PublicationView};

/// Receives a fresh view whenever the state changes.
pub trait Presenter {
    fn render(&mut self, view: &PublicationView);
}

/// Owns the canonical publications for one page load.
#[derive(Debug, Clone)]
pub struct AppState {
    publications: Vec<Publication>,
    is_live: bool,
    open_detail: Option<String>,
}

impl AppState {
    pub fn new(publications: Vec<Publication>) -> Self {
        Self {
            publications,
            is_live: true,
            open_detail: None,
        }
    }

    /// Publications in canonical (input) order.
    pub fn publications(&self) -> &[Publication] {
        &self.publications
    }

    /// False once any live citation lookup has failed.
    pub fn is_live(&self) -> bool {
        self.is_live
    }

    /// Ranked copy plus statistics, computed fresh.
    pub fn view(&self) -> PublicationView {
        let publications = ranked(&self.publications);
        let stats = Stats::from_ranked(&publications);
        PublicationView {
            publications,
            total_citations: stats.total_citations,
            h_index: stats.h_index,
            publication_count: stats.publication_count,
            is_live: self.is_live,
        }
    }

    /// Apply one enrichment result to the publication at its original index.
    ///
    /// Returns whether anything visible changed. Applying the same result
    /// twice is a no-op the second time.
    pub fn apply(&mut self, update: Update) -> bool {
        let index = update.index();
        let Some(publication) = self.publications.get_mut(index) else {
            tracing::warn!(index, "enrichment update for unknown publication");
            return false;
        };

        match update {
            Update::BibtexLoaded { content, .. } => {
                if publication.bibtex_source.as_deref() == Some(content.as_str()) {
                    return false;
                }
                tracing::debug!(index, id = %publication.id, "BibTeX loaded");
                publication.bibtex_source = Some(content);
                true
            }
            Update::BibtexLoadFailed {
                location, reason, ..
            } => {
                tracing::warn!(index, location = %location, reason = %reason, "failed to load BibTeX");
                false
            }
            Update::CitationCountLoaded { count, .. } => {
                if publication.citation_count == Some(count)
                    && publication.fallback_citation_count_date.is_none()
                {
                    return false;
                }
                tracing::debug!(index, id = %publication.id, count, "citation count loaded");
                publication.citation_count = Some(count);
                publication.fallback_citation_count_date = None;
                true
            }
            Update::CitationCountFailed {
                paper_id, reason, ..
            } => {
                tracing::warn!(index, paper_id = %paper_id, reason = %reason, "failed to read citation count");
                let changed = self.is_live;
                self.is_live = false;
                changed
            }
        }
    }

    /// Look up a publication by its detail id.
    pub fn detail(&self, detail_id: &str) -> Option<&Publication> {
        self.publications.iter().find(|p| p.detail_id == detail_id)
    }

    /// Open the detail view of a publication, closing any other.
    pub fn show_detail(&mut self, detail_id: &str) -> Result<&Publication> {
        let index = self
            .publications
            .iter()
            .position(|p| p.detail_id == detail_id)
            .ok_or_else(|| PublistError::NotFound(format!("detail {}", detail_id)))?;
        self.open_detail = Some(detail_id.to_string());
        Ok(&self.publications[index])
    }

    /// Close the detail view of a publication. Closing one that is not open
    /// is a no-op.
    pub fn hide_detail(&mut self, detail_id: &str) -> Result<()> {
        if self.detail(detail_id).is_none() {
            return Err(PublistError::NotFound(format!("detail {}", detail_id)));
        }
        if self.open_detail.as_deref() == Some(detail_id) {
            self.open_detail = None;
        }
        Ok(())
    }

    /// The detail view currently open, if any.
    pub fn open_detail(&self) -> Option<&str> {
        self.open_detail.as_deref()
    }
}
