//! Asynchronous enrichment: BibTeX text loads and live citation counts.
//!
//! Each task captures the canonical index of its publication when it is
//! spawned and posts its result as an [`Update`] onto a single queue. The
//! queue is drained on one task, which applies updates in arrival order. No
//! ordering between tasks is assumed.

use crate::error::Result;
use crate::source::{BoxFuture, TextSource};
use crate::state::{AppState, Presenter};
use crate::types::Publication;
use std::sync::Arc;
use tokio::sync::mpsc;

/// A completed enrichment, addressed by canonical index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    BibtexLoaded {
        index: usize,
        content: String,
    },
    BibtexLoadFailed {
        index: usize,
        location: String,
        reason: String,
    },
    CitationCountLoaded {
        index: usize,
        count: u64,
    },
    CitationCountFailed {
        index: usize,
        paper_id: String,
        reason: String,
    },
}

impl Update {
    /// Canonical index of the publication this update is for.
    pub fn index(&self) -> usize {
        match self {
            Self::BibtexLoaded { index, .. }
            | Self::BibtexLoadFailed { index, .. }
            | Self::CitationCountLoaded { index, .. }
            | Self::CitationCountFailed { index, .. } => *index,
        }
    }
}

/// A service that knows the current citation count of a paper.
pub trait CitationLookup: Send + Sync {
    fn citation_count<'a>(&'a self, paper_id: &'a str) -> BoxFuture<'a, Result<u64>>;
}

pub type UpdateSender = mpsc::UnboundedSender<Update>;
pub type UpdateReceiver = mpsc::UnboundedReceiver<Update>;

/// Create the update queue.
pub fn channel() -> (UpdateSender, UpdateReceiver) {
    mpsc::unbounded_channel()
}

/// Spawn one BibTeX read per publication that has a `bibtex_location`.
///
/// Returns the number of tasks spawned.
pub fn spawn_bibtex_loads(
    publications: &[Publication],
    source: Arc<dyn TextSource>,
    tx: &UpdateSender,
) -> usize {
    let mut spawned = 0;
    for (index, publication) in publications.iter().enumerate() {
        let Some(location) = publication.bibtex_location.clone() else {
            continue;
        };
        let source = Arc::clone(&source);
        let tx = tx.clone();
        tokio::spawn(async move {
            let update = match source.read(&location).await {
                Ok(content) => Update::BibtexLoaded { index, content },
                Err(e) => Update::BibtexLoadFailed {
                    index,
                    location,
                    reason: e.to_string(),
                },
            };
            // The receiver is gone once the page is torn down.
            let _ = tx.send(update);
        });
        spawned += 1;
    }
    spawned
}

/// Spawn one citation count lookup per publication with a Semantic Scholar id.
///
/// Returns the number of tasks spawned.
pub fn spawn_citation_lookups(
    publications: &[Publication],
    lookup: Arc<dyn CitationLookup>,
    tx: &UpdateSender,
) -> usize {
    let mut spawned = 0;
    for (index, publication) in publications.iter().enumerate() {
        let Some(paper_id) = publication.semantic_scholar_id.clone() else {
            continue;
        };
        let lookup = Arc::clone(&lookup);
        let tx = tx.clone();
        tokio::spawn(async move {
            let update = match lookup.citation_count(&paper_id).await {
                Ok(count) => Update::CitationCountLoaded { index, count },
                Err(e) => Update::CitationCountFailed {
                    index,
                    paper_id,
                    reason: e.to_string(),
                },
            };
            let _ = tx.send(update);
        });
        spawned += 1;
    }
    spawned
}

/// Apply updates until every sender is dropped, re-rendering after each
/// update that changed the state.
///
/// Returns the number of updates received.
pub async fn drain(
    mut rx: UpdateReceiver,
    state: &mut AppState,
    presenter: &mut dyn Presenter,
) -> usize {
    let mut received = 0;
    while let Some(update) = rx.recv().await {
        received += 1;
        if state.apply(update) {
            presenter.render(&state.view());
        }
    }
    tracing::debug!(received, is_live = state.is_live(), "enrichment finished");
    received
}
