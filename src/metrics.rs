//! Bibliometric summary statistics.

use crate::rank::ranked;
use crate::types::Publication;
use serde::Serialize;

/// Sum of all known citation counts; unknown counts contribute 0.
pub fn total_citations(publications: &[Publication]) -> u64 {
    publications.iter().filter_map(|p| p.citation_count).sum()
}

/// h-index of a list already in rank order.
///
/// Counts the leading entries whose citation count is at least their
/// 1-based position and stops at the first one that falls short. Unknown
/// counts are treated as 0.
pub fn h_index(ranked: &[Publication]) -> usize {
    ranked
        .iter()
        .enumerate()
        .take_while(|(i, p)| p.citation_count.unwrap_or(0) >= (*i as u64) + 1)
        .count()
}

/// Summary statistics for a set of publications.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_citations: u64,
    pub h_index: usize,
    pub publication_count: usize,
}

impl Stats {
    /// Compute statistics for `publications` in any order.
    pub fn compute(publications: &[Publication]) -> Self {
        Self::from_ranked(&ranked(publications))
    }

    /// Compute statistics for a list already in rank order.
    pub fn from_ranked(ranked: &[Publication]) -> Self {
        Self {
            total_citations: total_citations(ranked),
            h_index: h_index(ranked),
            publication_count: ranked.len(),
        }
    }
}
