//! Publication ranking.
//!
//! Ranking always works on a copy: the canonical collection is written by
//! index from asynchronous enrichment tasks, so reordering it in place would
//! send those writes to the wrong publication.

use crate::types::Publication;
use std::cmp::Ordering;

/// Order two publications by importance, most important first.
///
/// Keys, in priority order:
/// 1. a known citation count before an unknown one
/// 2. higher citation count
/// 3. newer year
/// 4. first-authored before not first-authored
/// 5. title, reverse lexicographic (later titles first)
pub fn compare(p1: &Publication, p2: &Publication) -> Ordering {
    match (p1.citation_count, p2.citation_count) {
        (Some(c1), Some(c2)) if c1 != c2 => return c2.cmp(&c1),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        _ => {}
    }

    if p1.year != p2.year {
        return p2.year.cmp(&p1.year);
    }

    match (p1.is_first_author, p2.is_first_author) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => p2.title.cmp(&p1.title),
    }
}

/// Canonical indices in rank order. `publications` is left untouched.
pub fn ranked_indices(publications: &[Publication]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..publications.len()).collect();
    order.sort_by(|&a, &b| compare(&publications[a], &publications[b]));
    order
}

/// A ranked copy of `publications`.
pub fn ranked(publications: &[Publication]) -> Vec<Publication> {
    ranked_indices(publications)
        .into_iter()
        .map(|i| publications[i].clone())
        .collect()
}
