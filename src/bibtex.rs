//! BibTeX ingestion.
//!
//! Field extraction is delegated to the `biblatex` crate; this module only
//! maps its output onto [`Publication`]. Entries are handled one at a time so
//! that a single malformed file is skipped instead of failing the batch.

use crate::authors::AuthorStyle;
use crate::error::{PublistError, Result};
use crate::parse::{Draft, Normalizer};
use crate::source::{join_location, TextSource};
use crate::types::{Author, Publication};
use biblatex::{Bibliography, Chunk, Entry, Person, Spanned};
use std::sync::Arc;
use tokio::task::JoinSet;

/// A BibTeX entry that was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibtexFailure {
    /// Position of the entry in the input (index file order).
    pub index: usize,
    /// Where the text came from, when it was fetched.
    pub location: Option<String>,
    pub message: String,
}

/// Result of ingesting a batch of BibTeX entries.
#[derive(Debug, Clone, Default)]
pub struct BibtexBatch {
    /// Successfully parsed publications, in input order. Each keeps its raw
    /// text in `bibtex_source`.
    pub publications: Vec<Publication>,
    pub failures: Vec<BibtexFailure>,
}

/// Split an index file into BibTeX paths, one per non-blank line.
pub fn parse_index(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

/// Parse one raw BibTeX entry into the publication at canonical `index`.
pub fn parse_entry(raw: &str, index: usize, normalizer: &Normalizer) -> Result<Publication> {
    let fail = |message: String| PublistError::Bibtex { index, message };

    let bibliography = Bibliography::parse(raw).map_err(|e| fail(e.to_string()))?;
    let entries: Vec<&Entry> = bibliography.iter().collect();
    let entry = entries
        .first()
        .copied()
        .ok_or_else(|| fail("no entries".to_string()))?;
    if entries.len() > 1 {
        tracing::debug!(index, count = entries.len(), "using first of several BibTeX entries");
    }

    let title = entry
        .title()
        .map(chunks_to_string)
        .map_err(|_| fail("missing title".to_string()))?;
    let authors: Vec<Author> = entry
        .author()
        .map_err(|_| fail("missing author".to_string()))?
        .iter()
        .filter(|p| p.name != "others")
        .map(person_to_author)
        .collect();
    let year = entry_year(entry).ok_or_else(|| fail("missing or invalid year".to_string()))?;

    let venue = field(entry, "booktitle")
        .or_else(|| field(entry, "journal"))
        .unwrap_or_default();

    let draft = Draft {
        id: entry.key.clone(),
        title,
        authors,
        style: AuthorStyle::Abbreviated,
        venue,
        year,
        url: field(entry, "url").unwrap_or_default(),
        pdf: field(entry, "pdf"),
        citation_count: field(entry, "citation_count").and_then(|c| c.trim().parse().ok()),
        bibtex_source: Some(raw.to_string()),
        semantic_scholar_id: field(entry, "semantic_scholar_id"),
        ..Default::default()
    };

    normalizer.finish(index, draft).map_err(fail)
}

/// Parse every raw entry, skipping the ones that fail.
///
/// Canonical indices are assigned densely over the kept entries; failure
/// indices refer to input positions.
pub fn ingest(raws: Vec<String>, normalizer: &Normalizer) -> BibtexBatch {
    ingest_texts(raws.into_iter().map(|raw| (None, Ok(raw))), normalizer)
}

/// Parse each fetched text in order, recording failures by input position.
fn ingest_texts(
    texts: impl IntoIterator<Item = (Option<String>, Result<String>)>,
    normalizer: &Normalizer,
) -> BibtexBatch {
    let mut batch = BibtexBatch::default();
    for (position, (location, text)) in texts.into_iter().enumerate() {
        let result = text.and_then(|raw| parse_entry(&raw, batch.publications.len(), normalizer));
        match result {
            Ok(publication) => batch.publications.push(publication),
            Err(e) => {
                tracing::warn!(position, location = ?location, error = %e, "skipping BibTeX entry");
                batch.failures.push(BibtexFailure {
                    index: position,
                    location,
                    message: e.to_string(),
                });
            }
        }
    }
    batch
}

/// Read an index file, fetch every BibTeX file it names, and ingest them.
///
/// Paths in the index are resolved under `prefix`. Files that cannot be read
/// are recorded as failures, like entries that cannot be parsed. Failing to
/// read the index itself is an error.
pub async fn load(
    source: Arc<dyn TextSource>,
    index_location: &str,
    prefix: &str,
    normalizer: &Normalizer,
) -> Result<BibtexBatch> {
    let index_text = source.read(index_location).await?;
    let locations: Vec<String> = parse_index(&index_text)
        .iter()
        .map(|path| join_location(prefix, path))
        .collect();
    tracing::info!(
        source = source.name(),
        count = locations.len(),
        "fetching BibTeX files"
    );

    let mut tasks = JoinSet::new();
    for (position, location) in locations.iter().cloned().enumerate() {
        let source = Arc::clone(&source);
        tasks.spawn(async move {
            let text = source.read(&location).await;
            (position, text)
        });
    }

    let mut texts: Vec<Option<Result<String>>> = locations.iter().map(|_| None).collect();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((position, text)) => texts[position] = Some(text),
            Err(e) => tracing::warn!(error = %e, "BibTeX fetch task failed"),
        }
    }

    let texts = locations.into_iter().zip(texts).map(|(location, text)| {
        let text = text.unwrap_or_else(|| Err(PublistError::NotFound(location.clone())));
        (Some(location), text)
    });
    Ok(ingest_texts(texts, normalizer))
}

fn field(entry: &Entry, key: &str) -> Option<String> {
    entry
        .get(key)
        .map(chunks_to_string)
        .filter(|v| !v.trim().is_empty())
}

fn entry_year(entry: &Entry) -> Option<i32> {
    if let Some(year) = field(entry, "year") {
        return year.trim().parse().ok();
    }
    // biblatex-style `date = {2021-11-07}`
    field(entry, "date").and_then(|d| d.trim().split('-').next()?.parse().ok())
}

fn chunks_to_string(chunks: &[Spanned<Chunk>]) -> String {
    chunks
        .iter()
        .map(|c| match &c.v {
            Chunk::Normal(s) => s.as_str(),
            Chunk::Verbatim(s) => s.as_str(),
            Chunk::Math(s) => s.as_str(),
        })
        .collect::<Vec<_>>()
        .join("")
}

fn person_to_author(p: &Person) -> Author {
    let last = if p.prefix.is_empty() {
        p.name.clone()
    } else {
        format!("{} {}", p.prefix, p.name)
    };
    Author::new(p.given_name.clone(), last)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::BoxFuture;
    use std::collections::HashMap;

    const PROMPT_TUNING: &str = r#"@inproceedings{lester-etal-2021-power,
    title = "The Power of Scale for Parameter-Efficient Prompt Tuning",
    author = "Lester, Brian and Al-Rfou, Rami and Constant, Noah",
    booktitle = "EMNLP",
    year = "2021",
    url = "https://aclanthology.org/2021.emnlp-main.243/",
    citation_count = "1500",
}"#;

    const SPOT: &str = r#"@article{vu-etal-2022-spot,
    title = {SPoT: Better Frozen Model Adaptation},
    author = {Vu, Tu and Lester, Brian},
    journal = {ACL},
    date = {2022-05-01},
    url = {https://arxiv.org/abs/2110.07904},
}"#;

    #[test]
    fn test_parse_index() {
        let index = "a.bib\n\n  b.bib  \n";
        assert_eq!(parse_index(index), vec!["a.bib", "b.bib"]);
    }

    #[test]
    fn test_parse_entry_maps_fields() {
        let p = parse_entry(PROMPT_TUNING, 0, &Normalizer::default()).unwrap();
        assert_eq!(p.id, "lester-etal-2021-power");
        assert_eq!(p.title, "The Power of Scale for Parameter-Efficient Prompt Tuning");
        assert_eq!(p.authors, vec!["B. Lester", "R. Al-Rfou", "N. Constant"]);
        assert_eq!(p.author_line(), "B. Lester, R. Al-Rfou, N. Constant");
        assert_eq!(p.venue, "EMNLP");
        assert!(p.is_top_tier);
        assert!(p.is_first_author);
        assert_eq!(p.year, 2021);
        assert_eq!(p.link, "https://aclanthology.org/2021.emnlp-main.243");
        assert_eq!(p.direct_link, "https://aclanthology.org/2021.emnlp-main.243.pdf");
        assert_eq!(p.citation_count, Some(1500));
        assert_eq!(p.bibtex_source.as_deref(), Some(PROMPT_TUNING));
    }

    #[test]
    fn test_parse_entry_journal_and_date() {
        let p = parse_entry(SPOT, 3, &Normalizer::default()).unwrap();
        assert_eq!(p.detail_id, "modal-3");
        assert_eq!(p.venue, "ACL");
        assert_eq!(p.year, 2022);
        assert!(!p.is_first_author);
        assert_eq!(p.citation_count, None);
        assert_eq!(p.direct_link, "https://arxiv.org/pdf/2110.07904.pdf");
    }

    #[test]
    fn test_parse_entry_missing_year() {
        let raw = "@misc{k, title = {T}, author = {Doe, Jane}}";
        let err = parse_entry(raw, 7, &Normalizer::default()).unwrap_err();
        assert!(matches!(err, PublistError::Bibtex { index: 7, .. }));
    }

    #[test]
    fn test_ingest_skips_bad_entry() {
        let raws = vec![
            PROMPT_TUNING.to_string(),
            "@inproceedings{broken, title = {Unclosed".to_string(),
            SPOT.to_string(),
        ];
        let batch = ingest(raws, &Normalizer::default());

        assert_eq!(batch.publications.len(), 2);
        assert_eq!(batch.publications[1].id, "vu-etal-2022-spot");
        assert_eq!(batch.publications[1].detail_id, "modal-1");
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].index, 1);
    }

    struct MemorySource(HashMap<String, String>);

    impl TextSource for MemorySource {
        fn name(&self) -> &str {
            "memory"
        }

        fn read<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String>> {
            Box::pin(async move {
                self.0
                    .get(location)
                    .cloned()
                    .ok_or_else(|| PublistError::NotFound(location.to_string()))
            })
        }
    }

    #[tokio::test]
    async fn test_load_from_index() {
        let files: HashMap<String, String> = [
            ("bibtex.txt", "power.bib\nmissing.bib\nspot.bib\n"),
            ("static/power.bib", PROMPT_TUNING),
            ("static/spot.bib", SPOT),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let source: Arc<dyn TextSource> = Arc::new(MemorySource(files));

        let batch = load(source, "bibtex.txt", "static", &Normalizer::default())
            .await
            .unwrap();

        let ids: Vec<&str> = batch.publications.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["lester-etal-2021-power", "vu-etal-2022-spot"]);
        assert_eq!(batch.failures.len(), 1);
        assert_eq!(batch.failures[0].location.as_deref(), Some("static/missing.bib"));
    }

    #[tokio::test]
    async fn test_load_and_ingest_skip_alike() {
        let broken = "@inproceedings{broken, title = {Unclosed";
        let files: HashMap<String, String> = [
            ("bibtex.txt", "missing.bib\nbroken.bib\nspot.bib\n"),
            ("broken.bib", broken),
            ("spot.bib", SPOT),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        let source: Arc<dyn TextSource> = Arc::new(MemorySource(files));
        let normalizer = Normalizer::default();

        let loaded = load(source, "bibtex.txt", "", &normalizer).await.unwrap();
        let ingested = ingest(vec![broken.to_string(), SPOT.to_string()], &normalizer);

        assert_eq!(loaded.publications.len(), 1);
        assert_eq!(loaded.publications[0].detail_id, "modal-0");
        assert_eq!(loaded.publications, ingested.publications);

        let failed: Vec<(usize, Option<&str>)> = loaded
            .failures
            .iter()
            .map(|f| (f.index, f.location.as_deref()))
            .collect();
        assert_eq!(failed, vec![(0, Some("missing.bib")), (1, Some("broken.bib"))]);
        assert_eq!(ingested.failures[0].location, None);
        assert_eq!(loaded.failures[1].message, ingested.failures[0].message);
    }

    #[tokio::test]
    async fn test_load_missing_index_is_error() {
        let source: Arc<dyn TextSource> = Arc::new(MemorySource(HashMap::new()));
        let result = load(source, "bibtex.txt", "", &Normalizer::default()).await;
        assert!(matches!(result, Err(PublistError::NotFound(_))));
    }
}
