//! Citation record parsing and normalization into [`Publication`]s.
//!
//! Both ingestion pipelines end in [`Normalizer::finish`], so JSON records and
//! BibTeX entries share one set of normalization rules.

use crate::authors::{format_authors, is_first_author, AuthorStyle, Identity};
use crate::error::{PublistError, Result};
use crate::links::{normalize_link, to_direct_link};
use crate::text::clean_title;
use crate::types::{Author, Publication};
use crate::venue::{is_top_tier, TOP_TIER_VENUES};
use serde::Deserialize;

/// A citation record as stored in the site's JSON data.
#[derive(Debug, Clone, Deserialize)]
pub struct CitationRecord {
    pub refkey: String,
    #[serde(default)]
    pub url: String,
    pub pdf: Option<String>,
    pub title: String,
    #[serde(default)]
    pub author: Vec<Author>,
    #[serde(default)]
    pub conference: String,
    #[serde(deserialize_with = "deserialize_year")]
    pub year: i32,
    pub workshop: Option<String>,
    pub location: Option<String>,
    pub code: Option<String>,
    pub video: Option<String>,
    pub poster: Option<String>,
    pub slides: Option<String>,
    pub bibtex: Option<String>,
    #[serde(deserialize_with = "deserialize_count", default)]
    pub citation_count: Option<u64>,
    pub fallback_citation_count_date: Option<String>,
    pub semantic_scholar_id: Option<String>,
}

/// Accept the year as an integer or a numeric string.
fn deserialize_year<'de, D>(deserializer: D) -> std::result::Result<i32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::{self, Visitor};
    use std::fmt;

    struct YearVisitor;

    impl<'de> Visitor<'de> for YearVisitor {
        type Value = i32;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a year as an integer or string")
        }

        fn visit_i64<E>(self, v: i64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(|_| E::custom(format!("year out of range: {}", v)))
        }

        fn visit_u64<E>(self, v: u64) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            i32::try_from(v).map_err(|_| E::custom(format!("year out of range: {}", v)))
        }

        fn visit_str<E>(self, v: &str) -> std::result::Result<Self::Value, E>
        where
            E: de::Error,
        {
            v.trim()
                .parse()
                .map_err(|_| E::custom(format!("invalid year: {:?}", v)))
        }
    }

    deserializer.deserialize_any(YearVisitor)
}

/// Accept a citation count as a non-negative integer; anything else is absent.
fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

/// Parse a JSON array of citation records.
///
/// Elements that do not form a valid record (bad year, missing `refkey` or
/// `title`, wrongly typed fields) are logged and skipped. Only a document
/// that is not a JSON array is an error.
pub fn parse_records(json: &str) -> Result<Vec<CitationRecord>> {
    let values: Vec<serde_json::Value> = serde_json::from_str(json)
        .map_err(|e| PublistError::Parse(format!("Invalid citation records: {}", e)))?;

    let mut records = Vec::with_capacity(values.len());
    for (position, value) in values.into_iter().enumerate() {
        match serde_json::from_value::<CitationRecord>(value) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(position, error = %e, "skipping malformed citation record"),
        }
    }
    Ok(records)
}

/// Source-independent fields collected before normalization.
#[derive(Debug, Default)]
pub(crate) struct Draft {
    pub id: String,
    pub title: String,
    pub authors: Vec<Author>,
    pub style: AuthorStyle,
    pub venue: String,
    pub year: i32,
    pub url: String,
    pub pdf: Option<String>,
    pub citation_count: Option<u64>,
    pub bibtex_source: Option<String>,
    pub workshop: Option<String>,
    pub location: Option<String>,
    pub code: Option<String>,
    pub video: Option<String>,
    pub poster: Option<String>,
    pub slides: Option<String>,
    pub bibtex_location: Option<String>,
    pub fallback_citation_count_date: Option<String>,
    pub semantic_scholar_id: Option<String>,
}

/// Normalization rules: who the site owner is and which venues are top tier.
#[derive(Debug, Clone)]
pub struct Normalizer {
    pub identity: Identity,
    pub top_tier: Vec<String>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self {
            identity: Identity::default(),
            top_tier: TOP_TIER_VENUES.iter().map(|v| v.to_string()).collect(),
        }
    }
}

impl Normalizer {
    pub fn new(identity: Identity, top_tier: Vec<String>) -> Self {
        Self { identity, top_tier }
    }

    /// Normalize one JSON record into the publication at canonical `index`.
    pub fn normalize(&self, index: usize, record: CitationRecord) -> Result<Publication> {
        let draft = Draft {
            id: record.refkey,
            title: record.title,
            authors: record.author,
            style: AuthorStyle::Full,
            venue: record.conference,
            year: record.year,
            url: record.url,
            pdf: record.pdf,
            citation_count: record.citation_count,
            bibtex_source: None,
            workshop: record.workshop,
            location: record.location,
            code: record.code,
            video: record.video,
            poster: record.poster,
            slides: record.slides,
            bibtex_location: record.bibtex,
            fallback_citation_count_date: record.fallback_citation_count_date,
            semantic_scholar_id: record.semantic_scholar_id,
        };
        self.finish(index, draft)
            .map_err(|reason| PublistError::InvalidRecord { index, reason })
    }

    /// Normalize every record, skipping (and logging) the ones that are invalid.
    ///
    /// Canonical indices are assigned densely over the kept records.
    pub fn normalize_all(&self, records: Vec<CitationRecord>) -> Vec<Publication> {
        let mut publications = Vec::with_capacity(records.len());
        for (position, record) in records.into_iter().enumerate() {
            match self.normalize(publications.len(), record) {
                Ok(publication) => publications.push(publication),
                Err(e) => tracing::warn!(position, error = %e, "skipping citation record"),
            }
        }
        publications
    }

    pub(crate) fn finish(
        &self,
        index: usize,
        draft: Draft,
    ) -> std::result::Result<Publication, String> {
        if draft.authors.is_empty() {
            return Err("no authors".to_string());
        }

        let pdf = non_empty(draft.pdf);
        Ok(Publication {
            detail_id: format!("modal-{}", index),
            raw_title: clean_title(&draft.title),
            authors: format_authors(&draft.authors, draft.style),
            is_top_tier: is_top_tier(&draft.venue, &self.top_tier),
            is_first_author: is_first_author(&draft.authors, &self.identity),
            link: normalize_link(&draft.url),
            direct_link: to_direct_link(&draft.url, pdf.as_deref()),
            id: draft.id,
            title: draft.title,
            venue: draft.venue,
            year: draft.year,
            citation_count: draft.citation_count,
            bibtex_source: draft.bibtex_source,
            workshop: non_empty(draft.workshop),
            location: non_empty(draft.location),
            code: non_empty(draft.code),
            video: non_empty(draft.video),
            poster: non_empty(draft.poster),
            slides: non_empty(draft.slides),
            bibtex_location: non_empty(draft.bibtex_location),
            fallback_citation_count_date: non_empty(draft.fallback_citation_count_date),
            semantic_scholar_id: non_empty(draft.semantic_scholar_id),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_RECORDS: &str = r#"[
        {
            "refkey": "lester-etal-2021-power",
            "url": "https://aclanthology.org/2021.emnlp-main.243/",
            "title": "The Power of Scale for Parameter-Efficient <samp>Prompt Tuning</samp>",
            "author": [
                {"first": "Brian", "last": "Lester"},
                {"first": "Rami", "last": "Al-Rfou"},
                {"first": "Noah", "last": "Constant"}
            ],
            "conference": "EMNLP",
            "year": 2021,
            "code": "https://github.com/google-research/prompt-tuning",
            "bibtex": "static/bibtex/lester-etal-2021-power.bib",
            "citation_count": 1500,
            "fallback_citation_count_date": "2024-01-01",
            "semantic_scholar_id": "ffdbd7f0b03b85747b001b4734d5ee31b5229aa4"
        },
        {
            "refkey": "vu-etal-2022-spot",
            "url": "https://arxiv.org/abs/2110.07904",
            "pdf": "",
            "title": "SPoT: Better Frozen Model Adaptation",
            "author": [
                {"first": "Tu", "last": "Vu"},
                {"first": "Brian", "last": "Lester*"}
            ],
            "conference": "ACL Workshop",
            "year": "2022",
            "citation_count": null,
            "video": ""
        }
    ]"#;

    #[test]
    fn test_parse_records() {
        let records = parse_records(SAMPLE_RECORDS).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].year, 2021);
        assert_eq!(records[1].year, 2022);
        assert_eq!(records[0].citation_count, Some(1500));
        assert_eq!(records[1].citation_count, None);
    }

    #[test]
    fn test_normalize_json_record() {
        let records = parse_records(SAMPLE_RECORDS).unwrap();
        let publications = Normalizer::default().normalize_all(records);
        assert_eq!(publications.len(), 2);

        let p = &publications[0];
        assert_eq!(p.id, "lester-etal-2021-power");
        assert_eq!(p.detail_id, "modal-0");
        assert_eq!(p.raw_title, "The Power of Scale for Parameter-Efficient Prompt Tuning");
        assert_eq!(p.authors[0], "Brian Lester");
        assert!(p.is_first_author);
        assert!(p.is_top_tier);
        assert_eq!(p.link, "https://aclanthology.org/2021.emnlp-main.243");
        assert_eq!(p.direct_link, "https://aclanthology.org/2021.emnlp-main.243.pdf");
        assert_eq!(p.citation_count, Some(1500));
        assert!(p.bibtex_source.is_none());
        assert_eq!(p.bibtex_location.as_deref(), Some("static/bibtex/lester-etal-2021-power.bib"));
    }

    #[test]
    fn test_missing_optionals_degrade_to_none() {
        let records = parse_records(SAMPLE_RECORDS).unwrap();
        let publications = Normalizer::default().normalize_all(records);

        let p = &publications[1];
        assert_eq!(p.direct_link, "https://arxiv.org/pdf/2110.07904.pdf");
        assert!(!p.is_top_tier);
        assert!(!p.is_first_author);
        assert!(p.citation_count.is_none());
        assert!(p.video.is_none());
        assert!(p.semantic_scholar_id.is_none());
    }

    #[test]
    fn test_malformed_count_is_absent() {
        let json = r#"[{"refkey": "k", "title": "T", "author": [{"first": "A", "last": "B"}],
                        "year": 2020, "citation_count": "many"}]"#;
        let records = parse_records(json).unwrap();
        assert_eq!(records[0].citation_count, None);
    }

    #[test]
    fn test_record_without_authors_skipped() {
        let json = r#"[
            {"refkey": "a", "title": "No Authors", "year": 2020},
            {"refkey": "b", "title": "Has Authors", "author": [{"first": "A", "last": "B"}], "year": 2020}
        ]"#;
        let records = parse_records(json).unwrap();
        let normalizer = Normalizer::default();

        let err = normalizer.normalize(0, records[0].clone()).unwrap_err();
        assert!(matches!(err, PublistError::InvalidRecord { index: 0, .. }));

        let publications = normalizer.normalize_all(records);
        assert_eq!(publications.len(), 1);
        assert_eq!(publications[0].id, "b");
        assert_eq!(publications[0].detail_id, "modal-0");
    }

    #[test]
    fn test_malformed_record_skipped_rest_kept() {
        let json = r#"[
            {"refkey": "good", "title": "Good", "author": [{"first": "A", "last": "B"}], "year": 2020},
            {"refkey": "bad", "title": "Bad", "author": [{"first": "A", "last": "B"}], "year": "forthcoming"},
            {"refkey": "no-title", "author": [{"first": "A", "last": "B"}], "year": 2021},
            {"refkey": "bad-pdf", "title": "Bad PDF", "pdf": 7, "year": 2021},
            {"refkey": "also-good", "title": "Also Good", "author": [{"first": "C", "last": "D"}], "year": "2022"}
        ]"#;
        let records = parse_records(json).unwrap();
        let keys: Vec<&str> = records.iter().map(|r| r.refkey.as_str()).collect();
        assert_eq!(keys, vec!["good", "also-good"]);

        let publications = Normalizer::default().normalize_all(records);
        assert_eq!(publications.len(), 2);
        assert_eq!(publications[1].detail_id, "modal-1");
    }

    #[test]
    fn test_non_array_is_error() {
        assert!(matches!(
            parse_records(r#"{"refkey": "k"}"#),
            Err(PublistError::Parse(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(parse_records("{not json"), Err(PublistError::Parse(_))));
    }
}
