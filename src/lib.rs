//! # publist
//!
//! Ingests a personal publication list, ranks it, and derives bibliometric
//! statistics.
//!
//! Provides:
//! - **Ingestion**: JSON citation records ([`parse`]) and BibTeX files
//!   ([`bibtex`]), both normalized into [`Publication`]
//! - **Ranking**: a deterministic importance order ([`rank`]) and summary
//!   statistics such as total citations and h-index ([`metrics`])
//! - **Enrichment**: asynchronous BibTeX loads and live citation counts from
//!   Semantic Scholar, applied by canonical index ([`enrich`], [`state`])
//! - **CLI**: `publist` binary for terminal use (`cli` feature)
//!
//! ## Quick Start
//!
//! ```
//! use publist::{parse_records, AppState, Normalizer};
//!
//! let json = r#"[{
//!     "refkey": "lester-etal-2021-power",
//!     "url": "https://arxiv.org/abs/2104.08691",
//!     "title": "The Power of Scale for Parameter-Efficient Prompt Tuning",
//!     "author": [{"first": "Brian", "last": "Lester"}],
//!     "conference": "EMNLP",
//!     "year": 2021,
//!     "citation_count": 3
//! }]"#;
//!
//! let records = parse_records(json).unwrap();
//! let state = AppState::new(Normalizer::default().normalize_all(records));
//! let view = state.view();
//! assert_eq!(view.h_index, 1);
//! assert_eq!(view.publications[0].direct_link, "https://arxiv.org/pdf/2104.08691.pdf");
//! ```

pub mod authors;
pub mod bibtex;
pub mod client;
pub mod config;
pub mod enrich;
pub mod error;
pub mod links;
pub mod metrics;
pub mod parse;
pub mod rank;
pub mod rate_limit;
pub mod source;
pub mod state;
pub mod text;
pub mod types;
pub mod venue;

// Re-export key types at the crate root.
pub use client::SemanticScholarClient;
pub use config::Config;
pub use error::PublistError;
pub use metrics::Stats;
pub use parse::{parse_records, CitationRecord, Normalizer};
pub use state::{AppState, Presenter};
pub use types::*;
