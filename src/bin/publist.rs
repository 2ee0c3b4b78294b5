//! CLI binary for ranking a publication list.
//!
//! Usage: publist json data/citations.json --live

#[cfg(feature = "cli")]
mod cli {
    use clap::{Parser, Subcommand};
    use publist::enrich::{self, CitationLookup};
    use publist::source::{FsSource, HttpSource, TextSource};
    use publist::{bibtex, AppState, Config, Presenter, PublicationView};
    use std::path::PathBuf;
    use std::sync::Arc;

    #[derive(Parser)]
    #[command(name = "publist", about = "Rank a publication list and compute citation metrics", version)]
    struct Cli {
        /// Config file (defaults to the platform config directory)
        #[arg(long, global = true)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, global = true, default_value = "table")]
        output: OutputFormat,

        #[command(subcommand)]
        command: Commands,
    }

    #[derive(Clone, Copy, clap::ValueEnum)]
    enum OutputFormat {
        Table,
        Json,
    }

    #[derive(Subcommand)]
    enum Commands {
        /// Rank a JSON file of citation records
        Json {
            /// Path to the citation records
            records: PathBuf,
            /// Fetch live citation counts from Semantic Scholar
            #[arg(long)]
            live: bool,
            /// Directory or base URL the records' `bibtex` paths are relative to
            #[arg(long)]
            bibtex_root: Option<String>,
        },
        /// Rank the BibTeX files named in an index file
        Bibtex {
            /// Index file, one BibTeX path per line (relative to --root)
            index: String,
            /// Prefix for every path in the index (overrides the config)
            #[arg(short, long)]
            prefix: Option<String>,
            /// Directory or base URL everything is read from
            #[arg(long, default_value = ".")]
            root: String,
            /// Fetch live citation counts from Semantic Scholar
            #[arg(long)]
            live: bool,
        },
    }

    struct LogPresenter;

    impl Presenter for LogPresenter {
        fn render(&mut self, view: &PublicationView) {
            tracing::debug!(
                total_citations = view.total_citations,
                h_index = view.h_index,
                is_live = view.is_live,
                "view updated"
            );
        }
    }

    fn truncate(text: &str, max: usize) -> String {
        if text.chars().count() > max {
            format!("{}...", text.chars().take(max - 3).collect::<String>())
        } else {
            text.to_string()
        }
    }

    fn print_table(view: &PublicationView) {
        use comfy_table::{ContentArrangement, Table};

        println!(
            "{} publications, {} citations, h-index {}{}",
            view.publication_count,
            view.total_citations,
            view.h_index,
            if view.is_live {
                ""
            } else {
                " (citation data may be stale)"
            }
        );

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["#", "Year", "Cites", "Venue", "Title", "Authors"]);

        for (rank, p) in view.publications.iter().enumerate() {
            let cites = p
                .citation_count
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let venue = if p.is_top_tier {
                format!("{} *", p.venue)
            } else {
                p.venue.clone()
            };

            table.add_row(vec![
                (rank + 1).to_string(),
                p.year.to_string(),
                cites,
                venue,
                truncate(&p.raw_title, 60),
                truncate(&p.author_line(), 40),
            ]);
        }

        println!("{table}");
    }

    fn text_source(root: &str) -> publist::error::Result<Arc<dyn TextSource>> {
        if root.starts_with("http://") || root.starts_with("https://") {
            Ok(Arc::new(HttpSource::new(root)?))
        } else {
            Ok(Arc::new(FsSource::new(root)))
        }
    }

    async fn run_enrichment(
        state: &mut AppState,
        config: &Config,
        bibtex_source: Option<Arc<dyn TextSource>>,
        live: bool,
    ) -> publist::error::Result<()> {
        let (tx, rx) = enrich::channel();
        if let Some(source) = bibtex_source {
            enrich::spawn_bibtex_loads(state.publications(), source, &tx);
        }
        if live {
            let lookup: Arc<dyn CitationLookup> = Arc::new(config.citation_client()?);
            let spawned = enrich::spawn_citation_lookups(state.publications(), lookup, &tx);
            tracing::info!(spawned, "fetching live citation counts");
        }
        drop(tx);
        enrich::drain(rx, state, &mut LogPresenter).await;
        Ok(())
    }

    pub async fn run() -> publist::error::Result<()> {
        let cli = Cli::parse();
        let config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::load_default()?,
        };
        let normalizer = config.normalizer();

        let state = match cli.command {
            Commands::Json {
                records,
                live,
                bibtex_root,
            } => {
                let json = tokio::fs::read_to_string(&records).await?;
                let records = publist::parse_records(&json)?;
                let mut state = AppState::new(normalizer.normalize_all(records));
                let source = bibtex_root.as_deref().map(text_source).transpose()?;
                run_enrichment(&mut state, &config, source, live).await?;
                state
            }

            Commands::Bibtex {
                index,
                prefix,
                root,
                live,
            } => {
                let source = text_source(&root)?;
                let prefix = prefix.unwrap_or_else(|| config.bibtex.prefix.clone());
                let batch = bibtex::load(source, &index, &prefix, &normalizer).await?;
                if !batch.failures.is_empty() {
                    eprintln!("Skipped {} BibTeX file(s)", batch.failures.len());
                }
                let mut state = AppState::new(batch.publications);
                run_enrichment(&mut state, &config, None, live).await?;
                state
            }
        };

        let view = state.view();
        match cli.output {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
            OutputFormat::Table => print_table(&view),
        }

        Ok(())
    }
}

#[cfg(feature = "cli")]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("publist=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(e) = cli::run().await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("This binary requires the 'cli' feature. Build with: cargo build --features cli");
    std::process::exit(1);
}
