//! Where raw text (BibTeX files, index files, record JSON) is read from.

use crate::client::handle_response;
use crate::error::{PublistError, Result};
use reqwest::Client;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;
use url::Url;

/// Boxed future returned by the source traits.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A non-blocking reader of text documents addressed by location.
pub trait TextSource: Send + Sync {
    /// Human-readable name for logs.
    fn name(&self) -> &str;

    /// Read the whole document at `location`.
    fn read<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String>>;
}

/// Reads files relative to a local directory.
#[derive(Debug, Clone)]
pub struct FsSource {
    root: PathBuf,
}

impl FsSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl TextSource for FsSource {
    fn name(&self) -> &str {
        "filesystem"
    }

    fn read<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let path = self.root.join(location);
            tokio::fs::read_to_string(&path).await.map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => {
                    PublistError::NotFound(path.display().to_string())
                }
                _ => PublistError::Io(e),
            })
        })
    }
}

/// Reads documents relative to a base URL.
#[derive(Debug, Clone)]
pub struct HttpSource {
    http: Client,
    base: Url,
}

impl HttpSource {
    /// Create a source rooted at `base`. A trailing `/` is added if missing so
    /// that relative locations resolve under it.
    pub fn new(base: &str) -> Result<Self> {
        let base = if base.ends_with('/') {
            base.to_string()
        } else {
            format!("{}/", base)
        };
        let base = Url::parse(&base)
            .map_err(|e| PublistError::Config(format!("Invalid base URL {:?}: {}", base, e)))?;
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self { http, base })
    }
}

impl TextSource for HttpSource {
    fn name(&self) -> &str {
        "http"
    }

    fn read<'a>(&'a self, location: &'a str) -> BoxFuture<'a, Result<String>> {
        Box::pin(async move {
            let url = self
                .base
                .join(location)
                .map_err(|e| PublistError::Parse(format!("Invalid location {:?}: {}", location, e)))?;
            let response = self.http.get(url).send().await?;
            handle_response(response).await
        })
    }
}

/// Join a path prefix and a relative path with exactly one `/` between them.
pub fn join_location(prefix: &str, path: &str) -> String {
    if prefix.is_empty() {
        return path.to_string();
    }
    format!(
        "{}/{}",
        prefix.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_location() {
        assert_eq!(join_location("", "a.bib"), "a.bib");
        assert_eq!(join_location("static/bib", "a.bib"), "static/bib/a.bib");
        assert_eq!(join_location("static/bib/", "/a.bib"), "static/bib/a.bib");
    }

    #[tokio::test]
    async fn test_fs_source_reads_relative_to_root() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("paper.bib"), "@misc{k, title={T}}").unwrap();

        let source = FsSource::new(dir.path());
        let text = source.read("paper.bib").await.unwrap();
        assert!(text.starts_with("@misc"));
    }

    #[tokio::test]
    async fn test_fs_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsSource::new(dir.path());
        let err = source.read("missing.bib").await.unwrap_err();
        assert!(matches!(err, PublistError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_http_source_reads_and_maps_statuses() {
        use crate::client::tests::{http_response, serve};

        let addr = serve(vec![
            http_response("200 OK", &[], "@misc{k, title={T}}"),
            http_response("404 Not Found", &[], ""),
            http_response("503 Service Unavailable", &[], "maintenance"),
        ])
        .await;
        let source = HttpSource::new(&format!("http://{}/static", addr)).unwrap();

        assert!(source.read("bib/a.bib").await.unwrap().starts_with("@misc"));
        assert!(matches!(
            source.read("bib/missing.bib").await,
            Err(PublistError::NotFound(url)) if url.ends_with("/static/bib/missing.bib")
        ));
        assert!(matches!(
            source.read("bib/b.bib").await,
            Err(PublistError::Api { status: 503, .. })
        ));
    }

    #[test]
    fn test_http_source_rejects_bad_base() {
        assert!(matches!(
            HttpSource::new("not a url"),
            Err(PublistError::Config(_))
        ));
    }
}
