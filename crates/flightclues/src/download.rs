//! Document download for a granted token.
//!
//! Each configured file is fetched from `<base>/<token>/download/<file>` and
//! saved into an output directory. Per-file failures are reported and do not
//! stop the remaining downloads.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::fetch::ensure_dir;
use crate::verify::{append_segment, parse_base_url};

/// Path segment under the token that serves documents.
const DOWNLOAD_SEGMENT: &str = "download";

/// Document names fetched when none are configured.
#[must_use]
pub fn default_documents() -> Vec<String> {
    (1..=7).map(|n| format!("shadow{n}.pdf")).collect()
}

/// Check that a document name is a single plain file name.
///
/// # Errors
///
/// Returns [`Error::InvalidUrl`] if the name is empty, a dot segment, or
/// contains a path separator.
pub fn validate_document_name(name: &str) -> Result<()> {
    if matches!(name, "" | "." | "..") || name.contains(['/', '\\']) {
        return Err(Error::invalid_url(name, "not a plain file name"));
    }
    Ok(())
}

/// What happened to one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DownloadStatus {
    /// The document was written to disk.
    Saved {
        /// Where it was written.
        path: PathBuf,
        /// Body size in bytes.
        bytes: usize,
    },
    /// The server answered with a non-success status.
    Status {
        /// HTTP status code.
        status: u16,
    },
    /// The request or the write failed.
    Failed {
        /// What went wrong.
        reason: String,
    },
}

/// Result for one requested document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DownloadResult {
    /// Requested file name.
    pub file: String,
    /// URL that was requested, if one could be built.
    pub url: Option<String>,
    /// Outcome.
    pub status: DownloadStatus,
}

impl DownloadResult {
    /// Whether the document was saved.
    #[must_use]
    pub fn is_saved(&self) -> bool {
        matches!(self.status, DownloadStatus::Saved { .. })
    }
}

/// Client for the document download endpoint of one token.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    client: Client,
    download_url: Url,
}

impl DocumentClient {
    /// Create a client for `<base_url>/<token>/download`.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is invalid, the token cannot be a
    /// path segment, or the HTTP client cannot be built.
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        let base = parse_base_url(base_url)?;
        let token_url = append_segment(&base, token)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            download_url: append_segment(&token_url, DOWNLOAD_SEGMENT)?,
        })
    }

    /// URL of one document.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidUrl`] if `file` is not a plain file name.
    pub fn file_url(&self, file: &str) -> Result<Url> {
        validate_document_name(file)?;
        append_segment(&self.download_url, file)
    }

    /// Download every file into `output_dir`, creating it first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DirectoryCreate`] if the output directory cannot be
    /// created. Failures of individual files are reported in the results.
    pub async fn download_all(
        &self,
        files: &[String],
        output_dir: &Path,
    ) -> Result<Vec<DownloadResult>> {
        ensure_dir(output_dir)?;

        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let result = match self.file_url(file) {
                Ok(url) => DownloadResult {
                    file: file.clone(),
                    url: Some(url.to_string()),
                    status: self.download_one(url, &output_dir.join(file)).await,
                },
                Err(e) => DownloadResult {
                    file: file.clone(),
                    url: None,
                    status: DownloadStatus::Failed {
                        reason: e.to_string(),
                    },
                },
            };
            results.push(result);
        }

        let saved = results.iter().filter(|r| r.is_saved()).count();
        info!(saved, requested = files.len(), "Downloads finished");
        Ok(results)
    }

    async fn download_one(&self, url: Url, path: &Path) -> DownloadStatus {
        info!("Downloading {url}");

        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Download request failed");
                return DownloadStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Download refused");
            return DownloadStatus::Status {
                status: status.as_u16(),
            };
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "Download body could not be read");
                return DownloadStatus::Failed {
                    reason: e.to_string(),
                };
            }
        };

        match std::fs::write(path, &body) {
            Ok(()) => DownloadStatus::Saved {
                path: path.to_path_buf(),
                bytes: body.len(),
            },
            Err(e) => DownloadStatus::Failed {
                reason: format!("failed to write {}: {e}", path.display()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{closed_port, serve_responses};

    fn names(files: &[&str]) -> Vec<String> {
        files.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_default_documents() {
        let documents = default_documents();
        assert_eq!(documents.len(), 7);
        assert_eq!(documents[0], "shadow1.pdf");
        assert_eq!(documents[6], "shadow7.pdf");
    }

    #[test]
    fn test_validate_document_name() {
        assert!(validate_document_name("shadow1.pdf").is_ok());
        assert!(validate_document_name("").is_err());
        assert!(validate_document_name("..").is_err());
        assert!(validate_document_name("../etc/passwd").is_err());
        assert!(validate_document_name("a\\b.pdf").is_err());
    }

    #[test]
    fn test_file_url() {
        let client =
            DocumentClient::new("http://localhost:7373/api/v1/", "SHADOW", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.file_url("shadow1.pdf").unwrap().as_str(),
            "http://localhost:7373/api/v1/SHADOW/download/shadow1.pdf"
        );
    }

    #[test]
    fn test_new_rejects_dot_token() {
        let err =
            DocumentClient::new("http://localhost/api", "..", Duration::from_secs(5)).unwrap_err();
        assert!(matches!(err, Error::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn test_download_all_reports_each_file() {
        let (addr, mut requests) = serve_responses(vec![
            (200, "%PDF-1.4 one".to_string()),
            (404, r#"{"detail":"Not Found"}"#.to_string()),
        ])
        .await;
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("shadow_files");
        let client =
            DocumentClient::new(&format!("http://{addr}/api/v1"), "SHADOW", Duration::from_secs(5))
                .unwrap();

        let results = client
            .download_all(&names(&["one.pdf", "two.pdf"]), &output)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert!(results[0].is_saved());
        assert_eq!(
            std::fs::read_to_string(output.join("one.pdf")).unwrap(),
            "%PDF-1.4 one"
        );
        assert_eq!(results[1].status, DownloadStatus::Status { status: 404 });
        assert!(!output.join("two.pdf").exists());
        assert_eq!(
            requests.recv().await.unwrap(),
            "GET /api/v1/SHADOW/download/one.pdf HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_download_all_unreachable_server() {
        let addr = closed_port().await;
        let dir = tempfile::tempdir().unwrap();
        let client =
            DocumentClient::new(&format!("http://{addr}/api/v1"), "SHADOW", Duration::from_secs(2))
                .unwrap();

        let results = client
            .download_all(&names(&["one.pdf"]), dir.path())
            .await
            .unwrap();
        assert!(matches!(results[0].status, DownloadStatus::Failed { .. }));
    }

    #[tokio::test]
    async fn test_download_all_skips_unsafe_names() {
        let (addr, mut requests) = serve_responses(vec![(200, "x".to_string())]).await;
        let dir = tempfile::tempdir().unwrap();
        let client =
            DocumentClient::new(&format!("http://{addr}/api/v1"), "SHADOW", Duration::from_secs(5))
                .unwrap();

        let results = client
            .download_all(&names(&["../escape.pdf"]), dir.path())
            .await
            .unwrap();
        assert!(results[0].url.is_none());
        assert!(matches!(results[0].status, DownloadStatus::Failed { .. }));
        assert!(requests.try_recv().is_err());
    }
}
